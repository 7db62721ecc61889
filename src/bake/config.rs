//! Bake system configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Color, Error, Result};
use crate::render::CUBEMAP_SIZE;

/// Configuration of the visibility bake
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Master switch; a disabled system neither updates nor draws
    pub enabled: bool,
    /// Cubemap render targets, which is also the number of points baked per frame
    pub pool_size: usize,
    /// Cubemap face size in pixels
    pub cubemap_size: u32,
    /// Near clip plane of the cubemap capture
    pub near_clip_plane: f32,
    /// Seed for point placement and processing order; `None` uses entropy
    pub seed: Option<u64>,
    /// Progress bar color
    pub progress_color: Color,
    /// Progress bar color while a frame fix is pending
    pub pending_fix_color: Color,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pool_size: 1,
            cubemap_size: CUBEMAP_SIZE,
            near_clip_plane: 0.1,
            seed: None,
            progress_color: Color::WHITE,
            pending_fix_color: Color::new(0.25, 0.5, 1.0, 1.0),
        }
    }
}

impl BakeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::Config("pool size must be at least 1".into()));
        }
        if self.cubemap_size == 0 {
            return Err(Error::Config("cubemap size must be positive".into()));
        }
        if !(self.near_clip_plane > 0.0) {
            return Err(Error::Config(format!(
                "near clip plane must be positive, got {}",
                self.near_clip_plane
            )));
        }
        Ok(())
    }

    /// Progress bar color for the given freeze state
    pub fn progress_bar_color(&self, fix_pending: bool) -> Color {
        if fix_pending {
            self.pending_fix_color
        } else {
            self.progress_color
        }
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BakeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.cubemap_size, 2048);
        assert!(config.enabled);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_pool = BakeConfig { pool_size: 0, ..Default::default() };
        assert!(matches!(zero_pool.validate(), Err(Error::Config(_))));

        let bad_near = BakeConfig { near_clip_plane: 0.0, ..Default::default() };
        assert!(bad_near.validate().is_err());
    }

    #[test]
    fn test_progress_bar_color() {
        let config = BakeConfig::default();
        assert_eq!(config.progress_bar_color(false), Color::WHITE);
        assert_eq!(config.progress_bar_color(true), Color::new(0.25, 0.5, 1.0, 1.0));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bake").join("config.json");
        let config = BakeConfig { pool_size: 4, seed: Some(99), ..Default::default() };

        config.save_sync(&path).unwrap();
        let loaded = BakeConfig::load_sync(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BakeConfig = serde_json::from_str(r#"{ "pool_size": 2 }"#).unwrap();
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.near_clip_plane, 0.1);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "pool_size": 0 }"#).unwrap();
        assert!(BakeConfig::load_sync(&path).is_err());
    }
}
