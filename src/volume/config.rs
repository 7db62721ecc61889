//! Visibility volume parameters and preset files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Color, Error, Result};

/// Current version of the volume preset format
pub const PRESET_VERSION: u32 = 1;

/// Designer-facing parameters of one visibility volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityVolumeConfig {
    /// Radius of the sampled disc in world units
    pub radius: f32,
    /// Minimum distance between two sample points
    pub distance_between_points: f32,
    /// Upper edge of the observation cone, degrees above the horizon
    pub up_angle_deg: f32,
    /// Lower edge of the observation cone, degrees below the horizon
    pub down_angle_deg: f32,
    /// Maximum distance at which terrain counts as visible
    pub max_distance: f32,
    /// Height of snapped points above the landscape surface
    pub height_above_landscape: f32,
    /// Random vertical jitter applied to every sample point
    pub vertical_variance: f32,
    /// Overlay color contributed by this volume
    pub color: Color,
    pub enabled: bool,
    /// Snap sample points onto the landscape
    pub place_on_landscape: bool,
    /// Divide the color by the number of points in the volume
    pub normalize_color: bool,
    pub debug_draw: bool,
}

impl Default for VisibilityVolumeConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            distance_between_points: 5.0,
            up_angle_deg: 45.0,
            down_angle_deg: 45.0,
            max_distance: 250.0,
            height_above_landscape: 2.0,
            vertical_variance: 0.0,
            color: Color::new(1.0, 0.0, 0.0, 1.0),
            enabled: true,
            place_on_landscape: true,
            normalize_color: false,
            debug_draw: false,
        }
    }
}

impl VisibilityVolumeConfig {
    /// Check the parameters the point sampler depends on.
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0) {
            return Err(Error::InvalidVolume(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.distance_between_points > 0.0) {
            return Err(Error::InvalidVolume(format!(
                "distance between points must be positive, got {}",
                self.distance_between_points
            )));
        }
        if self.vertical_variance < 0.0 {
            return Err(Error::InvalidVolume(format!(
                "vertical variance must not be negative, got {}",
                self.vertical_variance
            )));
        }
        Ok(())
    }

    /// Rough upper estimate of how many points fit into the disc
    pub fn estimated_point_count(&self) -> u32 {
        estimated_point_count(self.radius, self.distance_between_points)
    }
}

/// `2 * floor(radius² / spacing²)`, the packing estimate used by the sampler.
///
/// Saturates at `u32::MAX` for very dense volumes.
pub fn estimated_point_count(radius: f32, min_spacing: f32) -> u32 {
    let ratio = (radius * radius) / (min_spacing * min_spacing);
    // float-to-int casts saturate
    (ratio as u32).saturating_mul(2)
}

/// A named set of volume configurations stored as JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VolumePreset {
    /// Format version for compatibility
    pub version: u32,
    pub name: String,
    pub volumes: Vec<VisibilityVolumeConfig>,
}

impl VolumePreset {
    pub fn new(name: impl Into<String>, volumes: Vec<VisibilityVolumeConfig>) -> Self {
        Self {
            version: PRESET_VERSION,
            name: name.into(),
            volumes,
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

    /// Load from file (sync), validating every volume
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let preset: Self = serde_json::from_str(&json)?;

        if preset.version != PRESET_VERSION {
            return Err(Error::Config(format!(
                "unsupported preset version {} in {}",
                preset.version,
                path.display()
            )));
        }
        for volume in &preset.volumes {
            volume.validate()?;
        }
        Ok(preset)
    }
}
