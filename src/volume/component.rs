//! Scene components read by the visibility baker.

use crate::core::{Color, Error, Mat4, Result, Vec3};
use super::config::VisibilityVolumeConfig;

/// World transform of a scene entity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform(pub Mat4);

impl WorldTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self(Mat4::from_translation(translation))
    }

    pub fn translation(&self) -> Vec3 {
        self.0.w_axis.truncate()
    }

    /// Rotate/scale a local vector without translating it
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.0.transform_vector3(v)
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// Visibility volume attached to a scene entity.
///
/// Every setter invalidates the volume. Setters that change the disc
/// geometry additionally request a fresh point set.
#[derive(Clone, Debug)]
pub struct VisibilityVolume {
    config: VisibilityVolumeConfig,
    valid: bool,
    rebuild_points: bool,
}

impl VisibilityVolume {
    pub fn new(config: VisibilityVolumeConfig) -> Self {
        Self {
            config,
            valid: false,
            rebuild_points: true,
        }
    }

    pub fn config(&self) -> &VisibilityVolumeConfig {
        &self.config
    }

    /// Whether the baked state still matches the parameters
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the point set must be regenerated
    pub fn should_rebuild_points(&self) -> bool {
        self.rebuild_points
    }

    /// Mark the volume as needing a fresh point set
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.rebuild_points = true;
    }

    pub(crate) fn set_valid(&mut self) {
        self.valid = true;
        self.rebuild_points = false;
    }

    fn touch(&mut self) {
        self.valid = false;
    }

    // --- Geometry setters ---

    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius > 0.0) {
            return Err(Error::InvalidVolume(format!("radius must be positive, got {radius}")));
        }
        self.config.radius = radius;
        self.invalidate();
        Ok(())
    }

    pub fn set_distance_between_points(&mut self, distance: f32) -> Result<()> {
        if !(distance > 0.0) {
            return Err(Error::InvalidVolume(format!(
                "distance between points must be positive, got {distance}"
            )));
        }
        self.config.distance_between_points = distance;
        self.invalidate();
        Ok(())
    }

    pub fn set_vertical_variance(&mut self, variance: f32) {
        self.config.vertical_variance = variance.max(0.0);
        self.invalidate();
    }

    // --- Appearance setters ---

    pub fn set_up_angle(&mut self, degrees: f32) {
        self.config.up_angle_deg = degrees;
        self.touch();
    }

    pub fn set_down_angle(&mut self, degrees: f32) {
        self.config.down_angle_deg = degrees;
        self.touch();
    }

    pub fn set_max_distance(&mut self, distance: f32) {
        self.config.max_distance = distance;
        self.touch();
    }

    pub fn set_height_above_landscape(&mut self, height: f32) {
        self.config.height_above_landscape = height;
        self.touch();
    }

    pub fn set_color(&mut self, color: Color) {
        self.config.color = color;
        self.touch();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.touch();
    }

    pub fn set_place_on_landscape(&mut self, place: bool) {
        self.config.place_on_landscape = place;
        self.touch();
    }

    pub fn set_normalize_color(&mut self, normalize: bool) {
        self.config.normalize_color = normalize;
        self.touch();
    }

    pub fn set_debug_draw(&mut self, debug_draw: bool) {
        self.config.debug_draw = debug_draw;
    }
}

impl Default for VisibilityVolume {
    fn default() -> Self {
        Self::new(VisibilityVolumeConfig::default())
    }
}
