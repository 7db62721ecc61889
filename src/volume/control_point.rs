//! World-space sample points consumed by the visibility renderer.

use crate::core::{Color, Vec3};
use super::config::VisibilityVolumeConfig;

/// Baked observation point, rebuilt every frame from volume offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    /// World position of the observer
    pub point: Vec3,
    /// World-space up direction of the observation cone
    pub normal: Vec3,
    /// Overlay color contributed by this point
    pub color: Color,
    /// `cos(90° - up_angle)`
    pub up_angle_cos: f32,
    /// `-cos(90° - down_angle)`
    pub down_angle_cos: f32,
    pub max_distance: f32,
}

impl ControlPoint {
    pub fn new(point: Vec3, normal: Vec3, color: Color, config: &VisibilityVolumeConfig) -> Self {
        let (up_angle_cos, down_angle_cos) = cone_cosines(config.up_angle_deg, config.down_angle_deg);
        Self {
            point,
            normal,
            color,
            up_angle_cos,
            down_angle_cos,
            max_distance: config.max_distance,
        }
    }
}

/// Cone bounds as cosines measured from the volume normal
pub fn cone_cosines(up_angle_deg: f32, down_angle_deg: f32) -> (f32, f32) {
    let up = (90.0 - up_angle_deg).to_radians().cos();
    let down = -(90.0 - down_angle_deg).to_radians().cos();
    (up, down)
}

/// Color of a volume, optionally spread over its points.
///
/// Normalized channels never drop below one 8-bit step so a positive
/// channel stays visible in the overlay.
pub fn volume_color(config: &VisibilityVolumeConfig, point_count: usize) -> Color {
    let mut color = config.color;
    if config.normalize_color && point_count > 0 {
        let n = point_count as f32;
        let normalize = |c: f32| if c > 0.0 { (c / n).max(1.0 / 255.0) } else { 0.0 };
        color.r = normalize(color.r);
        color.g = normalize(color.g);
        color.b = normalize(color.b);
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cone_cosines() {
        let (up, down) = cone_cosines(90.0, 90.0);
        assert!((up - 1.0).abs() < 1e-6);
        assert!((down + 1.0).abs() < 1e-6);

        let (up, down) = cone_cosines(0.0, 0.0);
        assert!(up.abs() < 1e-6);
        assert!(down.abs() < 1e-6);

        let (up, _) = cone_cosines(30.0, 0.0);
        assert!((up - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_color_without_normalization() {
        let cfg = VisibilityVolumeConfig {
            color: Color::new(0.5, 0.25, 0.0, 1.0),
            ..Default::default()
        };
        assert_eq!(volume_color(&cfg, 10), cfg.color);
    }

    #[test]
    fn test_color_normalization() {
        let cfg = VisibilityVolumeConfig {
            color: Color::new(1.0, 0.0, 0.5, 0.8),
            normalize_color: true,
            ..Default::default()
        };
        let c = volume_color(&cfg, 4);
        assert!((c.r - 0.25).abs() < 1e-6);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.125).abs() < 1e-6);
        assert_eq!(c.a, 0.8);
    }

    #[test]
    fn test_color_normalization_floor() {
        let cfg = VisibilityVolumeConfig {
            color: Color::new(1.0, 0.1, 0.0, 1.0),
            normalize_color: true,
            ..Default::default()
        };
        let c = volume_color(&cfg, 1000);
        assert_eq!(c.r, 1.0 / 255.0);
        assert_eq!(c.g, 1.0 / 255.0);
        assert_eq!(c.b, 0.0);
    }
}
