//! Noise-based procedural heightfield landscape

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::Vec3;
use super::landscape::{Landscape, SurfacePoint};

/// Parameters controlling the heightfield
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightfieldParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical scale (max height)
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub half_extent: f32,  // Landscape covers [-half_extent, half_extent] in X and Y
}

impl Default for HeightfieldParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 150.0,
            height_scale: 80.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            half_extent: 512.0,
        }
    }
}

/// Procedural Z-up landscape using fractal Brownian motion (FBM)
pub struct HeightfieldLandscape {
    params: HeightfieldParams,
    noise: Fbm<Perlin>,
}

impl HeightfieldLandscape {
    /// Create a new heightfield with the given parameters
    pub fn new(params: HeightfieldParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    pub fn params(&self) -> &HeightfieldParams {
        &self.params
    }

    /// Terrain height at world position (x, y)
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let ny = (y / self.params.scale) as f64;

        // Noise is in [-1, 1], map to [0, height_scale]
        let noise_value = self.noise.get([nx, ny]);
        let normalized = (noise_value + 1.0) / 2.0;
        (normalized * self.params.height_scale as f64) as f32
    }

    /// Surface normal from central differences
    pub fn normal_at(&self, x: f32, y: f32) -> Vec3 {
        let e = (self.params.scale * 0.01).max(0.01);
        let dx = (self.height_at(x + e, y) - self.height_at(x - e, y)) / (2.0 * e);
        let dy = (self.height_at(x, y + e) - self.height_at(x, y - e)) / (2.0 * e);
        Vec3::new(-dx, -dy, 1.0).normalize()
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x.abs() <= self.params.half_extent && y.abs() <= self.params.half_extent
    }
}

impl Landscape for HeightfieldLandscape {
    fn place_point(&self, world_point: Vec3) -> Option<SurfacePoint> {
        let (x, y) = (world_point.x, world_point.y);
        if !self.contains(x, y) {
            return None;
        }
        Some(SurfacePoint {
            position: Vec3::new(x, y, self.height_at(x, y)),
            normal: self.normal_at(x, y),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_in_range() {
        let land = HeightfieldLandscape::new(HeightfieldParams::default());
        for i in 0..20 {
            let h = land.height_at(i as f32 * 13.7, i as f32 * -7.3);
            let hs = land.params().height_scale;
            assert!(h.is_finite() && h >= -0.25 * hs && h <= 1.25 * hs, "height {h}");
        }
    }

    #[test]
    fn test_height_consistency() {
        let land = HeightfieldLandscape::new(HeightfieldParams::default());
        assert_eq!(land.height_at(10.0, 20.0), land.height_at(10.0, 20.0));
    }

    #[test]
    fn test_place_point_on_surface() {
        let land = HeightfieldLandscape::new(HeightfieldParams::default());
        let hit = land.place_point(Vec3::new(30.0, -40.0, 500.0)).unwrap();
        assert_eq!(hit.position.z, land.height_at(30.0, -40.0));
        assert!((hit.normal.length() - 1.0).abs() < 1e-4);
        assert!(hit.normal.z > 0.0);
    }

    #[test]
    fn test_place_point_outside_extent() {
        let params = HeightfieldParams { half_extent: 50.0, ..Default::default() };
        let land = HeightfieldLandscape::new(params);
        assert!(land.place_point(Vec3::new(51.0, 0.0, 0.0)).is_none());
    }
}
