//! Landscape surface queries used to snap sample points.

use std::sync::Arc;

use crate::core::Vec3;

/// A point on the landscape surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Surface that sample points can be placed on.
pub trait Landscape: Send + Sync {
    /// Find the surface point below (or above) `world_point`.
    ///
    /// Returns `None` when the point lies outside the landscape.
    fn place_point(&self, world_point: Vec3) -> Option<SurfacePoint>;
}

/// Component attaching a landscape surface to a scene entity
#[derive(Clone)]
pub struct LandscapeHandle(pub Arc<dyn Landscape>);

impl LandscapeHandle {
    pub fn new(landscape: impl Landscape + 'static) -> Self {
        Self(Arc::new(landscape))
    }
}

impl std::fmt::Debug for LandscapeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandscapeHandle").finish_non_exhaustive()
    }
}

/// Horizontal plane covering a square region around the origin
#[derive(Clone, Copy, Debug)]
pub struct FlatLandscape {
    pub height: f32,
    pub half_extent: f32,
}

impl FlatLandscape {
    pub fn new(height: f32, half_extent: f32) -> Self {
        Self { height, half_extent }
    }
}

impl Landscape for FlatLandscape {
    fn place_point(&self, world_point: Vec3) -> Option<SurfacePoint> {
        if world_point.x.abs() > self.half_extent || world_point.y.abs() > self.half_extent {
            return None;
        }
        Some(SurfacePoint {
            position: Vec3::new(world_point.x, world_point.y, self.height),
            normal: Vec3::Z,
        })
    }
}
