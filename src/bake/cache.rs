//! Camera snapshot deciding when accumulated visibility is stale.

use crate::core::{CameraId, CameraProvider, Mat4, UVec2};

/// Camera state the overlay was accumulated for
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub viewport_size: UVec2,
    pub camera: CameraId,
    pub view_projection: Mat4,
}

impl CameraState {
    /// Read the observing camera; `None` when no camera is available
    pub fn capture<P: CameraProvider + ?Sized>(provider: &P) -> Option<Self> {
        let camera = provider.observing_camera()?;
        Some(Self {
            viewport_size: provider.viewport_size(),
            camera: camera.id,
            view_projection: camera.view_projection(),
        })
    }

    /// Exact comparison; the matrix is compared bit for bit
    fn matches(&self, other: &CameraState) -> bool {
        let bits = |m: &Mat4| m.to_cols_array().map(f32::to_bits);
        self.viewport_size == other.viewport_size
            && self.camera == other.camera
            && bits(&self.view_projection) == bits(&other.view_projection)
    }
}

/// Tracks the camera snapshot of the current bake
#[derive(Clone, Debug, Default)]
pub struct CacheValidator {
    snapshot: Option<CameraState>,
}

impl CacheValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a snapshot exists and equals `current`
    pub fn is_valid(&self, current: &CameraState) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.matches(current))
    }

    /// Replace the snapshot
    pub fn rebuild(&mut self, current: CameraState) {
        self.snapshot = Some(current);
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn snapshot(&self) -> Option<&CameraState> {
        self.snapshot.as_ref()
    }
}
