//! GPU-side data layout for visibility baking

use bytemuck::{Pod, Zeroable};

use crate::volume::ControlPoint;

/// Default edge length of a cubemap face in pixels
pub const CUBEMAP_SIZE: u32 = 2048;

/// Control point uniform data for GPU (must match shader struct exactly)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ControlPointUniform {
    /// Observer position (12 bytes, offset 0)
    pub position: [f32; 3],
    /// Maximum visibility distance (4 bytes, offset 12)
    pub max_distance: f32,
    /// Cone up direction (12 bytes, offset 16)
    pub normal: [f32; 3],
    /// Upper cone bound as cosine (4 bytes, offset 28)
    pub up_angle_cos: f32,
    /// Overlay color (16 bytes, offset 32)
    pub color: [f32; 4],
    /// Lower cone bound as cosine (4 bytes, offset 48)
    pub down_angle_cos: f32,
    /// Padding to 64 bytes (12 bytes, offset 52)
    pub _pad: [f32; 3],
}

impl From<&ControlPoint> for ControlPointUniform {
    fn from(point: &ControlPoint) -> Self {
        Self {
            position: point.point.to_array(),
            max_distance: point.max_distance,
            normal: point.normal.to_array(),
            up_angle_cos: point.up_angle_cos,
            color: point.color.to_array(),
            down_angle_cos: point.down_angle_cos,
            _pad: [0.0; 3],
        }
    }
}
