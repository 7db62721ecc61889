//! Visibility volumes and their sample points

pub mod config;
pub mod component;
pub mod sampler;
pub mod control_point;
pub mod registry;

pub use config::{VisibilityVolumeConfig, VolumePreset};
pub use component::{VisibilityVolume, WorldTransform};
pub use sampler::{generate_points, PointSampler, RandomSource, MAX_PLACEMENT_ATTEMPTS};
pub use control_point::ControlPoint;
pub use registry::{RefreshOutcome, VolumeRegistry};
