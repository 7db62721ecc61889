//! Amortized multi-frame visibility baking

pub mod config;
pub mod order;
pub mod cache;
pub mod pool;
pub mod scheduler;
pub mod system;

pub use config::BakeConfig;
pub use order::ProcessingOrder;
pub use cache::{CacheValidator, CameraState};
pub use pool::RenderTargetPool;
pub use scheduler::{BakeEvent, BakeScheduler, BakeState, FreezeAction, FreezeEvent, FreezeState, SlotAssignment};
pub use system::{BoxedRandom, VisibilitySystem};
