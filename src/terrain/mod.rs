//! Landscape surfaces for point snapping

pub mod landscape;
pub use landscape::{FlatLandscape, Landscape, LandscapeHandle, SurfacePoint};

pub mod heightfield;
pub use heightfield::{HeightfieldLandscape, HeightfieldParams};
