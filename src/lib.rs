//! Rktri Sightline - Amortized terrain visibility baking for level design

pub mod core;
pub mod volume;
pub mod bake;
pub mod render;
pub mod terrain;
