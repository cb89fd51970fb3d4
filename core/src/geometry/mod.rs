//! Geometry

mod bounds3;
mod frame;
mod ray;

// Re-export
pub use bounds3::*;
pub use frame::*;
pub use ray::*;
