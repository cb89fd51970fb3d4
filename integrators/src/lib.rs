//! Integrators

#[macro_use]
extern crate log;

mod path;
mod renderer;

// Re-export.
pub use path::*;
pub use renderer::*;
