//! Ray intersection acceleration data structures.

#[macro_use]
extern crate log;

mod blas;
mod builder;
mod node;
mod tlas;
mod traverse;

// Re-export
pub use blas::*;
pub use builder::*;
pub use node::*;
pub use tlas::*;
pub use traverse::*;
