//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod app;
pub mod camera;
pub mod common;
pub mod emitter;
pub mod film;
pub mod geometry;
pub mod interaction;
pub mod material;
pub mod mesh;
pub mod primitive;
pub mod reflection;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod scene;
pub mod spectrum;
