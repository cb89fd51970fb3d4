//! Sample generation interface.

use crate::common::*;
use crate::rng::Rng;
use glam::Vec2;

/// Per-pixel sample generator driving the integrator's random decisions.
///
/// Dimensions requested up-front are pre-generated (and typically
/// stratified) when a pixel starts; requests beyond the registered count
/// fall back to raw uniform draws, so an integrator may consume more
/// dimensions than anticipated without failing - the overflow merely loses
/// stratification.
pub trait Sampler: Send + Sync {
    /// Begins work on a pixel: regenerates all registered sample dimensions
    /// and rewinds to the first sample.
    fn start_pixel(&mut self);

    /// Advances to the pixel's next sample, resetting the dimension cursors.
    fn start_next_sample(&mut self);

    /// Returns the next 1D sample value for the current pixel sample.
    fn get_1d(&mut self) -> Float;

    /// Returns the next 2D sample value for the current pixel sample.
    fn get_2d(&mut self) -> Vec2;

    /// Number of samples taken per pixel.
    fn samples_per_pixel(&self) -> usize;

    /// Creates an identically-configured sampler with an independent random
    /// stream. One clone is made per tile.
    ///
    /// * `seed` - Stream selector, unique per tile.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler>;
}

/// Shared storage for samplers that pre-generate per-dimension arrays.
pub struct PixelSampler {
    /// Samples per pixel.
    pub spp: usize,

    /// Pre-generated 1D dimensions, `[dimension][sample]`.
    pub samples_1d: Vec<Vec<Float>>,

    /// Pre-generated 2D dimensions, `[dimension][sample]`.
    pub samples_2d: Vec<Vec<Vec2>>,

    /// Index of the current sample within the pixel.
    pub current_sample: usize,

    /// Read cursor over 1D dimensions.
    dim_1d: usize,

    /// Read cursor over 2D dimensions.
    dim_2d: usize,

    /// Fallback generator, also used to regenerate the arrays.
    pub rng: Rng,
}

impl PixelSampler {
    /// Allocates storage for the registered dimensions.
    ///
    /// * `spp`     - Samples per pixel.
    /// * `dims_1d` - Number of pre-registered 1D dimensions.
    /// * `dims_2d` - Number of pre-registered 2D dimensions.
    /// * `seed`    - RNG stream selector.
    pub fn new(spp: usize, dims_1d: usize, dims_2d: usize, seed: u64) -> Self {
        Self {
            spp,
            samples_1d: vec![vec![0.0; spp]; dims_1d],
            samples_2d: vec![vec![Vec2::ZERO; spp]; dims_2d],
            current_sample: 0,
            dim_1d: 0,
            dim_2d: 0,
            rng: Rng::new(seed),
        }
    }

    /// Rewinds to the first sample of a new pixel.
    pub fn reset_pixel(&mut self) {
        self.current_sample = 0;
        self.dim_1d = 0;
        self.dim_2d = 0;
    }

    /// Advances the sample index and resets the dimension cursors.
    pub fn advance_sample(&mut self) {
        self.current_sample += 1;
        self.dim_1d = 0;
        self.dim_2d = 0;
    }

    /// Next 1D value: pre-generated when available, raw uniform otherwise.
    pub fn next_1d(&mut self) -> Float {
        if self.dim_1d < self.samples_1d.len() && self.current_sample < self.spp {
            let v = self.samples_1d[self.dim_1d][self.current_sample];
            self.dim_1d += 1;
            v
        } else {
            self.rng.uniform_float()
        }
    }

    /// Next 2D value: pre-generated when available, raw uniform otherwise.
    pub fn next_2d(&mut self) -> Vec2 {
        if self.dim_2d < self.samples_2d.len() && self.current_sample < self.spp {
            let v = self.samples_2d[self.dim_2d][self.current_sample];
            self.dim_2d += 1;
            v
        } else {
            Vec2::new(self.rng.uniform_float(), self.rng.uniform_float())
        }
    }
}
