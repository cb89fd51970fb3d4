//! Random sampler.

use glam::Vec2;
use luma_core::common::*;
use luma_core::rng::Rng;
use luma_core::sampler::Sampler;

/// Uniform random sampler with no stratification; every dimension is a raw
/// RNG draw. Useful as a baseline and for variance comparisons.
pub struct RandomSampler {
    spp: usize,
    rng: Rng,
}

impl RandomSampler {
    /// Creates a random sampler.
    ///
    /// * `spp`  - Samples per pixel.
    /// * `seed` - RNG stream selector.
    pub fn new(spp: usize, seed: u64) -> Self {
        Self {
            spp: spp.max(1),
            rng: Rng::new(seed),
        }
    }
}

impl Sampler for RandomSampler {
    fn start_pixel(&mut self) {}

    fn start_next_sample(&mut self) {}

    fn get_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }

    fn get_2d(&mut self) -> Vec2 {
        Vec2::new(self.rng.uniform_float(), self.rng.uniform_float())
    }

    fn samples_per_pixel(&self) -> usize {
        self.spp
    }

    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(self.spp, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_unit_interval() {
        let mut s = RandomSampler::new(8, 3);
        s.start_pixel();
        for _ in 0..100 {
            let v = s.get_2d();
            assert!((0.0..1.0).contains(&v.x) && (0.0..1.0).contains(&v.y));
        }
    }
}
