//! Stratified sampler.

use glam::Vec2;
use luma_core::common::*;
use luma_core::sampler::{PixelSampler, Sampler};

/// Generates stratified, jittered samples for every registered dimension.
/// 1D dimensions split [0, 1) into `spp` strata; 2D dimensions stratify on
/// a sqrt(spp) x sqrt(spp) grid, so the sample count is rounded up to a
/// perfect square. Each dimension is shuffled independently to decorrelate
/// strata across dimensions.
pub struct StratifiedSampler {
    data: PixelSampler,
    /// Strata per 2D axis.
    root: usize,
}

impl StratifiedSampler {
    /// Creates a stratified sampler.
    ///
    /// * `spp`     - Requested samples per pixel; rounded up to a perfect
    ///               square.
    /// * `dims_1d` - Pre-registered 1D dimensions.
    /// * `dims_2d` - Pre-registered 2D dimensions.
    /// * `seed`    - RNG stream selector.
    pub fn new(spp: usize, dims_1d: usize, dims_2d: usize, seed: u64) -> Self {
        let root = (spp.max(1) as Float).sqrt().ceil() as usize;
        let rounded = root * root;
        if rounded != spp {
            warn!("samples per pixel rounded up from {} to {}", spp, rounded);
        }
        Self {
            data: PixelSampler::new(rounded, dims_1d, dims_2d, seed),
            root,
        }
    }
}

impl Sampler for StratifiedSampler {
    fn start_pixel(&mut self) {
        let spp = self.data.spp;
        let root = self.root;
        let inv_spp = 1.0 / spp as Float;
        let inv_root = 1.0 / root as Float;

        for dim in 0..self.data.samples_1d.len() {
            for i in 0..spp {
                let jitter = self.data.rng.uniform_float() - 0.5;
                self.data.samples_1d[dim][i] =
                    ((i as Float + 0.5 + jitter) * inv_spp).clamp(0.0, ONE_MINUS_EPSILON);
            }
            let (arrays, rng) = (&mut self.data.samples_1d, &mut self.data.rng);
            rng.shuffle(&mut arrays[dim]);
        }

        for dim in 0..self.data.samples_2d.len() {
            for y in 0..root {
                for x in 0..root {
                    let jx = self.data.rng.uniform_float() - 0.5;
                    let jy = self.data.rng.uniform_float() - 0.5;
                    self.data.samples_2d[dim][y * root + x] = Vec2::new(
                        ((x as Float + 0.5 + jx) * inv_root).clamp(0.0, ONE_MINUS_EPSILON),
                        ((y as Float + 0.5 + jy) * inv_root).clamp(0.0, ONE_MINUS_EPSILON),
                    );
                }
            }
            let (arrays, rng) = (&mut self.data.samples_2d, &mut self.data.rng);
            rng.shuffle(&mut arrays[dim]);
        }

        self.data.reset_pixel();
    }

    fn start_next_sample(&mut self) {
        self.data.advance_sample();
    }

    fn get_1d(&mut self) -> Float {
        self.data.next_1d()
    }

    fn get_2d(&mut self) -> Vec2 {
        self.data.next_2d()
    }

    fn samples_per_pixel(&self) -> usize {
        self.data.spp
    }

    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(
            self.data.spp,
            self.data.samples_1d.len(),
            self.data.samples_2d.len(),
            seed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spp_rounds_up_to_a_perfect_square() {
        let s = StratifiedSampler::new(10, 1, 1, 0);
        assert_eq!(s.samples_per_pixel(), 16);
        let s = StratifiedSampler::new(16, 1, 1, 0);
        assert_eq!(s.samples_per_pixel(), 16);
        let s = StratifiedSampler::new(1, 1, 1, 0);
        assert_eq!(s.samples_per_pixel(), 1);
    }

    #[test]
    fn one_dimensional_strata_are_covered() {
        let spp = 16;
        let mut s = StratifiedSampler::new(spp, 1, 0, 3);
        s.start_pixel();

        let mut covered = vec![false; spp];
        for _ in 0..spp {
            let v = s.get_1d();
            // jitter keeps each value inside (or on the edge of) a stratum
            let stratum = ((v * spp as Float) as usize).min(spp - 1);
            covered[stratum] = true;
            s.start_next_sample();
        }
        let hits = covered.iter().filter(|&&c| c).count();
        // shuffled, jittered strata may spill over a boundary but most must
        // remain distinct
        assert!(hits >= spp - 2, "covered {} of {} strata", hits, spp);
    }

    #[test]
    fn two_dimensional_samples_fill_the_grid() {
        let spp = 16;
        let root = 4;
        let mut s = StratifiedSampler::new(spp, 0, 1, 7);
        s.start_pixel();

        let mut cells = vec![0; spp];
        for _ in 0..spp {
            let v = s.get_2d();
            assert!((0.0..1.0).contains(&v.x) && (0.0..1.0).contains(&v.y));
            let cx = ((v.x * root as Float) as usize).min(root - 1);
            let cy = ((v.y * root as Float) as usize).min(root - 1);
            cells[cy * root + cx] += 1;
            s.start_next_sample();
        }
        let filled = cells.iter().filter(|&&c| c > 0).count();
        assert!(filled >= spp - 4, "filled {} of {} cells", filled, spp);
    }

    #[test]
    fn clone_uses_an_independent_stream() {
        let base = StratifiedSampler::new(4, 1, 1, 0);
        let mut a = base.clone_sampler(1);
        let mut b = base.clone_sampler(2);
        a.start_pixel();
        b.start_pixel();
        let xs: Vec<Float> = (0..4).map(|_| a.get_1d()).collect();
        let ys: Vec<Float> = (0..4).map(|_| b.get_1d()).collect();
        assert_ne!(xs, ys);
    }
}
