//! Pseudo-random number generation (PCG32).

use crate::common::*;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 pseudo-random number generator.
#[derive(Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl Rng {
    /// Creates a generator seeded with the given sequence index. Distinct
    /// indices yield statistically independent streams.
    ///
    /// * `sequence_index` - The stream to select.
    pub fn new(sequence_index: u64) -> Self {
        let mut rng = Self { state: 0, inc: (sequence_index << 1) | 1 };
        let _ = rng.uniform_u32();
        rng.state = rng.state.wrapping_add(PCG32_DEFAULT_STATE);
        let _ = rng.uniform_u32();
        rng
    }

    /// Returns a uniformly distributed `u32`.
    #[inline]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed `u32` in `[0, bound)` without modulo
    /// bias.
    ///
    /// * `bound` - Exclusive upper bound, must be non-zero.
    pub fn bounded_uniform_u32(&mut self, bound: u32) -> u32 {
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.uniform_u32();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    /// Returns a uniformly distributed value in `[0, 1)`.
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_u32() as Float * hexf32!("0x1.0p-32")).min(ONE_MINUS_EPSILON)
    }

    /// Shuffles a slice in place (Fisher-Yates).
    ///
    /// * `v` - The slice to shuffle.
    pub fn shuffle<T>(&mut self, v: &mut [T]) {
        for i in (1..v.len()).rev() {
            let j = self.bounded_uniform_u32(i as u32 + 1) as usize;
            v.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_differ() {
        let mut a = Rng::new(0);
        let mut b = Rng::new(1);
        let xs: Vec<u32> = (0..8).map(|_| a.uniform_u32()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.uniform_u32()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn uniform_float_in_unit_interval() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            let u = rng.uniform_float();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn bounded_draw_respects_bound() {
        let mut rng = Rng::new(3);
        for _ in 0..10_000 {
            assert!(rng.bounded_uniform_u32(13) < 13);
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Rng::new(11);
        let mut v: Vec<usize> = (0..100).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }
}
