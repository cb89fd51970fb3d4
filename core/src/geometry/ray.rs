//! Rays.

use crate::common::*;
use glam::Vec3;

/// A ray with a parametric acceptance range. The direction is normalized on
/// construction and its reciprocal cached for slab tests.
#[derive(Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub origin: Vec3,

    /// Normalized direction.
    pub dir: Vec3,

    /// Component-wise reciprocal of the direction.
    pub inv_dir: Vec3,

    /// Smallest accepted parametric distance.
    pub t_min: Float,

    /// Largest accepted parametric distance.
    pub t_max: Float,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    ///
    /// * `origin` - Origin.
    /// * `dir`    - Direction (need not be normalized).
    /// * `t_min`  - Smallest accepted parametric distance.
    /// * `t_max`  - Largest accepted parametric distance.
    pub fn new(origin: Vec3, dir: Vec3, t_min: Float, t_max: Float) -> Self {
        let dir = dir.normalize();
        Self {
            origin,
            dir,
            inv_dir: dir.recip(),
            t_min,
            t_max,
        }
    }

    /// Returns the point at parametric distance `t`.
    pub fn at(&self, t: Float) -> Vec3 {
        self.origin + t * self.dir
    }

    /// Returns whether `t` lies strictly inside the acceptance range.
    pub fn accepts(&self, t: Float) -> bool {
        t > self.t_min && t < self.t_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let r = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), 0.0, INFINITY);
        assert!((r.dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(r.at(2.0), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn acceptance_range_is_open() {
        let r = Ray::new(Vec3::ZERO, Vec3::Z, 1.0, 10.0);
        assert!(!r.accepts(1.0));
        assert!(r.accepts(5.0));
        assert!(!r.accepts(10.0));
    }
}
