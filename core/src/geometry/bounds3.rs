//! Axis-aligned bounding boxes.

use crate::common::*;
use crate::geometry::Ray;
use glam::{Mat4, Vec3};

/// An axis-aligned bounding box. The default box is empty (min = +inf,
/// max = -inf) so that any union with it yields the other operand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3 {
    /// Minimum corner.
    pub min: Vec3,

    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds3 {
    /// The empty box.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(INFINITY),
        max: Vec3::splat(-INFINITY),
    };

    /// Creates a box from two corner points in any order.
    ///
    /// * `p0` - First corner.
    /// * `p1` - Second corner.
    pub fn new(p0: Vec3, p1: Vec3) -> Self {
        Self {
            min: p0.min(p1),
            max: p0.max(p1),
        }
    }

    /// Creates the smallest box containing three points.
    pub fn from_triangle(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        Self {
            min: p0.min(p1).min(p2),
            max: p0.max(p1).max(p2),
        }
    }

    /// Returns whether the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box to contain a point.
    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns the union of two boxes.
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        Bounds3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box outward by `eps` on every face.
    pub fn enlarge(&mut self, eps: Float) {
        self.min -= Vec3::splat(eps);
        self.max += Vec3::splat(eps);
    }

    /// Returns the centroid of the box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Returns the surface area of the box, 0 for an empty box.
    pub fn surface_area(&self) -> Float {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Returns the extent of the box along each axis.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the box covering all 8 corners transformed by `m`.
    ///
    /// * `m` - Point transform.
    pub fn transform(&self, m: &Mat4) -> Bounds3 {
        let mut out = Bounds3::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.expand_point(m.transform_point3(corner));
        }
        out
    }

    /// Slab test against a ray, using the ray's cached inverse direction.
    /// Rejects on an empty or negative parametric interval. An axis with a
    /// near-zero direction component rejects when the origin lies on or
    /// outside that axis's slab faces.
    ///
    /// * `ray` - The ray.
    pub fn any_hit(&self, ray: &Ray) -> bool {
        let mut interval_min = -INFINITY;
        let mut interval_max = INFINITY;

        for i in 0..3 {
            if ray.dir[i].abs() < EPSILON {
                if ray.origin[i] <= self.min[i] || ray.origin[i] >= self.max[i] {
                    return false;
                }
            } else {
                let mut t1 = (self.min[i] - ray.origin[i]) * ray.inv_dir[i];
                let mut t2 = (self.max[i] - ray.origin[i]) * ray.inv_dir[i];
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                interval_min = interval_min.max(t1);
                interval_max = interval_max.min(t2);
                if interval_min >= interval_max {
                    return false;
                }
            }
        }

        // box entirely behind the ray
        interval_max >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds3 {
        Bounds3::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn empty_union_is_identity() {
        let b = unit_box();
        assert_eq!(Bounds3::EMPTY.union(&b), b);
        assert!(Bounds3::EMPTY.is_empty());
        assert_eq!(Bounds3::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn expand_and_enlarge() {
        let mut b = Bounds3::EMPTY;
        b.expand_point(Vec3::ZERO);
        b.expand_point(Vec3::ONE);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
        b.enlarge(0.001);
        assert_eq!(b.min, Vec3::splat(-0.001));
        assert_eq!(b.max, Vec3::splat(1.001));
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let b = Bounds3::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(b.surface_area(), 6.0);
    }

    #[test]
    fn ray_through_center_hits() {
        let b = unit_box();
        let r = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0, INFINITY);
        assert!(b.any_hit(&r));
    }

    #[test]
    fn ray_pointing_away_misses() {
        let b = unit_box();
        let r = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z, 0.0, INFINITY);
        assert!(!b.any_hit(&r));
    }

    #[test]
    fn axis_aligned_ray_inside_slab_hits() {
        let b = unit_box();
        let r = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::Z, 0.0, INFINITY);
        assert!(b.any_hit(&r));
    }

    // A ray travelling exactly in a box face misses: the perpendicular slab
    // check uses hard inequalities against the bounds.
    #[test]
    fn axis_aligned_ray_on_face_misses() {
        let b = unit_box();
        let r = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::Z, 0.0, INFINITY);
        assert!(!b.any_hit(&r));
    }

    #[test]
    fn transform_translates_corners() {
        let b = Bounds3::new(Vec3::ZERO, Vec3::ONE);
        let m = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let t = b.transform(&m);
        assert_eq!(t.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(t.max, Vec3::new(3.0, 1.0, 1.0));
    }
}
