//! BVH nodes.

use luma_core::geometry::{Bounds3, Ray};

/// One node of a bounding-volume hierarchy. A node is either a leaf (both
/// child indices are -1) or an internal node with exactly two children; its
/// item range indexes the builder's primitive permutation.
#[derive(Clone, Copy, Debug)]
pub struct BvhNode {
    /// Left child index, -1 on a leaf.
    pub left: i32,

    /// Right child index, -1 on a leaf.
    pub right: i32,

    /// First covered slot in the primitive permutation.
    pub start: u32,

    /// Number of covered slots.
    pub count: u32,

    /// Box covering every item in the range, enlarged by the build epsilon.
    pub bounds: Bounds3,
}

impl BvhNode {
    /// Returns whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.left < 0 && self.right < 0
    }

    /// Slab-tests the node's box against a ray.
    pub fn any_hit(&self, ray: &Ray) -> bool {
        self.bounds.any_hit(ray)
    }
}
