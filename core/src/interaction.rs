//! Ray-surface intersection records.

use crate::common::*;
use crate::geometry::Frame;
use crate::material::Material;
use glam::{Vec2, Vec3};
use std::sync::Arc;

/// How surface normals are produced at hit points on an instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShadingMode {
    /// Interpolate per-vertex normals across the triangle.
    #[default]
    Smooth,

    /// Use the geometric face normal.
    Flat,
}

/// Leaf-node indices recorded per tree level during the two-phase traversal.
/// The top-level leaf identifies the instance that owns the hit; the
/// bottom-level leaf identifies the triangle range that produced it.
#[derive(Clone, Copy, Debug)]
pub struct AccelLeaf {
    /// Top-level (instance tree) leaf index, -1 when unset.
    pub tlas: i32,

    /// Bottom-level (triangle tree) leaf index, -1 when unset.
    pub blas: i32,
}

impl Default for AccelLeaf {
    fn default() -> Self {
        Self { tlas: -1, blas: -1 }
    }
}

/// The closest hit found so far along a ray, together with the shading
/// information needed to build a scattering function afterwards. Allocated
/// on the stack per traced ray.
#[derive(Clone, Debug)]
pub struct IntersectRecord {
    /// World-space (or, mid-traversal, instance-local) hit position.
    pub pos: Vec3,

    /// Hit distance; starts at infinity and only ever decreases.
    pub t: Float,

    /// Surface normal at the hit, corrected to face the incident ray.
    pub normal: Vec3,

    /// Interpolated texture coordinates.
    pub uv: Vec2,

    /// Material of the hit face.
    pub material: Option<Arc<Material>>,

    /// Leaf nodes visited per tree level.
    pub leaf: AccelLeaf,

    /// Normal-generation mode of the instance being traversed.
    pub shading: ShadingMode,
}

impl Default for IntersectRecord {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            t: INFINITY,
            normal: Vec3::Z,
            uv: Vec2::new(-1.0, -1.0),
            material: None,
            leaf: AccelLeaf::default(),
            shading: ShadingMode::Smooth,
        }
    }
}

impl IntersectRecord {
    /// Returns whether the hit surface emits light.
    pub fn is_emitter(&self) -> bool {
        self.material.as_ref().map_or(false, |m| m.is_emissive())
    }

    /// Builds the local shading frame over the hit normal.
    pub fn shading_frame(&self) -> Frame {
        Frame::from_normal(self.normal)
    }
}
