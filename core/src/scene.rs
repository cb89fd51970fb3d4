//! Scene.

use crate::common::*;
use crate::emitter::{EmitterRegistry, LightSample};
use crate::geometry::{Bounds3, Ray};
use crate::interaction::IntersectRecord;
use crate::primitive::ArcPrimitive;
use glam::Vec3;

/// Everything the integrator renders against: the intersectable aggregate
/// (the top-level acceleration structure) plus the emitter registry. Both
/// are read-only for the whole parallel rendering phase.
pub struct Scene {
    /// The aggregate geometry.
    pub aggregate: ArcPrimitive,

    /// All emissive triangles.
    pub emitters: EmitterRegistry,
}

impl Scene {
    /// Creates a scene.
    ///
    /// * `aggregate` - Aggregate geometry.
    /// * `emitters`  - Emitter registry built from the same geometry.
    pub fn new(aggregate: ArcPrimitive, emitters: EmitterRegistry) -> Self {
        Self { aggregate, emitters }
    }

    /// World-space bound of the aggregate.
    pub fn world_bound(&self) -> Bounds3 {
        self.aggregate.world_bound()
    }

    /// Largest extent of the scene's bounding box, used to scale epsilons
    /// and camera parameters.
    pub fn scene_scale(&self) -> Float {
        let d = self.world_bound().diagonal();
        d.x.max(d.y).max(d.z)
    }

    /// Traces a ray and returns the closest hit, if any.
    ///
    /// * `ray` - The ray.
    pub fn intersect(&self, ray: &Ray) -> Option<IntersectRecord> {
        let mut rec = IntersectRecord::default();
        if self.aggregate.intersect(ray, &mut rec) {
            Some(rec)
        } else {
            None
        }
    }

    /// Samples a point on some emitter for next-event estimation. The
    /// sample's density is clamped into [1e-5, 1e4] before use as a
    /// divisor.
    ///
    /// * `point` - Shading point.
    /// * `u0`    - Triangle-selection uniform number.
    /// * `u1`    - First barycentric uniform number.
    /// * `u2`    - Second barycentric uniform number.
    pub fn sample_light(&self, point: Vec3, u0: Float, u1: Float, u2: Float) -> Option<LightSample> {
        self.emitters.sample_light(point, u0, u1, u2).map(|mut s| {
            s.pdf = clamp(s.pdf, 1e-5, 1e4);
            s
        })
    }

    /// Density of light-sampling producing the given ray, for MIS
    /// weighting, clamped into [1e-3, 100].
    ///
    /// * `ray` - The incident ray.
    /// * `rec` - Intersection known to be on an emitter.
    pub fn light_pdf(&self, ray: &Ray, rec: &IntersectRecord) -> Float {
        clamp(self.emitters.sample_pdf(ray, rec), 1e-3, MAX_PDF_VALUE)
    }
}
