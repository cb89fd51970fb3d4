//! Intersectable aggregate interface.

use crate::geometry::{Bounds3, Ray};
use crate::interaction::IntersectRecord;
use std::sync::Arc;

/// An intersectable piece of scene geometry. The scene's aggregate (the
/// top-level acceleration structure) implements this; the integrator never
/// sees anything more specific.
pub trait Primitive: Send + Sync {
    /// World-space bounding box.
    fn world_bound(&self) -> Bounds3;

    /// Finds the closest intersection inside the ray's acceptance range,
    /// updating the record. Returns whether a hit was found.
    ///
    /// * `ray` - The ray.
    /// * `rec` - Closest-hit record to update.
    fn intersect(&self, ray: &Ray, rec: &mut IntersectRecord) -> bool;
}

/// Shared reference to a primitive.
pub type ArcPrimitive = Arc<dyn Primitive>;
