//! Emissive-triangle registry and light sampling.

use crate::common::*;
use crate::geometry::Ray;
use crate::interaction::IntersectRecord;
use crate::spectrum::Spectrum;
use glam::Vec3;

/// One emissive triangle, stored with world-space vertex data.
#[derive(Clone, Debug)]
pub struct EmitTriangle {
    /// World-space corner positions.
    pub positions: [Vec3; 3],

    /// World-space corner normals.
    pub normals: [Vec3; 3],

    /// Geometric normal pointing off the front (emitting) face.
    pub front_normal: Vec3,

    /// Emitted radiance.
    pub radiance: Spectrum,

    /// Selection weight: surface area times radiance luminance.
    pub weight: Float,
}

impl EmitTriangle {
    /// Creates an emissive triangle and derives its selection weight.
    ///
    /// * `positions`    - World-space corner positions.
    /// * `normals`      - World-space corner normals.
    /// * `front_normal` - Front-face geometric normal.
    /// * `radiance`     - Emitted radiance.
    pub fn new(
        positions: [Vec3; 3],
        normals: [Vec3; 3],
        front_normal: Vec3,
        radiance: Spectrum,
    ) -> Self {
        let area = 0.5
            * (positions[1] - positions[0])
                .cross(positions[2] - positions[0])
                .length();
        Self {
            positions,
            normals,
            front_normal: front_normal.normalize_or_zero(),
            radiance,
            weight: area * radiance.y(),
        }
    }
}

/// A light sample produced by the registry: a shadow ray toward the sampled
/// emitter point plus the quantities the integrator needs to estimate its
/// contribution.
#[derive(Clone, Debug)]
pub struct LightSample {
    /// Shadow ray from the shading point toward the sampled point.
    pub ray: Ray,

    /// Distance to the sampled point.
    pub dist: Float,

    /// Radiance scaled by the inverse solid-angle density.
    pub value: Spectrum,

    /// Solid-angle probability density of the sample.
    pub pdf: Float,
}

/// Indexes every emissive triangle in the scene. A prefix-sum over the
/// triangle weights drives importance-proportional selection in O(log n).
/// Rebuilt whenever the scene's emissive set changes.
#[derive(Debug, Default)]
pub struct EmitterRegistry {
    triangles: Vec<EmitTriangle>,
    /// `prefix[i]` = total weight of triangles before `i`; length n + 1.
    prefix: Vec<Float>,
    total_weight: Float,
}

impl EmitterRegistry {
    /// Builds the registry and its sampling distribution.
    ///
    /// * `triangles` - All emissive triangles of the scene.
    pub fn new(triangles: Vec<EmitTriangle>) -> Self {
        let mut prefix = Vec::with_capacity(triangles.len() + 1);
        prefix.push(0.0);
        let mut acc = 0.0;
        for tri in &triangles {
            acc += tri.weight;
            prefix.push(acc);
        }
        info!(
            "emitter registry: {} triangles, total weight {}",
            triangles.len(),
            acc
        );
        Self {
            triangles,
            prefix,
            total_weight: acc,
        }
    }

    /// Number of registered triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns whether the registry holds no emitters.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Sum of all selection weights.
    pub fn total_weight(&self) -> Float {
        self.total_weight
    }

    /// Samples a point on some emitter, importance-proportional to
    /// area x luminance. Returns `None` when no emitter exists or the
    /// sampled point faces away from the shading point; failure is ordinary
    /// control flow, not an error.
    ///
    /// * `point` - Shading point the sample is taken from.
    /// * `u0`    - Uniform number selecting the triangle.
    /// * `u1`    - First barycentric uniform number.
    /// * `u2`    - Second barycentric uniform number.
    pub fn sample_light(&self, point: Vec3, u0: Float, u1: Float, u2: Float) -> Option<LightSample> {
        if self.is_empty() || self.total_weight < EPSILON {
            return None;
        }

        let tri = &self.triangles[self.select(u0 * self.total_weight)];

        // fold into the unit triangle
        let (mut b1, mut b2) = (u1, u2);
        if b1 + b2 > 1.0 {
            b1 = 1.0 - b1;
            b2 = 1.0 - b2;
        }
        let b0 = 1.0 - b1 - b2;

        let light_pos = b0 * tri.positions[0] + b1 * tri.positions[1] + b2 * tri.positions[2];
        let light_normal =
            (b0 * tri.normals[0] + b1 * tri.normals[1] + b2 * tri.normals[2]).normalize();

        let to_light = light_pos - point;
        let dist = to_light.length();
        if dist < EPSILON {
            return None;
        }
        let dir = to_light / dist;

        let cos_light = light_normal.dot(-dir);
        if cos_light <= 0.0 {
            return None;
        }

        let luminance = tri.radiance.y();
        if luminance < EPSILON {
            return None;
        }
        let inv_pdf = self.total_weight * cos_light / (dist * dist * luminance);

        Some(LightSample {
            ray: Ray::new(point, dir, EPSILON, INFINITY),
            dist,
            value: tri.radiance * inv_pdf,
            pdf: 1.0 / inv_pdf,
        })
    }

    /// Deterministic counterpart of `sample_light` for MIS: the solid-angle
    /// density of the registry producing the direction of `ray` given that
    /// the ray's hit lies on an emitter.
    ///
    /// Panics when the ray does not face the hit normal; the caller claimed
    /// an emitter hit that geometry contradicts.
    ///
    /// * `ray` - The incident ray.
    /// * `rec` - Intersection already known to be on an emitter.
    pub fn sample_pdf(&self, ray: &Ray, rec: &IntersectRecord) -> Float {
        if ray.dir.dot(rec.normal) > 0.0 {
            panic!("emitter pdf queried with a ray facing away from the surface");
        }
        let radiance = rec
            .material
            .as_ref()
            .map(|m| m.emitted())
            .unwrap_or_else(|| panic!("emitter pdf queried for a hit without material"));

        if rec.t < EPSILON {
            return 0.0;
        }
        let cos_light = rec.normal.dot(-ray.dir).max(0.0);
        let g = cos_light / (rec.t * rec.t);
        radiance.y() / (self.total_weight * g)
    }

    /// First triangle whose cumulative weight reaches `target`.
    fn select(&self, target: Float) -> usize {
        let n = self.triangles.len();
        self.prefix[1..n].partition_point(|&p| p < target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::rng::Rng;
    use std::sync::Arc;

    fn quad_triangles(radiance: Spectrum) -> Vec<EmitTriangle> {
        // unit quad in the z = 1 plane, emitting downward (-z)
        let p = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        let n = [-Vec3::Z; 3];
        vec![
            EmitTriangle::new([p[0], p[2], p[1]], n, -Vec3::Z, radiance),
            EmitTriangle::new([p[0], p[3], p[2]], n, -Vec3::Z, radiance),
        ]
    }

    #[test]
    fn weight_is_area_times_luminance() {
        let tri = EmitTriangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::Z; 3],
            Vec3::Z,
            Spectrum::ONE,
        );
        assert!((tri.weight - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_registry_never_samples() {
        let reg = EmitterRegistry::new(vec![]);
        let mut rng = Rng::new(1);
        for _ in 0..100 {
            let s = reg.sample_light(
                Vec3::ZERO,
                rng.uniform_float(),
                rng.uniform_float(),
                rng.uniform_float(),
            );
            assert!(s.is_none());
        }
    }

    #[test]
    fn sample_points_lie_on_the_quad() {
        let reg = EmitterRegistry::new(quad_triangles(Spectrum::splat(5.0)));
        let mut rng = Rng::new(2);
        let from = Vec3::new(0.5, 0.5, 0.0);
        for _ in 0..1000 {
            let s = reg
                .sample_light(
                    from,
                    rng.uniform_float(),
                    rng.uniform_float(),
                    rng.uniform_float(),
                )
                .unwrap();
            let hit = s.ray.at(s.dist);
            assert!((hit.z - 1.0).abs() < 1e-4);
            assert!((-1e-4..=1.0 + 1e-4).contains(&hit.x));
            assert!((-1e-4..=1.0 + 1e-4).contains(&hit.y));
            assert!(s.pdf > 0.0);
            assert!(!s.value.has_nans());
        }
    }

    #[test]
    fn backside_sample_fails() {
        let reg = EmitterRegistry::new(quad_triangles(Spectrum::splat(5.0)));
        // shading point above the quad sees only its back face
        let s = reg.sample_light(Vec3::new(0.5, 0.5, 2.0), 0.3, 0.3, 0.3);
        assert!(s.is_none());
    }

    #[test]
    fn sample_pdf_matches_sampled_pdf() {
        let reg = EmitterRegistry::new(quad_triangles(Spectrum::splat(5.0)));
        let from = Vec3::new(0.5, 0.5, 0.0);
        let s = reg.sample_light(from, 0.4, 0.25, 0.25).unwrap();

        // rebuild the record the shadow ray would produce on the emitter
        let mtl = Arc::new(Material::emissive("light", Spectrum::splat(5.0)));
        let mut rec = IntersectRecord::default();
        rec.t = s.dist;
        rec.pos = s.ray.at(s.dist);
        rec.normal = -Vec3::Z;
        rec.material = Some(mtl);

        let pdf = reg.sample_pdf(&s.ray, &rec);
        assert!((pdf - s.pdf).abs() / s.pdf < 1e-3, "{} vs {}", pdf, s.pdf);
    }

    #[test]
    #[should_panic(expected = "facing away")]
    fn sample_pdf_misdirected_ray_panics() {
        let reg = EmitterRegistry::new(quad_triangles(Spectrum::splat(5.0)));
        let mut rec = IntersectRecord::default();
        rec.t = 1.0;
        rec.normal = Vec3::Z;
        let ray = Ray::new(Vec3::ZERO, Vec3::Z, 0.0, INFINITY);
        reg.sample_pdf(&ray, &rec);
    }

    #[test]
    fn selection_is_importance_proportional() {
        // second triangle carries 3x the weight of the first
        let bright = EmitTriangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::Z; 3],
            Vec3::Z,
            Spectrum::splat(3.0),
        );
        let dim = EmitTriangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::Z; 3],
            Vec3::Z,
            Spectrum::splat(1.0),
        );
        let reg = EmitterRegistry::new(vec![dim, bright]);
        assert_eq!(reg.select(0.1 * reg.total_weight()), 0);
        assert_eq!(reg.select(0.5 * reg.total_weight()), 1);
        assert_eq!(reg.select(0.99 * reg.total_weight()), 1);
    }
}
