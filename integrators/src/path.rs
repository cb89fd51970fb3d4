//! Unidirectional path tracing.

use luma_core::common::*;
use luma_core::geometry::Ray;
use luma_core::reflection::BsdfMixture;
use luma_core::sampler::Sampler;
use luma_core::sampling::{mis_weight, rr_survival_probability};
use luma_core::scene::Scene;
use luma_core::spectrum::Spectrum;

/// Radiance and diagnostics for one camera sample.
#[derive(Clone, Copy, Debug)]
pub struct PathSample {
    /// Estimated radiance along the primary ray.
    pub radiance: Spectrum,

    /// Number of path vertices shaded before termination.
    pub depth: u32,
}

/// Path tracer combining light sampling (next-event estimation) with
/// BSDF sampling.
///
/// Each vertex draws one lobe from the hit material's mixture and uses that
/// lobe for both strategies of the bounce. Diffuse lobes rely on light
/// sampling alone for direct illumination; glossy and specular lobes
/// additionally collect emitters found by BSDF sampling, weighted by
/// multiple importance sampling (a perfect mirror cannot be reached by
/// light sampling, so its emitter hits count at full weight). Paths end at
/// emitters, at the depth limit, or when the sampled lobe carries no more
/// energy; with no depth limit Russian roulette bounds the length instead.
pub struct PathIntegrator {
    /// Maximum path depth; non-positive means unbounded with Russian
    /// roulette.
    max_depth: i32,

    /// Shadow rays cast per path vertex.
    light_split: usize,
}

impl PathIntegrator {
    /// Creates a path integrator.
    ///
    /// * `max_depth`   - Maximum path depth; non-positive enables Russian
    ///                   roulette instead.
    /// * `light_split` - Shadow rays per path vertex.
    pub fn new(max_depth: i32, light_split: usize) -> Self {
        Self {
            max_depth,
            light_split: light_split.max(1),
        }
    }

    /// Estimates the radiance arriving along a primary ray.
    ///
    /// * `primary` - Camera ray.
    /// * `scene`   - The scene.
    /// * `sampler` - Sample source for every random decision on the path.
    pub fn li(&self, primary: &Ray, scene: &Scene, sampler: &mut dyn Sampler) -> PathSample {
        let mut radiance = Spectrum::ZERO;
        let mut throughput = Spectrum::ONE;
        let mut depth: i32 = 0;

        let mut ray = primary.clone();
        let mut rec = match scene.intersect(&ray) {
            Some(rec) => rec,
            None => {
                return PathSample {
                    radiance,
                    depth: 0,
                }
            }
        };

        loop {
            depth += 1;
            if self.max_depth > 0 && depth > self.max_depth {
                break;
            }

            let mtl = match rec.material.clone() {
                Some(mtl) => mtl,
                None => panic!("intersection at {:?} carries no material", rec.pos),
            };

            // Emitters seen directly by the camera; later vertices pick up
            // emission through the sampling strategies below.
            if depth == 1 && mtl.is_emissive() && ray.dir.dot(rec.normal) < 0.0 {
                radiance += throughput * mtl.emitted();
            }

            let frame = rec.shading_frame();
            let wo = frame.to_local(-ray.dir);
            let mixture = BsdfMixture::from_material(&mtl);
            let choice = mixture.choose(sampler.get_1d());
            let lobe_needs_mis = mixture.lobe(choice).needs_mis();

            let offset_pos = rec.pos + rec.normal * SHADOW_BIAS;

            // Next-event estimation. Skipped on emitters, whose radiance is
            // already accounted for.
            if !rec.is_emitter() {
                let mut direct = Spectrum::ZERO;
                for _ in 0..self.light_split {
                    let u0 = sampler.get_1d();
                    let u = sampler.get_2d();
                    let sample = match scene.sample_light(offset_pos, u0, u.x, u.y) {
                        Some(sample) => sample,
                        None => continue,
                    };
                    let shadow_rec = match scene.intersect(&sample.ray) {
                        Some(shadow_rec) => shadow_rec,
                        None => continue,
                    };
                    // occluded unless the shadow ray lands on the sampled point
                    if (shadow_rec.t - sample.dist).abs() >= sample.dist * 0.01 {
                        continue;
                    }
                    let wi = frame.to_local(sample.ray.dir);
                    let eval = mixture.evaluate(choice, wo, wi);
                    if eval.value.is_black() {
                        continue;
                    }
                    let weight = if lobe_needs_mis {
                        mis_weight(sample.pdf, eval.pdf)
                    } else {
                        1.0
                    };
                    direct += eval.value * sample.value * (wi.z.max(0.0) * weight);
                }
                radiance += throughput * direct * (1.0 / self.light_split as Float);
            }

            // BSDF sampling continues the path.
            let wi = mixture.sample(choice, wo, sampler.get_2d());
            let eval = mixture.evaluate(choice, wo, wi);
            if !eval.above_floor() {
                break;
            }
            throughput *= eval.value * (wi.z.max(0.0) / eval.pdf);

            ray = Ray::new(offset_pos, frame.to_world(wi), EPSILON, INFINITY);
            rec = match scene.intersect(&ray) {
                Some(next) => next,
                None => break,
            };

            // A light source ends the path; its emission counts only for
            // lobes whose BSDF-sampled emitter hits are not already covered
            // by light sampling.
            if rec.is_emitter() {
                if lobe_needs_mis && ray.dir.dot(rec.normal) < 0.0 {
                    let weight = if mixture.lobe(choice).is_perfect_mirror() {
                        1.0
                    } else {
                        mis_weight(eval.pdf, scene.light_pdf(&ray, &rec))
                    };
                    let emitted = rec
                        .material
                        .as_ref()
                        .map_or(Spectrum::ZERO, |m| m.emitted());
                    radiance += throughput * emitted * weight;
                }
                break;
            }

            if self.max_depth <= 0 {
                let p = rr_survival_probability(&throughput);
                if sampler.get_1d() >= p {
                    break;
                }
                throughput *= 1.0 / p;
            }
        }

        PathSample {
            radiance,
            depth: depth.max(0) as u32,
        }
    }
}
