//! Scattering functions.
//!
//! Materials are shaded through a weighted mixture of closed-form lobes. All
//! directions here are expressed in the local shading frame: z is the
//! ray-facing surface normal and `wo` points away from the surface toward
//! the viewer.

use crate::common::*;
use crate::material::{Material, MtlFlags};
use crate::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere, spherical_direction};
use crate::spectrum::Spectrum;
use glam::{Vec2, Vec3};

/// A BSDF value/density pair for one direction pair.
#[derive(Clone, Copy, Debug)]
pub struct BsdfEval {
    /// BSDF value.
    pub value: Spectrum,

    /// Solid-angle probability density of sampling `wi`.
    pub pdf: Float,
}

impl BsdfEval {
    const ZERO: Self = Self {
        value: Spectrum::ZERO,
        pdf: 0.0,
    };

    /// Returns whether the pair carries enough energy to continue a path:
    /// every channel and the density must sit above the numeric floor.
    pub fn above_floor(&self) -> bool {
        self.pdf >= EPSILON && self.value.min_component() >= EPSILON
    }
}

/// Reflects `wo` about the local normal (the z axis).
#[inline]
fn reflect_z(wo: Vec3) -> Vec3 {
    Vec3::new(-wo.x, -wo.y, wo.z)
}

/// A single scattering lobe.
#[derive(Clone, Debug)]
pub enum Lobe {
    /// Ideal diffuse reflection.
    Lambert {
        /// Diffuse reflectance.
        albedo: Spectrum,
    },

    /// Perfect specular reflection.
    Mirror {
        /// Specular reflectance.
        albedo: Spectrum,
    },

    /// Glossy Blinn-Phong reflection.
    BlinnPhong {
        /// Specular reflectance.
        ks: Spectrum,
        /// Phong exponent.
        exponent: Float,
    },
}

impl Lobe {
    /// Energy estimate used for mixture lobe selection: the sum of the
    /// lobe's reflectance channels.
    pub fn selection_weight(&self) -> Float {
        match self {
            Lobe::Lambert { albedo } | Lobe::Mirror { albedo } => albedo.sum(),
            Lobe::BlinnPhong { ks, .. } => ks.sum(),
        }
    }

    /// Whether BSDF-sampling contributions through this lobe must be
    /// MIS-weighted against light sampling.
    pub fn needs_mis(&self) -> bool {
        !matches!(self, Lobe::Lambert { .. })
    }

    /// Whether this lobe is a delta reflection.
    pub fn is_perfect_mirror(&self) -> bool {
        matches!(self, Lobe::Mirror { .. })
    }

    /// Samples an incident direction for the given outgoing direction.
    ///
    /// * `wo` - Outgoing direction, local space.
    /// * `u`  - Two uniform random numbers.
    pub fn sample(&self, wo: Vec3, u: Vec2) -> Vec3 {
        match self {
            Lobe::Lambert { .. } => cosine_sample_hemisphere(u),
            Lobe::Mirror { .. } => reflect_z(wo),
            Lobe::BlinnPhong { exponent, .. } => {
                // sample the half-vector, then reflect wo about it
                let cos_theta_h = u.x.powf(1.0 / (exponent + 2.0));
                let h = spherical_direction(cos_theta_h.min(1.0).acos(), TWO_PI * u.y);
                2.0 * wo.dot(h) * h - wo
            }
        }
    }

    /// Evaluates the lobe's value and sampling density for a direction pair.
    ///
    /// * `wo` - Outgoing direction, local space.
    /// * `wi` - Incident direction, local space.
    pub fn evaluate(&self, wo: Vec3, wi: Vec3) -> BsdfEval {
        match self {
            Lobe::Lambert { albedo } => {
                if wi.z <= 0.0 || wo.z <= 0.0 {
                    return BsdfEval::ZERO;
                }
                BsdfEval {
                    value: *albedo * INV_PI,
                    pdf: cosine_hemisphere_pdf(wi.z),
                }
            }
            Lobe::Mirror { albedo } => {
                if wi.z <= EPSILON || (wi - reflect_z(wo)).length_squared() > 1e-8 {
                    return BsdfEval::ZERO;
                }
                BsdfEval {
                    value: *albedo,
                    pdf: 1.0,
                }
            }
            Lobe::BlinnPhong { ks, exponent } => {
                if wi.z <= 0.0 || wo.z <= 0.0 {
                    return BsdfEval::ZERO;
                }
                let h = (wo + wi).normalize();
                let wo_dot_h = wo.dot(h);
                if wo_dot_h < EPSILON {
                    return BsdfEval::ZERO;
                }
                let density = (exponent + 2.0) * 0.5 * INV_PI * h.z.max(0.0).powf(*exponent);
                let coef = 0.25 / wo_dot_h;
                BsdfEval {
                    value: *ks * (density * coef),
                    pdf: density * h.z * coef,
                }
            }
        }
    }
}

/// The lobe picked for one shading event, threaded explicitly between
/// `sample` and `evaluate`.
#[derive(Clone, Copy, Debug)]
pub struct LobeChoice {
    index: usize,
}

/// A probabilistic mixture of scattering lobes, built fresh per
/// intersection from the hit material and discarded after one bounce.
#[derive(Debug)]
pub struct BsdfMixture {
    lobes: Vec<Lobe>,
    /// Normalized lobe weights.
    weights: Vec<Float>,
    /// Cumulative distribution over the weights; `cdf[0] = 0`,
    /// `cdf[n] = 1`.
    cdf: Vec<Float>,
}

impl BsdfMixture {
    /// Builds a mixture from an explicit lobe list.
    ///
    /// * `lobes` - The lobes; must be non-empty.
    pub fn new(lobes: Vec<Lobe>) -> Self {
        assert!(!lobes.is_empty(), "BSDF mixture needs at least one lobe");

        let raw: Vec<Float> = lobes.iter().map(|l| l.selection_weight()).collect();
        let total: Float = raw.iter().sum();
        let weights: Vec<Float> = if total < EPSILON {
            // all-black lobes still need a valid distribution
            vec![1.0 / lobes.len() as Float; lobes.len()]
        } else {
            raw.iter().map(|w| w / total).collect()
        };

        let mut cdf = Vec::with_capacity(weights.len() + 1);
        cdf.push(0.0);
        let mut acc = 0.0;
        for w in &weights {
            acc += w;
            cdf.push(acc);
        }
        let last = cdf.len() - 1;
        cdf[last] = 1.0;

        Self { lobes, weights, cdf }
    }

    /// Assembles the mixture a material's component flags call for: a
    /// Lambert lobe for the diffuse component, and either a perfect mirror
    /// (specular alone) or a Blinn-Phong lobe (specular over diffuse) for
    /// the specular component. Emission flags do not scatter. A material
    /// with no scattering flags degrades to a Lambert lobe over its diffuse
    /// reflectance.
    ///
    /// * `material` - The hit material.
    pub fn from_material(material: &Material) -> Self {
        let mut lobes = Vec::with_capacity(2);
        if material.flags.contains(MtlFlags::DIFFUSE) {
            lobes.push(Lobe::Lambert {
                albedo: material.diffuse,
            });
        }
        if material.flags.contains(MtlFlags::SPECULAR) {
            if material.flags.contains(MtlFlags::DIFFUSE) {
                lobes.push(Lobe::BlinnPhong {
                    ks: material.specular,
                    exponent: material.shininess,
                });
            } else {
                lobes.push(Lobe::Mirror {
                    albedo: material.specular,
                });
            }
        }
        if lobes.is_empty() {
            lobes.push(Lobe::Lambert {
                albedo: material.diffuse,
            });
        }
        Self::new(lobes)
    }

    /// Number of lobes in the mixture.
    pub fn num_lobes(&self) -> usize {
        self.lobes.len()
    }

    /// Selects a lobe by inverse-CDF binary search.
    ///
    /// * `u` - A uniform random number.
    pub fn choose(&self, u: Float) -> LobeChoice {
        let index = self.cdf[1..self.cdf.len() - 1].partition_point(|&c| c < u);
        LobeChoice { index }
    }

    /// Returns the chosen lobe.
    pub fn lobe(&self, choice: LobeChoice) -> &Lobe {
        &self.lobes[choice.index]
    }

    /// Samples an incident direction from the chosen lobe.
    ///
    /// * `choice` - Lobe chosen for this shading event.
    /// * `wo`     - Outgoing direction, local space.
    /// * `u`      - Two uniform random numbers.
    pub fn sample(&self, choice: LobeChoice, wo: Vec3, u: Vec2) -> Vec3 {
        self.lobes[choice.index].sample(wo, u)
    }

    /// Evaluates the chosen lobe for a direction pair. With more than one
    /// lobe the value is rescaled by selection weight over selection
    /// probability, keeping the mixture an unbiased estimator of the
    /// weighted lobe combination.
    ///
    /// * `choice` - Lobe chosen for this shading event.
    /// * `wo`     - Outgoing direction, local space.
    /// * `wi`     - Incident direction, local space.
    pub fn evaluate(&self, choice: LobeChoice, wo: Vec3, wi: Vec3) -> BsdfEval {
        let i = choice.index;
        let mut eval = self.lobes[i].evaluate(wo, wi);
        if self.lobes.len() > 1 {
            let prob = self.cdf[i + 1] - self.cdf[i];
            if prob > 0.0 {
                eval.value *= self.weights[i] / prob;
            }
        }
        eval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;
    use float_cmp::approx_eq;

    fn local(wo: (Float, Float, Float)) -> Vec3 {
        Vec3::new(wo.0, wo.1, wo.2).normalize()
    }

    #[test]
    fn lambert_value_and_pdf() {
        let lobe = Lobe::Lambert {
            albedo: Spectrum::ONE,
        };
        let wo = local((0.0, 0.0, 1.0));
        let wi = local((0.3, 0.1, 0.9));
        let e = lobe.evaluate(wo, wi);
        assert!(approx_eq!(Float, e.value[0], INV_PI, epsilon = 1e-6));
        assert!(approx_eq!(Float, e.pdf, wi.z * INV_PI, epsilon = 1e-6));
        assert!(!lobe.needs_mis());
    }

    #[test]
    fn lambert_below_horizon_is_zero() {
        let lobe = Lobe::Lambert {
            albedo: Spectrum::ONE,
        };
        let e = lobe.evaluate(Vec3::Z, local((0.0, 0.0, -1.0)));
        assert!(e.value.is_black());
        assert_eq!(e.pdf, 0.0);
    }

    #[test]
    fn mirror_reflects_exactly() {
        let lobe = Lobe::Mirror {
            albedo: Spectrum::splat(0.9),
        };
        let wo = local((0.5, -0.2, 0.8));
        let wi = lobe.sample(wo, Vec2::ZERO);
        assert!(approx_eq!(Float, wi.z, wo.z, epsilon = 1e-6));
        let e = lobe.evaluate(wo, wi);
        assert_eq!(e.pdf, 1.0);
        assert!(approx_eq!(Float, e.value[0], 0.9, epsilon = 1e-6));
        // any other direction evaluates to zero
        let off = lobe.evaluate(wo, local((0.0, 0.0, 1.0)));
        assert_eq!(off.pdf, 0.0);
        assert!(lobe.needs_mis());
        assert!(lobe.is_perfect_mirror());
    }

    #[test]
    fn blinn_phong_sample_eval_consistent() {
        let lobe = Lobe::BlinnPhong {
            ks: Spectrum::splat(0.8),
            exponent: 64.0,
        };
        let wo = local((0.2, 0.1, 0.95));
        let mut rng = Rng::new(5);
        let mut valid = 0;
        for _ in 0..200 {
            let u = Vec2::new(rng.uniform_float(), rng.uniform_float());
            let wi = lobe.sample(wo, u);
            let e = lobe.evaluate(wo, wi);
            if wi.z > 0.0 {
                assert!(e.pdf > 0.0);
                valid += 1;
            } else {
                assert_eq!(e.pdf, 0.0);
            }
        }
        // a tight exponent keeps most samples above the horizon
        assert!(valid > 150);
    }

    // A unit-albedo diffuse lobe with cosine sampling contributes exactly
    // value * cos / pdf = 1 per bounce, so path throughput stays at 1.
    #[test]
    fn unit_albedo_diffuse_throughput_is_one() {
        let lobe = Lobe::Lambert {
            albedo: Spectrum::ONE,
        };
        let wo = local((0.1, 0.2, 0.9));
        let mut rng = Rng::new(23);
        for _ in 0..500 {
            let u = Vec2::new(rng.uniform_float(), rng.uniform_float());
            let wi = lobe.sample(wo, u);
            let e = lobe.evaluate(wo, wi);
            if e.pdf > 0.0 {
                let weight = e.value[0] * wi.z / e.pdf;
                assert!(approx_eq!(Float, weight, 1.0, epsilon = 1e-4));
            }
        }
    }

    // A mirror bounce carries f * cos / pdf = albedo * cos, so grazing
    // reflections lose energy.
    #[test]
    fn mirror_bounce_dims_by_cosine() {
        let lobe = Lobe::Mirror {
            albedo: Spectrum::splat(0.8),
        };
        let cos_45 = std::f32::consts::FRAC_1_SQRT_2;
        let wo = local((cos_45, 0.0, cos_45));
        let wi = lobe.sample(wo, Vec2::ZERO);
        let e = lobe.evaluate(wo, wi);
        assert!(approx_eq!(Float, e.value[0], 0.8, epsilon = 1e-6));
        let throughput = e.value[0] * wi.z / e.pdf;
        assert!(approx_eq!(Float, throughput, 0.8 * cos_45, epsilon = 1e-5));
    }

    #[test]
    fn mixture_cdf_is_normalized() {
        let m = BsdfMixture::new(vec![
            Lobe::Lambert {
                albedo: Spectrum::new(0.5, 0.5, 0.5),
            },
            Lobe::BlinnPhong {
                ks: Spectrum::new(0.25, 0.25, 0.25),
                exponent: 32.0,
            },
        ]);
        assert_eq!(m.num_lobes(), 2);
        assert_eq!(*m.cdf.first().unwrap(), 0.0);
        assert_eq!(*m.cdf.last().unwrap(), 1.0);
        // weights 1.5 : 0.75 normalize to 2/3 : 1/3
        assert!(approx_eq!(Float, m.weights[0], 2.0 / 3.0, epsilon = 1e-6));
        assert!(m.choose(0.1).index == 0);
        assert!(m.choose(0.99).index == 1);
    }

    #[test]
    fn choose_matches_selection_frequency() {
        let m = BsdfMixture::new(vec![
            Lobe::Lambert {
                albedo: Spectrum::splat(0.9),
            },
            Lobe::BlinnPhong {
                ks: Spectrum::splat(0.1),
                exponent: 8.0,
            },
        ]);
        let mut rng = Rng::new(17);
        let trials = 50_000;
        let first = (0..trials)
            .filter(|_| m.choose(rng.uniform_float()).index == 0)
            .count();
        let freq = first as Float / trials as Float;
        assert!((freq - 0.9).abs() < 0.01, "selection frequency {}", freq);
    }

    #[test]
    fn from_material_composition() {
        let d = Material::diffuse("d", Spectrum::splat(0.5));
        assert_eq!(BsdfMixture::from_material(&d).num_lobes(), 1);

        let mirror = Material::mirror("m", Spectrum::splat(0.9));
        let mm = BsdfMixture::from_material(&mirror);
        assert!(mm.lobe(mm.choose(0.5)).is_perfect_mirror());

        let glossy = Material::glossy("g", Spectrum::splat(0.6), Spectrum::splat(0.3), 32.0);
        let gm = BsdfMixture::from_material(&glossy);
        assert_eq!(gm.num_lobes(), 2);
        assert!(!gm.lobe(gm.choose(0.0)).is_perfect_mirror());
    }

    #[test]
    fn all_black_material_still_selects() {
        let m = BsdfMixture::from_material(&Material::emissive("l", Spectrum::splat(5.0)));
        let c = m.choose(0.5);
        let e = m.evaluate(c, Vec3::Z, Vec3::Z);
        assert!(e.value.is_black());
    }
}
