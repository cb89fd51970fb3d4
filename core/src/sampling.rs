//! Sampling routines shared by the BSDF layer and the integrator.

use crate::common::*;
use crate::spectrum::Spectrum;
use glam::{Vec2, Vec3};

/// Converts spherical coordinates to a Cartesian direction with `theta`
/// measured from the +z axis.
///
/// * `theta` - Polar angle.
/// * `phi`   - Azimuthal angle.
#[inline]
pub fn spherical_direction(theta: Float, phi: Float) -> Vec3 {
    let sin_theta = theta.sin();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), theta.cos())
}

/// Samples a cosine-weighted direction on the +z hemisphere.
///
/// * `u` - Two uniform random numbers in [0, 1).
#[inline]
pub fn cosine_sample_hemisphere(u: Vec2) -> Vec3 {
    let theta = u.x.sqrt().min(1.0).acos();
    let phi = TWO_PI * u.y;
    spherical_direction(theta, phi)
}

/// Pdf of `cosine_sample_hemisphere` for a direction with the given cosine.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Multiple-importance-sampling weight for the estimator with density `p1`
/// against a competing estimator with density `p2` (balance heuristic with
/// squared densities).
///
/// Panics on a NaN result; a 0/0 degeneracy here means an upstream guard
/// failed and continuing would silently corrupt the image.
///
/// * `p1` - Density of the estimator being weighted.
/// * `p2` - Density of the competing estimator.
#[inline]
pub fn mis_weight(p1: Float, p2: Float) -> Float {
    let w = p1 * p1 / (p1 * p1 + p2 * p2);
    if w.is_nan() {
        panic!("NaN MIS weight (p1 = {}, p2 = {})", p1, p2);
    }
    w
}

/// Russian-roulette survival probability for a path with the given
/// throughput.
#[inline]
pub fn rr_survival_probability(throughput: &Spectrum) -> Float {
    clamp(throughput.average() / 3.0, 0.2, 0.95)
}
