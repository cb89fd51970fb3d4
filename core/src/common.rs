//! Common types, constants and small numeric helpers.

/// Use 32-bit precision for rendering computations.
pub type Float = f32;

/// Infinity.
pub const INFINITY: Float = Float::INFINITY;

/// PI
pub const PI: Float = std::f32::consts::PI;

/// 2 * PI
pub const TWO_PI: Float = 2.0 * PI;

/// 1 / PI
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;

/// General-purpose numeric floor below which a value is treated as zero.
pub const EPSILON: Float = 1e-6;

/// Amount by which bounding boxes are enlarged at build time to absorb
/// floating-point error.
pub const BOX_EPSILON: Float = 0.001;

/// Offset applied along the surface normal when spawning secondary rays, to
/// avoid self-intersection.
pub const SHADOW_BIAS: Float = 0.001;

/// Largest probability density accepted when evaluating a light pdf for
/// multiple importance sampling.
pub const MAX_PDF_VALUE: Float = 100.0;

/// 1 - epsilon in `Float` precision.
pub const ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1");

/// Clamps a value into `[low, high]`.
///
/// * `val`  - The value.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
#[inline]
pub fn clamp(val: Float, low: Float, high: Float) -> Float {
    val.max(low).min(high)
}

/// Linearly interpolates between two values.
///
/// * `t`  - Interpolation parameter.
/// * `p0` - Value at t = 0.
/// * `p1` - Value at t = 1.
#[inline]
pub fn lerp(t: Float, p0: Float, p1: Float) -> Float {
    (1.0 - t) * p0 + t * p1
}

/// Encodes a linear channel value for an 8-bit display using a power 1/2.2
/// transfer curve.
///
/// * `value` - Linear channel value.
#[inline]
pub fn gamma_encode(value: Float) -> u8 {
    (255.0 * clamp(value, 0.0, 1.0).powf(1.0 / 2.2)) as u8
}

/// Decodes an sRGB-authored channel value to linear (power 2.2).
///
/// * `value` - Gamma-encoded channel value in [0, 1].
#[inline]
pub fn srgb_to_linear(value: Float) -> Float {
    value.powf(2.2)
}
