//! RGB spectrum.

use crate::common::*;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Sub};

/// Default spectrum representation.
pub type Spectrum = RGBSpectrum;

/// A radiometric quantity carried as linear RGB coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// The RGB coefficients.
    c: [Float; 3],
}

impl RGBSpectrum {
    /// Black.
    pub const ZERO: Self = Self { c: [0.0; 3] };

    /// Unit white.
    pub const ONE: Self = Self { c: [1.0; 3] };

    /// Creates a spectrum from RGB coefficients.
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Creates a spectrum with all channels set to `v`.
    pub fn splat(v: Float) -> Self {
        Self { c: [v; 3] }
    }

    /// Returns whether all channels are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns whether any channel is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns the Rec. 709 luminance of the spectrum.
    pub fn y(&self) -> Float {
        0.2126 * self.c[0] + 0.7152 * self.c[1] + 0.0722 * self.c[2]
    }

    /// Returns the sum of the channels.
    pub fn sum(&self) -> Float {
        self.c[0] + self.c[1] + self.c[2]
    }

    /// Returns the mean of the channels.
    pub fn average(&self) -> Float {
        self.sum() / 3.0
    }

    /// Returns the largest channel value.
    pub fn max_component(&self) -> Float {
        self.c[0].max(self.c[1]).max(self.c[2])
    }

    /// Returns the smallest channel value.
    pub fn min_component(&self) -> Float {
        self.c[0].min(self.c[1]).min(self.c[2])
    }

    /// Decodes sRGB-authored coefficients to linear.
    pub fn srgb_to_linear(&self) -> Self {
        Self {
            c: [
                srgb_to_linear(self.c[0]),
                srgb_to_linear(self.c[1]),
                srgb_to_linear(self.c[2]),
            ],
        }
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Float {
        &self.c[i]
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.c[0] + rhs.c[0], self.c[1] + rhs.c[1], self.c[2] + rhs.c[2])
    }
}

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.c[0] - rhs.c[0], self.c[1] - rhs.c[1], self.c[2] - rhs.c[2])
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.c[0] * rhs.c[0], self.c[1] * rhs.c[1], self.c[2] * rhs.c[2])
    }
}

impl MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self::new(self.c[0] * rhs, self.c[1] * rhs, self.c[2] * rhs)
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        rhs * self
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        *self = *self * rhs;
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        debug_assert!(rhs != 0.0);
        self * (1.0 / rhs)
    }
}

impl DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, rhs: Float) {
        *self = *self / rhs;
    }
}
