//! Local shading frames.

use glam::Vec3;

/// An orthonormal tangent frame with the surface normal as its z axis,
/// built with the branchless construction of Duff et al.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    /// Tangent.
    pub t: Vec3,

    /// Bitangent.
    pub b: Vec3,

    /// Normal (local z).
    pub n: Vec3,
}

impl Frame {
    /// Builds a frame around a unit normal.
    ///
    /// * `n` - Unit surface normal.
    pub fn from_normal(n: Vec3) -> Self {
        let sign = 1.0_f32.copysign(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        Self {
            t: Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
            b: Vec3::new(b, sign + n.y * n.y * a, -n.y),
            n,
        }
    }

    /// Expresses a world-space direction in this frame.
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.t), v.dot(self.b), v.dot(self.n))
    }

    /// Expresses a frame-local direction in world space.
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        v.x * self.t + v.y * self.b + v.z * self.n
    }
}
