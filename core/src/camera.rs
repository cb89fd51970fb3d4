//! Pinhole camera and film-plane geometry.

use crate::common::*;
use crate::geometry::Ray;
use glam::{Vec2, Vec3};

/// A pinhole perspective camera. The film plane sits at the near distance;
/// its upper-left corner and per-pixel deltas are precomputed so primary
/// rays are a couple of fused multiply-adds per sample.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Eye position.
    pub pos: Vec3,

    /// Image resolution in pixels (width, height).
    pub resolution: (u32, u32),

    /// World position of the film's upper-left corner.
    up_left: Vec3,

    /// World-space step between horizontally adjacent pixels.
    delta_x: Vec3,

    /// World-space step between vertically adjacent pixels (points down the
    /// image).
    delta_y: Vec3,
}

impl Camera {
    /// Creates a camera.
    ///
    /// * `pos`        - Eye position.
    /// * `look_at`    - Point the camera faces.
    /// * `up`         - Approximate up direction.
    /// * `vfov`       - Vertical field of view in degrees.
    /// * `resolution` - Image resolution (width, height) in pixels.
    pub fn new(pos: Vec3, look_at: Vec3, up: Vec3, vfov: Float, resolution: (u32, u32)) -> Self {
        let near = 1.0;
        let aspect = resolution.0 as Float / resolution.1 as Float;

        let front = (look_at - pos).normalize();
        let right = front.cross(up).normalize();
        let true_up = right.cross(front);

        let half_height = (vfov.to_radians() * 0.5).tan() * near;
        let half_width = aspect * half_height;

        let up_left = pos + front * near - right * half_width + true_up * half_height;
        let delta_x = right * (2.0 * half_width / resolution.0 as Float);
        let delta_y = true_up * (-2.0 * half_height / resolution.1 as Float);

        Self {
            pos,
            resolution,
            up_left,
            delta_x,
            delta_y,
        }
    }

    /// Generates the primary ray through a film position given in
    /// continuous pixel coordinates (integer pixel index plus an in-pixel
    /// jitter offset).
    ///
    /// * `p` - Film position in pixels, origin at the upper-left corner.
    pub fn primary_ray(&self, p: Vec2) -> Ray {
        let target = self.up_left + p.x * self.delta_x + p.y * self.delta_y;
        Ray::new(self.pos, target - self.pos, EPSILON, INFINITY)
    }
}
