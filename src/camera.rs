//! Orbiting pinhole camera
//!
//! The cloud core only consumes rays; this is the host side that makes
//! them. The camera circles the box on the y axis at a fixed radius and
//! height, always looking at the orbit center, and turns pixel
//! coordinates into normalized world-space rays.

use crate::cloud::Ray;
use crate::math3d::Vec3;

pub struct Camera {
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    /// Half the vertical image plane extent at unit focal distance
    half_tan_fov: f32,
}

impl Camera {
    /// Camera at `position` looking at `target`, vertical FOV in degrees.
    pub fn look_at(position: Vec3, target: Vec3, fov_degrees: f32) -> Self {
        let forward = (target - position).normalize();
        // World up; degenerate only if the camera looks straight up/down,
        // which the orbit never does.
        let right = Vec3::new(0.0, 1.0, 0.0).cross(&forward).normalize();
        let up = forward.cross(&right);
        Self {
            position,
            forward,
            right,
            up,
            half_tan_fov: (fov_degrees.to_radians() * 0.5).tan(),
        }
    }

    /// Camera orbiting `target` at the given radius/height, `angle` radians
    /// around the y axis.
    pub fn orbiting(target: Vec3, radius: f32, height: f32, angle: f32) -> Self {
        let offset = Vec3::new(0.0, height, -radius).rotate_y(angle);
        Self::look_at(target + offset, target, 60.0)
    }

    /// Build the normalized ray through pixel (x, y) of a width x height
    /// image. Pixel centers sit at half-integer coordinates.
    pub fn ray_for_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let aspect = width as f32 / height as f32;
        // NDC in [-1, 1], y flipped so +y is up in world space
        let u = ((x as f32 + 0.5) / width as f32 * 2.0 - 1.0) * aspect;
        let v = 1.0 - (y as f32 + 0.5) / height as f32 * 2.0;

        let direction = (self.forward
            + self.right * (u * self.half_tan_fov)
            + self.up * (v * self.half_tan_fov))
            .normalize();
        Ray::new(self.position, direction)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}
