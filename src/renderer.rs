//! Frame renderer
//!
//! Walks every pixel, asks the camera for a ray, evaluates the cloud, and
//! composites the premultiplied result over a vertical sky gradient. Each
//! pixel is an independent pure evaluation, so scanlines render in
//! parallel across all cores with rayon.

use rayon::prelude::*;

use crate::camera::Camera;
use crate::cloud::{render_cloud, Aabb, CloudParams};
use crate::display::{write_pixel, PixelBuffer, BYTES_PER_PIXEL};
use crate::math3d::Vec3;
use crate::settings::CloudSettings;

const SKY_TOP: Vec3 = Vec3::new(0.25, 0.45, 0.75);
const SKY_BOTTOM: Vec3 = Vec3::new(0.65, 0.75, 0.9);

pub struct CloudRenderer {
    time: f32,
    orbit_angle: f32,
    pub settings: CloudSettings,
}

impl CloudRenderer {
    pub fn new(settings: CloudSettings) -> Self {
        Self {
            time: 0.0,
            orbit_angle: 0.0,
            settings,
        }
    }

    /// Advance animation time and camera orbit
    pub fn update(&mut self, dt: f32) {
        self.time += dt * self.settings.animation_speed;
        self.orbit_angle += dt * self.settings.orbit_speed;
    }

    /// Render one frame into the buffer
    pub fn render(&self, buffer: &mut PixelBuffer) {
        let width = buffer.width();
        let height = buffer.height();

        let aabb = self.settings.aabb();
        let params = self.settings.params();
        let time = self.time;

        // Orbit radius scales with the box so it always stays in frame
        let radius = aabb.size().max_component() * 2.2;
        let camera = Camera::orbiting(aabb.center(), radius, radius * 0.35, self.orbit_angle);

        let row_bytes = width as usize * BYTES_PER_PIXEL;
        buffer
            .pixels_mut()
            .par_chunks_exact_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                render_row(row, y as u32, width, height, &camera, &aabb, time, &params);
            });
    }
}

fn render_row(
    row: &mut [u8],
    y: u32,
    width: u32,
    height: u32,
    camera: &Camera,
    aabb: &Aabb,
    time: f32,
    params: &CloudParams,
) {
    let sky = SKY_TOP.lerp(&SKY_BOTTOM, y as f32 / height as f32);

    for x in 0..width {
        let ray = camera.ray_for_pixel(x, y, width, height);
        let (cloud_color, opacity) = render_cloud(&ray, aabb, time, params);

        // Premultiplied source-over: the cloud color already carries its
        // own alpha, so only the sky gets attenuated.
        let out = sky * (1.0 - opacity) + cloud_color;

        let px = &mut row[x as usize * BYTES_PER_PIXEL..(x as usize + 1) * BYTES_PER_PIXEL];
        write_pixel(
            px,
            to_channel(out.x),
            to_channel(out.y),
            to_channel(out.z),
        );
    }
}

#[inline]
fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_buffer_without_panicking() {
        let renderer = CloudRenderer::new(CloudSettings {
            steps: 8,
            ..CloudSettings::default()
        });
        let mut buffer = PixelBuffer::with_size(32, 24);
        renderer.render(&mut buffer);

        // Top row is pure sky: no part of the box projects there at the
        // default orbit framing, so it must match the gradient exactly.
        let sky = SKY_TOP.lerp(&SKY_BOTTOM, 0.0);
        let expected = (to_channel(sky.x), to_channel(sky.y), to_channel(sky.z));
        assert_eq!(buffer.get_pixel(0, 0), Some(expected));
    }

    #[test]
    fn test_update_advances_time() {
        let mut renderer = CloudRenderer::new(CloudSettings::default());
        renderer.update(1.0);
        assert!(renderer.time > 0.0);
        assert!(renderer.orbit_angle > 0.0);
    }

    #[test]
    fn test_to_channel_clamps() {
        assert_eq!(to_channel(-0.5), 0);
        assert_eq!(to_channel(2.0), 255);
        assert_eq!(to_channel(0.5), 127);
    }
}
