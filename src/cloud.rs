//! Volumetric Cloud Core
//!
//! Raymarches a noise-driven density field confined to an axis-aligned box
//! and produces a premultiplied color plus an opacity in [0,1]. Pure
//! functions throughout: one call per pixel, no state between calls, safe
//! to evaluate from any number of threads at once.
//!
//! Pipeline: slab-test the ray against the box to bound the integration
//! interval, walk it in fixed steps sampling density at mid-step points,
//! accumulate density * step_size (a Riemann sum of the optical depth),
//! then clamp to opacity and premultiply the cloud color.

use crate::math3d::Vec3;
use crate::noise::{fbm, noise3d};

/// Density threshold for the edge-faded form; fBm below this carves
/// empty space between cloud puffs.
const PUFF_THRESHOLD: f32 = 0.35;

/// How fast the edge fade ramps from the box face toward the interior.
const EDGE_FADE_SHARPNESS: f32 = 4.0;

/// A ray with origin and direction.
/// The direction is assumed pre-normalized by the caller; nothing here
/// renormalizes it.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point along the ray at parameter t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned box in world space. Callers supply `min <= max` per axis.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Ray parameter range inside a box. `entry` is already clamped to >= 0,
/// so a camera inside the box integrates from its own position.
/// A zero-length interval (`exit == entry`) is a valid grazing hit.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub entry: f32,
    pub exit: f32,
}

/// Tunable cloud parameters, constant for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CloudParams {
    /// Number of raymarch steps (>= 1, caller's responsibility)
    pub steps: u32,
    /// Multiplier on the radial falloff sharpness
    pub density_scale: f32,
    /// Exponent on the radial falloff distance
    pub density_power: f32,
    /// Noise frequency multiplier
    pub noise_scale: f32,
    /// Base cloud color, linear RGB
    pub color: Vec3,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            steps: 64,
            density_scale: 2.0,
            density_power: 2.0,
            noise_scale: 1.0,
            color: Vec3::splat(1.0),
        }
    }
}

/// Slab-test a ray against an axis-aligned box.
///
/// Per axis, the two plane crossings are `(min - origin) / d` and
/// `(max - origin) / d`. A zero direction component divides to +/-
/// infinity, which flows through the min/max chain instead of needing a
/// special case (and f32 min/max drop NaN operands, so an origin exactly
/// on a degenerate slab resolves too). Returns `None` on a miss.
pub fn intersect(aabb: &Aabb, ray: &Ray) -> Option<Interval> {
    let t0 = (aabb.min - ray.origin).div_comp(&ray.direction);
    let t1 = (aabb.max - ray.origin).div_comp(&ray.direction);

    let near = t0.min_comp(&t1);
    let far = t0.max_comp(&t1);

    // Entry never goes negative: a camera inside the box starts at itself.
    let entry = near.max_component().max(0.0);
    let exit = far.min_component();

    if exit < entry {
        None
    } else {
        Some(Interval { entry, exit })
    }
}

/// Edge-faded fBm density, a standalone density shaper.
///
/// `local` is a box-relative position in [-0.5, 0.5] per axis. Density
/// fades to zero approaching any box face, and fBm below the puff
/// threshold is carved away entirely so the cloud breaks into distinct
/// lumps instead of filling the box. Not wired into the integrator;
/// kept as an alternative look for the density field.
pub fn density_edge_faded(local: Vec3) -> f32 {
    let edge_dist = Vec3::splat(0.5) - local.abs();
    let edge_fade = (edge_dist.min_component() * EDGE_FADE_SHARPNESS).clamp(0.0, 1.0);
    let raw = fbm(local);
    (raw - PUFF_THRESHOLD).clamp(0.0, 1.0) * edge_fade
}

/// Radial-falloff density, the form the integrator marches.
///
/// Noise is sampled in world space so the cloud texture stays put when
/// the box moves; `time` slides the sample point along x only, drifting
/// the field sideways. The falloff term is a soft exponential over the
/// Chebyshev distance from the box center (0 at center, 1 at the faces).
pub fn density_radial(world: Vec3, local: Vec3, time: f32, params: &CloudParams) -> f32 {
    let drift = Vec3::new(time / params.noise_scale, 0.0, 0.0);
    let noise_sample = noise3d((world + drift) * params.noise_scale);

    let dist = local.abs().max_component() * 2.0;
    (-dist.powf(params.density_power) * params.density_scale).exp() * noise_sample
}

/// March the ray through the box, integrating the radial-falloff density.
///
/// Fixed step count; each sample sits at the middle of its step, which
/// cuts banding compared to endpoint sampling. Returns the accumulated
/// optical depth (0.0 on a miss). Weighting each sample by the step size
/// keeps the result roughly invariant to the step count.
pub fn march(ray: &Ray, aabb: &Aabb, time: f32, params: &CloudParams) -> f32 {
    let Some(interval) = intersect(aabb, ray) else {
        return 0.0;
    };

    let center = aabb.center();
    let size = aabb.size();
    let step_size = (interval.exit - interval.entry) / params.steps as f32;

    let mut total = 0.0;
    for i in 0..params.steps {
        let t = interval.entry + (i as f32 + 0.5) * step_size;
        let world = ray.at(t);
        let local = (world - center).div_comp(&size);
        total += density_radial(world, local, time, params) * step_size;
    }
    total
}

/// Convert accumulated density to a premultiplied color and opacity.
/// Downstream compositing must not multiply by alpha again.
#[inline]
pub fn shade(accumulated: f32, color: Vec3) -> (Vec3, f32) {
    let opacity = accumulated.clamp(0.0, 1.0);
    (color * opacity, opacity)
}

/// Single entry point: evaluate the cloud for one ray.
/// Returns `(premultiplied color, opacity)`; a miss is transparent black.
pub fn render_cloud(ray: &Ray, aabb: &Aabb, time: f32, params: &CloudParams) -> (Vec3, f32) {
    shade(march(ray, aabb, time, params), params.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Rng;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_intersect_head_on() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = intersect(&unit_box(), &ray).unwrap();
        assert!((hit.entry - 4.0).abs() < 1e-5);
        assert!((hit.exit - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect(&unit_box(), &ray).is_none());
    }

    #[test]
    fn test_intersect_parallel_offset_misses() {
        // Parallel to the box with a zero direction component: the
        // infinite slab times must not corrupt the min/max chain.
        let ray = Ray::new(Vec3::new(0.0, 3.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect(&unit_box(), &ray).is_none());
    }

    #[test]
    fn test_intersect_parallel_inside_slab_hits() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = intersect(&unit_box(), &ray).unwrap();
        assert!((hit.entry - 4.0).abs() < 1e-5);
        assert!((hit.exit - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_origin_inside_clamps_entry() {
        let ray = Ray::new(Vec3::new(0.25, -0.5, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = intersect(&unit_box(), &ray).unwrap();
        assert_eq!(hit.entry, 0.0);
        assert!((hit.exit - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_grazing_edge_is_zero_length_hit() {
        // Diagonal ray touching the box exactly at the (1, 1, z) edge:
        // the x slab is exited the instant the y slab is entered.
        let dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), dir);
        let hit = intersect(&unit_box(), &ray).unwrap();
        assert_eq!(hit.entry, hit.exit);
        assert!(ray.at(hit.entry).approx_eq(&Vec3::new(1.0, 1.0, 0.0), 1e-4));
    }

    #[test]
    fn test_intersect_diagonal() {
        let dir = Vec3::new(1.0, 1.0, 1.0).normalize();
        let ray = Ray::new(Vec3::splat(-5.0), dir);
        let hit = intersect(&unit_box(), &ray).unwrap();
        // Enters at (-1,-1,-1), leaves at (1,1,1)
        assert!(ray.at(hit.entry).approx_eq(&Vec3::splat(-1.0), 1e-4));
        assert!(ray.at(hit.exit).approx_eq(&Vec3::splat(1.0), 1e-4));
    }

    #[test]
    fn test_density_edge_faded_zero_at_faces() {
        assert_eq!(density_edge_faded(Vec3::new(0.5, 0.0, 0.0)), 0.0);
        assert_eq!(density_edge_faded(Vec3::new(0.0, -0.5, 0.2)), 0.0);
    }

    #[test]
    fn test_density_edge_faded_range() {
        let mut rng = Rng::new(99);
        for _ in 0..2_000 {
            let local = Vec3::new(
                rng.range_f32(-0.5, 0.5),
                rng.range_f32(-0.5, 0.5),
                rng.range_f32(-0.5, 0.5),
            );
            let d = density_edge_faded(local);
            assert!((0.0..=1.0).contains(&d), "density {} at {:?}", d, local);
        }
    }

    #[test]
    fn test_density_radial_peaks_at_center() {
        let params = CloudParams::default();
        // With noise factored out, the falloff term alone is maximal at
        // the center; compare falloffs by dividing the noise back out.
        let falloff = |local: Vec3| {
            let d = local.abs().max_component() * 2.0;
            (-d.powf(params.density_power) * params.density_scale).exp()
        };
        assert!(falloff(Vec3::zero()) > falloff(Vec3::new(0.4, 0.0, 0.0)));
        assert!(falloff(Vec3::new(0.2, 0.1, 0.0)) > falloff(Vec3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_density_radial_range() {
        let params = CloudParams::default();
        let mut rng = Rng::new(4242);
        for _ in 0..2_000 {
            let local = Vec3::new(
                rng.range_f32(-0.5, 0.5),
                rng.range_f32(-0.5, 0.5),
                rng.range_f32(-0.5, 0.5),
            );
            let world = local * 2.0;
            let d = density_radial(world, local, 1.5, &params);
            assert!((0.0..=1.0).contains(&d), "density {} at {:?}", d, local);
        }
    }

    #[test]
    fn test_density_radial_time_drifts_field() {
        let params = CloudParams::default();
        let local = Vec3::new(0.1, 0.1, 0.1);
        let world = local * 2.0;
        let a = density_radial(world, local, 0.0, &params);
        let b = density_radial(world, local, 10.0, &params);
        // Same point, different time: the noise sample has moved.
        assert!((a - b).abs() > 1e-6);
    }

    #[test]
    fn test_march_miss_is_zero() {
        let params = CloudParams::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(march(&ray, &unit_box(), 0.0, &params), 0.0);
    }

    #[test]
    fn test_march_hit_is_positive() {
        let params = CloudParams::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(march(&ray, &unit_box(), 0.0, &params) > 0.0);
    }

    #[test]
    fn test_march_converges_with_step_count() {
        // The Riemann sum approaches a limit as steps increase; successive
        // refinements should agree more closely than coarse ones.
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let at_steps = |steps| {
            let params = CloudParams {
                steps,
                ..CloudParams::default()
            };
            march(&ray, &unit_box(), 0.0, &params)
        };
        let coarse = (at_steps(8) - at_steps(512)).abs();
        let fine = (at_steps(256) - at_steps(512)).abs();
        assert!(fine <= coarse + 1e-4, "coarse {} vs fine {}", coarse, fine);
    }

    #[test]
    fn test_shade_clamps_and_premultiplies() {
        let color = Vec3::new(0.9, 0.8, 0.7);
        let (c, a) = shade(2.5, color);
        assert_eq!(a, 1.0);
        assert_eq!(c, color);

        let (c, a) = shade(0.5, color);
        assert_eq!(a, 0.5);
        assert!(c.approx_eq(&(color * 0.5), 1e-6));

        let (c, a) = shade(-1.0, color);
        assert_eq!(a, 0.0);
        assert_eq!(c, Vec3::zero());
    }

    #[test]
    fn test_render_cloud_end_to_end() {
        let params = CloudParams {
            steps: 64,
            density_scale: 2.0,
            density_power: 2.0,
            noise_scale: 1.0,
            color: Vec3::splat(1.0),
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let (color, opacity) = render_cloud(&ray, &unit_box(), 0.0, &params);
        assert!(opacity > 0.0 && opacity < 1.0, "opacity {}", opacity);
        assert_eq!(color, params.color * opacity);
    }

    #[test]
    fn test_render_cloud_miss_is_transparent_black() {
        let params = CloudParams::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 1.0, 0.0));
        let (color, opacity) = render_cloud(&ray, &unit_box(), 0.0, &params);
        assert_eq!(opacity, 0.0);
        assert_eq!(color, Vec3::zero());
    }

    #[test]
    fn test_render_cloud_opacity_always_in_range() {
        let mut rng = Rng::new(2024);
        for _ in 0..200 {
            let params = CloudParams {
                steps: rng.range_i32(1, 128) as u32,
                density_scale: rng.range_f32(0.1, 10.0),
                density_power: rng.range_f32(0.5, 4.0),
                noise_scale: rng.range_f32(0.2, 5.0),
                color: Vec3::splat(1.0),
            };
            let origin = Vec3::new(
                rng.range_f32(-4.0, 4.0),
                rng.range_f32(-4.0, 4.0),
                rng.range_f32(-4.0, 4.0),
            );
            let dir = Vec3::new(
                rng.range_f32(-1.0, 1.0),
                rng.range_f32(-1.0, 1.0),
                rng.range_f32(-1.0, 1.0),
            )
            .normalize();
            if dir.length() == 0.0 {
                continue;
            }
            let ray = Ray::new(origin, dir);
            let (_, opacity) = render_cloud(&ray, &unit_box(), rng.range_f32(0.0, 10.0), &params);
            assert!((0.0..=1.0).contains(&opacity), "opacity {}", opacity);
        }
    }
}
