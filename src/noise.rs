//! Noise Generation Utilities
//!
//! Hash-based 3D value noise and fractional Brownian motion (fBm) driving
//! the cloud density field. Everything here is a pure function of its
//! inputs: same point in, same value out, no seeds or hidden state.

use crate::math3d::Vec3;

// Lattice folding constants for the hash. 0.3183099 is 1/pi; the offset
// keeps integer inputs off the fold boundaries.
const HASH_FOLD: f32 = 0.3183099;
const HASH_SHIFT: f32 = 0.1;

/// Number of fBm octaves. Fixed: the cloud look depends on it.
pub const FBM_OCTAVES: u32 = 5;

/// Hash-based pseudo-random value for a 3D point.
/// Returns a value in [0.0, 1.0). Cheap scrambling, not cryptographic;
/// it only needs to decorrelate adjacent lattice points.
#[inline]
pub fn hash(p: Vec3) -> f32 {
    let q = (p * HASH_FOLD + Vec3::splat(HASH_SHIFT)).fract() * 17.0;
    (q.x * q.y * q.z * (q.x + q.y + q.z)).fract()
}

/// Smoothstep interpolation: 3t² - 2t³
/// Maps [0,1] to [0,1] with smooth acceleration and deceleration.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// 3D value noise with smoothstep interpolation.
/// Returns a value in [0.0, 1.0), continuous everywhere including
/// lattice cell boundaries.
pub fn noise3d(p: Vec3) -> f32 {
    let i = p.floor();
    let f = p.fract();
    let ux = smoothstep(f.x);
    let uy = smoothstep(f.y);
    let uz = smoothstep(f.z);

    // Sample 8 corners of the unit cube
    let c000 = hash(i + Vec3::new(0.0, 0.0, 0.0));
    let c100 = hash(i + Vec3::new(1.0, 0.0, 0.0));
    let c010 = hash(i + Vec3::new(0.0, 1.0, 0.0));
    let c110 = hash(i + Vec3::new(1.0, 1.0, 0.0));
    let c001 = hash(i + Vec3::new(0.0, 0.0, 1.0));
    let c101 = hash(i + Vec3::new(1.0, 0.0, 1.0));
    let c011 = hash(i + Vec3::new(0.0, 1.0, 1.0));
    let c111 = hash(i + Vec3::new(1.0, 1.0, 1.0));

    // Trilinear interpolation: x within each edge, then y, then z
    let x00 = c000 + (c100 - c000) * ux;
    let x10 = c010 + (c110 - c010) * ux;
    let x01 = c001 + (c101 - c001) * ux;
    let x11 = c011 + (c111 - c011) * ux;

    let y0 = x00 + (x10 - x00) * uy;
    let y1 = x01 + (x11 - x01) * uy;

    y0 + (y1 - y0) * uz
}

/// Fractional Brownian motion — five octaves of value noise, each octave
/// doubling in frequency and halving in amplitude.
///
/// # Returns
/// Value in approximately [0.0, 1.0) (geometric amplitude sum ≈ 0.97)
pub fn fbm(p: Vec3) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * noise3d(p * frequency);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}
