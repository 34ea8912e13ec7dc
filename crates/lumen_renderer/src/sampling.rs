//! Random sampling helpers.
//!
//! Directions are produced in a local frame with `z` up; callers rotate them
//! with [`lumen_math::Frame`]. Every helper takes the caller's generator so
//! each worker keeps its own reproducible stream.

use lumen_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform index in `0..n`. `n` must be non-zero.
#[inline]
pub fn gen_index(rng: &mut dyn RngCore, n: usize) -> usize {
    rng.gen_range(0..n)
}

/// Derive an independent 64-bit seed for one work unit.
///
/// SplitMix64 finalizer over the base seed, the iteration and the unit index,
/// so neighbouring units get uncorrelated `StdRng` streams.
pub fn stream_seed(seed: u64, iteration: u64, unit: u64) -> u64 {
    let mut z = seed
        ^ iteration.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ unit.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Cosine-weighted direction on the upper hemisphere. pdf = cos(theta) / pi.
pub fn cosine_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);
    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - u1).max(0.0).sqrt())
}

/// Uniform direction on the unit sphere. pdf = 1 / (4 pi).
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform direction inside a cone around `z`.
pub fn uniform_cone(rng: &mut dyn RngCore, cos_max: f32) -> Vec3 {
    let z = 1.0 - gen_f32(rng) * (1.0 - cos_max);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Solid-angle pdf of [`uniform_cone`].
pub fn uniform_cone_pdf(cos_max: f32) -> f32 {
    1.0 / (2.0 * PI * (1.0 - cos_max))
}

/// Direction around `z` distributed as cos^n. pdf = (n + 1) / (2 pi) * cos^n.
pub fn power_cosine(rng: &mut dyn RngCore, exponent: f32) -> Vec3 {
    let cos_theta = gen_f32(rng).powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Uniform barycentric coordinates `(b1, b2)` over a triangle.
pub fn uniform_triangle(rng: &mut dyn RngCore) -> (f32, f32) {
    let su = gen_f32(rng).sqrt();
    (1.0 - su, gen_f32(rng) * su)
}

/// Random point in the unit disk (z = 0).
pub fn in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
