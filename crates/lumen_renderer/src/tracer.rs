//! Photon tracing pass.
//!
//! Photons are split over a fixed number of work units rather than over
//! threads. Each unit owns its generator and buffer, so the photon list of an
//! iteration depends only on the seed, never on scheduling.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::config::RenderConfig;
use crate::material::TransportMode;
use crate::photon::Photon;
use crate::sampling::{gen_f32, gen_index, stream_seed};
use crate::scene::{HitKind, Scene};
use crate::HitRecord;
use lumen_math::{is_valid_color, max_channel, Color, Frame, Ray};

/// Trace `photons_per_iteration` photons and return every stored photon.
pub fn trace_photons(scene: &Scene, config: &RenderConfig, iteration: u32) -> Vec<Photon> {
    if scene.light_count() == 0 {
        return Vec::new();
    }

    let units = config.photon_workers.max(1);
    let base = config.photons_per_iteration / units;
    let extra = config.photons_per_iteration % units;

    let buffers: Vec<Vec<Photon>> = (0..units)
        .into_par_iter()
        .map(|unit| {
            let count = base + usize::from(unit < extra);
            let mut rng = StdRng::seed_from_u64(stream_seed(config.seed, iteration as u64, unit as u64));
            let mut buffer = Vec::with_capacity(count);
            for _ in 0..count {
                trace_photon(scene, config, &mut rng, &mut buffer);
            }
            buffer
        })
        .collect();

    buffers.concat()
}

/// Emit one photon and follow it until it is absorbed or leaves the scene.
fn trace_photon(scene: &Scene, config: &RenderConfig, rng: &mut dyn RngCore, out: &mut Vec<Photon>) {
    let light_count = scene.light_count();
    let light = scene.light(gen_index(rng, light_count));
    let Some(emission) = light.sample_emission(rng) else {
        return;
    };
    if !(emission.pdf > 0.0) {
        return;
    }

    let mut power = emission.power / emission.pdf * light_count as f32;
    let mut ray = emission.ray;

    for depth in 0..config.max_depth {
        if !is_valid_color(power) {
            break;
        }

        let mut rec = HitRecord::new();
        match scene.intersect(&ray, &mut rec, config.ray_epsilon) {
            Some(HitKind::Surface) => {}
            Some(HitKind::Light(_)) | None => break,
        }
        let surface = rec.surface;
        let frame = Frame::from_normal(surface.normal);
        let incoming_world = -ray.direction.normalize();

        // Stored before lobe selection so the map sees all incident flux
        if rec.material.is_diffuse() {
            out.push(Photon {
                position: surface.position,
                direction: incoming_world,
                power,
            });
        }

        let sample = rec.material.sample(frame.to_local(incoming_world), TransportMode::Light, rng);
        if sample.is_absorbed() {
            break;
        }

        // Adjoint correction for shading normals that differ from the geometry
        let outgoing_world = frame.to_world(sample.direction);
        let ng = surface.geometric_normal;
        let in_ng = incoming_world.dot(ng).abs();
        if in_ng <= 0.0 {
            break;
        }
        let correction = outgoing_world.dot(ng).abs() * incoming_world.dot(surface.normal).abs() / in_ng;
        power *= sample.weight * rec.material.texture_color(&surface) / sample.pdf * correction;

        if depth > 0 {
            let survival = max_channel(power).min(1.0);
            if gen_f32(rng) >= survival {
                break;
            }
            power /= survival;
        }

        ray = Ray::new(surface.position, outgoing_world);
    }
}

/// Sum of stored photon power, used for logging.
pub fn total_power(photons: &[Photon]) -> Color {
    photons.iter().fold(Color::ZERO, |sum, p| sum + p.power)
}
