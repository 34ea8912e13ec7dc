//! Camera-side radiance estimation.
//!
//! Eye paths follow specular bounces until they reach a diffuse surface,
//! where the photon map supplies the incident light in place of further
//! bounces.

use std::f32::consts::PI;

use crate::config::RenderConfig;
use crate::hittable::{HitRecord, HitSurface};
use crate::material::{Material, TransportMode};
use crate::photon::PhotonMap;
use crate::scene::{HitKind, Scene};
use lumen_math::{max_channel, Color, Frame, Ray, Vec3};
use rand::RngCore;

/// Everything a gather needs for one iteration. Shared read-only by all buckets.
#[derive(Clone, Copy)]
pub struct GatherContext<'a> {
    pub scene: &'a Scene,
    pub photons: &'a PhotonMap,
    /// Gather radius of this iteration
    pub radius: f32,
    /// Photons emitted this iteration, stored or not
    pub emitted: usize,
    pub config: &'a RenderConfig,
}

impl<'a> GatherContext<'a> {
    /// Radiance arriving at the camera along `ray`.
    pub fn radiance(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        let scene = self.scene;
        let mut throughput = Color::ONE;
        let mut ray = *ray;

        for _ in 0..self.config.max_depth {
            if max_channel(throughput) < self.config.throughput_cutoff {
                return Color::ZERO;
            }

            let mut rec = HitRecord::new();
            match scene.intersect(&ray, &mut rec, self.config.ray_epsilon) {
                None => return throughput * scene.background(),
                Some(HitKind::Light(index)) => return throughput * scene.light(index).emitted(ray.direction),
                Some(HitKind::Surface) => {}
            }

            let surface = rec.surface;
            let incoming_world = -ray.direction.normalize();
            if rec.material.is_diffuse() {
                return throughput * self.estimate_radiance(&surface, rec.material, incoming_world);
            }

            let frame = Frame::from_normal(surface.normal);
            let sample = rec.material.sample(frame.to_local(incoming_world), TransportMode::Camera, rng);
            if sample.is_absorbed() {
                return Color::ZERO;
            }

            throughput *= sample.throughput() * rec.material.texture_color(&surface);
            ray = Ray::new(surface.position, frame.to_world(sample.direction));
        }
        Color::ZERO
    }

    /// Density estimate of reflected radiance towards `incoming` (world space,
    /// pointing away from the surface), plus the ambient term.
    pub fn estimate_radiance(&self, surface: &HitSurface, material: &dyn Material, incoming: Vec3) -> Color {
        let frame = Frame::from_normal(surface.normal);
        let incoming = frame.to_local(incoming);

        let mut reflected = Color::ZERO;
        if self.emitted > 0 && !self.photons.is_empty() {
            let radius2 = self.radius * self.radius;
            for index in self.photons.within_radius(surface.position, radius2) {
                let photon = self.photons.photon(index);
                let from = frame.to_local(photon.direction);
                reflected += photon.power * material.shade(incoming, from, TransportMode::Camera);
            }
            reflected /= PI * radius2 * self.emitted as f32;
        }

        // Ambient light arriving along the normal on the viewer's side
        let normal = Vec3::new(0.0, 0.0, incoming.z.signum());
        let ambient = self.scene.ambient() * material.shade(incoming, normal, TransportMode::Camera) * PI;

        (reflected + ambient) * material.texture_color(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{AreaLight, PointLight};
    use crate::material::{Absorber, Glossy, Lambertian, Mirror};
    use crate::tracer::trace_photons;
    use crate::photon::Photon;
    use crate::{AxisBox, Camera, Plane, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn context<'a>(scene: &'a Scene, photons: &'a PhotonMap, config: &'a RenderConfig, emitted: usize) -> GatherContext<'a> {
        GatherContext {
            scene,
            photons,
            radius: 0.5,
            emitted,
            config,
        }
    }

    #[test]
    fn test_sphere_and_point_light_without_photons() {
        let background = Color::new(0.2, 0.3, 0.4);
        let mut scene = Scene::new(Camera::new()).with_background(background);
        let grey = scene.add_material(Lambertian::new(Color::splat(0.5)));
        scene.add_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, grey)));
        scene.add_light(Box::new(PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::splat(100.0))));

        let photons = PhotonMap::build(Vec::new());
        let config = RenderConfig::default();
        let ctx = context(&scene, &photons, &config, 0);
        let mut rng = StdRng::seed_from_u64(42);

        // Misses see the background. The silhouette is at asin(1/5), about 11.5 degrees off axis
        for direction in [
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(0.21, 0.0, -1.0),
            Vec3::new(0.0, -0.21, -1.0),
            Vec3::new(-0.15, 0.15, -1.0),
            Vec3::X,
            Vec3::Z,
        ] {
            let miss = ctx.radiance(&Ray::new(Vec3::ZERO, direction.normalize()), &mut rng);
            assert_eq!(miss, background, "{:?}", direction);
        }

        // Diffuse hits with no photons and no ambient are black, even at grazing angles
        for direction in [-Vec3::Z, Vec3::new(0.19, 0.0, -1.0), Vec3::new(0.0, -0.19, -1.0), Vec3::new(0.13, 0.13, -1.0)] {
            let hit = ctx.radiance(&Ray::new(Vec3::ZERO, direction.normalize()), &mut rng);
            assert_eq!(hit, Color::ZERO, "{:?}", direction);
        }
    }

    #[test]
    fn test_density_estimate() {
        let albedo = Color::new(0.8, 0.5, 0.2);
        let mut scene = Scene::new(Camera::new());
        let floor = scene.add_material(Lambertian::new(albedo));
        scene.add_object(Box::new(Plane::new(Vec3::ZERO, Vec3::Y, floor.clone())));

        // Ten photons inside the radius, one outside
        let mut list: Vec<Photon> = (0..10)
            .map(|i| Photon {
                position: Vec3::new(0.03 * i as f32, 0.0, 0.0),
                direction: Vec3::Y,
                power: Color::splat(2.0),
            })
            .collect();
        list.push(Photon {
            position: Vec3::new(3.0, 0.0, 0.0),
            direction: Vec3::Y,
            power: Color::splat(100.0),
        });
        let photons = PhotonMap::build(list);
        let config = RenderConfig::default();
        let ctx = context(&scene, &photons, &config, 1000);

        let surface = HitSurface::flat(Vec3::ZERO, Vec3::Y, Default::default(), false);
        let estimate = ctx.estimate_radiance(&surface, floor.as_ref(), Vec3::new(0.0, 1.0, 1.0).normalize());
        let expected = 10.0 * 2.0 * albedo / PI / (PI * 0.25 * 1000.0);
        assert!((estimate - expected).abs().max_element() < 1e-6);

        // Seen from below, the photons are on the other side
        let below = ctx.estimate_radiance(&surface, floor.as_ref(), -Vec3::Y);
        assert_eq!(below, Color::ZERO);
    }

    #[test]
    fn test_glossy_without_specular_matches_lambertian() {
        let kd = Color::splat(0.5);
        let build = |material: Arc<dyn Material>| {
            let mut scene = Scene::new(Camera::new());
            scene.add_object(Box::new(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, material)));
            scene.add_light(Box::new(PointLight::new(Vec3::new(0.0, 1.0, -3.0), Color::splat(20.0))));
            scene
        };
        let lambertian = build(Arc::new(Lambertian::new(kd)));
        let glossy = build(Arc::new(Glossy::new(kd, Color::ZERO, 10.0)));

        let config = RenderConfig {
            photons_per_iteration: 4_000,
            ..Default::default()
        };
        let stored = trace_photons(&glossy, &config, 0);
        assert!(!stored.is_empty());
        let photons = PhotonMap::build(stored);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, -3.0).normalize());
        let mut rng = StdRng::seed_from_u64(42);
        let reference = context(&lambertian, &photons, &config, config.photons_per_iteration).radiance(&ray, &mut rng);
        assert!(max_channel(reference) > 0.0);
        for _ in 0..16 {
            let value = context(&glossy, &photons, &config, config.photons_per_iteration).radiance(&ray, &mut rng);
            assert!((value - reference).abs().max_element() <= 1e-5 * max_channel(reference));
        }
    }

    #[test]
    fn test_ambient_term() {
        let ambient = Color::new(0.1, 0.2, 0.3);
        let albedo = Color::splat(0.5);
        let mut scene = Scene::new(Camera::new()).with_ambient(ambient);
        let grey = scene.add_material(Lambertian::new(albedo));
        scene.add_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, grey)));

        let photons = PhotonMap::build(Vec::new());
        let config = RenderConfig::default();
        let ctx = context(&scene, &photons, &config, 0);
        let mut rng = StdRng::seed_from_u64(42);
        let hit = ctx.radiance(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut rng);
        assert!((hit - ambient * albedo).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_visible_area_light() {
        let mut scene = Scene::new(Camera::new());
        let rect = AxisBox::new(Vec3::new(-1.0, -1.0, -3.0), Vec3::new(1.0, 1.0, -3.0), Arc::new(Absorber));
        scene.add_light(Box::new(AreaLight::new(Box::new(rect), Color::splat(5.0))));

        let photons = PhotonMap::build(Vec::new());
        let config = RenderConfig::default();
        let ctx = context(&scene, &photons, &config, 0);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(ctx.radiance(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut rng), Color::splat(5.0));
    }

    #[test]
    fn test_mirror_reflects_background() {
        let background = Color::ONE;
        let mut scene = Scene::new(Camera::new()).with_background(background);
        let mirror = scene.add_material(Mirror::new(Color::splat(0.9)));
        scene.add_object(Box::new(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, mirror)));

        let photons = PhotonMap::build(Vec::new());
        let config = RenderConfig::default();
        let ctx = context(&scene, &photons, &config, 0);
        let mut rng = StdRng::seed_from_u64(42);
        let value = ctx.radiance(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0).normalize()), &mut rng);
        assert!((value - Color::splat(0.9)).abs().max_element() < 1e-5);
    }

    #[test]
    fn test_throughput_cutoff() {
        let mut scene = Scene::new(Camera::new()).with_background(Color::ONE);
        let dark = scene.add_material(Mirror::new(Color::splat(1e-6)));
        scene.add_object(Box::new(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, dark)));

        let photons = PhotonMap::build(Vec::new());
        let config = RenderConfig::default();
        let ctx = context(&scene, &photons, &config, 0);
        let mut rng = StdRng::seed_from_u64(42);
        let value = ctx.radiance(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0).normalize()), &mut rng);
        assert_eq!(value, Color::ZERO);
    }
}
