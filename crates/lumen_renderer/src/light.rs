//! Light sources.
//!
//! Lights are kept apart from ordinary geometry: they emit photons, and an
//! area light can also be hit by camera rays, which then see its radiance.

use std::f32::consts::PI;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::{cosine_hemisphere, uniform_cone, uniform_cone_pdf, uniform_sphere};
use lumen_math::{Color, Frame, Ray, Vec3};
use rand::RngCore;

/// A photon leaving a light.
#[derive(Debug, Clone, Copy)]
pub struct EmissionSample {
    /// Origin on the light and unit direction of travel
    pub ray: Ray,
    pub power: Color,
    /// Joint density of origin and direction
    pub pdf: f32,
}

pub trait Light: Send + Sync {
    /// Draw an emitted ray. `None` when the light cannot emit.
    fn sample_emission(&self, rng: &mut dyn RngCore) -> Option<EmissionSample>;

    /// Radiance seen along `direction` by a ray that hit this light.
    fn emitted(&self, _direction: Vec3) -> Color {
        Color::ZERO
    }

    /// Intersect the light's shape. Point-like lights are never hit.
    fn intersect<'a>(&'a self, _ray: &Ray, _rec: &mut HitRecord<'a>, _t_min: f32) -> bool {
        false
    }
}

/// Isotropic point light.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self { position, intensity }
    }
}

impl Light for PointLight {
    fn sample_emission(&self, rng: &mut dyn RngCore) -> Option<EmissionSample> {
        Some(EmissionSample {
            ray: Ray::new(self.position, uniform_sphere(rng)),
            power: self.intensity,
            pdf: 1.0 / (4.0 * PI),
        })
    }
}

/// Point light restricted to a cone.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub position: Vec3,
    /// Unit cone axis
    pub direction: Vec3,
    /// Half-angle of the cone in radians
    pub angle: f32,
    pub intensity: Color,
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3, angle: f32, intensity: Color) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            angle: angle.clamp(0.0, PI),
            intensity,
        }
    }
}

impl Light for SpotLight {
    fn sample_emission(&self, rng: &mut dyn RngCore) -> Option<EmissionSample> {
        if self.direction == Vec3::ZERO || self.angle <= 0.0 {
            return None;
        }
        let cos_max = self.angle.cos();
        let local = uniform_cone(rng, cos_max);
        Some(EmissionSample {
            ray: Ray::new(self.position, Frame::from_normal(self.direction).to_world(local)),
            power: self.intensity,
            pdf: uniform_cone_pdf(cos_max),
        })
    }
}

/// Emitting surface with constant radiance.
pub struct AreaLight {
    shape: Box<dyn Hittable>,
    radiance: Color,
}

impl AreaLight {
    pub fn new(shape: Box<dyn Hittable>, radiance: Color) -> Self {
        Self { shape, radiance }
    }
}

impl Light for AreaLight {
    /// Area sample, then a cosine-weighted direction about the surface normal.
    fn sample_emission(&self, rng: &mut dyn RngCore) -> Option<EmissionSample> {
        let sample = self.shape.sample_point(rng)?;
        let local = cosine_hemisphere(rng);
        let cos_theta = local.z;
        let pdf = sample.pdf * cos_theta / PI;
        if !(pdf > 0.0) {
            return None;
        }
        let direction = Frame::from_normal(sample.surface.normal).to_world(local);
        Some(EmissionSample {
            ray: Ray::new(sample.surface.position, direction),
            power: self.radiance * cos_theta,
            pdf,
        })
    }

    fn emitted(&self, _direction: Vec3) -> Color {
        self.radiance
    }

    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        self.shape.intersect(ray, rec, t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Absorber;
    use crate::AxisBox;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn ceiling_light() -> AreaLight {
        let rect = AxisBox::new(Vec3::new(-0.5, 2.0, -0.5), Vec3::new(0.5, 2.0, 0.5), Arc::new(Absorber));
        AreaLight::new(Box::new(rect), Color::splat(4.0))
    }

    #[test]
    fn test_point_light_emits_from_position() {
        let light = PointLight::new(Vec3::new(1.0, 2.0, 3.0), Color::ONE);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let e = light.sample_emission(&mut rng).unwrap();
            assert_eq!(e.ray.origin, light.position);
            assert!((e.ray.direction.length() - 1.0).abs() < 1e-5);
            assert!((e.pdf - 1.0 / (4.0 * PI)).abs() < 1e-6);
        }
        let mut rec = HitRecord::new();
        assert!(!light.intersect(&Ray::new(Vec3::ZERO, Vec3::X), &mut rec, 1e-4));
    }

    #[test]
    fn test_spot_light_stays_in_cone() {
        let light = SpotLight::new(Vec3::ZERO, -Vec3::Y, 0.3, Color::ONE);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let e = light.sample_emission(&mut rng).unwrap();
            assert!(e.ray.direction.dot(-Vec3::Y) >= 0.3_f32.cos() - 1e-5);
        }
    }

    #[test]
    fn test_area_light_emission() {
        let light = ceiling_light();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let e = light.sample_emission(&mut rng).unwrap();
            assert!((e.ray.origin.y - 2.0).abs() < 1e-6);
            // Leaves on the side of the sampled face
            let n = if e.ray.direction.y > 0.0 { Vec3::Y } else { -Vec3::Y };
            let cos = e.ray.direction.dot(n);
            assert!(cos >= 0.0);
            // Area pdf is 1 / (2 faces * 1 m^2)
            assert!((e.pdf - 0.5 * cos / PI).abs() < 1e-4);
            assert!((e.power - Color::splat(4.0 * cos)).length() < 1e-4);
        }
    }

    #[test]
    fn test_area_light_is_visible() {
        let light = ceiling_light();
        let mut rec = HitRecord::new();
        assert!(light.intersect(&Ray::new(Vec3::ZERO, Vec3::Y), &mut rec, 1e-4));
        assert!((rec.t - 2.0).abs() < 1e-6);
        assert_eq!(light.emitted(Vec3::Y), Color::splat(4.0));
    }
}
