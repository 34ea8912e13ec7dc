//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::hittable::{HitRecord, HitSurface, Hittable, SurfaceSample};
use crate::sampling::uniform_sphere;
use crate::Material;
use lumen_math::{Aabb, Ray, Vec2, Vec3};
use rand::RngCore;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y, phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        Vec2::new(phi / (2.0 * PI), theta / PI)
    }

    fn surface_at(&self, position: Vec3) -> HitSurface {
        let normal = (position - self.center) / self.radius;
        HitSurface::flat(position, normal, Self::sphere_uv(normal), true)
    }
}

impl Hittable for Sphere {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        if a == 0.0 || self.radius == 0.0 {
            return false;
        }
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root in [t_min, rec.t)
        let mut root = (h - sqrtd) / a;
        if !rec.accepts(root, t_min) {
            root = (h + sqrtd) / a;
            if !rec.accepts(root, t_min) {
                return false;
            }
        }

        let surface = self.surface_at(ray.at(root));
        rec.record(root, self.material.as_ref(), surface);
        true
    }

    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        if self.radius <= 0.0 {
            return None;
        }
        let position = self.center + uniform_sphere(rng) * self.radius;
        Some(SurfaceSample {
            surface: self.surface_at(position),
            pdf: 1.0 / (4.0 * PI * self.radius * self.radius),
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit_sphere() -> Sphere {
        Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Vec3::splat(0.5))),
        )
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::new();

        assert!(sphere.intersect(&ray, &mut rec, 0.001));
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!((rec.surface.normal - Vec3::Z).length() < 1e-5);
        assert!(rec.surface.has_texture);
    }

    #[test]
    fn test_sphere_hit_unnormalized_direction() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        let mut rec = HitRecord::new();

        assert!(sphere.intersect(&ray, &mut rec, 0.001));
        assert!((rec.t - 0.125).abs() < 1e-5);
        assert!((rec.surface.position - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_from_inside_uses_far_root() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X);
        let mut rec = HitRecord::new();

        assert!(sphere.intersect(&ray, &mut rec, 0.001));
        assert!((rec.t - 0.5).abs() < 1e-5);
        // Normal stays outward
        assert!((rec.surface.normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let mut rec = HitRecord::new();

        assert!(!sphere.intersect(&ray, &mut rec, 0.001));
        assert!(!rec.is_hit());
    }

    #[test]
    fn test_sphere_respects_interval() {
        let sphere = unit_sphere();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let origin = Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 1.0);
            let dir = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), -1.0);
            let ray = Ray::new(origin, dir);
            let t_min = rng.gen_range(0.0..1.0);
            let prior = rng.gen_range(0.5..4.0);

            let mut rec = HitRecord::new();
            rec.t = prior;
            if sphere.intersect(&ray, &mut rec, t_min) {
                assert!(rec.t >= t_min && rec.t < prior);
            } else {
                assert_eq!(rec.t, prior);
            }
        }
    }

    #[test]
    fn test_sphere_sample_on_surface() {
        let sphere = unit_sphere();
        let mut rng = StdRng::seed_from_u64(42);
        let s = sphere.sample_point(&mut rng).unwrap();
        assert!(((s.surface.position - sphere.center).length() - 0.5).abs() < 1e-5);
        assert!((s.pdf - 1.0 / PI).abs() < 1e-5);
    }
}
