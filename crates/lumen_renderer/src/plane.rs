//! Infinite plane `normal · p = offset`.

use std::sync::Arc;

use crate::hittable::{HitRecord, HitSurface, Hittable, SurfaceSample};
use crate::Material;
use lumen_math::{Aabb, Ray, Vec2, Vec3};
use rand::RngCore;

/// Planar texture mapping: `uv = ((p - origin)·e0 / |e0|², (p - origin)·e1 / |e1|²)`.
#[derive(Debug, Clone, Copy)]
struct TextureBasis {
    origin: Vec3,
    e0: Vec3,
    e1: Vec3,
}

pub struct Plane {
    normal: Vec3,
    offset: f32,
    material: Arc<dyn Material>,
    basis: Option<TextureBasis>,
}

impl Plane {
    /// Plane through `point` with the given normal.
    pub fn new(point: Vec3, normal: Vec3, material: Arc<dyn Material>) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            offset: normal.dot(point),
            material,
            basis: None,
        }
    }

    /// Map textures with one tile per `e0` × `e1` parallelogram starting at `origin`.
    pub fn with_texture_basis(mut self, origin: Vec3, e0: Vec3, e1: Vec3) -> Self {
        self.basis = Some(TextureBasis { origin, e0, e1 });
        self
    }

    fn uv_at(&self, p: Vec3) -> Option<Vec2> {
        let b = self.basis?;
        let d = p - b.origin;
        let u = d.dot(b.e0) / b.e0.length_squared();
        let v = d.dot(b.e1) / b.e1.length_squared();
        (u.is_finite() && v.is_finite()).then(|| Vec2::new(u, v))
    }
}

impl Hittable for Plane {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        let denom = self.normal.dot(ray.direction);
        // Parallel rays never hit
        if denom.abs() < 1e-9 {
            return false;
        }
        let t = (self.offset - self.normal.dot(ray.origin)) / denom;
        if !rec.accepts(t, t_min) {
            return false;
        }

        let position = ray.at(t);
        let uv = self.uv_at(position);
        let surface = HitSurface::flat(position, self.normal, uv.unwrap_or(Vec2::ZERO), uv.is_some());
        rec.record(t, self.material.as_ref(), surface);
        true
    }

    /// Unbounded, so it cannot be area-sampled.
    fn sample_point(&self, _rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        None
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn floor() -> Plane {
        Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, Arc::new(Lambertian::new(Vec3::ONE)))
    }

    #[test]
    fn test_plane_hit() {
        let plane = floor();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0));
        let mut rec = HitRecord::new();
        assert!(plane.intersect(&ray, &mut rec, 1e-4));
        assert!((rec.t - 0.5).abs() < 1e-6);
        assert!(!rec.surface.has_texture);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let plane = floor();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::new();
        assert!(!plane.intersect(&ray, &mut rec, 1e-4));
    }

    #[test]
    fn test_plane_behind_origin_misses() {
        let plane = floor();
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let mut rec = HitRecord::new();
        assert!(!plane.intersect(&ray, &mut rec, 1e-4));
    }

    #[test]
    fn test_texture_basis() {
        let plane = floor().with_texture_basis(Vec3::new(0.0, -1.0, 0.0), Vec3::X * 2.0, Vec3::Z * 4.0);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 2.0), -Vec3::Y);
        let mut rec = HitRecord::new();
        assert!(plane.intersect(&ray, &mut rec, 1e-4));
        assert!(rec.surface.has_texture);
        assert!((rec.surface.uv - Vec2::new(0.5, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_plane_cannot_be_sampled() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(floor().sample_point(&mut rng).is_none());
    }
}
