//! Hittable trait, hit records and the `Group` aggregate.
//!
//! A `HitRecord` is a shrinking-search accumulator: one record is threaded
//! through every primitive a ray is tested against, and each primitive may
//! only overwrite it with a strictly closer hit.

use crate::material::{Material, ABSORBER};
use crate::sampling::gen_index;
use lumen_math::{Aabb, Ray, Vec2, Vec3};
use rand::RngCore;

/// Geometric payload of an intersection or of an area sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSurface {
    /// Point on the surface (world space)
    pub position: Vec3,
    /// Unit shading normal (interpolated where available)
    pub normal: Vec3,
    /// Unit geometric normal, on the same side as `normal`
    pub geometric_normal: Vec3,
    /// Texture coordinate
    pub uv: Vec2,
    /// True when `uv` is meaningful for texture lookup
    pub has_texture: bool,
}

impl Default for HitSurface {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::Z,
            geometric_normal: Vec3::Z,
            uv: Vec2::ZERO,
            has_texture: false,
        }
    }
}

impl HitSurface {
    /// Surface with identical shading and geometric normals.
    pub fn flat(position: Vec3, normal: Vec3, uv: Vec2, has_texture: bool) -> Self {
        Self {
            position,
            normal,
            geometric_normal: normal,
            uv,
            has_texture,
        }
    }
}

/// Record of the closest ray-object intersection found so far.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Ray parameter of the closest hit, `+inf` until something is hit
    pub t: f32,
    /// Material at the intersection point (owned by the primitive)
    pub material: &'a dyn Material,
    pub surface: HitSurface,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            material: &ABSORBER,
            surface: HitSurface::default(),
        }
    }
}

impl<'a> HitRecord<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a candidate at `t` lies in `[t_min, self.t)`.
    ///
    /// Hits exactly at the current distance are rejected, as are NaNs.
    #[inline]
    pub fn accepts(&self, t: f32, t_min: f32) -> bool {
        t >= t_min && t < self.t
    }

    /// True once any primitive has recorded a hit.
    pub fn is_hit(&self) -> bool {
        self.t.is_finite()
    }

    /// Overwrite the record with a closer hit.
    #[inline]
    pub fn record(&mut self, t: f32, material: &'a dyn Material, surface: HitSurface) {
        self.t = t;
        self.material = material;
        self.surface = surface;
    }
}

/// A point drawn from a surface by area sampling.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample {
    pub surface: HitSurface,
    /// Density with respect to surface area
    pub pdf: f32,
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Intersect `ray`, keeping `rec` if nothing in `[t_min, rec.t)` is found.
    ///
    /// Returns true iff a strictly closer hit was recorded.
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool;

    /// Draw a point on the surface. Unbounded surfaces return `None`.
    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// An aggregate that owns its children.
pub struct Group {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl Group {
    /// Create a new empty group.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the group.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for Group {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        let mut hit_anything = false;
        for object in &self.objects {
            // Every child sees the record shortened by the previous ones
            hit_anything |= object.intersect(ray, rec, t_min);
        }
        hit_anything
    }

    /// Uniform child choice; the child's pdf is divided by the child count.
    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        if self.objects.is_empty() {
            return None;
        }
        let index = gen_index(rng, self.objects.len());
        let mut sample = self.objects[index].sample_point(rng)?;
        sample.pdf /= self.objects.len() as f32;
        Some(sample)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32) -> Box<dyn Hittable> {
        Box::new(Sphere::new(center, radius, Arc::new(Lambertian::new(Vec3::splat(0.5)))))
    }

    #[test]
    fn test_accepts_half_open() {
        let mut rec = HitRecord::new();
        assert!(!rec.is_hit());
        assert!(rec.accepts(1.0, 0.001));
        assert!(!rec.accepts(0.0, 0.001));
        assert!(!rec.accepts(f32::NAN, 0.001));

        rec.t = 2.0;
        assert!(!rec.accepts(2.0, 0.001));
        assert!(rec.accepts(1.999, 0.001));
    }

    #[test]
    fn test_group_keeps_closest() {
        let mut group = Group::new();
        group.add(sphere(Vec3::new(0.0, 0.0, -10.0), 1.0));
        group.add(sphere(Vec3::new(0.0, 0.0, -4.0), 1.0));
        group.add(sphere(Vec3::new(0.0, 0.0, -7.0), 1.0));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::new();
        assert!(group.intersect(&ray, &mut rec, 1e-4));
        assert!((rec.t - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_group_never_lengthens_record() {
        let mut group = Group::new();
        group.add(sphere(Vec3::new(0.0, 0.0, -10.0), 1.0));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::new();
        rec.t = 5.0;
        assert!(!group.intersect(&ray, &mut rec, 1e-4));
        assert_eq!(rec.t, 5.0);
    }

    #[test]
    fn test_group_sampling_pdf() {
        let mut group = Group::new();
        group.add(sphere(Vec3::ZERO, 1.0));
        group.add(sphere(Vec3::new(5.0, 0.0, 0.0), 1.0));

        let mut rng = StdRng::seed_from_u64(42);
        let sample = group.sample_point(&mut rng).unwrap();
        let sphere_pdf = 1.0 / (4.0 * std::f32::consts::PI);
        assert!((sample.pdf - sphere_pdf / 2.0).abs() < 1e-6);

        assert!(Group::new().sample_point(&mut rng).is_none());
    }
}
