//! Affine-transformed wrapper around an exclusively owned object.

use crate::hittable::{HitRecord, HitSurface, Hittable, SurfaceSample};
use lumen_math::{Aabb, Mat3, Mat4, Mat4Ext, Ray};
use rand::RngCore;

pub struct Transform {
    object: Box<dyn Hittable>,
    matrix: Mat4,
    inverse: Mat4,
    normal_matrix: Mat3,
    bbox: Aabb,
}

impl Transform {
    pub fn new(object: Box<dyn Hittable>, matrix: Mat4) -> Self {
        let bbox = matrix.transform_aabb(&object.bounding_box());
        Self {
            object,
            matrix,
            inverse: matrix.inverse(),
            normal_matrix: matrix.normal_matrix(),
            bbox,
        }
    }

    fn to_world(&self, local: HitSurface) -> HitSurface {
        HitSurface {
            position: self.matrix.transform_point3(local.position),
            normal: (self.normal_matrix * local.normal).normalize_or_zero(),
            geometric_normal: (self.normal_matrix * local.geometric_normal).normalize_or_zero(),
            ..local
        }
    }
}

impl Hittable for Transform {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        // The local direction is not renormalized, so t means the same in both spaces
        let local = Ray::new(
            self.inverse.transform_point3(ray.origin),
            self.inverse.transform_vector3(ray.direction),
        );
        if !self.object.intersect(&local, rec, t_min) {
            return false;
        }
        rec.surface = self.to_world(rec.surface);
        true
    }

    /// Samples the child and maps the point to world space.
    ///
    /// The pdf is the child's area density; it is not rescaled for the
    /// transform's change of area.
    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        let sample = self.object.sample_point(rng)?;
        Some(SurfaceSample {
            surface: self.to_world(sample.surface),
            pdf: sample.pdf,
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
    use crate::{AxisBox, Sphere};
    use lumen_math::Vec3;
    use std::sync::Arc;

    #[test]
    fn test_translated_sphere() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Arc::new(Lambertian::new(Vec3::ONE)));
        let moved = Transform::new(Box::new(sphere), Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::new();
        assert!(moved.intersect(&ray, &mut rec, 1e-4));
        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!((rec.surface.position - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-4);
        assert!((rec.surface.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_scaled_sphere_keeps_world_t() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Arc::new(Lambertian::new(Vec3::ONE)));
        let matrix = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let scaled = Transform::new(Box::new(sphere), matrix);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::new();
        assert!(scaled.intersect(&ray, &mut rec, 1e-4));
        assert!((rec.t - 8.0).abs() < 1e-4);
        assert!((ray.at(rec.t) - rec.surface.position).length() < 1e-4);
    }

    #[test]
    fn test_rotated_box_normal() {
        let cube = AxisBox::new(Vec3::splat(-1.0), Vec3::splat(1.0), Arc::new(Lambertian::new(Vec3::ONE)));
        let rotated = Transform::new(Box::new(cube), Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let mut rec = HitRecord::new();
        assert!(rotated.intersect(&ray, &mut rec, 1e-4));
        // A corner edge faces the ray; the normal is one of the two rotated faces
        assert!((rec.surface.normal.length() - 1.0).abs() < 1e-4);
        assert!(rec.surface.normal.z > 0.5);
        assert!((rec.t - (5.0 - 2.0_f32.sqrt())).abs() < 1e-3);
    }

    #[test]
    fn test_miss_leaves_record() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Arc::new(Lambertian::new(Vec3::ONE)));
        let moved = Transform::new(Box::new(sphere), Mat4::from_translation(Vec3::X * 5.0));
        let mut rec = HitRecord::new();
        assert!(!moved.intersect(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut rec, 1e-4));
        assert!(!rec.is_hit());
    }
}
