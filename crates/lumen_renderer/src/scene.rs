//! Scene: camera, geometry, lights and the materials they share.

use std::sync::Arc;

use crate::camera::Camera;
use crate::hittable::{HitRecord, Hittable};
use crate::light::Light;
use crate::Material;
use lumen_math::{Color, Ray};

/// What the closest hit of [`Scene::intersect`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Surface,
    /// Index into the scene's lights
    Light(usize),
}

pub struct Scene {
    camera: Camera,
    objects: Vec<Box<dyn Hittable>>,
    lights: Vec<Box<dyn Light>>,
    materials: Vec<Arc<dyn Material>>,
    background: Color,
    ambient: Color,
}

impl Scene {
    /// Scene viewed through `camera`, which is (re)initialized here.
    pub fn new(mut camera: Camera) -> Self {
        camera.initialize();
        Self {
            camera,
            objects: Vec::new(),
            lights: Vec::new(),
            materials: Vec::new(),
            background: Color::ZERO,
            ambient: Color::ZERO,
        }
    }

    /// Radiance returned by rays that leave the scene.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Constant ambient term added at every diffuse gather.
    pub fn with_ambient(mut self, color: Color) -> Self {
        self.ambient = color;
        self
    }

    pub fn add_object(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    /// Register a material and return the handle primitives should share.
    pub fn add_material(&mut self, material: impl Material + 'static) -> Arc<dyn Material> {
        let material: Arc<dyn Material> = Arc::new(material);
        self.materials.push(Arc::clone(&material));
        material
    }

    /// Closest hit in `[t_min, rec.t)` over objects, then lights.
    ///
    /// A light is reported only if it is strictly closer than every object.
    pub fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> Option<HitKind> {
        let mut kind = None;
        for object in &self.objects {
            if object.intersect(ray, rec, t_min) {
                kind = Some(HitKind::Surface);
            }
        }
        for (index, light) in self.lights.iter().enumerate() {
            if light.intersect(ray, rec, t_min) {
                kind = Some(HitKind::Light(index));
            }
        }
        kind
    }

    pub fn light(&self, index: usize) -> &dyn Light {
        self.lights[index].as_ref()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::AreaLight;
    use crate::material::{Absorber, Lambertian};
    use crate::{AxisBox, Sphere};
    use lumen_math::Vec3;

    fn scene() -> Scene {
        let mut scene = Scene::new(Camera::new());
        let white = scene.add_material(Lambertian::new(Color::splat(0.8)));
        scene.add_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, white)));
        let rect = AxisBox::new(Vec3::new(-1.0, 3.0, -6.0), Vec3::new(1.0, 3.0, -4.0), Arc::new(Absorber));
        scene.add_light(Box::new(AreaLight::new(Box::new(rect), Color::ONE)));
        scene
    }

    #[test]
    fn test_hit_kinds() {
        let scene = scene();
        assert_eq!(scene.material_count(), 1);

        let mut rec = HitRecord::new();
        assert_eq!(scene.intersect(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut rec, 1e-4), Some(HitKind::Surface));
        assert!((rec.t - 4.0).abs() < 1e-4);

        let mut rec = HitRecord::new();
        let up = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Y);
        assert_eq!(scene.intersect(&up, &mut rec, 1e-4), Some(HitKind::Surface));

        let mut rec = HitRecord::new();
        let past = Ray::new(Vec3::new(0.5, 0.0, -5.9), Vec3::Y);
        assert_eq!(scene.intersect(&past, &mut rec, 1e-4), Some(HitKind::Light(0)));
        assert!((rec.t - 3.0).abs() < 1e-5);

        let mut rec = HitRecord::new();
        assert_eq!(scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z), &mut rec, 1e-4), None);
        assert!(!rec.is_hit());
    }

    #[test]
    fn test_light_behind_object_is_hidden() {
        let scene = scene();
        // Starts below the sphere; the sphere blocks the light
        let ray = Ray::new(Vec3::new(0.0, -3.0, -5.0), Vec3::Y);
        let mut rec = HitRecord::new();
        assert_eq!(scene.intersect(&ray, &mut rec, 1e-4), Some(HitKind::Surface));
        assert!((rec.t - 2.0).abs() < 1e-4);
    }
}
