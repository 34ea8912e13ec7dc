//! Axis-aligned box primitive.
//!
//! A box with zero thickness along one axis doubles as a rectangle, which is
//! how walls and area lights are usually built.

use std::sync::Arc;

use crate::hittable::{HitRecord, HitSurface, Hittable, SurfaceSample};
use crate::sampling::gen_f32;
use crate::Material;
use lumen_math::{Aabb, Ray, Vec2, Vec3};
use rand::RngCore;

pub struct AxisBox {
    min: Vec3,
    max: Vec3,
    material: Arc<dyn Material>,
}

impl AxisBox {
    /// Create a box spanning two opposite corners.
    pub fn new(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            material,
        }
    }

    /// Area of one face perpendicular to `axis`.
    fn face_area(&self, axis: usize) -> f32 {
        let e = self.max - self.min;
        e[(axis + 1) % 3] * e[(axis + 2) % 3]
    }

    pub fn surface_area(&self) -> f32 {
        2.0 * (0..3).map(|axis| self.face_area(axis)).sum::<f32>()
    }

    /// Planar UV of a point on a face perpendicular to `axis`.
    fn face_uv(&self, axis: usize, p: Vec3) -> Vec2 {
        let e = self.max - self.min;
        let coord = |a: usize| {
            if e[a] > 0.0 {
                (p[a] - self.min[a]) / e[a]
            } else {
                0.0
            }
        };
        Vec2::new(coord((axis + 1) % 3), coord((axis + 2) % 3))
    }

    fn face_surface(&self, axis: usize, sign: f32, position: Vec3) -> HitSurface {
        let mut normal = Vec3::ZERO;
        normal[axis] = sign;
        HitSurface::flat(position, normal, self.face_uv(axis, position), true)
    }
}

impl Hittable for AxisBox {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_axis = 0;
        let mut far_axis = 0;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            if d == 0.0 {
                // Parallel to this slab: outside it means a guaranteed miss
                if o < self.min[axis] || o > self.max[axis] {
                    return false;
                }
                continue;
            }
            let mut t0 = (self.min[axis] - o) / d;
            let mut t1 = (self.max[axis] - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_near {
                t_near = t0;
                near_axis = axis;
            }
            if t1 < t_far {
                t_far = t1;
                far_axis = axis;
            }
            if t_near > t_far {
                return false;
            }
        }

        // Origin outside: entry face. Origin inside: exit face.
        let (t, axis, entering) = if t_near >= t_min {
            (t_near, near_axis, true)
        } else {
            (t_far, far_axis, false)
        };
        if !rec.accepts(t, t_min) {
            return false;
        }

        let d = ray.direction[axis].signum();
        let sign = if entering { -d } else { d };
        let mut position = ray.at(t);
        // Snap onto the face plane to avoid drift off thin boxes
        position[axis] = if sign > 0.0 { self.max[axis] } else { self.min[axis] };

        rec.record(t, self.material.as_ref(), self.face_surface(axis, sign, position));
        true
    }

    /// Face chosen proportionally to its area, then a uniform point on it.
    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        let total = self.surface_area();
        if total <= 0.0 {
            return None;
        }

        let pick = gen_f32(rng) * total;
        let mut cumulative = 0.0;
        let mut face = (2, 1.0);
        'faces: for axis in 0..3 {
            for sign in [-1.0, 1.0] {
                cumulative += self.face_area(axis);
                if pick < cumulative {
                    face = (axis, sign);
                    break 'faces;
                }
            }
        }
        let (axis, sign) = face;

        let mut position = self.min + (self.max - self.min) * Vec3::new(gen_f32(rng), gen_f32(rng), gen_f32(rng));
        position[axis] = if sign > 0.0 { self.max[axis] } else { self.min[axis] };

        Some(SurfaceSample {
            surface: self.face_surface(axis, sign, position),
            pdf: 1.0 / total,
        })
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.min, self.max)
    }
}
