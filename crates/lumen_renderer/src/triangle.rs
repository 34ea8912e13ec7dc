//! Triangle primitive for ray tracing.
//!
//! Intersection solves `o + t d = p0 + β e1 + γ e2` for `(t, β, γ)` with
//! Cramer's rule. `TriangleGeometry` is the material-free part, rebuilt on
//! the fly by mesh leaves; `Triangle` is the standalone primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, HitSurface, Hittable, SurfaceSample};
use crate::sampling::uniform_triangle;
use crate::Material;
use lumen_math::{Aabb, Ray, Vec2, Vec3};
use rand::RngCore;

/// Relative determinant threshold below which the ray counts as parallel.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Corner data of one triangle with optional per-vertex attributes.
#[derive(Debug, Clone, Copy)]
pub struct TriangleGeometry {
    pub positions: [Vec3; 3],
    pub normals: Option<[Vec3; 3]>,
    pub uvs: Option<[Vec2; 3]>,
}

impl TriangleGeometry {
    pub fn new(positions: [Vec3; 3]) -> Self {
        Self {
            positions,
            normals: None,
            uvs: None,
        }
    }

    pub fn area(&self) -> f32 {
        let [p0, p1, p2] = self.positions;
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    /// Ray parameter and barycentrics `(t, β, γ)` of a hit in `[t_min, t_max)`.
    pub fn intersect_params(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, f32, f32)> {
        let [p0, p1, p2] = self.positions;
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let s = ray.origin - p0;
        let n = e1.cross(e2);

        // Columns [-d, e1, e2]
        let det = -ray.direction.dot(n);
        if det.abs() <= PARALLEL_EPSILON * ray.direction.length() * n.length() {
            return None;
        }
        let inv_det = 1.0 / det;

        let beta = -ray.direction.dot(s.cross(e2)) * inv_det;
        if !(0.0..=1.0).contains(&beta) {
            return None;
        }
        let gamma = -ray.direction.dot(e1.cross(s)) * inv_det;
        if gamma < 0.0 || beta + gamma > 1.0 {
            return None;
        }

        let t = s.dot(n) * inv_det;
        (t >= t_min && t < t_max).then_some((t, beta, gamma))
    }

    /// Surface attributes at barycentrics `(β, γ)`.
    pub fn surface_at(&self, beta: f32, gamma: f32) -> HitSurface {
        let [p0, p1, p2] = self.positions;
        let alpha = 1.0 - beta - gamma;
        let position = p0 * alpha + p1 * beta + p2 * gamma;
        let mut geometric_normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();

        let normal = match self.normals {
            Some([n0, n1, n2]) => {
                let n = (n0 * alpha + n1 * beta + n2 * gamma).normalize_or_zero();
                if n == Vec3::ZERO {
                    geometric_normal
                } else {
                    // Keep both normals on the same side
                    if n.dot(geometric_normal) < 0.0 {
                        geometric_normal = -geometric_normal;
                    }
                    n
                }
            }
            None => geometric_normal,
        };

        let (uv, has_texture) = match self.uvs {
            Some([t0, t1, t2]) => (t0 * alpha + t1 * beta + t2 * gamma, true),
            None => (Vec2::new(beta, gamma), false),
        };

        HitSurface {
            position,
            normal,
            geometric_normal,
            uv,
            has_texture,
        }
    }

    /// Test against `rec` and record a closer hit with `material`.
    pub fn intersect<'a>(
        &self,
        ray: &Ray,
        rec: &mut HitRecord<'a>,
        t_min: f32,
        material: &'a dyn Material,
    ) -> bool {
        match self.intersect_params(ray, t_min, rec.t) {
            Some((t, beta, gamma)) => {
                rec.record(t, material, self.surface_at(beta, gamma));
                true
            }
            None => false,
        }
    }

    /// Uniform area sample. pdf = 1 / area.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        let area = self.area();
        if area <= 0.0 {
            return None;
        }
        let (beta, gamma) = uniform_triangle(rng);
        Some(SurfaceSample {
            surface: self.surface_at(beta, gamma),
            pdf: 1.0 / area,
        })
    }

    pub fn bounding_box(&self) -> Aabb {
        let [a, b, c] = self.positions;
        Aabb::from_triangle(a, b, c)
    }
}

/// A triangle primitive.
pub struct Triangle {
    geometry: TriangleGeometry,
    material: Arc<dyn Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            geometry: TriangleGeometry::new([v0, v1, v2]),
            material,
        }
    }

    /// Per-vertex normals for smooth shading.
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.geometry.normals = Some(normals);
        self
    }

    /// Per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.geometry.uvs = Some(uvs);
        self
    }
}

impl Hittable for Triangle {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        self.geometry.intersect(ray, rec, t_min, self.material.as_ref())
    }

    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        self.geometry.sample_point(rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.geometry.bounding_box()
    }
}
