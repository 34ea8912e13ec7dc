//! Triangle mesh primitive backed by an octree.

use std::sync::Arc;

use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Hittable, SurfaceSample};
use crate::octree::{Octree, OctreeStats};
use crate::sampling::gen_index;
use crate::triangle::TriangleGeometry;
use crate::Material;
use lumen_core::Mesh;
use lumen_math::{Aabb, Ray};
use rand::RngCore;

/// A `Mesh` with one material per face.
pub struct TriangleMesh {
    mesh: Mesh,
    materials: Vec<Arc<dyn Material>>,
    /// Index into `materials` for every triangle
    face_materials: Vec<u32>,
    octree: Octree,
}

impl TriangleMesh {
    /// Mesh with a single material on every face.
    pub fn new(mesh: Mesh, material: Arc<dyn Material>) -> RenderResult<Self> {
        let faces = vec![0; mesh.triangle_count()];
        Self::with_face_materials(mesh, vec![material], faces)
    }

    /// Mesh with per-face materials. `face_materials[i]` indexes `materials`.
    pub fn with_face_materials(
        mesh: Mesh,
        materials: Vec<Arc<dyn Material>>,
        face_materials: Vec<u32>,
    ) -> RenderResult<Self> {
        mesh.validate()?;
        if face_materials.len() != mesh.triangle_count() {
            return Err(RenderError::InvalidScene(format!(
                "{} face materials for {} triangles",
                face_materials.len(),
                mesh.triangle_count()
            )));
        }
        if let Some(bad) = face_materials.iter().find(|&&m| m as usize >= materials.len()) {
            return Err(RenderError::InvalidScene(format!(
                "face material {} out of range ({} materials)",
                bad,
                materials.len()
            )));
        }

        let triangle_bounds: Vec<Aabb> = (0..mesh.triangle_count())
            .map(|i| {
                let [a, b, c] = mesh.triangle_positions(i);
                Aabb::from_triangle(a, b, c)
            })
            .collect();
        let octree = Octree::build(mesh.bounds, &triangle_bounds);

        Ok(Self {
            mesh,
            materials,
            face_materials,
            octree,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn octree_stats(&self) -> OctreeStats {
        self.octree.stats()
    }

    /// Transient triangle with interpolation data for face `i`.
    fn geometry(&self, i: usize) -> TriangleGeometry {
        TriangleGeometry {
            positions: self.mesh.triangle_positions(i),
            normals: self.mesh.triangle_normals(i),
            uvs: self.mesh.triangle_uvs(i),
        }
    }

    fn material(&self, i: usize) -> &dyn Material {
        self.materials[self.face_materials[i] as usize].as_ref()
    }

    fn intersect_triangle<'a>(&'a self, i: usize, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        self.geometry(i).intersect(ray, rec, t_min, self.material(i))
    }

    /// Reference intersection that tests every triangle.
    #[cfg(test)]
    fn intersect_brute_force<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        let mut hit = false;
        for i in 0..self.triangle_count() {
            hit |= self.intersect_triangle(i, ray, rec, t_min);
        }
        hit
    }
}

impl Hittable for TriangleMesh {
    fn intersect<'a>(&'a self, ray: &Ray, rec: &mut HitRecord<'a>, t_min: f32) -> bool {
        self.octree.traverse(ray, rec, t_min, |i, ray, rec| {
            self.intersect_triangle(i as usize, ray, rec, t_min)
        })
    }

    /// Uniform triangle, then uniform point: pdf = 1 / (count * area).
    fn sample_point(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        let count = self.triangle_count();
        if count == 0 {
            return None;
        }
        let mut sample = self.geometry(gen_index(rng, count)).sample_point(rng)?;
        sample.pdf /= count as f32;
        Some(sample)
    }

    fn bounding_box(&self) -> Aabb {
        self.mesh.bounds
    }
}
