//! Indexed triangle meshes.
//!
//! A `Mesh` is plain geometry: positions, optional per-vertex normals and
//! texture coordinates, and a flat triangle index list. The renderer wraps it
//! with materials and an octree; this module only owns loading and validation.

use std::path::Path;

use lumen_math::{Aabb, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur while loading or validating a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ file {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Mesh {0} contains no triangles")]
    Empty(String),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("{attribute} count {found} does not match vertex count {expected}")]
    AttributeMismatch {
        attribute: &'static str,
        found: usize,
        expected: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions, optional normals and UVs, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional, one per vertex)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional, one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle, counter-clockwise)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals,
            uvs: None,
            indices,
            bounds,
        }
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Load every model of an OBJ file into a single mesh.
    ///
    /// Faces are triangulated and attributes re-indexed so positions, normals
    /// and UVs share one index stream. Material libraries are ignored.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();
        let mut all_have_normals = true;
        let mut all_have_uvs = true;

        for model in &models {
            let m = &model.mesh;
            let base = positions.len() as u32;
            let vertex_count = m.positions.len() / 3;

            positions.extend(
                m.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );

            if m.normals.len() == m.positions.len() {
                normals.extend(m.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
            } else {
                all_have_normals = false;
            }

            if m.texcoords.len() / 2 == vertex_count && !m.texcoords.is_empty() {
                uvs.extend(m.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
            } else {
                all_have_uvs = false;
            }

            indices.extend(m.indices.iter().map(|i| base + i));
            log::debug!(
                "OBJ model '{}': {} vertices, {} triangles",
                model.name,
                vertex_count,
                m.indices.len() / 3
            );
        }

        let mut mesh = Mesh::new(positions, indices, None);
        if all_have_normals && !normals.is_empty() {
            mesh.normals = Some(normals);
        }
        if all_have_uvs && !uvs.is_empty() {
            mesh.uvs = Some(uvs);
        }

        if mesh.triangle_count() == 0 {
            return Err(MeshError::Empty(path.display().to_string()));
        }
        mesh.validate()?;

        log::info!(
            "Loaded {}: {} vertices, {} triangles (normals: {}, uvs: {})",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.has_normals(),
            mesh.has_uvs()
        );
        Ok(mesh)
    }

    /// Check index ranges and attribute lengths.
    pub fn validate(&self) -> MeshResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(self.indices.len()));
        }
        let vertex_count = self.positions.len();
        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(MeshError::AttributeMismatch {
                    attribute: "normal",
                    found: normals.len(),
                    expected: vertex_count,
                });
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(MeshError::AttributeMismatch {
                    attribute: "uv",
                    found: uvs.len(),
                    expected: vertex_count,
                });
            }
        }
        for (triangle, face) in self.indices.chunks_exact(3).enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::from_points(min, max)
    }

    /// Compute smooth vertex normals by averaging area-weighted face normals.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                log::warn!("Skipping triangle with invalid indices [{}, {}, {}]", i0, i1, i2);
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            // Isolated vertices get an arbitrary up normal
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of triangle `i`.
    #[inline]
    pub fn triangle_indices(&self, i: usize) -> [usize; 3] {
        let f = &self.indices[3 * i..3 * i + 3];
        [f[0] as usize, f[1] as usize, f[2] as usize]
    }

    /// Corner positions of triangle `i`.
    #[inline]
    pub fn triangle_positions(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangle_indices(i);
        [self.positions[a], self.positions[b], self.positions[c]]
    }

    /// Per-corner normals of triangle `i`, if the mesh has normals.
    pub fn triangle_normals(&self, i: usize) -> Option<[Vec3; 3]> {
        let normals = self.normals.as_ref()?;
        let [a, b, c] = self.triangle_indices(i);
        Some([normals[a], normals[b], normals[c]])
    }

    /// Per-corner texture coordinates of triangle `i`, if the mesh has UVs.
    pub fn triangle_uvs(&self, i: usize) -> Option<[Vec2; 3]> {
        let uvs = self.uvs.as_ref()?;
        let [a, b, c] = self.triangle_indices(i);
        Some([uvs[a], uvs[b], uvs[c]])
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }

    /// Get the mesh size (diagonal length of bounding box).
    pub fn size(&self) -> f32 {
        self.bounds.extent().length()
    }

    /// Apply a uniform scale and translation to every vertex.
    ///
    /// Used to fit loaded assets into a scene without a transform wrapper.
    pub fn fit_to(&mut self, center: Vec3, size: f32) {
        let current = self.size();
        if current <= 0.0 {
            return;
        }
        let scale = size / current;
        let offset = self.center();
        for p in &mut self.positions {
            *p = (*p - offset) * scale + center;
        }
        self.bounds = Self::compute_bounds(&self.positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![0, 1, 2, 1, 3, 2], None)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.has_normals());
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_positions(1)[1], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = quad();
        mesh.compute_normals();

        // Counter-clockwise in the XY plane faces +Z
        for normal in mesh.normals.as_ref().unwrap() {
            assert!((normal.z - 1.0).abs() < 0.001);
        }
        assert!(mesh.triangle_normals(0).is_some());
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2], None);

        assert!((mesh.bounds.min() - Vec3::new(-1.0, -2.0, -3.0)).length() < 0.001);
        assert!((mesh.bounds.max() - Vec3::new(4.0, 5.0, 6.0)).length() < 0.001);
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut mesh = quad();
        mesh.indices[4] = 9;
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { triangle: 1, index: 9, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_uv_mismatch() {
        let mesh = quad().with_uvs(vec![Vec2::ZERO; 3]);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::AttributeMismatch { attribute: "uv", .. })
        ));
    }

    #[test]
    fn test_fit_to() {
        let mut mesh = quad();
        mesh.fit_to(Vec3::new(5.0, 0.0, 0.0), 2.0 * 2.0_f32.sqrt());
        assert!((mesh.center() - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-3);
        assert!((mesh.bounds.x.size() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_load_obj() {
        let dir = std::env::temp_dir().join(format!("lumen_mesh_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quad.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n",
        )
        .unwrap();

        let mesh = Mesh::load_obj(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.has_uvs());
        assert!(!mesh.has_normals());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_obj_missing_file() {
        assert!(matches!(
            Mesh::load_obj("/definitely/not/here.obj"),
            Err(MeshError::Obj { .. })
        ));
    }
}
