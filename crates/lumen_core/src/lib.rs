//! Lumen Core - scene assets shared by the renderer and the command line.
//!
//! This crate provides:
//!
//! - **Meshes**: indexed triangle geometry with optional normals and UVs,
//!   loaded from Wavefront OBJ files
//! - **Textures**: decoded images stored as linear RGBA with bilinear lookup
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Mesh, Texture};
//!
//! let mesh = Mesh::load_obj("bunny.obj")?;
//! let wood = Texture::open("wood.png")?;
//! println!("{} triangles, {}x{} texture", mesh.triangle_count(), wood.width, wood.height);
//! ```

pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError, MeshResult};
pub use texture::{Texture, TextureError, TextureResult};
