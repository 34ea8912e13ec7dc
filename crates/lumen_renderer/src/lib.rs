//! Progressive photon-mapping renderer.
//!
//! Photons are traced from the lights into a k-d tree each iteration; eye
//! paths follow specular bounces and estimate radiance at the first diffuse
//! surface from the photons around it. The gather radius shrinks between
//! iterations so the averaged image converges.
//!
//! Geometry lives behind the [`Hittable`] trait, scattering behind
//! [`Material`], and emission behind [`Light`]. A [`Scene`] owns all three;
//! [`PhotonMapper`] renders it into a [`Film`].

pub mod axis_box;
pub mod bucket;
pub mod camera;
pub mod config;
pub mod error;
pub mod film;
pub mod hittable;
pub mod integrator;
pub mod light;
pub mod material;
pub mod mesh;
pub mod octree;
pub mod photon;
pub mod plane;
pub mod renderer;
pub mod sampling;
pub mod scene;
pub mod sphere;
pub mod tracer;
pub mod transform;
pub mod triangle;

pub use axis_box::AxisBox;
pub use bucket::{generate_buckets, Bucket, BucketResult};
pub use camera::Camera;
pub use config::{RenderConfig, ToneMap};
pub use error::{RenderError, RenderResult};
pub use film::{Film, ImageBuffer};
pub use hittable::{Group, HitRecord, HitSurface, Hittable, SurfaceSample};
pub use integrator::GatherContext;
pub use light::{AreaLight, EmissionSample, Light, PointLight, SpotLight};
pub use material::{
    Absorber, BsdfSample, Dielectric, Glossy, Lambertian, Material, Mirror, ScatterKind, TransportMode,
};
pub use mesh::TriangleMesh;
pub use octree::{Octree, OctreeStats};
pub use photon::{Neighbor, Photon, PhotonMap};
pub use plane::Plane;
pub use renderer::{IterationReport, PhotonMapper};
pub use scene::{HitKind, Scene};
pub use sphere::Sphere;
pub use tracer::trace_photons;
pub use transform::Transform;
pub use triangle::{Triangle, TriangleGeometry};

// Re-export math types for convenience
pub use lumen_math::{Color, Ray, Vec3};
