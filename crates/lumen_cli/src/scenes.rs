//! Built-in demo scenes.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::{Mesh, Texture};
use lumen_math::{Color, Mat4, Vec2, Vec3};
use lumen_renderer::{
    Absorber, AreaLight, AxisBox, Camera, Dielectric, Glossy, Group, Lambertian, Material, Mirror, Plane,
    PointLight, Scene, Sphere, SpotLight, Transform, Triangle, TriangleMesh,
};

use crate::cli::{Args, SceneKind};

pub fn build(args: &Args) -> Result<Scene> {
    let floor_texture = args
        .floor_texture
        .as_deref()
        .map(|path| {
            Texture::open(path)
                .map(Arc::new)
                .with_context(|| format!("loading floor texture {}", path.display()))
        })
        .transpose()?;

    let mut scene = match args.scene {
        SceneKind::Cornell => cornell_box(args.width, args.height, floor_texture),
        SceneKind::Spheres => spheres(args.width, args.height, floor_texture),
    };

    if let Some(path) = &args.mesh {
        add_mesh(&mut scene, path)?;
    }

    log::info!(
        "Scene: {} objects, {} lights, {} materials",
        scene.object_count(),
        scene.light_count(),
        scene.material_count()
    );
    Ok(scene)
}

fn floor_material(albedo: Color, texture: Option<Arc<Texture>>) -> Lambertian {
    match texture {
        Some(texture) => Lambertian::new(albedo).with_texture(texture),
        None => Lambertian::new(albedo),
    }
}

/// Unit room spanning [-1, 1]^3, open towards +Z where the camera sits.
fn cornell_box(width: u32, height: u32, floor_texture: Option<Arc<Texture>>) -> Scene {
    let camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(0.0, 0.0, 3.4), Vec3::ZERO, Vec3::Y)
        .with_lens(40.0, 0.0, 3.4);
    let mut scene = Scene::new(camera);

    let white = scene.add_material(Lambertian::new(Color::splat(0.75)));
    let red = scene.add_material(Lambertian::new(Color::new(0.75, 0.15, 0.15)));
    let green = scene.add_material(Lambertian::new(Color::new(0.15, 0.75, 0.15)));
    let floor = scene.add_material(floor_material(Color::splat(0.75), floor_texture));
    let mirror = scene.add_material(Mirror::new(Color::splat(0.95)));
    let glass = scene.add_material(Dielectric::new(Color::ONE, 1.5));

    // Walls are zero-thickness boxes
    let walls: [(Vec3, Vec3, &Arc<dyn Material>); 5] = [
        (Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, 1.0), &floor),
        (Vec3::new(-1.0, 1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), &white),
        (Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, -1.0), &white),
        (Vec3::new(-1.0, -1.0, -1.0), Vec3::new(-1.0, 1.0, 1.0), &red),
        (Vec3::new(1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), &green),
    ];
    for (a, b, material) in walls {
        scene.add_object(Box::new(AxisBox::new(a, b, Arc::clone(material))));
    }

    scene.add_object(Box::new(Sphere::new(Vec3::new(-0.45, -0.65, -0.4), 0.35, mirror)));
    scene.add_object(Box::new(Sphere::new(Vec3::new(0.45, -0.65, 0.25), 0.35, glass)));

    // Downward-facing panel just below the ceiling. Triangles have a single
    // normal, so the light emits only into the room.
    let corner = |x: f32, z: f32| Vec3::new(x, 0.99, z);
    let mut panel = Group::new();
    for [a, b, c] in [
        [corner(-0.3, -0.3), corner(0.3, -0.3), corner(0.3, 0.3)],
        [corner(-0.3, -0.3), corner(0.3, 0.3), corner(-0.3, 0.3)],
    ] {
        panel.add(Box::new(Triangle::new(a, b, c, Arc::new(Absorber))));
    }
    scene.add_light(Box::new(AreaLight::new(Box::new(panel), Color::splat(12.0))));
    scene
}

/// Glossy and transformed spheres on an infinite floor under a sky background.
fn spheres(width: u32, height: u32, floor_texture: Option<Arc<Texture>>) -> Scene {
    let camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(0.0, 1.5, 6.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y)
        .with_lens(35.0, 0.6, 6.0);
    let mut scene = Scene::new(camera)
        .with_background(Color::new(0.05, 0.07, 0.1))
        .with_ambient(Color::splat(0.02));

    let floor = scene.add_material(floor_material(Color::splat(0.7), floor_texture));
    let glossy = scene.add_material(Glossy::new(Color::new(0.2, 0.3, 0.6), Color::splat(0.4), 60.0));
    let gold = scene.add_material(Mirror::new(Color::new(0.9, 0.7, 0.3)));
    let clay = scene.add_material(Lambertian::new(Color::new(0.8, 0.5, 0.4)));
    let glass = scene.add_material(Dielectric::new(Color::ONE, 1.5));

    scene.add_object(Box::new(Plane::new(Vec3::ZERO, Vec3::Y, floor).with_texture_basis(
        Vec3::ZERO,
        Vec3::X * 2.0,
        Vec3::Z * 2.0,
    )));

    let mut cluster = Group::new();
    cluster.add(Box::new(Sphere::new(Vec3::new(0.0, 0.8, 0.0), 0.8, glossy)));
    cluster.add(Box::new(Sphere::new(Vec3::new(-1.8, 0.5, 0.6), 0.5, gold)));
    cluster.add(Box::new(Sphere::new(Vec3::new(1.6, 0.6, 1.0), 0.6, glass)));
    scene.add_object(Box::new(cluster));

    // Squashed sphere
    let ellipsoid = Sphere::new(Vec3::ZERO, 1.0, Arc::clone(&clay));
    let matrix = Mat4::from_translation(Vec3::new(1.8, 0.35, -1.5)) * Mat4::from_scale(Vec3::new(0.7, 0.35, 0.7));
    scene.add_object(Box::new(Transform::new(Box::new(ellipsoid), matrix)));

    // Upright triangle behind the spheres
    scene.add_object(Box::new(
        Triangle::new(
            Vec3::new(-3.0, 0.0, -2.5),
            Vec3::new(-1.0, 0.0, -2.5),
            Vec3::new(-2.0, 2.0, -2.5),
            clay,
        )
        .with_uvs([Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)]),
    ));

    scene.add_light(Box::new(PointLight::new(Vec3::new(-2.0, 5.0, 3.0), Color::splat(60.0))));
    scene.add_light(Box::new(SpotLight::new(
        Vec3::new(3.0, 4.0, 1.0),
        Vec3::new(-3.0, -4.0, -1.0),
        0.35,
        Color::splat(120.0),
    )));
    scene
}

/// Load an OBJ, fit it into the middle of the floor and add it with a glossy white material.
fn add_mesh(scene: &mut Scene, path: &Path) -> Result<()> {
    let mut mesh = Mesh::load_obj(path).with_context(|| format!("loading mesh {}", path.display()))?;
    if !mesh.has_normals() {
        mesh.compute_normals();
    }
    mesh.fit_to(Vec3::new(0.0, -0.55, -0.1), 0.9);

    let material = scene.add_material(Glossy::new(Color::splat(0.6), Color::splat(0.3), 40.0));
    let mesh = TriangleMesh::new(mesh, material).with_context(|| format!("building octree for {}", path.display()))?;
    let stats = mesh.octree_stats();
    log::info!(
        "Mesh {}: {} triangles, octree {} nodes / {} leaves, depth {}",
        path.display(),
        mesh.triangle_count(),
        stats.nodes,
        stats.leaves,
        stats.max_depth
    );
    scene.add_object(Box::new(mesh));
    Ok(())
}
