//! Built-in demonstration scenes.

use glam::{Mat4, Vec3};
use luma_accelerators::{BlasCache, Instance, Tlas};
use luma_core::camera::Camera;
use luma_core::common::*;
use luma_core::emitter::EmitterRegistry;
use luma_core::interaction::ShadingMode;
use luma_core::material::Material;
use luma_core::mesh::TriangleMesh;
use luma_core::scene::Scene;
use luma_core::spectrum::Spectrum;
use std::sync::Arc;

/// Builds a named scene and its matching camera.
///
/// * `name`       - Scene name from the command line.
/// * `resolution` - Image resolution (width, height).
/// * `leaf_size`  - Triangles per bottom-level leaf node.
pub fn build(
    name: &str,
    resolution: (u32, u32),
    leaf_size: usize,
) -> Result<(Scene, Camera), String> {
    match name {
        "cornell" => Ok(cornell(resolution, leaf_size, BoxVariant::Diffuse)),
        "glossy" => Ok(cornell(resolution, leaf_size, BoxVariant::Glossy)),
        _ => Err(format!(
            "unknown scene '{}' (available: cornell, glossy)",
            name
        )),
    }
}

/// Material treatment of the two interior boxes.
enum BoxVariant {
    /// Both boxes white diffuse, sharing one bottom-level tree.
    Diffuse,

    /// Tall box mirrored, short box glossy.
    Glossy,
}

/// Accumulates quads into one mesh with per-face materials.
struct QuadMesh {
    name: String,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    face_materials: Vec<u32>,
    materials: Vec<Arc<Material>>,
}

impl QuadMesh {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            face_materials: Vec::new(),
            materials: Vec::new(),
        }
    }

    fn material(&mut self, mtl: Material) -> u32 {
        self.materials.push(Arc::new(mtl));
        (self.materials.len() - 1) as u32
    }

    /// Adds a quad as two triangles. Corners may come in either winding;
    /// they are reordered so the geometric normal matches `normal`.
    fn quad(&mut self, corners: [Vec3; 4], normal: Vec3, mtl: u32) {
        let mut corners = corners;
        let winding = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        if winding.dot(normal) < 0.0 {
            corners.swap(1, 3);
        }
        let base = self.positions.len() as u32;
        self.positions.extend(corners);
        self.normals.extend([normal; 4]);
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        self.face_materials.extend([mtl, mtl]);
    }

    fn build(self) -> Arc<TriangleMesh> {
        Arc::new(TriangleMesh::new(
            &self.name,
            self.positions,
            self.normals,
            vec![],
            self.indices,
            self.face_materials,
            self.materials,
        ))
    }
}

/// A unit cube spanning [0, 1] on each axis with outward normals.
fn unit_box(name: &str, mtl: Material) -> Arc<TriangleMesh> {
    let mut mesh = QuadMesh::new(name);
    let m = mesh.material(mtl);
    let (o, e) = (0.0, 1.0);
    let c = |x, y, z| Vec3::new(x, y, z);
    mesh.quad([c(o, o, o), c(e, o, o), c(e, e, o), c(o, e, o)], -Vec3::Z, m);
    mesh.quad([c(o, o, e), c(e, o, e), c(e, e, e), c(o, e, e)], Vec3::Z, m);
    mesh.quad([c(o, o, o), c(o, e, o), c(o, e, e), c(o, o, e)], -Vec3::X, m);
    mesh.quad([c(e, o, o), c(e, e, o), c(e, e, e), c(e, o, e)], Vec3::X, m);
    mesh.quad([c(o, o, o), c(e, o, o), c(e, o, e), c(o, o, e)], -Vec3::Y, m);
    mesh.quad([c(o, e, o), c(e, e, o), c(e, e, e), c(o, e, e)], Vec3::Y, m);
    mesh.build()
}

/// The Cornell box: a 555-unit room with a ceiling light and two boxes.
fn cornell(resolution: (u32, u32), leaf_size: usize, variant: BoxVariant) -> (Scene, Camera) {
    let s = 555.0;
    let c = |x, y, z| Vec3::new(x, y, z);

    let mut walls = QuadMesh::new("cornell-walls");
    let white = walls.material(Material::diffuse("white", Spectrum::splat(0.73)));
    let red = walls.material(Material::diffuse("red", Spectrum::new(0.65, 0.05, 0.05)));
    let green = walls.material(Material::diffuse("green", Spectrum::new(0.12, 0.45, 0.15)));
    let lamp = walls.material(Material::emissive(
        "lamp",
        Spectrum::new(17.0, 12.0, 4.0),
    ));

    // floor, ceiling, back wall
    walls.quad([c(0.0, 0.0, 0.0), c(s, 0.0, 0.0), c(s, 0.0, s), c(0.0, 0.0, s)], Vec3::Y, white);
    walls.quad([c(0.0, s, 0.0), c(s, s, 0.0), c(s, s, s), c(0.0, s, s)], -Vec3::Y, white);
    walls.quad([c(0.0, 0.0, s), c(s, 0.0, s), c(s, s, s), c(0.0, s, s)], -Vec3::Z, white);
    // colored side walls
    walls.quad([c(s, 0.0, 0.0), c(s, s, 0.0), c(s, s, s), c(s, 0.0, s)], -Vec3::X, red);
    walls.quad([c(0.0, 0.0, 0.0), c(0.0, s, 0.0), c(0.0, s, s), c(0.0, 0.0, s)], Vec3::X, green);
    // ceiling light, slightly below the ceiling plane
    let ly = s - 0.1;
    walls.quad(
        [c(213.0, ly, 227.0), c(343.0, ly, 227.0), c(343.0, ly, 332.0), c(213.0, ly, 332.0)],
        -Vec3::Y,
        lamp,
    );

    let (short_mtl, tall_mtl) = match variant {
        BoxVariant::Diffuse => (
            Material::diffuse("white", Spectrum::splat(0.73)),
            Material::diffuse("white", Spectrum::splat(0.73)),
        ),
        BoxVariant::Glossy => (
            Material::glossy(
                "glossy",
                Spectrum::splat(0.35),
                Spectrum::splat(0.45),
                48.0,
            ),
            Material::mirror("mirror", Spectrum::splat(0.85)),
        ),
    };
    let same_box_material = matches!(variant, BoxVariant::Diffuse);

    let short_mesh = unit_box("box-short", short_mtl);
    let tall_mesh = if same_box_material {
        // identical geometry and material: let the cache share one tree
        Arc::clone(&short_mesh)
    } else {
        unit_box("box-tall", tall_mtl)
    };

    let mut cache = BlasCache::new(leaf_size);
    let walls_blas = cache.get_or_build(&walls.build());
    let short_blas = cache.get_or_build(&short_mesh);
    let tall_blas = cache.get_or_build(&tall_mesh);

    let short_transform = Mat4::from_translation(c(130.0, 0.0, 65.0))
        * Mat4::from_rotation_y((-18.0 as Float).to_radians())
        * Mat4::from_scale(c(165.0, 165.0, 165.0));
    let tall_transform = Mat4::from_translation(c(265.0, 0.0, 295.0))
        * Mat4::from_rotation_y((15.0 as Float).to_radians())
        * Mat4::from_scale(c(165.0, 330.0, 165.0));

    let instances = vec![
        Arc::new(Instance::new(walls_blas, Mat4::IDENTITY, ShadingMode::Smooth)),
        Arc::new(Instance::new(short_blas, short_transform, ShadingMode::Flat)),
        Arc::new(Instance::new(tall_blas, tall_transform, ShadingMode::Flat)),
    ];

    let tlas = Arc::new(Tlas::new(instances));
    let emitters = EmitterRegistry::new(tlas.collect_emitters());
    let scene = Scene::new(tlas, emitters);

    let camera = Camera::new(
        c(278.0, 273.0, -800.0),
        c(278.0, 273.0, 0.0),
        Vec3::Y,
        40.0,
        resolution,
    );
    (scene, camera)
}
