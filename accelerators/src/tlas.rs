//! Top-level acceleration structure: the scene's instance tree.

use crate::blas::Blas;
use crate::builder::{build_bvh, BvhBuild};
use crate::node::BvhNode;
use crate::traverse::TraceLevel;
use glam::{Mat3, Mat4};
use luma_core::emitter::EmitTriangle;
use luma_core::geometry::{Bounds3, Ray};
use luma_core::interaction::{IntersectRecord, ShadingMode};
use luma_core::primitive::Primitive;
use std::sync::Arc;

/// A placed copy of an object: a shared bottom-level tree plus a world
/// transform. The transform is immutable once the instance joins a TLAS.
pub struct Instance {
    /// The object's triangle tree, shared between instances.
    pub blas: Arc<Blas>,

    /// Local-to-world transform.
    pub object_to_world: Mat4,

    /// Cached world-to-local transform.
    world_to_object: Mat4,

    /// Inverse-transpose of the upper 3x3, for normals.
    normal_to_world: Mat3,

    /// World-space box of the transformed object.
    pub world_bounds: Bounds3,

    /// Normal-generation mode for hits on this instance.
    pub shading: ShadingMode,
}

impl Instance {
    /// Creates an instance.
    ///
    /// * `blas`            - The object's tree.
    /// * `object_to_world` - Placement transform; must be invertible.
    /// * `shading`         - Normal-generation mode.
    pub fn new(blas: Arc<Blas>, object_to_world: Mat4, shading: ShadingMode) -> Self {
        let world_to_object = object_to_world.inverse();
        let normal_to_world = Mat3::from_mat4(world_to_object).transpose();
        let world_bounds = blas.root_bounds().transform(&object_to_world);
        Self {
            blas,
            object_to_world,
            world_to_object,
            normal_to_world,
            world_bounds,
            shading,
        }
    }

    /// Collects this instance's emissive faces with world-space vertex
    /// data.
    pub fn collect_emitters(&self, out: &mut Vec<EmitTriangle>) {
        let mesh = self.blas.mesh();
        for face in 0..mesh.face_count() {
            let mtl = mesh.face_material(face);
            if !mtl.is_emissive() {
                continue;
            }
            let positions = mesh
                .face_positions(face)
                .map(|p| self.object_to_world.transform_point3(p));
            let normals = mesh
                .face_vertex_normals(face)
                .map(|n| (self.normal_to_world * n).normalize());
            let front = (self.normal_to_world * mesh.face_normal(face)).normalize();
            out.push(EmitTriangle::new(positions, normals, front, mtl.emitted()));
        }
    }
}

/// The world-space tree over all instances. Leaves hold exactly one
/// instance; the instance list is permuted to the builder's order so a leaf
/// maps to its instance by direct indexing.
pub struct Tlas {
    instances: Vec<Arc<Instance>>,
    build: BvhBuild,
}

impl Tlas {
    /// Builds the instance tree.
    ///
    /// * `instances` - All scene instances.
    ///
    /// Panics on an empty instance list.
    pub fn new(instances: Vec<Arc<Instance>>) -> Self {
        assert!(!instances.is_empty(), "TLAS build over an empty scene");

        let boxes: Vec<Bounds3> = instances.iter().map(|i| i.world_bounds).collect();
        let build = build_bvh(&boxes, 1);

        // leaf ranges index the permutation; reorder the instances so a
        // leaf's start is the instance index itself
        let instances: Vec<Arc<Instance>> = build
            .order
            .iter()
            .map(|&i| Arc::clone(&instances[i as usize]))
            .collect();

        info!(
            "TLAS: {} instances, {} nodes",
            instances.len(),
            build.nodes.len()
        );
        Self { instances, build }
    }

    /// The instances, in tree order.
    pub fn instances(&self) -> &[Arc<Instance>] {
        &self.instances
    }

    /// Collects every emissive face of every instance.
    pub fn collect_emitters(&self) -> Vec<EmitTriangle> {
        let mut out = Vec::new();
        for instance in &self.instances {
            instance.collect_emitters(&mut out);
        }
        out
    }
}

impl TraceLevel for Tlas {
    fn nodes(&self) -> &[BvhNode] {
        &self.build.nodes
    }

    fn record_leaf(&self, rec: &mut IntersectRecord, leaf: i32) {
        rec.leaf.tlas = leaf;
    }

    /// Resolves the single instance in the recorded leaf: transform the ray
    /// into the instance's local space, descend its BLAS, and map the hit
    /// back to world space. The hit distance is recomputed as the
    /// world-space length from the ray origin, since a scaling transform
    /// changes the meaning of the local-space parametric distance.
    fn trace_in_detail(&self, ray: &Ray, rec: &mut IntersectRecord) -> bool {
        let node = &self.build.nodes[rec.leaf.tlas as usize];
        let instance = &self.instances[node.start as usize];

        let local_ray = Ray::new(
            instance.world_to_object.transform_point3(ray.origin),
            instance.world_to_object.transform_vector3(ray.dir),
            ray.t_min,
            ray.t_max,
        );

        rec.shading = instance.shading;
        if !instance.blas.trace(&local_ray, rec) {
            return false;
        }

        rec.pos = instance.object_to_world.transform_point3(rec.pos);
        rec.normal = (instance.normal_to_world * rec.normal).normalize();
        rec.t = (rec.pos - ray.origin).length();
        true
    }
}

impl Primitive for Tlas {
    fn world_bound(&self) -> Bounds3 {
        self.build.nodes[0].bounds
    }

    fn intersect(&self, ray: &Ray, rec: &mut IntersectRecord) -> bool {
        self.trace_in_accel(ray, 0, rec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use luma_core::common::*;
    use luma_core::material::Material;
    use luma_core::mesh::TriangleMesh;
    use luma_core::spectrum::Spectrum;

    fn square_mesh(mtl: Material) -> Arc<TriangleMesh> {
        // unit square in the z = 0 plane, facing +z
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        Arc::new(TriangleMesh::new(
            "square",
            positions,
            vec![Vec3::Z; 4],
            vec![],
            vec![0, 1, 2, 0, 2, 3],
            vec![0, 0],
            vec![Arc::new(mtl)],
        ))
    }

    fn square_instance(m: Mat4) -> Arc<Instance> {
        let mesh = square_mesh(Material::diffuse("white", Spectrum::splat(0.7)));
        let blas = Arc::new(Blas::new(mesh, 4));
        Arc::new(Instance::new(blas, m, ShadingMode::Smooth))
    }

    #[test]
    fn translated_instance_hit_in_world_space() {
        let tlas = Tlas::new(vec![square_instance(Mat4::from_translation(Vec3::new(
            5.0, 0.0, 2.0,
        )))]);
        let ray = Ray::new(Vec3::new(5.5, 0.5, 10.0), -Vec3::Z, EPSILON, INFINITY);
        let mut rec = IntersectRecord::default();
        assert!(tlas.intersect(&ray, &mut rec));
        assert!((rec.t - 8.0).abs() < 1e-4);
        assert!((rec.pos - Vec3::new(5.5, 0.5, 2.0)).length() < 1e-4);
        assert!(rec.leaf.tlas >= 0 && rec.leaf.blas >= 0);
    }

    // Scaling changes the local parametric distance; the world-space
    // distance must come from the transformed position.
    #[test]
    fn scaled_instance_reports_world_distance() {
        let m = Mat4::from_scale(Vec3::splat(10.0));
        let tlas = Tlas::new(vec![square_instance(m)]);
        let ray = Ray::new(Vec3::new(5.0, 5.0, 7.0), -Vec3::Z, EPSILON, INFINITY);
        let mut rec = IntersectRecord::default();
        assert!(tlas.intersect(&ray, &mut rec));
        assert!((rec.t - 7.0).abs() < 1e-4);
        assert!((rec.pos - Vec3::new(5.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn round_trip_hit_position_tolerance() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_rotation_y(0.7)
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 1.5));
        let instance = square_instance(m);
        let tlas = Tlas::new(vec![Arc::clone(&instance)]);

        let target = m.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        let origin = target + Vec3::new(0.3, 4.0, 2.0);
        let ray = Ray::new(origin, target - origin, EPSILON, INFINITY);
        let mut rec = IntersectRecord::default();
        assert!(tlas.intersect(&ray, &mut rec));
        assert!((rec.pos - target).length() < 1e-4);
        // the reported distance is consistent with the world hit position
        assert!((ray.at(rec.t) - rec.pos).length() < 1e-4);
    }

    #[test]
    fn nearer_instance_wins() {
        let near = square_instance(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));
        let far = square_instance(Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)));
        let tlas = Tlas::new(vec![far, near]);
        let ray = Ray::new(Vec3::new(0.5, 0.5, 10.0), -Vec3::Z, EPSILON, INFINITY);
        let mut rec = IntersectRecord::default();
        assert!(tlas.intersect(&ray, &mut rec));
        assert!((rec.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn normals_use_inverse_transpose() {
        // non-uniform scale: a naive transform would skew the normal
        let m = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0)) * Mat4::from_rotation_x(-PI / 2.0);
        let tlas = Tlas::new(vec![square_instance(m)]);
        // the square now lies in the y = 0 plane facing +y
        let ray = Ray::new(Vec3::new(2.0, 5.0, -0.5), -Vec3::Y, EPSILON, INFINITY);
        let mut rec = IntersectRecord::default();
        assert!(tlas.intersect(&ray, &mut rec));
        assert!((rec.normal - Vec3::Y).length() < 1e-4, "{:?}", rec.normal);
    }

    #[test]
    fn emitter_collection_transforms_vertices() {
        let light = square_mesh(Material::emissive("light", Spectrum::splat(10.0)));
        let blas = Arc::new(Blas::new(light, 4));
        let m = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        let instance = Arc::new(Instance::new(blas, m, ShadingMode::Smooth));
        let tlas = Tlas::new(vec![instance]);

        let emitters = tlas.collect_emitters();
        assert_eq!(emitters.len(), 2);
        for tri in &emitters {
            for p in tri.positions {
                assert!((p.y - 3.0).abs() < 1e-5);
            }
            assert!((tri.front_normal - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    #[should_panic(expected = "empty scene")]
    fn empty_tlas_panics() {
        Tlas::new(vec![]);
    }

    #[test]
    fn instance_order_matches_leaves() {
        let a = square_instance(Mat4::from_translation(Vec3::new(-10.0, 0.0, 0.0)));
        let b = square_instance(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        let tlas = Tlas::new(vec![a, b]);
        for node in tlas.nodes() {
            if node.is_leaf() {
                assert_eq!(node.count, 1);
                let inst = &tlas.instances()[node.start as usize];
                // the leaf box covers its instance's box
                let wb = inst.world_bounds;
                assert!(node.bounds.min.cmple(wb.min).all());
                assert!(node.bounds.max.cmpge(wb.max).all());
            }
        }
    }
}
