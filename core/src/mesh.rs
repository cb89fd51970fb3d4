//! Triangle meshes.

use crate::common::*;
use crate::geometry::{Bounds3, Ray};
use crate::interaction::{IntersectRecord, ShadingMode};
use crate::material::Material;
use glam::{Vec2, Vec3};
use std::sync::Arc;

/// An indexed triangle mesh with per-face materials. Geometry is expressed
/// in the object's local space; instancing applies world transforms.
#[derive(Debug)]
pub struct TriangleMesh {
    /// Identifying name, for diagnostics.
    pub name: String,

    /// Vertex positions.
    pub positions: Vec<Vec3>,

    /// Per-vertex normals; same length as `positions`.
    pub normals: Vec<Vec3>,

    /// Per-vertex texture coordinates; empty when the mesh carries none.
    pub uvs: Vec<Vec2>,

    /// Vertex indices, three per face.
    pub indices: Vec<u32>,

    /// Per-face index into `materials`.
    pub face_materials: Vec<u32>,

    /// Material table.
    pub materials: Vec<Arc<Material>>,

    /// Precomputed geometric face normals.
    face_normals: Vec<Vec3>,
}

impl TriangleMesh {
    /// Creates a mesh, validating the triangulation contract.
    ///
    /// * `name`           - Identifying name.
    /// * `positions`      - Vertex positions.
    /// * `normals`        - Per-vertex normals, one per position.
    /// * `uvs`            - Texture coordinates, one per position or empty.
    /// * `indices`        - Vertex indices, three per face.
    /// * `face_materials` - Per-face material index, one per face.
    /// * `materials`      - Material table.
    ///
    /// Panics when the mesh is empty, not triangulated, or the attribute
    /// lengths disagree; there is no meaningful structure to build from such
    /// input.
    pub fn new(
        name: &str,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        indices: Vec<u32>,
        face_materials: Vec<u32>,
        materials: Vec<Arc<Material>>,
    ) -> Self {
        assert!(!indices.is_empty(), "mesh '{}' has no faces", name);
        assert!(
            indices.len() % 3 == 0,
            "mesh '{}' is not triangulated ({} indices)",
            name,
            indices.len()
        );
        assert_eq!(
            positions.len(),
            normals.len(),
            "mesh '{}' vertex/normal count mismatch",
            name
        );
        assert!(
            uvs.is_empty() || uvs.len() == positions.len(),
            "mesh '{}' vertex/uv count mismatch",
            name
        );
        let face_count = indices.len() / 3;
        assert_eq!(
            face_materials.len(),
            face_count,
            "mesh '{}' face/material count mismatch",
            name
        );

        let face_normals = (0..face_count)
            .map(|f| {
                let [p0, p1, p2] = face_positions(&positions, &indices, f);
                (p1 - p0).cross(p2 - p0).normalize_or_zero()
            })
            .collect();

        Self {
            name: name.to_string(),
            positions,
            normals,
            uvs,
            indices,
            face_materials,
            materials,
            face_normals,
        }
    }

    /// Returns the number of faces.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the three corner positions of a face.
    pub fn face_positions(&self, face: usize) -> [Vec3; 3] {
        face_positions(&self.positions, &self.indices, face)
    }

    /// Returns the three corner normals of a face.
    pub fn face_vertex_normals(&self, face: usize) -> [Vec3; 3] {
        let i = 3 * face;
        [
            self.normals[self.indices[i] as usize],
            self.normals[self.indices[i + 1] as usize],
            self.normals[self.indices[i + 2] as usize],
        ]
    }

    /// Returns the geometric normal of a face.
    pub fn face_normal(&self, face: usize) -> Vec3 {
        self.face_normals[face]
    }

    /// Returns the material of a face.
    pub fn face_material(&self, face: usize) -> &Arc<Material> {
        &self.materials[self.face_materials[face] as usize]
    }

    /// Returns the local-space bounding box of a face.
    pub fn face_bounds(&self, face: usize) -> Bounds3 {
        let [p0, p1, p2] = self.face_positions(face);
        Bounds3::from_triangle(p0, p1, p2)
    }

    /// Exact ray/triangle intersection (Möller-Trumbore) against one face.
    /// Updates the record when the hit is closer than its current distance;
    /// returns whether the ray intersects the face inside its acceptance
    /// range at all.
    ///
    /// * `face` - Face index.
    /// * `ray`  - The ray, in the mesh's local space.
    /// * `rec`  - Closest-hit record to update.
    /// * `mode` - Normal-generation mode of the owning instance.
    pub fn intersect_face(
        &self,
        face: usize,
        ray: &Ray,
        rec: &mut IntersectRecord,
        mode: ShadingMode,
    ) -> bool {
        let [p0, p1, p2] = self.face_positions(face);
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let s = ray.origin - p0;
        let s1 = ray.dir.cross(e2);
        let s2 = s.cross(e1);

        let det = s1.dot(e1);
        if det.abs() < EPSILON {
            return false;
        }
        let inv_det = 1.0 / det;

        let t = s2.dot(e2) * inv_det;
        if t < 0.0 {
            return false;
        }
        let b1 = s1.dot(s) * inv_det;
        let b2 = s2.dot(ray.dir) * inv_det;
        if b1 < 0.0 || b2 < 0.0 || b1 + b2 > 1.0 {
            return false;
        }
        if !ray.accepts(t) {
            return false;
        }

        if t < rec.t {
            rec.t = t;
            rec.pos = ray.at(t);

            let mut normal = match mode {
                ShadingMode::Smooth => {
                    let [n0, n1, n2] = self.face_vertex_normals(face);
                    ((1.0 - b1 - b2) * n0 + b1 * n1 + b2 * n2).normalize()
                }
                ShadingMode::Flat => self.face_normals[face],
            };
            if normal.dot(ray.dir) > 0.0 {
                normal = -normal;
            }
            rec.normal = normal;

            rec.uv = if self.uvs.is_empty() {
                Vec2::new(-1.0, -1.0)
            } else {
                let i = 3 * face;
                let uv0 = self.uvs[self.indices[i] as usize];
                let uv1 = self.uvs[self.indices[i + 1] as usize];
                let uv2 = self.uvs[self.indices[i + 2] as usize];
                (1.0 - b1 - b2) * uv0 + b1 * uv1 + b2 * uv2
            };
            rec.material = Some(Arc::clone(self.face_material(face)));
        }

        true
    }
}

fn face_positions(positions: &[Vec3], indices: &[u32], face: usize) -> [Vec3; 3] {
    let i = 3 * face;
    [
        positions[indices[i] as usize],
        positions[indices[i + 1] as usize],
        positions[indices[i + 2] as usize],
    ]
}
