//! The sphere-mesh container.
//!
//! Vertices carry weighted spheres; edges are pills, faces are wedges, and
//! standalone entries mark vertices drawn as plain spheres. Handles are plain
//! indices and are only meaningful for the mesh that issued them.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result, SpherescopeError};
use crate::sphere_math::{self, center};

macro_rules! mesh_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Position of this element in its mesh.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

mesh_handle!(
    /// Handle to a vertex (a weighted sphere).
    VertexId
);
mesh_handle!(
    /// Handle to an edge (a pill).
    EdgeId
);
mesh_handle!(
    /// Handle to a face (a wedge).
    FaceId
);
mesh_handle!(
    /// Handle to a standalone sphere.
    SphereId
);

/// A reference to one primitive of a sphere mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveRef {
    Wedge(FaceId),
    Pill(EdgeId),
    Sphere(SphereId),
}

/// A shape made of weighted spheres joined by pills and wedges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SphereMesh {
    spheres: Vec<Vec4>,
    edges: Vec<[VertexId; 2]>,
    faces: Vec<[VertexId; 3]>,
    standalone: Vec<VertexId>,
}

impl SphereMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from raw sphere, edge and face arrays.
    ///
    /// Indices refer to positions in `spheres`, and every sphere must be
    /// finite with a non-negative radius.
    pub fn from_primitives(
        spheres: Vec<Vec4>,
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
    ) -> Result<Self> {
        let mut mesh = Self::default();
        for sphere in spheres {
            mesh.add_vertex(sphere)?;
        }
        for &[a, b] in edges {
            mesh.add_edge(VertexId(a), VertexId(b))?;
        }
        for &[a, b, c] in faces {
            mesh.add_face(VertexId(a), VertexId(b), VertexId(c))?;
        }
        Ok(mesh)
    }

    /// Parses a mesh from JSON and checks its spheres and connectivity.
    pub fn from_json(json: &str) -> Result<Self> {
        let mesh: Self = serde_json::from_str(json)?;
        mesh.validate()?;
        Ok(mesh)
    }

    /// Serializes the mesh to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Adds a vertex carrying `sphere = (cx, cy, cz, r)`.
    ///
    /// Fails if the sphere is not finite or its radius is negative.
    pub fn add_vertex(&mut self, sphere: Vec4) -> Result<VertexId> {
        let id = VertexId(handle_index(self.spheres.len()));
        check_vertex_sphere(id, sphere)?;
        self.spheres.push(sphere);
        Ok(id)
    }

    /// Adds a pill between two distinct vertices.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        self.check_distinct(&[a, b])?;
        let id = EdgeId(handle_index(self.edges.len()));
        self.edges.push([a, b]);
        Ok(id)
    }

    /// Adds a wedge over three distinct vertices.
    pub fn add_face(&mut self, a: VertexId, b: VertexId, c: VertexId) -> Result<FaceId> {
        self.check_distinct(&[a, b, c])?;
        let id = FaceId(handle_index(self.faces.len()));
        self.faces.push([a, b, c]);
        Ok(id)
    }

    /// Marks a vertex to be drawn as a standalone sphere.
    pub fn add_sphere(&mut self, v: VertexId) -> Result<SphereId> {
        self.check_vertex(v)?;
        let id = SphereId(handle_index(self.standalone.len()));
        self.standalone.push(v);
        Ok(id)
    }

    /// Replaces the sphere stored at a vertex.
    ///
    /// The mesh is left unchanged if the new sphere is invalid.
    pub fn set_sphere(&mut self, v: VertexId, sphere: Vec4) -> Result<()> {
        self.check_vertex(v)?;
        check_vertex_sphere(v, sphere)?;
        self.spheres[v.index()] = sphere;
        Ok(())
    }

    /// Sphere data of a vertex.
    ///
    /// # Panics
    ///
    /// Panics if `v` was not issued by this mesh.
    pub fn sphere(&self, v: VertexId) -> Vec4 {
        self.spheres[v.index()]
    }

    /// Sphere data of a vertex, or `None` for a foreign handle.
    pub fn get_sphere(&self, v: VertexId) -> Option<Vec4> {
        self.spheres.get(v.index()).copied()
    }

    /// All vertex spheres, indexed by vertex.
    pub fn vertex_spheres(&self) -> &[Vec4] {
        &self.spheres
    }

    pub fn num_vertices(&self) -> usize {
        self.spheres.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_spheres(&self) -> usize {
        self.standalone.len()
    }

    /// Number of renderable and queryable primitives.
    pub fn num_primitives(&self) -> usize {
        self.faces.len() + self.edges.len() + self.standalone.len()
    }

    /// Returns true if the mesh has no primitives.
    pub fn is_empty(&self) -> bool {
        self.num_primitives() == 0
    }

    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexId> + '_ {
        (0..self.spheres.len()).map(|i| VertexId(handle_index(i)))
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(|i| EdgeId(handle_index(i)))
    }

    pub fn faces(&self) -> impl ExactSizeIterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(|i| FaceId(handle_index(i)))
    }

    pub fn spheres(&self) -> impl ExactSizeIterator<Item = SphereId> + '_ {
        (0..self.standalone.len()).map(|i| SphereId(handle_index(i)))
    }

    pub fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
        self.edges[e.index()]
    }

    pub fn face_vertices(&self, f: FaceId) -> [VertexId; 3] {
        self.faces[f.index()]
    }

    pub fn sphere_vertex(&self, s: SphereId) -> VertexId {
        self.standalone[s.index()]
    }

    /// The two endpoint spheres of a pill.
    pub fn edge_spheres(&self, e: EdgeId) -> [Vec4; 2] {
        self.edge_vertices(e).map(|v| self.sphere(v))
    }

    /// The three corner spheres of a wedge.
    pub fn face_spheres(&self, f: FaceId) -> [Vec4; 3] {
        self.face_vertices(f).map(|v| self.sphere(v))
    }

    /// The three pills bounding a wedge, as `(0,1)`, `(1,2)`, `(2,0)`.
    pub fn face_pills(&self, f: FaceId) -> [[Vec4; 2]; 3] {
        let [a, b, c] = self.face_spheres(f);
        [[a, b], [b, c], [c, a]]
    }

    /// Axis-aligned box enclosing every vertex sphere.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        if self.spheres.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for &s in &self.spheres {
            min = min.min(center(s) - Vec3::splat(s.w));
            max = max.max(center(s) + Vec3::splat(s.w));
        }
        Some((min, max))
    }

    /// Lists primitives whose geometry cannot be evaluated, with the reason.
    pub fn degenerate_primitives(&self) -> Vec<(PrimitiveRef, GeometryError)> {
        let mut out = Vec::new();
        for f in self.faces() {
            let [s0, s1, s2] = self.face_spheres(f);
            let checked = [s0, s1, s2]
                .into_iter()
                .try_for_each(sphere_math::check_sphere)
                .and_then(|()| sphere_math::wedge_normal(s0, s1, s2));
            if let Err(e) = checked {
                out.push((PrimitiveRef::Wedge(f), e));
            }
        }
        for e in self.edges() {
            let [s0, s1] = self.edge_spheres(e);
            let checked = [s0, s1]
                .into_iter()
                .try_for_each(sphere_math::check_sphere)
                .and_then(|()| sphere_math::pill_tangent(s0, s1));
            if let Err(err) = checked {
                out.push((PrimitiveRef::Pill(e), err));
            }
        }
        for s in self.spheres() {
            if let Err(err) = sphere_math::check_sphere(self.sphere(self.sphere_vertex(s))) {
                out.push((PrimitiveRef::Sphere(s), err));
            }
        }
        out
    }

    /// Checks that every sphere is valid and every primitive references
    /// existing, distinct vertices.
    pub fn validate(&self) -> Result<()> {
        for (v, &sphere) in self.vertices().zip(&self.spheres) {
            check_vertex_sphere(v, sphere)?;
        }
        for e in &self.edges {
            self.check_distinct(e)?;
        }
        for f in &self.faces {
            self.check_distinct(f)?;
        }
        for &v in &self.standalone {
            self.check_vertex(v)?;
        }
        Ok(())
    }

    fn check_vertex(&self, v: VertexId) -> Result<()> {
        if v.index() < self.spheres.len() {
            Ok(())
        } else {
            Err(SpherescopeError::InvalidVertex {
                index: v.index(),
                count: self.spheres.len(),
            })
        }
    }

    fn check_distinct(&self, vs: &[VertexId]) -> Result<()> {
        for (i, &v) in vs.iter().enumerate() {
            self.check_vertex(v)?;
            if vs[..i].contains(&v) {
                return Err(SpherescopeError::DuplicateVertex(v.index()));
            }
        }
        Ok(())
    }
}

fn check_vertex_sphere(v: VertexId, sphere: Vec4) -> Result<()> {
    sphere_math::check_sphere(sphere).map_err(|reason| SpherescopeError::InvalidSphere {
        index: v.index(),
        reason,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn handle_index(i: usize) -> u32 {
    i as u32
}
