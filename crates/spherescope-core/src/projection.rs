//! Closest-primitive queries against a whole sphere mesh.

use glam::{Vec3, Vec4};

use crate::error::{GeometryResult, Result, SpherescopeError};
use crate::sphere_math::{self, Projection, WedgeRegion};
use crate::sphere_mesh::{PrimitiveRef, SphereMesh};

/// Result of projecting a point onto a sphere mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshProjection {
    /// Closest point on the mesh surface.
    pub point: Vec3,
    /// Euclidean distance between the query and `point`.
    pub distance: f32,
    /// Signed distance, negative when the query is inside the winning primitive.
    pub sdf: f32,
    /// The primitive that produced `point`.
    pub primitive: PrimitiveRef,
    /// First endpoint of the supporting pill.
    pub s0: Vec4,
    /// Second endpoint of the supporting pill.
    pub s1: Vec4,
    /// Interpolated sphere touching `point`.
    pub contact: Vec4,
}

struct Candidate {
    projection: Projection,
    s0: Vec4,
    s1: Vec4,
    contact: Vec4,
}

/// Projects `p` onto the closest primitive of `mesh`.
///
/// Faces are scanned first, then edges, then standalone spheres, each in index
/// order. The first primitive reaching the minimum distance wins. Degenerate
/// primitives, and primitives touching an invalid sphere, are skipped.
pub fn sphere_mesh_project(p: Vec3, mesh: &SphereMesh) -> Result<MeshProjection> {
    if mesh.is_empty() {
        return Err(SpherescopeError::EmptyMeshQuery);
    }

    let mut best: Option<MeshProjection> = None;
    let mut consider = |primitive: PrimitiveRef, candidate: GeometryResult<Candidate>| {
        let candidate = match candidate {
            Ok(c) => c,
            Err(err) => {
                log::trace!("skipping degenerate {primitive:?}: {err}");
                return;
            }
        };
        let distance = (candidate.projection.point - p).length();
        if !distance.is_finite() {
            log::trace!("skipping {primitive:?}: non-finite projection");
            return;
        }
        if best.as_ref().map_or(true, |b| distance < b.distance) {
            best = Some(MeshProjection {
                point: candidate.projection.point,
                distance,
                sdf: candidate.projection.sdf,
                primitive,
                s0: candidate.s0,
                s1: candidate.s1,
                contact: candidate.contact,
            });
        }
    };

    for f in mesh.faces() {
        let [s0, s1, s2] = mesh.face_spheres(f);
        consider(PrimitiveRef::Wedge(f), wedge_candidate(p, s0, s1, s2));
    }
    for e in mesh.edges() {
        let [s0, s1] = mesh.edge_spheres(e);
        consider(PrimitiveRef::Pill(e), pill_candidate(p, s0, s1));
    }
    for s in mesh.spheres() {
        let sphere = mesh.sphere(mesh.sphere_vertex(s));
        consider(PrimitiveRef::Sphere(s), sphere_candidate(p, sphere));
    }

    best.ok_or(SpherescopeError::DegenerateMesh(mesh.num_primitives()))
}

fn sphere_candidate(p: Vec3, sphere: Vec4) -> GeometryResult<Candidate> {
    sphere_math::check_sphere(sphere)?;
    Ok(Candidate {
        projection: sphere_math::sphere_project(p, sphere),
        s0: sphere,
        s1: sphere,
        contact: sphere,
    })
}

fn pill_candidate(p: Vec3, s0: Vec4, s1: Vec4) -> GeometryResult<Candidate> {
    sphere_math::check_sphere(s0)?;
    sphere_math::check_sphere(s1)?;
    let contact = sphere_math::pill_contact_sphere(p, s0, s1)?;
    Ok(Candidate {
        projection: sphere_math::pill_project(p, s0, s1)?,
        s0,
        s1,
        contact,
    })
}

fn wedge_candidate(p: Vec3, s0: Vec4, s1: Vec4, s2: Vec4) -> GeometryResult<Candidate> {
    [s0, s1, s2].into_iter().try_for_each(sphere_math::check_sphere)?;
    match sphere_math::wedge_region(p, s0, s1, s2)? {
        WedgeRegion::Interior { sphere, normal, .. } => {
            let c = sphere_math::center(sphere);
            Ok(Candidate {
                projection: Projection {
                    point: c + normal * sphere.w,
                    sdf: (p - c).dot(normal) - sphere.w,
                },
                s0: sphere,
                s1: sphere,
                contact: sphere,
            })
        }
        WedgeRegion::Edge { s0, s1 } => pill_candidate(p, s0, s1),
    }
}
