//! Property tests for closest-point queries on sphere meshes.

use proptest::prelude::*;
use spherescope::{sphere_mesh_project, PrimitiveRef, SphereMesh, Vec3, Vec4};

fn flat_wedge(r: f32) -> SphereMesh {
    SphereMesh::from_primitives(
        vec![
            Vec4::new(0.0, 0.0, 0.0, r),
            Vec4::new(4.0, 0.0, 0.0, r),
            Vec4::new(0.0, 4.0, 0.0, r),
        ],
        &[],
        &[[0, 1, 2]],
    )
    .unwrap()
}

fn point_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let t = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

proptest! {
    #[test]
    fn test_single_sphere_projection(
        x in -5.0f32..5.0, y in -5.0f32..5.0, z in -5.0f32..5.0,
        r in 0.1f32..2.0,
    ) {
        let mut mesh = SphereMesh::new();
        let v = mesh.add_vertex(Vec4::new(1.0, -1.0, 0.5, r)).unwrap();
        mesh.add_sphere(v).unwrap();

        let c = Vec3::new(1.0, -1.0, 0.5);
        let p = Vec3::new(x, y, z);
        prop_assume!((p - c).length() > 1e-3);

        let hit = sphere_mesh_project(p, &mesh).unwrap();
        prop_assert!(((hit.point - c).length() - r).abs() < 1e-4);
        prop_assert!((hit.sdf - ((p - c).length() - r)).abs() < 1e-4);
        prop_assert!((hit.distance - hit.sdf.abs()).abs() < 1e-4);
        prop_assert!(matches!(hit.primitive, PrimitiveRef::Sphere(_)));
    }

    #[test]
    fn test_equal_radius_pill_is_capsule(
        x in -4.0f32..7.0, y in -4.0f32..4.0, z in -4.0f32..4.0,
        r in 0.2f32..1.5,
    ) {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 0.0, 0.0);
        let mesh = SphereMesh::from_primitives(
            vec![a.extend(r), b.extend(r)],
            &[[0, 1]],
            &[],
        )
        .unwrap();
        let p = Vec3::new(x, y, z);
        let axis_distance = point_segment_distance(p, a, b);
        prop_assume!(axis_distance > 1e-3);

        let hit = sphere_mesh_project(p, &mesh).unwrap();
        prop_assert!((hit.sdf - (axis_distance - r)).abs() < 1e-3);
        prop_assert!((point_segment_distance(hit.point, a, b) - r).abs() < 1e-3);
    }

    #[test]
    fn test_flat_wedge_interior_offsets_plane(
        x in 0.2f32..1.5, y in 0.2f32..1.5, z in 1.0f32..5.0,
        below in any::<bool>(),
        r in 0.1f32..0.8,
    ) {
        let z = if below { -z } else { z };
        let p = Vec3::new(x, y, z);

        let hit = sphere_mesh_project(p, &flat_wedge(r)).unwrap();
        prop_assert!(matches!(hit.primitive, PrimitiveRef::Wedge(_)));
        prop_assert!((hit.sdf - (z.abs() - r)).abs() < 1e-3);
        prop_assert!((hit.point - Vec3::new(x, y, r.copysign(z))).length() < 1e-3);
    }

    #[test]
    fn test_projection_never_beats_vertex_spheres(
        x in -6.0f32..6.0, y in -6.0f32..6.0, z in -6.0f32..6.0,
    ) {
        // Every vertex sphere is contained in the wedge, so the surface is
        // never farther outside than the nearest sphere.
        let mesh = flat_wedge(0.5);
        let p = Vec3::new(x, y, z);
        let hit = sphere_mesh_project(p, &mesh).unwrap();

        let nearest_sphere = mesh
            .vertex_spheres()
            .iter()
            .map(|s| (p - s.truncate()).length() - s.w)
            .fold(f32::INFINITY, f32::min);
        prop_assert!(hit.sdf <= nearest_sphere + 1e-3);
    }
}
