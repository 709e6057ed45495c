#![allow(clippy::cast_precision_loss)]
//! Demo of sphere-mesh rendering and closest-point queries.
//!
//! Builds a small creature out of pills and wedges, projects a ring of
//! query points onto it, then orbits a query point around it every frame.
//! The supporting pill of each match is drawn in red, its contact sphere in
//! green and the projected point in blue.
//! Pass `--headless` to render `projection_demo.png` and a depth map instead
//! of opening a window.

use spherescope::{
    self, Mat4, MeshProjection, PrimitiveRef, SphereMesh, SphereMeshHandle, Vec3, Vec4,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A flat wedge body with a pill tail and a standalone head sphere.
fn build_creature() -> spherescope::Result<SphereMesh> {
    let mut mesh = SphereMesh::from_primitives(
        vec![
            Vec4::new(0.0, 0.0, 0.0, 0.6),
            Vec4::new(2.0, 0.0, 0.0, 0.4),
            Vec4::new(1.0, 1.6, 0.0, 0.45),
            Vec4::new(-1.8, -0.4, 0.0, 0.15),
        ],
        &[[0, 3]],
        &[[0, 1, 2]],
    )?;
    let head = mesh.add_vertex(Vec4::new(1.0, 2.6, 0.0, 0.5))?;
    mesh.add_sphere(head)?;
    Ok(mesh)
}

/// A mesh holding one standalone sphere.
fn ball(sphere: Vec4) -> spherescope::Result<SphereMesh> {
    let mut mesh = SphereMesh::new();
    let v = mesh.add_vertex(sphere)?;
    mesh.add_sphere(v)?;
    Ok(mesh)
}

fn inflate(sphere: Vec4, factor: f32) -> Vec4 {
    sphere.truncate().extend(sphere.w * factor)
}

/// The pill supporting a match, slightly inflated so it shows through.
///
/// Sphere and wedge-interior matches support the point with a single sphere.
fn highlight_pill(hit: &MeshProjection) -> spherescope::Result<SphereMesh> {
    let s0 = inflate(hit.s0, 1.01);
    let s1 = inflate(hit.s1, 1.01);
    if hit.s0.truncate().distance(hit.s1.truncate()) <= spherescope::sphere_math::EPSILON {
        return ball(s0.max(s1));
    }
    SphereMesh::from_primitives(vec![s0, s1], &[[0, 1]], &[])
}

fn query_at(t: f32) -> Vec3 {
    Vec3::new(1.0 + 3.0 * t.cos(), 0.8 + 3.0 * t.sin(), 0.8 * (2.0 * t).sin())
}

struct Markers {
    pill: SphereMeshHandle,
    contact: SphereMeshHandle,
    target: SphereMeshHandle,
    projection: SphereMeshHandle,
}

impl Markers {
    fn register(creature: &SphereMeshHandle, query: Vec3) -> spherescope::Result<Self> {
        let hit = creature.project(query)?;
        let pill = spherescope::register_sphere_mesh("highlight_pill", highlight_pill(&hit)?)?;
        pill.set_color(Vec3::new(1.0, 0.0, 0.0))?;
        let contact =
            spherescope::register_sphere_mesh("contact_sphere", ball(inflate(hit.contact, 1.02))?)?;
        contact.set_color(Vec3::new(0.0, 1.0, 0.0))?.set_wireframe(true)?;
        let target = spherescope::register_sphere_mesh("query", ball(query.extend(0.08))?)?;
        target.set_color(Vec3::new(0.9, 0.9, 0.9))?;
        let projection =
            spherescope::register_sphere_mesh("projection", ball(hit.point.extend(0.05))?)?;
        projection.set_color(Vec3::new(0.0, 0.0, 1.0))?;
        Ok(Self {
            pill,
            contact,
            target,
            projection,
        })
    }

    /// Re-projects `query` and moves every marker to the new match.
    fn update(&self, creature: &SphereMeshHandle, query: Vec3) -> spherescope::Result<()> {
        let hit = creature.project(query)?;
        self.pill.update_mesh(highlight_pill(&hit)?)?;
        self.contact.update_mesh(ball(inflate(hit.contact, 1.02))?)?;
        self.target.update_mesh(ball(query.extend(0.08))?)?;
        self.projection.update_mesh(ball(hit.point.extend(0.05))?)?;
        Ok(())
    }
}

fn main() -> spherescope::Result<()> {
    spherescope::init()?;

    let creature = spherescope::register_sphere_mesh("creature", build_creature()?)?;
    creature.set_color(Vec3::new(0.35, 0.55, 0.85))?;

    // A capsule off to the side, drawn as outlines where supported.
    let capsule = SphereMesh::from_primitives(
        vec![Vec4::new(0.0, 0.0, 0.0, 0.3), Vec4::new(0.0, 1.5, 0.0, 0.2)],
        &[[0, 1]],
        &[],
    )?;
    spherescope::register_sphere_mesh("capsule", capsule)?
        .set_transform(Mat4::from_translation(Vec3::new(3.5, 0.0, 0.0)))?
        .set_wireframe(true)?;

    println!("Projection Demo");
    println!("===============");
    for i in 0..8 {
        let query = query_at(i as f32 / 8.0 * std::f32::consts::TAU);
        let hit = creature.project(query)?;
        let kind = match hit.primitive {
            PrimitiveRef::Wedge(_) => "wedge",
            PrimitiveRef::Pill(_) => "pill",
            PrimitiveRef::Sphere(_) => "sphere",
        };
        println!(
            "  {query:.2?} -> {:.2?} on {kind:<6} (sdf {:+.3})",
            hit.point, hit.sdf
        );
    }

    let markers = Markers::register(&creature, query_at(0.0))?;

    // Breathe the head sphere and orbit the query point.
    let frame = Arc::new(AtomicU32::new(0));
    let animated = creature.clone();
    spherescope::add_update_callback(move || {
        let t = frame.fetch_add(1, Ordering::Relaxed) as f32 * 0.02;
        let head = Vec4::new(1.0, 2.6, 0.0, 0.5 + 0.1 * t.sin());
        let breathed = spherescope::with_sphere_mesh("creature", |s| {
            s.edit_mesh(|mesh| match mesh.vertices().last() {
                Some(v) => mesh.set_sphere(v, head),
                None => Ok(()),
            })
        });
        if let Err(err) = breathed.and_then(|r| r) {
            log::warn!("failed to animate the head sphere: {err}");
        }
        if let Err(err) = markers.update(&animated, query_at(t)) {
            log::warn!("failed to update the projection markers: {err}");
        }
    });

    if std::env::args().any(|arg| arg == "--headless") {
        spherescope::render_to_file("projection_demo.png", 800, 600)?;
        spherescope::render_depth_to_file("projection_demo_depth.png", 800, 600)?;
        println!("Wrote projection_demo.png and projection_demo_depth.png");
        return Ok(());
    }

    println!();
    println!("Controls:");
    println!("  - Left drag: Orbit camera");
    println!("  - Right drag: Pan camera");
    println!("  - Scroll: Zoom");
    println!("  - F: Refit camera");
    println!("  - F12: Screenshot");
    println!("  - ESC: Exit");

    spherescope::show()
}
