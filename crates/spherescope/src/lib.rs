//! spherescope: a Rust-native viewer and toolkit for sphere meshes.
//!
//! A sphere mesh is a shape made of weighted spheres: pairs of spheres are
//! joined by pills (tapered capsules) and triples by wedges (the convex hull
//! of three spheres). spherescope renders such meshes with GPU templates and
//! answers closest-point queries against them.
//!
//! # Quick Start
//!
//! ```no_run
//! use spherescope::*;
//!
//! fn main() -> Result<()> {
//!     init()?;
//!
//!     let mesh = SphereMesh::from_primitives(
//!         vec![
//!             Vec4::new(0.0, 0.0, 0.0, 0.5),
//!             Vec4::new(2.0, 0.0, 0.0, 0.3),
//!             Vec4::new(0.0, 2.0, 0.0, 0.3),
//!         ],
//!         &[],
//!         &[[0, 1, 2]],
//!     )?;
//!     let handle = register_sphere_mesh("wedge", mesh)?;
//!
//!     let hit = handle.project(Vec3::new(1.0, 1.0, 2.0))?;
//!     println!("closest point {:?} at distance {}", hit.point, hit.distance);
//!
//!     show()
//! }
//! ```
//!
//! Without a window, [`render_to_file`] and [`render_depth_map`] draw the
//! same scene offscreen.

// Documentation lints - the facade documents behavior, not every error path
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

mod app;
mod callbacks;
mod headless;
mod init;
mod sphere_mesh;
mod state;

pub use callbacks::{
    add_update_callback, clear_update_callbacks, num_update_callbacks, remove_update_callback,
    CallbackToken,
};
pub use headless::{render_depth_map, render_depth_to_file, render_to_file, render_to_image};
pub use init::{init, is_initialized, options, set_options, show, shutdown};
pub use sphere_mesh::{
    get_sphere_mesh, project_onto, register_sphere_mesh, remove_all_structures,
    remove_structure, structure_names, with_sphere_mesh, with_sphere_mesh_ref,
    SphereMeshHandle,
};
pub use state::{with_context, with_context_mut, Context};

// Re-export core types
pub use spherescope_core::{
    sphere_math, sphere_mesh_project, EdgeId, FaceId, GeometryError, MeshProjection, Options,
    PrimitiveRef, Registry, Result, SphereId, SphereMesh, SpherescopeError, Structure, VertexId,
};

// Re-export render types
pub use spherescope_render::{Camera, Material, MaterialRegistry, ProjectionMode, RenderEngine};

pub use spherescope_structures::SphereMeshStructure;

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Wraps a render-side failure in the crate error type.
pub(crate) fn render_error(err: impl std::fmt::Display) -> SpherescopeError {
    SpherescopeError::RenderError(err.to_string())
}
