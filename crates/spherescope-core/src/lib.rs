//! Core abstractions for spherescope.
//!
//! This crate provides the geometry and bookkeeping used throughout spherescope:
//! - [`sphere_math`] primitive math over weighted spheres (pills and wedges)
//! - [`SphereMesh`] container and [`sphere_mesh_project`] closest-point queries
//! - [`Structure`] trait and the name-keyed [`Registry`]
//! - Configuration options

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Short geometric names (s0, s1, c0) mirror the formulas
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod error;
pub mod options;
pub mod projection;
pub mod registry;
pub mod sphere_math;
pub mod sphere_mesh;
pub mod structure;

pub use error::{GeometryError, GeometryResult, Result, SpherescopeError};
pub use options::Options;
pub use projection::{sphere_mesh_project, MeshProjection};
pub use registry::Registry;
pub use sphere_math::{PillTangent, Projection, WedgeRegion};
pub use sphere_mesh::{EdgeId, FaceId, PrimitiveRef, SphereId, SphereMesh, VertexId};
pub use structure::Structure;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
