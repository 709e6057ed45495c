//! Structure implementations for spherescope.
//!
//! A structure pairs scene data with the GPU state that draws it. The only
//! kind is [`SphereMeshStructure`].

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod sphere_mesh;

pub use sphere_mesh::SphereMeshStructure;
