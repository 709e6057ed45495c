//! Rendering backend for spherescope.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - GPU resource management (buffers, named vertex attributes, template meshes)
//! - WGSL shader assembly for the sphere, cone and wedge pipelines
//! - Materials, the orbit camera and the per-frame [`RenderContext`]
//! - [`SphereMeshRenderer`] and offscreen color/depth capture

// Documentation lints
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::many_single_char_names)]
// Graphics code has many intentional numeric casts
#![allow(clippy::cast_precision_loss)]

pub mod buffer;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu_mesh;
pub mod materials;
pub mod render_context;
pub mod screenshot;
pub mod shader;
pub mod sphere_mesh_render;
pub mod template_meshes;

pub use camera::{Camera, ProjectionMode};
pub use engine::{CameraUniforms, OffscreenTarget, RenderEngine, DEPTH_FORMAT};
pub use error::{RenderError, RenderResult};
pub use gpu_mesh::{AttributeSlot, GpuAttribute, GpuMesh, VNORMAL, VPOSITION, VSPHERE};
pub use materials::{Material, MaterialRegistry, ShadingModel};
pub use render_context::RenderContext;
pub use screenshot::{save_depth_image, save_image, save_to_buffer, ScreenshotError};
pub use shader::ShaderBuilder;
pub use sphere_mesh_render::{
    ConeUniforms, ObjectUniforms, PipelineSet, SphereMeshDrawData, SphereMeshLayouts,
    SphereMeshPipelines, SphereMeshRenderer, TriangleUniforms,
};
pub use template_meshes::TemplateMesh;
