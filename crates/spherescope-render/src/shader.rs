//! Shader assembly.
//!
//! Sphere-mesh shaders are assembled from WGSL fragments: shared declarations,
//! one primitive-specific vertex stage, the material's shading function and
//! the common fragment stage.

use crate::error::{RenderError, RenderResult};
use crate::materials::ShadingModel;

/// Shared uniforms, bindings and helpers.
pub const COMMON_WGSL: &str = include_str!("shaders/common.wgsl");
/// Common fragment stage calling `shade`.
pub const FRAGMENT_WGSL: &str = include_str!("shaders/fragment.wgsl");
/// Instanced sphere vertex stage.
pub const SPHERE_WGSL: &str = include_str!("shaders/sphere_mesh_sphere.wgsl");
/// Tapered cone vertex stage.
pub const CONE_WGSL: &str = include_str!("shaders/sphere_mesh_cone.wgsl");
/// Wedge triangle vertex stage.
pub const TRIANGLE_WGSL: &str = include_str!("shaders/sphere_mesh_triangle.wgsl");

/// Builder combining WGSL fragments into one shader module.
pub struct ShaderBuilder {
    common: String,
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    shading: Option<ShadingModel>,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a builder seeded with the shared declarations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: COMMON_WGSL.to_string(),
            vertex_source: None,
            fragment_source: None,
            shading: None,
            label: None,
        }
    }

    /// Sets the vertex stage source (WGSL).
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment stage source (WGSL).
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Sets the shading function linked into the fragment stage.
    #[must_use]
    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = Some(shading);
        self
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the shader module.
    pub fn build_module(self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self.combined_source()?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        }))
    }

    /// The full WGSL text, in declaration order.
    pub fn combined_source(&self) -> RenderResult<String> {
        let vertex = self
            .vertex_source
            .as_ref()
            .ok_or_else(|| RenderError::ShaderCompilationFailed("missing vertex shader".into()))?;
        let fragment = self.fragment_source.as_ref().ok_or_else(|| {
            RenderError::ShaderCompilationFailed("missing fragment shader".into())
        })?;
        let shading = self.shading.unwrap_or_default().source();

        Ok(format!("{}\n\n{vertex}\n\n{shading}\n\n{fragment}", self.common))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
