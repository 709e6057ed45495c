use super::{RenderEngine, DEPTH_FORMAT};
use crate::error::{RenderError, RenderResult};
use crate::materials::Material;
use crate::sphere_mesh_render::{SphereMeshPipelines, SphereMeshRenderer};

impl RenderEngine {
    /// Compiles the sphere-mesh pipelines with the default material.
    pub(crate) fn init_sphere_mesh_pipelines(&mut self) -> RenderResult<()> {
        let pipelines = SphereMeshPipelines::new(
            &self.device,
            &self.sphere_mesh_layouts,
            self.color_format(),
            DEPTH_FORMAT,
            &Material::default(),
        )?;
        self.sphere_mesh_pipelines = Some(pipelines);
        Ok(())
    }

    /// Recompiles the sphere-mesh pipelines for `material`.
    ///
    /// Uploaded geometry and existing bind groups stay valid.
    pub fn rebuild_pipelines(&mut self, material: &Material) -> RenderResult<()> {
        match self.sphere_mesh_pipelines.as_mut() {
            Some(pipelines) => pipelines.rebuild(&self.device, &self.sphere_mesh_layouts, material),
            None => {
                self.sphere_mesh_pipelines = Some(SphereMeshPipelines::new(
                    &self.device,
                    &self.sphere_mesh_layouts,
                    self.color_format(),
                    DEPTH_FORMAT,
                    material,
                )?);
                Ok(())
            }
        }
    }

    /// Looks up a registered material and rebuilds the pipelines with it.
    ///
    /// Unknown names are logged and ignored.
    pub fn set_material(&mut self, name: &str) -> RenderResult<()> {
        let Some(material) = self.materials.get(name).cloned() else {
            log::warn!("unknown material '{name}', keeping current material");
            return Ok(());
        };
        if self.current_material().is_some_and(|m| *m == material) {
            return Ok(());
        }
        self.rebuild_pipelines(&material)
    }

    /// Material the pipelines were compiled with.
    pub fn current_material(&self) -> Option<&Material> {
        self.sphere_mesh_pipelines
            .as_ref()
            .map(SphereMeshPipelines::material)
    }

    /// The compiled sphere-mesh pipelines.
    pub fn sphere_mesh_pipelines(&self) -> RenderResult<&SphereMeshPipelines> {
        self.sphere_mesh_pipelines
            .as_ref()
            .ok_or(RenderError::PipelinesNotInitialized)
    }

    /// Creates a renderer bound to this engine's layouts.
    pub fn create_sphere_mesh_renderer(&self, segments: u32) -> RenderResult<SphereMeshRenderer> {
        SphereMeshRenderer::new(&self.device, &self.sphere_mesh_layouts, segments)
    }
}
