use glam::Vec3;

use super::RenderEngine;
use crate::error::{RenderError, RenderResult};
use crate::sphere_mesh_render::SphereMeshPipelines;

impl RenderEngine {
    /// Acquires the next surface texture of a windowed engine.
    pub fn acquire_frame(&self) -> RenderResult<wgpu::SurfaceTexture> {
        let surface = self.surface.as_ref().ok_or(RenderError::SurfaceLost)?;
        surface.get_current_texture().map_err(|err| match err {
            wgpu::SurfaceError::Outdated => RenderError::SurfaceOutdated,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Other => RenderError::SurfaceLost,
        })
    }

    /// Records a pass that clears `color_view` and the depth buffer to the
    /// background, binds the camera, and hands the pass to `draw`.
    pub fn encode_scene_pass<F>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        background: Vec3,
        draw: F,
    ) -> RenderResult<()>
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>, &SphereMeshPipelines) -> RenderResult<()>,
    {
        let pipelines = self.sphere_mesh_pipelines()?;

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(background.x),
                        g: f64::from(background.y),
                        b: f64::from(background.z),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        draw(&mut render_pass, pipelines)
    }

    /// Renders one frame into `color_view` and submits it.
    pub fn render_to_view<F>(
        &self,
        color_view: &wgpu::TextureView,
        background: Vec3,
        draw: F,
    ) -> RenderResult<()>
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>, &SphereMeshPipelines) -> RenderResult<()>,
    {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        self.encode_scene_pass(&mut encoder, color_view, background, draw)?;
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
