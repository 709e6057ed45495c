//! Frame rendering shared by the viewer window and headless capture.

use std::path::Path;

use glam::{Mat4, Vec3};
use spherescope_core::Result;
use spherescope_render::{save_image, RenderContext, RenderError};
use spherescope_structures::SphereMeshStructure;

use super::{App, RenderEngine};
use crate::{callbacks, render_error, state};

/// Drops every structure's GPU data so the next frame re-uploads it.
///
/// Needed whenever a new engine (and device) takes over.
pub(crate) fn reset_gpu_resources() -> Result<()> {
    state::try_with_context_mut(|ctx| {
        ctx.structures
            .iter_mut()
            .for_each(SphereMeshStructure::clear_gpu_resources);
    })
}

/// Applies the configured material and optionally frames the scene.
///
/// Returns `true` if the camera was fitted.
pub(crate) fn sync_engine(engine: &mut RenderEngine, fit_camera: bool) -> Result<bool> {
    let (material, bbox, has_structures) = state::try_with_context(|ctx| {
        (
            ctx.options.material.clone(),
            ctx.bounding_box,
            !ctx.structures.is_empty(),
        )
    })?;
    engine.set_material(&material).map_err(render_error)?;

    let (min, max) = bbox;
    let fit = fit_camera && has_structures && min.is_finite() && max.is_finite();
    if fit {
        engine.camera.look_at_box(min, max);
    }
    Ok(fit)
}

/// Runs the update callbacks and uploads changed structures.
///
/// Returns the background color for the frame.
pub(crate) fn update_scene(engine: &RenderEngine) -> Result<Vec3> {
    callbacks::run_update_callbacks();

    state::try_with_context_mut(|ctx| {
        for structure in ctx.structures.iter_mut() {
            structure.prepare(engine).map_err(render_error)?;
        }
        Ok(ctx.options.background_color)
    })?
}

/// Draws every registered structure into `view`.
pub(crate) fn draw_scene(
    engine: &RenderEngine,
    view: &wgpu::TextureView,
    background: Vec3,
) -> Result<RenderContext> {
    let frame = engine.render_context(Mat4::IDENTITY, false);
    engine.update_camera_uniforms(&frame);

    state::try_with_context(|ctx| {
        engine.render_to_view(view, background, |pass, pipelines| {
            for structure in ctx.structures.iter() {
                structure.draw(&engine.queue, pass, pipelines, &frame)?;
            }
            Ok(())
        })
    })?
    .map_err(render_error)?;
    Ok(frame)
}

/// Renders the scene offscreen and writes it to `path`.
pub(crate) fn capture_screenshot(
    engine: &mut RenderEngine,
    path: impl AsRef<Path>,
    background: Vec3,
) -> Result<()> {
    let view = engine.offscreen_view();
    draw_scene(engine, &view, background)?;
    let pixels = engine.capture_color().map_err(render_error)?;
    save_image(path, &pixels, engine.width, engine.height).map_err(render_error)
}

impl App {
    /// Renders one frame to the window surface.
    pub(super) fn render(&mut self) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        if sync_engine(engine, !self.camera_fitted)? {
            self.camera_fitted = true;
        }
        let background = update_scene(engine)?;

        if let Some(filename) = self.screenshot_pending.take() {
            match capture_screenshot(engine, &filename, background) {
                Ok(()) => log::info!("Screenshot saved to {filename}"),
                Err(e) => log::error!("Failed to save screenshot: {e}"),
            }
        }

        let output = match engine.acquire_frame() {
            Ok(output) => output,
            Err(RenderError::SurfaceLost | RenderError::SurfaceOutdated) => {
                engine.resize(engine.width, engine.height);
                return Ok(());
            }
            Err(RenderError::Timeout) => {
                log::warn!("Surface timeout");
                return Ok(());
            }
            Err(e) => return Err(render_error(e)),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        draw_scene(engine, &view, background)?;
        output.present();
        Ok(())
    }
}
