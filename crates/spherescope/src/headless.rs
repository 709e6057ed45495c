//! Rendering without a window.
//!
//! Each call creates a fresh headless engine, frames the scene, renders one
//! frame (running the update callbacks once) and reads it back.

use std::path::Path;

use pollster::FutureExt;
use spherescope_render::{save_depth_image, save_image, RenderContext, RenderEngine};

use crate::app::render::{draw_scene, reset_gpu_resources, sync_engine, update_scene};
use crate::{render_error, state, Result};

fn render_headless<R>(
    width: u32,
    height: u32,
    read: impl FnOnce(&RenderEngine, &RenderContext) -> Result<R>,
) -> Result<R> {
    let _ = env_logger::try_init();
    // Fail before touching the GPU when there is nothing to render from.
    state::try_with_context(|_| ())?;

    let mut engine = RenderEngine::new_headless(width, height)
        .block_on()
        .map_err(render_error)?;
    reset_gpu_resources()?;
    sync_engine(&mut engine, true)?;

    let background = update_scene(&engine)?;
    let view = engine.offscreen_view();
    let frame = draw_scene(&engine, &view, background)?;
    let result = read(&engine, &frame);

    // The engine is dropped here; its buffers must not be reused.
    reset_gpu_resources()?;
    result
}

/// Renders the scene to tightly packed RGBA8 pixels, row-major from the top.
pub fn render_to_image(width: u32, height: u32) -> Result<Vec<u8>> {
    render_headless(width, height, |engine, _| {
        engine.capture_color().map_err(render_error)
    })
}

/// Renders the scene and saves it as PNG or JPEG, chosen by extension.
pub fn render_to_file(path: impl AsRef<Path>, width: u32, height: u32) -> Result<()> {
    let pixels = render_to_image(width, height)?;
    save_image(path.as_ref(), &pixels, width.max(1), height.max(1)).map_err(render_error)?;
    log::info!("rendered {}", path.as_ref().display());
    Ok(())
}

/// Renders the scene and returns the eye-space depth of each pixel.
///
/// Pixels that hit nothing are `0.0`.
pub fn render_depth_map(width: u32, height: u32) -> Result<Vec<f32>> {
    render_headless(width, height, |engine, frame| {
        engine.capture_depth(frame).map_err(render_error)
    })
}

/// Renders the depth map and saves it as a 16-bit grayscale PNG.
pub fn render_depth_to_file(path: impl AsRef<Path>, width: u32, height: u32) -> Result<()> {
    let depth = render_depth_map(width, height)?;
    save_depth_image(path.as_ref(), &depth, width.max(1), height.max(1)).map_err(render_error)?;
    log::info!("rendered depth map {}", path.as_ref().display());
    Ok(())
}
