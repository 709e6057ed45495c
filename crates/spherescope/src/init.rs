use crate::{callbacks, state, Options, Result};

/// Initializes spherescope with default options.
///
/// This must be called before any other spherescope function.
pub fn init() -> Result<()> {
    state::init_context()?;
    log::info!("spherescope initialized");
    Ok(())
}

/// Returns whether spherescope has been initialized.
#[must_use]
pub fn is_initialized() -> bool {
    state::is_initialized()
}

/// Shuts down spherescope, dropping every structure and update callback.
///
/// [`init()`] may be called again afterwards.
pub fn shutdown() {
    state::shutdown_context();
    callbacks::clear_update_callbacks();
    log::info!("spherescope shut down");
}

/// Opens the viewer window and blocks until it is closed.
///
/// Left-drag orbits, right-drag or shift-drag pans, the wheel zooms,
/// `F` refits the camera, `F12` saves a screenshot and `Esc` quits.
///
/// # Example
///
/// ```no_run
/// use spherescope::*;
///
/// fn main() -> Result<()> {
///     init()?;
///     let mut mesh = SphereMesh::new();
///     let v = mesh.add_vertex(Vec4::new(0.0, 0.0, 0.0, 1.0))?;
///     mesh.add_sphere(v)?;
///     register_sphere_mesh("ball", mesh)?;
///     show()
/// }
/// ```
pub fn show() -> Result<()> {
    let _ = env_logger::try_init();
    state::try_with_context(|_| ())?;
    crate::app::run_app()
}

/// Replaces the global options.
///
/// Scene extents are recomputed; the material and camera fit are applied
/// on the next frame.
pub fn set_options(options: Options) -> Result<()> {
    state::try_with_context_mut(|ctx| {
        ctx.options = options;
        ctx.update_extents();
    })
}

/// Copy of the current options.
pub fn options() -> Result<Options> {
    state::try_with_context(|ctx| ctx.options.clone())
}
