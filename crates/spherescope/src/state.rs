//! Global state management for spherescope.

use std::sync::{OnceLock, PoisonError, RwLock};

use glam::Vec3;
use spherescope_core::{Options, Registry, Result, SpherescopeError};
use spherescope_structures::SphereMeshStructure;

/// Global context singleton.
static CONTEXT: OnceLock<RwLock<Context>> = OnceLock::new();

/// The global context containing all spherescope state.
pub struct Context {
    /// Whether spherescope has been initialized.
    pub initialized: bool,

    /// Registered sphere meshes.
    pub structures: Registry<SphereMeshStructure>,

    /// Global options.
    pub options: Options,

    /// Representative length scale for all registered structures.
    pub length_scale: f32,

    /// Axis-aligned bounding box for all registered structures.
    pub bounding_box: (Vec3, Vec3),
}

impl Default for Context {
    fn default() -> Self {
        Self {
            initialized: false,
            structures: Registry::new(),
            options: Options::default(),
            length_scale: 1.0,
            bounding_box: (Vec3::ZERO, Vec3::ONE),
        }
    }
}

impl Context {
    /// Computes the center of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.bounding_box.0 + self.bounding_box.1) * 0.5
    }

    /// Updates the global bounding box and length scale from all structures.
    pub fn update_extents(&mut self) {
        if !self.options.auto_compute_scene_extents {
            return;
        }
        if let Some((min, max)) = self.structures.bounding_box() {
            self.bounding_box = (min, max);
            self.length_scale = (max - min).length();
        } else {
            self.bounding_box = (Vec3::ZERO, Vec3::ONE);
            self.length_scale = 1.0;
        }
    }
}

/// Initializes the global context.
///
/// Can be called again after [`shutdown_context`].
pub fn init_context() -> Result<()> {
    let lock = CONTEXT.get_or_init(|| RwLock::new(Context::default()));
    let mut ctx = lock.write().unwrap_or_else(PoisonError::into_inner);
    if ctx.initialized {
        return Err(SpherescopeError::AlreadyInitialized);
    }
    *ctx = Context {
        initialized: true,
        ..Context::default()
    };
    Ok(())
}

/// Returns whether the context has been initialized.
pub fn is_initialized() -> bool {
    CONTEXT
        .get()
        .and_then(|lock| lock.read().ok())
        .is_some_and(|ctx| ctx.initialized)
}

/// Access the global context for reading.
///
/// # Panics
///
/// Panics if spherescope has not been initialized.
pub fn with_context<F, R>(f: F) -> R
where
    F: FnOnce(&Context) -> R,
{
    let lock = CONTEXT.get().expect("spherescope not initialized");
    let guard = lock.read().expect("context lock poisoned");
    f(&guard)
}

/// Access the global context for writing.
///
/// # Panics
///
/// Panics if spherescope has not been initialized.
pub fn with_context_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Context) -> R,
{
    let lock = CONTEXT.get().expect("spherescope not initialized");
    let mut guard = lock.write().expect("context lock poisoned");
    f(&mut guard)
}

/// Try to access the global context for reading.
///
/// Returns [`SpherescopeError::NotInitialized`] before [`init_context`] or
/// after [`shutdown_context`].
pub fn try_with_context<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&Context) -> R,
{
    let guard = CONTEXT
        .get()
        .and_then(|lock| lock.read().ok())
        .filter(|ctx| ctx.initialized)
        .ok_or(SpherescopeError::NotInitialized)?;
    Ok(f(&guard))
}

/// Try to access the global context for writing.
pub fn try_with_context_mut<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&mut Context) -> R,
{
    let mut guard = CONTEXT
        .get()
        .and_then(|lock| lock.write().ok())
        .filter(|ctx| ctx.initialized)
        .ok_or(SpherescopeError::NotInitialized)?;
    Ok(f(&mut guard))
}

/// Shuts down the global context, dropping every registered structure.
pub fn shutdown_context() {
    if let Some(lock) = CONTEXT.get() {
        if let Ok(mut ctx) = lock.write() {
            ctx.initialized = false;
            ctx.structures.clear();
        }
    }
}
