//! Application window and event loop management.

mod input;
pub(crate) mod render;

pub(super) use std::sync::Arc;
use std::time::{Duration, Instant};

pub(super) use pollster::FutureExt;
pub(super) use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

pub(super) use spherescope_render::RenderEngine;

use crate::{render_error, Result, SpherescopeError};

/// The spherescope viewer state.
pub struct App {
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) close_requested: bool,
    // Mouse state for camera control
    pub(super) mouse_pos: (f64, f64),
    pub(super) left_mouse_down: bool,
    pub(super) right_mouse_down: bool,
    pub(super) shift_down: bool,
    // Screenshot state
    pub(super) screenshot_pending: Option<String>,
    pub(super) screenshot_counter: u32,
    // Whether the camera has been fitted to the scene
    pub(super) camera_fitted: bool,
    pub(super) last_frame_time: Option<Instant>,
    /// Fatal error that ended the event loop.
    pub(super) error: Option<SpherescopeError>,
}

impl App {
    /// Creates a new application.
    pub fn new() -> Self {
        Self {
            window: None,
            engine: None,
            close_requested: false,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            shift_down: false,
            screenshot_pending: None,
            screenshot_counter: 0,
            camera_fitted: false,
            last_frame_time: None,
            error: None,
        }
    }

    /// Requests a screenshot with an auto-generated filename.
    pub fn request_auto_screenshot(&mut self) {
        let filename = format!("screenshot_{:04}.png", self.screenshot_counter);
        self.screenshot_counter += 1;
        self.screenshot_pending = Some(filename);
    }

    /// Minimum time between frames for the configured `max_fps`.
    pub(super) fn frame_interval() -> Option<Duration> {
        let max_fps = crate::state::try_with_context(|ctx| ctx.options.max_fps).unwrap_or(0);
        (max_fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(max_fps)))
    }

    /// Stops the event loop, keeping `err` to report from [`run_app`].
    pub(super) fn fail(&mut self, event_loop: &ActiveEventLoop, err: SpherescopeError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the viewer until its window is closed.
pub fn run_app() -> Result<()> {
    let event_loop = EventLoop::new().map_err(render_error)?;
    let mut app = App::new();

    event_loop.run_app(&mut app).map_err(render_error)?;
    app.error.map_or(Ok(()), Err)
}
