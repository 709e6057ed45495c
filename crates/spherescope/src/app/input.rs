use super::{
    render::reset_gpu_resources, ActiveEventLoop, App, ApplicationHandler, Arc, ElementState,
    FutureExt, KeyCode, MouseButton, MouseScrollDelta, PhysicalKey, PhysicalSize, RenderEngine,
    Window, WindowEvent, WindowId,
};
use crate::render_error;
use crate::state::try_with_context;
use spherescope_render::ProjectionMode;
use std::time::Instant;

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (title, (width, height)) =
            try_with_context(|ctx| (ctx.options.window_title.clone(), ctx.options.window_size))
                .unwrap_or_else(|_| ("spherescope".to_string(), (1280, 720)));

        let window_attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, render_error(e)),
        };

        let engine = match RenderEngine::new_windowed(window.clone()).block_on() {
            Ok(engine) => engine,
            Err(e) => return self.fail(event_loop, render_error(e)),
        };

        // Structures may still hold buffers from an earlier headless device.
        if let Err(e) = reset_gpu_resources() {
            return self.fail(event_loop, e);
        }

        self.window = Some(window);
        self.engine = Some(engine);
        self.camera_fitted = false;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let due = match (Self::frame_interval(), self.last_frame_time) {
                    (Some(interval), Some(last)) => now.duration_since(last) >= interval,
                    _ => true,
                };
                if due {
                    self.last_frame_time = Some(now);
                    if let Err(e) = self.render() {
                        return self.fail(event_loop, e);
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.left_mouse_down = pressed,
                    MouseButton::Right => self.right_mouse_down = pressed,
                    _ => {}
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = position.x - self.mouse_pos.0;
                let delta_y = position.y - self.mouse_pos.1;
                self.mouse_pos = (position.x, position.y);

                if let Some(engine) = &mut self.engine {
                    #[allow(clippy::cast_possible_truncation)]
                    let (dx, dy) = (delta_x as f32, delta_y as f32);
                    let pan = self.right_mouse_down || (self.left_mouse_down && self.shift_down);

                    if pan {
                        let scale = (engine.camera.position - engine.camera.target).length() * 0.002;
                        engine.camera.pan(-dx * scale, dy * scale);
                    } else if self.left_mouse_down {
                        engine.camera.orbit(dx * 0.01, dy * 0.01);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(engine) = &mut self.engine {
                    #[allow(clippy::cast_possible_truncation)]
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                    };
                    let scale = match engine.camera.projection_mode {
                        ProjectionMode::Perspective => {
                            (engine.camera.position - engine.camera.target).length() * 0.1
                        }
                        ProjectionMode::Orthographic => engine.camera.ortho_scale * 0.5,
                    };
                    engine.camera.zoom(scroll * scale);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => {
                            self.close_requested = true;
                        }
                        PhysicalKey::Code(KeyCode::F12) => {
                            self.request_auto_screenshot();
                        }
                        PhysicalKey::Code(KeyCode::KeyF) => {
                            // Refit the camera on the next frame.
                            self.camera_fitted = false;
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
