//! Orbit camera used by the viewer and headless renders.

use glam::{Mat4, Vec3};

use crate::render_context::RenderContext;

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// A camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Half height of the view volume in orthographic mode.
    pub ortho_scale: f32,
}

impl Camera {
    /// Creates a camera on the +z axis looking at the origin.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_scale: 1.0,
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Sets the vertical field of view, clamped to a usable range.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov = degrees.clamp(10.0, 170.0).to_radians();
    }

    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_scale;
                let half_width = half_height * self.aspect_ratio;
                // Depth range straddles the target so geometry behind it is kept.
                let dist = (self.position - self.target).length();
                let depth = (dist + self.far).max(self.ortho_scale * 100.0);
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    -depth,
                    depth,
                )
            }
        }
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Orbits around the target (turntable style, constrained to `up`).
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Translates camera and target in the view plane.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.right() * delta_x + self.up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves toward the target (perspective) or shrinks the view volume
    /// (orthographic).
    pub fn zoom(&mut self, delta: f32) {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                let direction = self.forward();
                let distance = (self.position - self.target).length();
                self.position = self.target - direction * (distance - delta).max(0.1);
            }
            ProjectionMode::Orthographic => {
                let factor = 1.0 - delta * 0.4;
                self.ortho_scale = (self.ortho_scale * factor).clamp(0.01, 1000.0);
            }
        }
    }

    /// Frames the given bounding box.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let extents = max - min;
        let size = extents.length().max(1e-3);

        self.target = center;
        self.position = center + Vec3::new(0.0, 0.0, size * 1.5);
        self.near = size * 0.001;
        self.far = size * 100.0;
        self.ortho_scale = (extents.y.max(extents.x / self.aspect_ratio) * 0.6).max(0.1);
    }

    /// Per-frame render context for a structure placed with `model`.
    #[must_use]
    pub fn render_context(&self, model: Mat4, wireframe: bool) -> RenderContext {
        RenderContext {
            aspect: self.aspect_ratio,
            vfov: self.fov,
            near: self.near,
            far: self.far,
            eye: self.position,
            forward: self.forward(),
            up: self.up,
            model,
            view: self.view_matrix(),
            projection: self.projection_matrix(),
            wireframe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::new(1.5);
        assert_eq!(camera.projection_mode, ProjectionMode::Perspective);
        assert!((camera.fov_degrees() - 45.0).abs() < 1e-4);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let mut camera = Camera::new(1.0);
        camera.orbit(0.7, 0.3);
        assert!(((camera.position - camera.target).length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut camera = Camera::new(1.0);
        camera.zoom(1.0);
        assert!((camera.position.z - 2.0).abs() < 1e-5);
        camera.zoom(10.0);
        assert!((camera.position.z - 0.1).abs() < 1e-5);

        camera.pan(1.0, 0.0);
        assert!((camera.target.x - 1.0).abs() < 1e-5);
        assert!((camera.position.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_box() {
        let mut camera = Camera::new(1.0);
        camera.look_at_box(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera.position.z > 1.0);
        assert!(camera.near > 0.0 && camera.near < camera.far);
    }

    #[test]
    fn test_set_fov_clamping() {
        let mut camera = Camera::new(1.0);
        camera.set_fov_degrees(5.0);
        assert!((camera.fov_degrees() - 10.0).abs() < 1e-4);
        camera.set_fov_degrees(200.0);
        assert!((camera.fov_degrees() - 170.0).abs() < 1e-4);
    }

    #[test]
    fn test_render_context_from_camera() {
        let camera = Camera::new(2.0);
        let model = Mat4::from_translation(Vec3::X);
        let ctx = camera.render_context(model, true);
        assert_eq!(ctx.aspect, 2.0);
        assert!(ctx.wireframe);
        assert_eq!(ctx.eye, camera.position);
        assert_eq!(ctx.model, model);
    }
}
