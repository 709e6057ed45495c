//! Per-frame render context.

use glam::{Mat3, Mat4, Vec3};

/// Camera and transform state handed to every draw call of a frame.
///
/// Built fresh each frame (see [`crate::Camera::render_context`]) and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in radians.
    pub vfov: f32,
    pub near: f32,
    pub far: f32,
    /// Camera position in world space.
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    pub up: Vec3,
    /// Model (object to world) transform.
    pub model: Mat4,
    /// View (world to eye) transform.
    pub view: Mat4,
    /// Projection transform.
    pub projection: Mat4,
    /// Draw primitives as outlines.
    pub wireframe: bool,
}

impl RenderContext {
    /// Same context for a different object transform.
    #[must_use]
    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    #[must_use]
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.model
    }

    /// Inverse transpose of the model-view rotation part.
    #[must_use]
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_view()).inverse().transpose()
    }

    /// Eye-space distance of a depth-buffer sample, or `None` for the far plane.
    #[must_use]
    pub fn linear_depth(&self, depth: f32) -> Option<f32> {
        if depth >= 1.0 {
            return None;
        }
        let eye = self.projection.inverse().project_point3(Vec3::new(0.0, 0.0, depth));
        Some(-eye.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RenderContext {
        RenderContext {
            aspect: 1.0,
            vfov: std::f32::consts::FRAC_PI_2,
            near: 0.5,
            far: 50.0,
            eye: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            model: Mat4::IDENTITY,
            view: Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.5, 50.0),
            wireframe: false,
        }
    }

    #[test]
    fn test_matrix_products() {
        let ctx = context().with_model(Mat4::from_translation(Vec3::Y));
        let p = ctx.model_view_projection().project_point3(Vec3::ZERO);
        let q = ctx.view_projection().project_point3(Vec3::Y);
        assert!((p - q).length() < 1e-6);
        assert!((ctx.model_view().transform_point3(Vec3::ZERO) - Vec3::new(0.0, 1.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_linear_depth_round_trip() {
        let ctx = context();
        let clip = ctx.projection.project_point3(Vec3::new(0.0, 0.0, -7.0));
        let depth = ctx.linear_depth(clip.z).unwrap();
        assert!((depth - 7.0).abs() < 1e-3);
        assert_eq!(ctx.linear_depth(1.0), None);
    }
}
