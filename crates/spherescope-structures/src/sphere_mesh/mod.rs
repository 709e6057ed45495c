//! Sphere mesh structure.

use glam::{Mat4, Vec3, Vec4};
use spherescope_core::structure::Structure;
use spherescope_core::{sphere_mesh_project, MeshProjection, Result, SphereMesh};
use spherescope_render::{
    RenderContext, RenderEngine, RenderResult, SphereMeshPipelines, SphereMeshRenderer,
};

/// Default number of segments of the sphere and cone templates.
pub const DEFAULT_SEGMENTS: u32 = 64;

/// A sphere mesh placed in the scene.
///
/// The structure owns the mesh; GPU data is created lazily on the first
/// [`prepare`](Self::prepare) and re-uploaded whenever the mesh changes.
pub struct SphereMeshStructure {
    name: String,
    mesh: SphereMesh,
    enabled: bool,
    transform: Mat4,
    color: Vec4,
    wireframe: bool,
    segments: u32,
    renderer: Option<SphereMeshRenderer>,
    dirty: bool,
}

impl SphereMeshStructure {
    /// Creates a new sphere mesh structure.
    pub fn new(name: impl Into<String>, mesh: SphereMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            enabled: true,
            transform: Mat4::IDENTITY,
            color: Vec4::new(0.78, 0.58, 0.42, 1.0),
            wireframe: false,
            segments: DEFAULT_SEGMENTS,
            renderer: None,
            dirty: true,
        }
    }

    /// Returns the mesh.
    #[must_use]
    pub fn mesh(&self) -> &SphereMesh {
        &self.mesh
    }

    /// Replaces the mesh.
    pub fn update_mesh(&mut self, mesh: SphereMesh) {
        self.mesh = mesh;
        self.refresh();
    }

    /// Edits the mesh in place.
    pub fn edit_mesh<R>(&mut self, f: impl FnOnce(&mut SphereMesh) -> R) -> R {
        let result = f(&mut self.mesh);
        self.refresh();
        result
    }

    /// Sets the base color.
    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.color = color.extend(self.color.w);
        self
    }

    /// Gets the base color.
    #[must_use]
    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Draws primitives as outlines when the device supports it.
    pub fn set_wireframe(&mut self, wireframe: bool) -> &mut Self {
        self.wireframe = wireframe;
        self
    }

    #[must_use]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Sets the template resolution; takes effect on the next upload.
    pub fn set_segments(&mut self, segments: u32) -> &mut Self {
        let segments = segments.max(3);
        if segments != self.segments {
            self.segments = segments;
            self.renderer = None;
            self.dirty = true;
        }
        self
    }

    #[must_use]
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Whether the GPU copy is stale.
    #[must_use]
    pub fn needs_upload(&self) -> bool {
        self.dirty
    }

    /// Returns the renderer if GPU resources exist.
    #[must_use]
    pub fn renderer(&self) -> Option<&SphereMeshRenderer> {
        self.renderer.as_ref()
    }

    /// Primitives skipped at the last upload.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.renderer
            .as_ref()
            .map_or(0, SphereMeshRenderer::degenerate_count)
    }

    /// Projects a world-space point onto the mesh.
    ///
    /// The query goes through the inverse transform and the result point is
    /// mapped back, so `point` and `distance` are in world space. The sphere
    /// fields (`s0`, `s1`, `contact`) stay in mesh coordinates.
    pub fn project(&self, p: Vec3) -> Result<MeshProjection> {
        let local = self.transform.inverse().transform_point3(p);
        let mut projection = sphere_mesh_project(local, &self.mesh)?;

        projection.point = self.transform.transform_point3(projection.point);
        projection.distance = (projection.point - p).length();
        projection.sdf = projection.distance.copysign(projection.sdf);
        Ok(projection)
    }

    /// Drops GPU resources, e.g. before drawing with a different device.
    pub fn clear_gpu_resources(&mut self) {
        self.renderer = None;
        self.dirty = true;
    }

    /// Creates the renderer and uploads the mesh if it changed.
    pub fn prepare(&mut self, engine: &RenderEngine) -> RenderResult<()> {
        if self.renderer.is_none() {
            self.renderer = Some(engine.create_sphere_mesh_renderer(self.segments)?);
            self.dirty = true;
        }
        if self.dirty {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.upload_mesh(&engine.device, engine.sphere_mesh_layouts(), &self.mesh)?;
                if renderer.degenerate_count() > 0 {
                    log::warn!(
                        "sphere mesh '{}': {} degenerate primitive(s) not drawn",
                        self.name,
                        renderer.degenerate_count()
                    );
                }
            }
            self.dirty = false;
        }
        Ok(())
    }

    /// Records this structure's draws. `ctx` is the frame context; the
    /// structure substitutes its own transform and wireframe flag.
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        pipelines: &SphereMeshPipelines,
        ctx: &RenderContext,
    ) -> RenderResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let Some(renderer) = &self.renderer else {
            log::debug!("sphere mesh '{}' drawn before prepare", self.name);
            return Ok(());
        };

        let mut ctx = ctx.with_model(self.transform);
        ctx.wireframe |= self.wireframe;
        renderer.update_uniforms(queue, &ctx, self.color, pipelines.material());
        renderer.render(pass, pipelines, &ctx)
    }
}

impl Structure for SphereMeshStructure {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "SphereMesh"
    }

    fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let (min, max) = self.mesh.bounding_box()?;
        if self.transform == Mat4::IDENTITY {
            return Some((min, max));
        }

        let mut world_min = Vec3::splat(f32::MAX);
        let mut world_max = Vec3::splat(f32::MIN);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            let world = self.transform.transform_point3(corner);
            world_min = world_min.min(world);
            world_max = world_max.max(world);
        }
        Some((world_min, world_max))
    }

    fn transform(&self) -> Mat4 {
        self.transform
    }

    fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn refresh(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spherescope_core::PrimitiveRef;

    fn capsule() -> SphereMesh {
        SphereMesh::from_primitives(
            vec![Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(3.0, 0.0, 0.0, 1.0)],
            &[[0, 1]],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_structure_defaults() {
        let s = SphereMeshStructure::new("capsule", capsule());
        assert_eq!(s.name(), "capsule");
        assert_eq!(s.type_name(), "SphereMesh");
        assert!(s.is_enabled());
        assert!(s.needs_upload());
        assert!(s.renderer().is_none());
        assert_eq!(s.degenerate_count(), 0);
        assert_eq!(s.segments(), DEFAULT_SEGMENTS);
    }

    #[test]
    fn test_update_mesh_marks_dirty() {
        let mut s = SphereMeshStructure::new("capsule", capsule());
        s.dirty = false;
        s.update_mesh(SphereMesh::new());
        assert!(s.needs_upload());
        assert!(s.mesh().is_empty());

        s.dirty = false;
        let v = s.edit_mesh(|m| m.add_vertex(Vec4::new(0.0, 0.0, 0.0, 1.0))).unwrap();
        assert_eq!(v.index(), 0);
        assert!(s.needs_upload());
    }

    #[test]
    fn test_set_color_keeps_alpha() {
        let mut s = SphereMeshStructure::new("capsule", capsule());
        s.set_color(Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(s.color(), Vec4::new(0.1, 0.2, 0.3, 1.0));
    }

    #[test]
    fn test_bounding_box_follows_transform() {
        let mut s = SphereMeshStructure::new("capsule", capsule());
        assert_eq!(
            s.bounding_box(),
            Some((Vec3::new(-1.0, -1.0, -1.0), Vec3::new(4.0, 1.0, 1.0)))
        );

        s.set_transform(Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)));
        let (min, max) = s.bounding_box().unwrap();
        assert!((min - Vec3::new(-1.0, 9.0, -1.0)).length() < 1e-5);
        assert!((max - Vec3::new(4.0, 11.0, 1.0)).length() < 1e-5);
        assert!((s.length_scale() - (max - min).length()).abs() < 1e-5);

        s.reset_transform();
        assert_eq!(s.transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_project_in_world_space() {
        let mut s = SphereMeshStructure::new("capsule", capsule());
        s.set_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));

        let proj = s.project(Vec3::new(1.5, 3.0, 5.0)).unwrap();
        assert!((proj.point - Vec3::new(1.5, 1.0, 5.0)).length() < 1e-5);
        assert!((proj.distance - 2.0).abs() < 1e-5);
        assert!((proj.sdf - 2.0).abs() < 1e-5);
        assert!(matches!(proj.primitive, PrimitiveRef::Pill(_)));
    }

    #[test]
    fn test_project_scaled_inside_is_negative() {
        let mut s = SphereMeshStructure::new("capsule", capsule());
        s.set_transform(Mat4::from_scale(Vec3::splat(2.0)));

        let proj = s.project(Vec3::new(3.0, 0.5, 0.0)).unwrap();
        assert!((proj.point - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-4);
        assert!((proj.sdf + 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_segments_reset_renderer() {
        let mut s = SphereMeshStructure::new("capsule", capsule());
        s.dirty = false;
        s.set_segments(DEFAULT_SEGMENTS);
        assert!(!s.needs_upload());
        s.set_segments(1);
        assert_eq!(s.segments(), 3);
        assert!(s.needs_upload());
    }
}
