//! Sphere-mesh GPU rendering resources.
//!
//! A sphere mesh is drawn with three primitive kinds:
//! - instanced unit spheres, one instance per sphere slot (`vsphere`)
//! - one tapered cone per pill, placed by a per-draw `cone_matrix`
//! - two triangle patches per wedge, positioned entirely by per-draw uniforms
//!
//! Cone and triangle parameters live in dynamic-offset uniform buffers, one
//! aligned block per draw.

use std::num::NonZeroU64;

use glam::{Mat4, Quat, Vec3, Vec4};
use spherescope_core::sphere_math::{self, center, EPSILON};
use spherescope_core::{GeometryError, GeometryResult, PrimitiveRef, SphereMesh};

use crate::buffer;
use crate::error::{RenderError, RenderResult};
use crate::gpu_mesh::{self, AttributeSlot, GpuMesh, VNORMAL, VPOSITION, VSPHERE};
use crate::materials::Material;
use crate::render_context::RenderContext;
use crate::shader::{self, ShaderBuilder};
use crate::template_meshes::TemplateMesh;

/// Attributes consumed by the sphere pipeline.
pub const SPHERE_ATTRIBUTES: [AttributeSlot; 3] = [VPOSITION, VNORMAL, VSPHERE];
/// Attributes consumed by the cone and triangle pipelines.
pub const TEMPLATE_ATTRIBUTES: [AttributeSlot; 2] = [VPOSITION, VNORMAL];

/// Per-object uniforms (group 1).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// `(ambient, diffuse, specular, shininess)`.
    pub material: [f32; 4],
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            base_color: [0.78, 0.58, 0.42, 1.0],
            material: Material::default().params(),
        }
    }
}

/// Per-draw uniforms of one pill cone (group 2).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct ConeUniforms {
    /// Places the unit cylinder: `T * R * S`.
    pub cone_matrix: [[f32; 4]; 4],
    /// Far ring radius over near ring radius.
    pub cone_ratio: f32,
    /// Slope of the cone surface, used to bend normals.
    pub cone_angle: f32,
    pub _padding: [f32; 2],
}

impl ConeUniforms {
    /// Cone tangent to both spheres of the pill `(s0, s1)`.
    ///
    /// The near ring is the tangent circle on `s0`: it sits `r0 * sin(angle)`
    /// behind the center along the axis with radius `r0 * beta`. The far ring
    /// is the tangent circle on `s1`.
    pub fn from_pill(s0: Vec4, s1: Vec4) -> GeometryResult<Self> {
        // The near ring must have a radius to taper from.
        let (s0, s1) = if s0.w <= EPSILON { (s1, s0) } else { (s0, s1) };
        if s0.w <= EPSILON {
            return Err(GeometryError::NonFinite);
        }
        let tangent = sphere_math::pill_tangent(s0, s1)?;

        let axis = center(s1) - center(s0);
        let d = axis.length();
        let dir = axis / d;
        let sin_slope = (s1.w - s0.w) / d;

        let length = d - (s1.w - s0.w) * sin_slope;
        let scale = Vec3::new(s0.w * tangent.beta, s0.w * tangent.beta, length);
        let rotation = Quat::from_rotation_arc(Vec3::Z, dir);
        let translation = center(s0) - dir * (s0.w * sin_slope);

        Ok(Self {
            cone_matrix: Mat4::from_scale_rotation_translation(scale, rotation, translation)
                .to_cols_array_2d(),
            cone_ratio: s1.w / s0.w,
            cone_angle: sphere_math::safe_asin(sin_slope),
            _padding: [0.0; 2],
        })
    }
}

/// Per-draw uniforms of one wedge patch (group 2).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct TriangleUniforms {
    pub v0: [f32; 3],
    pub _pad0: f32,
    pub v1: [f32; 3],
    pub _pad1: f32,
    pub v2: [f32; 3],
    pub _pad2: f32,
    pub vn: [f32; 3],
    pub _pad3: f32,
}

impl TriangleUniforms {
    /// Tangent triangle of the wedge on the side given by [`sphere_math::wedge_normal`].
    pub fn from_wedge(s0: Vec4, s1: Vec4, s2: Vec4) -> GeometryResult<Self> {
        let n = sphere_math::wedge_normal(s0, s1, s2)?;
        let tangent = |s: Vec4| (center(s) + n * s.w).to_array();
        Ok(Self {
            v0: tangent(s0),
            _pad0: 0.0,
            v1: tangent(s1),
            _pad1: 0.0,
            v2: tangent(s2),
            _pad2: 0.0,
            vn: n.to_array(),
            _pad3: 0.0,
        })
    }
}

/// CPU-side draw lists derived from a mesh snapshot.
#[derive(Debug, Clone, Default)]
pub struct SphereMeshDrawData {
    /// One `vsphere` per sphere slot.
    pub instances: Vec<[f32; 4]>,
    pub cones: Vec<ConeUniforms>,
    pub triangles: Vec<TriangleUniforms>,
    /// Primitives left out because their geometry is degenerate or one of
    /// their spheres is invalid.
    pub degenerate: usize,
}

impl SphereMeshDrawData {
    /// Lays out instances as: standalone spheres, both endpoints of every
    /// edge, then all three corners of every face. Primitives touching an
    /// invalid sphere contribute nothing.
    pub fn from_mesh(mesh: &SphereMesh) -> Self {
        let mut data = Self::default();

        for s in mesh.spheres() {
            let sphere = mesh.sphere(mesh.sphere_vertex(s));
            if data.accepts(PrimitiveRef::Sphere(s), &[sphere]) {
                data.instances.push(sphere.to_array());
            }
        }
        for e in mesh.edges() {
            let [s0, s1] = mesh.edge_spheres(e);
            if !data.accepts(PrimitiveRef::Pill(e), &[s0, s1]) {
                continue;
            }
            data.instances.extend([s0.to_array(), s1.to_array()]);
            data.push_cone(s0, s1);
        }
        for f in mesh.faces() {
            let [s0, s1, s2] = mesh.face_spheres(f);
            if !data.accepts(PrimitiveRef::Wedge(f), &[s0, s1, s2]) {
                continue;
            }
            data.instances
                .extend([s0.to_array(), s1.to_array(), s2.to_array()]);
            for [a, b] in mesh.face_pills(f) {
                data.push_cone(a, b);
            }
            // Both tangent planes: swapping s1 and s2 flips the side.
            match (
                TriangleUniforms::from_wedge(s0, s1, s2),
                TriangleUniforms::from_wedge(s0, s2, s1),
            ) {
                (Ok(front), Ok(back)) => data.triangles.extend([front, back]),
                (Err(err), _) | (_, Err(err)) => {
                    log::warn!("skipping degenerate wedge {}: {err}", f.index());
                    data.degenerate += 1;
                }
            }
        }
        data
    }

    fn accepts(&mut self, primitive: PrimitiveRef, spheres: &[Vec4]) -> bool {
        match spheres.iter().try_for_each(|&s| sphere_math::check_sphere(s)) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("skipping {primitive:?}: {err}");
                self.degenerate += 1;
                false
            }
        }
    }

    fn push_cone(&mut self, s0: Vec4, s1: Vec4) {
        match ConeUniforms::from_pill(s0, s1) {
            Ok(cone) => self.cones.push(cone),
            Err(err) => {
                log::warn!("skipping degenerate pill {s0} - {s1}: {err}");
                self.degenerate += 1;
            }
        }
    }
}

/// Bind group layouts shared by the sphere-mesh pipelines and renderers.
///
/// Kept stable across pipeline rebuilds so existing bind groups stay valid.
pub struct SphereMeshLayouts {
    /// Group 0: camera uniforms.
    pub camera: wgpu::BindGroupLayout,
    /// Group 1: object uniforms.
    pub object: wgpu::BindGroupLayout,
    /// Group 2: per-draw cone or triangle uniforms (dynamic offset).
    pub draw: wgpu::BindGroupLayout,
}

impl SphereMeshLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = |label: &str, size: Option<NonZeroU64>, dynamic: bool, visibility| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: dynamic,
                        min_binding_size: size,
                    },
                    count: None,
                }],
            })
        };
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        Self {
            camera: uniform_layout("sphere mesh camera layout", NonZeroU64::new(256), false, both),
            object: uniform_layout("sphere mesh object layout", NonZeroU64::new(96), false, both),
            // Shared by cone and triangle blocks, which differ in size.
            draw: uniform_layout("sphere mesh draw layout", None, true, wgpu::ShaderStages::VERTEX),
        }
    }
}

/// One pipeline per primitive kind.
pub struct PipelineSet {
    pub sphere: wgpu::RenderPipeline,
    pub cone: wgpu::RenderPipeline,
    pub triangle: wgpu::RenderPipeline,
}

/// Render pipelines for sphere meshes, rebuildable without touching geometry.
pub struct SphereMeshPipelines {
    pub fill: PipelineSet,
    /// Line-mode variants, present when the device supports them.
    pub wire: Option<PipelineSet>,
    material: Material,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
}

impl SphereMeshPipelines {
    /// Compiles all pipelines for `material`.
    pub fn new(
        device: &wgpu::Device,
        layouts: &SphereMeshLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        material: &Material,
    ) -> RenderResult<Self> {
        let wire_supported = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let build = |mode| {
            Self::build_set(device, layouts, color_format, depth_format, material, mode)
        };
        Ok(Self {
            fill: build(wgpu::PolygonMode::Fill)?,
            wire: if wire_supported {
                Some(build(wgpu::PolygonMode::Line)?)
            } else {
                None
            },
            material: material.clone(),
            color_format,
            depth_format,
        })
    }

    /// Regenerates the shaders (e.g. for a new material) and recompiles.
    pub fn rebuild(
        &mut self,
        device: &wgpu::Device,
        layouts: &SphereMeshLayouts,
        material: &Material,
    ) -> RenderResult<()> {
        *self = Self::new(device, layouts, self.color_format, self.depth_format, material)?;
        log::debug!("rebuilt sphere mesh pipelines with material '{}'", material.name);
        Ok(())
    }

    /// Material the pipelines were compiled with.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Pipelines for the requested fill mode; falls back to filled when
    /// line mode is unavailable.
    pub fn select(&self, wireframe: bool) -> &PipelineSet {
        match (&self.wire, wireframe) {
            (Some(wire), true) => wire,
            _ => &self.fill,
        }
    }

    fn build_set(
        device: &wgpu::Device,
        layouts: &SphereMeshLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        material: &Material,
        polygon_mode: wgpu::PolygonMode,
    ) -> RenderResult<PipelineSet> {
        let sphere_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere mesh sphere pipeline layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object],
            push_constant_ranges: &[],
        });
        let draw_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere mesh draw pipeline layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object, &layouts.draw],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, source: &str, layout, slots: &[AttributeSlot]| {
            let module = ShaderBuilder::new()
                .with_vertex(source)
                .with_fragment(shader::FRAGMENT_WGSL)
                .with_shading(material.shading)
                .with_label(label)
                .build_module(device)?;
            let attributes = gpu_mesh::vertex_attributes(slots);
            let buffers = gpu_mesh::vertex_buffer_layouts(slots, &attributes);

            Ok::<_, RenderError>(device.create_render_pipeline(
                &wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(layout),
                    vertex: wgpu::VertexState {
                        module: &module,
                        entry_point: Some("vs_main"),
                        buffers: &buffers,
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &module,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: color_format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        cull_mode: None,
                        polygon_mode,
                        ..wgpu::PrimitiveState::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: depth_format,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                },
            ))
        };

        Ok(PipelineSet {
            sphere: pipeline(
                "sphere mesh spheres",
                shader::SPHERE_WGSL,
                &sphere_layout,
                &SPHERE_ATTRIBUTES,
            )?,
            cone: pipeline(
                "sphere mesh cones",
                shader::CONE_WGSL,
                &draw_layout,
                &TEMPLATE_ATTRIBUTES,
            )?,
            triangle: pipeline(
                "sphere mesh triangles",
                shader::TRIANGLE_WGSL,
                &draw_layout,
                &TEMPLATE_ATTRIBUTES,
            )?,
        })
    }
}

/// Per-draw uniform blocks bound with dynamic offsets.
struct DrawList {
    #[allow(dead_code)]
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    count: u32,
}

impl DrawList {
    #[allow(clippy::cast_possible_truncation)]
    fn new<T: bytemuck::Pod>(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        items: &[T],
        label: &str,
    ) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        let block = std::mem::size_of::<T>() as u64;
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = buffer::aligned_stride(block, alignment);
        let buffer = buffer::create_dynamic_uniform_buffer(device, items, stride, Some(label));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(block),
                }),
            }],
        });
        Some(Self {
            buffer,
            bind_group,
            stride: stride as u32,
            count: items.len() as u32,
        })
    }

    fn draw_each(&self, pass: &mut wgpu::RenderPass<'_>, template: &GpuMesh) {
        for i in 0..self.count {
            pass.set_bind_group(2, &self.bind_group, &[i * self.stride]);
            template.draw(pass, 0..1);
        }
    }
}

/// GPU renderer for one sphere mesh.
///
/// [`upload_mesh`](Self::upload_mesh) snapshots the mesh and rebuilds all
/// draw data; later edits to the source mesh are not seen until the next
/// upload.
pub struct SphereMeshRenderer {
    mesh: SphereMesh,
    sphere_template: GpuMesh,
    cone_template: GpuMesh,
    triangle_template: GpuMesh,
    instances: GpuMesh,
    num_instances: u32,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    cones: Option<DrawList>,
    triangles: Option<DrawList>,
    degenerate_count: usize,
}

impl SphereMeshRenderer {
    /// Creates the templates and object uniforms. No geometry is uploaded yet.
    pub fn new(
        device: &wgpu::Device,
        layouts: &SphereMeshLayouts,
        segments: u32,
    ) -> RenderResult<Self> {
        let sphere_template = TemplateMesh::sphere(segments).upload(device, "sphere template");
        let cone_template = TemplateMesh::cone(segments).upload(device, "cone template");
        let triangle_template = TemplateMesh::triangle().upload(device, "triangle template");
        for template in [&sphere_template, &cone_template, &triangle_template] {
            template.require(&TEMPLATE_ATTRIBUTES)?;
        }

        let object_buffer = buffer::create_uniform_buffer(
            device,
            &ObjectUniforms::default(),
            Some("sphere mesh object uniforms"),
        );
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sphere mesh object bind group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            mesh: SphereMesh::new(),
            sphere_template,
            cone_template,
            triangle_template,
            instances: GpuMesh::new("sphere instances"),
            num_instances: 0,
            object_buffer,
            object_bind_group,
            cones: None,
            triangles: None,
            degenerate_count: 0,
        })
    }

    /// Snapshots `mesh` and rebuilds instance and per-draw buffers.
    #[allow(clippy::cast_possible_truncation)]
    pub fn upload_mesh(
        &mut self,
        device: &wgpu::Device,
        layouts: &SphereMeshLayouts,
        mesh: &SphereMesh,
    ) -> RenderResult<()> {
        self.mesh = mesh.clone();
        let data = SphereMeshDrawData::from_mesh(&self.mesh);

        self.instances = GpuMesh::new("sphere instances");
        self.instances
            .set_attribute(device, VSPHERE.name, VSPHERE.format, &data.instances);
        self.instances.require(&[VSPHERE])?;
        self.num_instances = data.instances.len() as u32;

        self.cones = DrawList::new(device, &layouts.draw, &data.cones, "sphere mesh cones");
        self.triangles = DrawList::new(
            device,
            &layouts.draw,
            &data.triangles,
            "sphere mesh triangles",
        );
        self.degenerate_count = data.degenerate;

        log::debug!(
            "uploaded sphere mesh: {} instances, {} cones, {} triangles, {} degenerate",
            self.num_instances,
            data.cones.len(),
            data.triangles.len(),
            data.degenerate
        );
        Ok(())
    }

    /// Writes the object uniforms for this frame.
    pub fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        ctx: &RenderContext,
        color: Vec4,
        material: &Material,
    ) {
        let uniforms = ObjectUniforms {
            model: ctx.model.to_cols_array_2d(),
            base_color: color.to_array(),
            material: material.params(),
        };
        buffer::update_buffer(queue, &self.object_buffer, &[uniforms]);
    }

    /// Issues all draw calls: spheres, then cones, then wedge patches.
    ///
    /// The camera bind group (group 0) must already be set on `pass`, and the
    /// object uniforms written with [`update_uniforms`](Self::update_uniforms).
    pub fn render(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipelines: &SphereMeshPipelines,
        ctx: &RenderContext,
    ) -> RenderResult<()> {
        let set = pipelines.select(ctx.wireframe);
        pass.set_bind_group(1, &self.object_bind_group, &[]);

        if self.num_instances > 0 {
            pass.set_pipeline(&set.sphere);
            self.sphere_template.bind(pass, &TEMPLATE_ATTRIBUTES, 0)?;
            self.instances.bind(pass, &[VSPHERE], 2)?;
            self.sphere_template.draw(pass, 0..self.num_instances);
        }
        if let Some(cones) = &self.cones {
            pass.set_pipeline(&set.cone);
            self.cone_template.bind(pass, &TEMPLATE_ATTRIBUTES, 0)?;
            cones.draw_each(pass, &self.cone_template);
        }
        if let Some(triangles) = &self.triangles {
            pass.set_pipeline(&set.triangle);
            self.triangle_template.bind(pass, &TEMPLATE_ATTRIBUTES, 0)?;
            triangles.draw_each(pass, &self.triangle_template);
        }
        Ok(())
    }

    /// The mesh snapshot taken by the last upload.
    pub fn mesh(&self) -> &SphereMesh {
        &self.mesh
    }

    pub fn num_instances(&self) -> u32 {
        self.num_instances
    }

    pub fn num_cones(&self) -> u32 {
        self.cones.as_ref().map_or(0, |c| c.count)
    }

    pub fn num_triangles(&self) -> u32 {
        self.triangles.as_ref().map_or(0, |t| t.count)
    }

    /// Primitives skipped at the last upload.
    pub fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cone_point(cone: &ConeUniforms, local: Vec3) -> Vec3 {
        let taper = 1.0 + local.z * (cone.cone_ratio - 1.0);
        let tapered = Vec3::new(local.x * taper, local.y * taper, local.z);
        Mat4::from_cols_array_2d(&cone.cone_matrix).transform_point3(tapered)
    }

    fn assert_rings_touch(cone: &ConeUniforms, s0: Vec4, s1: Vec4, tol: f32) {
        for k in 0..8 {
            let phi = k as f32 * std::f32::consts::TAU / 8.0;
            let (s, c) = phi.sin_cos();
            let near = cone_point(cone, Vec3::new(c, s, 0.0));
            let far = cone_point(cone, Vec3::new(c, s, 1.0));
            assert!(((near - center(s0)).length() - s0.w).abs() < tol);
            assert!(((far - center(s1)).length() - s1.w).abs() < tol);
        }
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 96);
        assert_eq!(std::mem::size_of::<ConeUniforms>(), 80);
        assert_eq!(std::mem::size_of::<TriangleUniforms>(), 64);
    }

    #[test]
    fn test_cone_equal_radii() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let cone = ConeUniforms::from_pill(s0, s1).unwrap();
        assert_eq!(cone.cone_ratio, 1.0);
        assert!(cone.cone_angle.abs() < 1e-6);
        let base = cone_point(&cone, Vec3::ZERO);
        let tip = cone_point(&cone, Vec3::Z);
        assert!(base.length() < 1e-5);
        assert!((tip - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
        assert_rings_touch(&cone, s0, s1, 1e-5);
    }

    #[test]
    fn test_cone_tapered() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(0.0, 4.0, 0.0, 2.0);
        let cone = ConeUniforms::from_pill(s0, s1).unwrap();
        assert_eq!(cone.cone_ratio, 2.0);
        assert!((cone.cone_angle - 0.25f32.asin()).abs() < 1e-6);
        assert_rings_touch(&cone, s0, s1, 1e-4);
    }

    #[test]
    fn test_cone_zero_radius_end_is_swapped() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 0.0);
        let s1 = Vec4::new(0.0, 0.0, 4.0, 1.0);
        let cone = ConeUniforms::from_pill(s0, s1).unwrap();
        assert_eq!(cone.cone_ratio, 0.0);
        assert!(cone.cone_matrix.iter().flatten().all(|x| x.is_finite()));
    }

    #[test]
    fn test_cone_degenerate() {
        let nested = ConeUniforms::from_pill(
            Vec4::new(0.0, 0.0, 0.0, 3.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        );
        assert_eq!(nested, Err(GeometryError::NestedSpheres));
        let points = ConeUniforms::from_pill(Vec4::ZERO, Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(points, Err(GeometryError::NonFinite));
    }

    #[test]
    fn test_triangle_uniforms_both_sides() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(0.0, 3.0, 0.0, 1.0);
        let front = TriangleUniforms::from_wedge(s0, s1, s2).unwrap();
        let back = TriangleUniforms::from_wedge(s0, s2, s1).unwrap();
        assert_eq!(front.v0, [0.0, 0.0, 1.0]);
        assert_eq!(front.v1, [3.0, 0.0, 1.0]);
        assert_eq!(front.vn, [0.0, 0.0, 1.0]);
        assert_eq!(back.v1, [0.0, 3.0, -1.0]);
        assert_eq!(back.vn, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_draw_data_layout() {
        let mut mesh = SphereMesh::from_primitives(
            vec![
                Vec4::new(0.0, 0.0, 0.0, 1.0),
                Vec4::new(3.0, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 3.0, 0.0, 1.0),
                Vec4::new(8.0, 0.0, 0.0, 0.5),
            ],
            &[[0, 1]],
            &[[0, 1, 2]],
        )
        .unwrap();
        let lone = mesh.vertices().nth(3).unwrap();
        mesh.add_sphere(lone).unwrap();

        let data = SphereMeshDrawData::from_mesh(&mesh);
        // 1 standalone + 2 per edge + 3 per face
        assert_eq!(data.instances.len(), 6);
        assert_eq!(data.instances[0], [8.0, 0.0, 0.0, 0.5]);
        // 1 per edge + 3 per face
        assert_eq!(data.cones.len(), 4);
        assert_eq!(data.triangles.len(), 2);
        assert_eq!(data.degenerate, 0);
    }

    #[test]
    fn test_draw_data_skips_degenerate() {
        let mesh = SphereMesh::from_primitives(
            vec![
                Vec4::new(0.0, 0.0, 0.0, 1.0),
                Vec4::new(1.0, 0.0, 0.0, 1.0),
                Vec4::new(2.0, 0.0, 0.0, 1.0),
                Vec4::new(0.2, 0.0, 0.0, 3.0),
            ],
            &[[0, 3]],
            &[[0, 1, 2]],
        )
        .unwrap();
        let data = SphereMeshDrawData::from_mesh(&mesh);
        assert_eq!(data.instances.len(), 5);
        // The nested pill and the collinear wedge are dropped; the wedge's
        // three boundary pills are fine.
        assert_eq!(data.cones.len(), 3);
        assert!(data.triangles.is_empty());
        assert_eq!(data.degenerate, 2);
        assert!(data
            .cones
            .iter()
            .all(|c| c.cone_matrix.iter().flatten().all(|x| x.is_finite())));
    }

    #[test]
    fn test_draw_data_skips_invalid_spheres() {
        // Hand-written JSON can carry spheres the mesh API would reject.
        let json = r#"{"spheres":[[0,0,0,-2],[3,0,0,1],[0,3,0,1],[9,0,0,1]],
            "edges":[[0,1],[1,2]],"faces":[[0,1,2]],"standalone":[0,3]}"#;
        let mesh: SphereMesh = serde_json::from_str(json).unwrap();

        let data = SphereMeshDrawData::from_mesh(&mesh);
        // Sphere 0, edge 0 and the face all touch the negative radius.
        assert_eq!(data.degenerate, 3);
        assert_eq!(
            data.instances,
            vec![[9.0, 0.0, 0.0, 1.0], [3.0, 0.0, 0.0, 1.0], [0.0, 3.0, 0.0, 1.0]]
        );
        assert_eq!(data.cones.len(), 1);
        assert!(data.triangles.is_empty());
        assert!(data.instances.iter().all(|s| s[3] >= 0.0));
    }

    proptest! {
        #[test]
        fn prop_cone_rings_lie_on_spheres(
            c1 in prop::array::uniform3(-5.0f32..5.0),
            r0 in 0.2f32..1.5,
            r1 in 0.2f32..1.5,
        ) {
            let s0 = Vec4::new(0.0, 0.0, 0.0, r0);
            let s1 = Vec4::new(c1[0], c1[1], c1[2], r1);
            prop_assume!(Vec3::from(c1).length() > (r1 - r0).abs() + 0.1);
            let cone = ConeUniforms::from_pill(s0, s1).unwrap();
            assert_rings_touch(&cone, s0, s1, 1e-3);
        }
    }
}
