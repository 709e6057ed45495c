//! The main rendering engine.

mod capture;
mod pipelines;
mod rendering;

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::materials::MaterialRegistry;
use crate::render_context::RenderContext;
use crate::sphere_mesh_render::{SphereMeshLayouts, SphereMeshPipelines};

pub use capture::OffscreenTarget;

/// Depth buffer format; readable back for depth maps.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera uniforms for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye, w = aspect.
    pub eye_aspect: [f32; 4],
    /// xyz = forward, w = vertical field of view.
    pub forward_vfov: [f32; 4],
    /// xyz = up, w = near.
    pub up_near: [f32; 4],
    /// x = far, y = wireframe flag.
    pub far_wireframe: [f32; 4],
}

impl CameraUniforms {
    pub fn from_context(ctx: &RenderContext) -> Self {
        Self {
            view: ctx.view.to_cols_array_2d(),
            proj: ctx.projection.to_cols_array_2d(),
            view_proj: ctx.view_projection().to_cols_array_2d(),
            eye_aspect: ctx.eye.extend(ctx.aspect).to_array(),
            forward_vfov: ctx.forward.extend(ctx.vfov).to_array(),
            up_near: ctx.up.extend(ctx.near).to_array(),
            far_wireframe: [ctx.far, f32::from(u8::from(ctx.wireframe)), 0.0, 0.0],
        }
    }
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self::from_context(&Camera::new(1.0).render_context(glam::Mat4::IDENTITY, false))
    }
}

/// The main rendering engine backed by wgpu.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The render surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration. In headless mode only the size and format are used.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Depth texture.
    pub depth_texture: wgpu::Texture,
    /// Depth texture view.
    pub depth_view: wgpu::TextureView,
    /// Material registry.
    pub materials: MaterialRegistry,
    /// Main camera.
    pub camera: Camera,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
    /// Camera uniform buffer.
    pub camera_buffer: wgpu::Buffer,
    pub(crate) camera_bind_group: wgpu::BindGroup,
    /// Bind group layouts shared by every sphere-mesh renderer.
    pub(crate) sphere_mesh_layouts: SphereMeshLayouts,
    /// Sphere-mesh pipelines.
    pub(crate) sphere_mesh_pipelines: Option<SphereMeshPipelines>,
    /// Offscreen color target for headless frames and screenshots.
    pub(crate) offscreen: Option<OffscreenTarget>,
}

impl RenderEngine {
    /// Creates a new windowed render engine.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "spherescope device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceLost)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Self::from_parts(instance, adapter, device, queue, Some(surface), surface_config)
    }

    /// Creates a new headless render engine.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) =
            Self::request_device(&adapter, "spherescope device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        Self::from_parts(instance, adapter, device, queue, None, surface_config)
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
        label: &str,
    ) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
        // Line-mode pipelines are optional.
        let required_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        let device = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(label),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;
        Ok(device)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_parts(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<wgpu::Surface<'static>>,
        surface_config: wgpu::SurfaceConfiguration,
    ) -> RenderResult<Self> {
        let (width, height) = (surface_config.width, surface_config.height);
        let (depth_texture, depth_view) = Self::create_depth_texture(&device, width, height);
        let camera = Camera::new(width as f32 / height as f32);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera uniforms"),
            contents: bytemuck::cast_slice(&[CameraUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sphere_mesh_layouts = SphereMeshLayouts::new(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera bind group"),
            layout: &sphere_mesh_layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let mut engine = Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            depth_texture,
            depth_view,
            materials: MaterialRegistry::new(),
            camera,
            width,
            height,
            camera_buffer,
            camera_bind_group,
            sphere_mesh_layouts,
            sphere_mesh_pipelines: None,
            offscreen: None,
        };
        engine.init_sphere_mesh_pipelines()?;

        log::info!(
            "render engine ready: {} ({:?}), {}x{}, wireframe {}",
            engine.adapter.get_info().name,
            engine.adapter.get_info().backend,
            width,
            height,
            if engine.supports_wireframe() { "available" } else { "unavailable" }
        );
        Ok(engine)
    }

    /// Resizes the render target.
    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }

        let (depth_texture, depth_view) = Self::create_depth_texture(&self.device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        self.offscreen = None;

        self.camera.set_aspect_ratio(width as f32 / height as f32);
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Per-frame render context from the main camera.
    pub fn render_context(&self, model: glam::Mat4, wireframe: bool) -> RenderContext {
        self.camera.render_context(model, wireframe)
    }

    /// Updates camera uniforms.
    pub fn update_camera_uniforms(&self, ctx: &RenderContext) {
        let uniforms = CameraUniforms::from_context(ctx);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Gets the camera buffer.
    pub fn camera_buffer(&self) -> &wgpu::Buffer {
        &self.camera_buffer
    }

    /// Bind group layouts for creating sphere-mesh renderers.
    pub fn sphere_mesh_layouts(&self) -> &SphereMeshLayouts {
        &self.sphere_mesh_layouts
    }

    /// Format of the color targets the pipelines draw into.
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Whether line-mode pipelines are available.
    pub fn supports_wireframe(&self) -> bool {
        self.device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
    }

    /// Returns the depth texture view.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Returns the viewport dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
