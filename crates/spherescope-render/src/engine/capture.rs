use super::RenderEngine;
use crate::render_context::RenderContext;
use crate::screenshot::ScreenshotError;

/// Color texture rendered into when there is no surface, or for screenshots.
pub struct OffscreenTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderEngine {
    /// View of the offscreen color target, created on first use.
    ///
    /// The target matches the pipeline color format and viewport size.
    pub fn offscreen_view(&mut self) -> wgpu::TextureView {
        if let Some(target) = &self.offscreen {
            return target.view.clone();
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen color texture"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.color_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.offscreen = Some(OffscreenTarget {
            texture,
            view: view.clone(),
        });
        view
    }

    /// Calculates bytes per row with proper alignment for wgpu buffer copies.
    fn aligned_bytes_per_row(width: u32) -> u32 {
        let bytes_per_pixel = 4u32; // RGBA8 or Depth32Float
        let unaligned = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unaligned.div_ceil(align) * align
    }

    /// Copies one aspect of `texture` to the CPU, removing row padding.
    ///
    /// Every supported format has 4 bytes per texel.
    fn read_texture(
        &self,
        texture: &wgpu::Texture,
        aspect: wgpu::TextureAspect,
    ) -> Result<Vec<u8>, ScreenshotError> {
        let bytes_per_row = Self::aligned_bytes_per_row(self.width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: u64::from(bytes_per_row * self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback copy encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| ScreenshotError::BufferMapFailed)?
            .map_err(|_| ScreenshotError::BufferMapFailed)?;

        let data = buffer_slice.get_mapped_range();
        let row_bytes = (self.width * 4) as usize;
        let mut result = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height {
            let start = (row * bytes_per_row) as usize;
            result.extend_from_slice(&data[start..start + row_bytes]);
        }

        drop(data);
        buffer.unmap();
        Ok(result)
    }

    /// Reads back the offscreen color target as tightly packed RGBA8.
    pub fn capture_color(&self) -> Result<Vec<u8>, ScreenshotError> {
        let target = self
            .offscreen
            .as_ref()
            .ok_or(ScreenshotError::InvalidImageData)?;
        let mut pixels = self.read_texture(&target.texture, wgpu::TextureAspect::All)?;

        if matches!(
            self.color_format(),
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for chunk in pixels.chunks_exact_mut(4) {
                chunk.swap(0, 2);
            }
        }
        Ok(pixels)
    }

    /// Reads back the depth buffer as eye-space distances, row-major.
    ///
    /// Background pixels (cleared depth) read as `0.0`.
    pub fn capture_depth(&self, ctx: &RenderContext) -> Result<Vec<f32>, ScreenshotError> {
        let bytes = self.read_texture(&self.depth_texture, wgpu::TextureAspect::DepthOnly)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|texel| {
                let depth = f32::from_ne_bytes([texel[0], texel[1], texel[2], texel[3]]);
                ctx.linear_depth(depth).unwrap_or(0.0)
            })
            .collect())
    }
}
