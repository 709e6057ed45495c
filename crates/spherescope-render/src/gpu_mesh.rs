//! GPU meshes with named vertex attributes.
//!
//! Pipelines declare the attributes they consume as [`AttributeSlot`]s; a
//! [`GpuMesh`] stores one buffer per named attribute. Binding a mesh to a
//! pipeline looks attributes up by name and fails with
//! [`RenderError::MissingAttribute`] instead of reading unrelated data.

use std::ops::Range;

use crate::buffer;
use crate::error::{RenderError, RenderResult};

/// One vertex attribute consumed by a pipeline, bound at its own buffer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: &'static str,
    pub format: wgpu::VertexFormat,
    pub step_mode: wgpu::VertexStepMode,
}

/// Template vertex position.
pub const VPOSITION: AttributeSlot = AttributeSlot {
    name: "vposition",
    format: wgpu::VertexFormat::Float32x3,
    step_mode: wgpu::VertexStepMode::Vertex,
};

/// Template vertex normal.
pub const VNORMAL: AttributeSlot = AttributeSlot {
    name: "vnormal",
    format: wgpu::VertexFormat::Float32x3,
    step_mode: wgpu::VertexStepMode::Vertex,
};

/// Per-instance weighted sphere `(center, radius)`.
pub const VSPHERE: AttributeSlot = AttributeSlot {
    name: "vsphere",
    format: wgpu::VertexFormat::Float32x4,
    step_mode: wgpu::VertexStepMode::Instance,
};

/// Vertex attributes for `slots`, one per buffer, at locations `0..n`.
pub fn vertex_attributes(slots: &[AttributeSlot]) -> Vec<[wgpu::VertexAttribute; 1]> {
    slots
        .iter()
        .zip(0u32..)
        .map(|(slot, location)| {
            [wgpu::VertexAttribute {
                format: slot.format,
                offset: 0,
                shader_location: location,
            }]
        })
        .collect()
}

/// Buffer layouts matching [`vertex_attributes`].
pub fn vertex_buffer_layouts<'a>(
    slots: &[AttributeSlot],
    attributes: &'a [[wgpu::VertexAttribute; 1]],
) -> Vec<wgpu::VertexBufferLayout<'a>> {
    slots
        .iter()
        .zip(attributes)
        .map(|(slot, attrs)| wgpu::VertexBufferLayout {
            array_stride: slot.format.size(),
            step_mode: slot.step_mode,
            attributes: attrs,
        })
        .collect()
}

/// A named attribute buffer.
pub struct GpuAttribute {
    pub name: String,
    pub format: wgpu::VertexFormat,
    pub buffer: wgpu::Buffer,
    /// Number of elements in the buffer.
    pub len: u32,
}

/// Vertex data held on the GPU, addressed by attribute name.
pub struct GpuMesh {
    label: String,
    attributes: Vec<GpuAttribute>,
    index_buffer: Option<wgpu::Buffer>,
    num_indices: u32,
}

impl GpuMesh {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attributes: Vec::new(),
            index_buffer: None,
            num_indices: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Uploads `data` as the attribute `name`, replacing any previous buffer.
    pub fn set_attribute<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        format: wgpu::VertexFormat,
        data: &[T],
    ) {
        let buffer =
            buffer::create_vertex_buffer(device, data, Some(&format!("{} {name}", self.label)));
        let attribute = GpuAttribute {
            name: name.to_string(),
            format,
            buffer,
            len: count(data.len()),
        };
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Uploads a triangle index list.
    pub fn set_indices(&mut self, device: &wgpu::Device, indices: &[u32]) {
        self.index_buffer = Some(buffer::create_index_buffer(
            device,
            indices,
            Some(&format!("{} indices", self.label)),
        ));
        self.num_indices = count(indices.len());
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> RenderResult<&GpuAttribute> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| RenderError::MissingAttribute {
                mesh: self.label.clone(),
                attribute: name.to_string(),
            })
    }

    /// Checks that every slot is present with the expected format.
    pub fn require(&self, slots: &[AttributeSlot]) -> RenderResult<()> {
        for slot in slots {
            let attribute = self.attribute(slot.name)?;
            if attribute.format != slot.format {
                return Err(RenderError::MissingAttribute {
                    mesh: self.label.clone(),
                    attribute: format!("{} as {:?}", slot.name, slot.format),
                });
            }
        }
        Ok(())
    }

    /// Binds the attributes named by `slots` to consecutive buffer slots
    /// starting at `first_slot`, plus the index buffer if present.
    pub fn bind(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        slots: &[AttributeSlot],
        first_slot: u32,
    ) -> RenderResult<()> {
        for (slot, index) in slots.iter().zip(first_slot..) {
            let attribute = self.attribute(slot.name)?;
            pass.set_vertex_buffer(index, attribute.buffer.slice(..));
        }
        if let Some(indices) = &self.index_buffer {
            pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        }
        Ok(())
    }

    /// Issues an indexed draw (or a plain draw when there is no index buffer).
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: Range<u32>) {
        if self.index_buffer.is_some() {
            pass.draw_indexed(0..self.num_indices, 0, instances);
        } else {
            let vertices = self.attributes.first().map_or(0, |a| a.len);
            pass.draw(0..vertices, instances);
        }
    }

    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }
}

#[allow(clippy::cast_possible_truncation)]
fn count(len: usize) -> u32 {
    len as u32
}
