// src/wgpu_utils/transient.rs
//! Per-frame transient uniform uploads
//!
//! Small per-draw structs (transform and material blocks) do not get their
//! own buffers. They are appended to one shared uniform buffer that is
//! reset at the top of every frame and addressed with dynamic offsets at
//! bind time. Blocks above [`TransientUniforms::BLOCK_LIMIT`] bytes must
//! use a dedicated buffer instead.

use crate::error::RenderError;
use crate::wgpu_utils::binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc};

/// Append-only uniform arena, rewritten every frame.
pub struct TransientUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    alignment: u64,
    capacity: u64,
    cursor: u64,
}

impl TransientUniforms {
    /// Upper bound for a single transient block. Anything larger belongs in
    /// a dedicated buffer.
    pub const BLOCK_LIMIT: usize = 4096;

    /// Default arena capacity, enough for several thousand draws per frame.
    pub const DEFAULT_CAPACITY: u64 = 1 << 20;

    /// Creates the arena and its bind group against a dynamic-offset
    /// uniform layout. Each dynamic bind views a [`Self::BLOCK_LIMIT`]
    /// window starting at the pushed offset.
    pub fn new(device: &wgpu::Device, layout: &BindGroupLayoutWithDesc, capacity: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transient Uniform Arena"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = BindGroupBuilder::new(layout)
            .resource(wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(Self::BLOCK_LIMIT as u64),
            }))
            .create(device, "Transient Uniform Bind Group");

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;

        Self {
            buffer,
            bind_group,
            alignment,
            capacity,
            cursor: 0,
        }
    }

    /// Rewinds the arena. Call once per frame before any `push`.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Writes one block and returns the dynamic offset to bind it at.
    pub fn push<T: bytemuck::Pod>(
        &mut self,
        queue: &wgpu::Queue,
        value: &T,
    ) -> Result<u32, RenderError> {
        let bytes = bytemuck::bytes_of(value);
        if bytes.len() > Self::BLOCK_LIMIT {
            return Err(RenderError::OversizedUniform {
                size: bytes.len(),
                limit: Self::BLOCK_LIMIT,
            });
        }

        let offset = self.cursor;
        // the bind group views a fixed BLOCK_LIMIT window at each offset
        if offset + Self::BLOCK_LIMIT as u64 > self.capacity {
            return Err(RenderError::TransientExhausted {
                requested: bytes.len() as u64,
                remaining: self.capacity.saturating_sub(offset),
            });
        }

        queue.write_buffer(&self.buffer, offset, bytes);
        self.cursor = align_up(offset + bytes.len() as u64, self.alignment);

        Ok(offset as u32)
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
    }
}
