// src/wgpu_utils/uniform_buffer.rs
//! Typed GPU buffer wrappers

use std::marker::PhantomData;

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A uniform buffer holding exactly one `Content` value.
///
/// Uploads are skipped when the content has not changed since the last
/// write, so stable per-frame data costs nothing.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    last_upload: Vec<u8>,
    _marker: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn new(device: &wgpu::Device) -> Self {
        let label = format!("UniformBuffer<{}>", short_type_name::<Content>());
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            last_upload: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Uploads `content`, skipping the write when nothing changed.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let bytes = bytemuck::bytes_of(&content);
        if self.last_upload == bytes {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_upload.clear();
        self.last_upload.extend_from_slice(bytes);
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}

/// A read-only storage buffer holding an array of `Content` values,
/// rewritten from the CPU side as a whole.
pub struct ArrayBuffer<Content> {
    buffer: wgpu::Buffer,
    capacity: usize,
    current_size: usize,
    _marker: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> ArrayBuffer<Content> {
    /// Creates a buffer with room for `capacity` elements. A zero
    /// capacity still allocates one element's worth of backing store, as
    /// wgpu rejects empty buffers; `capacity()` reports the logical size.
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let label = format!("ArrayBuffer<{}>", short_type_name::<Content>());
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: (capacity.max(1) * std::mem::size_of::<Content>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            capacity,
            current_size: 0,
            _marker: PhantomData,
        }
    }

    /// Rewrites the buffer contents from `data`.
    pub fn update_data(&mut self, queue: &wgpu::Queue, data: &[Content]) {
        assert!(data.len() <= self.capacity, "Data exceeds buffer capacity");
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.current_size = data.len();
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Elements written by the last `update_data`.
    pub fn len(&self) -> usize {
        self.current_size
    }

    pub fn is_empty(&self) -> bool {
        self.current_size == 0
    }

    /// Maximum element count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
