//! Growable GPU buffers.
//!
//! [`DynamicBuffer`] grows with a 2x strategy when data exceeds capacity.
//! [`UniformArray`] packs one uniform struct per slot at the device's
//! dynamic-offset alignment, so a single bind group serves every scene node.

use std::marker::PhantomData;
use std::num::NonZeroU64;

/// A GPU buffer that can grow dynamically.
///
/// Never shrinks (GPU buffers cannot be resized in place).
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: usize,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(256);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            capacity,
            len: 0,
            usage,
            label: label.to_owned(),
        }
    }

    /// Write raw bytes to the buffer, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups need
    /// recreation).
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len();

        let reallocated = if needed > self.capacity {
            let new_capacity = (needed * 2).max(self.capacity + 1024);
            self.buffer.destroy();
            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: new_capacity as u64,
                usage: self.usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            log::debug!(
                "{}: grew {} -> {} bytes",
                self.label,
                self.capacity,
                new_capacity
            );
            self.capacity = new_capacity;
            true
        } else {
            false
        };

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        self.len = needed;

        reallocated
    }

    /// The underlying wgpu buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes written by the last [`write_bytes`](Self::write_bytes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the last write was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release the GPU allocation immediately.
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// Round `size` up to the next multiple of `alignment`.
#[must_use]
pub(crate) fn align_to(size: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

/// An array of uniform structs addressed with dynamic offsets.
///
/// Slot `i` lives at byte offset `i * stride`, where `stride` is
/// `size_of::<T>()` rounded up to `min_uniform_buffer_offset_alignment`.
pub struct UniformArray<T> {
    inner: DynamicBuffer,
    stride: usize,
    count: usize,
    staging: Vec<u8>,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> UniformArray<T> {
    /// Uniform array with room for `capacity` slots.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, capacity: usize) -> Self {
        let alignment =
            device.limits().min_uniform_buffer_offset_alignment as usize;
        let stride = align_to(size_of::<T>(), alignment);
        Self {
            inner: DynamicBuffer::new(
                device,
                label,
                stride * capacity.max(1),
                wgpu::BufferUsages::UNIFORM,
            ),
            stride,
            count: 0,
            staging: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Upload `items`, one per slot.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups need
    /// recreation).
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        items: &[T],
    ) -> bool {
        self.staging.clear();
        self.staging.resize(items.len() * self.stride, 0);
        for (i, item) in items.iter().enumerate() {
            let start = i * self.stride;
            self.staging[start..start + size_of::<T>()]
                .copy_from_slice(bytemuck::bytes_of(item));
        }
        self.count = items.len();
        self.inner.write_bytes(device, queue, &self.staging)
    }

    /// Dynamic offset of slot `index`.
    #[must_use]
    pub fn offset(&self, index: usize) -> u32 {
        (index * self.stride) as u32
    }

    /// Binding size of a single slot.
    #[must_use]
    pub fn binding_size() -> Option<NonZeroU64> {
        NonZeroU64::new(size_of::<T>() as u64)
    }

    /// The underlying wgpu buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.inner.buffer()
    }

    /// Number of slots written by the last [`write`](Self::write).
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Release the GPU allocation immediately.
    pub fn destroy(&self) {
        self.inner.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_to_rounds_up_to_alignment() {
        assert_eq!(align_to(144, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(0, 256), 0);
        assert_eq!(align_to(10, 0), 10);
    }
}
