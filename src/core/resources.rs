// Copyright @yucwang 2026

use std::collections::HashMap;

use crate::core::error::{LumiereError, Result};
use crate::math::bitmap::PixelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

// The slice of a graphics API the tracers need: raw float buffers and RGBA8 textures.
pub trait GpuResources {
    fn create_buffer(&mut self, size_bytes: usize) -> BufferHandle;
    fn upload_buffer(&mut self, handle: BufferHandle, data: &[f32]) -> Result<()>;
    fn create_texture(&mut self, width: usize, height: usize) -> TextureHandle;
    fn upload_texture(&mut self, handle: TextureHandle, pixels: &PixelBuffer) -> Result<()>;
}

pub trait DisplaySurface {
    fn present(&mut self, pixels: &PixelBuffer) -> Result<()>;
}

// CPU-side stand-in for a device: keeps uploads in memory so they can be read back.
#[derive(Debug, Default)]
pub struct HostResources {
    next_id: u32,
    buffers: HashMap<u32, (usize, Vec<f32>)>,
    textures: HashMap<u32, PixelBuffer>,
}

impl HostResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&[f32]> {
        self.buffers.get(&handle.0).map(|(_, data)| data.as_slice())
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&PixelBuffer> {
        self.textures.get(&handle.0)
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GpuResources for HostResources {
    fn create_buffer(&mut self, size_bytes: usize) -> BufferHandle {
        let id = self.allocate_id();
        self.buffers.insert(id, (size_bytes, Vec::new()));
        BufferHandle(id)
    }

    fn upload_buffer(&mut self, handle: BufferHandle, data: &[f32]) -> Result<()> {
        let (size_bytes, storage) = self.buffers
            .get_mut(&handle.0)
            .ok_or(LumiereError::UnknownHandle(handle.0))?;
        let actual = std::mem::size_of_val(data);
        if actual != *size_bytes {
            return Err(LumiereError::BufferSizeMismatch { expected: *size_bytes, actual });
        }
        storage.clear();
        storage.extend_from_slice(data);
        Ok(())
    }

    fn create_texture(&mut self, width: usize, height: usize) -> TextureHandle {
        let id = self.allocate_id();
        self.textures.insert(id, PixelBuffer::new(width, height));
        TextureHandle(id)
    }

    fn upload_texture(&mut self, handle: TextureHandle, pixels: &PixelBuffer) -> Result<()> {
        let texture = self.textures
            .get_mut(&handle.0)
            .ok_or(LumiereError::UnknownHandle(handle.0))?;
        if texture.as_bytes().len() != pixels.as_bytes().len() {
            return Err(LumiereError::BufferSizeMismatch {
                expected: texture.as_bytes().len(),
                actual: pixels.as_bytes().len(),
            });
        }
        *texture = pixels.clone();
        Ok(())
    }
}

// Keeps the last presented frame.
#[derive(Debug, Default)]
pub struct HostSurface {
    last_frame: Option<PixelBuffer>,
    presented: usize,
}

impl HostSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&PixelBuffer> {
        self.last_frame.as_ref()
    }

    pub fn presented_count(&self) -> usize {
        self.presented
    }
}

impl DisplaySurface for HostSurface {
    fn present(&mut self, pixels: &PixelBuffer) -> Result<()> {
        self.last_frame = Some(pixels.clone());
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_upload_checks_size() {
        let mut resources = HostResources::new();
        let handle = resources.create_buffer(3 * std::mem::size_of::<f32>());
        assert!(resources.upload_buffer(handle, &[1.0, 2.0, 3.0]).is_ok());
        assert_eq!(resources.buffer(handle), Some(&[1.0f32, 2.0, 3.0][..]));

        assert!(matches!(resources.upload_buffer(handle, &[1.0]),
                         Err(LumiereError::BufferSizeMismatch { expected: 12, actual: 4 })));
        assert!(matches!(resources.upload_buffer(BufferHandle(99), &[1.0]),
                         Err(LumiereError::UnknownHandle(99))));
    }

    #[test]
    fn test_texture_upload_and_present() {
        let mut resources = HostResources::new();
        let handle = resources.create_texture(2, 1);
        let mut pixels = PixelBuffer::new(2, 1);
        pixels.as_bytes_mut()[0] = 200;
        assert!(resources.upload_texture(handle, &pixels).is_ok());
        assert_eq!(resources.texture(handle).map(|t| t.pixel(0, 0)[0]), Some(200));
        assert!(resources.upload_texture(handle, &PixelBuffer::new(3, 1)).is_err());

        let mut surface = HostSurface::new();
        assert!(surface.present(&pixels).is_ok());
        assert_eq!(surface.presented_count(), 1);
        assert_eq!(surface.last_frame(), Some(&pixels));
    }
}
