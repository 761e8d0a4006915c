//! Host pixel buffers and their GPU textures

use bytemuck::cast_slice;
use glam::Vec4;

use crate::backend::types::*;
use crate::backend::BackendResult;
use crate::context::GpuContext;

/// Pixel data in host memory, already decoded
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub internal_format: InternalFormat,
    pub format: PixelFormat,
    pub ty: PixelType,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// 8-bit RGBA texels, row-major from the bottom-left.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>, name: &str) -> Self {
        Self {
            width,
            height,
            internal_format: InternalFormat::Rgba8,
            format: PixelFormat::Rgba,
            ty: PixelType::UnsignedByte,
            data,
            name: name.to_string(),
        }
    }

    /// Float RGBA texels, e.g. produced by a worker thread.
    pub fn from_rgba_f32(width: u32, height: u32, texels: &[Vec4], name: &str) -> Self {
        Self {
            width,
            height,
            internal_format: InternalFormat::Rgba32F,
            format: PixelFormat::Rgba,
            ty: PixelType::Float,
            data: cast_slice(texels).to_vec(),
            name: name.to_string(),
        }
    }

    /// Single channel float texels, e.g. a height field.
    pub fn from_r32f(width: u32, height: u32, values: &[f32], name: &str) -> Self {
        Self {
            width,
            height,
            internal_format: InternalFormat::R32F,
            format: PixelFormat::Red,
            ty: PixelType::Float,
            data: cast_slice(values).to_vec(),
            name: name.to_string(),
        }
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self::from_rgba8(1, 1, color.to_vec(), name)
    }

    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    pub fn black() -> Self {
        Self::solid_color([0, 0, 0, 255], "black")
    }

    /// Create a checkerboard texture with 8x8 texel cells
    pub fn checkerboard(size: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let is_even = ((x / 8) + (y / 8)) % 2 == 0;
                let color = if is_even { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }

        Self::from_rgba8(size, size, data, "checkerboard")
    }

    pub fn descriptor(&self) -> TextureDescriptor {
        TextureDescriptor {
            label: Some(self.name.clone()),
            width: self.width,
            height: self.height,
            internal_format: self.internal_format,
            format: self.format,
            ty: self.ty,
            ..Default::default()
        }
    }
}

/// GPU texture created from host data
#[derive(Debug)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub name: String,
}

impl Texture {
    /// Create and upload a texture.
    pub fn create(ctx: &mut GpuContext, data: &TextureData) -> BackendResult<Self> {
        let handle = ctx.create_texture(&data.descriptor(), Some(&data.data))?;
        log::debug!(
            "Uploaded texture '{}' ({}x{} {:?})",
            data.name,
            data.width,
            data.height,
            data.internal_format
        );
        Ok(Self {
            handle,
            width: data.width,
            height: data.height,
            name: data.name.clone(),
        })
    }

    pub fn destroy(self, ctx: &mut GpuContext) {
        ctx.delete_texture(self.handle);
    }
}
