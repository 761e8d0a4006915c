//! Off-screen render targets
//!
//! A [`FrameBuffer`] owns one depth attachment and any number of color
//! attachments up to the device limit. Color attachments are addressed by
//! slot, and when the target was derived from a program's outputs, also by
//! the output's name.

use std::collections::BTreeMap;

use glam::Vec4;

use crate::backend::types::*;
use crate::context::{GpuContext, Slot};
use crate::error::FrameBufferError;
use crate::shader::{InterfaceMap, ShaderProgram};

/// Texture formats used for a target's attachments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFormat {
    pub internal_format: InternalFormat,
    pub format: PixelFormat,
    pub ty: PixelType,
    pub storage: TextureStorage,
    pub filter: FilterMode,
    pub depth_format: InternalFormat,
}

impl Default for AttachmentFormat {
    fn default() -> Self {
        Self {
            internal_format: InternalFormat::Rgba32F,
            format: PixelFormat::Rgba,
            ty: PixelType::Float,
            storage: TextureStorage::Mutable,
            filter: FilterMode::Nearest,
            depth_format: InternalFormat::Depth32F,
        }
    }
}

impl AttachmentFormat {
    /// 8-bit color attachments, e.g. for a final LDR image
    pub fn ldr() -> Self {
        Self {
            internal_format: InternalFormat::Rgba8,
            ty: PixelType::UnsignedByte,
            filter: FilterMode::Linear,
            ..Default::default()
        }
    }

    fn color_descriptor(&self, label: String, width: u32, height: u32) -> TextureDescriptor {
        TextureDescriptor {
            label: Some(label),
            width,
            height,
            internal_format: self.internal_format,
            format: self.format,
            ty: self.ty,
            storage: self.storage,
            min_filter: self.filter,
            mag_filter: self.filter,
            address_mode: AddressMode::ClampToEdge,
        }
    }

    fn depth_descriptor(&self, width: u32, height: u32) -> TextureDescriptor {
        TextureDescriptor {
            label: Some("depth".to_string()),
            width,
            height,
            internal_format: self.depth_format,
            format: PixelFormat::Depth,
            ty: PixelType::Float,
            storage: self.storage,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        }
    }
}

/// Off-screen render target
#[derive(Debug)]
pub struct FrameBuffer {
    handle: FramebufferHandle,
    width: u32,
    height: u32,
    format: AttachmentFormat,
    depth: TextureHandle,
    color: BTreeMap<u32, TextureHandle>,
    draw_buffers: Vec<DrawBuffer>,
    /// Semantic name -> color slot
    names: BTreeMap<String, u32>,
}

impl FrameBuffer {
    /// Target with a depth attachment only. Color attachments are added with
    /// [`FrameBuffer::add_color_attachments`].
    pub fn new(
        ctx: &mut GpuContext,
        width: u32,
        height: u32,
        format: &AttachmentFormat,
    ) -> Result<Self, FrameBufferError> {
        let handle = ctx.backend_mut().create_framebuffer()?;
        let depth = match ctx.create_texture(&format.depth_descriptor(width, height), None) {
            Ok(depth) => depth,
            Err(e) => {
                ctx.delete_framebuffer(handle);
                return Err(e.into());
            }
        };

        let framebuffer = Self {
            handle,
            width,
            height,
            format: format.clone(),
            depth,
            color: BTreeMap::new(),
            draw_buffers: Vec::new(),
            names: BTreeMap::new(),
        };
        framebuffer.finish(ctx)
    }

    /// Target with one color attachment per output of `outputs`, attached
    /// at the output's location and reachable through its name.
    pub fn from_outputs(
        ctx: &mut GpuContext,
        outputs: &InterfaceMap,
        width: u32,
        height: u32,
        format: &AttachmentFormat,
    ) -> Result<Self, FrameBufferError> {
        let max = ctx.limits().color_target_limit();
        if let Some((name, output)) = outputs.iter().find(|(_, o)| o.location >= max) {
            log::error!(
                "output '{}' at location {} exceeds the {} color targets supported",
                name,
                output.location,
                max
            );
            return Err(FrameBufferError::TooManyColorAttachments {
                requested: output.location.saturating_add(1),
                existing: 0,
                max,
            });
        }

        let mut framebuffer = Self::new(ctx, width, height, format)?;
        for (name, output) in outputs {
            let desc = format.color_descriptor(name.clone(), width, height);
            let texture = match ctx.create_texture(&desc, None) {
                Ok(texture) => texture,
                Err(e) => {
                    framebuffer.destroy(ctx);
                    return Err(e.into());
                }
            };
            framebuffer.color.insert(output.location, texture);
            framebuffer.names.insert(name.clone(), output.location);
        }
        framebuffer.finish(ctx)
    }

    /// [`FrameBuffer::from_outputs`] over a program's reflected outputs.
    pub fn for_program(
        ctx: &mut GpuContext,
        program: &ShaderProgram,
        width: u32,
        height: u32,
        format: &AttachmentFormat,
    ) -> Result<Self, FrameBufferError> {
        Self::from_outputs(ctx, program.outputs(), width, height, format)
    }

    /// Append `count` color attachments after the highest existing slot.
    ///
    /// Nothing is added when the result would exceed the device limit.
    pub fn add_color_attachments(
        &mut self,
        ctx: &mut GpuContext,
        count: u32,
    ) -> Result<(), FrameBufferError> {
        let max = ctx.limits().color_target_limit();
        let first = self.color.keys().next_back().map_or(0, |slot| slot + 1);
        if count > max.saturating_sub(first) {
            log::error!(
                "cannot add {} color attachments to a target with {}; the device supports {}",
                count,
                self.color.len(),
                max
            );
            return Err(FrameBufferError::TooManyColorAttachments {
                requested: count,
                existing: self.color.len() as u32,
                max,
            });
        }

        for slot in first..first + count {
            let desc = self
                .format
                .color_descriptor(format!("color{}", slot), self.width, self.height);
            let texture = ctx.create_texture(&desc, None)?;
            self.color.insert(slot, texture);
        }
        self.wire(ctx)
    }

    fn finish(mut self, ctx: &mut GpuContext) -> Result<Self, FrameBufferError> {
        match self.wire(ctx) {
            Ok(()) => Ok(self),
            Err(e) => {
                self.destroy(ctx);
                Err(e)
            }
        }
    }

    /// Attach every texture, rebuild the draw-buffer table and check
    /// completeness. The previous draw binding is restored afterwards.
    fn wire(&mut self, ctx: &mut GpuContext) -> Result<(), FrameBufferError> {
        self.draw_buffers = match self.color.keys().next_back() {
            Some(highest) => (0..=*highest)
                .map(|slot| {
                    if self.color.contains_key(&slot) {
                        DrawBuffer::Color(slot)
                    } else {
                        DrawBuffer::None
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let previous = match ctx.state().framebuffer(FramebufferTarget::Draw) {
            Slot::Known(framebuffer) => framebuffer,
            Slot::Unknown => ctx.backend().bound_framebuffer(FramebufferTarget::Draw),
        };
        ctx.bind_draw_framebuffer(Some(self.handle));

        let backend = ctx.backend_mut();
        backend.framebuffer_texture(Attachment::Depth, Some(self.depth));
        for (slot, texture) in &self.color {
            backend.framebuffer_texture(Attachment::Color(*slot), Some(*texture));
        }
        if self.draw_buffers.is_empty() {
            backend.draw_buffers(&[DrawBuffer::None]);
        } else {
            backend.draw_buffers(&self.draw_buffers);
        }
        let status = backend.framebuffer_status(FramebufferTarget::Draw);

        ctx.bind_draw_framebuffer(previous);

        if status != FramebufferStatus::Complete {
            log::error!("framebuffer {:?} is incomplete: {:?}", self.handle, status);
            return Err(FrameBufferError::Incomplete(format!("{:?}", status)));
        }
        log::debug!(
            "Framebuffer {:?} ({}x{}): {} color attachments, draw buffers {:?}",
            self.handle,
            self.width,
            self.height,
            self.color.len(),
            self.draw_buffers
        );
        Ok(())
    }

    /// Bind as read and draw target and cover it with the viewport.
    pub fn bind(&self, ctx: &mut GpuContext) {
        ctx.bind_framebuffer(Some(self.handle));
        ctx.set_viewport(self.viewport());
    }

    /// Return to the default surface and its viewport.
    pub fn unbind(&self, ctx: &mut GpuContext) {
        ctx.bind_framebuffer(None);
        let window = ctx.window_viewport();
        ctx.set_viewport(window);
    }

    /// Texture attached at `slot`, logged when missing.
    pub fn color_attachment(&self, slot: u32) -> Option<TextureHandle> {
        let texture = self.color.get(&slot).copied();
        if texture.is_none() {
            log::error!(
                "color attachment {} does not exist in framebuffer {:?}",
                slot,
                self.handle
            );
        }
        texture
    }

    /// Texture registered under a program output name, logged when missing.
    pub fn buffer(&self, name: &str) -> Option<TextureHandle> {
        match self.names.get(name) {
            Some(slot) => self.color.get(slot).copied(),
            None => {
                log::error!(
                    "buffer '{}' does not exist in framebuffer {:?}",
                    name,
                    self.handle
                );
                None
            }
        }
    }

    /// Read one RGBA texel of the attachment at `slot`.
    pub fn read_pixel(&self, ctx: &mut GpuContext, slot: u32, x: i32, y: i32) -> Option<Vec4> {
        self.color_attachment(slot)?;
        ctx.bind_read_framebuffer(Some(self.handle));
        let backend = ctx.backend_mut();
        backend.read_buffer(DrawBuffer::Color(slot));
        backend.read_pixels(x, y, 1, 1).into_iter().next()
    }

    /// Read one RGBA texel of the attachment named `name`.
    pub fn read_buffer(&self, ctx: &mut GpuContext, name: &str, x: i32, y: i32) -> Option<Vec4> {
        self.buffer(name)?;
        let slot = *self.names.get(name)?;
        self.read_pixel(ctx, slot, x, y)
    }

    pub fn handle(&self) -> FramebufferHandle {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::from_size(self.width, self.height)
    }

    pub fn format(&self) -> &AttachmentFormat {
        &self.format
    }

    pub fn depth_texture(&self) -> TextureHandle {
        self.depth
    }

    /// Draw-buffer table, indexed by fragment output location
    pub fn draw_buffers(&self) -> &[DrawBuffer] {
        &self.draw_buffers
    }

    pub fn color_attachment_count(&self) -> usize {
        self.color.len()
    }

    pub fn buffer_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Delete every attachment and the framebuffer object.
    pub fn destroy(self, ctx: &mut GpuContext) {
        for texture in self.color.values() {
            ctx.delete_texture(*texture);
        }
        ctx.delete_texture(self.depth);
        ctx.delete_framebuffer(self.handle);
    }
}
