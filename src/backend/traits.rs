//! Core backend abstraction traits
//!
//! `GlBackend` is the immediate-mode surface of an OpenGL-style driver. The
//! state cache and every resource type talk to the driver only through it, so
//! the same code runs against a real context or the recording dummy backend.

use std::any::Any;

use glam::Vec4;
use thiserror::Error;

use crate::backend::types::*;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Failed to create {0} object")]
    ObjectCreationFailed(&'static str),
    #[error("Failed to compile {stage} shader:\n{log}")]
    ShaderCompilationFailed { stage: ShaderStage, log: String },
    #[error("Failed to link program:\n{0}")]
    ProgramLinkFailed(String),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("Unsupported by this backend: {0}")]
    Unsupported(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Immediate-mode graphics driver
pub trait GlBackend: Any {
    /// Human readable backend name
    fn name(&self) -> &'static str;

    /// Limits queried once at context creation
    fn limits(&self) -> DeviceLimits;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    // === Shaders ===

    /// Compile a single stage. On failure the stage object is deleted and the
    /// info log is returned in the error.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> BackendResult<ShaderHandle>;

    /// Link compiled stages into a program. The stage objects stay owned by
    /// the caller.
    fn link_program(&mut self, shaders: &[ShaderHandle]) -> BackendResult<ProgramHandle>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    fn delete_program(&mut self, program: ProgramHandle);

    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// All active uniforms of a linked program
    fn active_uniforms(&self, program: ProgramHandle) -> Vec<ActiveVariable>;

    /// All active vertex inputs of a linked program
    fn active_inputs(&self, program: ProgramHandle) -> Vec<ActiveVariable>;

    /// Color number a fragment output is bound to, `None` if it is not active
    fn frag_data_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    /// Upload to a location of the program currently in use
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    // === Textures ===

    /// Create a 2D texture, optionally with initial tightly packed pixel data.
    /// The texture is left bound to the active unit.
    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> BackendResult<TextureHandle>;

    fn delete_texture(&mut self, texture: TextureHandle);

    fn active_texture(&mut self, unit: u32);

    /// Bind a 2D texture to the active unit
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    // === Framebuffers ===

    fn create_framebuffer(&mut self) -> BackendResult<FramebufferHandle>;

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// `None` binds the default framebuffer
    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: Option<FramebufferHandle>);

    /// Attach (or detach with `None`) a texture to the draw framebuffer
    fn framebuffer_texture(&mut self, attachment: Attachment, texture: Option<TextureHandle>);

    /// Set the draw-buffer table of the draw framebuffer
    fn draw_buffers(&mut self, buffers: &[DrawBuffer]);

    fn read_buffer(&mut self, buffer: DrawBuffer);

    fn framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus;

    /// Read a rectangle of the read framebuffer as RGBA floats
    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<Vec4>;

    // === Geometry ===

    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle>;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);

    /// Create a buffer holding `data`, left bound to `target`
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BackendResult<BufferHandle>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Bind a buffer to `target` in the current vertex array
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);

    /// Describe and enable a float attribute sourced from the bound vertex buffer
    fn vertex_attribute(&mut self, attribute: &VertexAttribute);

    // === Fixed function ===

    fn viewport(&mut self, viewport: Viewport);

    fn enable(&mut self, capability: Capability);

    fn disable(&mut self, capability: Capability);

    fn is_enabled(&self, capability: Capability) -> bool;

    fn clear_color(&mut self, color: Vec4);

    fn clear_depth(&mut self, depth: f32);

    fn clear(&mut self, flags: ClearFlags);

    // === Draws ===

    fn draw_arrays(&mut self, mode: PrimitiveKind, first: u32, count: u32, instances: u32);

    fn draw_elements(&mut self, mode: PrimitiveKind, count: u32, format: IndexFormat, instances: u32);

    // === Queries used to resynchronise the state cache ===

    fn current_program(&self) -> Option<ProgramHandle>;

    fn bound_vertex_array(&self) -> Option<VertexArrayHandle>;

    fn bound_framebuffer(&self, target: FramebufferTarget) -> Option<FramebufferHandle>;

    fn active_texture_unit(&self) -> u32;

    /// Texture bound to `unit`. May change the active unit; callers restore it.
    fn bound_texture(&mut self, unit: u32) -> Option<TextureHandle>;

    fn current_viewport(&self) -> Viewport;
}
