//! Explicit graphics context
//!
//! `GpuContext` owns the backend together with its state cache. Every
//! resource and pass takes the context by reference, so all binding traffic
//! goes through the cache.

mod state_cache;

pub use state_cache::{Slot, StateCache};

use glam::Vec4;

use crate::backend::*;

/// Configuration for creating a context
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Width of the default surface
    pub window_width: u32,
    /// Height of the default surface
    pub window_height: u32,
    /// Read the driver's current bindings instead of assuming a fresh context
    pub resync_on_create: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            resync_on_create: false,
        }
    }
}

/// A backend plus the state cache mediating access to it
pub struct GpuContext {
    backend: Box<dyn GlBackend>,
    state: StateCache,
    limits: DeviceLimits,
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("limits", &self.limits)
            .finish()
    }
}

impl GpuContext {
    pub fn new(backend: impl GlBackend) -> Self {
        Self::with_config(backend, ContextConfig::default())
    }

    pub fn with_config(backend: impl GlBackend, config: ContextConfig) -> Self {
        let limits = backend.limits();
        log::info!(
            "Creating context on {} ({}x{}, {} color attachments, {} texture units)",
            backend.name(),
            config.window_width,
            config.window_height,
            limits.max_color_attachments,
            limits.max_texture_units
        );
        let mut context = Self {
            backend: Box::new(backend),
            state: StateCache::new(config.window_width, config.window_height),
            limits,
        };
        if config.resync_on_create {
            context.resync();
        }
        context
    }

    pub fn backend(&self) -> &dyn GlBackend {
        self.backend.as_ref()
    }

    /// Direct driver access. Binding changes made through it must be
    /// followed by [`GpuContext::invalidate`] or [`GpuContext::resync`].
    pub fn backend_mut(&mut self) -> &mut dyn GlBackend {
        self.backend.as_mut()
    }

    /// Downcast to the concrete backend type.
    pub fn backend_as<B: GlBackend>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref()
    }

    pub fn backend_as_mut<B: GlBackend>(&mut self) -> Option<&mut B> {
        self.backend.as_any_mut().downcast_mut()
    }

    pub fn state(&self) -> &StateCache {
        &self.state
    }

    pub fn limits(&self) -> DeviceLimits {
        self.limits
    }

    // === Bindings ===

    pub fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> bool {
        self.state
            .bind_vertex_array(self.backend.as_mut(), vertex_array)
    }

    /// Bind as both read and draw target
    pub fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> bool {
        let read = self.bind_read_framebuffer(framebuffer);
        let draw = self.bind_draw_framebuffer(framebuffer);
        read || draw
    }

    pub fn bind_read_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> bool {
        self.state
            .bind_framebuffer(self.backend.as_mut(), FramebufferTarget::Read, framebuffer)
    }

    pub fn bind_draw_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> bool {
        self.state
            .bind_framebuffer(self.backend.as_mut(), FramebufferTarget::Draw, framebuffer)
    }

    pub fn use_program(&mut self, program: Option<ProgramHandle>) -> bool {
        self.state.use_program(self.backend.as_mut(), program)
    }

    pub fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) -> bool {
        self.state.bind_texture(self.backend.as_mut(), unit, texture)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        self.state.set_viewport(self.backend.as_mut(), viewport)
    }

    // === Capabilities ===

    pub fn set_capability(&mut self, capability: Capability, enabled: bool) -> bool {
        self.state
            .set_capability(self.backend.as_mut(), capability, enabled)
    }

    pub fn enable(&mut self, capability: Capability) -> bool {
        self.set_capability(capability, true)
    }

    pub fn disable(&mut self, capability: Capability) -> bool {
        self.set_capability(capability, false)
    }

    pub fn is_enabled(&mut self, capability: Capability) -> bool {
        self.state.is_enabled(self.backend.as_ref(), capability)
    }

    // === Window ===

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.state.set_window_size(width, height);
    }

    /// Viewport covering the whole default surface
    pub fn window_viewport(&self) -> Viewport {
        let (width, height) = self.state.window_size();
        Viewport::from_size(width, height)
    }

    // === Cache maintenance ===

    pub fn invalidate(&mut self) {
        self.state.invalidate();
    }

    pub fn resync(&mut self) {
        let units = self.limits.max_texture_units;
        self.state.resync(self.backend.as_mut(), units);
    }

    // === Object lifetime ===

    /// Create a texture. The driver binds it on the active unit, which the
    /// cache records.
    pub fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> BackendResult<TextureHandle> {
        let texture = self.backend.create_texture(desc, data)?;
        self.state.texture_created(texture);
        Ok(texture)
    }

    pub fn delete_texture(&mut self, texture: TextureHandle) {
        self.backend.delete_texture(texture);
        self.state.texture_deleted(texture);
    }

    pub fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.backend.delete_framebuffer(framebuffer);
        self.state.framebuffer_deleted(framebuffer);
    }

    pub fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.backend.delete_vertex_array(vertex_array);
        self.state.vertex_array_deleted(vertex_array);
    }

    /// Delete a program, leaving it first if it is in use.
    pub fn delete_program(&mut self, program: ProgramHandle) {
        if self.state.program() == Slot::Known(Some(program)) {
            self.use_program(None);
        }
        self.backend.delete_program(program);
    }

    // === Pass-level driver calls ===

    pub(crate) fn clear(&mut self, flags: ClearFlags, color: Vec4, depth: f32) {
        if flags.contains(ClearFlags::COLOR) {
            self.backend.clear_color(color);
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.backend.clear_depth(depth);
        }
        self.backend.clear(flags);
    }
}
