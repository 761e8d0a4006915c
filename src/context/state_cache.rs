//! Redundant-binding elimination
//!
//! The cache mirrors the driver's binding points. A bind is forwarded to the
//! backend only when the requested value differs from the cached one, after
//! which the cached value is updated. Slots can be forgotten (`invalidate`)
//! when foreign code touched the driver, or re-read from it (`resync`).

use std::collections::HashMap;

use crate::backend::{
    Capability, FramebufferHandle, FramebufferTarget, GlBackend, ProgramHandle, TextureHandle,
    VertexArrayHandle, Viewport,
};

/// Cached value of one binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<T> {
    /// The driver value is not known; the next bind is always issued
    Unknown,
    Known(T),
}

impl<T: Copy + PartialEq> Slot<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            Slot::Known(value) => Some(*value),
            Slot::Unknown => None,
        }
    }

    fn holds(&self, value: T) -> bool {
        matches!(self, Slot::Known(current) if *current == value)
    }
}

/// GPU state cache
#[derive(Debug, Clone)]
pub struct StateCache {
    vertex_array: Slot<Option<VertexArrayHandle>>,
    read_framebuffer: Slot<Option<FramebufferHandle>>,
    draw_framebuffer: Slot<Option<FramebufferHandle>>,
    program: Slot<Option<ProgramHandle>>,
    active_unit: Slot<u32>,
    textures: HashMap<u32, Slot<Option<TextureHandle>>>,
    /// Whether units missing from `textures` are unknown rather than empty
    textures_unknown: bool,
    viewport: Slot<Viewport>,
    /// Missing capabilities are unknown and queried on first use
    capabilities: HashMap<Capability, bool>,
    window_size: (u32, u32),
}

impl StateCache {
    /// Cache of a fresh context: nothing bound, unit 0 active, viewport
    /// covering the window.
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            vertex_array: Slot::Known(None),
            read_framebuffer: Slot::Known(None),
            draw_framebuffer: Slot::Known(None),
            program: Slot::Known(None),
            active_unit: Slot::Known(0),
            textures: HashMap::new(),
            textures_unknown: false,
            viewport: Slot::Known(Viewport::from_size(window_width, window_height)),
            capabilities: HashMap::new(),
            window_size: (window_width, window_height),
        }
    }

    pub fn vertex_array(&self) -> Slot<Option<VertexArrayHandle>> {
        self.vertex_array
    }

    pub fn framebuffer(&self, target: FramebufferTarget) -> Slot<Option<FramebufferHandle>> {
        match target {
            FramebufferTarget::Read => self.read_framebuffer,
            FramebufferTarget::Draw => self.draw_framebuffer,
        }
    }

    pub fn program(&self) -> Slot<Option<ProgramHandle>> {
        self.program
    }

    pub fn active_unit(&self) -> Slot<u32> {
        self.active_unit
    }

    pub fn texture(&self, unit: u32) -> Slot<Option<TextureHandle>> {
        match self.textures.get(&unit) {
            Some(slot) => *slot,
            None if self.textures_unknown => Slot::Unknown,
            None => Slot::Known(None),
        }
    }

    pub fn viewport(&self) -> Slot<Viewport> {
        self.viewport
    }

    pub fn capability(&self, capability: Capability) -> Slot<bool> {
        match self.capabilities.get(&capability) {
            Some(enabled) => Slot::Known(*enabled),
            None => Slot::Unknown,
        }
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub(crate) fn bind_vertex_array(
        &mut self,
        backend: &mut dyn GlBackend,
        vertex_array: Option<VertexArrayHandle>,
    ) -> bool {
        if self.vertex_array.holds(vertex_array) {
            return false;
        }
        backend.bind_vertex_array(vertex_array);
        self.vertex_array = Slot::Known(vertex_array);
        true
    }

    pub(crate) fn bind_framebuffer(
        &mut self,
        backend: &mut dyn GlBackend,
        target: FramebufferTarget,
        framebuffer: Option<FramebufferHandle>,
    ) -> bool {
        let slot = match target {
            FramebufferTarget::Read => &mut self.read_framebuffer,
            FramebufferTarget::Draw => &mut self.draw_framebuffer,
        };
        if slot.holds(framebuffer) {
            return false;
        }
        backend.bind_framebuffer(target, framebuffer);
        *slot = Slot::Known(framebuffer);
        true
    }

    pub(crate) fn use_program(
        &mut self,
        backend: &mut dyn GlBackend,
        program: Option<ProgramHandle>,
    ) -> bool {
        if self.program.holds(program) {
            return false;
        }
        backend.use_program(program);
        self.program = Slot::Known(program);
        true
    }

    pub(crate) fn bind_texture(
        &mut self,
        backend: &mut dyn GlBackend,
        unit: u32,
        texture: Option<TextureHandle>,
    ) -> bool {
        if self.texture(unit).holds(texture) {
            return false;
        }
        if !self.active_unit.holds(unit) {
            backend.active_texture(unit);
            self.active_unit = Slot::Known(unit);
        }
        backend.bind_texture(texture);
        self.textures.insert(unit, Slot::Known(texture));
        true
    }

    pub(crate) fn set_viewport(&mut self, backend: &mut dyn GlBackend, viewport: Viewport) -> bool {
        if self.viewport.holds(viewport) {
            return false;
        }
        backend.viewport(viewport);
        self.viewport = Slot::Known(viewport);
        true
    }

    pub(crate) fn is_enabled(&mut self, backend: &dyn GlBackend, capability: Capability) -> bool {
        *self
            .capabilities
            .entry(capability)
            .or_insert_with(|| backend.is_enabled(capability))
    }

    pub(crate) fn set_capability(
        &mut self,
        backend: &mut dyn GlBackend,
        capability: Capability,
        enabled: bool,
    ) -> bool {
        if self.capabilities.get(&capability) == Some(&enabled) {
            return false;
        }
        if enabled {
            backend.enable(capability);
        } else {
            backend.disable(capability);
        }
        self.capabilities.insert(capability, enabled);
        true
    }

    /// Record that `texture` became bound to the active unit behind the cache.
    pub(crate) fn texture_created(&mut self, texture: TextureHandle) {
        match self.active_unit {
            Slot::Known(unit) => {
                self.textures.insert(unit, Slot::Known(Some(texture)));
            }
            Slot::Unknown => self.forget_textures(),
        }
    }

    /// Deleted objects are unbound from every binding point holding them.
    pub(crate) fn texture_deleted(&mut self, texture: TextureHandle) {
        for slot in self.textures.values_mut() {
            if slot.holds(Some(texture)) {
                *slot = Slot::Known(None);
            }
        }
    }

    pub(crate) fn framebuffer_deleted(&mut self, framebuffer: FramebufferHandle) {
        for slot in [&mut self.read_framebuffer, &mut self.draw_framebuffer] {
            if slot.holds(Some(framebuffer)) {
                *slot = Slot::Known(None);
            }
        }
    }

    pub(crate) fn vertex_array_deleted(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_array.holds(Some(vertex_array)) {
            self.vertex_array = Slot::Known(None);
        }
    }

    fn forget_textures(&mut self) {
        self.textures.clear();
        self.textures_unknown = true;
    }

    /// Forget every slot so the next bind of each is always issued.
    pub fn invalidate(&mut self) {
        log::debug!("State cache invalidated");
        self.vertex_array = Slot::Unknown;
        self.read_framebuffer = Slot::Unknown;
        self.draw_framebuffer = Slot::Unknown;
        self.program = Slot::Unknown;
        self.active_unit = Slot::Unknown;
        self.viewport = Slot::Unknown;
        self.capabilities.clear();
        self.forget_textures();
    }

    /// Re-read every slot from the driver.
    pub(crate) fn resync(&mut self, backend: &mut dyn GlBackend, texture_units: u32) {
        self.vertex_array = Slot::Known(backend.bound_vertex_array());
        self.read_framebuffer = Slot::Known(backend.bound_framebuffer(FramebufferTarget::Read));
        self.draw_framebuffer = Slot::Known(backend.bound_framebuffer(FramebufferTarget::Draw));
        self.program = Slot::Known(backend.current_program());
        self.viewport = Slot::Known(backend.current_viewport());

        let active = backend.active_texture_unit();
        self.textures.clear();
        self.textures_unknown = false;
        for unit in 0..texture_units {
            let texture = backend.bound_texture(unit);
            self.textures.insert(unit, Slot::Known(texture));
        }
        // Texture queries may switch units
        backend.active_texture(active);
        self.active_unit = Slot::Known(active);

        for (capability, enabled) in self.capabilities.iter_mut() {
            *enabled = backend.is_enabled(*capability);
        }
        log::debug!("State cache resynchronised from {}", backend.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, GlCall};

    #[test]
    fn test_redundant_program_bind_is_skipped() {
        let mut backend = DummyBackend::default();
        let mut cache = StateCache::new(800, 600);
        let program = Some(ProgramHandle::from_raw(7));

        assert!(cache.use_program(&mut backend, program));
        assert!(!cache.use_program(&mut backend, program));
        assert_eq!(backend.calls(), &[GlCall::UseProgram(program)]);
    }

    #[test]
    fn test_texture_bind_switches_unit_only_when_needed() {
        let mut backend = DummyBackend::default();
        let mut cache = StateCache::new(800, 600);
        let a = Some(TextureHandle::from_raw(1));

        cache.bind_texture(&mut backend, 0, a);
        cache.bind_texture(&mut backend, 0, a);
        cache.bind_texture(&mut backend, 3, a);

        assert_eq!(
            backend.calls(),
            &[
                GlCall::BindTexture(a),
                GlCall::ActiveTexture(3),
                GlCall::BindTexture(a),
            ]
        );
    }

    #[test]
    fn test_invalidate_forces_rebind() {
        let mut backend = DummyBackend::default();
        let mut cache = StateCache::new(800, 600);
        let vao = Some(VertexArrayHandle::from_raw(2));

        cache.bind_vertex_array(&mut backend, vao);
        cache.invalidate();
        assert_eq!(cache.vertex_array(), Slot::Unknown);
        assert_eq!(cache.texture(0), Slot::Unknown);
        assert!(cache.bind_vertex_array(&mut backend, vao));
    }

    #[test]
    fn test_capability_queried_once() {
        let mut backend = DummyBackend::default();
        let mut cache = StateCache::new(800, 600);

        assert_eq!(cache.capability(Capability::Multisample), Slot::Unknown);
        assert!(cache.is_enabled(&backend, Capability::Multisample));
        assert!(!cache.set_capability(&mut backend, Capability::Multisample, true));
        assert!(cache.set_capability(&mut backend, Capability::DepthTest, true));
        assert!(!cache.set_capability(&mut backend, Capability::DepthTest, true));
        assert_eq!(backend.calls(), &[GlCall::Enable(Capability::DepthTest)]);
    }
}
