//! Render passes
//!
//! A [`RenderPass`] binds one target and one program, clears, forces a list
//! of capabilities on or off, draws its meshes and then puts every
//! capability it touched back the way it found it. A [`PassSequence`] runs
//! passes in order to form a multi-stage pipeline.

pub mod sequence;
pub mod state;

pub use sequence::PassSequence;
pub use state::StateToggles;

use glam::Vec4;

use crate::backend::{Capability, ClearFlags, UniformValue, Viewport};
use crate::context::GpuContext;
use crate::resources::{FrameBuffer, Mesh};
use crate::shader::{ShaderProgram, TextureBindings};

/// Called with each mesh right before it is drawn
pub type RenderableCallback<'a> = Box<dyn FnMut(&mut GpuContext, &Mesh) + 'a>;

/// Called once before the first or after the last draw of a pass
pub type PassHook<'a> = Box<dyn FnMut(&mut GpuContext) + 'a>;

/// One bound configuration of target, program, state changes and meshes.
///
/// The pass borrows everything it draws with; programs, targets and meshes
/// outlive it and may be shared between passes.
pub struct RenderPass<'a> {
    label: String,
    program: &'a ShaderProgram,
    target: Option<&'a FrameBuffer>,
    renderables: Vec<&'a Mesh>,
    clear_bits: Vec<ClearFlags>,
    clear_color: Vec4,
    clear_depth: f32,
    states: StateToggles,
    viewport: Option<Viewport>,
    uniforms: Vec<(String, UniformValue)>,
    textures: Option<TextureBindings>,
    per_renderable: Option<RenderableCallback<'a>>,
    pre_render: Option<PassHook<'a>>,
    post_render: Option<PassHook<'a>>,
}

impl std::fmt::Debug for RenderPass<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPass")
            .field("label", &self.label)
            .field("program", &self.program.label())
            .field("target", &self.target.map(FrameBuffer::handle))
            .field("renderables", &self.renderables.len())
            .field("clear_bits", &self.clear_bits)
            .field("states", &self.states)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderPass<'a> {
    /// Pass drawing with `program` to the default surface.
    pub fn new(label: &str, program: &'a ShaderProgram) -> Self {
        Self {
            label: label.to_string(),
            program,
            target: None,
            renderables: Vec::new(),
            clear_bits: Vec::new(),
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
            states: StateToggles::new(),
            viewport: None,
            uniforms: Vec::new(),
            textures: None,
            per_renderable: None,
            pre_render: None,
            post_render: None,
        }
    }

    pub fn with_target(mut self, target: &'a FrameBuffer) -> Self {
        self.target = Some(target);
        self
    }

    /// `None` draws to the default surface.
    pub fn set_target(&mut self, target: Option<&'a FrameBuffer>) -> &mut Self {
        self.target = target;
        self
    }

    pub fn add_renderable(&mut self, mesh: &'a Mesh) -> &mut Self {
        self.renderables.push(mesh);
        self
    }

    pub fn clear_renderables(&mut self) -> &mut Self {
        self.renderables.clear();
        self
    }

    /// Add one clear call. Each entry is cleared separately, in order.
    pub fn add_clear_bits(&mut self, flags: ClearFlags) -> &mut Self {
        self.clear_bits.push(flags);
        self
    }

    pub fn set_clear_color(&mut self, color: Vec4) -> &mut Self {
        self.clear_color = color;
        self
    }

    pub fn set_clear_depth(&mut self, depth: f32) -> &mut Self {
        self.clear_depth = depth;
        self
    }

    /// Force `capability` on while the pass runs.
    pub fn add_enable(&mut self, capability: Capability) -> &mut Self {
        self.states.add_enable(capability);
        self
    }

    /// Force `capability` off while the pass runs.
    pub fn add_disable(&mut self, capability: Capability) -> &mut Self {
        self.states.add_disable(capability);
        self
    }

    /// Override the viewport, which otherwise covers the target (or the
    /// window when there is no target).
    pub fn set_viewport(&mut self, viewport: Viewport) -> &mut Self {
        self.viewport = Some(viewport);
        self
    }

    /// Uniform uploaded before every mesh. Setting a name again replaces it.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> &mut Self {
        let value = value.into();
        match self.uniforms.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.uniforms.push((name.to_string(), value)),
        }
        self
    }

    pub fn set_per_renderable(
        &mut self,
        callback: impl FnMut(&mut GpuContext, &Mesh) + 'a,
    ) -> &mut Self {
        self.per_renderable = Some(Box::new(callback));
        self
    }

    pub fn set_pre_render(&mut self, hook: impl FnMut(&mut GpuContext) + 'a) -> &mut Self {
        self.pre_render = Some(Box::new(hook));
        self
    }

    pub fn set_post_render(&mut self, hook: impl FnMut(&mut GpuContext) + 'a) -> &mut Self {
        self.post_render = Some(Box::new(hook));
        self
    }

    /// Textures to bind instead of the ones registered on the program.
    pub fn set_texture_bindings(&mut self, bindings: TextureBindings) -> &mut Self {
        self.textures = Some(bindings);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn program(&self) -> &'a ShaderProgram {
        self.program
    }

    pub fn target(&self) -> Option<&'a FrameBuffer> {
        self.target
    }

    pub fn renderables(&self) -> &[&'a Mesh] {
        &self.renderables
    }

    pub fn states(&self) -> &StateToggles {
        &self.states
    }

    /// Run the pass with one draw per mesh.
    pub fn render(&mut self, ctx: &mut GpuContext) {
        self.execute(ctx, None);
    }

    /// Run the pass with one instanced draw per mesh. Per-instance attributes
    /// must already be configured on the meshes.
    pub fn render_instanced(&mut self, ctx: &mut GpuContext, instances: u32) {
        self.execute(ctx, Some(instances));
    }

    fn execute(&mut self, ctx: &mut GpuContext, instances: Option<u32>) {
        log::trace!(
            "Render pass '{}': {} renderables, instances {:?}",
            self.label,
            self.renderables.len(),
            instances
        );

        ctx.bind_framebuffer(self.target.map(FrameBuffer::handle));
        let viewport = self.viewport.unwrap_or_else(|| match self.target {
            Some(target) => target.viewport(),
            None => ctx.window_viewport(),
        });
        ctx.set_viewport(viewport);

        for flags in &self.clear_bits {
            ctx.clear(*flags, self.clear_color, self.clear_depth);
        }

        self.states.apply(ctx);

        match &self.textures {
            Some(bindings) => self.program.use_with(ctx, bindings),
            None => self.program.use_program(ctx),
        }

        if let Some(hook) = self.pre_render.as_mut() {
            hook(ctx);
        }

        for mesh in &self.renderables {
            for (name, value) in &self.uniforms {
                self.program.update(ctx, name, value.clone());
            }
            if let Some(callback) = self.per_renderable.as_mut() {
                callback(ctx, mesh);
            }
            match instances {
                Some(count) => mesh.draw_instanced(ctx, count),
                None => mesh.draw(ctx),
            }
        }

        if let Some(hook) = self.post_render.as_mut() {
            hook(ctx);
        }

        self.states.restore(ctx);
    }
}
