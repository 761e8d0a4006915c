//! Ordered pass execution.

use crate::context::GpuContext;
use crate::pass::RenderPass;

/// Passes run strictly in insertion order, each completing before the next
/// starts. Reordering passes that read a target another pass writes is the
/// caller's responsibility.
#[derive(Debug, Default)]
pub struct PassSequence<'a> {
    passes: Vec<RenderPass<'a>>,
}

impl<'a> PassSequence<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pass: RenderPass<'a>) -> &mut Self {
        self.passes.push(pass);
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Look up a pass by label, e.g. to change its renderables between frames.
    pub fn pass_mut(&mut self, label: &str) -> Option<&mut RenderPass<'a>> {
        self.passes.iter_mut().find(|pass| pass.label() == label)
    }

    pub fn passes(&self) -> &[RenderPass<'a>] {
        &self.passes
    }

    /// Execute one frame's worth of passes.
    pub fn render(&mut self, ctx: &mut GpuContext) {
        log::trace!("Executing {} passes", self.passes.len());
        for pass in &mut self.passes {
            pass.render(ctx);
        }
    }
}
