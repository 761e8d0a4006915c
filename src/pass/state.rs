//! Capability toggles applied and reverted around a pass.

use crate::backend::Capability;
use crate::context::GpuContext;

/// Capabilities a pass forces on or off, with the value each had before the
/// pass touched it.
///
/// Snapshots are parallel to the lists: entry `i` of a snapshot belongs to
/// entry `i` of its list. Restoring walks the disable list and then the
/// enable list backwards, undoing the most recent change first, so a
/// capability present several times in either list ends at its pre-pass
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateToggles {
    enable: Vec<Capability>,
    enable_snapshot: Vec<bool>,
    disable: Vec<Capability>,
    disable_snapshot: Vec<bool>,
}

impl StateToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_enable(&mut self, capability: Capability) {
        self.enable.push(capability);
        self.enable_snapshot.push(false);
    }

    pub fn add_disable(&mut self, capability: Capability) {
        self.disable.push(capability);
        self.disable_snapshot.push(false);
    }

    pub fn enabled(&self) -> &[Capability] {
        &self.enable
    }

    pub fn disabled(&self) -> &[Capability] {
        &self.disable
    }

    pub fn is_empty(&self) -> bool {
        self.enable.is_empty() && self.disable.is_empty()
    }

    /// Snapshot and force every listed capability.
    pub fn apply(&mut self, ctx: &mut GpuContext) {
        for (capability, snapshot) in self.enable.iter().zip(self.enable_snapshot.iter_mut()) {
            *snapshot = ctx.is_enabled(*capability);
            ctx.enable(*capability);
        }
        for (capability, snapshot) in self.disable.iter().zip(self.disable_snapshot.iter_mut()) {
            *snapshot = ctx.is_enabled(*capability);
            ctx.disable(*capability);
        }
    }

    /// Put every listed capability back to its snapshot.
    pub fn restore(&self, ctx: &mut GpuContext) {
        for (capability, snapshot) in self.disable.iter().zip(&self.disable_snapshot).rev() {
            ctx.set_capability(*capability, *snapshot);
        }
        for (capability, snapshot) in self.enable.iter().zip(&self.enable_snapshot).rev() {
            ctx.set_capability(*capability, *snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;

    #[test]
    fn test_capability_in_both_lists_returns_to_original() {
        let mut ctx = GpuContext::new(DummyBackend::default());
        let mut toggles = StateToggles::new();
        toggles.add_enable(Capability::Blend);
        toggles.add_disable(Capability::Blend);

        toggles.apply(&mut ctx);
        assert!(!ctx.is_enabled(Capability::Blend));
        toggles.restore(&mut ctx);
        assert!(!ctx.is_enabled(Capability::Blend));
    }

    #[test]
    fn test_duplicate_enable_entries() {
        let mut ctx = GpuContext::new(DummyBackend::default());
        ctx.disable(Capability::Multisample);

        let mut toggles = StateToggles::new();
        toggles.add_enable(Capability::Multisample);
        toggles.add_enable(Capability::Multisample);
        toggles.apply(&mut ctx);
        toggles.restore(&mut ctx);

        assert!(!ctx.is_enabled(Capability::Multisample));
    }
}
