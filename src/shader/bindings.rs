//! Sampler to texture binding sets.

use std::collections::BTreeMap;

use crate::backend::TextureHandle;

/// Textures sampled by a program, keyed by sampler uniform name.
///
/// Units are not part of the value: they are assigned sequentially, in
/// sampler-name order, when the set is applied to a program. Inserting a
/// sampler twice keeps the last texture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureBindings {
    entries: BTreeMap<String, TextureHandle>,
}

impl TextureBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`TextureBindings::insert`].
    pub fn with(mut self, sampler: &str, texture: TextureHandle) -> Self {
        self.insert(sampler, texture);
        self
    }

    /// Returns the texture previously registered for `sampler`.
    pub fn insert(&mut self, sampler: &str, texture: TextureHandle) -> Option<TextureHandle> {
        self.entries.insert(sampler.to_string(), texture)
    }

    pub fn remove(&mut self, sampler: &str) -> Option<TextureHandle> {
        self.entries.remove(sampler)
    }

    pub fn get(&self, sampler: &str) -> Option<TextureHandle> {
        self.entries.get(sampler).copied()
    }

    /// Pairs in unit-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TextureHandle)> {
        self.entries.iter().map(|(name, texture)| (name.as_str(), *texture))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
