//! Backend abstraction layer
//!
//! Provides the driver trait plus a recording dummy backend and, on native
//! targets, an OpenGL backend built on `glow`.

pub mod dummy;
pub mod traits;
pub mod types;

#[cfg(all(feature = "glow-backend", not(target_arch = "wasm32")))]
pub mod glow_backend;

pub use dummy::{DummyBackend, GlCall};
pub use traits::*;
pub use types::*;

#[cfg(all(feature = "glow-backend", not(target_arch = "wasm32")))]
pub use glow_backend::GlowBackend;
