//! glpass - multi-pass OpenGL rendering with a redundant-state filter
//!
//! The crate wraps four GL object kinds behind small owned types and routes
//! every binding through one cache so that repeated binds cost nothing:
//! - [`ShaderProgram`]: compiles and links stages, reflects uniforms, inputs
//!   and fragment outputs, and uploads typed uniform values by name
//! - [`FrameBuffer`]: offscreen target with float color attachments and a
//!   depth texture, built by hand or from a program's outputs
//! - [`Mesh`]: vertex array plus buffers, drawn plain or instanced
//! - [`RenderPass`]: binds a target and a program, clears, toggles
//!   capabilities, draws its meshes and restores what it toggled
//!
//! All of them go through a [`GpuContext`], which owns the driver backend and
//! the [`context::StateCache`].
//!
//! # Backends
//! - **glow**: real OpenGL 3.3+ through the `glow` crate (feature
//!   `glow-backend`, native only)
//! - **Dummy**: software stand-in that records calls and simulates simple
//!   fragment outputs, used for tests and headless runs

pub mod backend;
pub mod context;
pub mod error;
pub mod pass;
pub mod resources;
pub mod shader;

pub use backend::{
    Capability, ClearFlags, DummyBackend, GlBackend, GlslType, PrimitiveKind, ShaderStage,
    UniformValue, Viewport,
};
#[cfg(all(feature = "glow-backend", not(target_arch = "wasm32")))]
pub use backend::GlowBackend;
pub use context::{ContextConfig, GpuContext};
pub use error::{FrameBufferError, ShaderError};
pub use pass::{PassSequence, RenderPass, StateToggles};
pub use resources::{AttachmentFormat, FrameBuffer, Mesh, MeshData, Texture, TextureData};
pub use shader::{ShaderComposer, ShaderProgram, ShaderSource, TextureBindings};
