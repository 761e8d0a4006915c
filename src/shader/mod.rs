//! Shader composition, reflection and programs.
//!
//! - [`ShaderComposer`] loads stage sources from a shader root, resolving
//!   `#include` and injecting `#version` and `#define`s
//! - [`ShaderProgram`] compiles and links stages, reflects active uniforms,
//!   inputs and outputs into name-keyed maps, uploads typed uniform values
//!   and binds textures to automatically assigned units on use
//! - [`TextureBindings`] is an explicit sampler to texture set that can be
//!   applied instead of a program's registered textures
//!
//! # Example
//!
//! ```ignore
//! let composer = ShaderComposer::new("shaders").with_version("#version 330 core");
//! let mut gbuffer = ShaderProgram::from_files(&mut ctx, &composer, &["gbuffer.vert", "gbuffer.frag"]);
//!
//! gbuffer
//!     .update(&mut ctx, "u_view", view)
//!     .update(&mut ctx, "u_projection", projection);
//! gbuffer.bind_texture_on_use("u_albedo", albedo);
//! gbuffer.use_program(&mut ctx);
//! ```

pub mod bindings;
pub mod composer;
pub mod glsl;
pub mod program;

pub use bindings::TextureBindings;
pub use composer::{ShaderComposer, ShaderDef, ShaderSource};
pub use program::{InterfaceMap, InterfaceVariable, ShaderProgram};
