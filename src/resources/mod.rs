//! Resource management
//!
//! Render targets, textures uploaded from host memory, and meshes.

mod frame_buffer;
pub mod mesh;
mod texture;

pub use frame_buffer::*;
pub use mesh::{Mesh, MeshData};
pub use texture::*;
