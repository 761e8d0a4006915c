//! Error types for shader programs and render targets.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::{BackendError, ShaderStage};

/// Errors building or driving a [`ShaderProgram`](crate::shader::ShaderProgram)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    #[error("invalid stage combination {0:?}; expected vertex+fragment, optionally with geometry or both tessellation stages")]
    InvalidStages(Vec<ShaderStage>),
    #[error("expected 2 to 4 stage files, got {0}")]
    StageCount(usize),
    #[error("failed to read shader source {path}: {message}")]
    SourceUnreadable { path: PathBuf, message: String },
    #[error("include not found: \"{0}\"")]
    IncludeNotFound(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("uniform '{name}' does not exist in program '{program}'")]
    UnknownUniform { program: String, name: String },
}

/// Errors building a [`FrameBuffer`](crate::resources::FrameBuffer)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameBufferError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("framebuffer is incomplete: {0}")]
    Incomplete(String),
    #[error("cannot add {requested} color attachments to {existing}; the device supports {max}")]
    TooManyColorAttachments { requested: u32, existing: u32, max: u32 },
}
