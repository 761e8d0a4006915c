//! Common utilities for integration tests.
//!
//! Provides the backend enumeration used to parameterize tests, context
//! construction and the GLSL sources shared by the test files.

#![allow(dead_code)]

use glpass::{
    ContextConfig, DummyBackend, FrameBuffer, GpuContext, ShaderProgram, ShaderSource,
};

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Available backends for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Dummy backend (simulated driver, always available).
    Dummy,
    /// OpenGL through glow. Needs a current context, which the test harness
    /// does not create.
    Gl,
}

impl Backend {
    /// Check if this backend is currently available.
    pub fn is_available(&self) -> bool {
        match self {
            Backend::Dummy => true,
            Backend::Gl => false,
        }
    }

    /// Get the backend name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Dummy => "dummy",
            Backend::Gl => "gl",
        }
    }

    /// Create a context with a `width` x `height` window.
    ///
    /// Returns `None` if the backend is not available.
    pub fn create_context(self, width: u32, height: u32) -> Option<GpuContext> {
        init_logging();
        if !self.is_available() {
            return None;
        }
        let config = ContextConfig {
            window_width: width,
            window_height: height,
            ..Default::default()
        };
        match self {
            Backend::Dummy => Some(GpuContext::with_config(
                DummyBackend::new(width, height),
                config,
            )),
            Backend::Gl => None,
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The dummy driver behind a context.
pub fn dummy(ctx: &GpuContext) -> &DummyBackend {
    ctx.backend_as::<DummyBackend>()
        .expect("test context is not backed by the dummy driver")
}

pub fn dummy_mut(ctx: &mut GpuContext) -> &mut DummyBackend {
    ctx.backend_as_mut::<DummyBackend>()
        .expect("test context is not backed by the dummy driver")
}

// ============================================================================
// Shader Sources
// ============================================================================

pub const VERTEX: &str = r#"
#version 330 core
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

uniform mat4 u_model;
uniform mat4 u_view_proj;

out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
}
"#;

/// Writes a constant color to its only output.
pub const FRAGMENT_CONSTANT: &str = r#"
#version 330 core
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(0.25, 0.5, 0.75, 1.0);
}
"#;

/// Writes the `u_color` uniform to its only output.
pub const FRAGMENT_UNIFORM: &str = r#"
#version 330 core
uniform vec4 u_color;
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = u_color;
}
"#;

/// Geometry buffer outputs at locations 0, 2 and 3.
pub const FRAGMENT_GBUFFER: &str = r#"
#version 330 core
in vec2 v_uv;

layout(location = 0) out vec4 albedo;
layout(location = 2) out vec4 normal;
layout(location = 3) out vec4 position;

void main() {
    albedo = vec4(1.0, 0.0, 0.0, 1.0);
    normal = vec4(0.0, 0.0, 1.0, 0.0);
    position = vec4(2.0);
}
"#;

/// One uniform of every uploadable kind plus two samplers.
pub const FRAGMENT_ALL_TYPES: &str = r#"
#version 330 core
#extension GL_ARB_gpu_shader_fp64 : enable
uniform bool u_flag;
uniform int u_count;
uniform float u_scale;
uniform vec2 u_offset;
uniform vec3 u_tint;
uniform vec4 u_color;
uniform ivec2 u_cell;
uniform ivec3 u_cell3;
uniform ivec4 u_cell4;
uniform mat2 u_rot;
uniform mat3 u_basis;
uniform double u_weight;
uniform vec2 u_pts[3];
uniform vec3 u_dirs[2];
uniform vec4 u_lights[4];
uniform sampler2D u_albedo;
uniform sampler2D u_normal_map;

in vec2 v_uv;
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = u_color;
}
"#;

/// Missing `main`, rejected by every driver.
pub const FRAGMENT_BROKEN: &str = r#"
#version 330 core
layout(location = 0) out vec4 fragColor;
void mian() { fragColor = vec4(1.0); }
"#;

pub fn program(ctx: &mut GpuContext, label: &str, fragment: &str) -> ShaderProgram {
    ShaderProgram::new(
        ctx,
        label,
        &[ShaderSource::vertex(VERTEX), ShaderSource::fragment(fragment)],
    )
}

pub fn target_for(ctx: &mut GpuContext, program: &ShaderProgram, size: u32) -> FrameBuffer {
    FrameBuffer::for_program(ctx, program, size, size, &Default::default())
        .expect("Failed to create framebuffer")
}
