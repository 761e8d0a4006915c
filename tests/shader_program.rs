//! Shader program integration tests.
//!
//! Cover construction and stage validation, reflection of uniforms, inputs
//! and outputs, typed uniform uploads and bind-on-use texture units.

mod common;

use std::path::PathBuf;

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use rstest::rstest;

use common::{dummy, dummy_mut, program, Backend, FRAGMENT_ALL_TYPES, FRAGMENT_BROKEN, VERTEX};
use glpass::backend::{BackendError, GlCall, GlslType};
use glpass::context::Slot;
use glpass::{
    ShaderComposer, ShaderError, ShaderProgram, ShaderSource, ShaderStage, Texture, TextureData,
    UniformValue,
};

/// Directory under the system temp dir holding `files`.
fn shader_dir(test: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("glpass-{}-{}", test, std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create shader directory");
    for (name, source) in files {
        std::fs::write(dir.join(name), source).expect("Failed to write shader file");
    }
    dir
}

const GEOMETRY: &str = r#"
#version 330 core
layout(triangles) in;
layout(triangle_strip, max_vertices = 3) out;

void main() {
    for (int i = 0; i < 3; i++) {
        gl_Position = gl_in[i].gl_Position;
        EmitVertex();
    }
    EndPrimitive();
}
"#;

// ============================================================================
// Construction
// ============================================================================

#[rstest]
#[case::dummy(Backend::Dummy)]
fn test_reflects_interface(#[case] backend: Backend) {
    let Some(mut ctx) = backend.create_context(64, 64) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);

    assert_eq!(program.stages(), &[ShaderStage::Vertex, ShaderStage::Fragment]);
    assert_eq!(program.uniform("u_model").unwrap().ty, GlslType::Mat4);
    assert_eq!(program.uniform("u_albedo").unwrap().ty, GlslType::Sampler2D);
    assert_eq!(program.uniform("u_lights").unwrap().array_len, 4);
    assert_eq!(program.uniform("u_weight").unwrap().ty, GlslType::Double);
    assert_eq!(program.uniform("u_pts").unwrap().ty, GlslType::Vec2);
    assert_eq!(program.uniform("u_pts").unwrap().array_len, 3);
    assert_eq!(program.uniform("u_dirs").unwrap().array_len, 2);
    assert!(program.uniform("u_missing").is_none());

    assert_eq!(program.input("a_position").unwrap().location, 0);
    assert_eq!(program.input("a_uv").unwrap().location, 2);
    assert_eq!(program.inputs().len(), 3);

    assert_eq!(program.outputs().len(), 1);
    assert_eq!(program.buffer("fragColor"), Some(0));
    assert_eq!(program.buffer("missing"), None);
}

#[rstest]
#[case::dummy(Backend::Dummy)]
#[should_panic(expected = "failed to build")]
fn test_compile_failure_panics(#[case] backend: Backend) {
    let Some(mut ctx) = backend.create_context(64, 64) else {
        panic!("Backend {:?} not available: failed to build", backend);
    };
    program(&mut ctx, "broken", FRAGMENT_BROKEN);
}

#[rstest]
#[case::dummy(Backend::Dummy)]
fn test_compile_failure_is_reported(#[case] backend: Backend) {
    let Some(mut ctx) = backend.create_context(64, 64) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let result = ShaderProgram::compile(
        &mut ctx,
        "broken",
        &[
            ShaderSource::vertex(VERTEX),
            ShaderSource::fragment(FRAGMENT_BROKEN),
        ],
    );

    match result {
        Err(ShaderError::Backend(BackendError::ShaderCompilationFailed { stage, log })) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("expected a compilation failure, got {:?}", other),
    }
    // The vertex stage compiled before the failure is released
    assert_eq!(dummy(&ctx).live_objects(), 0);
}

#[rstest]
#[case::vertex_only(vec![ShaderStage::Vertex])]
#[case::missing_evaluation(vec![ShaderStage::Vertex, ShaderStage::TessControl, ShaderStage::Fragment])]
#[case::duplicate_vertex(vec![ShaderStage::Vertex, ShaderStage::Vertex, ShaderStage::Fragment])]
fn test_invalid_stage_sets(#[case] stages: Vec<ShaderStage>) {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let sources: Vec<_> = stages
        .iter()
        .map(|stage| ShaderSource::new(*stage, "void main() {}"))
        .collect();

    let result = ShaderProgram::compile(&mut ctx, "invalid", &sources);

    assert!(matches!(result, Err(ShaderError::InvalidStages(_))));
    assert_eq!(dummy(&ctx).live_objects(), 0);
}

#[test]
fn test_from_files_infers_stages() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let dir = shader_dir(
        "stages",
        &[
            ("scene.vert", VERTEX),
            ("scene.frag", common::FRAGMENT_CONSTANT),
            ("scene.geom", GEOMETRY),
        ],
    );
    let composer = ShaderComposer::new(&dir);

    let two = ShaderProgram::from_files(&mut ctx, &composer, &["scene.vert", "scene.frag"]);
    assert_eq!(two.stages(), &[ShaderStage::Vertex, ShaderStage::Fragment]);
    assert_eq!(two.label(), "scene.vert+scene.frag");

    let three = ShaderProgram::from_files(
        &mut ctx,
        &composer,
        &["scene.vert", "scene.frag", "scene.geom"],
    );
    assert_eq!(
        three.stages(),
        &[ShaderStage::Vertex, ShaderStage::Fragment, ShaderStage::Geometry]
    );

    let one = ShaderProgram::try_from_files(&mut ctx, &composer, &["scene.vert"]);
    assert!(matches!(one, Err(ShaderError::StageCount(1))));

    let missing = ShaderProgram::try_from_files(&mut ctx, &composer, &["scene.vert", "nope.frag"]);
    assert!(matches!(missing, Err(ShaderError::SourceUnreadable { .. })));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_from_files_resolves_includes() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let fragment = r#"
#version 330 core
#include "outputs.glsl"
void main() {
    fragColor = u_color;
}
"#;
    let dir = shader_dir(
        "includes",
        &[
            ("lit.vert", VERTEX),
            ("lit.frag", fragment),
            (
                "outputs.glsl",
                "uniform vec4 u_color;\nlayout(location = 0) out vec4 fragColor;\n",
            ),
        ],
    );
    let composer = ShaderComposer::new(&dir);

    let program = ShaderProgram::from_files(&mut ctx, &composer, &["lit.vert", "lit.frag"]);

    assert!(program.uniform("u_color").is_some());
    assert_eq!(program.buffer("fragColor"), Some(0));
    std::fs::remove_dir_all(dir).ok();
}

// ============================================================================
// Uniform Updates
// ============================================================================

#[rstest]
#[case::bool("u_flag", UniformValue::Bool(true))]
#[case::int("u_count", UniformValue::Int(-3))]
#[case::float("u_scale", UniformValue::Float(0.5))]
#[case::double("u_weight", UniformValue::Double(0.125))]
#[case::vec2("u_offset", UniformValue::Vec2(Vec2::new(1.0, 2.0)))]
#[case::vec3("u_tint", UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0)))]
#[case::vec4("u_color", UniformValue::Vec4(Vec4::new(1.0, 2.0, 3.0, 4.0)))]
#[case::ivec2("u_cell", UniformValue::IVec2(IVec2::new(4, 5)))]
#[case::ivec3("u_cell3", UniformValue::IVec3(IVec3::new(4, 5, 6)))]
#[case::ivec4("u_cell4", UniformValue::IVec4(IVec4::new(4, 5, 6, 7)))]
#[case::mat2("u_rot", UniformValue::Mat2(Mat2::from_angle(0.5)))]
#[case::mat3("u_basis", UniformValue::Mat3(Mat3::from_diagonal(Vec3::new(1.0, 2.0, 3.0))))]
#[case::mat4("u_model", UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 0.0, -2.0))))]
#[case::vec2_array(
    "u_pts",
    UniformValue::Vec2Array(vec![Vec2::X, Vec2::Y, Vec2::new(0.5, -0.5)])
)]
#[case::vec3_array("u_dirs", UniformValue::Vec3Array(vec![Vec3::Z, Vec3::NEG_Y]))]
#[case::vec4_array(
    "u_lights",
    UniformValue::Vec4Array(vec![Vec4::ONE, Vec4::ZERO, Vec4::X])
)]
fn test_uniform_reaches_program(#[case] name: &str, #[case] value: UniformValue) {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);

    program.update(&mut ctx, name, value.clone());

    assert_eq!(
        dummy(&ctx).uniform_value(program.handle(), name),
        Some(value)
    );
}

#[test]
fn test_update_makes_program_current() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);
    assert_eq!(ctx.state().program(), Slot::Known(None));

    program
        .update(&mut ctx, "u_scale", 2.0f32)
        .update(&mut ctx, "u_count", 7);

    assert_eq!(ctx.state().program(), Slot::Known(Some(program.handle())));
    let uses = dummy(&ctx).count_calls(|c| matches!(c, GlCall::UseProgram(_)));
    assert_eq!(uses, 1);
}

#[test]
fn test_unknown_uniform_is_ignored() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);
    dummy_mut(&mut ctx).clear_calls();

    program.update(&mut ctx, "u_missing", Vec4::ONE);

    assert!(dummy(&ctx).calls().is_empty());
    assert_eq!(ctx.state().program(), Slot::Known(None));

    let err = program
        .try_update(&mut ctx, "u_missing", Vec4::ONE)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "uniform 'u_missing' does not exist in program 'all_types'"
    );
}

#[test]
fn test_last_write_wins() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);

    program.update(&mut ctx, "u_color", Vec4::X);
    program.update(&mut ctx, "u_color", Vec4::Y);

    assert_eq!(
        dummy(&ctx).uniform_value(program.handle(), "u_color"),
        Some(UniformValue::Vec4(Vec4::Y))
    );
}

#[test]
fn test_mismatched_kind_is_still_uploaded() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);

    program.update(&mut ctx, "u_scale", Vec3::ONE);

    assert_eq!(
        dummy(&ctx).uniform_value(program.handle(), "u_scale"),
        Some(UniformValue::Vec3(Vec3::ONE))
    );
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn test_textures_take_sequential_units() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let mut program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);
    let albedo = Texture::create(&mut ctx, &TextureData::white()).unwrap();
    let normals = Texture::create(&mut ctx, &TextureData::black()).unwrap();

    program
        .bind_texture_on_use("u_normal_map", normals.handle)
        .bind_texture_on_use("u_albedo", albedo.handle);
    program.use_program(&mut ctx);

    let backend = dummy(&ctx);
    assert_eq!(
        backend.uniform_value(program.handle(), "u_albedo"),
        Some(UniformValue::Int(0))
    );
    assert_eq!(
        backend.uniform_value(program.handle(), "u_normal_map"),
        Some(UniformValue::Int(1))
    );
    assert_eq!(ctx.state().texture(0), Slot::Known(Some(albedo.handle)));
    assert_eq!(ctx.state().texture(1), Slot::Known(Some(normals.handle)));
    assert_eq!(ctx.state().program(), Slot::Known(Some(program.handle())));
}

#[test]
fn test_rebinding_sampler_replaces_texture() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let mut program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);
    let first = Texture::create(&mut ctx, &TextureData::white()).unwrap();
    let second = Texture::create(&mut ctx, &TextureData::black()).unwrap();

    program.bind_texture_on_use("u_albedo", first.handle);
    program.bind_texture_on_use("u_albedo", second.handle);
    program.use_program(&mut ctx);

    assert_eq!(program.texture_bindings().len(), 1);
    assert_eq!(program.texture("u_albedo"), Some(second.handle));
    assert_eq!(program.texture("u_normal_map"), None);
    assert_eq!(ctx.state().texture(0), Slot::Known(Some(second.handle)));
}

#[test]
fn test_destroy_releases_objects() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "all_types", FRAGMENT_ALL_TYPES);
    program.use_program(&mut ctx);

    program.destroy(&mut ctx);

    assert_eq!(dummy(&ctx).live_objects(), 0);
    assert_eq!(ctx.state().program(), Slot::Known(None));
}
