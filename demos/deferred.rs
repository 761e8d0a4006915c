//! # Deferred Shading Demo
//!
//! Demonstrates:
//! - Geometry pass writing three G-buffer outputs into a reflected target
//! - Per-renderable callback uploading each mesh's model matrix
//! - Lighting pass sampling the G-buffer through texture bindings
//! - Pass sequence executed for several frames with state restoration
//!
//! Runs headless on the dummy driver and logs the shaded result. Run with
//! `RUST_LOG=debug cargo run --example deferred` to see every pass.

use std::cell::Cell;

use glam::{Mat4, Vec3, Vec4};
use glpass::resources::mesh::{cube, quad, sphere};
use glpass::{
    AttachmentFormat, Capability, ClearFlags, DummyBackend, FrameBuffer, GlBackend, GpuContext,
    Mesh, PassSequence, RenderPass, ShaderComposer, ShaderProgram, ShaderSource, ShaderStage,
    TextureBindings,
};

const GEOMETRY_VERTEX: &str = r#"#version 330 core
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

uniform mat4 u_model;
uniform mat4 u_view_proj;

out vec3 v_normal;
out vec3 v_world;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_proj * world;
}
"#;

const GEOMETRY_FRAGMENT: &str = r#"#version 330 core
in vec3 v_normal;
in vec3 v_world;

layout(location = 0) out vec4 albedo;
layout(location = 1) out vec4 normal;
layout(location = 2) out vec4 position;

void main() {
    albedo = vec4(0.8, 0.6, 0.4, 1.0);
    normal = vec4(normalize(v_normal), 0.0);
    position = vec4(v_world, 1.0);
}
"#;

const LIGHTING_VERTEX: &str = r#"#version 330 core
layout(location = 0) in vec3 a_position;
layout(location = 2) in vec2 a_uv;
out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_position, 1.0);
}
"#;

const LIGHTING_FRAGMENT: &str = r#"#version 330 core
uniform sampler2D u_albedo;
uniform sampler2D u_normal;
uniform sampler2D u_position;
uniform vec4 u_lights[LIGHT_COUNT];
uniform vec4 u_ambient;

in vec2 v_uv;
layout(location = 0) out vec4 shaded;

void main() {
    vec3 base = texture(u_albedo, v_uv).rgb;
    vec3 color = base * u_ambient.rgb;
    for (int i = 0; i < LIGHT_COUNT; i++) {
        color += base * u_lights[i].rgb * u_lights[i].a;
    }
    shaded = u_ambient;
}
"#;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const LIGHT_COUNT: i32 = 4;

fn main() {
    env_logger::init();

    let mut ctx = GpuContext::new(DummyBackend::new(WIDTH, HEIGHT));
    log::info!("Backend: {}", ctx.backend().name());

    let mut composer = ShaderComposer::default().with_version("#version 330 core");
    composer.define("LIGHT_COUNT", LIGHT_COUNT);
    let compose = |source: &str, stage: ShaderStage| {
        composer
            .compose(source, stage)
            .map(|text| ShaderSource::new(stage, text))
    };

    let geometry = ShaderProgram::new(
        &mut ctx,
        "geometry",
        &[
            ShaderSource::vertex(GEOMETRY_VERTEX),
            ShaderSource::fragment(GEOMETRY_FRAGMENT),
        ],
    );
    let lighting_sources = [
        compose(LIGHTING_VERTEX, ShaderStage::Vertex),
        compose(LIGHTING_FRAGMENT, ShaderStage::Fragment),
    ];
    let lighting_sources = match lighting_sources
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(sources) => sources,
        Err(e) => {
            log::error!("Failed to compose lighting shaders: {}", e);
            return;
        }
    };
    let lighting = ShaderProgram::new(&mut ctx, "lighting", &lighting_sources);
    log::info!(
        "Lighting program reflects {} lights",
        lighting.uniform("u_lights").map_or(0, |u| u.array_len)
    );

    let gbuffer = match FrameBuffer::for_program(
        &mut ctx,
        &geometry,
        WIDTH,
        HEIGHT,
        &AttachmentFormat::default(),
    ) {
        Ok(target) => target,
        Err(e) => {
            log::error!("Failed to create G-buffer: {}", e);
            return;
        }
    };
    let output = match FrameBuffer::for_program(
        &mut ctx,
        &lighting,
        WIDTH,
        HEIGHT,
        &AttachmentFormat::ldr(),
    ) {
        Ok(target) => target,
        Err(e) => {
            log::error!("Failed to create output target: {}", e);
            return;
        }
    };

    let meshes: Vec<Mesh> = [cube(), sphere(24, 12)]
        .iter()
        .filter_map(|data| Mesh::upload(&mut ctx, data).ok())
        .collect();
    let Ok(screen) = Mesh::upload(&mut ctx, &quad()) else {
        log::error!("Failed to upload fullscreen quad");
        return;
    };

    let mut bindings = TextureBindings::new();
    for (sampler, buffer) in [
        ("u_albedo", "albedo"),
        ("u_normal", "normal"),
        ("u_position", "position"),
    ] {
        if let Some(texture) = gbuffer.buffer(buffer) {
            bindings.insert(sampler, texture);
        }
    }

    let aspect = WIDTH as f32 / HEIGHT as f32;
    let view_proj = Mat4::perspective_rh_gl(60f32.to_radians(), aspect, 0.1, 100.0)
        * Mat4::look_at_rh(Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO, Vec3::Y);
    let time = Cell::new(0.0f32);

    let mut geometry_pass = RenderPass::new("geometry", &geometry).with_target(&gbuffer);
    geometry_pass
        .add_clear_bits(ClearFlags::COLOR | ClearFlags::DEPTH)
        .add_enable(Capability::DepthTest)
        .add_enable(Capability::CullFace)
        .add_disable(Capability::Blend)
        .set_uniform("u_view_proj", view_proj);
    for mesh in &meshes {
        geometry_pass.add_renderable(mesh);
    }
    geometry_pass.set_per_renderable(|ctx: &mut GpuContext, mesh: &Mesh| {
        let offset = if mesh.name == "cube" { -1.5 } else { 1.5 };
        let model = Mat4::from_translation(Vec3::new(offset, 0.0, 0.0))
            * Mat4::from_rotation_y(time.get());
        geometry.update(ctx, "u_model", model);
    });

    let lights = vec![
        Vec4::new(1.0, 0.9, 0.8, 1.0),
        Vec4::new(0.2, 0.3, 1.0, 0.5),
        Vec4::new(1.0, 0.2, 0.2, 0.25),
        Vec4::ZERO,
    ];
    let mut lighting_pass = RenderPass::new("lighting", &lighting).with_target(&output);
    lighting_pass
        .add_clear_bits(ClearFlags::COLOR)
        .add_disable(Capability::DepthTest)
        .set_texture_bindings(bindings)
        .set_uniform("u_lights", lights)
        .add_renderable(&screen);

    let mut frame = PassSequence::new();
    frame.push(geometry_pass).push(lighting_pass);

    for index in 0..3 {
        time.set(index as f32 * 0.5);
        let ambient = Vec4::new(0.1, 0.1, 0.1 + index as f32 * 0.1, 1.0);
        if let Some(pass) = frame.pass_mut("lighting") {
            pass.set_uniform("u_ambient", ambient);
        }
        frame.render(&mut ctx);

        let center = output.read_buffer(&mut ctx, "shaded", WIDTH as i32 / 2, HEIGHT as i32 / 2);
        let albedo = gbuffer.read_buffer(&mut ctx, "albedo", 0, 0);
        log::info!(
            "Frame {}: shaded {:?}, albedo {:?}, depth test {}",
            index,
            center,
            albedo,
            ctx.is_enabled(Capability::DepthTest)
        );
    }

    if let Some(backend) = ctx.backend_as::<DummyBackend>() {
        log::info!("{} driver calls issued", backend.calls().len());
    }
}
