//! State cache integration tests.
//!
//! Bindings made through the context reach the driver once per change; the
//! cache can be invalidated or resynchronised after foreign driver access.

mod common;

use rstest::rstest;

use common::{dummy, dummy_mut, program, Backend, FRAGMENT_CONSTANT};
use glpass::backend::{FramebufferTarget, GlCall};
use glpass::context::Slot;
use glpass::{
    Capability, ContextConfig, DummyBackend, FrameBuffer, GlBackend, GpuContext, Texture,
    TextureData, Viewport,
};

#[rstest]
#[case::dummy(Backend::Dummy)]
fn test_repeated_binds_reach_driver_once(#[case] backend: Backend) {
    let Some(mut ctx) = backend.create_context(64, 64) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };
    let program = program(&mut ctx, "constant", FRAGMENT_CONSTANT);
    dummy_mut(&mut ctx).clear_calls();

    assert!(ctx.use_program(Some(program.handle())));
    assert!(!ctx.use_program(Some(program.handle())));
    assert!(ctx.set_viewport(Viewport::from_size(32, 32)));
    assert!(!ctx.set_viewport(Viewport::from_size(32, 32)));
    assert!(ctx.enable(Capability::Blend));
    assert!(!ctx.enable(Capability::Blend));

    let backend = dummy(&ctx);
    assert_eq!(backend.count_calls(|c| matches!(c, GlCall::UseProgram(_))), 1);
    assert_eq!(backend.count_calls(|c| matches!(c, GlCall::Viewport(_))), 1);
    assert_eq!(backend.count_calls(|c| matches!(c, GlCall::Enable(_))), 1);
}

#[test]
fn test_unit_switch_only_when_needed() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let a = Texture::create(&mut ctx, &TextureData::white()).unwrap();
    let b = Texture::create(&mut ctx, &TextureData::black()).unwrap();
    dummy_mut(&mut ctx).clear_calls();

    ctx.bind_texture(3, Some(a.handle));
    ctx.bind_texture(3, Some(b.handle));
    ctx.bind_texture(3, Some(b.handle));

    let backend = dummy(&ctx);
    assert_eq!(backend.calls(), &[
        GlCall::ActiveTexture(3),
        GlCall::BindTexture(Some(a.handle)),
        GlCall::BindTexture(Some(b.handle)),
    ]);
    assert_eq!(ctx.state().active_unit(), Slot::Known(3));
}

#[test]
fn test_created_texture_is_cached_on_active_unit() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();

    let texture = Texture::create(&mut ctx, &TextureData::white()).unwrap();

    assert_eq!(ctx.state().texture(0), Slot::Known(Some(texture.handle)));
    dummy_mut(&mut ctx).clear_calls();
    assert!(!ctx.bind_texture(0, Some(texture.handle)));
}

#[test]
fn test_deleted_objects_leave_cache() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let texture = Texture::create(&mut ctx, &TextureData::white()).unwrap();
    let handle = texture.handle;
    let target = FrameBuffer::new(&mut ctx, 4, 4, &Default::default()).unwrap();
    target.bind(&mut ctx);

    texture.destroy(&mut ctx);
    let framebuffer = target.handle();
    target.destroy(&mut ctx);

    assert_eq!(ctx.state().texture(0), Slot::Known(None));
    assert_eq!(ctx.state().framebuffer(FramebufferTarget::Draw), Slot::Known(None));
    assert_eq!(ctx.state().framebuffer(FramebufferTarget::Read), Slot::Known(None));
    // A recycled name must be bound again
    assert!(ctx.bind_texture(0, Some(handle)));
    assert!(ctx.bind_framebuffer(Some(framebuffer)));
}

#[test]
fn test_invalidate_forces_next_bind() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "constant", FRAGMENT_CONSTANT);
    ctx.use_program(Some(program.handle()));
    ctx.set_viewport(Viewport::from_size(10, 10));

    ctx.invalidate();

    assert_eq!(ctx.state().program(), Slot::Unknown);
    assert_eq!(ctx.state().viewport(), Slot::Unknown);
    assert_eq!(ctx.state().texture(5), Slot::Unknown);
    assert!(ctx.use_program(Some(program.handle())));
    assert!(ctx.set_viewport(Viewport::from_size(10, 10)));
}

#[test]
fn test_invalidated_capability_is_queried() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    ctx.disable(Capability::DepthTest);
    ctx.backend_mut().enable(Capability::DepthTest);

    // Stale until the cache forgets it
    assert!(!ctx.is_enabled(Capability::DepthTest));
    ctx.invalidate();
    assert!(ctx.is_enabled(Capability::DepthTest));
    assert_eq!(ctx.state().capability(Capability::DepthTest), Slot::Known(true));
}

#[test]
fn test_resync_reads_driver_bindings() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "constant", FRAGMENT_CONSTANT);
    let texture = Texture::create(&mut ctx, &TextureData::white()).unwrap();

    // Foreign code changes bindings behind the cache
    let backend = ctx.backend_mut();
    backend.use_program(Some(program.handle()));
    backend.active_texture(2);
    backend.bind_texture(Some(texture.handle));
    backend.viewport(Viewport::new(1, 2, 3, 4));

    ctx.resync();

    let state = ctx.state();
    assert_eq!(state.program(), Slot::Known(Some(program.handle())));
    assert_eq!(state.texture(2), Slot::Known(Some(texture.handle)));
    assert_eq!(state.active_unit(), Slot::Known(2));
    assert_eq!(state.viewport(), Slot::Known(Viewport::new(1, 2, 3, 4)));

    dummy_mut(&mut ctx).clear_calls();
    assert!(!ctx.use_program(Some(program.handle())));
    assert!(dummy(&ctx).calls().is_empty());
}

#[test]
fn test_resync_on_create() {
    let mut backend = DummyBackend::new(320, 240);
    backend.viewport(Viewport::new(0, 0, 100, 100));
    let config = ContextConfig {
        window_width: 320,
        window_height: 240,
        resync_on_create: true,
    };

    let ctx = GpuContext::with_config(backend, config);

    assert_eq!(ctx.state().viewport(), Slot::Known(Viewport::new(0, 0, 100, 100)));
    assert_eq!(ctx.state().window_size(), (320, 240));
}
