//! Frame buffer integration tests.
//!
//! Cover attachment layout for manual and reflected targets, name lookup,
//! the color attachment limit and bind/unbind viewport handling.

mod common;

use rstest::rstest;

use common::{dummy, program, target_for, Backend, FRAGMENT_CONSTANT, FRAGMENT_GBUFFER};
use glpass::backend::{DeviceLimits, DrawBuffer, FramebufferTarget, GlslType};
use glpass::context::Slot;
use glpass::shader::{InterfaceMap, InterfaceVariable};
use glpass::{
    AttachmentFormat, ContextConfig, DummyBackend, FrameBuffer, FrameBufferError, GlBackend,
    GpuContext, Viewport,
};

fn output(location: u32) -> InterfaceVariable {
    InterfaceVariable {
        ty: GlslType::Vec4,
        location,
        array_len: 1,
    }
}

#[rstest]
#[case::dummy(Backend::Dummy)]
fn test_reflected_target_matches_sparse_outputs(#[case] backend: Backend) {
    let Some(mut ctx) = backend.create_context(128, 128) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };
    let program = program(&mut ctx, "gbuffer", FRAGMENT_GBUFFER);

    let target = target_for(&mut ctx, &program, 16);

    assert_eq!(
        target.draw_buffers(),
        &[
            DrawBuffer::Color(0),
            DrawBuffer::None,
            DrawBuffer::Color(2),
            DrawBuffer::Color(3),
        ]
    );
    assert_eq!(target.color_attachment_count(), 3);
    assert_eq!(target.buffer("albedo"), target.color_attachment(0));
    assert_eq!(target.buffer("normal"), target.color_attachment(2));
    assert_eq!(target.buffer("position"), target.color_attachment(3));
    assert_eq!(
        target.buffer_names().collect::<Vec<_>>(),
        vec!["albedo", "normal", "position"]
    );
}

#[rstest]
#[case::dummy(Backend::Dummy)]
fn test_single_output_target(#[case] backend: Backend) {
    let Some(mut ctx) = backend.create_context(128, 128) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };
    let program = program(&mut ctx, "constant", FRAGMENT_CONSTANT);

    let target = target_for(&mut ctx, &program, 8);

    assert_eq!(target.draw_buffers(), &[DrawBuffer::Color(0)]);
    assert!(target.buffer("fragColor").is_some());
    assert_eq!(target.buffer("fragColor"), target.color_attachment(0));
}

#[test]
fn test_missing_lookups_return_none() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let target = FrameBuffer::new(&mut ctx, 8, 8, &AttachmentFormat::default()).unwrap();

    assert_eq!(target.color_attachment(0), None);
    assert_eq!(target.buffer("fragColor"), None);
    assert_eq!(target.read_buffer(&mut ctx, "fragColor", 0, 0), None);
    assert!(target.draw_buffers().is_empty());
}

#[test]
fn test_manual_attachments_append_slots() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let mut target = FrameBuffer::new(&mut ctx, 32, 32, &AttachmentFormat::ldr()).unwrap();

    target.add_color_attachments(&mut ctx, 2).unwrap();
    target.add_color_attachments(&mut ctx, 1).unwrap();

    assert_eq!(
        target.draw_buffers(),
        &[
            DrawBuffer::Color(0),
            DrawBuffer::Color(1),
            DrawBuffer::Color(2),
        ]
    );
    assert!(target.color_attachment(2).is_some());
    // Manual attachments have no output names
    assert_eq!(target.buffer_names().count(), 0);
}

#[test]
fn test_manual_attachments_respect_limit() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let max = ctx.limits().max_color_attachments;
    let mut target = FrameBuffer::new(&mut ctx, 32, 32, &AttachmentFormat::default()).unwrap();
    target.add_color_attachments(&mut ctx, max - 1).unwrap();
    let textures_before = dummy(&ctx).live_objects();

    let result = target.add_color_attachments(&mut ctx, 2);

    match result {
        Err(FrameBufferError::TooManyColorAttachments {
            requested,
            existing,
            max: limit,
        }) => {
            assert_eq!(requested, 2);
            assert_eq!(existing, max - 1);
            assert_eq!(limit, max);
        }
        other => panic!("expected the attachment limit error, got {:?}", other),
    }
    assert_eq!(target.color_attachment_count(), (max - 1) as usize);
    assert_eq!(dummy(&ctx).live_objects(), textures_before);

    target.add_color_attachments(&mut ctx, 1).unwrap();
    assert_eq!(target.color_attachment_count(), max as usize);
}

#[test]
fn test_oversized_attachment_request_is_rejected() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let max = ctx.limits().max_color_attachments;
    let mut target = FrameBuffer::new(&mut ctx, 16, 16, &AttachmentFormat::default()).unwrap();
    target.add_color_attachments(&mut ctx, 1).unwrap();
    let objects_before = dummy(&ctx).live_objects();

    let result = target.add_color_attachments(&mut ctx, u32::MAX);

    assert!(matches!(
        result,
        Err(FrameBufferError::TooManyColorAttachments {
            requested: u32::MAX,
            existing: 1,
            max: limit,
        }) if limit == max
    ));
    assert_eq!(target.color_attachment_count(), 1);
    assert_eq!(dummy(&ctx).live_objects(), objects_before);
}

#[test]
fn test_output_location_beyond_limit_is_rejected() {
    let limits = DeviceLimits {
        max_color_attachments: 2,
        max_draw_buffers: 2,
        ..Default::default()
    };
    let mut ctx = GpuContext::new(DummyBackend::default().with_limits(limits));
    let mut outputs = InterfaceMap::new();
    outputs.insert("color".to_string(), output(0));
    outputs.insert("velocity".to_string(), output(4));

    let result = FrameBuffer::from_outputs(&mut ctx, &outputs, 8, 8, &AttachmentFormat::default());

    assert!(matches!(
        result,
        Err(FrameBufferError::TooManyColorAttachments { max: 2, .. })
    ));
    assert_eq!(dummy(&ctx).live_objects(), 0);
}

#[test]
fn test_draw_buffer_limit_caps_color_slots() {
    let limits = DeviceLimits {
        max_color_attachments: 8,
        max_draw_buffers: 2,
        ..Default::default()
    };
    let mut ctx = GpuContext::new(DummyBackend::default().with_limits(limits));
    let mut outputs = InterfaceMap::new();
    outputs.insert("color".to_string(), output(0));
    outputs.insert("emissive".to_string(), output(2));

    let reflected = FrameBuffer::from_outputs(&mut ctx, &outputs, 8, 8, &AttachmentFormat::default());
    assert!(matches!(
        reflected,
        Err(FrameBufferError::TooManyColorAttachments { requested: 3, max: 2, .. })
    ));

    let mut manual = FrameBuffer::new(&mut ctx, 8, 8, &AttachmentFormat::default()).unwrap();
    assert!(manual.add_color_attachments(&mut ctx, 3).is_err());
    manual.add_color_attachments(&mut ctx, 2).unwrap();
    assert_eq!(manual.draw_buffers().len(), 2);
}

#[test]
fn test_bind_covers_target_and_unbind_restores_window() {
    let config = ContextConfig {
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    };
    let mut ctx = GpuContext::with_config(DummyBackend::new(1280, 720), config);
    let target = FrameBuffer::new(&mut ctx, 64, 32, &AttachmentFormat::default()).unwrap();

    target.bind(&mut ctx);
    assert_eq!(ctx.state().viewport(), Slot::Known(Viewport::from_size(64, 32)));
    assert_eq!(
        ctx.state().framebuffer(FramebufferTarget::Draw),
        Slot::Known(Some(target.handle()))
    );
    assert_eq!(
        ctx.state().framebuffer(FramebufferTarget::Read),
        Slot::Known(Some(target.handle()))
    );

    target.unbind(&mut ctx);
    assert_eq!(ctx.state().viewport(), Slot::Known(Viewport::from_size(1280, 720)));
    assert_eq!(
        ctx.state().framebuffer(FramebufferTarget::Draw),
        Slot::Known(None)
    );
}

#[test]
fn test_unbind_follows_window_resize() {
    let mut ctx = Backend::Dummy.create_context(640, 480).unwrap();
    let target = FrameBuffer::new(&mut ctx, 16, 16, &AttachmentFormat::default()).unwrap();

    target.bind(&mut ctx);
    ctx.set_window_size(800, 600);
    target.unbind(&mut ctx);

    assert_eq!(ctx.state().viewport(), Slot::Known(Viewport::from_size(800, 600)));
}

#[test]
fn test_creation_keeps_current_draw_binding() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let first = FrameBuffer::new(&mut ctx, 8, 8, &AttachmentFormat::default()).unwrap();
    first.bind(&mut ctx);

    let mut second = FrameBuffer::new(&mut ctx, 8, 8, &AttachmentFormat::default()).unwrap();
    second.add_color_attachments(&mut ctx, 1).unwrap();

    assert_eq!(
        ctx.state().framebuffer(FramebufferTarget::Draw),
        Slot::Known(Some(first.handle()))
    );
    assert_eq!(
        ctx.backend().bound_framebuffer(FramebufferTarget::Draw),
        Some(first.handle())
    );
}

#[test]
fn test_creation_after_invalidate_keeps_driver_binding() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let first = FrameBuffer::new(&mut ctx, 8, 8, &AttachmentFormat::default()).unwrap();
    first.bind(&mut ctx);
    ctx.invalidate();

    let _second = FrameBuffer::new(&mut ctx, 8, 8, &AttachmentFormat::default()).unwrap();

    assert_eq!(
        ctx.backend().bound_framebuffer(FramebufferTarget::Draw),
        Some(first.handle())
    );
    assert_eq!(
        ctx.state().framebuffer(FramebufferTarget::Draw),
        Slot::Known(Some(first.handle()))
    );
}

#[test]
fn test_destroy_releases_attachments() {
    let mut ctx = Backend::Dummy.create_context(64, 64).unwrap();
    let program = program(&mut ctx, "gbuffer", FRAGMENT_GBUFFER);
    let baseline = dummy(&ctx).live_objects();
    let target = target_for(&mut ctx, &program, 8);
    // Framebuffer, depth and three color textures
    assert_eq!(dummy(&ctx).live_objects(), baseline + 5);

    target.destroy(&mut ctx);

    assert_eq!(dummy(&ctx).live_objects(), baseline);
}
