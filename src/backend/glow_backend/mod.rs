//! OpenGL backend on top of glow
//!
//! Handles handed out by this backend are the raw GL object names, so a
//! handle created here can be passed to other code sharing the same context.

use std::any::Any;
use std::num::NonZeroU32;

use glam::Vec4;
use glow::HasContext;

use crate::backend::traits::*;
use crate::backend::types::*;

/// Backend issuing real GL calls through a [`glow::Context`]
pub struct GlowBackend {
    gl: glow::Context,
    limits: DeviceLimits,
}

impl GlowBackend {
    /// Wrap a context that is current on this thread.
    pub fn new(gl: glow::Context) -> Self {
        let limits = unsafe {
            DeviceLimits {
                max_color_attachments: gl.get_parameter_i32(glow::MAX_COLOR_ATTACHMENTS).max(1) as u32,
                max_draw_buffers: gl.get_parameter_i32(glow::MAX_DRAW_BUFFERS).max(1) as u32,
                max_texture_units: gl
                    .get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS)
                    .max(1) as u32,
            }
        };
        log::info!(
            "GL backend: {} ({}), {:?}",
            unsafe { gl.get_parameter_string(glow::RENDERER) },
            unsafe { gl.get_parameter_string(glow::VERSION) },
            limits
        );
        Self { gl, limits }
    }

    /// Access the wrapped context for calls this crate does not cover.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn parameter_name(&self, parameter: u32) -> Option<NonZeroU32> {
        let value = unsafe { self.gl.get_parameter_i32(parameter) };
        NonZeroU32::new(value as u32)
    }
}

fn nonzero(raw: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(raw)
}

fn shader(handle: ShaderHandle) -> Option<glow::NativeShader> {
    nonzero(handle.raw()).map(glow::NativeShader)
}

fn program(handle: ProgramHandle) -> Option<glow::NativeProgram> {
    nonzero(handle.raw()).map(glow::NativeProgram)
}

fn texture(handle: TextureHandle) -> Option<glow::NativeTexture> {
    nonzero(handle.raw()).map(glow::NativeTexture)
}

fn framebuffer(handle: FramebufferHandle) -> Option<glow::NativeFramebuffer> {
    nonzero(handle.raw()).map(glow::NativeFramebuffer)
}

fn vertex_array(handle: VertexArrayHandle) -> Option<glow::NativeVertexArray> {
    nonzero(handle.raw()).map(glow::NativeVertexArray)
}

fn buffer(handle: BufferHandle) -> Option<glow::NativeBuffer> {
    nonzero(handle.raw()).map(glow::NativeBuffer)
}

fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
        ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn capability(capability: Capability) -> u32 {
    match capability {
        Capability::Blend => glow::BLEND,
        Capability::CullFace => glow::CULL_FACE,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::DepthClamp => glow::DEPTH_CLAMP,
        Capability::ScissorTest => glow::SCISSOR_TEST,
        Capability::StencilTest => glow::STENCIL_TEST,
        Capability::Multisample => glow::MULTISAMPLE,
        Capability::PolygonOffsetFill => glow::POLYGON_OFFSET_FILL,
        Capability::ProgramPointSize => glow::PROGRAM_POINT_SIZE,
        Capability::FramebufferSrgb => glow::FRAMEBUFFER_SRGB,
        Capability::RasterizerDiscard => glow::RASTERIZER_DISCARD,
        Capability::SampleAlphaToCoverage => glow::SAMPLE_ALPHA_TO_COVERAGE,
        Capability::TextureCubeMapSeamless => glow::TEXTURE_CUBE_MAP_SEAMLESS,
        Capability::ClipDistance(index) => glow::CLIP_DISTANCE0 + index,
    }
}

fn framebuffer_target(target: FramebufferTarget) -> u32 {
    match target {
        FramebufferTarget::Read => glow::READ_FRAMEBUFFER,
        FramebufferTarget::Draw => glow::DRAW_FRAMEBUFFER,
    }
}

fn draw_buffer(buffer: DrawBuffer) -> u32 {
    match buffer {
        DrawBuffer::None => glow::NONE,
        DrawBuffer::Color(index) => glow::COLOR_ATTACHMENT0 + index,
    }
}

fn primitive(kind: PrimitiveKind) -> u32 {
    match kind {
        PrimitiveKind::Points => glow::POINTS,
        PrimitiveKind::Lines => glow::LINES,
        PrimitiveKind::LineStrip => glow::LINE_STRIP,
        PrimitiveKind::Triangles => glow::TRIANGLES,
        PrimitiveKind::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveKind::TriangleFan => glow::TRIANGLE_FAN,
        PrimitiveKind::Patches => glow::PATCHES,
    }
}

fn index_type(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
        IndexFormat::Uint32 => glow::UNSIGNED_INT,
    }
}

fn internal_format(format: InternalFormat) -> u32 {
    match format {
        InternalFormat::R8 => glow::R8,
        InternalFormat::Rgba8 => glow::RGBA8,
        InternalFormat::R16F => glow::R16F,
        InternalFormat::Rg16F => glow::RG16F,
        InternalFormat::Rgb16F => glow::RGB16F,
        InternalFormat::Rgba16F => glow::RGBA16F,
        InternalFormat::R32F => glow::R32F,
        InternalFormat::Rg32F => glow::RG32F,
        InternalFormat::Rgb32F => glow::RGB32F,
        InternalFormat::Rgba32F => glow::RGBA32F,
        InternalFormat::Depth24 => glow::DEPTH_COMPONENT24,
        InternalFormat::Depth32F => glow::DEPTH_COMPONENT32F,
    }
}

fn pixel_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Red => glow::RED,
        PixelFormat::Rg => glow::RG,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
        PixelFormat::Depth => glow::DEPTH_COMPONENT,
    }
}

fn pixel_type(ty: PixelType) -> u32 {
    match ty {
        PixelType::UnsignedByte => glow::UNSIGNED_BYTE,
        PixelType::HalfFloat => glow::HALF_FLOAT,
        PixelType::Float => glow::FLOAT,
    }
}

fn filter(mode: FilterMode) -> i32 {
    match mode {
        FilterMode::Nearest => glow::NEAREST as i32,
        FilterMode::Linear => glow::LINEAR as i32,
    }
}

fn address(mode: AddressMode) -> i32 {
    match mode {
        AddressMode::ClampToEdge => glow::CLAMP_TO_EDGE as i32,
        AddressMode::Repeat => glow::REPEAT as i32,
        AddressMode::MirrorRepeat => glow::MIRRORED_REPEAT as i32,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

impl GlBackend for GlowBackend {
    fn name(&self) -> &'static str {
        "OpenGL (glow)"
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> BackendResult<ShaderHandle> {
        let gl = &self.gl;
        unsafe {
            let shader = gl
                .create_shader(shader_stage(stage))
                .map_err(|_| BackendError::ObjectCreationFailed("shader"))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(BackendError::ShaderCompilationFailed { stage, log });
            }
            Ok(ShaderHandle::from_raw(shader.0.get()))
        }
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> BackendResult<ProgramHandle> {
        let gl = &self.gl;
        unsafe {
            let program = gl
                .create_program()
                .map_err(|_| BackendError::ObjectCreationFailed("program"))?;
            let attached: Vec<_> = shaders.iter().filter_map(|s| shader(*s)).collect();
            for s in &attached {
                gl.attach_shader(program, *s);
            }
            gl.link_program(program);
            for s in &attached {
                gl.detach_shader(program, *s);
            }
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(BackendError::ProgramLinkFailed(log));
            }
            Ok(ProgramHandle::from_raw(program.0.get()))
        }
    }

    fn delete_shader(&mut self, handle: ShaderHandle) {
        if let Some(s) = shader(handle) {
            unsafe { self.gl.delete_shader(s) }
        }
    }

    fn delete_program(&mut self, handle: ProgramHandle) {
        if let Some(p) = program(handle) {
            unsafe { self.gl.delete_program(p) }
        }
    }

    fn use_program(&mut self, handle: Option<ProgramHandle>) {
        unsafe { self.gl.use_program(handle.and_then(program)) }
    }

    fn active_uniforms(&self, handle: ProgramHandle) -> Vec<ActiveVariable> {
        let Some(p) = program(handle) else {
            return Vec::new();
        };
        let gl = &self.gl;
        unsafe {
            (0..gl.get_active_uniforms(p))
                .filter_map(|index| gl.get_active_uniform(p, index))
                .filter_map(|uniform| {
                    // Block members have no location
                    let location = gl.get_uniform_location(p, &uniform.name)?;
                    Some(ActiveVariable {
                        ty: GlslType::from_gl(uniform.utype),
                        location: location.0,
                        size: uniform.size.max(1) as u32,
                        name: uniform.name,
                    })
                })
                .collect()
        }
    }

    fn active_inputs(&self, handle: ProgramHandle) -> Vec<ActiveVariable> {
        let Some(p) = program(handle) else {
            return Vec::new();
        };
        let gl = &self.gl;
        unsafe {
            (0..gl.get_active_attributes(p))
                .filter_map(|index| gl.get_active_attribute(p, index))
                .filter_map(|attribute| {
                    let location = gl.get_attrib_location(p, &attribute.name)?;
                    Some(ActiveVariable {
                        ty: GlslType::from_gl(attribute.atype),
                        location,
                        size: attribute.size.max(1) as u32,
                        name: attribute.name,
                    })
                })
                .collect()
        }
    }

    fn frag_data_location(&self, handle: ProgramHandle, name: &str) -> Option<u32> {
        let p = program(handle)?;
        let location = unsafe { self.gl.get_frag_data_location(p, name) };
        u32::try_from(location).ok()
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let loc = glow::NativeUniformLocation(location.raw());
        let loc = Some(&loc);
        let gl = &self.gl;
        unsafe {
            match value {
                UniformValue::Bool(v) => gl.uniform_1_i32(loc, *v as i32),
                UniformValue::Int(v) => gl.uniform_1_i32(loc, *v),
                UniformValue::Float(v) => gl.uniform_1_f32(loc, *v),
                UniformValue::Double(v) => gl.uniform_1_f32(loc, *v as f32),
                UniformValue::IVec2(v) => gl.uniform_2_i32(loc, v.x, v.y),
                UniformValue::IVec3(v) => gl.uniform_3_i32(loc, v.x, v.y, v.z),
                UniformValue::IVec4(v) => gl.uniform_4_i32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Vec2(v) => gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Mat2(m) => gl.uniform_matrix_2_f32_slice(loc, false, &m.to_cols_array()),
                UniformValue::Mat3(m) => gl.uniform_matrix_3_f32_slice(loc, false, &m.to_cols_array()),
                UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array()),
                UniformValue::Vec2Array(values) => {
                    gl.uniform_2_f32_slice(loc, bytemuck::cast_slice(values))
                }
                UniformValue::Vec3Array(values) => {
                    gl.uniform_3_f32_slice(loc, bytemuck::cast_slice(values))
                }
                UniformValue::Vec4Array(values) => {
                    gl.uniform_4_f32_slice(loc, bytemuck::cast_slice(values))
                }
            }
        }
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> BackendResult<TextureHandle> {
        if let Some(bytes) = data {
            if bytes.len() != desc.byte_len() {
                return Err(BackendError::InvalidUpload(format!(
                    "texture {:?} expects {} bytes, got {}",
                    desc.label,
                    desc.byte_len(),
                    bytes.len()
                )));
            }
        }

        let gl = &self.gl;
        unsafe {
            let tex = gl
                .create_texture()
                .map_err(|_| BackendError::ObjectCreationFailed("texture"))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

            let (width, height) = (desc.width as i32, desc.height as i32);
            match desc.storage {
                TextureStorage::Immutable => {
                    gl.tex_storage_2d(
                        glow::TEXTURE_2D,
                        1,
                        internal_format(desc.internal_format),
                        width,
                        height,
                    );
                    if let Some(bytes) = data {
                        gl.tex_sub_image_2d(
                            glow::TEXTURE_2D,
                            0,
                            0,
                            0,
                            width,
                            height,
                            pixel_format(desc.format),
                            pixel_type(desc.ty),
                            glow::PixelUnpackData::Slice(Some(bytes)),
                        );
                    }
                }
                TextureStorage::Mutable => gl.tex_image_2d(
                    glow::TEXTURE_2D,
                    0,
                    internal_format(desc.internal_format) as i32,
                    width,
                    height,
                    0,
                    pixel_format(desc.format),
                    pixel_type(desc.ty),
                    glow::PixelUnpackData::Slice(data),
                ),
            }

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter(desc.min_filter));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter(desc.mag_filter));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, address(desc.address_mode));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, address(desc.address_mode));
            Ok(TextureHandle::from_raw(tex.0.get()))
        }
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if let Some(t) = texture(handle) {
            unsafe { self.gl.delete_texture(t) }
        }
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&mut self, handle: Option<TextureHandle>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, handle.and_then(texture)) }
    }

    fn create_framebuffer(&mut self) -> BackendResult<FramebufferHandle> {
        let fb = unsafe { self.gl.create_framebuffer() }
            .map_err(|_| BackendError::ObjectCreationFailed("framebuffer"))?;
        Ok(FramebufferHandle::from_raw(fb.0.get()))
    }

    fn delete_framebuffer(&mut self, handle: FramebufferHandle) {
        if let Some(fb) = framebuffer(handle) {
            unsafe { self.gl.delete_framebuffer(fb) }
        }
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget, handle: Option<FramebufferHandle>) {
        unsafe {
            self.gl
                .bind_framebuffer(framebuffer_target(target), handle.and_then(framebuffer))
        }
    }

    fn framebuffer_texture(&mut self, attachment: Attachment, handle: Option<TextureHandle>) {
        let point = match attachment {
            Attachment::Color(index) => glow::COLOR_ATTACHMENT0 + index,
            Attachment::Depth => glow::DEPTH_ATTACHMENT,
        };
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::DRAW_FRAMEBUFFER,
                point,
                glow::TEXTURE_2D,
                handle.and_then(texture),
                0,
            )
        }
    }

    fn draw_buffers(&mut self, buffers: &[DrawBuffer]) {
        let buffers: Vec<u32> = buffers.iter().copied().map(draw_buffer).collect();
        unsafe { self.gl.draw_buffers(&buffers) }
    }

    fn read_buffer(&mut self, buffer: DrawBuffer) {
        unsafe { self.gl.read_buffer(draw_buffer(buffer)) }
    }

    fn framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        match unsafe { self.gl.check_framebuffer_status(framebuffer_target(target)) } {
            glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
            glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            other => FramebufferStatus::Other(other),
        }
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<Vec4> {
        let mut pixels = vec![Vec4::ZERO; width as usize * height as usize];
        unsafe {
            self.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            self.gl.read_pixels(
                x,
                y,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::FLOAT,
                glow::PixelPackData::Slice(Some(bytemuck::cast_slice_mut(&mut pixels))),
            );
        }
        pixels
    }

    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle> {
        let vao = unsafe { self.gl.create_vertex_array() }
            .map_err(|_| BackendError::ObjectCreationFailed("vertex array"))?;
        Ok(VertexArrayHandle::from_raw(vao.0.get()))
    }

    fn delete_vertex_array(&mut self, handle: VertexArrayHandle) {
        if let Some(vao) = vertex_array(handle) {
            unsafe { self.gl.delete_vertex_array(vao) }
        }
    }

    fn bind_vertex_array(&mut self, handle: Option<VertexArrayHandle>) {
        unsafe { self.gl.bind_vertex_array(handle.and_then(vertex_array)) }
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BackendResult<BufferHandle> {
        let gl = &self.gl;
        unsafe {
            let buf = gl
                .create_buffer()
                .map_err(|_| BackendError::ObjectCreationFailed("buffer"))?;
            gl.bind_buffer(buffer_target(target), Some(buf));
            gl.buffer_data_u8_slice(buffer_target(target), data, glow::STATIC_DRAW);
            Ok(BufferHandle::from_raw(buf.0.get()))
        }
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        if let Some(buf) = buffer(handle) {
            unsafe { self.gl.delete_buffer(buf) }
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: Option<BufferHandle>) {
        unsafe { self.gl.bind_buffer(buffer_target(target), handle.and_then(buffer)) }
    }

    fn vertex_attribute(&mut self, attribute: &VertexAttribute) {
        let gl = &self.gl;
        unsafe {
            gl.enable_vertex_attrib_array(attribute.location);
            gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components as i32,
                glow::FLOAT,
                false,
                attribute.stride as i32,
                attribute.offset as i32,
            );
            gl.vertex_attrib_divisor(attribute.location, attribute.divisor);
        }
    }

    fn viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl.viewport(
                viewport.x,
                viewport.y,
                viewport.width as i32,
                viewport.height as i32,
            )
        }
    }

    fn enable(&mut self, cap: Capability) {
        unsafe { self.gl.enable(capability(cap)) }
    }

    fn disable(&mut self, cap: Capability) {
        unsafe { self.gl.disable(capability(cap)) }
    }

    fn is_enabled(&self, cap: Capability) -> bool {
        unsafe { self.gl.is_enabled(capability(cap)) }
    }

    fn clear_color(&mut self, color: Vec4) {
        unsafe { self.gl.clear_color(color.x, color.y, color.z, color.w) }
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) }
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) }
    }

    fn draw_arrays(&mut self, mode: PrimitiveKind, first: u32, count: u32, instances: u32) {
        if instances == 0 {
            return;
        }
        unsafe {
            if instances > 1 {
                self.gl.draw_arrays_instanced(
                    primitive(mode),
                    first as i32,
                    count as i32,
                    instances as i32,
                );
            } else {
                self.gl.draw_arrays(primitive(mode), first as i32, count as i32);
            }
        }
    }

    fn draw_elements(&mut self, mode: PrimitiveKind, count: u32, format: IndexFormat, instances: u32) {
        if instances == 0 {
            return;
        }
        unsafe {
            if instances > 1 {
                self.gl.draw_elements_instanced(
                    primitive(mode),
                    count as i32,
                    index_type(format),
                    0,
                    instances as i32,
                );
            } else {
                self.gl
                    .draw_elements(primitive(mode), count as i32, index_type(format), 0);
            }
        }
    }

    fn current_program(&self) -> Option<ProgramHandle> {
        self.parameter_name(glow::CURRENT_PROGRAM)
            .map(|name| ProgramHandle::from_raw(name.get()))
    }

    fn bound_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.parameter_name(glow::VERTEX_ARRAY_BINDING)
            .map(|name| VertexArrayHandle::from_raw(name.get()))
    }

    fn bound_framebuffer(&self, target: FramebufferTarget) -> Option<FramebufferHandle> {
        let parameter = match target {
            FramebufferTarget::Read => glow::READ_FRAMEBUFFER_BINDING,
            FramebufferTarget::Draw => glow::DRAW_FRAMEBUFFER_BINDING,
        };
        self.parameter_name(parameter)
            .map(|name| FramebufferHandle::from_raw(name.get()))
    }

    fn active_texture_unit(&self) -> u32 {
        let unit = unsafe { self.gl.get_parameter_i32(glow::ACTIVE_TEXTURE) } as u32;
        unit.saturating_sub(glow::TEXTURE0)
    }

    fn bound_texture(&mut self, unit: u32) -> Option<TextureHandle> {
        let previous = self.active_texture_unit();
        self.active_texture(unit);
        let bound = self.parameter_name(glow::TEXTURE_BINDING_2D);
        self.active_texture(previous);
        bound.map(|name| TextureHandle::from_raw(name.get()))
    }

    fn current_viewport(&self) -> Viewport {
        let mut rect = [0i32; 4];
        unsafe { self.gl.get_parameter_i32_slice(glow::VIEWPORT, &mut rect) };
        Viewport::new(rect[0], rect[1], rect[2].max(0) as u32, rect[3].max(0) as u32)
    }
}
