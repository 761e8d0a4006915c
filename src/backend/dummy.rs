//! Dummy GL backend for testing and development.
//!
//! This backend doesn't talk to a driver. It keeps enough server-side state
//! to behave like one from the caller's point of view: shaders are "compiled"
//! by scanning their declarations, programs reflect those declarations as
//! active resources, textures hold RGBA float texels, clears fill the draw
//! buffers and every draw is treated as covering the whole viewport with the
//! fragment stage's constant (or uniform-fed) outputs. Every state-changing
//! call is appended to a log so tests can count what reached the driver.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Vec4;

use crate::backend::traits::{BackendError, BackendResult, GlBackend};
use crate::backend::types::*;
use crate::shader::glsl::{self, Declaration, Storage};

/// A state-changing call that reached the dummy driver
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    UseProgram(Option<ProgramHandle>),
    BindVertexArray(Option<VertexArrayHandle>),
    BindFramebuffer(FramebufferTarget, Option<FramebufferHandle>),
    ActiveTexture(u32),
    BindTexture(Option<TextureHandle>),
    SetUniform(UniformLocation, UniformValue),
    Viewport(Viewport),
    Enable(Capability),
    Disable(Capability),
    ClearColor(Vec4),
    ClearDepth(f32),
    Clear(ClearFlags),
    DrawBuffers(Vec<DrawBuffer>),
    Draw {
        mode: PrimitiveKind,
        count: u32,
        instances: u32,
        indexed: bool,
    },
}

#[derive(Debug)]
struct DummyShader {
    stage: ShaderStage,
    declarations: Vec<Declaration>,
    source: String,
}

/// Where a fragment output's value comes from
#[derive(Debug, Clone)]
enum OutputSource {
    Constant(Vec4),
    Uniform(String),
}

#[derive(Debug, Default)]
struct DummyProgram {
    uniforms: Vec<ActiveVariable>,
    inputs: Vec<ActiveVariable>,
    outputs: HashMap<String, u32>,
    sources: HashMap<u32, OutputSource>,
    values: HashMap<u32, UniformValue>,
}

impl DummyProgram {
    fn uniform(&self, name: &str) -> Option<&ActiveVariable> {
        self.uniforms
            .iter()
            .find(|u| u.name == name || u.name.strip_suffix("[0]") == Some(name))
    }

    fn output_value(&self, location: u32) -> Option<Vec4> {
        match self.sources.get(&location)? {
            OutputSource::Constant(value) => Some(*value),
            OutputSource::Uniform(name) => {
                let uniform = self.uniform(name)?;
                match self.values.get(&uniform.location)? {
                    UniformValue::Vec4(v) => Some(*v),
                    UniformValue::Vec3(v) => Some(v.extend(1.0)),
                    UniformValue::Vec2(v) => Some(Vec4::new(v.x, v.y, 0.0, 1.0)),
                    UniformValue::Float(f) => Some(Vec4::new(*f, 0.0, 0.0, 1.0)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug)]
struct DummyTexture {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl DummyTexture {
    fn fill(&mut self, region: Viewport, value: Vec4) {
        let x0 = region.x.max(0) as u32;
        let y0 = region.y.max(0) as u32;
        let x1 = (region.x + region.width as i32).clamp(0, self.width as i32) as u32;
        let y1 = (region.y + region.height as i32).clamp(0, self.height as i32) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[(y * self.width + x) as usize] = value;
            }
        }
    }

    fn texel(&self, x: i32, y: i32) -> Vec4 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Vec4::ZERO;
        }
        self.pixels[(y as u32 * self.width + x as u32) as usize]
    }

    fn full(&self) -> Viewport {
        Viewport::from_size(self.width, self.height)
    }
}

#[derive(Debug)]
struct DummyFramebuffer {
    color: BTreeMap<u32, TextureHandle>,
    depth: Option<TextureHandle>,
    draw_buffers: Vec<DrawBuffer>,
    read_buffer: DrawBuffer,
}

impl Default for DummyFramebuffer {
    fn default() -> Self {
        Self {
            color: BTreeMap::new(),
            depth: None,
            draw_buffers: vec![DrawBuffer::Color(0)],
            read_buffer: DrawBuffer::Color(0),
        }
    }
}

/// Dummy GL backend.
#[derive(Debug)]
pub struct DummyBackend {
    limits: DeviceLimits,
    next_id: u32,
    calls: Vec<GlCall>,

    shaders: HashMap<ShaderHandle, DummyShader>,
    programs: HashMap<ProgramHandle, DummyProgram>,
    textures: HashMap<TextureHandle, DummyTexture>,
    framebuffers: HashMap<FramebufferHandle, DummyFramebuffer>,
    vertex_arrays: HashSet<VertexArrayHandle>,
    buffers: HashMap<BufferHandle, usize>,

    program: Option<ProgramHandle>,
    vertex_array: Option<VertexArrayHandle>,
    read_framebuffer: Option<FramebufferHandle>,
    draw_framebuffer: Option<FramebufferHandle>,
    active_unit: u32,
    unit_textures: HashMap<u32, TextureHandle>,
    viewport: Viewport,
    enabled: HashSet<Capability>,
    clear_color: Vec4,
    clear_depth: f32,
}

impl DummyBackend {
    /// Create a new dummy backend with a `width` x `height` default surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            limits: DeviceLimits::default(),
            next_id: 1,
            calls: Vec::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            vertex_arrays: HashSet::new(),
            buffers: HashMap::new(),
            program: None,
            vertex_array: None,
            read_framebuffer: None,
            draw_framebuffer: None,
            active_unit: 0,
            unit_textures: HashMap::new(),
            viewport: Viewport::from_size(width, height),
            // GL enables multisampling by default
            enabled: HashSet::from([Capability::Multisample]),
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
        }
    }

    /// Override the reported device limits.
    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Every state-changing call received so far, in order.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of logged calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Last value uploaded to a program's uniform, by declared name.
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let program = self.programs.get(&program)?;
        let uniform = program.uniform(name)?;
        program.values.get(&uniform.location).cloned()
    }

    /// Texels of a texture, row-major from the bottom-left.
    pub fn texture_pixels(&self, texture: TextureHandle) -> Option<&[Vec4]> {
        self.textures.get(&texture).map(|t| t.pixels.as_slice())
    }

    /// Source text a shader object was compiled from.
    pub fn shader_source(&self, shader: ShaderHandle) -> Option<&str> {
        self.shaders.get(&shader).map(|s| s.source.as_str())
    }

    /// Number of live objects of every kind, for leak checks.
    pub fn live_objects(&self) -> usize {
        self.shaders.len()
            + self.programs.len()
            + self.textures.len()
            + self.framebuffers.len()
            + self.vertex_arrays.len()
            + self.buffers.len()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(&mut self, call: GlCall) {
        self.calls.push(call);
    }

    /// Color attachments written by the draw buffers of the draw framebuffer,
    /// paired with the fragment output index feeding them.
    fn draw_targets(&self) -> Vec<(u32, TextureHandle)> {
        let Some(framebuffer) = self
            .draw_framebuffer
            .and_then(|fb| self.framebuffers.get(&fb))
        else {
            return Vec::new();
        };
        framebuffer
            .draw_buffers
            .iter()
            .enumerate()
            .filter_map(|(index, buffer)| match buffer {
                DrawBuffer::Color(slot) => framebuffer
                    .color
                    .get(slot)
                    .map(|texture| (index as u32, *texture)),
                DrawBuffer::None => None,
            })
            .collect()
    }

    fn draw(&mut self, mode: PrimitiveKind, count: u32, instances: u32, indexed: bool) {
        self.record(GlCall::Draw {
            mode,
            count,
            instances,
            indexed,
        });
        if count == 0 || instances == 0 {
            return;
        }
        let Some(program) = self.program.and_then(|p| self.programs.get(&p)) else {
            log::warn!("DummyBackend: draw with no program in use");
            return;
        };

        let writes: Vec<(TextureHandle, Vec4)> = self
            .draw_targets()
            .into_iter()
            .filter_map(|(index, texture)| {
                program.output_value(index).map(|value| (texture, value))
            })
            .collect();

        let region = self.viewport;
        for (texture, value) in writes {
            if let Some(texture) = self.textures.get_mut(&texture) {
                texture.fill(region, value);
            }
        }
    }

    fn link_reflect(&self, stages: &[&DummyShader]) -> DummyProgram {
        let mut program = DummyProgram::default();

        let mut next_location = 0;
        for stage in stages {
            for decl in stage
                .declarations
                .iter()
                .filter(|d| d.storage == Storage::Uniform)
            {
                if program.uniform(&decl.name).is_some() {
                    continue;
                }
                let location = decl.location.unwrap_or(next_location);
                next_location = next_location.max(location + decl.array_len);
                let name = if decl.array_len > 1 {
                    format!("{}[0]", decl.name)
                } else {
                    decl.name.clone()
                };
                program.uniforms.push(ActiveVariable {
                    name,
                    ty: GlslType::from_glsl(&decl.ty).unwrap_or(GlslType::Other(0)),
                    location,
                    size: decl.array_len,
                });
            }
        }

        if let Some(vertex) = stages.iter().find(|s| s.stage == ShaderStage::Vertex) {
            let mut next_location = 0;
            for decl in vertex
                .declarations
                .iter()
                .filter(|d| d.storage == Storage::In)
            {
                let location = decl.location.unwrap_or(next_location);
                next_location = location + decl.array_len;
                program.inputs.push(ActiveVariable {
                    name: decl.name.clone(),
                    ty: GlslType::from_glsl(&decl.ty).unwrap_or(GlslType::Other(0)),
                    location,
                    size: decl.array_len,
                });
            }
        }

        if let Some(fragment) = stages.iter().find(|s| s.stage == ShaderStage::Fragment) {
            let mut next_location = 0;
            for decl in fragment
                .declarations
                .iter()
                .filter(|d| d.storage == Storage::Out)
            {
                let location = decl.location.unwrap_or(next_location);
                next_location = location + 1;
                program.outputs.insert(decl.name.clone(), location);
                if let Some(source) = output_source(&fragment.source, &decl.name, &program) {
                    program.sources.insert(location, source);
                }
            }
        }

        program
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Find what a fragment `main` assigns to `output`: a constant vector, a
/// scalar, or a plain uniform name.
fn output_source(source: &str, output: &str, program: &DummyProgram) -> Option<OutputSource> {
    let rhs = assignment(source, output)?;

    if program.uniform(rhs).is_some() {
        return Some(OutputSource::Uniform(rhs.to_string()));
    }

    let (components, args) = match rhs.find('(') {
        Some(open) if rhs.ends_with(')') => {
            let components = match &rhs[..open] {
                "vec4" => 4,
                "vec3" => 3,
                "vec2" => 2,
                "float" => 1,
                _ => return None,
            };
            (components, &rhs[open + 1..rhs.len() - 1])
        }
        _ => (1, rhs),
    };

    let values = args
        .split(',')
        .map(|v| v.trim().trim_end_matches(['f', 'F']).parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    let mut out = Vec4::new(0.0, 0.0, 0.0, 1.0);
    match values.as_slice() {
        [single] => {
            for i in 0..components {
                out[i] = *single;
            }
        }
        many if many.len() == components => {
            for (i, value) in many.iter().enumerate() {
                out[i] = *value;
            }
        }
        _ => return None,
    }
    Some(OutputSource::Constant(out))
}

/// Right-hand side of the first plain assignment `name = ...;`.
fn assignment<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let mut search = 0;
    while let Some(found) = source[search..].find(name) {
        let start = search + found;
        let end = start + name.len();
        search = end;

        let boundary_before = source[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if !boundary_before {
            continue;
        }
        let after = source[end..].trim_start();
        let Some(rest) = after.strip_prefix('=') else {
            continue;
        };
        if rest.starts_with('=') {
            continue;
        }
        let rhs = rest.split(';').next()?.trim();
        return Some(rhs);
    }
    None
}

fn half_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 10) & 0x1f) as i32;
    let mantissa = (bits & 0x3ff) as f32;
    match exponent {
        0 => sign * mantissa * 2f32.powi(-24),
        31 if mantissa == 0.0 => sign * f32::INFINITY,
        31 => f32::NAN,
        _ => sign * (1.0 + mantissa / 1024.0) * 2f32.powi(exponent - 15),
    }
}

fn decode_texels(desc: &TextureDescriptor, data: &[u8]) -> Vec<Vec4> {
    let components = desc.format.components();
    let size = desc.ty.size();
    data.chunks_exact(components * size)
        .map(|texel| {
            let mut out = Vec4::new(0.0, 0.0, 0.0, 1.0);
            for (i, c) in texel.chunks_exact(size).enumerate() {
                out[i] = match desc.ty {
                    PixelType::UnsignedByte => c[0] as f32 / 255.0,
                    PixelType::HalfFloat => half_to_f32(u16::from_le_bytes([c[0], c[1]])),
                    PixelType::Float => f32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                };
            }
            out
        })
        .collect()
}

impl GlBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
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
        if !source.contains("void main") {
            return Err(BackendError::ShaderCompilationFailed {
                stage,
                log: "0:1: error: missing entry point 'main'".to_string(),
            });
        }
        let handle = ShaderHandle(self.next_id());
        log::trace!("DummyBackend: compiled {} shader {:?}", stage, handle);
        self.shaders.insert(
            handle,
            DummyShader {
                stage,
                declarations: glsl::scan(source),
                source: source.to_string(),
            },
        );
        Ok(handle)
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> BackendResult<ProgramHandle> {
        let stages = shaders
            .iter()
            .map(|handle| {
                self.shaders.get(handle).ok_or_else(|| {
                    BackendError::ProgramLinkFailed(format!("{:?} is not a shader object", handle))
                })
            })
            .collect::<BackendResult<Vec<_>>>()?;

        for required in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !stages.iter().any(|s| s.stage == required) {
                return Err(BackendError::ProgramLinkFailed(format!(
                    "error: program has no {} shader",
                    required
                )));
            }
        }

        let program = self.link_reflect(&stages);
        let handle = ProgramHandle(self.next_id());
        log::trace!(
            "DummyBackend: linked program {:?} ({} uniforms, {} inputs, {} outputs)",
            handle,
            program.uniforms.len(),
            program.inputs.len(),
            program.outputs.len()
        );
        self.programs.insert(handle, program);
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        if self.program == Some(program) {
            self.program = None;
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.record(GlCall::UseProgram(program));
        self.program = program;
    }

    fn active_uniforms(&self, program: ProgramHandle) -> Vec<ActiveVariable> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn active_inputs(&self, program: ProgramHandle) -> Vec<ActiveVariable> {
        self.programs
            .get(&program)
            .map(|p| p.inputs.clone())
            .unwrap_or_default()
    }

    fn frag_data_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs.get(&program)?.outputs.get(name).copied()
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        self.record(GlCall::SetUniform(location, value.clone()));
        let Some(program) = self.program.and_then(|p| self.programs.get_mut(&p)) else {
            log::warn!("DummyBackend: uniform upload with no program in use");
            return;
        };
        program.values.insert(location.0, value.clone());
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> BackendResult<TextureHandle> {
        let texel_count = (desc.width * desc.height) as usize;
        let pixels = match data {
            Some(data) if data.len() < desc.byte_len() => {
                return Err(BackendError::InvalidUpload(format!(
                    "{} bytes supplied for a {}x{} texture needing {}",
                    data.len(),
                    desc.width,
                    desc.height,
                    desc.byte_len()
                )));
            }
            Some(data) => decode_texels(desc, &data[..desc.byte_len()]),
            None => vec![Vec4::ZERO; texel_count],
        };

        let handle = TextureHandle(self.next_id());
        log::trace!(
            "DummyBackend: creating texture {:?} {:?} ({}x{} {:?})",
            handle,
            desc.label,
            desc.width,
            desc.height,
            desc.internal_format
        );
        self.textures.insert(
            handle,
            DummyTexture {
                width: desc.width,
                height: desc.height,
                pixels,
            },
        );
        self.unit_textures.insert(self.active_unit, handle);
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.unit_textures.retain(|_, bound| *bound != texture);
    }

    fn active_texture(&mut self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.record(GlCall::BindTexture(texture));
        match texture {
            Some(texture) => self.unit_textures.insert(self.active_unit, texture),
            None => self.unit_textures.remove(&self.active_unit),
        };
    }

    fn create_framebuffer(&mut self) -> BackendResult<FramebufferHandle> {
        let handle = FramebufferHandle(self.next_id());
        log::trace!("DummyBackend: creating framebuffer {:?}", handle);
        self.framebuffers.insert(handle, DummyFramebuffer::default());
        Ok(handle)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(&framebuffer);
        if self.read_framebuffer == Some(framebuffer) {
            self.read_framebuffer = None;
        }
        if self.draw_framebuffer == Some(framebuffer) {
            self.draw_framebuffer = None;
        }
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: Option<FramebufferHandle>) {
        self.record(GlCall::BindFramebuffer(target, framebuffer));
        match target {
            FramebufferTarget::Read => self.read_framebuffer = framebuffer,
            FramebufferTarget::Draw => self.draw_framebuffer = framebuffer,
        }
    }

    fn framebuffer_texture(&mut self, attachment: Attachment, texture: Option<TextureHandle>) {
        let max = self.limits.max_color_attachments;
        let Some(framebuffer) = self
            .draw_framebuffer
            .and_then(|fb| self.framebuffers.get_mut(&fb))
        else {
            log::warn!("DummyBackend: attaching to the default framebuffer");
            return;
        };
        match (attachment, texture) {
            (Attachment::Color(slot), _) if slot >= max => {
                log::error!("DummyBackend: color attachment {} exceeds maximum {}", slot, max);
            }
            (Attachment::Color(slot), Some(texture)) => {
                framebuffer.color.insert(slot, texture);
            }
            (Attachment::Color(slot), None) => {
                framebuffer.color.remove(&slot);
            }
            (Attachment::Depth, texture) => framebuffer.depth = texture,
        }
    }

    fn draw_buffers(&mut self, buffers: &[DrawBuffer]) {
        self.record(GlCall::DrawBuffers(buffers.to_vec()));
        if let Some(framebuffer) = self
            .draw_framebuffer
            .and_then(|fb| self.framebuffers.get_mut(&fb))
        {
            framebuffer.draw_buffers = buffers.to_vec();
        }
    }

    fn read_buffer(&mut self, buffer: DrawBuffer) {
        if let Some(framebuffer) = self
            .read_framebuffer
            .and_then(|fb| self.framebuffers.get_mut(&fb))
        {
            framebuffer.read_buffer = buffer;
        }
    }

    fn framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        let bound = match target {
            FramebufferTarget::Read => self.read_framebuffer,
            FramebufferTarget::Draw => self.draw_framebuffer,
        };
        let Some(framebuffer) = bound.and_then(|fb| self.framebuffers.get(&fb)) else {
            return FramebufferStatus::Complete;
        };
        if framebuffer.color.is_empty() && framebuffer.depth.is_none() {
            return FramebufferStatus::MissingAttachment;
        }
        let attached = framebuffer.color.values().chain(framebuffer.depth.iter());
        for texture in attached {
            if !self.textures.contains_key(texture) {
                return FramebufferStatus::IncompleteAttachment;
            }
        }
        FramebufferStatus::Complete
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<Vec4> {
        let texture = self
            .read_framebuffer
            .and_then(|fb| self.framebuffers.get(&fb))
            .and_then(|fb| match fb.read_buffer {
                DrawBuffer::Color(slot) => fb.color.get(&slot),
                DrawBuffer::None => None,
            })
            .and_then(|texture| self.textures.get(texture));

        let mut out = Vec::with_capacity((width * height) as usize);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                out.push(texture.map_or(Vec4::ZERO, |t| t.texel(x + col, y + row)));
            }
        }
        out
    }

    fn create_vertex_array(&mut self) -> BackendResult<VertexArrayHandle> {
        let handle = VertexArrayHandle(self.next_id());
        log::trace!("DummyBackend: creating vertex array {:?}", handle);
        self.vertex_arrays.insert(handle);
        Ok(handle)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_arrays.remove(&vertex_array);
        if self.vertex_array == Some(vertex_array) {
            self.vertex_array = None;
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.record(GlCall::BindVertexArray(vertex_array));
        self.vertex_array = vertex_array;
    }

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BackendResult<BufferHandle> {
        let handle = BufferHandle(self.next_id());
        log::trace!(
            "DummyBackend: creating {:?} buffer {:?} (size: {})",
            target,
            handle,
            data.len()
        );
        self.buffers.insert(handle, data.len());
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
    }

    fn bind_buffer(&mut self, _target: BufferTarget, _buffer: Option<BufferHandle>) {}

    fn vertex_attribute(&mut self, attribute: &VertexAttribute) {
        log::trace!("DummyBackend: vertex attribute {:?}", attribute);
    }

    fn viewport(&mut self, viewport: Viewport) {
        self.record(GlCall::Viewport(viewport));
        self.viewport = viewport;
    }

    fn enable(&mut self, capability: Capability) {
        self.record(GlCall::Enable(capability));
        self.enabled.insert(capability);
    }

    fn disable(&mut self, capability: Capability) {
        self.record(GlCall::Disable(capability));
        self.enabled.remove(&capability);
    }

    fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    fn clear_color(&mut self, color: Vec4) {
        self.record(GlCall::ClearColor(color));
        self.clear_color = color;
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(GlCall::ClearDepth(depth));
        self.clear_depth = depth;
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(GlCall::Clear(flags));
        let Some(framebuffer) = self
            .draw_framebuffer
            .and_then(|fb| self.framebuffers.get(&fb))
        else {
            return;
        };

        let mut fills = Vec::new();
        if flags.contains(ClearFlags::COLOR) {
            for (_, texture) in self.draw_targets() {
                fills.push((texture, self.clear_color));
            }
        }
        if flags.contains(ClearFlags::DEPTH) {
            if let Some(depth) = framebuffer.depth {
                fills.push((depth, Vec4::splat(self.clear_depth)));
            }
        }

        for (texture, value) in fills {
            if let Some(texture) = self.textures.get_mut(&texture) {
                let full = texture.full();
                texture.fill(full, value);
            }
        }
    }

    fn draw_arrays(&mut self, mode: PrimitiveKind, _first: u32, count: u32, instances: u32) {
        self.draw(mode, count, instances, false);
    }

    fn draw_elements(&mut self, mode: PrimitiveKind, count: u32, _format: IndexFormat, instances: u32) {
        self.draw(mode, count, instances, true);
    }

    fn current_program(&self) -> Option<ProgramHandle> {
        self.program
    }

    fn bound_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.vertex_array
    }

    fn bound_framebuffer(&self, target: FramebufferTarget) -> Option<FramebufferHandle> {
        match target {
            FramebufferTarget::Read => self.read_framebuffer,
            FramebufferTarget::Draw => self.draw_framebuffer,
        }
    }

    fn active_texture_unit(&self) -> u32 {
        self.active_unit
    }

    fn bound_texture(&mut self, unit: u32) -> Option<TextureHandle> {
        self.unit_textures.get(&unit).copied()
    }

    fn current_viewport(&self) -> Viewport {
        self.viewport
    }
}
