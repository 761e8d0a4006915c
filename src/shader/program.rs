//! Linked shader programs with reflected interfaces.

use std::collections::BTreeMap;

use crate::backend::{
    GlslType, ProgramHandle, ShaderHandle, ShaderStage, TextureHandle, UniformLocation,
    UniformValue,
};
use crate::context::GpuContext;
use crate::error::ShaderError;
use crate::shader::bindings::TextureBindings;
use crate::shader::composer::{ShaderComposer, ShaderSource};
use crate::shader::glsl::{self, Storage};

/// One reflected uniform, vertex input or fragment output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceVariable {
    pub ty: GlslType,
    pub location: u32,
    /// Element count, 1 for non-arrays
    pub array_len: u32,
}

/// Reflected interface keyed by variable name
pub type InterfaceMap = BTreeMap<String, InterfaceVariable>;

/// A compiled and linked program.
///
/// Stage objects are immutable after construction. Uniform values and the
/// registered texture bindings change freely between draws.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    handle: ProgramHandle,
    shaders: Vec<ShaderHandle>,
    stages: Vec<ShaderStage>,
    uniforms: InterfaceMap,
    inputs: InterfaceMap,
    outputs: InterfaceMap,
    textures: TextureBindings,
}

impl ShaderProgram {
    /// Compile, link and reflect a program.
    ///
    /// # Panics
    ///
    /// A stage that fails to compile or a program that fails to link leaves
    /// nothing to render with; the diagnostic is logged and this panics. Use
    /// [`ShaderProgram::compile`] to handle the failure instead.
    pub fn new(ctx: &mut GpuContext, label: &str, sources: &[ShaderSource]) -> Self {
        match Self::compile(ctx, label, sources) {
            Ok(program) => program,
            Err(e) => {
                log::error!("Shader program '{}' failed to build: {}", label, e);
                panic!("shader program '{}' failed to build: {}", label, e);
            }
        }
    }

    /// Load stage files through `composer` and build the program.
    ///
    /// Stages are inferred from the number of paths: 2 is vertex, fragment;
    /// 3 is vertex, fragment, geometry; 4 is vertex, fragment, tessellation
    /// control, tessellation evaluation.
    ///
    /// # Panics
    ///
    /// Same as [`ShaderProgram::new`], and also when a file cannot be loaded.
    pub fn from_files(ctx: &mut GpuContext, composer: &ShaderComposer, paths: &[&str]) -> Self {
        let label = paths.join("+");
        match Self::try_from_files(ctx, composer, paths) {
            Ok(program) => program,
            Err(e) => {
                log::error!("Shader program '{}' failed to build: {}", label, e);
                panic!("shader program '{}' failed to build: {}", label, e);
            }
        }
    }

    pub fn try_from_files(
        ctx: &mut GpuContext,
        composer: &ShaderComposer,
        paths: &[&str],
    ) -> Result<Self, ShaderError> {
        use ShaderStage::*;
        let stages: &[ShaderStage] = match paths.len() {
            2 => &[Vertex, Fragment],
            3 => &[Vertex, Fragment, Geometry],
            4 => &[Vertex, Fragment, TessControl, TessEvaluation],
            n => return Err(ShaderError::StageCount(n)),
        };
        let sources = paths
            .iter()
            .zip(stages)
            .map(|(path, stage)| composer.load(path, *stage))
            .collect::<Result<Vec<_>, _>>()?;
        Self::compile(ctx, &paths.join("+"), &sources)
    }

    /// Fallible construction.
    pub fn compile(
        ctx: &mut GpuContext,
        label: &str,
        sources: &[ShaderSource],
    ) -> Result<Self, ShaderError> {
        let stages: Vec<ShaderStage> = sources.iter().map(|s| s.stage).collect();
        validate_stages(&stages)?;

        let mut shaders = Vec::with_capacity(sources.len());
        for source in sources {
            match ctx.backend_mut().compile_shader(source.stage, &source.source) {
                Ok(shader) => shaders.push(shader),
                Err(e) => {
                    log::error!("Compiling {} failed", source.origin);
                    delete_shaders(ctx, &shaders);
                    return Err(e.into());
                }
            }
        }

        let handle = match ctx.backend_mut().link_program(&shaders) {
            Ok(handle) => handle,
            Err(e) => {
                delete_shaders(ctx, &shaders);
                return Err(e.into());
            }
        };

        let uniforms = reflect_active(ctx.backend().active_uniforms(handle));
        let inputs = reflect_active(ctx.backend().active_inputs(handle));

        let mut outputs = InterfaceMap::new();
        if let Some(fragment) = sources.iter().find(|s| s.stage == ShaderStage::Fragment) {
            for decl in glsl::scan(&fragment.source)
                .into_iter()
                .filter(|d| d.storage == Storage::Out)
            {
                let Some(location) = ctx.backend().frag_data_location(handle, &decl.name) else {
                    continue;
                };
                outputs.insert(
                    decl.name,
                    InterfaceVariable {
                        ty: GlslType::from_glsl(&decl.ty).unwrap_or(GlslType::Other(0)),
                        location,
                        array_len: decl.array_len,
                    },
                );
            }
        }

        log::debug!(
            "Built program '{}' {:?}: {} uniforms, {} inputs, {} outputs",
            label,
            stages,
            uniforms.len(),
            inputs.len(),
            outputs.len()
        );

        Ok(Self {
            label: label.to_string(),
            handle,
            shaders,
            stages,
            uniforms,
            inputs,
            outputs,
            textures: TextureBindings::new(),
        })
    }

    /// Upload a uniform value.
    ///
    /// An unknown name is logged and ignored; the program is not activated.
    /// Otherwise the program is made current and the value uploaded. A value
    /// whose kind differs from the reflected type is uploaded with a warning.
    pub fn update(&self, ctx: &mut GpuContext, name: &str, value: impl Into<UniformValue>) -> &Self {
        if let Err(e) = self.try_update(ctx, name, value) {
            log::error!("{}", e);
        }
        self
    }

    pub fn try_update(
        &self,
        ctx: &mut GpuContext,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<&Self, ShaderError> {
        let Some(uniform) = self.uniforms.get(name) else {
            return Err(ShaderError::UnknownUniform {
                program: self.label.clone(),
                name: name.to_string(),
            });
        };

        let value = value.into();
        if !value.matches(uniform.ty) {
            log::warn!(
                "uploading {} to uniform '{}' of type {:?} in program '{}'",
                value.kind(),
                name,
                uniform.ty,
                self.label
            );
        }
        if let Some(len) = array_len(&value) {
            if len > uniform.array_len as usize {
                log::warn!(
                    "{} elements uploaded to uniform '{}[{}]' in program '{}'",
                    len,
                    name,
                    uniform.array_len,
                    self.label
                );
            }
        }

        ctx.use_program(Some(self.handle));
        ctx.backend_mut()
            .set_uniform(UniformLocation(uniform.location), &value);
        Ok(self)
    }

    /// Register a texture for `sampler`, resolved to a unit by the next
    /// [`ShaderProgram::use_program`]. A later registration of the same
    /// sampler replaces this one.
    pub fn bind_texture_on_use(&mut self, sampler: &str, texture: TextureHandle) -> &mut Self {
        if let Some(previous) = self.textures.insert(sampler, texture) {
            log::trace!(
                "Program '{}': sampler '{}' rebound from {:?} to {:?}",
                self.label,
                sampler,
                previous,
                texture
            );
        }
        self
    }

    /// Bind the registered textures and make the program current.
    pub fn use_program(&self, ctx: &mut GpuContext) {
        self.use_with(ctx, &self.textures);
    }

    /// Bind `bindings` instead of the registered textures and make the
    /// program current.
    ///
    /// Units are assigned from 0 in binding order. Each sampler uniform is set
    /// to its unit and the texture bound there through the state cache.
    pub fn use_with(&self, ctx: &mut GpuContext, bindings: &TextureBindings) {
        let max_units = ctx.limits().max_texture_units;
        for (unit, (sampler, texture)) in bindings.iter().enumerate() {
            let unit = unit as u32;
            if unit >= max_units {
                log::error!(
                    "Program '{}': no texture unit left for sampler '{}' ({} units)",
                    self.label,
                    sampler,
                    max_units
                );
                continue;
            }
            self.update(ctx, sampler, unit as i32);
            ctx.bind_texture(unit, Some(texture));
        }
        ctx.use_program(Some(self.handle));
    }

    /// Location of the fragment output `name`, logged when missing.
    pub fn buffer(&self, name: &str) -> Option<u32> {
        match self.outputs.get(name) {
            Some(output) => Some(output.location),
            None => {
                log::error!("buffer '{}' does not exist in program '{}'", name, self.label);
                None
            }
        }
    }

    /// Texture registered for sampler `name`, logged when missing.
    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        let texture = self.textures.get(name);
        if texture.is_none() {
            log::error!(
                "texture '{}' is not registered in program '{}'",
                name,
                self.label
            );
        }
        texture
    }

    pub fn uniform(&self, name: &str) -> Option<&InterfaceVariable> {
        self.uniforms.get(name)
    }

    pub fn input(&self, name: &str) -> Option<&InterfaceVariable> {
        self.inputs.get(name)
    }

    pub fn uniforms(&self) -> &InterfaceMap {
        &self.uniforms
    }

    pub fn inputs(&self) -> &InterfaceMap {
        &self.inputs
    }

    pub fn outputs(&self) -> &InterfaceMap {
        &self.outputs
    }

    pub fn texture_bindings(&self) -> &TextureBindings {
        &self.textures
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    /// Delete the program and its stage objects.
    pub fn destroy(self, ctx: &mut GpuContext) {
        ctx.delete_program(self.handle);
        delete_shaders(ctx, &self.shaders);
    }
}

fn validate_stages(stages: &[ShaderStage]) -> Result<(), ShaderError> {
    use ShaderStage::*;
    let mut sorted = stages.to_vec();
    sorted.sort();
    match sorted.as_slice() {
        [Vertex, Fragment]
        | [Vertex, Geometry, Fragment]
        | [Vertex, TessControl, TessEvaluation, Fragment] => Ok(()),
        _ => Err(ShaderError::InvalidStages(stages.to_vec())),
    }
}

fn delete_shaders(ctx: &mut GpuContext, shaders: &[ShaderHandle]) {
    for shader in shaders {
        ctx.backend_mut().delete_shader(*shader);
    }
}

/// Key active resources by base name, dropping built-ins.
fn reflect_active(active: Vec<crate::backend::ActiveVariable>) -> InterfaceMap {
    active
        .into_iter()
        .filter(|v| !v.name.starts_with("gl_"))
        .map(|v| {
            let name = match v.name.strip_suffix("[0]") {
                Some(base) => base.to_string(),
                None => v.name,
            };
            (
                name,
                InterfaceVariable {
                    ty: v.ty,
                    location: v.location,
                    array_len: v.size,
                },
            )
        })
        .collect()
}

fn array_len(value: &UniformValue) -> Option<usize> {
    match value {
        UniformValue::Vec2Array(v) => Some(v.len()),
        UniformValue::Vec3Array(v) => Some(v.len()),
        UniformValue::Vec4Array(v) => Some(v.len()),
        _ => None,
    }
}
