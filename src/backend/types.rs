//! Common types shared between backends

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Handle to a compiled shader stage object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub(crate) u32);

/// Handle to a linked program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub(crate) u32);

/// Handle to a texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

/// Handle to a framebuffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferHandle(pub(crate) u32);

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayHandle(pub(crate) u32);

/// Handle to a buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub(crate) u32);

/// Location of an active uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub(crate) u32);

macro_rules! raw_handle {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                /// Wrap a raw object name obtained outside this crate.
                pub fn from_raw(raw: u32) -> Self {
                    Self(raw)
                }

                /// The raw object name.
                pub fn raw(self) -> u32 {
                    self.0
                }
            }
        )*
    };
}

raw_handle!(
    ShaderHandle,
    ProgramHandle,
    TextureHandle,
    FramebufferHandle,
    VertexArrayHandle,
    BufferHandle,
    UniformLocation,
);

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }

    /// Preprocessor symbol defined while composing a source for this stage.
    pub fn define(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::TessControl => "TESS_CONTROL",
            ShaderStage::TessEvaluation => "TESS_EVALUATION",
            ShaderStage::Geometry => "GEOMETRY",
            ShaderStage::Fragment => "FRAGMENT",
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of a reflected shader interface variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslType {
    Bool,
    Int,
    UInt,
    Float,
    Double,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler2DArray,
    Sampler2DShadow,
    /// A type this crate has no upload path for, carrying the raw GL enum
    Other(u32),
}

impl GlslType {
    /// Parse a GLSL type keyword.
    pub fn from_glsl(keyword: &str) -> Option<Self> {
        let ty = match keyword {
            "bool" => GlslType::Bool,
            "int" => GlslType::Int,
            "uint" => GlslType::UInt,
            "float" => GlslType::Float,
            "double" => GlslType::Double,
            "vec2" => GlslType::Vec2,
            "vec3" => GlslType::Vec3,
            "vec4" => GlslType::Vec4,
            "ivec2" => GlslType::IVec2,
            "ivec3" => GlslType::IVec3,
            "ivec4" => GlslType::IVec4,
            "uvec2" => GlslType::UVec2,
            "uvec3" => GlslType::UVec3,
            "uvec4" => GlslType::UVec4,
            "mat2" | "mat2x2" => GlslType::Mat2,
            "mat3" | "mat3x3" => GlslType::Mat3,
            "mat4" | "mat4x4" => GlslType::Mat4,
            "sampler2D" => GlslType::Sampler2D,
            "sampler3D" => GlslType::Sampler3D,
            "samplerCube" => GlslType::SamplerCube,
            "sampler2DArray" => GlslType::Sampler2DArray,
            "sampler2DShadow" => GlslType::Sampler2DShadow,
            _ => return None,
        };
        Some(ty)
    }

    /// Map a GL type enum as returned by active resource queries.
    pub fn from_gl(value: u32) -> Self {
        match value {
            gl::BOOL => GlslType::Bool,
            gl::INT => GlslType::Int,
            gl::UNSIGNED_INT => GlslType::UInt,
            gl::FLOAT => GlslType::Float,
            gl::DOUBLE => GlslType::Double,
            gl::FLOAT_VEC2 => GlslType::Vec2,
            gl::FLOAT_VEC3 => GlslType::Vec3,
            gl::FLOAT_VEC4 => GlslType::Vec4,
            gl::INT_VEC2 => GlslType::IVec2,
            gl::INT_VEC3 => GlslType::IVec3,
            gl::INT_VEC4 => GlslType::IVec4,
            gl::UNSIGNED_INT_VEC2 => GlslType::UVec2,
            gl::UNSIGNED_INT_VEC3 => GlslType::UVec3,
            gl::UNSIGNED_INT_VEC4 => GlslType::UVec4,
            gl::FLOAT_MAT2 => GlslType::Mat2,
            gl::FLOAT_MAT3 => GlslType::Mat3,
            gl::FLOAT_MAT4 => GlslType::Mat4,
            gl::SAMPLER_2D => GlslType::Sampler2D,
            gl::SAMPLER_3D => GlslType::Sampler3D,
            gl::SAMPLER_CUBE => GlslType::SamplerCube,
            gl::SAMPLER_2D_ARRAY => GlslType::Sampler2DArray,
            gl::SAMPLER_2D_SHADOW => GlslType::Sampler2DShadow,
            other => GlslType::Other(other),
        }
    }

    pub fn is_sampler(&self) -> bool {
        matches!(
            self,
            GlslType::Sampler2D
                | GlslType::Sampler3D
                | GlslType::SamplerCube
                | GlslType::Sampler2DArray
                | GlslType::Sampler2DShadow
        )
    }
}

/// Raw GL enum values needed by backend-independent code.
///
/// Kept here so the dummy backend and type mapping work without the `glow`
/// feature.
pub(crate) mod gl {
    pub const BOOL: u32 = 0x8B56;
    pub const INT: u32 = 0x1404;
    pub const UNSIGNED_INT: u32 = 0x1405;
    pub const FLOAT: u32 = 0x1406;
    pub const DOUBLE: u32 = 0x140A;
    pub const FLOAT_VEC2: u32 = 0x8B50;
    pub const FLOAT_VEC3: u32 = 0x8B51;
    pub const FLOAT_VEC4: u32 = 0x8B52;
    pub const INT_VEC2: u32 = 0x8B53;
    pub const INT_VEC3: u32 = 0x8B54;
    pub const INT_VEC4: u32 = 0x8B55;
    pub const UNSIGNED_INT_VEC2: u32 = 0x8DC6;
    pub const UNSIGNED_INT_VEC3: u32 = 0x8DC7;
    pub const UNSIGNED_INT_VEC4: u32 = 0x8DC8;
    pub const FLOAT_MAT2: u32 = 0x8B5A;
    pub const FLOAT_MAT3: u32 = 0x8B5B;
    pub const FLOAT_MAT4: u32 = 0x8B5C;
    pub const SAMPLER_2D: u32 = 0x8B5E;
    pub const SAMPLER_3D: u32 = 0x8B5F;
    pub const SAMPLER_CUBE: u32 = 0x8B60;
    pub const SAMPLER_2D_SHADOW: u32 = 0x8B62;
    pub const SAMPLER_2D_ARRAY: u32 = 0x8DC1;
}

/// A server-side capability toggled with enable/disable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Blend,
    CullFace,
    DepthTest,
    DepthClamp,
    ScissorTest,
    StencilTest,
    Multisample,
    PolygonOffsetFill,
    ProgramPointSize,
    FramebufferSrgb,
    RasterizerDiscard,
    SampleAlphaToCoverage,
    TextureCubeMapSeamless,
    /// User clip plane `gl_ClipDistance[i]`
    ClipDistance(u32),
}

bitflags! {
    /// Buffers affected by a single clear call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Viewport rectangle in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Viewport covering a `width` x `height` surface from the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Entry of a framebuffer's draw-buffer table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawBuffer {
    /// Fragment output at this index is discarded
    None,
    /// Fragment output at this index is written to the given color attachment slot
    Color(u32),
}

/// Framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Color(u32),
    Depth,
}

/// Framebuffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    Read,
    Draw,
}

/// Result of a framebuffer completeness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    Unsupported,
    Other(u32),
}

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
    Patches,
}

/// Index format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    Uint16,
    #[default]
    Uint32,
}

impl IndexFormat {
    pub fn size(&self) -> usize {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Sized internal storage format of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    R8,
    Rgba8,
    R16F,
    Rg16F,
    Rgb16F,
    Rgba16F,
    R32F,
    Rg32F,
    Rgb32F,
    Rgba32F,
    Depth24,
    Depth32F,
}

impl InternalFormat {
    pub fn is_depth(&self) -> bool {
        matches!(self, InternalFormat::Depth24 | InternalFormat::Depth32F)
    }
}

/// Layout of host pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
    Depth,
}

impl PixelFormat {
    pub fn components(&self) -> usize {
        match self {
            PixelFormat::Red | PixelFormat::Depth => 1,
            PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Component type of host pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    HalfFloat,
    Float,
}

impl PixelType {
    pub fn size(&self) -> usize {
        match self {
            PixelType::UnsignedByte => 1,
            PixelType::HalfFloat => 2,
            PixelType::Float => 4,
        }
    }
}

/// How texture storage is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureStorage {
    /// Re-specifiable storage (`glTexImage2D`)
    #[default]
    Mutable,
    /// Fixed storage allocated once (`glTexStorage2D`)
    Immutable,
}

/// Filter mode for texture sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Address mode for texture sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Texture descriptor
#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub internal_format: InternalFormat,
    pub format: PixelFormat,
    pub ty: PixelType,
    pub storage: TextureStorage,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub address_mode: AddressMode,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            internal_format: InternalFormat::Rgba8,
            format: PixelFormat::Rgba,
            ty: PixelType::UnsignedByte,
            storage: TextureStorage::Mutable,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        }
    }
}

impl TextureDescriptor {
    /// Size in bytes of a tightly packed upload for this descriptor.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.components() * self.ty.size()
    }
}

/// Float vertex attribute pulled from the currently bound vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
    /// 0 advances per vertex, N advances every N instances
    pub divisor: u32,
}

/// Standard vertex with position, normal and UV
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn layout() -> [VertexAttribute; 3] {
        let stride = std::mem::size_of::<Self>() as u32;
        [
            VertexAttribute {
                location: 0,
                components: 3,
                stride,
                offset: 0,
                divisor: 0,
            },
            VertexAttribute {
                location: 1,
                components: 3,
                stride,
                offset: 12,
                divisor: 0,
            },
            VertexAttribute {
                location: 2,
                components: 2,
                stride,
                offset: 24,
                divisor: 0,
            },
        ]
    }
}

/// A value uploaded to a uniform location
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    Vec2Array(Vec<Vec2>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
}

impl UniformValue {
    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Bool(_) => "bool",
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) => "float",
            UniformValue::Double(_) => "double",
            UniformValue::IVec2(_) => "ivec2",
            UniformValue::IVec3(_) => "ivec3",
            UniformValue::IVec4(_) => "ivec4",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Vec2Array(_) => "vec2[]",
            UniformValue::Vec3Array(_) => "vec3[]",
            UniformValue::Vec4Array(_) => "vec4[]",
        }
    }

    /// Whether this value can be uploaded to a uniform of type `ty`.
    pub fn matches(&self, ty: GlslType) -> bool {
        match self {
            UniformValue::Bool(_) => matches!(ty, GlslType::Bool),
            UniformValue::Int(_) => {
                matches!(ty, GlslType::Int | GlslType::Bool) || ty.is_sampler()
            }
            UniformValue::Float(_) => ty == GlslType::Float,
            UniformValue::Double(_) => matches!(ty, GlslType::Double | GlslType::Float),
            UniformValue::IVec2(_) => ty == GlslType::IVec2,
            UniformValue::IVec3(_) => ty == GlslType::IVec3,
            UniformValue::IVec4(_) => ty == GlslType::IVec4,
            UniformValue::Vec2(_) | UniformValue::Vec2Array(_) => ty == GlslType::Vec2,
            UniformValue::Vec3(_) | UniformValue::Vec3Array(_) => ty == GlslType::Vec3,
            UniformValue::Vec4(_) | UniformValue::Vec4Array(_) => ty == GlslType::Vec4,
            UniformValue::Mat2(_) => ty == GlslType::Mat2,
            UniformValue::Mat3(_) => ty == GlslType::Mat3,
            UniformValue::Mat4(_) => ty == GlslType::Mat4,
        }
    }
}

macro_rules! uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

uniform_from!(
    bool => Bool,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
    Vec<Vec2> => Vec2Array,
    Vec<Vec3> => Vec3Array,
    Vec<Vec4> => Vec4Array,
);

impl From<&[Vec2]> for UniformValue {
    fn from(value: &[Vec2]) -> Self {
        UniformValue::Vec2Array(value.to_vec())
    }
}

impl From<&[Vec3]> for UniformValue {
    fn from(value: &[Vec3]) -> Self {
        UniformValue::Vec3Array(value.to_vec())
    }
}

impl From<&[Vec4]> for UniformValue {
    fn from(value: &[Vec4]) -> Self {
        UniformValue::Vec4Array(value.to_vec())
    }
}

/// An active uniform or vertex input reported by a linked program
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVariable {
    pub name: String,
    pub ty: GlslType,
    pub location: u32,
    /// Number of array elements, 1 for non-arrays
    pub size: u32,
}

/// Device limits relevant to target and texture-unit management
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    pub max_color_attachments: u32,
    pub max_draw_buffers: u32,
    pub max_texture_units: u32,
}

impl DeviceLimits {
    /// Highest usable color slot count: every slot needs both an attachment
    /// point and an entry in the draw-buffer table.
    pub fn color_target_limit(&self) -> u32 {
        self.max_color_attachments.min(self.max_draw_buffers)
    }
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_color_attachments: 8,
            max_draw_buffers: 8,
            max_texture_units: 16,
        }
    }
}
