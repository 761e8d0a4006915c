//! Mesh data generation and GPU meshes
//!
//! [`MeshData`] is CPU-side geometry produced by free generators. [`Mesh`] is
//! the drawable a render pass consumes: a vertex array plus counts and the
//! primitive kind, drawn by one function regardless of the shape.

use glam::{Vec2, Vec3};

use crate::backend::types::*;
use crate::backend::{BackendResult, GlBackend};
use crate::context::GpuContext;

/// Geometry in host memory
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub primitive: PrimitiveKind,
    pub name: String,
}

impl MeshData {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            primitive: PrimitiveKind::Triangles,
            name: name.to_string(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn push_quad(&mut self, base: u32) {
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Screen-covering quad in normalized device coordinates
pub fn quad() -> MeshData {
    let mut mesh = MeshData::new("quad");
    let corners = [
        (Vec2::new(-1.0, -1.0), Vec2::new(0.0, 0.0)),
        (Vec2::new(1.0, -1.0), Vec2::new(1.0, 0.0)),
        (Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)),
        (Vec2::new(-1.0, 1.0), Vec2::new(0.0, 1.0)),
    ];
    for (position, uv) in corners {
        mesh.vertices
            .push(Vertex::new(position.extend(0.0), Vec3::Z, uv));
    }
    mesh.push_quad(0);
    mesh
}

/// Unit cube centered at origin
pub fn cube() -> MeshData {
    let mut mesh = MeshData::new("cube");

    let faces = [
        (Vec3::Z, Vec3::X),
        (-Vec3::Z, -Vec3::X),
        (Vec3::X, -Vec3::Z),
        (-Vec3::X, Vec3::Z),
        (Vec3::Y, Vec3::X),
        (-Vec3::Y, Vec3::X),
    ];

    for (face, (normal, right)) in faces.into_iter().enumerate() {
        let up = normal.cross(right);
        let center = normal * 0.5;
        let corners = [
            (-right - up, Vec2::new(0.0, 1.0)),
            (right - up, Vec2::new(1.0, 1.0)),
            (right + up, Vec2::new(1.0, 0.0)),
            (-right + up, Vec2::new(0.0, 0.0)),
        ];
        for (offset, uv) in corners {
            mesh.vertices
                .push(Vertex::new(center + offset * 0.5, normal, uv));
        }
        mesh.push_quad(face as u32 * 4);
    }

    mesh
}

/// UV sphere of diameter 1
pub fn sphere(segments: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData::new("sphere");

    let segment_angle = std::f32::consts::TAU / segments as f32;
    let ring_angle = std::f32::consts::PI / rings as f32;

    for ring in 0..=rings {
        let phi = ring as f32 * ring_angle;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for segment in 0..=segments {
            let theta = segment as f32 * segment_angle;
            let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
            let uv = Vec2::new(
                segment as f32 / segments as f32,
                ring as f32 / rings as f32,
            );
            mesh.vertices.push(Vertex::new(normal * 0.5, normal, uv));
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            mesh.indices.extend_from_slice(&[
                current,
                next,
                current + 1,
                current + 1,
                next,
                next + 1,
            ]);
        }
    }

    mesh
}

/// Subdivided plane on the XZ axis, facing +Y
pub fn grid(width: f32, depth: f32, subdivisions: u32) -> MeshData {
    let mut mesh = MeshData::new("grid");
    let subdivisions = subdivisions.max(1);

    let step_x = width / subdivisions as f32;
    let step_z = depth / subdivisions as f32;

    for z in 0..=subdivisions {
        for x in 0..=subdivisions {
            let position = Vec3::new(
                -width / 2.0 + x as f32 * step_x,
                0.0,
                -depth / 2.0 + z as f32 * step_z,
            );
            let uv = Vec2::new(
                x as f32 / subdivisions as f32,
                z as f32 / subdivisions as f32,
            );
            mesh.vertices.push(Vertex::new(position, Vec3::Y, uv));
        }
    }

    for z in 0..subdivisions {
        for x in 0..subdivisions {
            let current = z * (subdivisions + 1) + x;
            let next = current + subdivisions + 1;

            mesh.indices.extend_from_slice(&[
                current,
                next,
                current + 1,
                current + 1,
                next,
                next + 1,
            ]);
        }
    }

    mesh
}

/// Cone frustum along +Y centered at the origin. A zero radius omits that cap.
pub fn truncated_cone(
    bottom_radius: f32,
    top_radius: f32,
    height: f32,
    segments: u32,
) -> MeshData {
    let mut mesh = MeshData::new("truncated_cone");

    let half_height = height / 2.0;
    let angle_step = std::f32::consts::TAU / segments as f32;
    // Side normals lean outwards by the slope of the wall
    let slope = (bottom_radius - top_radius) / height;

    for i in 0..=segments {
        let angle = i as f32 * angle_step;
        let (sin, cos) = angle.sin_cos();
        let normal = Vec3::new(cos, slope, sin).normalize();
        let u = i as f32 / segments as f32;

        mesh.vertices.push(Vertex::new(
            Vec3::new(cos * bottom_radius, -half_height, sin * bottom_radius),
            normal,
            Vec2::new(u, 1.0),
        ));
        mesh.vertices.push(Vertex::new(
            Vec3::new(cos * top_radius, half_height, sin * top_radius),
            normal,
            Vec2::new(u, 0.0),
        ));
    }

    for i in 0..segments {
        let base = i * 2;
        mesh.indices.extend_from_slice(&[
            base,
            base + 2,
            base + 1,
            base + 1,
            base + 2,
            base + 3,
        ]);
    }

    for (radius, y, normal) in [
        (top_radius, half_height, Vec3::Y),
        (bottom_radius, -half_height, -Vec3::Y),
    ] {
        if radius <= 0.0 {
            continue;
        }
        let center = mesh.vertices.len() as u32;
        mesh.vertices
            .push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5)));
        for i in 0..=segments {
            let (sin, cos) = (i as f32 * angle_step).sin_cos();
            mesh.vertices.push(Vertex::new(
                Vec3::new(cos * radius, y, sin * radius),
                normal,
                Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
            ));
            if i > 0 {
                let current = center + 1 + i;
                if normal.y > 0.0 {
                    mesh.indices.extend_from_slice(&[center, current, current - 1]);
                } else {
                    mesh.indices.extend_from_slice(&[center, current - 1, current]);
                }
            }
        }
    }

    mesh
}

/// Fill the bound vertex array from `data`.
fn upload_buffers(
    backend: &mut dyn GlBackend,
    data: &MeshData,
    buffers: &mut Vec<BufferHandle>,
) -> BackendResult<()> {
    buffers.push(backend.create_buffer(BufferTarget::Vertex, data.vertex_bytes())?);
    for attribute in Vertex::layout() {
        backend.vertex_attribute(&attribute);
    }
    if !data.indices.is_empty() {
        buffers.push(backend.create_buffer(BufferTarget::Index, data.index_bytes())?);
    }
    Ok(())
}

/// Drawable vertex state on the GPU
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    vertex_array: VertexArrayHandle,
    buffers: Vec<BufferHandle>,
    vertex_count: u32,
    index_count: u32,
    index_format: IndexFormat,
    primitive: PrimitiveKind,
    /// Whether the vertex array and buffers are deleted by `destroy`
    owned: bool,
}

impl Mesh {
    /// Upload `data` with the standard attribute layout: position at 0,
    /// normal at 1, UV at 2.
    pub fn upload(ctx: &mut GpuContext, data: &MeshData) -> BackendResult<Self> {
        let vertex_array = ctx.backend_mut().create_vertex_array()?;
        ctx.bind_vertex_array(Some(vertex_array));

        let mut buffers = Vec::with_capacity(2);
        let result = upload_buffers(ctx.backend_mut(), data, &mut buffers);
        ctx.bind_vertex_array(None);

        let mesh = Self {
            name: data.name.clone(),
            vertex_array,
            buffers,
            vertex_count: data.vertices.len() as u32,
            index_count: data.indices.len() as u32,
            index_format: IndexFormat::Uint32,
            primitive: data.primitive,
            owned: true,
        };
        if let Err(e) = result {
            mesh.destroy(ctx);
            return Err(e);
        }

        log::debug!(
            "Uploaded mesh '{}' ({} vertices, {} indices)",
            mesh.name,
            mesh.vertex_count,
            mesh.index_count
        );
        Ok(mesh)
    }

    /// Wrap a vertex array created elsewhere, e.g. by a model importer. The
    /// caller keeps ownership of its objects.
    pub fn from_raw(
        name: &str,
        vertex_array: VertexArrayHandle,
        vertex_count: u32,
        index_count: u32,
        index_format: IndexFormat,
        primitive: PrimitiveKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            vertex_array,
            buffers: Vec::new(),
            vertex_count,
            index_count,
            index_format,
            primitive,
            owned: false,
        }
    }

    /// Add a float attribute advancing once per instance.
    pub fn add_instance_attribute(
        &mut self,
        ctx: &mut GpuContext,
        location: u32,
        components: u32,
        data: &[f32],
    ) -> BackendResult<()> {
        ctx.bind_vertex_array(Some(self.vertex_array));
        let result = ctx
            .backend_mut()
            .create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(data));
        if let Ok(buffer) = result {
            ctx.backend_mut().vertex_attribute(&VertexAttribute {
                location,
                components,
                stride: components * 4,
                offset: 0,
                divisor: 1,
            });
            self.buffers.push(buffer);
        }
        ctx.bind_vertex_array(None);
        result.map(|_| ())
    }

    pub fn bind(&self, ctx: &mut GpuContext) {
        ctx.bind_vertex_array(Some(self.vertex_array));
    }

    pub fn unbind(&self, ctx: &mut GpuContext) {
        ctx.bind_vertex_array(None);
    }

    /// One indexed draw when the mesh has indices, otherwise an array draw.
    pub fn draw(&self, ctx: &mut GpuContext) {
        self.draw_instanced(ctx, 1);
    }

    /// Zero instances draws nothing and leaves the driver untouched.
    pub fn draw_instanced(&self, ctx: &mut GpuContext, instances: u32) {
        if instances == 0 {
            log::trace!("Skipping draw of '{}' with zero instances", self.name);
            return;
        }
        self.bind(ctx);
        let backend = ctx.backend_mut();
        if self.index_count > 0 {
            backend.draw_elements(self.primitive, self.index_count, self.index_format, instances);
        } else {
            backend.draw_arrays(self.primitive, 0, self.vertex_count, instances);
        }
    }

    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }

    /// Delete owned GPU objects. Meshes built with [`Mesh::from_raw`] are
    /// left to their creator.
    pub fn destroy(self, ctx: &mut GpuContext) {
        if !self.owned {
            return;
        }
        for buffer in &self.buffers {
            ctx.backend_mut().delete_buffer(*buffer);
        }
        ctx.delete_vertex_array(self.vertex_array);
    }
}
