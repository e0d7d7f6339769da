/// Flattening parsed OBJ data into GPU-ready triangle streams
use log::{debug, warn};
use nalgebra::Vector3;

use crate::geometry::{face_normal, FaceIndex};
use crate::obj::ObjData;

/// Floats per emitted vertex in the triangle stream (`x, y, z, u, v`)
pub const FLOATS_PER_VERTEX: usize = 5;
/// Floats per emitted vertex in the normal stream
pub const FLOATS_PER_NORMAL: usize = 3;

/// Which of the two buffers an attribute is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSlot {
    Triangles,
    Normals,
}

/// One vertex attribute as a shader sees it. Strides and offsets are counted
/// in floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: usize,
    pub stride: usize,
    pub offset: usize,
    pub buffer: BufferSlot,
}

impl VertexAttribute {
    pub fn stride_bytes(&self) -> usize {
        self.stride * std::mem::size_of::<f32>()
    }

    pub fn offset_bytes(&self) -> usize {
        self.offset * std::mem::size_of::<f32>()
    }

    /// The attribute's components for the `vertex`-th element of `data`
    pub fn read<'a>(&self, data: &'a [f32], vertex: usize) -> Option<&'a [f32]> {
        let start = vertex * self.stride + self.offset;
        data.get(start..start + self.components)
    }
}

pub const POSITION: VertexAttribute = VertexAttribute {
    location: 0,
    components: 3,
    stride: FLOATS_PER_VERTEX,
    offset: 0,
    buffer: BufferSlot::Triangles,
};

pub const TEX_COORD: VertexAttribute = VertexAttribute {
    location: 1,
    components: 2,
    stride: FLOATS_PER_VERTEX,
    offset: 3,
    buffer: BufferSlot::Triangles,
};

pub const NORMAL: VertexAttribute = VertexAttribute {
    location: 2,
    components: 3,
    stride: FLOATS_PER_NORMAL,
    offset: 0,
    buffer: BufferSlot::Normals,
};

/// Attribute layout shared with the shaders, in location order
pub const VERTEX_LAYOUT: [VertexAttribute; 3] = [POSITION, TEX_COORD, NORMAL];

/// Where texture coordinates come from for corners without a `vt` reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UvMode {
    /// Spherical projection of the vertex position
    #[default]
    Spherical,
    /// The vertex's `(x, y)` position
    Planar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshOptions {
    pub uv_mode: UvMode,
}

/// Triangulated, interleaved geometry. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<f32>,
    normals: Vec<f32>,
}

impl Mesh {
    /// Interleaved `x, y, z, u, v` per vertex, three vertices per triangle
    pub fn triangles(&self) -> &[f32] {
        &self.triangles
    }

    /// `nx, ny, nz` per vertex, aligned with [`Mesh::triangles`]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() / FLOATS_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Average of all emitted positions
    pub fn center(&self) -> Vector3<f32> {
        let count = self.vertex_count();
        if count == 0 {
            return Vector3::zeros();
        }
        let sum = self
            .triangles
            .chunks_exact(FLOATS_PER_VERTEX)
            .fold(Vector3::zeros(), |acc, v| acc + Vector3::new(v[0], v[1], v[2]));
        sum / count as f32
    }
}

/// Turns [`ObjData`] into a [`Mesh`].
///
/// Texture coordinates live in a per-vertex table: it is seeded from the
/// position, optionally replaced by the spherical fallback, and then every
/// face corner with a `vt` reference overwrites its vertex's entry before the
/// corner is emitted. Later faces therefore see the last value written.
pub struct MeshBuilder<'a> {
    data: &'a ObjData,
    options: MeshOptions,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(data: &'a ObjData) -> Self {
        Self {
            data,
            options: MeshOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MeshOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(&self) -> Mesh {
        let mut uvs = self.seed_uvs();
        let mut mesh = Mesh::default();
        let mut dropped = 0;

        for (face_number, face) in self.data.faces.iter().enumerate() {
            if face.len() < 3 {
                warn!(
                    "Invalid face {} with {} indices encountered. Ignoring.",
                    face_number,
                    face.len()
                );
                dropped += 1;
                continue;
            }
            if !face.indices.iter().all(|index| self.in_range(index)) {
                warn!("Face {} references undefined data. Ignoring.", face_number);
                dropped += 1;
                continue;
            }

            let corners: Vec<[f32; 5]> = face
                .indices
                .iter()
                .map(|index| self.resolve_corner(index, &mut uvs))
                .collect();

            for (i, triangle) in face.fan().enumerate() {
                let vertices = triangle.map(|c| corners[c]);
                let flat = face_normal(vertices.map(|v| [v[0], v[1], v[2]]));

                for (&corner, vertex) in triangle.iter().zip(vertices) {
                    mesh.triangles.extend_from_slice(&vertex);
                    let normal = face.indices[corner]
                        .normal
                        .map(|n| self.data.normals[n])
                        .unwrap_or([flat.x, flat.y, flat.z]);
                    mesh.normals.extend_from_slice(&normal);
                }
                debug!("Face {} triangle {}: {:?}", face_number, i, triangle);
            }
        }

        if dropped > 0 {
            warn!("Dropped {} invalid faces", dropped);
        }
        debug!(
            "Built mesh with {} triangles from {} faces",
            mesh.triangle_count(),
            self.data.faces.len()
        );
        mesh
    }

    fn seed_uvs(&self) -> Vec<[f32; 2]> {
        self.data
            .vertices
            .iter()
            .map(|vertex| match self.options.uv_mode {
                UvMode::Spherical => vertex.spherical_uv(),
                UvMode::Planar => vertex.tex_coord,
            })
            .collect()
    }

    fn in_range(&self, index: &FaceIndex) -> bool {
        index.vertex < self.data.vertices.len()
            && index.tex_coord.map_or(true, |t| t < self.data.tex_coords.len())
            && index.normal.map_or(true, |n| n < self.data.normals.len())
    }

    fn resolve_corner(&self, index: &FaceIndex, uvs: &mut [[f32; 2]]) -> [f32; 5] {
        if let Some(t) = index.tex_coord {
            let tex_coord = self.data.tex_coords[t];
            uvs[index.vertex] = [tex_coord.u, tex_coord.v];
        }
        let [x, y, z] = self.data.vertices[index.vertex].position;
        let [u, v] = uvs[index.vertex];
        [x, y, z, u, v]
    }
}
