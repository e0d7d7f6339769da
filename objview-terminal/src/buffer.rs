/// Owned vertex buffers uploaded from a model's flat streams
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;
use nalgebra::Vector3;
use objview_core::mesh::{FLOATS_PER_NORMAL, FLOATS_PER_VERTEX, NORMAL, POSITION, TEX_COORD};
use thiserror::Error;

static NEXT_BUFFER_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Error, Debug, PartialEq)]
pub enum BufferError {
    #[error("vertex stream of {0} floats is not a whole number of triangles")]
    PartialTriangle(usize),
    #[error("normal stream has {normals} floats for {vertices} vertices")]
    NormalMismatch { normals: usize, vertices: usize },
}

/// The renderer's copy of a mesh: an interleaved position/texcoord buffer
/// and an optional normal buffer, read through the shared attribute layout.
///
/// Released exactly once, either by [`MeshBuffers::release`] or on drop.
#[derive(Debug)]
pub struct MeshBuffers {
    id: u32,
    triangles: Vec<f32>,
    normals: Option<Vec<f32>>,
    released: bool,
}

impl MeshBuffers {
    pub fn upload(triangles: &[f32], normals: &[f32]) -> Result<Self, BufferError> {
        if triangles.len() % (3 * FLOATS_PER_VERTEX) != 0 {
            return Err(BufferError::PartialTriangle(triangles.len()));
        }
        let vertices = triangles.len() / FLOATS_PER_VERTEX;
        if !normals.is_empty() && normals.len() != vertices * FLOATS_PER_NORMAL {
            return Err(BufferError::NormalMismatch {
                normals: normals.len(),
                vertices,
            });
        }

        let id = NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed);
        debug!("Uploaded buffer {} with {} vertices", id, vertices);
        Ok(Self {
            id,
            triangles: triangles.to_vec(),
            normals: (!normals.is_empty()).then(|| normals.to_vec()),
            released: false,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() / FLOATS_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn position(&self, vertex: usize) -> Option<Vector3<f32>> {
        POSITION
            .read(&self.triangles, vertex)
            .map(|p| Vector3::new(p[0], p[1], p[2]))
    }

    pub fn tex_coord(&self, vertex: usize) -> Option<[f32; 2]> {
        TEX_COORD.read(&self.triangles, vertex).map(|t| [t[0], t[1]])
    }

    pub fn normal(&self, vertex: usize) -> Option<Vector3<f32>> {
        let normals = self.normals.as_deref()?;
        NORMAL
            .read(normals, vertex)
            .map(|n| Vector3::new(n[0], n[1], n[2]))
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.triangles = Vec::new();
        self.normals = None;
        self.released = true;
        debug!("Released buffer {}", self.id);
    }
}

impl Drop for MeshBuffers {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objview_core::{MeshOptions, Model};

    fn triangle_model() -> Model {
        Model::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", MeshOptions::default()).unwrap()
    }

    #[test]
    fn test_upload_reads_through_layout() {
        let model = triangle_model();
        let buffers = MeshBuffers::upload(model.triangles(), model.normals()).unwrap();
        assert_eq!(buffers.vertex_count(), 3);
        assert_eq!(buffers.triangle_count(), 1);
        assert_eq!(buffers.position(1), Some(Vector3::new(1.0, 0.0, 0.0)));
        assert!(buffers.tex_coord(2).is_some());
        assert_eq!(buffers.normal(0), Some(Vector3::new(0.0, 0.0, 1.0)));
        assert_eq!(buffers.position(3), None);
    }

    #[test]
    fn test_upload_rejects_partial_streams() {
        assert_eq!(
            MeshBuffers::upload(&[0.0; 10], &[]).unwrap_err(),
            BufferError::PartialTriangle(10)
        );
        assert_eq!(
            MeshBuffers::upload(&[0.0; 15], &[0.0; 3]).unwrap_err(),
            BufferError::NormalMismatch {
                normals: 3,
                vertices: 3
            }
        );
    }

    #[test]
    fn test_normals_are_optional() {
        let buffers = MeshBuffers::upload(&[0.0; 15], &[]).unwrap();
        assert!(!buffers.has_normals());
        assert_eq!(buffers.normal(0), None);
    }

    #[test]
    fn test_release_once() {
        let model = triangle_model();
        let mut buffers = MeshBuffers::upload(model.triangles(), model.normals()).unwrap();
        let other = MeshBuffers::upload(model.triangles(), model.normals()).unwrap();
        assert_ne!(buffers.id(), other.id());

        buffers.release();
        assert!(buffers.is_released());
        assert_eq!(buffers.vertex_count(), 0);
        buffers.release();
        assert!(buffers.is_released());
    }
}
