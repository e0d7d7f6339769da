/// Raw geometry as it appears in an OBJ file
use nalgebra::Vector3;

/// A `v` directive. `tex_coord` starts out as the planar `(x, y)` projection
/// of the position and is replaced by the mesh builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl RawVertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            tex_coord: [x, y],
        }
    }

    /// Spherical UV: `theta = atan2(z, x)`, `phi = acos(y / |v|)`, mapped to
    /// `u = (theta + pi) / 2pi`, `v = phi / pi`.
    pub fn spherical_uv(&self) -> [f32; 2] {
        use std::f32::consts::PI;

        let [x, y, z] = self.position;
        let theta = z.atan2(x);
        let length = (x * x + y * y + z * z).sqrt();
        let phi = if length > 0.0 { (y / length).acos() } else { 0.0 };
        [(theta + PI) / (2.0 * PI), phi / PI]
    }
}

/// A `vt` directive. `w` is parsed when present but unused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

/// One corner of a face: 0-based indices, already validated against the
/// arrays that existed when the face was read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceIndex {
    pub vertex: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

/// How a face writes its corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceFormat {
    /// `f 1 2 3`
    Plain,
    /// `f 1/1 2/2 3/3`, `f 1//1 ...` or `f 1/1/1 ...`
    Slashed,
}

/// An `f` directive with three or more corners
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: Vec<FaceIndex>,
    pub format: FaceFormat,
}

impl Face {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Fan triangulation as corner positions: `{0, i, i + 1}` for `i` in
    /// `1..n - 1`. Yields nothing for faces with fewer than 3 corners.
    pub fn fan(&self) -> impl Iterator<Item = [usize; 3]> {
        (1..self.len().saturating_sub(1)).map(|i| [0, i, i + 1])
    }

    /// Fan triangulation resolved to the face's corners
    pub fn triangles(&self) -> impl Iterator<Item = [FaceIndex; 3]> + '_ {
        self.fan().map(|triangle| triangle.map(|corner| self.indices[corner]))
    }
}

/// Flat normal of a triangle given its three positions
pub fn face_normal(positions: [[f32; 3]; 3]) -> Vector3<f32> {
    let v0 = Vector3::from(positions[0]);
    let v1 = Vector3::from(positions[1]);
    let v2 = Vector3::from(positions[2]);

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}
