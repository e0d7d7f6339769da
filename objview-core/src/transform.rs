/// 4x4 transformation matrices and rotation state
///
/// Matrices are `nalgebra::Matrix4<f32>`, stored column-major: element
/// `(row, col)` lives at `as_slice()[row + col * 4]`, which is the layout the
/// renderer uploads as-is.
use nalgebra::{Matrix4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4<f32> {
        Self::scale(1.0)
    }

    /// Uniform scale on x, y and z. `w` stays 1 so points keep their
    /// homogeneous weight; this differs from a scalar matrix with `factor`
    /// on all four diagonal entries.
    pub fn scale(factor: f32) -> Matrix4<f32> {
        let mut data = [0.0; 16];
        data[0] = factor;
        data[5] = factor;
        data[10] = factor;
        data[15] = 1.0;
        Matrix4::from_column_slice(&data)
    }

    /// Row-by-column product `a * b`
    pub fn multiply(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
        a * b
    }

    /// Adds `offset` into the last column of `matrix`
    pub fn translate(matrix: &Matrix4<f32>, offset: &Vector3<f32>) -> Matrix4<f32> {
        let mut result = *matrix;
        result[(0, 3)] += offset.x;
        result[(1, 3)] += offset.y;
        result[(2, 3)] += offset.z;
        result
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    ///
    /// Rows are `s`, `u` and `-f`; the forward row's translation term is
    /// `dot(f, eye)`, not negated like the other two.
    pub fn look_at(eye: &Vector3<f32>, target: &Vector3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(&f);

        #[rustfmt::skip]
        let view = Matrix4::new(
            s.x, s.y, s.z, -s.dot(eye),
            u.x, u.y, u.z, -u.dot(eye),
            -f.x, -f.y, -f.z, f.dot(eye),
            0.0, 0.0, 0.0, 1.0,
        );
        view
    }

    /// Right-handed perspective projection with a [-1, 1] depth range.
    /// `fov` is the vertical field of view in radians.
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov / 2.0).tan();
        let mut data = [0.0; 16];
        data[0] = f / aspect;
        data[5] = f;
        data[10] = (far + near) / (near - far);
        data[11] = -1.0;
        data[14] = (2.0 * far * near) / (near - far);
        Matrix4::from_column_slice(&data)
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    /// Rotation about `center` instead of the origin
    pub fn model_matrix(center: &Vector3<f32>, rotation: &RotationState) -> Matrix4<f32> {
        let to_center = Self::translate(&Self::identity(), center);
        let from_center = Self::translate(&Self::identity(), &-center);
        to_center * Self::rotation_matrix(rotation) * from_center
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }

    /// Flat column-major copy, ready for a uniform upload
    pub fn column_major(matrix: &Matrix4<f32>) -> [f32; 16] {
        let mut data = [0.0; 16];
        data.copy_from_slice(matrix.as_slice());
        data
    }
}
