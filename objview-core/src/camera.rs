/// First-person camera driven by discrete movement commands
use nalgebra::{Matrix4, Vector3};

use crate::transform::Transform;

/// Distance travelled per movement command
pub const SPEED: f32 = 0.1;
/// Change applied to one component of `front` per rotation command
pub const ROT_SPEED: f32 = 0.02;
/// Up hint used to derive the strafing axis
pub const DEFAULT_UP: Vector3<f32> = Vector3::new(0.0, 0.5, 0.0);

/// A single movement command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    PitchUp,
    PitchDown,
    RotateRight,
    RotateLeft,
}

/// Camera state: position plus the `front`/`up` vectors fed to the view matrix.
///
/// Rotations nudge a Cartesian component of `front` rather than rotating it
/// around an axis, so `front` is not kept unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vector3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    side: Vector3<f32>,
}

impl Camera {
    pub fn new(position: Vector3<f32>, front: Vector3<f32>, up: Vector3<f32>) -> Self {
        Self {
            position,
            front,
            up,
            side: front.cross(&DEFAULT_UP).normalize(),
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn side(&self) -> Vector3<f32> {
        self.side
    }

    /// Look-at transform from `position` towards `position + front`
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::look_at(&self.position, &(self.position + self.front), &self.up)
    }

    /// Replace position, front and up at once and return the new view
    pub fn reset(&mut self, position: Vector3<f32>, front: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
        self.position = position;
        self.front = front;
        self.up = up;
        self.view_matrix()
    }

    pub fn apply(&mut self, movement: Movement) {
        match movement {
            Movement::Forward => self.position += self.front * SPEED,
            Movement::Backward => self.position -= self.front * SPEED,
            Movement::Left => self.position -= self.side * SPEED,
            Movement::Right => self.position += self.side * SPEED,
            Movement::Up => self.position += self.up * SPEED,
            Movement::Down => self.position -= self.up * SPEED,
            Movement::PitchUp => self.front.y += ROT_SPEED,
            Movement::PitchDown => self.front.y -= ROT_SPEED,
            Movement::RotateRight => self.front.x += ROT_SPEED,
            Movement::RotateLeft => self.front.x -= ROT_SPEED,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vector3::new(0.0, 0.0, 3.0),
            Vector3::new(0.0, 0.0, -1.0),
            DEFAULT_UP,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < 1e-6
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::default();
        assert!(close(camera.side(), Vector3::new(1.0, 0.0, 0.0)));

        let view = camera.view_matrix();
        assert!((view[(2, 3)] + 3.0).abs() < 1e-6);
        assert!((view[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((view[(1, 1)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_translation_commands() {
        let mut camera = Camera::default();
        camera.apply(Movement::Forward);
        assert!(close(camera.position(), Vector3::new(0.0, 0.0, 2.9)));
        camera.apply(Movement::Backward);
        assert!(close(camera.position(), Vector3::new(0.0, 0.0, 3.0)));

        camera.apply(Movement::Right);
        assert!(close(camera.position(), Vector3::new(0.1, 0.0, 3.0)));
        camera.apply(Movement::Left);
        camera.apply(Movement::Left);
        assert!(close(camera.position(), Vector3::new(-0.1, 0.0, 3.0)));

        camera.apply(Movement::Up);
        assert!(close(camera.position(), Vector3::new(-0.1, 0.05, 3.0)));
        camera.apply(Movement::Down);
        assert!(close(camera.position(), Vector3::new(-0.1, 0.0, 3.0)));
    }

    #[test]
    fn test_rotation_commands_nudge_front() {
        let mut camera = Camera::default();
        camera.apply(Movement::PitchUp);
        camera.apply(Movement::RotateRight);
        camera.apply(Movement::RotateRight);
        assert!(close(camera.front(), Vector3::new(0.04, 0.02, -1.0)));

        camera.apply(Movement::PitchDown);
        camera.apply(Movement::RotateLeft);
        assert!(close(camera.front(), Vector3::new(0.02, 0.0, -1.0)));

        // strafing axis is fixed at construction
        assert!(close(camera.side(), Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reset_returns_new_view() {
        let mut camera = Camera::default();
        let view = camera.reset(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert!((view[(2, 3)] + 10.0).abs() < 1e-6);
        assert_eq!(view, camera.view_matrix());
    }
}
