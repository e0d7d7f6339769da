/// Perspective projection and screen-space mapping
use nalgebra::{Matrix4, Vector3, Vector4};

use crate::transform::Transform;

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fov: 45f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 1500.0,
        }
    }

    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        self.fov = degrees.to_radians();
        self
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::perspective(self.fov, self.aspect, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project a point through a full model-view-projection matrix into screen
/// space. Returns `(x, y, depth)` with depth in NDC, or `None` when the point
/// is behind the camera or outside the clip volume.
pub fn project_to_screen(
    point: &Vector3<f32>,
    mvp: &Matrix4<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero depth values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    // Clip test
    if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) || !(-1.0..=1.0).contains(&depth) {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_creation() {
        let projection = Projection::new(800, 600);
        assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!((projection.fov - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(projection.matrix()[(3, 2)], -1.0);
    }

    #[test]
    fn test_project_center_of_view() {
        let projection = Projection::new(100, 100);
        let view = Transform::look_at(
            &Vector3::new(0.0, 0.0, 3.0),
            &Vector3::new(0.0, 0.0, 2.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        let mvp = Transform::mvp_matrix(&Transform::identity(), &view, &projection.matrix());

        let (x, y, depth) = project_to_screen(&Vector3::zeros(), &mvp, 100, 100).unwrap();
        assert!((x - 50.0).abs() < 1e-3);
        assert!((y - 50.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let projection = Projection::new(100, 100);
        let view = Transform::look_at(
            &Vector3::new(0.0, 0.0, 3.0),
            &Vector3::new(0.0, 0.0, 2.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        let mvp = projection.matrix() * view;
        assert!(project_to_screen(&Vector3::new(0.0, 0.0, 5.0), &mvp, 100, 100).is_none());
    }
}
