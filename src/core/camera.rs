//! Cameras observed by the visibility baker

use crate::core::types::{Vec3, Mat4, Quat, UVec2};

/// Identity of a camera, used to detect camera switches between frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CameraId(pub u64);

/// Camera with position, rotation, and projection parameters.
///
/// The world is Z-up: landscape heights are measured along +Z.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Identity of this camera
    pub id: CameraId,
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(id: CameraId, position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            id,
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 5000.0,
        }
    }

    /// Create camera looking at a target
    pub fn look_at(id: CameraId, position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));

        Self {
            id,
            position,
            rotation,
            fov_y: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 5000.0,
        }
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio from a viewport size in pixels
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(
            CameraId::default(),
            Vec3::new(0.0, -50.0, 50.0),
            Vec3::ZERO,
            Vec3::Z,
        )
    }
}

/// Supplies the cameras the baker observes.
///
/// Implemented by the surrounding scene code.
pub trait CameraProvider {
    /// Camera the overlay is gathered for (the scene's draw camera)
    fn observing_camera(&self) -> Option<&Camera>;

    /// Camera currently driving the view; defaults to the observing camera
    fn current_camera(&self) -> Option<&Camera> {
        self.observing_camera()
    }

    /// Framebuffer size in pixels
    fn viewport_size(&self) -> UVec2;
}
