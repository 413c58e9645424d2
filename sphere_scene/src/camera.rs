//! First-person camera rig. The rig keeps a position plus orthonormal
//! forward/up vectors and hands the renderer a right-handed view matrix;
//! arrow-key handling in the viewer maps onto `move_forward` and
//! `rotate_world_y`.

use glam::{Mat3, Mat4, Vec3};

#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
}

impl CameraRig {
    /// Rig at the origin looking down -Z with +Y up.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Translate along the current forward vector. Negative distances walk
    /// backward.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.forward * distance;
    }

    /// Rotate the rig about the world +Y axis. Positive angles turn left
    /// when looking down -Z.
    pub fn rotate_world_y(&mut self, radians: f32) {
        let rotation = Mat3::from_rotation_y(radians);
        self.forward = (rotation * self.forward).normalize();
        self.up = (rotation * self.up).normalize();
        self.reorthonormalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    // Accumulated float error would slowly shear the basis; rebuild `up`
    // from the forward/right plane after every rotation.
    fn reorthonormalize(&mut self) {
        let right = self.forward.cross(self.up);
        if right.length_squared() <= f32::EPSILON {
            self.up = Vec3::Y;
            return;
        }
        self.up = right.cross(self.forward).normalize();
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(
            (a - b).length() < 1e-5,
            "expected {b:?}, got {a:?} (delta {})",
            (a - b).length()
        );
    }

    #[test]
    fn moves_along_forward_axis() {
        let mut rig = CameraRig::new();
        rig.move_forward(0.1);
        assert_close(rig.position(), Vec3::new(0.0, 0.0, -0.1));

        rig.move_forward(-0.3);
        assert_close(rig.position(), Vec3::new(0.0, 0.0, 0.2));
    }

    #[test]
    fn quarter_turn_left_faces_negative_x() {
        let mut rig = CameraRig::new();
        rig.rotate_world_y(FRAC_PI_2);
        assert_close(rig.forward(), Vec3::NEG_X);

        rig.move_forward(1.0);
        assert_close(rig.position(), Vec3::NEG_X);
    }

    #[test]
    fn basis_stays_orthonormal_under_churn() {
        let mut rig = CameraRig::new();
        for step in 0..720 {
            rig.rotate_world_y(5_f32.to_radians());
            if step % 3 == 0 {
                rig.move_forward(0.1);
            }
        }
        assert!((rig.forward.length() - 1.0).abs() < 1e-4);
        assert!((rig.up.length() - 1.0).abs() < 1e-4);
        assert!(rig.forward.dot(rig.up).abs() < 1e-4);
    }

    #[test]
    fn view_matrix_looks_down_forward() {
        let mut rig = CameraRig::new();
        rig.move_forward(-2.0);

        // A point ahead of the camera lands on the view-space -Z axis.
        let view = rig.view_matrix();
        let ahead = view.transform_point3(Vec3::new(0.0, 0.0, -3.0));
        assert!(ahead.z < 0.0);
        assert!(ahead.x.abs() < 1e-5 && ahead.y.abs() < 1e-5);
    }
}
