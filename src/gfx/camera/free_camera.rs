//! # Free-look Camera
//!
//! Continuous vector/matrix camera state: a position, an orthonormal
//! direction frame (front/back/left/right/up/down), Euler yaw/pitch and
//! the derived view and projection matrices.
//!
//! Every mutator recomputes the derived vectors and the view matrix before
//! returning. Uniform uploads read camera state synchronously within the
//! frame, so no lazy invalidation is allowed here.

use cgmath::{
    ortho, perspective, Deg, EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, Point3, Rad,
    SquareMatrix, Vector3,
};

/// Maps cgmath's OpenGL-style clip space (z in -1..1) onto wgpu's
/// (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Centre of projection.
    pub position: Vector3<f32>,
    /// The point the camera is looking at (`position + front`).
    pub view: Vector3<f32>,

    pub front: Vector3<f32>,
    pub back: Vector3<f32>,
    pub left: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub down: Vector3<f32>,
    /// The world's up axis, anchor for the horizontal plane.
    pub world_up: Vector3<f32>,

    /// Euler angles in degrees, consumed by the joystick rotation path.
    pub yaw: f32,
    pub pitch: f32,

    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub movement_speed: f32,
    pub sensitivity: f32,

    pub perspective_projection: Matrix4<f32>,
    pub orthographic_projection: Matrix4<f32>,
    pub view_matrix: Matrix4<f32>,

    znear: f32,
    zfar: f32,
}

impl Camera {
    pub fn new(fov: f32, width: f32, height: f32, znear: f32, zfar: f32) -> Self {
        let mut camera = Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            view: Vector3::new(0.0, 0.0, 0.0),
            front: Vector3::new(0.0, 0.0, -1.0),
            back: Vector3::new(0.0, 0.0, 1.0),
            left: Vector3::new(-1.0, 0.0, 0.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            down: Vector3::new(0.0, -1.0, 0.0),
            world_up: Vector3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            field_of_view: fov,
            movement_speed: 50.0,
            sensitivity: 0.25,
            perspective_projection: Matrix4::identity(),
            orthographic_projection: Matrix4::identity(),
            view_matrix: Matrix4::identity(),
            znear,
            zfar,
        };
        camera.set_perspective_projection(fov, width / height, znear, zfar);
        camera.set_orthographic_projection(width, height, znear, zfar);
        camera.update_vectors();
        camera
    }

    /// Rebuilds the orthonormal frame and the view matrix from `position`,
    /// `front` and `world_up`.
    fn update_vectors(&mut self) {
        self.front = self.front.normalize();
        self.back = -self.front;

        // The cross products shrink toward zero as front approaches
        // world_up, hence the renormalization.
        self.right = self.front.cross(self.world_up).normalize();
        self.left = -self.right;

        self.up = self.right.cross(self.front).normalize();
        self.down = -self.up;

        self.view = self.position + self.front;
        self.view_matrix = Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.view),
            self.up,
        );
    }

    /// Repositions the camera to look from `position` toward `viewpoint`
    /// with `up` seeding the world up axis.
    pub fn set(&mut self, position: Vector3<f32>, viewpoint: Vector3<f32>, up: Vector3<f32>) {
        self.position = position;
        self.front = (viewpoint - position).normalize();
        self.world_up = up.normalize();
        self.update_vectors();
    }

    /// Rotates the look direction about `axis` by `angle` degrees, keeping
    /// the position fixed.
    pub fn rotate_view_point(&mut self, angle: f32, axis: Vector3<f32>) {
        let direction = self.view - self.position;
        let rotation = Matrix4::from_axis_angle(axis.normalize(), Rad::from(Deg(angle)));
        let rotated = rotation * direction.extend(1.0);
        self.front = rotated.truncate().normalize();
        self.update_vectors();
    }

    /// Orbits the camera on a horizontal circle of radius `distance`
    /// around `viewpoint`, at height `height`, continuously looking at the
    /// pivot. Angle 0 places the camera along +X, angle 90 along +Z.
    pub fn rotate_around_point(
        &mut self,
        distance: f32,
        viewpoint: Vector3<f32>,
        angle: f32,
        height: f32,
    ) {
        let radians = Rad::from(Deg(angle)).0;

        let position = Vector3::new(
            viewpoint.x + distance * radians.cos(),
            height,
            viewpoint.z + distance * radians.sin(),
        );

        self.set(position, viewpoint, Vector3::new(0.0, 1.0, 0.0));
    }

    /// Joystick-style look update. The stick direction `angle` (degrees,
    /// 0 = right, 90 = up) and `displacement` (0..1) feed yaw and pitch,
    /// scaled by `sensitivity`. Pitch is clamped shy of the poles so the
    /// frame never degenerates.
    pub fn update_rotation(&mut self, angle: f32, displacement: f32) {
        if displacement.abs() > f32::EPSILON {
            let radians = Rad::from(Deg(angle)).0;
            self.yaw += radians.cos() * displacement * self.sensitivity;
            self.pitch += radians.sin() * displacement * self.sensitivity;
            self.pitch = self.pitch.clamp(-89.0, 89.0);

            let yaw = Rad::from(Deg(self.yaw)).0;
            let pitch = Rad::from(Deg(self.pitch)).0;
            self.front = Vector3::new(
                yaw.cos() * pitch.cos(),
                pitch.sin(),
                yaw.sin() * pitch.cos(),
            );
        }
        self.update_vectors();
    }

    /// Joystick-style movement update integrated over `delta_time`:
    /// pushing up (angle 90) advances along `front`, pushing right
    /// (angle 0) strafes along `right`.
    pub fn update_movement(&mut self, delta_time: f32, angle: f32, displacement: f32) {
        if displacement.abs() > f32::EPSILON {
            let radians = Rad::from(Deg(angle)).0;
            let step = self.movement_speed * delta_time * displacement;
            self.position += self.front * radians.sin() * step;
            self.position += self.right * radians.cos() * step;
        }
        self.update_vectors();
    }

    /// Forward/backward motion along the view ray.
    pub fn advance(&mut self, direction: f32) {
        let speed = 0.025 * direction;
        let forward = (self.view - self.position).normalize();
        self.position += forward * speed;
        self.update_vectors();
    }

    /// Side-to-side motion along the horizontal strafe vector.
    pub fn strafe(&mut self, direction: f32) {
        let speed = 0.025 * direction;
        self.position.x += self.right.x * speed;
        self.position.z += self.right.z * speed;
        self.update_vectors();
    }

    /// A point `distance` units along the view ray.
    pub fn position_in_front(&self, distance: f32) -> Vector3<f32> {
        self.position + self.front * distance
    }

    pub fn set_perspective_projection(&mut self, fov: f32, aspect: f32, znear: f32, zfar: f32) {
        self.field_of_view = fov;
        self.znear = znear;
        self.zfar = zfar;
        self.perspective_projection =
            OPENGL_TO_WGPU_MATRIX * perspective(Deg(fov), aspect, znear, zfar);
    }

    pub fn set_orthographic_projection(&mut self, width: f32, height: f32, znear: f32, zfar: f32) {
        self.orthographic_projection =
            OPENGL_TO_WGPU_MATRIX * ortho(0.0, width, 0.0, height, znear, zfar);
    }

    /// Rebuilds the perspective projection for a new surface size.
    pub fn resize(&mut self, width: f32, height: f32) {
        let aspect = width / height.max(1.0);
        self.perspective_projection =
            OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.field_of_view), aspect, self.znear, self.zfar);
        self.set_orthographic_projection(width, height, self.znear, self.zfar);
    }

    /// Normal matrix in model space: inverse-transpose of the model
    /// matrix's upper-left 3x3. Used by the primitive draw path.
    pub fn normal_matrix_model(model: Matrix4<f32>) -> Matrix3<f32> {
        let m = upper_left_3x3(model);
        m.invert().unwrap_or_else(Matrix3::identity).transpose()
    }

    /// Normal matrix in view space: inverse-transpose of the upper-left
    /// 3x3 of (view x model). Used by the loaded-model draw path; the two
    /// conventions are intentionally kept distinct because the shader
    /// expectations differ between the paths.
    pub fn normal_matrix_view(&self, model: Matrix4<f32>) -> Matrix3<f32> {
        let m = upper_left_3x3(self.view_matrix * model);
        m.invert().unwrap_or_else(Matrix3::identity).transpose()
    }
}

fn upper_left_3x3(m: Matrix4<f32>) -> Matrix3<f32> {
    Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-4;

    fn assert_orthonormal(camera: &Camera) {
        assert!((camera.front.magnitude() - 1.0).abs() < TOL, "front not unit");
        assert!((camera.up.magnitude() - 1.0).abs() < TOL, "up not unit");
        assert!((camera.right.magnitude() - 1.0).abs() < TOL, "right not unit");
        assert!(camera.front.dot(camera.up).abs() < TOL, "front/up not orthogonal");
        assert!(camera.front.dot(camera.right).abs() < TOL, "front/right not orthogonal");
        assert!(camera.up.dot(camera.right).abs() < TOL, "up/right not orthogonal");
    }

    fn test_camera() -> Camera {
        Camera::new(45.0, 800.0, 600.0, 0.1, 1000.0)
    }

    #[test]
    fn test_frame_orthonormal_after_construction() {
        let camera = test_camera();
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_frame_orthonormal_after_mutator_sequence() {
        let mut camera = test_camera();
        camera.set(
            Vector3::new(0.0, 4.0, -15.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert_orthonormal(&camera);

        camera.update_rotation(30.0, 0.8);
        assert_orthonormal(&camera);

        camera.update_movement(0.016, 90.0, 1.0);
        assert_orthonormal(&camera);

        camera.rotate_around_point(50.0, Vector3::new(0.0, 0.0, 0.0), 123.0, 20.0);
        assert_orthonormal(&camera);

        camera.advance(1.0);
        camera.strafe(-1.0);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_orbit_positions() {
        let mut camera = test_camera();
        let origin = Vector3::new(0.0, 0.0, 0.0);

        camera.rotate_around_point(10.0, origin, 0.0, 0.0);
        assert!((camera.position - Vector3::new(10.0, 0.0, 0.0)).magnitude() < TOL);

        camera.rotate_around_point(10.0, origin, 90.0, 0.0);
        assert!((camera.position - Vector3::new(0.0, 0.0, 10.0)).magnitude() < 1e-3);

        // still looking at the pivot
        let to_origin = (origin - camera.position).normalize();
        assert!((camera.front - to_origin).magnitude() < TOL);
    }

    #[test]
    fn test_set_looks_at_viewpoint() {
        let mut camera = test_camera();
        camera.set(
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert!((camera.front - Vector3::new(0.0, 0.0, 1.0)).magnitude() < TOL);
        assert!((camera.view - (camera.position + camera.front)).magnitude() < TOL);
    }

    #[test]
    fn test_movement_advances_along_front() {
        let mut camera = test_camera();
        camera.set(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let front = camera.front;
        camera.update_movement(0.1, 90.0, 1.0);
        let moved = camera.position;
        let expected = front * camera.movement_speed * 0.1;
        assert!((moved - expected).magnitude() < 1e-3);
    }

    #[test]
    fn test_pitch_clamped_short_of_pole() {
        let mut camera = test_camera();
        for _ in 0..100 {
            camera.update_rotation(90.0, 10.0);
        }
        assert!(camera.pitch <= 89.0);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_position_in_front() {
        let mut camera = test_camera();
        camera.set(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(1.0, 2.0, 4.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let p = camera.position_in_front(2.0);
        assert!((p - Vector3::new(1.0, 2.0, 5.0)).magnitude() < TOL);
    }
}
