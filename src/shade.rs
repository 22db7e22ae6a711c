//! The tumbling, lit torus and its per-frame shader update.
//!
//! [`ShadedTorus`] is the one rendering object of this crate. It owns its
//! torus geometry, its world transform and the [`ShaderParams`] block that
//! the render pass uploads. The render loop calls [`ShadedTorus::update`]
//! once per frame:
//!
//! ```
//! use shade::{Camera, Light, ShadedTorus, TorusMesh, Vec3};
//!
//! let mut torus = ShadedTorus::new(TorusMesh::default(), Light::at(Vec3::new(2.0, 3.0, 4.0)));
//! let camera = Camera::new().matrices(16.0 / 9.0);
//!
//! let params = torus.update(Some(&camera), 1.0 / 60.0).copied();
//! assert!(params.is_some());
//!
//! // No active camera: nothing to project against, nothing changes.
//! assert!(torus.update(None, 1.0 / 60.0).is_none());
//! ```

use glam::{Mat4, Vec3};

use crate::camera::CameraMatrices;
use crate::mesh::Transform;
use crate::torus::TorusMesh;

/// Shader parameter block, uploaded as a single uniform buffer.
///
/// Every parameter lives at a fixed slot; see [`ShaderParam`] for the byte
/// offsets. Matrices are column-major, matching WGSL's `mat4x4<f32>`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderParams {
    /// projection × view × model
    pub mvp: [[f32; 4]; 4],
    /// view × model
    pub mv: [[f32; 4]; 4],
    /// World-to-camera matrix.
    pub view: [[f32; 4]; 4],
    /// World-space light position, `w = 1`.
    pub light_pos: [f32; 4],
    /// Inverse transpose of `mv`, for normals under non-uniform scale.
    pub normal: [[f32; 4]; 4],
}

impl ShaderParams {
    /// Compose the parameter block from the camera, the object's model
    /// matrix and the light.
    pub fn compose(camera: &CameraMatrices, model: Mat4, light: &Light) -> Self {
        let mv = camera.view * model;
        let mvp = camera.projection * camera.view * model;
        let normal = mv.inverse().transpose();

        Self {
            mvp: mvp.to_cols_array_2d(),
            mv: mv.to_cols_array_2d(),
            view: camera.view.to_cols_array_2d(),
            light_pos: light.position.extend(1.0).to_array(),
            normal: normal.to_cols_array_2d(),
        }
    }

    /// Raw bytes of one slot, to be written at [`ShaderParam::offset`].
    pub fn slot_bytes(&self, slot: ShaderParam) -> &[u8] {
        match slot {
            ShaderParam::Mvp => bytemuck::bytes_of(&self.mvp),
            ShaderParam::ModelView => bytemuck::bytes_of(&self.mv),
            ShaderParam::View => bytemuck::bytes_of(&self.view),
            ShaderParam::LightPosition => bytemuck::bytes_of(&self.light_pos),
            ShaderParam::Normal => bytemuck::bytes_of(&self.normal),
        }
    }

    pub fn mvp(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.mvp)
    }

    pub fn mv(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.mv)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn normal_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.normal)
    }

    pub fn light_position(&self) -> Vec3 {
        Vec3::from_slice(&self.light_pos[..3])
    }
}

/// Fixed slots of [`ShaderParams`], in uniform order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderParam {
    Mvp,
    ModelView,
    View,
    LightPosition,
    Normal,
}

impl ShaderParam {
    pub const ALL: [ShaderParam; 5] = [
        ShaderParam::Mvp,
        ShaderParam::ModelView,
        ShaderParam::View,
        ShaderParam::LightPosition,
        ShaderParam::Normal,
    ];

    /// Byte offset of this slot inside the uniform buffer.
    pub const fn offset(self) -> u64 {
        match self {
            ShaderParam::Mvp => std::mem::offset_of!(ShaderParams, mvp) as u64,
            ShaderParam::ModelView => std::mem::offset_of!(ShaderParams, mv) as u64,
            ShaderParam::View => std::mem::offset_of!(ShaderParams, view) as u64,
            ShaderParam::LightPosition => std::mem::offset_of!(ShaderParams, light_pos) as u64,
            ShaderParam::Normal => std::mem::offset_of!(ShaderParams, normal) as u64,
        }
    }
}

/// A point light. Configured from outside and read-only to the object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 3.0, 4.0),
        }
    }
}

impl Light {
    pub fn at(position: Vec3) -> Self {
        Self { position }
    }
}

/// Constant angular velocity about the local X, Y and Z axes.
///
/// Different rates per axis make the object tumble rather than spin. The
/// accumulated angle per axis is tracked separately, wrapped into [0, 360).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    /// Degrees per second about local X, Y, Z.
    pub degrees_per_second: Vec3,
    accumulated: Vec3,
}

impl Default for Spin {
    fn default() -> Self {
        Self::new(Vec3::new(5.2, 6.4, 7.6))
    }
}

impl Spin {
    pub fn new(degrees_per_second: Vec3) -> Self {
        Self {
            degrees_per_second,
            accumulated: Vec3::ZERO,
        }
    }

    /// Total rotation applied so far, per axis, in degrees within [0, 360).
    pub fn accumulated(&self) -> Vec3 {
        self.accumulated
    }

    /// Advance by `dt` seconds and return this frame's increment in degrees.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        let step = self.degrees_per_second * dt;
        let total = self.accumulated + step;
        self.accumulated = Vec3::new(
            total.x.rem_euclid(360.0),
            total.y.rem_euclid(360.0),
            total.z.rem_euclid(360.0),
        );
        step
    }
}

/// A torus that tumbles in place and is lit by a single point light.
#[derive(Clone, Debug)]
pub struct ShadedTorus {
    mesh: TorusMesh,
    transform: Transform,
    spin: Spin,
    light: Light,
    params: Option<ShaderParams>,
}

impl ShadedTorus {
    pub fn new(mesh: TorusMesh, light: Light) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
            spin: Spin::default(),
            light,
            params: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = spin;
        self
    }

    /// Per-frame update.
    ///
    /// Recomputes the shader parameters from `camera` and the current
    /// transform, then rotates the transform by this frame's spin
    /// increment. Returns the fresh parameters.
    ///
    /// Without an active camera the frame is skipped: neither the
    /// parameters nor the transform change, and `None` is returned.
    pub fn update(&mut self, camera: Option<&CameraMatrices>, dt: f32) -> Option<&ShaderParams> {
        let Some(camera) = camera else {
            tracing::trace!("no active camera, skipping torus update");
            return None;
        };

        let params = ShaderParams::compose(camera, self.transform.matrix(), &self.light);
        self.params = Some(params);

        let step = self.spin.advance(dt);
        self.transform.rotate_local_degrees(step);

        self.params.as_ref()
    }

    pub fn mesh(&self) -> &TorusMesh {
        &self.mesh
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn set_light(&mut self, light: Light) {
        self.light = light;
    }

    /// Parameters produced by the latest update, if any frame has run.
    pub fn params(&self) -> Option<&ShaderParams> {
        self.params.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use glam::{EulerRot, Quat};

    fn camera() -> CameraMatrices {
        Camera::new()
            .at([0.5, 1.0, 4.0])
            .looking_at(Vec3::ZERO)
            .matrices(4.0 / 3.0)
    }

    fn torus() -> ShadedTorus {
        ShadedTorus::new(TorusMesh::default(), Light::at(Vec3::new(1.0, 2.0, 3.0))).with_transform(
            Transform::new()
                .position(Vec3::new(0.2, -0.1, 0.3))
                .rotation(Quat::from_rotation_x(0.4))
                .uniform_scale(1.5),
        )
    }

    fn angle_close(a: f32, b: f32, tol: f32) -> bool {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d) < tol
    }

    #[test]
    fn params_block_layout() {
        assert_eq!(std::mem::size_of::<ShaderParams>(), 272);
        assert_eq!(ShaderParam::Mvp.offset(), 0);
        assert_eq!(ShaderParam::ModelView.offset(), 64);
        assert_eq!(ShaderParam::View.offset(), 128);
        assert_eq!(ShaderParam::LightPosition.offset(), 192);
        assert_eq!(ShaderParam::Normal.offset(), 208);
    }

    #[test]
    fn slots_tile_the_uniform_block() {
        let cam = camera();
        let mut object = torus();
        let params = *object.update(Some(&cam), 0.1).unwrap();

        let mut block = vec![0u8; std::mem::size_of::<ShaderParams>()];
        for slot in ShaderParam::ALL {
            let bytes = params.slot_bytes(slot);
            let start = slot.offset() as usize;
            block[start..start + bytes.len()].copy_from_slice(bytes);
        }
        assert_eq!(block, bytemuck::bytes_of(&params));
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_stretch() {
        let cam = camera();
        let mut object = ShadedTorus::new(TorusMesh::default(), Light::default())
            .with_transform(Transform::new().scale(Vec3::new(3.0, 0.5, 1.0)));
        let params = *object.update(Some(&cam), 0.0).unwrap();
        let (mv, normal) = (params.mv(), params.normal_matrix());

        // A surface tilted in X and Y: stretching it breaks `mv * n`.
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        let tangent = Vec3::new(1.0, -1.0, 0.0);
        let t = mv.transform_vector3(tangent);
        assert!(normal.transform_vector3(n).normalize().dot(t.normalize()).abs() < 1e-5);
        assert!(mv.transform_vector3(n).normalize().dot(t.normalize()).abs() > 0.1);
    }

    #[test]
    fn update_composes_projection_view_model() {
        let cam = camera();
        let mut object = torus();
        let model = object.transform().matrix();

        let params = *object.update(Some(&cam), 0.016).unwrap();

        assert_eq!(params.mvp(), cam.projection * cam.view * model);
        assert_eq!(params.mv(), cam.view * model);
        assert_eq!(params.view(), cam.view);
        assert_eq!(params.light_position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(params.light_pos[3], 1.0);
    }

    #[test]
    fn composition_order_matters() {
        let cam = camera();
        let mut object = torus();
        let model = object.transform().matrix();
        let params = *object.update(Some(&cam), 0.0).unwrap();

        let reversed = model * cam.view * cam.projection;
        assert!(!params.mvp().abs_diff_eq(reversed, 1e-3));
    }

    #[test]
    fn params_use_transform_before_rotation() {
        let cam = camera();
        let mut object = torus();
        object.update(Some(&cam), 0.5);
        let model = object.transform().matrix();

        let params = *object.update(Some(&cam), 0.5).unwrap();
        assert_eq!(params.mv(), cam.view * model);
        assert_ne!(object.transform().matrix(), model);
    }

    #[test]
    fn accumulated_rotation_tracks_frames() {
        let cam = camera();
        let mut object = torus();
        let (frames, dt) = (100, 0.016);
        for _ in 0..frames {
            object.update(Some(&cam), dt);
        }

        let total = object.spin().accumulated();
        let n = frames as f32 * dt;
        assert!(angle_close(total.x, n * 5.2, 1e-3));
        assert!(angle_close(total.y, n * 6.4, 1e-3));
        assert!(angle_close(total.z, n * 7.6, 1e-3));
    }

    #[test]
    fn accumulated_rotation_wraps() {
        let mut spin = Spin::default();
        for _ in 0..1000 {
            spin.advance(0.1);
        }
        let total = spin.accumulated();
        assert!(angle_close(total.x, 520.0, 5e-2));
        assert!(angle_close(total.y, 640.0, 5e-2));
        assert!(angle_close(total.z, 760.0, 5e-2));
        assert!(total.max_element() < 360.0 && total.min_element() >= 0.0);
    }

    #[test]
    fn rotation_is_product_of_frame_increments() {
        let cam = camera();
        let mut object = ShadedTorus::new(TorusMesh::default(), Light::default());
        let rates = Spin::default().degrees_per_second;
        let (frames, dt) = (50, 0.2);

        let mut expected = Quat::IDENTITY;
        for _ in 0..frames {
            object.update(Some(&cam), dt);
            let step = rates * dt;
            expected *= Quat::from_euler(
                EulerRot::YXZ,
                step.y.to_radians(),
                step.x.to_radians(),
                step.z.to_radians(),
            );
        }

        let actual = object.transform().rotation;
        assert!(actual.abs_diff_eq(expected, 1e-4) || actual.abs_diff_eq(-expected, 1e-4));
        // The three axes do not commute, so one combined Euler step differs.
        let total = rates * dt * frames as f32;
        let lumped = Quat::from_euler(
            EulerRot::YXZ,
            total.y.to_radians(),
            total.x.to_radians(),
            total.z.to_radians(),
        );
        assert!(!actual.abs_diff_eq(lumped, 1e-4));
    }

    #[test]
    fn single_axis_spin_rotates_about_local_axis() {
        let cam = camera();
        let mut object = ShadedTorus::new(TorusMesh::default(), Light::default())
            .with_spin(Spin::new(Vec3::new(0.0, 45.0, 0.0)));
        for _ in 0..10 {
            object.update(Some(&cam), 0.1);
        }
        let expected = Quat::from_rotation_y(45f32.to_radians());
        assert!(object.transform().rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn no_camera_is_a_no_op() {
        let mut object = torus();
        let before_transform = *object.transform();
        let before_spin = *object.spin();

        assert!(object.update(None, 0.5).is_none());
        assert!(object.params().is_none());
        assert_eq!(*object.transform(), before_transform);
        assert_eq!(*object.spin(), before_spin);

        // A previous frame's parameters survive a skipped frame untouched.
        let cam = camera();
        let params = *object.update(Some(&cam), 0.5).unwrap();
        let after_first = *object.transform();
        assert!(object.update(None, 0.5).is_none());
        assert_eq!(object.params(), Some(&params));
        assert_eq!(*object.transform(), after_first);
    }

    #[test]
    fn light_is_read_each_frame() {
        let cam = camera();
        let mut object = torus();
        object.set_light(Light::at(Vec3::new(-4.0, 0.0, 1.0)));
        let params = object.update(Some(&cam), 0.0).unwrap();
        assert_eq!(params.light_position(), Vec3::new(-4.0, 0.0, 1.0));
    }
}
