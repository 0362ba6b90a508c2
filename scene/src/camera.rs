use cgmath::*;

use crate::config::CameraSettings;

/// Maps OpenGL clip depth (-1..1) onto the 0..1 range wgpu expects. Column major: z' = 0.5 z + 0.5 w.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// One sample of the camera path: where the camera sits, what it looks at and which way is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSample {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl CameraSample {
    pub fn new<E: Into<Point3<f32>>, T: Into<Point3<f32>>, U: Into<Vector3<f32>>>(eye: E, target: T, up: U) -> Self {
        Self {
            eye: eye.into(),
            target: target.into(),
            up: up.into(),
        }
    }

    /// Right handed look-at view matrix.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Represents a projection of a 3D scene onto the 2D plane of the camera.
///
/// The projection is defined by an aspect ratio, a field of view, and near and far clipping planes.
/// The aspect ratio is fixed at creation and does not follow the window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: f32, height: f32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width / height,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(
            settings.aspect[0],
            settings.aspect[1],
            Deg(settings.fov),
            settings.near_far[0],
            settings.near_far[1],
        )
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Combined view-projection matrix for a camera sample.
    pub fn view_proj(&self, sample: &CameraSample) -> Matrix4<f32> {
        self.calc_matrix() * sample.view_matrix()
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projection() {
        let projection = Projection::default();
        assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
        let fovy: Deg<f32> = projection.fovy.into();
        assert!((fovy.0 - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_view_matrix_looks_down_negative_z() {
        let sample = CameraSample::new([0.0, 0.0, 5.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let view = sample.view_matrix();
        // The target ends up straight ahead of the camera
        let p = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((p - Vector4::new(0.0, 0.0, -5.0, 1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_depth_range_is_zero_to_one() {
        let projection = Projection::default();
        let near = projection.calc_matrix() * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = projection.calc_matrix() * Vector4::new(0.0, 0.0, -1000.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_remap_keeps_w() {
        let p = OPENGL_TO_WGPU_MATRIX * Vector4::new(3.0, -2.0, 0.5, 2.0);
        assert_eq!(p, Vector4::new(3.0, -2.0, 1.25, 2.0));
    }

    #[test]
    fn test_matches_explicit_perspective() {
        let remap = Matrix4::from_cols(
            Vector4::new(1.0, 0.0, 0.0, 0.0),
            Vector4::new(0.0, 1.0, 0.0, 0.0),
            Vector4::new(0.0, 0.0, 0.5, 0.0),
            Vector4::new(0.0, 0.0, 0.5, 1.0),
        );
        let expected = remap * perspective(Deg(45.0f32), 4.0 / 3.0, 0.1, 1000.0);
        let actual = Projection::default().calc_matrix();
        for (a, b) in Into::<[[f32; 4]; 4]>::into(actual).iter().flatten().zip(Into::<[[f32; 4]; 4]>::into(expected).iter().flatten()) {
            assert!((a - b).abs() < 1e-6, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_frustum_edges_land_on_ndc_edges() {
        let projection = Projection::default().calc_matrix();
        let half = Rad::from(Deg(22.5f32)).0.tan();

        let top = projection * Vector4::new(0.0, 10.0 * half, -10.0, 1.0);
        assert!((top.y / top.w - 1.0).abs() < 1e-4, "top edge at ndc y = {}", top.y / top.w);
        assert!((top.w - 10.0).abs() < 1e-4);

        let right = projection * Vector4::new(10.0 * half * 4.0 / 3.0, 0.0, -10.0, 1.0);
        assert!((right.x / right.w - 1.0).abs() < 1e-4, "right edge at ndc x = {}", right.x / right.w);
    }

    #[test]
    fn test_view_proj_of_known_point() {
        let projection = Projection::default();
        let sample = CameraSample::new([0.0, 0.0, 5.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let half = Rad::from(Deg(22.5f32)).0.tan();
        // 15 units in front of the eye, on the top edge of the frustum
        let clip = projection.view_proj(&sample) * Vector4::new(0.0, 15.0 * half, -10.0, 1.0);
        assert!((clip.w - 15.0).abs() < 1e-3);
        assert!((clip.y / clip.w - 1.0).abs() < 1e-4);
        assert!(clip.x.abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }
}
