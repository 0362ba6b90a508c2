use cgmath::{Matrix4, SquareMatrix};

use crate::camera::{CameraSample, Projection};

//-----------Vertex-----------------
/// Vertex format of every campus mesh, 32 bytes per vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }

    /// Vertex buffer layout: position at location 0, normal at 1, uv at 2.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

//-----------Camera-----------------
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, sample: &CameraSample, projection: &Projection) {
        self.view_position = sample.eye.to_homogeneous().into();
        self.view_proj = projection.view_proj(sample).into();
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.view_proj.into()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

//-----------Model-----------------
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    transform: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(transform: Matrix4<f32>) -> Self {
        Self {
            transform: transform.into(),
        }
    }

    pub fn transform(&self) -> Matrix4<f32> {
        self.transform.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::LAYOUT.array_stride, 32);
        assert_eq!(Vertex::LAYOUT.attributes.len(), 3);
    }

    #[test]
    fn test_uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }

    #[test]
    fn test_camera_uniform_update() {
        let projection = Projection::default();
        let sample = CameraSample::new([20.0, 5.0, 35.0], [30.0, 0.0, 10.0], [0.0, 1.0, 0.0]);
        let mut uniform = CameraUniform::new();
        assert_eq!(uniform.view_proj(), Matrix4::identity());
        uniform.update_view_proj(&sample, &projection);

        // The look-at target sits in the middle of the screen, as far away as it is from the eye
        let clip = uniform.view_proj() * cgmath::Vector4::new(30.0, 0.0, 10.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        assert!((clip.w - 750.0f32.sqrt()).abs() < 1e-3);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn test_model_uniform_bytes() {
        let uniform = ModelUniform::new(Matrix4::from_translation([5.0, 0.0, 0.0].into()));
        let bytes = bytemuck::bytes_of(&uniform);
        assert_eq!(bytes.len(), 64);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        // column major, translation in the last column
        assert_eq!(floats[12], 5.0);
    }
}
