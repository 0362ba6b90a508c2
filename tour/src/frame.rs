use std::time::Duration;
use cgmath::Matrix4;
use scene::{CameraPath, CameraSample, Config, MeshData, ModelPlacement, Projection, TextLabel};

/// Per model data the renderer needs every frame. The transform is resolved once at load.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDraw {
    pub transform: Matrix4<f32>,
    pub vertex_count: u32,
}

impl ModelDraw {
    pub fn new(placement: &ModelPlacement, mesh: &MeshData) -> Self {
        Self {
            transform: placement.world_transform(),
            vertex_count: mesh.vertex_count(),
        }
    }
}

/// One non-indexed triangle draw. `model_index` selects the model's vertex buffer and its bind group,
/// which carries the transform, texture and sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub model_index: usize,
    pub transform: Matrix4<f32>,
    pub vertex_count: u32,
}

/// Everything that has to happen to draw one frame, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan<'a> {
    pub clear_color: wgpu::Color,
    pub label: &'a TextLabel,
    pub path_time: f32,
    pub segment: Option<usize>,
    pub sample: CameraSample,
    pub view_proj: Matrix4<f32>,
    pub draws: Vec<DrawCall>,
}

/// Turns elapsed time into frame plans. Owns the model list for the lifetime of the tour.
pub struct FrameRenderer {
    path: CameraPath,
    projection: Projection,
    time_scale: f32,
    clear_color: wgpu::Color,
    label: TextLabel,
    models: Vec<ModelDraw>,
}

impl FrameRenderer {
    pub fn new(config: &Config, models: Vec<ModelDraw>) -> Self {
        let [r, g, b, a] = config.window.clear_color;
        Self {
            path: CameraPath::campus_tour().with_end(config.path.end_policy),
            projection: Projection::from_settings(&config.camera),
            time_scale: config.path.time_scale,
            clear_color: wgpu::Color { r, g, b, a },
            label: config.label.clone(),
            models,
        }
    }

    pub fn path(&self) -> &CameraPath {
        &self.path
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn models(&self) -> &[ModelDraw] {
        &self.models
    }

    /// Path time for a wall clock duration since the tour started.
    pub fn path_time(&self, elapsed: Duration) -> f32 {
        elapsed.as_secs_f32() * self.time_scale
    }

    pub fn plan(&self, t: f32) -> FramePlan<'_> {
        let sample = self.path.evaluate(t);
        let view_proj = self.projection.view_proj(&sample);

        let draws = self.models.iter().enumerate().map(|(index, model)| {
            DrawCall {
                model_index: index,
                transform: model.transform,
                vertex_count: model.vertex_count,
            }
        }).collect();

        FramePlan {
            clear_color: self.clear_color,
            label: &self.label,
            path_time: t,
            segment: self.path.segment_index(t),
            sample,
            view_proj,
            draws,
        }
    }
}
