use std::sync::Arc;
use anyhow::Context;
use egui_wgpu::ScreenDescriptor;
use winit::{event::*, keyboard::{Key, NamedKey}, window::Window};

use gui::{overlay, EguiRenderer, FrameStats, OverlayInfo};
use scene::{CameraUniform, Config, SegmentTracker, Vertex};
use wgpu_utils::{create_depth_texture, create_msaa_texture, create_new_buffer, setup_gpu, BindGroupDescriptor, BindingKind, BufferInitDescriptor, Gpu, DEPTH_FORMAT};

use crate::error::TourError;
use crate::frame::FrameRenderer;
use crate::helper::{load_scene_assets, model_bind_group_descriptor, setup_models, GpuModel};

pub struct State {
    pub window: Arc<Window>,
    gpu: Gpu,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    render_pipeline: wgpu::RenderPipeline,
    //Camera
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    //Scene
    models: Vec<GpuModel>,
    frame: FrameRenderer,
    tracker: SegmentTracker,
    start_time: instant::Instant,
    path_time: f32,
    //GUI
    egui: EguiRenderer,
    show_info: bool,
    stats: FrameStats,
}

impl State {
    /// Constructs a new `State` instance.
    ///
    /// Sets up the gpu, loads and uploads the campus models, builds the textured mesh pipeline and the GUI.
    /// The tour clock starts once everything is loaded.
    ///
    /// # Arguments
    /// * `window` - The window the tour is rendered into.
    /// * `userconfig` - The loaded user configuration.
    /// # Errors
    /// `Initialization` if the gpu can not be set up, `AssetLoad` if any scene file is missing or corrupt.
    pub async fn new(window: Arc<Window>, userconfig: Config) -> Result<Self, TourError> {
        //---------Setup Hardware---------
        let gpu = setup_gpu(window.clone(), userconfig.window.msaa_samples).await.map_err(TourError::Initialization)?;
        log::info!("Hardware initialized, {}x multisampling", gpu.sample_count);

        let (_, depth_view) = create_depth_texture(&gpu.device, &gpu.config, gpu.sample_count);
        let msaa_view = create_msaa_texture(&gpu.device, &gpu.config, gpu.sample_count);

        //-------------Models-------------
        let assets = load_scene_assets(&userconfig)?;
        let model_descriptor = model_bind_group_descriptor();
        let model_bind_group_layout = model_descriptor.generate_bind_group_layout(&gpu.device);
        let (models, draws) = setup_models(&gpu.device, &gpu.queue, &model_bind_group_layout, assets);

        let frame = FrameRenderer::new(&userconfig, draws);

        //-------------Camera-------------
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&frame.path().evaluate(0.0), frame.projection());

        // Create a buffer to hold the camera data
        let camera_buffer = create_new_buffer(&gpu.device, &[camera_uniform], BufferInitDescriptor::uniform("Camera Buffer"));

        let camera_descriptor = BindGroupDescriptor::new(
            "camera",
            wgpu::ShaderStages::VERTEX,
            vec![BindingKind::Uniform],
        );
        let camera_bind_group_layout = camera_descriptor.generate_bind_group_layout(&gpu.device);
        let camera_bind_group = camera_descriptor.generate_bind_group(&gpu.device, &camera_bind_group_layout, &[
            camera_buffer.as_entire_binding(),
        ]);
        log::info!("Camera ready");

        //-------------Pipeline-------------
        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Campus Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../res/shader/campus.wgsl").into()),
        });

        let render_pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Campus Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Campus Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::LAYOUT],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[
                    Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                    })
                ],
            }),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: gpu.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Campus meshes are not consistently wound
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            multiview: None,
        });
        log::info!("Campus pipeline ready");

        //=============== GUI ===============
        let egui = EguiRenderer::new(
            &gpu.device,
            gpu.config.format,
            None,
            1,
            &window,
        );

        Ok(Self {
            window,
            gpu,
            depth_view,
            msaa_view,
            render_pipeline,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            models,
            frame,
            tracker: SegmentTracker::new(),
            start_time: instant::Instant::now(),
            path_time: 0.0,
            egui,
            show_info: userconfig.show_info,
            stats: FrameStats::default(),
        })
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.gpu.size
    }

    /// Reconfigures the surface and the render targets. The projection keeps its fixed aspect ratio.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gpu.resize(new_size);
            let (_, depth_view) = create_depth_texture(&self.gpu.device, &self.gpu.config, self.gpu.sample_count);
            self.depth_view = depth_view;
            self.msaa_view = create_msaa_texture(&self.gpu.device, &self.gpu.config, self.gpu.sample_count);
        }
    }

    /// Handles input events. Returns `true` if the event was consumed.
    ///
    /// The GUI gets every event first; `F1` toggles the info window.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        if self.egui.handle_input(&self.window, event) {
            return true;
        }
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::F1),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.show_info = !self.show_info;
                true
            }
            _ => false,
        }
    }

    /// Advances the tour clock.
    pub fn update(&mut self, dt: std::time::Duration) {
        self.path_time = self.frame.path_time(self.start_time.elapsed());
        self.tracker.observe(self.frame.path(), self.path_time);
        self.stats.push(dt.as_secs_f32());
    }

    /// Renders one frame of the tour.
    ///
    /// Clears color and depth, uploads the view-projection of the current camera sample, draws every model
    /// with its own transform and texture, then draws the label and optional info window on top.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let plan = self.frame.plan(self.path_time);

        self.camera_uniform.update_view_proj(&plan.sample, self.frame.projection());
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        // Get the current output texture from the surface
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        //----------Campus pass----------
        // With multisampling the scene is drawn into the msaa target and resolved into the surface
        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa_view) => (msaa_view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Campus Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(plan.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for draw in &plan.draws {
                let model = &self.models[draw.model_index];
                render_pass.set_bind_group(1, &model.bind_group, &[]);
                render_pass.set_vertex_buffer(0, model.vertex_buffer.slice(..));
                render_pass.draw(0..draw.vertex_count, 0..1);
            }
        }

        //----------Overlay----------
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let info = self.show_info.then(|| OverlayInfo {
            path_time: plan.path_time,
            segment: plan.segment,
            segment_count: self.frame.path().segments().len(),
            model_count: self.models.len(),
            eye: plan.sample.eye.into(),
            target: plan.sample.target.into(),
        });
        let stats = &self.stats;

        self.egui.draw(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &self.window,
            &view,
            screen_descriptor,
            |ui| overlay(ui, plan.label, info.as_ref().map(|info| (info, stats))),
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Loads the configuration, or the defaults when no file is given and `res/config.toml` does not exist.
pub fn load_config(config_path: Option<&str>) -> Result<Config, TourError> {
    let config_path = match config_path {
        Some(path) => path,
        None if std::path::Path::new("res/config.toml").exists() => "res/config.toml",
        None => {
            log::info!("Using default config");
            return Ok(Config::default());
        }
    };
    log::info!("Using config file: {}", config_path);
    Config::new(config_path)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Invalid config file {}", config_path))
        .map_err(TourError::Initialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file_is_initialization_error() {
        match load_config(Some("does/not/exist.toml")) {
            Err(TourError::Initialization(error)) => assert!(format!("{:#}", error).contains("exist.toml")),
            Err(other) => panic!("Unexpected error {}", other),
            Ok(_) => panic!("Missing config should fail"),
        }
    }

    #[test]
    fn test_config_file_is_loaded() {
        let path = std::env::temp_dir().join("tour_config_test.toml");
        std::fs::write(&path, "[window]\ntitle = \"Test Tour\"\n[overlay]\nshow_info = true\n").expect("Could not write config");
        let config = load_config(path.to_str()).expect("Could not load config");
        assert_eq!(config.window.title, "Test Tour");
        assert!(config.show_info);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_config_file() {
        let path = std::env::temp_dir().join("tour_invalid_config_test.toml");
        std::fs::write(&path, "[camera]\nnear_far = [5.0, 1.0]\n").expect("Could not write config");
        assert!(matches!(load_config(path.to_str()), Err(TourError::Initialization(_))));
        let _ = std::fs::remove_file(&path);
    }
}
