use std::path::Path;
use image::DynamicImage;
use scene::{create_texture, load_campus, load_image, load_obj, Config, GpuTexture, MeshData, ModelPlacement, ModelUniform};
use wgpu_utils::{create_new_buffer, BindGroupDescriptor, BindingKind, BufferInitDescriptor};

use crate::error::TourError;
use crate::frame::ModelDraw;

/// A model's decoded assets, ready for upload.
pub struct ModelAssets {
    pub placement: ModelPlacement,
    pub mesh: MeshData,
    pub image: DynamicImage,
}

/// A model living on the gpu. Released when dropped.
pub struct GpuModel {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub transform_buffer: wgpu::Buffer,
    pub texture: GpuTexture,
    pub bind_group: wgpu::BindGroup,
}

/// Bind group layout shared by all models: transform, texture and sampler.
pub fn model_bind_group_descriptor() -> BindGroupDescriptor<'static> {
    BindGroupDescriptor::new(
        "model",
        wgpu::ShaderStages::VERTEX_FRAGMENT,
        vec![
            BindingKind::Uniform,
            BindingKind::Texture(wgpu::TextureViewDimension::D2),
            BindingKind::Sampler,
        ],
    )
}

/// Loads the scene file and every mesh and texture it references.
///
/// # Arguments
///
/// * `userconfig` - The user configuration naming the scene file and its angle unit.
///
/// # Returns
///
/// The assets of every model in scene file order, or an `AssetLoad` error for the first file that failed.
pub fn load_scene_assets(userconfig: &Config) -> Result<Vec<ModelAssets>, TourError> {
    let placements = load_campus(&userconfig.scene.path, userconfig.scene.angle_unit)
        .map_err(TourError::AssetLoad)?;

    let mut assets = Vec::with_capacity(placements.len());
    for placement in placements {
        let mesh = load_obj(&placement.mesh).map_err(TourError::AssetLoad)?;
        let image = load_image(&placement.texture).map_err(TourError::AssetLoad)?;
        assets.push(ModelAssets { placement, mesh, image });
    }
    log::info!("Models ready");
    Ok(assets)
}

/// Uploads the model assets and builds the per frame draw records.
///
/// # Arguments
///
/// * `device` - The device the buffers and textures are created on.
/// * `queue` - The queue used for texture uploads.
/// * `layout` - The layout made from [`model_bind_group_descriptor`].
/// * `assets` - The loaded assets, consumed.
///
/// # Returns
///
/// * `Vec<GpuModel>` - The gpu resources, in scene order.
/// * `Vec<ModelDraw>` - The cached transform and vertex count of every model, in the same order.
pub fn setup_models(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout, assets: Vec<ModelAssets>) -> (Vec<GpuModel>, Vec<ModelDraw>) {
    let descriptor = model_bind_group_descriptor();
    let mut gpu_models = Vec::with_capacity(assets.len());
    let mut draws = Vec::with_capacity(assets.len());

    for ModelAssets { placement, mesh, image } in assets {
        let name = file_name(&placement.mesh);
        let draw = ModelDraw::new(&placement, &mesh);

        let vertex_buffer = create_new_buffer(device, &mesh.vertices, BufferInitDescriptor::vertex(&name));
        let transform_buffer = create_new_buffer(
            device,
            &[ModelUniform::new(draw.transform)],
            BufferInitDescriptor::uniform("Model Transform Buffer"),
        );
        let texture = create_texture(device, queue, &image, &file_name(&placement.texture));

        let bind_group = descriptor.generate_bind_group(device, layout, &[
            transform_buffer.as_entire_binding(),
            wgpu::BindingResource::TextureView(&texture.view),
            wgpu::BindingResource::Sampler(&texture.sampler),
        ]);

        gpu_models.push(GpuModel {
            vertex_buffer,
            vertex_count: draw.vertex_count,
            transform_buffer,
            texture,
            bind_group,
        });
        draws.push(draw);
    }

    (gpu_models, draws)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
