use std::path::Path;
use anyhow::Context;
use image::{DynamicImage, GenericImageView};
use wgpu::{Device, Queue, Texture, TextureDimension, TextureFormat};

/// A sampled 2D texture living on the gpu.
pub struct GpuTexture {
    pub texture: Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Decodes an image file (bmp, png or jpeg).
pub fn load_image(file_path: &Path) -> anyhow::Result<DynamicImage> {
    let image = image::open(file_path)
        .with_context(|| format!("Could not load texture {}", file_path.display()))?;
    log::debug!("Loaded {} ({}x{})", file_path.display(), image.width(), image.height());
    Ok(image)
}

/// Uploads an image as an sRGB texture with a repeating linear sampler.
///
/// # Arguments
///
/// * `device` - The device used to create the texture and sampler.
/// * `queue` - The queue the pixel data is written through.
/// * `image` - The decoded image, converted to RGBA8 on upload.
/// * `label` - Debug label, usually the texture's file name.
pub fn create_texture(device: &Device, queue: &Queue, image: &DynamicImage, label: &str) -> GpuTexture {
    let (width, height) = image.dimensions();
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        view_formats: &[],
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
    });

    write_texture(queue, &texture, image);

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    GpuTexture { texture, view, sampler }
}

fn write_texture(queue: &Queue, texture: &Texture, image: &DynamicImage) {
    let (width, height) = image.dimensions();
    let bytes_per_pixel = 4;
    let data = image.to_rgba8().into_raw();

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_pixel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_texture() {
        let image = load_image(Path::new("does/not/exist.bmp"));
        assert!(image.is_err());
        let message = format!("{:#}", image.err().expect("Expected an error"));
        assert!(message.contains("exist.bmp"));
    }

    #[test]
    fn test_load_written_image() {
        let path = std::env::temp_dir().join("scene_texture_test.png");
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        image.save(&path).expect("Could not write test image");

        let loaded = load_image(&path).expect("Could not load test image");
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.to_rgba8().get_pixel(3, 1), &image::Rgba([10, 20, 30, 255]));
        let _ = std::fs::remove_file(&path);
    }
}
