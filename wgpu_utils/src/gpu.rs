use std::sync::Arc;
use anyhow::{anyhow, Context};
use winit::window::Window;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Everything needed to draw into a window.
pub struct Gpu {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    /// Samples per pixel of the scene render targets, 1 when multisampling is off.
    pub sample_count: u32,
}

impl Gpu {
    /// Reconfigures the surface, zero sized windows are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// Picks the first sRGB format, or the first format at all.
pub fn preferred_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats.iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Returns `requested` if both the color and the depth format can be rendered with that many samples
/// and the color format can be resolved, otherwise 1.
pub fn supported_sample_count(
    requested: u32,
    color: wgpu::TextureFormatFeatureFlags,
    depth: wgpu::TextureFormatFeatureFlags,
) -> u32 {
    if requested <= 1 {
        return 1;
    }
    if color.sample_count_supported(requested)
        && color.contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
        && depth.sample_count_supported(requested)
    {
        requested
    } else {
        1
    }
}

/// Sets up the device and configures the surface of `window`.
///
/// `msaa_samples` is the requested sample count for the scene, it falls back to 1 if the adapter can not
/// multisample the surface and depth formats.
pub async fn setup_gpu(window: Arc<Window>, msaa_samples: u32) -> anyhow::Result<Gpu> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::PRIMARY),
        dx12_shader_compiler: Default::default(),
        gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        flags: wgpu::InstanceFlags::empty(),
    });

    let surface = instance.create_surface(window.clone())
        .context("Failed to create surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow!("No compatible graphics adapter found"))?;

    log::info!("Using adapter {} ({:?})", adapter.get_info().name, adapter.get_info().backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                label: None,
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("Failed to create device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let format = preferred_surface_format(&surface_caps.formats)
        .ok_or_else(|| anyhow!("Surface is not supported by the adapter"))?;

    let sample_count = supported_sample_count(
        msaa_samples,
        adapter.get_texture_format_features(format).flags,
        adapter.get_texture_format_features(DEPTH_FORMAT).flags,
    );
    if sample_count != msaa_samples {
        log::warn!("{}x multisampling is not supported for {:?}, rendering without", msaa_samples, format);
    }

    let size = window.inner_size();

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    Ok(Gpu { surface, device, queue, config, size, sample_count })
}

/// Describes a render attachment the size of the surface.
pub fn render_target_descriptor<'a>(
    label: &'a str,
    config: &wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::TextureDescriptor<'a> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

/// Creates a depth buffer matching the surface size and sample count.
pub fn create_depth_texture(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&render_target_descriptor("Depth Texture", config, DEPTH_FORMAT, sample_count));
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Creates the multisampled color target that is resolved into the surface texture.
/// Returns `None` when `sample_count` is 1.
pub fn create_msaa_texture(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&render_target_descriptor("Multisampled Frame", config, config.format, sample_count));
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_prefers_srgb() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(preferred_surface_format(&formats), Some(TextureFormat::Bgra8UnormSrgb));
    }

    #[test]
    fn test_falls_back_to_first() {
        let formats = [TextureFormat::Rgba16Float, TextureFormat::Rgba8Unorm];
        assert_eq!(preferred_surface_format(&formats), Some(TextureFormat::Rgba16Float));
        assert_eq!(preferred_surface_format(&[]), None);
    }

    fn surface_config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: TextureFormat::Bgra8UnormSrgb,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    #[test]
    fn test_sample_count_falls_back() {
        use wgpu::TextureFormatFeatureFlags as Flags;
        let color = Flags::MULTISAMPLE_X4 | Flags::MULTISAMPLE_RESOLVE;
        let depth = Flags::MULTISAMPLE_X4;
        assert_eq!(supported_sample_count(4, color, depth), 4);
        assert_eq!(supported_sample_count(1, color, depth), 1);
        assert_eq!(supported_sample_count(8, color, depth), 1);
        assert_eq!(supported_sample_count(4, Flags::MULTISAMPLE_X4, depth), 1);
        assert_eq!(supported_sample_count(4, color, Flags::empty()), 1);
    }

    #[test]
    fn test_render_targets_match_surface() {
        let config = surface_config(1024, 768);
        let depth = render_target_descriptor("depth", &config, DEPTH_FORMAT, 4);
        assert_eq!(depth.size, wgpu::Extent3d { width: 1024, height: 768, depth_or_array_layers: 1 });
        assert_eq!(depth.sample_count, 4);
        assert_eq!(depth.format, TextureFormat::Depth32Float);

        let color = render_target_descriptor("color", &config, config.format, 4);
        assert_eq!(color.format, TextureFormat::Bgra8UnormSrgb);
        assert_eq!(color.sample_count, depth.sample_count);
        assert!(color.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
    }
}
