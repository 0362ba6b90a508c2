use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// A struct representing the initial descriptor for a buffer.
///
/// This struct is used to create a new buffer with specified label and usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferInitDescriptor<'a> {
    /// Debug label of a buffer. This will show up in graphics debuggers for easy identification.
    pub label: wgpu::Label<'a>,
    /// Usages of a buffer. If the buffer is used in any way that isn't specified here, the operation
    /// will panic.
    pub usage: wgpu::BufferUsages,
}

impl<'a> BufferInitDescriptor<'a> {
    pub fn new(label: wgpu::Label<'a>, usage: wgpu::BufferUsages) -> Self {
        Self { label, usage }
    }

    pub fn uniform(label: &'a str) -> Self {
        Self::new(Some(label), wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST)
    }

    pub fn vertex(label: &'a str) -> Self {
        Self::new(Some(label), wgpu::BufferUsages::VERTEX)
    }
}

impl<'a> Default for BufferInitDescriptor<'a> {
    fn default() -> Self {
        Self {
            label: Some("Default BufferInitDescriptor"),
            usage: wgpu::BufferUsages::COPY_DST,
        }
    }
}

pub fn create_new_buffer<T: Pod>(device: &wgpu::Device, data: &[T], descriptor: BufferInitDescriptor) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: descriptor.label,
        contents: bytemuck::cast_slice(data),
        usage: descriptor.usage,
    })
}

/// The kind of resource bound at one slot of a bind group.
/// This shortens the amount of code needed to create a bind group layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Uniform,
    Texture(wgpu::TextureViewDimension),
    Sampler,
}

impl BindingKind {
    fn binding_type(&self) -> wgpu::BindingType {
        match self {
            BindingKind::Uniform => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::Texture(view_dimension) => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: *view_dimension,
                multisampled: false,
            },
            BindingKind::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        }
    }
}

/// A struct representing a descriptor for a bind group.
/// The layout is created once, bind groups for it can be created for every set of matching resources.
///
/// Bindings are numbered in the order of `bindings`, starting at 0.
#[derive(Clone, Debug)]
pub struct BindGroupDescriptor<'a> {
    pub label: &'a str,
    pub vis: wgpu::ShaderStages,
    pub bindings: Vec<BindingKind>,
}

impl<'a> BindGroupDescriptor<'a> {
    pub fn new(label: &'a str, vis: wgpu::ShaderStages, bindings: Vec<BindingKind>) -> Self {
        Self { label, vis, bindings }
    }

    pub fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.bindings.iter().enumerate().map(|(index, kind)| {
            wgpu::BindGroupLayoutEntry {
                binding: index as u32,
                visibility: self.vis,
                ty: kind.binding_type(),
                count: None,
            }
        }).collect()
    }

    /// A method to generate a bind group layout.
    pub fn generate_bind_group_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let label = format!("{}_bind_group_layout", self.label);
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&label),
            entries: &self.layout_entries(),
        })
    }

    /// A method to generate a bind group.
    ///
    /// # Arguments
    ///
    /// * `device` - The device the bind group is created on.
    /// * `layout` - A layout made by [`Self::generate_bind_group_layout`].
    /// * `resources` - One resource per binding, in binding order.
    pub fn generate_bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, resources: &[wgpu::BindingResource]) -> wgpu::BindGroup {
        assert_eq!(resources.len(), self.bindings.len(), "{}: resource count does not match the layout", self.label);

        let entries = resources.iter().enumerate().map(|(index, resource)| {
            wgpu::BindGroupEntry {
                binding: index as u32,
                resource: resource.clone(),
            }
        }).collect::<Vec<_>>();

        let label = format!("{}_bind_group", self.label);
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout,
            entries: &entries,
        })
    }
}
