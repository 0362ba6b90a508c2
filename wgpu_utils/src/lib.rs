mod buffer;
mod gpu;


pub use buffer::{BufferInitDescriptor, BindGroupDescriptor, BindingKind, create_new_buffer};
pub use gpu::{setup_gpu, create_depth_texture, create_msaa_texture, preferred_surface_format, render_target_descriptor, supported_sample_count, Gpu, DEPTH_FORMAT};
