mod gui;
mod overlay;

pub use gui::EguiRenderer;
pub use overlay::{overlay, label_layout, FrameStats, OverlayInfo};
