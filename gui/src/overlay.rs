use std::collections::VecDeque;
use egui::{Align2, Color32, Context, Margin, RichText};
use scene::TextLabel;

const LABEL_COLOR: Color32 = Color32::from_rgb(20, 20, 20);

/// Rolling average over the last frame times.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_times: VecDeque<f32>,
    capacity: usize,
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Records the duration of one frame in seconds.
    pub fn push(&mut self, dt: f32) {
        if self.frame_times.len() == self.capacity {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);
    }

    pub fn average_fps(&self) -> f32 {
        let total: f32 = self.frame_times.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.frame_times.len() as f32 / total
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(100)
    }
}

/// State of the tour shown in the info window.
#[derive(Debug, Clone, Default)]
pub struct OverlayInfo {
    pub path_time: f32,
    pub segment: Option<usize>,
    pub segment_count: usize,
    pub model_count: usize,
    pub eye: [f32; 3],
    pub target: [f32; 3],
}

/// Position in points of the label's top left corner and its font size, for a screen of `width` x `height` points.
pub fn label_layout(label: &TextLabel, width: f32, height: f32) -> (egui::Pos2, f32) {
    let ([x, y], size) = label.screen_rect(width, height);
    (egui::pos2(x, y), size)
}

/// Draws the fixed text label and, when `info` is given, the info window.
pub fn overlay(ctx: &Context, label: &TextLabel, info: Option<(&OverlayInfo, &FrameStats)>) {
    let screen = ctx.screen_rect();
    let (pos, size) = label_layout(label, screen.width(), screen.height());

    egui::Area::new(egui::Id::new("tour_label"))
        .fixed_pos(pos)
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(&label.text).size(size).color(LABEL_COLOR));
        });

    if let Some((info, stats)) = info {
        info_gui(ctx, info, stats);
    }
}

fn info_gui(ctx: &Context, info: &OverlayInfo, stats: &FrameStats) {
    egui::Window::new("Tour Info")
        .anchor(Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .frame(egui::Frame::default()
            .fill(egui::Color32::from_black_alpha(200))
            .inner_margin(Margin { left: 10.0, right: 10.0, top: 10.0, bottom: 10.0 })
            )
        .show(ctx, |ui| {
            ui.label(RichText::new(format!("{:.0} FPS", stats.average_fps())).strong().color(Color32::WHITE));
            ui.monospace(format!("Time: {:.2}", info.path_time));
            match info.segment {
                Some(segment) => ui.monospace(format!("Segment: {} / {}", segment + 1, info.segment_count)),
                None => ui.monospace("Segment: finished"),
            };
            ui.monospace(format!("Eye: ({:.2}, {:.2}, {:.2})", info.eye[0], info.eye[1], info.eye[2]));
            ui.monospace(format!("Target: ({:.2}, {:.2}, {:.2})", info.target[0], info.target[1], info.target[2]));
            ui.monospace(format!("Models: {}", info.model_count));
            ui.label(RichText::new("Exit").strong());
            ui.label("Close: 'ESC'");
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_layout_scales_with_screen() {
        let label = TextLabel::default();
        let (pos, size) = label_layout(&label, 1024.0, 768.0);
        assert!((pos.x - 640.0).abs() < 1e-4);
        assert!((size - 38.4).abs() < 1e-4);
        // bottom left origin, the text box sits above y = 50 virtual units
        assert!((pos.y - (768.0 - 64.0 - 38.4)).abs() < 1e-3);
    }

    #[test]
    fn test_label_at_origin_touches_bottom() {
        let label = TextLabel {
            text: "A".to_string(),
            position: [0.0, 0.0],
            size: 60.0,
        };
        let (pos, size) = label_layout(&label, 800.0, 600.0);
        assert_eq!(pos, egui::pos2(0.0, 540.0));
        assert_eq!(size, 60.0);
    }

    #[test]
    fn test_frame_stats_average() {
        let mut stats = FrameStats::new(4);
        assert_eq!(stats.average_fps(), 0.0);
        stats.push(0.02);
        stats.push(0.02);
        assert!((stats.average_fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_frame_stats_drops_old_frames() {
        let mut stats = FrameStats::new(2);
        stats.push(1.0);
        stats.push(0.01);
        stats.push(0.01);
        assert!((stats.average_fps() - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_overlay_runs_headless() {
        let ctx = Context::default();
        let label = TextLabel::default();
        let info = OverlayInfo {
            segment: Some(3),
            segment_count: 15,
            ..Default::default()
        };
        let stats = FrameStats::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| overlay(ctx, &label, Some((&info, &stats))));
        }
        let _ = ctx.run(egui::RawInput::default(), |ctx| overlay(ctx, &label, None));
    }
}
