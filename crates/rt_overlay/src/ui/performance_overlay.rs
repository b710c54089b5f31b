//! Read-only performance overlay pinned to the top-left corner

use crate::statistics::Statistics;

use super::frame::{Anchor, GuiFrame, Rgba, WindowOptions, WindowSpec};
use super::theme::{ThemeScope, OVERLAY_SEPARATOR_THEME, OVERLAY_THEME};

/// Window id; the `##` prefix keeps it out of the (hidden) title bar
pub const OVERLAY_TITLE: &str = "##PerformanceMonitor";

const TITLE_COLOR: Rgba = [0.4, 0.8, 1.0, 1.0];
const RESOLUTION_COLOR: Rgba = [0.7, 0.7, 0.7, 1.0];
const LABEL_COLOR: Rgba = [0.8, 0.9, 1.0, 1.0];
const RAY_RATE_COLOR: Rgba = [0.5, 0.9, 0.7, 1.0];
const SAMPLES_COLOR: Rgba = [0.6, 0.8, 1.0, 1.0];
const VALUE_COLUMN: f32 = 110.0;
const CONTENT_INDENT: f32 = 8.0;

/// Frame rate quality band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRateBand {
    /// At or above 60 fps
    Good,
    /// At or above 30 fps and below 60
    Fair,
    /// Below 30 fps
    Poor,
}

impl FrameRateBand {
    /// Lowest frame rate in the good band
    pub const GOOD_THRESHOLD: f32 = 60.0;
    /// Lowest frame rate in the fair band
    pub const FAIR_THRESHOLD: f32 = 30.0;

    /// Band for `frame_rate`; NaN falls in the poor band
    pub fn classify(frame_rate: f32) -> Self {
        if frame_rate >= Self::GOOD_THRESHOLD {
            Self::Good
        } else if frame_rate >= Self::FAIR_THRESHOLD {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Display colour
    pub fn color(self) -> Rgba {
        match self {
            Self::Good => [0.3, 0.9, 0.3, 1.0],
            Self::Fair => [0.9, 0.7, 0.2, 1.0],
            Self::Poor => [0.9, 0.3, 0.3, 1.0],
        }
    }
}

/// Fixed-width value strings, so the window does not jitter as digit counts change
pub fn format_frame_rate(frame_rate: f32) -> String {
    format!("{:6.1} fps", frame_rate)
}

/// Ray throughput in giga-rays per second
pub fn format_ray_rate(ray_rate: f32) -> String {
    format!("{:6.2} Gr/s", ray_rate)
}

/// Accumulated sample count
pub fn format_samples(total_samples: u32) -> String {
    format!("{:8}", total_samples)
}

/// Performance overlay builder
#[derive(Debug, Clone)]
pub struct PerformanceOverlay {
    margin: f32,
}

impl PerformanceOverlay {
    /// Create an overlay `margin` pixels from the top-left corner
    pub fn new(margin: f32) -> Self {
        Self { margin }
    }

    /// Window placement and behaviour
    pub fn window_spec(&self) -> WindowSpec<'static> {
        WindowSpec {
            title: OVERLAY_TITLE,
            anchor: Anchor::TopLeft,
            margin: self.margin,
            options: WindowOptions::AUTO_RESIZE
                | WindowOptions::NO_DECORATION
                | WindowOptions::NO_FOCUS_ON_APPEARING
                | WindowOptions::NO_MOVE
                | WindowOptions::NO_NAV
                | WindowOptions::NO_SAVED_SETTINGS,
        }
    }

    /// Emit the overlay; emits nothing when `visible` is false
    pub fn build<F: GuiFrame>(&self, frame: &mut F, visible: bool, stats: &Statistics) {
        if !visible {
            return;
        }

        let spec = self.window_spec();
        let mut themed = ThemeScope::push(frame, &OVERLAY_THEME);
        themed.window(&spec, None, |ui| Self::contents(ui, stats));
    }

    fn contents<F: GuiFrame>(ui: &mut F, stats: &Statistics) {
        ui.dummy([0.0, 4.0]);
        ui.indent(CONTENT_INDENT);

        ui.text_colored(TITLE_COLOR, "PERFORMANCE MONITOR");
        let [width, height] = stats.framebuffer_size;
        ui.text_colored(RESOLUTION_COLOR, &format!("Resolution: {}x{}", width, height));

        {
            let mut accent = ThemeScope::push(&mut *ui, &OVERLAY_SEPARATOR_THEME);
            accent.separator();
        }

        let band = FrameRateBand::classify(stats.frame_rate);
        let rows = [
            ("Frame Rate:", band.color(), format_frame_rate(stats.frame_rate)),
            ("Ray Rate:", RAY_RATE_COLOR, format_ray_rate(stats.ray_rate)),
            ("Samples:", SAMPLES_COLOR, format_samples(stats.total_samples)),
        ];
        for (label, color, value) in &rows {
            ui.text_colored(LABEL_COLOR, label);
            ui.same_line_at(VALUE_COLUMN);
            ui.text_colored(*color, value);
        }

        ui.unindent(CONTENT_INDENT);
        ui.dummy([0.0, 4.0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{FrameEvent, RecordingFrame};

    fn stats() -> Statistics {
        Statistics {
            framebuffer_size: [1920, 1080],
            frame_rate: 59.9,
            ray_rate: 1.23,
            total_samples: 4096,
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(FrameRateBand::classify(60.0), FrameRateBand::Good);
        assert_eq!(FrameRateBand::classify(144.0), FrameRateBand::Good);
        assert_eq!(FrameRateBand::classify(59.9), FrameRateBand::Fair);
        assert_eq!(FrameRateBand::classify(30.0), FrameRateBand::Fair);
        assert_eq!(FrameRateBand::classify(29.99), FrameRateBand::Poor);
        assert_eq!(FrameRateBand::classify(0.0), FrameRateBand::Poor);
        assert_eq!(FrameRateBand::classify(f32::NAN), FrameRateBand::Poor);
    }

    #[test]
    fn test_fixed_width_values() {
        assert_eq!(format_frame_rate(59.9), "  59.9 fps");
        assert_eq!(format_frame_rate(144.3), " 144.3 fps");
        assert_eq!(format_ray_rate(1.234), "  1.23 Gr/s");
        assert_eq!(format_samples(4096), "    4096");
        assert_eq!(format_samples(7).len(), format_samples(12_345_678).len());
    }

    #[test]
    fn test_overlay_lines() {
        let overlay = PerformanceOverlay::new(10.0);
        let mut frame = RecordingFrame::new([1920.0, 1080.0]);
        overlay.build(&mut frame, true, &stats());

        let texts = frame.texts();
        assert!(texts.contains(&"PERFORMANCE MONITOR"));
        assert!(texts.contains(&"Resolution: 1920x1080"));
        assert!(texts.contains(&"  59.9 fps"));
        assert!(texts.contains(&"  1.23 Gr/s"));
        assert!(texts.contains(&"    4096"));
        assert_eq!(frame.color_of("  59.9 fps"), Some(FrameRateBand::Fair.color()));
        assert!(frame.events().contains(&FrameEvent::SameLine(Some(VALUE_COLUMN))));
        assert!(frame.is_balanced());
    }

    #[test]
    fn test_hidden_overlay_emits_nothing() {
        let overlay = PerformanceOverlay::new(10.0);
        let mut frame = RecordingFrame::new([1920.0, 1080.0]);
        overlay.build(&mut frame, false, &stats());
        assert!(frame.events().is_empty());
    }

    #[test]
    fn test_overlay_push_pop_counts() {
        let overlay = PerformanceOverlay::new(10.0);
        let mut frame = RecordingFrame::new([640.0, 480.0]);
        overlay.build(&mut frame, true, &stats());

        // Window theme plus the separator accent
        assert_eq!(frame.push_count(), 5);
        assert_eq!(frame.pop_count(), 5);
        assert_eq!(frame.window_titles(), vec![OVERLAY_TITLE]);
    }

    #[test]
    fn test_overlay_has_no_close_button() {
        let overlay = PerformanceOverlay::new(10.0);
        let mut frame = RecordingFrame::new([640.0, 480.0]);
        overlay.build(&mut frame, true, &stats());

        assert!(frame.events().iter().any(|event| matches!(
            event,
            FrameEvent::WindowBegin { closable: false, pivot, .. } if *pivot == [0.0, 0.0]
        )));
    }
}
