//! Configuration panel
//!
//! Top-right window that binds its widgets straight to [`UserSettings`]. There is no apply step:
//! a slider dragged this frame has already written the field when `build` returns.

use crate::settings::{
    UserSettings, APERTURE_RANGE, BOUNCES_RANGE, FIELD_OF_VIEW_RANGE, FOCUS_DISTANCE_RANGE, HEATMAP_SCALE_RANGE,
    SAMPLES_RANGE,
};

use super::frame::{Anchor, FloatSlider, GuiFrame, Rgba, WindowOptions, WindowSpec};
use super::theme::{ThemeScope, SETTINGS_THEME};

/// Window title
pub const SETTINGS_TITLE: &str = "Configuration Panel";

const HINT_COLOR: Rgba = [0.7, 0.9, 1.0, 1.0];
const SECTION_INDENT: f32 = 12.0;
const CHECKBOX_COLUMN: f32 = 180.0;
const SLIDER_COLUMN: f32 = 120.0;
const SLIDER_WIDTH: f32 = 160.0;

/// Printable names of the four camera movement keys
///
/// Names follow the active keyboard layout, so an AZERTY user sees `ZQSD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementKeys {
    /// Forward, left, backward, right
    pub keys: [char; 4],
}

impl MovementKeys {
    /// Physical keys in QWERTY position order
    pub const QWERTY: [char; 4] = ['W', 'A', 'S', 'D'];

    /// Resolve names through `lookup`, keeping the QWERTY letter where it has none
    pub fn resolve<F>(mut lookup: F) -> Self
    where
        F: FnMut(char) -> Option<String>,
    {
        let keys = Self::QWERTY.map(|fallback| {
            lookup(fallback)
                .and_then(|name| name.chars().next())
                .and_then(|c| c.to_uppercase().next())
                .unwrap_or(fallback)
        });
        Self { keys }
    }

    fn hint(&self) -> String {
        let [forward, left, backward, right] = self.keys;
        format!("{}{}{}{}/SHIFT/CTRL:", forward, left, backward, right)
    }
}

impl Default for MovementKeys {
    fn default() -> Self {
        Self { keys: Self::QWERTY }
    }
}

/// Configuration panel builder
#[derive(Debug, Clone)]
pub struct SettingsPanel {
    scenes: Vec<String>,
    movement_keys: MovementKeys,
    margin: f32,
}

impl SettingsPanel {
    /// Create a panel listing `scenes` in the scene selector
    pub fn new(scenes: Vec<String>, movement_keys: MovementKeys, margin: f32) -> Self {
        Self {
            scenes,
            movement_keys,
            margin,
        }
    }

    /// Scene names shown in the selector
    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Window placement and behaviour
    pub fn window_spec(&self) -> WindowSpec<'static> {
        WindowSpec {
            title: SETTINGS_TITLE,
            anchor: Anchor::TopRight,
            margin: self.margin,
            options: WindowOptions::AUTO_RESIZE
                | WindowOptions::NO_COLLAPSE
                | WindowOptions::NO_MOVE
                | WindowOptions::NO_RESIZE
                | WindowOptions::NO_SAVED_SETTINGS,
        }
    }

    /// Emit the panel, writing any widget change into `settings`
    ///
    /// Emits nothing at all while `show_settings` is false. Out-of-range values set elsewhere
    /// are clamped before the widgets read them.
    pub fn build<F: GuiFrame>(&self, frame: &mut F, settings: &mut UserSettings) {
        if !settings.show_settings {
            return;
        }

        settings.clamp_to_ranges(self.scenes.len());

        let spec = self.window_spec();
        let mut open = settings.show_settings;
        {
            let mut themed = ThemeScope::push(frame, &SETTINGS_THEME);
            themed.window(&spec, Some(&mut open), |ui| {
                self.controls_section(ui);
                self.scene_section(ui, settings);
                Self::ray_tracing_section(ui, settings);
                Self::camera_section(ui, settings);
                Self::performance_section(ui, settings);
            });
        }
        settings.show_settings = open;
    }

    fn controls_section<F: GuiFrame>(&self, ui: &mut F) {
        if !ui.collapsing_header("Controls & Navigation") {
            return;
        }

        ui.indent(SECTION_INDENT);
        let hints = [
            ("F1:".to_string(), "Toggle Configuration Panel"),
            ("F2:".to_string(), "Toggle Performance Statistics"),
            (self.movement_keys.hint(), "Camera Movement"),
            ("L/R Mouse:".to_string(), "Rotate Camera/Scene"),
        ];
        for (key, action) in &hints {
            ui.text_colored(HINT_COLOR, key);
            ui.same_line();
            ui.text(action);
        }
        ui.unindent(SECTION_INDENT);
        ui.spacing();
    }

    fn scene_section<F: GuiFrame>(&self, ui: &mut F, settings: &mut UserSettings) {
        if !ui.collapsing_header("Scene Management") {
            return;
        }

        ui.indent(SECTION_INDENT);
        ui.text("Active Scene:");
        if !self.scenes.is_empty() {
            ui.set_next_item_width(-1.0);
            ui.combo("##SceneList", &mut settings.scene_index, &self.scenes);
        }
        ui.unindent(SECTION_INDENT);
        ui.spacing();
    }

    fn ray_tracing_section<F: GuiFrame>(ui: &mut F, settings: &mut UserSettings) {
        if !ui.collapsing_header("Ray Tracing Engine") {
            return;
        }

        ui.indent(SECTION_INDENT);
        labelled_checkbox(ui, "Enable Ray Tracing:", "##EnableRT", &mut settings.is_ray_traced);
        labelled_checkbox(ui, "Frame Accumulation:", "##AccumulateRays", &mut settings.accumulate_rays);
        ui.separator();

        ui.text("Quality Settings:");
        ui.text("Sample Count:");
        ui.same_line_at(SLIDER_COLUMN);
        ui.set_next_item_width(SLIDER_WIDTH);
        ui.slider_u32("##Samples", SAMPLES_RANGE, &mut settings.number_of_samples);

        ui.text("Bounce Limit:");
        ui.same_line_at(SLIDER_COLUMN);
        ui.set_next_item_width(SLIDER_WIDTH);
        ui.slider_u32("##Bounces", BOUNCES_RANGE, &mut settings.number_of_bounces);

        ui.unindent(SECTION_INDENT);
        ui.spacing();
    }

    fn camera_section<F: GuiFrame>(ui: &mut F, settings: &mut UserSettings) {
        if !ui.collapsing_header("Camera Properties") {
            return;
        }

        ui.indent(SECTION_INDENT);
        labelled_slider(
            ui,
            "Field of View:",
            &FloatSlider::new("##FoV", FIELD_OF_VIEW_RANGE, "%.0f°"),
            &mut settings.field_of_view,
        );
        labelled_slider(
            ui,
            "Aperture:",
            &FloatSlider::new("##Aperture", APERTURE_RANGE, "f/%.2f"),
            &mut settings.aperture,
        );
        labelled_slider(
            ui,
            "Focus Distance:",
            &FloatSlider::new("##Focus", FOCUS_DISTANCE_RANGE, "%.1fm"),
            &mut settings.focus_distance,
        );
        ui.unindent(SECTION_INDENT);
        ui.spacing();
    }

    fn performance_section<F: GuiFrame>(ui: &mut F, settings: &mut UserSettings) {
        if !ui.collapsing_header("Performance Analysis") {
            return;
        }

        ui.indent(SECTION_INDENT);
        labelled_checkbox(ui, "Heat Map Overlay:", "##ShowHeatmap", &mut settings.show_heatmap);

        // The scale slider follows the toggle within the same frame
        if settings.show_heatmap {
            labelled_slider(
                ui,
                "Intensity Scale:",
                &FloatSlider::new("##HeatmapScale", HEATMAP_SCALE_RANGE, "%.2fx").logarithmic(),
                &mut settings.heatmap_scale,
            );
        }
        ui.unindent(SECTION_INDENT);
    }
}

fn labelled_checkbox<F: GuiFrame>(ui: &mut F, text: &str, id: &str, value: &mut bool) {
    ui.align_text_to_frame_padding();
    ui.text(text);
    ui.same_line_at(CHECKBOX_COLUMN);
    ui.checkbox(id, value);
}

fn labelled_slider<F: GuiFrame>(ui: &mut F, text: &str, slider: &FloatSlider<'_>, value: &mut f32) {
    ui.text(text);
    ui.same_line_at(SLIDER_COLUMN);
    ui.set_next_item_width(SLIDER_WIDTH);
    ui.slider_f32(slider, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{FrameEvent, RecordingFrame};
    use approx::assert_relative_eq;

    fn panel(scene_count: usize) -> SettingsPanel {
        let scenes = (0..scene_count).map(|i| format!("Scene {}", i)).collect();
        SettingsPanel::new(scenes, MovementKeys::default(), 10.0)
    }

    fn build(panel: &SettingsPanel, frame: &mut RecordingFrame, settings: &mut UserSettings) {
        frame.clear_events();
        panel.build(frame, settings);
    }

    #[test]
    fn test_hidden_panel_emits_nothing() {
        let panel = panel(3);
        let mut frame = RecordingFrame::new([1280.0, 720.0]);
        let mut settings = UserSettings {
            show_settings: false,
            ..UserSettings::default()
        };

        build(&panel, &mut frame, &mut settings);
        assert!(frame.events().is_empty());

        settings.show_settings = true;
        build(&panel, &mut frame, &mut settings);
        assert_eq!(frame.window_titles(), vec![SETTINGS_TITLE]);
        assert_eq!(frame.push_count(), 12);
        assert_eq!(frame.pop_count(), 12);
        assert!(frame.is_balanced());
    }

    #[test]
    fn test_window_pinned_top_right() {
        let panel = panel(1);
        let mut frame = RecordingFrame::new([1280.0, 720.0]);
        let mut settings = UserSettings::default();
        build(&panel, &mut frame, &mut settings);

        let begin = frame
            .events()
            .iter()
            .find(|event| matches!(event, FrameEvent::WindowBegin { .. }))
            .cloned();
        match begin {
            Some(FrameEvent::WindowBegin {
                position,
                pivot,
                options,
                closable,
                ..
            }) => {
                assert_relative_eq!(position[0], 1270.0);
                assert_relative_eq!(position[1], 10.0);
                assert_eq!(pivot, [1.0, 0.0]);
                assert!(options.contains(WindowOptions::AUTO_RESIZE | WindowOptions::NO_SAVED_SETTINGS));
                assert!(closable);
            }
            other => panic!("expected window begin, got {:?}", other),
        }
    }

    #[test]
    fn test_sections_in_display_order() {
        let panel = panel(2);
        let mut frame = RecordingFrame::new([1280.0, 720.0]);
        let mut settings = UserSettings::default();
        build(&panel, &mut frame, &mut settings);

        let headers: Vec<_> = frame
            .events()
            .iter()
            .filter_map(|event| match event {
                FrameEvent::CollapsingHeader(label) => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headers,
            vec![
                "Controls & Navigation",
                "Scene Management",
                "Ray Tracing Engine",
                "Camera Properties",
                "Performance Analysis"
            ]
        );
    }

    #[test]
    fn test_close_button_hides_panel() {
        let panel = panel(1);
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        frame.click_close(SETTINGS_TITLE);
        let mut settings = UserSettings::default();

        build(&panel, &mut frame, &mut settings);
        assert!(!settings.show_settings);
        assert!(frame.is_balanced());

        build(&panel, &mut frame, &mut settings);
        assert!(frame.events().is_empty());
    }

    #[test]
    fn test_scene_selection_round_trip() {
        let panel = panel(4);
        for index in 0..4 {
            let mut frame = RecordingFrame::new([800.0, 600.0]);
            frame.select_combo("##SceneList", index);
            let mut settings = UserSettings::default();

            build(&panel, &mut frame, &mut settings);
            assert_eq!(settings.scene_index, index);
        }
    }

    #[test]
    fn test_sliders_clamp_to_declared_ranges() {
        let panel = panel(1);
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        frame
            .drag_u32("##Samples", 500)
            .drag_u32("##Bounces", 0)
            .drag_f32("##FoV", 179.0)
            .drag_f32("##Aperture", -3.0)
            .drag_f32("##Focus", 0.0)
            .drag_f32("##HeatmapScale", 50.0)
            .set_checkbox("##ShowHeatmap", true);
        let mut settings = UserSettings::default();

        build(&panel, &mut frame, &mut settings);

        assert_eq!(settings.number_of_samples, 128);
        assert_eq!(settings.number_of_bounces, 1);
        assert_relative_eq!(settings.field_of_view, 90.0);
        assert_relative_eq!(settings.aperture, 0.0);
        assert_relative_eq!(settings.focus_distance, 0.1);
        assert_relative_eq!(settings.heatmap_scale, 10.0);
        assert!(settings.is_within_ranges(1));
    }

    #[test]
    fn test_out_of_range_values_clamped_on_read() {
        let panel = panel(2);
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        let mut settings = UserSettings {
            number_of_samples: 0,
            field_of_view: 200.0,
            scene_index: 9,
            ..UserSettings::default()
        };

        build(&panel, &mut frame, &mut settings);

        assert_eq!(settings.number_of_samples, 1);
        assert_relative_eq!(settings.field_of_view, 90.0);
        assert_eq!(settings.scene_index, 1);
        assert!(frame.events().contains(&FrameEvent::SliderU32 {
            label: "##Samples".to_string(),
            range: 1..=128,
            value: 1,
        }));
    }

    #[test]
    fn test_heatmap_scale_follows_toggle() {
        let panel = panel(1);
        let has_scale = |frame: &RecordingFrame| {
            frame.events().iter().any(|event| {
                matches!(event, FrameEvent::SliderF32 { label, logarithmic: true, .. } if label == "##HeatmapScale")
            })
        };

        let mut frame = RecordingFrame::new([800.0, 600.0]);
        let mut settings = UserSettings::default();
        build(&panel, &mut frame, &mut settings);
        assert!(!has_scale(&frame));

        frame.set_checkbox("##ShowHeatmap", true);
        build(&panel, &mut frame, &mut settings);
        assert!(settings.show_heatmap);
        assert!(has_scale(&frame));
    }

    #[test]
    fn test_collapsed_window_still_balanced() {
        let panel = panel(1);
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        frame.collapse_window(SETTINGS_TITLE);
        let mut settings = UserSettings::default();

        build(&panel, &mut frame, &mut settings);
        assert!(frame.is_balanced());
        assert!(frame.texts().is_empty());
    }

    #[test]
    fn test_movement_keys_follow_layout() {
        let azerty = MovementKeys::resolve(|key| match key {
            'W' => Some("z".to_string()),
            'A' => Some("q".to_string()),
            _ => None,
        });
        assert_eq!(azerty.keys, ['Z', 'Q', 'S', 'D']);
        assert_eq!(azerty.hint(), "ZQSD/SHIFT/CTRL:");
        assert_eq!(MovementKeys::resolve(|_| Some(String::new())), MovementKeys::default());
    }

    #[test]
    fn test_empty_registry_has_no_combo() {
        let panel = panel(0);
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        let mut settings = UserSettings::default();
        build(&panel, &mut frame, &mut settings);

        assert!(!frame
            .events()
            .iter()
            .any(|event| matches!(event, FrameEvent::Combo(..))));
        assert_eq!(settings.scene_index, 0);
    }
}
