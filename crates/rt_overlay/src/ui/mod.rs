//! Overlay user interface
//!
//! Panels are written against the [`GuiFrame`] seam. [`ImguiFrame`] maps it onto Dear ImGui,
//! and [`OverlayCompositor`] drives a whole frame from input through to recorded draws.

pub mod compositor;
pub mod context;
pub mod frame;
pub mod imgui_frame;
pub mod panels;
pub mod performance_overlay;
pub mod platform;
pub mod renderer;
pub mod settings_panel;
pub mod theme;

#[cfg(test)]
pub(crate) mod testing;

pub use compositor::OverlayCompositor;
pub use context::{ContextLease, FontFace, GuiContext};
pub use frame::{Anchor, ColorSlot, FloatSlider, GuiFrame, Rgba, StyleVarOverride, WindowOptions, WindowSpec};
pub use imgui_frame::ImguiFrame;
pub use panels::OverlayPanels;
pub use performance_overlay::{FrameRateBand, PerformanceOverlay};
pub use platform::GlfwPlatform;
pub use renderer::OverlayRenderer;
pub use settings_panel::{MovementKeys, SettingsPanel};
pub use theme::{Theme, ThemeScope};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneRegistry;
    use crate::settings::UserSettings;
    use crate::statistics::Statistics;
    use crate::ui::context::tests::lock_gui_context;
    use std::time::Duration;

    fn build_frame(gui: &mut GuiContext, panels: &OverlayPanels, settings: &mut UserSettings) -> (i32, usize) {
        let stats = Statistics {
            framebuffer_size: [1280, 720],
            frame_rate: 75.0,
            ray_rate: 0.8,
            total_samples: 64,
        };

        let io = gui.io_mut();
        io.display_size = [1280.0, 720.0];
        io.update_delta_time(Duration::from_millis(16));

        let ui = gui.context_mut().new_frame();
        {
            let mut frame = ImguiFrame::new(ui);
            panels.build(&mut frame, settings, &stats);
        }
        let draw_data = gui.context_mut().render();
        (draw_data.total_vtx_count, draw_data.draw_lists_count())
    }

    #[test]
    fn test_panels_through_real_context() {
        let _guard = lock_gui_context();
        let mut gui = GuiContext::new(&FontFace::Builtin, 13.0, 1.0).expect("context");
        gui.context_mut().fonts().build_rgba32_texture();

        let registry = SceneRegistry::new(["Cube And Spheres", "Cornell Box", "Cornell Box & Lucy"]);
        let panels = OverlayPanels::new(registry.names().to_vec(), MovementKeys::default(), 10.0);
        let mut settings = UserSettings::default();

        // Auto-resizing windows stay hidden for their first frame while they measure
        build_frame(&mut gui, &panels, &mut settings);
        let (vertices, lists) = build_frame(&mut gui, &panels, &mut settings);
        assert!(vertices > 0);
        assert!(lists >= 2);
        // Nothing was clicked, so nothing was written
        assert_eq!(settings, UserSettings::default());

        settings.show_settings = false;
        settings.show_overlay = false;
        let (vertices, _) = build_frame(&mut gui, &panels, &mut settings);
        assert_eq!(vertices, 0);
        assert!(!gui.wants_keyboard());
    }
}
