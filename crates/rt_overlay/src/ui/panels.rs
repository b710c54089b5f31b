//! Both overlay panels, built in their fixed order

use crate::settings::UserSettings;
use crate::statistics::Statistics;

use super::frame::GuiFrame;
use super::performance_overlay::PerformanceOverlay;
use super::settings_panel::{MovementKeys, SettingsPanel};

/// Configuration panel followed by the performance overlay
#[derive(Debug, Clone)]
pub struct OverlayPanels {
    settings: SettingsPanel,
    overlay: PerformanceOverlay,
}

impl OverlayPanels {
    /// Create the panels for a scene list
    pub fn new(scenes: Vec<String>, movement_keys: MovementKeys, margin: f32) -> Self {
        Self {
            settings: SettingsPanel::new(scenes, movement_keys, margin),
            overlay: PerformanceOverlay::new(margin),
        }
    }

    /// Emit one frame of both panels
    pub fn build<F: GuiFrame>(&self, frame: &mut F, settings: &mut UserSettings, stats: &Statistics) {
        self.settings.build(frame, settings);
        self.overlay.build(frame, settings.show_overlay, stats);
    }

    /// Get the configuration panel
    pub fn settings_panel(&self) -> &SettingsPanel {
        &self.settings
    }
}
