//! User-adjustable render settings
//!
//! The record is owned by the host application and lent to the overlay for one
//! render call at a time. The settings panel is its only writer: every widget call
//! both draws the widget and, when the user interacts, writes the bound field in place.

use std::ops::RangeInclusive;

/// Samples per pixel per frame
pub const SAMPLES_RANGE: RangeInclusive<u32> = 1..=128;

/// Maximum ray bounces
pub const BOUNCES_RANGE: RangeInclusive<u32> = 1..=32;

/// Smallest vertical field of view in degrees
pub const FIELD_OF_VIEW_MIN: f32 = 10.0;

/// Largest vertical field of view in degrees
pub const FIELD_OF_VIEW_MAX: f32 = 90.0;

/// Vertical field of view in degrees
pub const FIELD_OF_VIEW_RANGE: RangeInclusive<f32> = FIELD_OF_VIEW_MIN..=FIELD_OF_VIEW_MAX;

/// Lens aperture
pub const APERTURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Focus distance in metres
pub const FOCUS_DISTANCE_RANGE: RangeInclusive<f32> = 0.1..=20.0;

/// Heatmap intensity multiplier
pub const HEATMAP_SCALE_RANGE: RangeInclusive<f32> = 0.10..=10.0;

/// Render settings shared between the host renderer and the settings panel
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    /// Show the configuration panel
    pub show_settings: bool,
    /// Show the performance overlay
    pub show_overlay: bool,
    /// Ray trace instead of rasterizing
    pub is_ray_traced: bool,
    /// Accumulate samples across frames
    pub accumulate_rays: bool,
    /// Display the per-pixel cost heatmap
    pub show_heatmap: bool,
    /// Samples per pixel per frame
    pub number_of_samples: u32,
    /// Maximum ray bounces
    pub number_of_bounces: u32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Lens aperture
    pub aperture: f32,
    /// Focus distance in metres
    pub focus_distance: f32,
    /// Heatmap intensity multiplier
    pub heatmap_scale: f32,
    /// Index into the scene registry
    pub scene_index: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            show_settings: true,
            show_overlay: true,
            is_ray_traced: true,
            accumulate_rays: true,
            show_heatmap: false,
            number_of_samples: 8,
            number_of_bounces: 16,
            field_of_view: 40.0,
            aperture: 0.1,
            focus_distance: 10.0,
            heatmap_scale: 1.5,
            scene_index: 0,
        }
    }
}

impl UserSettings {
    /// Pull every numeric field into its declared range
    ///
    /// The scene index is clamped to `scene_count - 1`, or 0 for an empty registry.
    /// Non-finite floats snap to the lower bound.
    pub fn clamp_to_ranges(&mut self, scene_count: usize) {
        self.number_of_samples = clamp_u32(self.number_of_samples, &SAMPLES_RANGE);
        self.number_of_bounces = clamp_u32(self.number_of_bounces, &BOUNCES_RANGE);
        self.field_of_view = clamp_f32(self.field_of_view, &FIELD_OF_VIEW_RANGE);
        self.aperture = clamp_f32(self.aperture, &APERTURE_RANGE);
        self.focus_distance = clamp_f32(self.focus_distance, &FOCUS_DISTANCE_RANGE);
        self.heatmap_scale = clamp_f32(self.heatmap_scale, &HEATMAP_SCALE_RANGE);
        self.scene_index = self.scene_index.min(scene_count.saturating_sub(1));
    }

    /// Check every numeric field against its declared range
    pub fn is_within_ranges(&self, scene_count: usize) -> bool {
        SAMPLES_RANGE.contains(&self.number_of_samples)
            && BOUNCES_RANGE.contains(&self.number_of_bounces)
            && FIELD_OF_VIEW_RANGE.contains(&self.field_of_view)
            && APERTURE_RANGE.contains(&self.aperture)
            && FOCUS_DISTANCE_RANGE.contains(&self.focus_distance)
            && HEATMAP_SCALE_RANGE.contains(&self.heatmap_scale)
            && (self.scene_index < scene_count || (scene_count == 0 && self.scene_index == 0))
    }

    /// Whether accumulated samples must be discarded after moving from `previous` to `self`
    ///
    /// Panel visibility never affects the image.
    pub fn requires_accumulation_reset(&self, previous: &Self) -> bool {
        self.is_ray_traced != previous.is_ray_traced
            || self.accumulate_rays != previous.accumulate_rays
            || self.show_heatmap != previous.show_heatmap
            || self.number_of_samples != previous.number_of_samples
            || self.number_of_bounces != previous.number_of_bounces
            || self.field_of_view != previous.field_of_view
            || self.aperture != previous.aperture
            || self.focus_distance != previous.focus_distance
            || self.heatmap_scale != previous.heatmap_scale
            || self.scene_index != previous.scene_index
    }
}

fn clamp_u32(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn clamp_f32(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_within_ranges() {
        assert!(UserSettings::default().is_within_ranges(1));
    }

    #[test]
    fn test_clamp_pulls_values_into_range() {
        let mut settings = UserSettings {
            number_of_samples: 0,
            number_of_bounces: 500,
            field_of_view: 179.0,
            aperture: -0.5,
            focus_distance: 0.0,
            heatmap_scale: f32::NAN,
            scene_index: 7,
            ..UserSettings::default()
        };
        assert!(!settings.is_within_ranges(3));

        settings.clamp_to_ranges(3);

        assert_eq!(settings.number_of_samples, 1);
        assert_eq!(settings.number_of_bounces, 32);
        assert_relative_eq!(settings.field_of_view, FIELD_OF_VIEW_MAX);
        assert_relative_eq!(settings.aperture, 0.0);
        assert_relative_eq!(settings.focus_distance, 0.1);
        assert_relative_eq!(settings.heatmap_scale, 0.10);
        assert_eq!(settings.scene_index, 2);
        assert!(settings.is_within_ranges(3));
    }

    #[test]
    fn test_clamp_with_empty_registry() {
        let mut settings = UserSettings { scene_index: 4, ..UserSettings::default() };
        settings.clamp_to_ranges(0);
        assert_eq!(settings.scene_index, 0);
        assert!(settings.is_within_ranges(0));
    }

    #[test]
    fn test_clamp_keeps_in_range_values() {
        let mut settings = UserSettings::default();
        let before = settings.clone();
        settings.clamp_to_ranges(5);
        assert_eq!(settings, before);
    }

    #[test]
    fn test_visibility_does_not_reset_accumulation() {
        let previous = UserSettings::default();
        let toggled = UserSettings {
            show_settings: !previous.show_settings,
            show_overlay: !previous.show_overlay,
            ..previous.clone()
        };
        assert!(!toggled.requires_accumulation_reset(&previous));

        let moved = UserSettings { aperture: 0.5, ..previous.clone() };
        assert!(moved.requires_accumulation_reset(&previous));

        let rescened = UserSettings { scene_index: 1, ..previous.clone() };
        assert!(rescened.requires_accumulation_reset(&previous));
    }
}
