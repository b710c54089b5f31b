//! Widget vocabulary the overlay panels are written against
//!
//! Panels never touch `imgui::Ui` directly. They emit through [`GuiFrame`], which the live
//! implementation forwards to Dear ImGui and the test implementation records. Every widget call
//! is render-and-mutate: it draws the widget and may write the bound value in place, so a change
//! made this frame is what the next caller of the settings record observes.

use std::ops::RangeInclusive;

use bitflags::bitflags;

/// Linear RGBA colour
pub type Rgba = [f32; 4];

/// Screen corner a window is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Pinned to the top-left corner, growing right and down
    TopLeft,
    /// Pinned to the top-right corner, growing left and down
    TopRight,
}

bitflags! {
    /// Window behaviour options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowOptions: u32 {
        /// Size to fit the content every frame
        const AUTO_RESIZE = 1 << 0;
        /// No collapse arrow
        const NO_COLLAPSE = 1 << 1;
        /// Cannot be dragged
        const NO_MOVE = 1 << 2;
        /// Cannot be resized by the user
        const NO_RESIZE = 1 << 3;
        /// Never persisted to disk
        const NO_SAVED_SETTINGS = 1 << 4;
        /// No title bar, borders or scrollbars
        const NO_DECORATION = 1 << 5;
        /// Does not take focus when it first appears
        const NO_FOCUS_ON_APPEARING = 1 << 6;
        /// Skipped by keyboard and gamepad navigation
        const NO_NAV = 1 << 7;
    }
}

/// Placement and behaviour of one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSpec<'a> {
    /// Window title; `##` prefixed titles are hidden
    pub title: &'a str,
    /// Corner the window is pinned to
    pub anchor: Anchor,
    /// Distance from the anchoring corner in pixels
    pub margin: f32,
    /// Behaviour options
    pub options: WindowOptions,
}

impl<'a> WindowSpec<'a> {
    /// Position and pivot for a display of the given size
    ///
    /// The pivot is the point of the window that lands on the position, so a top-right anchor
    /// keeps the right edge fixed while the window auto-resizes.
    pub fn placement(&self, display_size: [f32; 2]) -> ([f32; 2], [f32; 2]) {
        match self.anchor {
            Anchor::TopLeft => ([self.margin, self.margin], [0.0, 0.0]),
            Anchor::TopRight => ([display_size[0] - self.margin, self.margin], [1.0, 0.0]),
        }
    }
}

/// Style variable override
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleVarOverride {
    /// Window corner radius
    WindowRounding(f32),
    /// Window inner padding
    WindowPadding([f32; 2]),
    /// Spacing between widgets
    ItemSpacing([f32; 2]),
    /// Frame corner radius
    FrameRounding(f32),
    /// Scrollbar grab radius
    ScrollbarRounding(f32),
}

/// Colour slot a theme may override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    /// Window background
    WindowBg,
    /// Text
    Text,
    /// Collapsing header
    Header,
    /// Collapsing header under the cursor
    HeaderHovered,
    /// Collapsing header while pressed
    HeaderActive,
    /// Button
    Button,
    /// Button under the cursor
    ButtonHovered,
    /// Button while pressed
    ButtonActive,
    /// Separator line
    Separator,
}

/// Float slider description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatSlider<'a> {
    /// Widget label (usually a hidden `##` id)
    pub label: &'a str,
    /// Closed range the value is clamped to
    pub min: f32,
    /// Closed range the value is clamped to
    pub max: f32,
    /// printf-style display format
    pub format: &'a str,
    /// Logarithmic rather than linear response
    pub logarithmic: bool,
}

impl<'a> FloatSlider<'a> {
    /// Linear slider over `range`
    pub fn new(label: &'a str, range: RangeInclusive<f32>, format: &'a str) -> Self {
        Self {
            label,
            min: *range.start(),
            max: *range.end(),
            format,
            logarithmic: false,
        }
    }

    /// Switch to a logarithmic response
    pub fn logarithmic(mut self) -> Self {
        self.logarithmic = true;
        self
    }
}

/// One frame's worth of widget emission
///
/// Pushes and pops must balance within a frame; [`crate::ui::theme::ThemeScope`] is the
/// intended way to push.
pub trait GuiFrame {
    /// Size of the display in logical pixels
    fn display_size(&self) -> [f32; 2];

    /// Build a window, calling `body` only when its content is visible
    ///
    /// When `open` is given the window shows a close button that writes `false` through it.
    /// Returns whether `body` ran.
    fn window<B>(&mut self, spec: &WindowSpec<'_>, open: Option<&mut bool>, body: B) -> bool
    where
        B: FnOnce(&mut Self);

    /// Push a style variable override
    fn push_style_var(&mut self, var: StyleVarOverride);

    /// Pop the `count` most recent style variable overrides
    fn pop_style_vars(&mut self, count: usize);

    /// Push a colour override
    fn push_style_color(&mut self, slot: ColorSlot, color: Rgba);

    /// Pop the `count` most recent colour overrides
    fn pop_style_colors(&mut self, count: usize);

    /// Collapsing header, open by default; returns whether it is open
    fn collapsing_header(&mut self, label: &str) -> bool;

    /// Text in the current colour
    fn text(&mut self, text: &str);

    /// Text in `color`
    fn text_colored(&mut self, color: Rgba, text: &str);

    /// Keep the next widget on the current line
    fn same_line(&mut self);

    /// Keep the next widget on the current line, starting at `x` from the window's left edge
    fn same_line_at(&mut self, x: f32);

    /// Indent following widgets
    fn indent(&mut self, width: f32);

    /// Undo an indent
    fn unindent(&mut self, width: f32);

    /// Horizontal separator
    fn separator(&mut self);

    /// Vertical spacing
    fn spacing(&mut self);

    /// Invisible item of `size`
    fn dummy(&mut self, size: [f32; 2]);

    /// Align upcoming text with framed widgets on the same line
    fn align_text_to_frame_padding(&mut self);

    /// Width of the next widget; negative values are relative to the right edge
    fn set_next_item_width(&mut self, width: f32);

    /// Checkbox bound to `value`; returns whether it changed
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Single-select combo bound to `current`; returns whether it changed
    fn combo(&mut self, label: &str, current: &mut usize, items: &[String]) -> bool;

    /// Integer slider clamped to `range`; returns whether it changed
    fn slider_u32(&mut self, label: &str, range: RangeInclusive<u32>, value: &mut u32) -> bool;

    /// Float slider; returns whether it changed
    fn slider_f32(&mut self, slider: &FloatSlider<'_>, value: &mut f32) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_top_right_placement_keeps_right_edge() {
        let spec = WindowSpec {
            title: "panel",
            anchor: Anchor::TopRight,
            margin: 10.0,
            options: WindowOptions::empty(),
        };
        let (position, pivot) = spec.placement([1280.0, 720.0]);
        assert_relative_eq!(position[0], 1270.0);
        assert_relative_eq!(position[1], 10.0);
        assert_eq!(pivot, [1.0, 0.0]);
    }

    #[test]
    fn test_top_left_placement_ignores_display_size() {
        let spec = WindowSpec {
            title: "overlay",
            anchor: Anchor::TopLeft,
            margin: 4.0,
            options: WindowOptions::NO_DECORATION,
        };
        assert_eq!(spec.placement([1.0, 1.0]), ([4.0, 4.0], [0.0, 0.0]));
        assert_eq!(spec.placement([3840.0, 2160.0]), ([4.0, 4.0], [0.0, 0.0]));
    }

    #[test]
    fn test_float_slider_from_range() {
        let slider = FloatSlider::new("##Scale", 0.1..=10.0, "%.2fx").logarithmic();
        assert_relative_eq!(slider.min, 0.1);
        assert_relative_eq!(slider.max, 10.0);
        assert!(slider.logarithmic);
    }
}
