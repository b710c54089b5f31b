//! [`GuiFrame`] over a live Dear ImGui frame

use std::ops::RangeInclusive;

use imgui::{
    ColorStackToken, Condition, SliderFlags, StyleColor, StyleStackToken, StyleVar, TreeNodeFlags, Ui, WindowFlags,
};

use super::frame::{ColorSlot, FloatSlider, GuiFrame, Rgba, StyleVarOverride, WindowOptions, WindowSpec};

/// Emits widgets into the frame opened by `imgui::Context::new_frame`
///
/// Style tokens pushed through the frame are held here until popped. Any still held when the
/// frame drops are popped then, so a frame can never leak style state into the next one.
pub struct ImguiFrame<'ui> {
    ui: &'ui Ui,
    style_vars: Vec<StyleStackToken<'ui>>,
    colors: Vec<ColorStackToken<'ui>>,
}

impl<'ui> ImguiFrame<'ui> {
    /// Wrap the frame's `Ui`
    pub fn new(ui: &'ui Ui) -> Self {
        Self {
            ui,
            style_vars: Vec::new(),
            colors: Vec::new(),
        }
    }
}

impl GuiFrame for ImguiFrame<'_> {
    fn display_size(&self) -> [f32; 2] {
        self.ui.io().display_size
    }

    fn window<B>(&mut self, spec: &WindowSpec<'_>, open: Option<&mut bool>, body: B) -> bool
    where
        B: FnOnce(&mut Self),
    {
        let ui = self.ui;
        let (position, pivot) = spec.placement(ui.io().display_size);

        let mut builder = ui
            .window(spec.title)
            .position(position, Condition::Always)
            .position_pivot(pivot)
            .flags(window_flags(spec.options));
        if let Some(open) = open {
            builder = builder.opened(open);
        }

        match builder.begin() {
            Some(token) => {
                body(self);
                token.end();
                true
            }
            None => false,
        }
    }

    fn push_style_var(&mut self, var: StyleVarOverride) {
        self.style_vars.push(self.ui.push_style_var(style_var(var)));
    }

    fn pop_style_vars(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(token) = self.style_vars.pop() {
                token.pop();
            }
        }
    }

    fn push_style_color(&mut self, slot: ColorSlot, color: Rgba) {
        self.colors.push(self.ui.push_style_color(style_color(slot), color));
    }

    fn pop_style_colors(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(token) = self.colors.pop() {
                token.pop();
            }
        }
    }

    fn collapsing_header(&mut self, label: &str) -> bool {
        self.ui.collapsing_header(label, TreeNodeFlags::DEFAULT_OPEN)
    }

    fn text(&mut self, text: &str) {
        self.ui.text(text);
    }

    fn text_colored(&mut self, color: Rgba, text: &str) {
        self.ui.text_colored(color, text);
    }

    fn same_line(&mut self) {
        self.ui.same_line();
    }

    fn same_line_at(&mut self, x: f32) {
        self.ui.same_line_with_pos(x);
    }

    fn indent(&mut self, width: f32) {
        self.ui.indent_by(width);
    }

    fn unindent(&mut self, width: f32) {
        self.ui.unindent_by(width);
    }

    fn separator(&mut self) {
        self.ui.separator();
    }

    fn spacing(&mut self) {
        self.ui.spacing();
    }

    fn dummy(&mut self, size: [f32; 2]) {
        self.ui.dummy(size);
    }

    fn align_text_to_frame_padding(&mut self) {
        self.ui.align_text_to_frame_padding();
    }

    fn set_next_item_width(&mut self, width: f32) {
        self.ui.set_next_item_width(width);
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.ui.checkbox(label, value)
    }

    fn combo(&mut self, label: &str, current: &mut usize, items: &[String]) -> bool {
        self.ui.combo_simple_string(label, current, items)
    }

    fn slider_u32(&mut self, label: &str, range: RangeInclusive<u32>, value: &mut u32) -> bool {
        self.ui
            .slider_config(label, *range.start(), *range.end())
            .flags(SliderFlags::ALWAYS_CLAMP)
            .build(value)
    }

    fn slider_f32(&mut self, slider: &FloatSlider<'_>, value: &mut f32) -> bool {
        let mut flags = SliderFlags::ALWAYS_CLAMP;
        if slider.logarithmic {
            flags |= SliderFlags::LOGARITHMIC;
        }

        self.ui
            .slider_config(slider.label, slider.min, slider.max)
            .display_format(slider.format)
            .flags(flags)
            .build(value)
    }
}

fn window_flags(options: WindowOptions) -> WindowFlags {
    const MAPPING: [(WindowOptions, WindowFlags); 8] = [
        (WindowOptions::AUTO_RESIZE, WindowFlags::ALWAYS_AUTO_RESIZE),
        (WindowOptions::NO_COLLAPSE, WindowFlags::NO_COLLAPSE),
        (WindowOptions::NO_MOVE, WindowFlags::NO_MOVE),
        (WindowOptions::NO_RESIZE, WindowFlags::NO_RESIZE),
        (WindowOptions::NO_SAVED_SETTINGS, WindowFlags::NO_SAVED_SETTINGS),
        (WindowOptions::NO_DECORATION, WindowFlags::NO_DECORATION),
        (WindowOptions::NO_FOCUS_ON_APPEARING, WindowFlags::NO_FOCUS_ON_APPEARING),
        (WindowOptions::NO_NAV, WindowFlags::NO_NAV),
    ];

    MAPPING
        .iter()
        .filter(|(option, _)| options.contains(*option))
        .fold(WindowFlags::empty(), |flags, (_, flag)| flags | *flag)
}

fn style_var(var: StyleVarOverride) -> StyleVar {
    match var {
        StyleVarOverride::WindowRounding(r) => StyleVar::WindowRounding(r),
        StyleVarOverride::WindowPadding(p) => StyleVar::WindowPadding(p),
        StyleVarOverride::ItemSpacing(s) => StyleVar::ItemSpacing(s),
        StyleVarOverride::FrameRounding(r) => StyleVar::FrameRounding(r),
        StyleVarOverride::ScrollbarRounding(r) => StyleVar::ScrollbarRounding(r),
    }
}

fn style_color(slot: ColorSlot) -> StyleColor {
    match slot {
        ColorSlot::WindowBg => StyleColor::WindowBg,
        ColorSlot::Text => StyleColor::Text,
        ColorSlot::Header => StyleColor::Header,
        ColorSlot::HeaderHovered => StyleColor::HeaderHovered,
        ColorSlot::HeaderActive => StyleColor::HeaderActive,
        ColorSlot::Button => StyleColor::Button,
        ColorSlot::ButtonHovered => StyleColor::ButtonHovered,
        ColorSlot::ButtonActive => StyleColor::ButtonActive,
        ColorSlot::Separator => StyleColor::Separator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_flags_mapping() {
        let flags = window_flags(WindowOptions::AUTO_RESIZE | WindowOptions::NO_NAV);
        assert_eq!(flags, WindowFlags::ALWAYS_AUTO_RESIZE | WindowFlags::NO_NAV);
        assert_eq!(window_flags(WindowOptions::empty()), WindowFlags::empty());
        assert!(window_flags(WindowOptions::all()).contains(WindowFlags::NO_DECORATION | WindowFlags::NO_MOVE));
    }
}
