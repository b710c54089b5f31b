//! Recording [`GuiFrame`] for panel tests
//!
//! Records every emission in order and answers interactive widgets from scripted inputs, applying
//! the same range clamping the live sliders do.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use super::frame::{ColorSlot, FloatSlider, GuiFrame, Rgba, StyleVarOverride, WindowOptions, WindowSpec};

/// One recorded emission
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    WindowBegin {
        title: String,
        position: [f32; 2],
        pivot: [f32; 2],
        options: WindowOptions,
        closable: bool,
    },
    WindowEnd,
    PushStyleVar(StyleVarOverride),
    PopStyleVars(usize),
    PushStyleColor(ColorSlot, Rgba),
    PopStyleColors(usize),
    CollapsingHeader(String),
    Text(String),
    TextColored(Rgba, String),
    SameLine(Option<f32>),
    Indent(f32),
    Unindent(f32),
    Separator,
    Spacing,
    Dummy([f32; 2]),
    AlignText,
    ItemWidth(f32),
    Checkbox(String, bool),
    Combo(String, usize, Vec<String>),
    SliderU32 {
        label: String,
        range: RangeInclusive<u32>,
        value: u32,
    },
    SliderF32 {
        label: String,
        min: f32,
        max: f32,
        format: String,
        logarithmic: bool,
        value: f32,
    },
}

/// Recording frame with scripted widget inputs
#[derive(Debug, Default)]
pub struct RecordingFrame {
    display_size: [f32; 2],
    events: Vec<FrameEvent>,
    style_depth: usize,
    color_depth: usize,
    style_underflow: bool,
    color_underflow: bool,
    checkbox_inputs: HashMap<String, bool>,
    combo_inputs: HashMap<String, usize>,
    slider_u32_inputs: HashMap<String, u32>,
    slider_f32_inputs: HashMap<String, f32>,
    closed_windows: HashSet<String>,
    collapsed_windows: HashSet<String>,
    collapsed_headers: HashSet<String>,
}

impl RecordingFrame {
    pub fn new(display_size: [f32; 2]) -> Self {
        Self {
            display_size,
            ..Self::default()
        }
    }

    /// Checkbox `label` is clicked to `value`
    pub fn set_checkbox(&mut self, label: &str, value: bool) -> &mut Self {
        self.checkbox_inputs.insert(label.to_string(), value);
        self
    }

    /// Combo `label` selects `index`
    pub fn select_combo(&mut self, label: &str, index: usize) -> &mut Self {
        self.combo_inputs.insert(label.to_string(), index);
        self
    }

    /// Slider `label` is dragged to `value` (clamped like the live widget)
    pub fn drag_u32(&mut self, label: &str, value: u32) -> &mut Self {
        self.slider_u32_inputs.insert(label.to_string(), value);
        self
    }

    /// Slider `label` is dragged to `value` (clamped like the live widget)
    pub fn drag_f32(&mut self, label: &str, value: f32) -> &mut Self {
        self.slider_f32_inputs.insert(label.to_string(), value);
        self
    }

    /// Close button of window `title` is clicked
    pub fn click_close(&mut self, title: &str) -> &mut Self {
        self.closed_windows.insert(title.to_string());
        self
    }

    /// Window `title` is collapsed, so its body is skipped
    pub fn collapse_window(&mut self, title: &str) -> &mut Self {
        self.collapsed_windows.insert(title.to_string());
        self
    }

    /// Header `label` is collapsed
    pub fn collapse_header(&mut self, label: &str) -> &mut Self {
        self.collapsed_headers.insert(label.to_string());
        self
    }

    pub fn events(&self) -> &[FrameEvent] {
        &self.events
    }

    /// Drop recorded events, keeping scripted inputs
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn style_depth(&self) -> usize {
        self.style_depth
    }

    pub fn color_depth(&self) -> usize {
        self.color_depth
    }

    /// Both stacks are back to zero and never popped below it
    pub fn is_balanced(&self) -> bool {
        self.style_depth == 0 && self.color_depth == 0 && !self.style_underflow && !self.color_underflow
    }

    /// Titles of windows that began
    pub fn window_titles(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                FrameEvent::WindowBegin { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every piece of text emitted, coloured or not
    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                FrameEvent::Text(text) | FrameEvent::TextColored(_, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Colour of the first coloured text equal to `text`
    pub fn color_of(&self, text: &str) -> Option<Rgba> {
        self.events.iter().find_map(|event| match event {
            FrameEvent::TextColored(color, t) if t == text => Some(*color),
            _ => None,
        })
    }

    /// Number of style and colour pushes recorded
    pub fn push_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, FrameEvent::PushStyleVar(_) | FrameEvent::PushStyleColor(..)))
            .count()
    }

    /// Number of style and colour entries popped
    pub fn pop_count(&self) -> usize {
        self.events
            .iter()
            .map(|event| match event {
                FrameEvent::PopStyleVars(n) | FrameEvent::PopStyleColors(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

impl GuiFrame for RecordingFrame {
    fn display_size(&self) -> [f32; 2] {
        self.display_size
    }

    fn window<B>(&mut self, spec: &WindowSpec<'_>, open: Option<&mut bool>, body: B) -> bool
    where
        B: FnOnce(&mut Self),
    {
        let (position, pivot) = spec.placement(self.display_size);
        self.events.push(FrameEvent::WindowBegin {
            title: spec.title.to_string(),
            position,
            pivot,
            options: spec.options,
            closable: open.is_some(),
        });

        if let Some(open) = open {
            if self.closed_windows.contains(spec.title) {
                *open = false;
            }
        }

        let visible = !self.collapsed_windows.contains(spec.title);
        if visible {
            body(self);
        }
        self.events.push(FrameEvent::WindowEnd);
        visible
    }

    fn push_style_var(&mut self, var: StyleVarOverride) {
        self.style_depth += 1;
        self.events.push(FrameEvent::PushStyleVar(var));
    }

    fn pop_style_vars(&mut self, count: usize) {
        self.style_underflow |= count > self.style_depth;
        self.style_depth = self.style_depth.saturating_sub(count);
        self.events.push(FrameEvent::PopStyleVars(count));
    }

    fn push_style_color(&mut self, slot: ColorSlot, color: Rgba) {
        self.color_depth += 1;
        self.events.push(FrameEvent::PushStyleColor(slot, color));
    }

    fn pop_style_colors(&mut self, count: usize) {
        self.color_underflow |= count > self.color_depth;
        self.color_depth = self.color_depth.saturating_sub(count);
        self.events.push(FrameEvent::PopStyleColors(count));
    }

    fn collapsing_header(&mut self, label: &str) -> bool {
        self.events.push(FrameEvent::CollapsingHeader(label.to_string()));
        !self.collapsed_headers.contains(label)
    }

    fn text(&mut self, text: &str) {
        self.events.push(FrameEvent::Text(text.to_string()));
    }

    fn text_colored(&mut self, color: Rgba, text: &str) {
        self.events.push(FrameEvent::TextColored(color, text.to_string()));
    }

    fn same_line(&mut self) {
        self.events.push(FrameEvent::SameLine(None));
    }

    fn same_line_at(&mut self, x: f32) {
        self.events.push(FrameEvent::SameLine(Some(x)));
    }

    fn indent(&mut self, width: f32) {
        self.events.push(FrameEvent::Indent(width));
    }

    fn unindent(&mut self, width: f32) {
        self.events.push(FrameEvent::Unindent(width));
    }

    fn separator(&mut self) {
        self.events.push(FrameEvent::Separator);
    }

    fn spacing(&mut self) {
        self.events.push(FrameEvent::Spacing);
    }

    fn dummy(&mut self, size: [f32; 2]) {
        self.events.push(FrameEvent::Dummy(size));
    }

    fn align_text_to_frame_padding(&mut self) {
        self.events.push(FrameEvent::AlignText);
    }

    fn set_next_item_width(&mut self, width: f32) {
        self.events.push(FrameEvent::ItemWidth(width));
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let changed = match self.checkbox_inputs.get(label) {
            Some(&input) if input != *value => {
                *value = input;
                true
            }
            _ => false,
        };
        self.events.push(FrameEvent::Checkbox(label.to_string(), *value));
        changed
    }

    fn combo(&mut self, label: &str, current: &mut usize, items: &[String]) -> bool {
        let changed = match self.combo_inputs.get(label) {
            Some(&input) if input < items.len() && input != *current => {
                *current = input;
                true
            }
            _ => false,
        };
        self.events.push(FrameEvent::Combo(label.to_string(), *current, items.to_vec()));
        changed
    }

    fn slider_u32(&mut self, label: &str, range: RangeInclusive<u32>, value: &mut u32) -> bool {
        let before = *value;
        if let Some(&input) = self.slider_u32_inputs.get(label) {
            *value = input.clamp(*range.start(), *range.end());
        }
        self.events.push(FrameEvent::SliderU32 {
            label: label.to_string(),
            range,
            value: *value,
        });
        *value != before
    }

    fn slider_f32(&mut self, slider: &FloatSlider<'_>, value: &mut f32) -> bool {
        let before = *value;
        if let Some(&input) = self.slider_f32_inputs.get(slider.label) {
            *value = input.clamp(slider.min, slider.max);
        }
        self.events.push(FrameEvent::SliderF32 {
            label: slider.label.to_string(),
            min: slider.min,
            max: slider.max,
            format: slider.format.to_string(),
            logarithmic: slider.logarithmic,
            value: *value,
        });
        *value != before
    }
}
