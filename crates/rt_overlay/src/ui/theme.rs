//! Window themes and the scope guard that applies them
//!
//! A theme is pushed as one unit and popped as one unit. [`ThemeScope`] pops on drop, so every
//! exit from a themed block (early return included) leaves the style stacks as it found them.

use std::ops::{Deref, DerefMut};

use super::frame::{ColorSlot, GuiFrame, Rgba, StyleVarOverride};

/// Fixed set of style variable and colour overrides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Style variables, pushed in order
    pub style_vars: &'static [StyleVarOverride],
    /// Colours, pushed in order
    pub colors: &'static [(ColorSlot, Rgba)],
}

impl Theme {
    /// Number of overrides this theme pushes onto each stack
    pub fn push_counts(&self) -> (usize, usize) {
        (self.style_vars.len(), self.colors.len())
    }
}

/// Configuration panel window theme
pub const SETTINGS_THEME: Theme = Theme {
    style_vars: &[
        StyleVarOverride::WindowRounding(8.0),
        StyleVarOverride::WindowPadding([16.0, 16.0]),
        StyleVarOverride::ItemSpacing([8.0, 12.0]),
        StyleVarOverride::FrameRounding(4.0),
        StyleVarOverride::ScrollbarRounding(6.0),
    ],
    colors: &[
        (ColorSlot::WindowBg, [0.12, 0.14, 0.18, 0.95]),
        (ColorSlot::Header, [0.2, 0.25, 0.3, 0.8]),
        (ColorSlot::HeaderHovered, [0.25, 0.3, 0.35, 0.8]),
        (ColorSlot::HeaderActive, [0.3, 0.35, 0.4, 0.8]),
        (ColorSlot::Button, [0.2, 0.25, 0.3, 0.6]),
        (ColorSlot::ButtonHovered, [0.25, 0.3, 0.35, 0.8]),
        (ColorSlot::ButtonActive, [0.3, 0.35, 0.4, 0.8]),
    ],
};

/// Performance overlay window theme
pub const OVERLAY_THEME: Theme = Theme {
    style_vars: &[
        StyleVarOverride::WindowRounding(8.0),
        StyleVarOverride::ItemSpacing([6.0, 4.0]),
    ],
    colors: &[
        (ColorSlot::WindowBg, [0.08, 0.12, 0.16, 0.85]),
        (ColorSlot::Text, [0.9, 0.95, 1.0, 1.0]),
    ],
};

/// Separator accent inside the performance overlay
pub const OVERLAY_SEPARATOR_THEME: Theme = Theme {
    style_vars: &[],
    colors: &[(ColorSlot::Separator, [0.4, 0.6, 0.8, 0.5])],
};

/// Pushes a theme on creation and pops exactly what it pushed on drop
///
/// Dereferences to the frame so widgets are emitted through the scope while it is alive.
pub struct ThemeScope<'f, F: GuiFrame> {
    frame: &'f mut F,
    style_vars: usize,
    colors: usize,
}

impl<'f, F: GuiFrame> ThemeScope<'f, F> {
    /// Push every override in `theme`
    pub fn push(frame: &'f mut F, theme: &Theme) -> Self {
        for &var in theme.style_vars {
            frame.push_style_var(var);
        }
        for &(slot, color) in theme.colors {
            frame.push_style_color(slot, color);
        }

        let (style_vars, colors) = theme.push_counts();
        Self {
            frame,
            style_vars,
            colors,
        }
    }
}

impl<F: GuiFrame> Deref for ThemeScope<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.frame
    }
}

impl<F: GuiFrame> DerefMut for ThemeScope<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.frame
    }
}

impl<F: GuiFrame> Drop for ThemeScope<'_, F> {
    fn drop(&mut self) {
        if self.colors > 0 {
            self.frame.pop_style_colors(self.colors);
        }
        if self.style_vars > 0 {
            self.frame.pop_style_vars(self.style_vars);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{FrameEvent, RecordingFrame};

    #[test]
    fn test_scope_pops_what_it_pushed() {
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        {
            let mut scope = ThemeScope::push(&mut frame, &SETTINGS_THEME);
            scope.text("inside");
            assert_eq!(scope.style_depth(), 5);
            assert_eq!(scope.color_depth(), 7);
        }

        assert_eq!(frame.style_depth(), 0);
        assert_eq!(frame.color_depth(), 0);
        assert!(frame.is_balanced());
    }

    #[test]
    fn test_scope_pops_on_early_return() {
        fn build(frame: &mut RecordingFrame, bail: bool) -> Option<()> {
            let mut scope = ThemeScope::push(frame, &OVERLAY_THEME);
            if bail {
                return None;
            }
            scope.text("reached");
            Some(())
        }

        let mut frame = RecordingFrame::new([800.0, 600.0]);
        assert!(build(&mut frame, true).is_none());
        assert!(frame.is_balanced());
        assert!(!frame.events().contains(&FrameEvent::Text("reached".to_string())));
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        {
            let mut outer = ThemeScope::push(&mut frame, &OVERLAY_THEME);
            {
                let inner = ThemeScope::push(&mut *outer, &OVERLAY_SEPARATOR_THEME);
                assert_eq!(inner.color_depth(), 3);
            }
            assert_eq!(outer.color_depth(), 2);
        }
        assert!(frame.is_balanced());

        let pops: Vec<_> = frame
            .events()
            .iter()
            .filter(|event| matches!(event, FrameEvent::PopStyleColors(_) | FrameEvent::PopStyleVars(_)))
            .cloned()
            .collect();
        assert_eq!(
            pops,
            vec![
                FrameEvent::PopStyleColors(1),
                FrameEvent::PopStyleColors(2),
                FrameEvent::PopStyleVars(2)
            ]
        );
    }

    #[test]
    fn test_empty_theme_pushes_nothing() {
        const EMPTY: Theme = Theme {
            style_vars: &[],
            colors: &[],
        };
        let mut frame = RecordingFrame::new([800.0, 600.0]);
        drop(ThemeScope::push(&mut frame, &EMPTY));
        assert!(frame.events().is_empty());
    }
}
