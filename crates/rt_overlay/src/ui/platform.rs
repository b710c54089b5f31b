//! GLFW windowing adapter
//!
//! Feeds window events into the GUI input queue and keeps the display metrics the
//! next frame is laid out against.

use std::time::{Duration, Instant};

use glfw::{Action, Modifiers, WindowEvent};
use imgui::{Io, Key, MouseButton};

use crate::error::{OverlayError, OverlayResult};
use crate::render::vulkan::Window;

/// Shortest frame time reported to the GUI; a zero delta is rejected by its frame start
const MIN_DELTA_TIME: Duration = Duration::from_micros(100);

const MODIFIER_KEYS: [(Modifiers, Key); 4] = [
    (Modifiers::Control, Key::ModCtrl),
    (Modifiers::Shift, Key::ModShift),
    (Modifiers::Alt, Key::ModAlt),
    (Modifiers::Super, Key::ModSuper),
];

/// Windowing adapter bound to one GLFW window
#[derive(Debug)]
pub struct GlfwPlatform {
    window_size: [f32; 2],
    framebuffer_size: [f32; 2],
    content_scale: f32,
    last_frame: Instant,
}

impl GlfwPlatform {
    /// Bind to `window`, enabling the event polling the GUI needs
    pub fn new(window: &mut Window) -> OverlayResult<Self> {
        let handle = window.handle_mut();
        handle.set_key_polling(true);
        handle.set_char_polling(true);
        handle.set_mouse_button_polling(true);
        handle.set_cursor_pos_polling(true);
        handle.set_scroll_polling(true);
        handle.set_focus_polling(true);
        handle.set_size_polling(true);
        handle.set_framebuffer_size_polling(true);
        handle.set_content_scale_polling(true);

        let (width, height) = window.get_size();
        let (fb_width, fb_height) = window.get_framebuffer_size();
        let (scale_x, scale_y) = window.content_scale();

        let platform = Self::from_metrics(
            [width as f32, height as f32],
            [fb_width as f32, fb_height as f32],
            scale_x.max(scale_y),
        )?;
        log::info!(
            "GLFW platform bound to {}x{} window (framebuffer {}x{}, content scale {:.2})",
            width,
            height,
            fb_width,
            fb_height,
            platform.content_scale
        );
        Ok(platform)
    }

    /// Build from already known window metrics
    pub fn from_metrics(window_size: [f32; 2], framebuffer_size: [f32; 2], content_scale: f32) -> OverlayResult<Self> {
        if !content_scale.is_finite() || content_scale <= 0.0 {
            return Err(OverlayError::WindowAdapter(format!(
                "Window reported invalid content scale {}",
                content_scale
            )));
        }

        Ok(Self {
            window_size,
            framebuffer_size,
            content_scale,
            last_frame: Instant::now(),
        })
    }

    /// Get the content scale (DPI factor)
    pub fn content_scale(&self) -> f32 {
        self.content_scale
    }

    /// Get the window size in screen coordinates
    pub fn window_size(&self) -> [f32; 2] {
        self.window_size
    }

    /// Translate one window event into GUI input
    ///
    /// Returns `true` when the event was consumed as GUI input; resize and scale events only
    /// update the tracked metrics.
    pub fn handle_event(&mut self, io: &mut Io, event: &WindowEvent) -> bool {
        match *event {
            WindowEvent::Key(key, _, action, modifiers) => {
                update_modifiers(io, modifiers);
                match key_to_imgui(key) {
                    Some(gui_key) => {
                        io.add_key_event(gui_key, action != Action::Release);
                        true
                    }
                    None => false,
                }
            }
            WindowEvent::Char(character) => {
                io.add_input_character(character);
                true
            }
            WindowEvent::MouseButton(button, action, modifiers) => {
                update_modifiers(io, modifiers);
                match mouse_button_to_imgui(button) {
                    Some(gui_button) => {
                        io.add_mouse_button_event(gui_button, action == Action::Press);
                        true
                    }
                    None => false,
                }
            }
            WindowEvent::CursorPos(x, y) => {
                io.add_mouse_pos_event([x as f32, y as f32]);
                true
            }
            WindowEvent::Scroll(x, y) => {
                io.add_mouse_wheel_event([x as f32, y as f32]);
                true
            }
            WindowEvent::Focus(false) => {
                // Key releases that happen while unfocused never arrive
                update_modifiers(io, Modifiers::empty());
                true
            }
            WindowEvent::Size(width, height) => {
                self.window_size = [width.max(0) as f32, height.max(0) as f32];
                false
            }
            WindowEvent::FramebufferSize(width, height) => {
                self.framebuffer_size = [width.max(0) as f32, height.max(0) as f32];
                false
            }
            WindowEvent::ContentScale(x, y) => {
                let scale = x.max(y);
                if scale.is_finite() && scale > 0.0 {
                    self.content_scale = scale;
                }
                false
            }
            _ => false,
        }
    }

    /// Set display size, framebuffer scale and frame time for the next frame
    pub fn prepare_frame(&mut self, io: &mut Io) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).max(MIN_DELTA_TIME);
        self.last_frame = now;

        io.display_size = self.window_size;
        io.display_framebuffer_scale = framebuffer_scale(self.window_size, self.framebuffer_size);
        io.update_delta_time(delta);
    }
}

fn update_modifiers(io: &mut Io, modifiers: Modifiers) {
    for (modifier, key) in MODIFIER_KEYS {
        io.add_key_event(key, modifiers.contains(modifier));
    }
}

fn framebuffer_scale(window_size: [f32; 2], framebuffer_size: [f32; 2]) -> [f32; 2] {
    let axis = |window: f32, framebuffer: f32| if window > 0.0 { framebuffer / window } else { 1.0 };
    [
        axis(window_size[0], framebuffer_size[0]),
        axis(window_size[1], framebuffer_size[1]),
    ]
}

fn mouse_button_to_imgui(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        glfw::MouseButton::Button4 => Some(MouseButton::Extra1),
        glfw::MouseButton::Button5 => Some(MouseButton::Extra2),
        _ => None,
    }
}

/// Map a GLFW key to the GUI's key space
pub fn key_to_imgui(key: glfw::Key) -> Option<Key> {
    use glfw::Key as G;

    let mapped = match key {
        G::Tab => Key::Tab,
        G::Left => Key::LeftArrow,
        G::Right => Key::RightArrow,
        G::Up => Key::UpArrow,
        G::Down => Key::DownArrow,
        G::PageUp => Key::PageUp,
        G::PageDown => Key::PageDown,
        G::Home => Key::Home,
        G::End => Key::End,
        G::Insert => Key::Insert,
        G::Delete => Key::Delete,
        G::Backspace => Key::Backspace,
        G::Space => Key::Space,
        G::Enter => Key::Enter,
        G::Escape => Key::Escape,
        G::Apostrophe => Key::Apostrophe,
        G::Comma => Key::Comma,
        G::Minus => Key::Minus,
        G::Period => Key::Period,
        G::Slash => Key::Slash,
        G::Semicolon => Key::Semicolon,
        G::Equal => Key::Equal,
        G::LeftBracket => Key::LeftBracket,
        G::Backslash => Key::Backslash,
        G::RightBracket => Key::RightBracket,
        G::GraveAccent => Key::GraveAccent,
        G::CapsLock => Key::CapsLock,
        G::ScrollLock => Key::ScrollLock,
        G::NumLock => Key::NumLock,
        G::PrintScreen => Key::PrintScreen,
        G::Pause => Key::Pause,
        G::Kp0 => Key::Keypad0,
        G::Kp1 => Key::Keypad1,
        G::Kp2 => Key::Keypad2,
        G::Kp3 => Key::Keypad3,
        G::Kp4 => Key::Keypad4,
        G::Kp5 => Key::Keypad5,
        G::Kp6 => Key::Keypad6,
        G::Kp7 => Key::Keypad7,
        G::Kp8 => Key::Keypad8,
        G::Kp9 => Key::Keypad9,
        G::KpDecimal => Key::KeypadDecimal,
        G::KpDivide => Key::KeypadDivide,
        G::KpMultiply => Key::KeypadMultiply,
        G::KpSubtract => Key::KeypadSubtract,
        G::KpAdd => Key::KeypadAdd,
        G::KpEnter => Key::KeypadEnter,
        G::KpEqual => Key::KeypadEqual,
        G::LeftShift => Key::LeftShift,
        G::LeftControl => Key::LeftCtrl,
        G::LeftAlt => Key::LeftAlt,
        G::LeftSuper => Key::LeftSuper,
        G::RightShift => Key::RightShift,
        G::RightControl => Key::RightCtrl,
        G::RightAlt => Key::RightAlt,
        G::RightSuper => Key::RightSuper,
        G::Menu => Key::Menu,
        G::Num0 => Key::Alpha0,
        G::Num1 => Key::Alpha1,
        G::Num2 => Key::Alpha2,
        G::Num3 => Key::Alpha3,
        G::Num4 => Key::Alpha4,
        G::Num5 => Key::Alpha5,
        G::Num6 => Key::Alpha6,
        G::Num7 => Key::Alpha7,
        G::Num8 => Key::Alpha8,
        G::Num9 => Key::Alpha9,
        G::A => Key::A,
        G::B => Key::B,
        G::C => Key::C,
        G::D => Key::D,
        G::E => Key::E,
        G::F => Key::F,
        G::G => Key::G,
        G::H => Key::H,
        G::I => Key::I,
        G::J => Key::J,
        G::K => Key::K,
        G::L => Key::L,
        G::M => Key::M,
        G::N => Key::N,
        G::O => Key::O,
        G::P => Key::P,
        G::Q => Key::Q,
        G::R => Key::R,
        G::S => Key::S,
        G::T => Key::T,
        G::U => Key::U,
        G::V => Key::V,
        G::W => Key::W,
        G::X => Key::X,
        G::Y => Key::Y,
        G::Z => Key::Z,
        G::F1 => Key::F1,
        G::F2 => Key::F2,
        G::F3 => Key::F3,
        G::F4 => Key::F4,
        G::F5 => Key::F5,
        G::F6 => Key::F6,
        G::F7 => Key::F7,
        G::F8 => Key::F8,
        G::F9 => Key::F9,
        G::F10 => Key::F10,
        G::F11 => Key::F11,
        G::F12 => Key::F12,
        _ => return None,
    };
    Some(mapped)
}
