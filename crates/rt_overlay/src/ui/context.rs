//! GUI context lifecycle
//!
//! Dear ImGui keeps one global context per process. [`ContextLease`] makes that explicit: at most
//! one lease exists at a time, and [`GuiContext`] cannot be built without one.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use imgui::{FontConfig, FontSource};

use crate::error::{OverlayError, OverlayResult};

static CONTEXT_LIVE: AtomicBool = AtomicBool::new(false);

/// Proof that this holder owns the process-wide GUI context slot
#[derive(Debug)]
pub struct ContextLease {
    _private: (),
}

impl ContextLease {
    /// Claim the slot, failing if another lease is alive
    pub fn acquire() -> OverlayResult<Self> {
        CONTEXT_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OverlayError::ContextAlreadyLive)?;
        Ok(Self { _private: () })
    }

    /// Check whether a lease is currently held anywhere in the process
    pub fn is_held() -> bool {
        CONTEXT_LIVE.load(Ordering::Acquire)
    }
}

impl Drop for ContextLease {
    fn drop(&mut self) {
        CONTEXT_LIVE.store(false, Ordering::Release);
    }
}

/// Font face the context rasterizes
#[derive(Debug, Clone, PartialEq)]
pub enum FontFace {
    /// TrueType file on disk
    File(PathBuf),
    /// Dear ImGui's built-in bitmap font
    Builtin,
}

impl FontFace {
    /// Face from an optional configured path
    pub fn from_config(path: Option<&Path>) -> Self {
        path.map_or(Self::Builtin, |p| Self::File(p.to_path_buf()))
    }
}

/// Live Dear ImGui context plus the lease that allowed creating it
pub struct GuiContext {
    // Declared first so the context is destroyed before the lease is released
    context: imgui::Context,
    _lease: ContextLease,
    scale: f32,
}

impl GuiContext {
    /// Create and configure the context
    ///
    /// On-disk settings persistence is disabled, the dark theme is scaled by `scale`, and the font
    /// is added at `base_size * scale`. The font file is read before any global state is touched,
    /// so a missing font leaves no context behind.
    pub fn new(font: &FontFace, base_size: f32, scale: f32) -> OverlayResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(OverlayError::WindowAdapter(format!("Invalid content scale {}", scale)));
        }
        if !base_size.is_finite() || base_size <= 0.0 {
            return Err(OverlayError::InvalidConfig(format!("Invalid font size {}", base_size)));
        }

        let font_data = match font {
            FontFace::File(path) => Some(std::fs::read(path).map_err(|source| OverlayError::FontLoad {
                path: path.clone(),
                source,
            })?),
            FontFace::Builtin => None,
        };

        let lease = ContextLease::acquire()?;
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        context.set_platform_name(Some(format!("rt_overlay-glfw {}", env!("CARGO_PKG_VERSION"))));
        context.set_renderer_name(Some(format!("rt_overlay-vulkan {}", env!("CARGO_PKG_VERSION"))));
        context.io_mut().backend_flags.insert(imgui::BackendFlags::RENDERER_HAS_VTX_OFFSET);

        context.style_mut().use_dark_colors().scale_all_sizes(scale);

        let size_pixels = base_size * scale;
        let source = match &font_data {
            Some(data) => FontSource::TtfData {
                data,
                size_pixels,
                config: Some(FontConfig {
                    size_pixels,
                    ..FontConfig::default()
                }),
            },
            None => FontSource::DefaultFontData {
                config: Some(FontConfig {
                    size_pixels,
                    ..FontConfig::default()
                }),
            },
        };
        context.fonts().add_font(&[source]);

        log::info!("GUI context created (font {:?} at {:.1}px, scale {:.2})", font, size_pixels, scale);

        Ok(Self {
            context,
            _lease: lease,
            scale,
        })
    }

    /// Get the content scale the context was configured with
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Get the underlying context
    pub fn context(&self) -> &imgui::Context {
        &self.context
    }

    /// Get the underlying context mutably
    pub fn context_mut(&mut self) -> &mut imgui::Context {
        &mut self.context
    }

    /// Get the input/output state
    pub fn io(&self) -> &imgui::Io {
        self.context.io()
    }

    /// Get the input/output state mutably
    pub fn io_mut(&mut self) -> &mut imgui::Io {
        self.context.io_mut()
    }

    /// Whether the most recent frame's widgets want keyboard input
    pub fn wants_keyboard(&self) -> bool {
        self.context.io().want_capture_keyboard
    }

    /// Whether the most recent frame's widgets want mouse input
    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }
}

impl Drop for GuiContext {
    fn drop(&mut self) {
        log::info!("GUI context destroyed");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    static GUI_CONTEXT_LOCK: Mutex<()> = Mutex::new(());

    /// Serialise tests that create the process-wide context
    pub(crate) fn lock_gui_context() -> MutexGuard<'static, ()> {
        GUI_CONTEXT_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn font_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../resources/fonts/DejaVuSansMono.ttf")
    }

    #[test]
    fn test_second_lease_refused() {
        let _guard = lock_gui_context();
        let lease = ContextLease::acquire().expect("first lease");
        assert!(ContextLease::is_held());
        assert!(matches!(ContextLease::acquire(), Err(OverlayError::ContextAlreadyLive)));

        drop(lease);
        assert!(!ContextLease::is_held());
        assert!(ContextLease::acquire().is_ok());
    }

    #[test]
    fn test_missing_font_creates_nothing() {
        let _guard = lock_gui_context();
        let face = FontFace::File(PathBuf::from("does/not/exist.ttf"));

        let result = GuiContext::new(&face, 13.0, 1.0);
        match result {
            Err(OverlayError::FontLoad { path, .. }) => assert_eq!(path, PathBuf::from("does/not/exist.ttf")),
            Err(other) => panic!("expected font load failure, got {}", other),
            Ok(_) => panic!("expected font load failure"),
        }
        assert!(!ContextLease::is_held());

        // A failed construction leaves the slot free for the next attempt
        let context = GuiContext::new(&FontFace::Builtin, 13.0, 1.0).expect("builtin font context");
        drop(context);
        assert!(!ContextLease::is_held());
    }

    #[test]
    fn test_context_is_configured() {
        let _guard = lock_gui_context();
        let mut gui = GuiContext::new(&FontFace::File(font_path()), 13.0, 2.0).expect("context");

        assert!(gui.context().ini_filename().is_none());
        assert!((gui.scale() - 2.0).abs() < f32::EPSILON);
        assert!(matches!(
            GuiContext::new(&FontFace::Builtin, 13.0, 1.0),
            Err(OverlayError::ContextAlreadyLive)
        ));

        let fonts = gui.context_mut().fonts();
        assert_eq!(fonts.fonts().len(), 1);
        let atlas = fonts.build_rgba32_texture();
        assert!(atlas.width > 0 && atlas.height > 0);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let _guard = lock_gui_context();
        assert!(matches!(
            GuiContext::new(&FontFace::Builtin, 13.0, 0.0),
            Err(OverlayError::WindowAdapter(_))
        ));
        assert!(matches!(
            GuiContext::new(&FontFace::Builtin, f32::NAN, 1.0),
            Err(OverlayError::InvalidConfig(_))
        ));
        assert!(!ContextLease::is_held());
    }

    #[test]
    fn test_font_face_from_config() {
        assert_eq!(FontFace::from_config(None), FontFace::Builtin);
        assert_eq!(
            FontFace::from_config(Some(Path::new("a.ttf"))),
            FontFace::File(PathBuf::from("a.ttf"))
        );
    }
}
