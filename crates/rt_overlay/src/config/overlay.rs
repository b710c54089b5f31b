//! # Overlay Configuration
//!
//! Font, shader and placement parameters for the overlay compositor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Config;

/// Base font size in pixels before content scaling
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

/// Distance in pixels between an anchored panel and its window corner
pub const DEFAULT_PANEL_MARGIN: f32 = 10.0;

/// Locations of the overlay pipeline's SPIR-V modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderPaths {
    /// Path to the vertex shader SPIR-V file
    pub vertex: PathBuf,
    /// Path to the fragment shader SPIR-V file
    pub fragment: PathBuf,
}

impl ShaderPaths {
    /// Create shader paths
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Resolve shader paths against the common build output locations
    ///
    /// The first directory holding a file wins; unresolved names fall back to
    /// `target/shaders/`, where the build script writes them.
    pub fn with_path_resolution(vertex: &str, fragment: &str) -> Self {
        const SHADER_DIRS: [&str; 4] = ["target/shaders/", "../target/shaders/", "../../target/shaders/", "shaders/"];

        let resolve = |name: &str| {
            SHADER_DIRS
                .iter()
                .map(|dir| PathBuf::from(format!("{dir}{name}")))
                .find(|candidate| candidate.exists())
                .unwrap_or_else(|| PathBuf::from(format!("{}{name}", SHADER_DIRS[0])))
        };

        Self {
            vertex: resolve(vertex),
            fragment: resolve(fragment),
        }
    }
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self::with_path_resolution("overlay_vert.spv", "overlay_frag.spv")
    }
}

/// # Overlay Configuration
///
/// Everything the compositor reads once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// TrueType font face; `None` selects the GUI library's built-in font
    pub font_path: Option<PathBuf>,
    /// Font size in pixels before content scaling
    pub font_size: f32,
    /// Panel distance from its anchoring corner
    pub panel_margin: f32,
    /// Log filter applied when `RUST_LOG` is unset
    pub log_filter: String,
    /// Overlay pipeline shaders
    pub shaders: ShaderPaths,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_path: Some(PathBuf::from("resources/fonts/DejaVuSansMono.ttf")),
            font_size: DEFAULT_FONT_SIZE,
            panel_margin: DEFAULT_PANEL_MARGIN,
            log_filter: "info".to_string(),
            shaders: ShaderPaths::default(),
        }
    }
}

impl Config for OverlayConfig {}

impl OverlayConfig {
    /// Set the font face
    pub fn with_font(mut self, path: impl AsRef<Path>) -> Self {
        self.font_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use the GUI library's built-in font
    pub fn with_builtin_font(mut self) -> Self {
        self.font_path = None;
        self
    }

    /// Set the unscaled font size
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the shader paths
    pub fn with_shaders(mut self, shaders: ShaderPaths) -> Self {
        self.shaders = shaders;
        self
    }

    /// Set the panel margin
    pub fn with_panel_margin(mut self, margin: f32) -> Self {
        self.panel_margin = margin;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(format!("Font size must be positive, got {}", self.font_size));
        }
        if !self.panel_margin.is_finite() || self.panel_margin < 0.0 {
            return Err(format!("Panel margin must not be negative, got {}", self.panel_margin));
        }
        Ok(())
    }
}
