//! Demo configuration
//!
//! Read from the TOML or RON file named on the command line; every field is optional.

use rt_overlay::config::{Config, ConfigError, OverlayConfig};
use serde::{Deserialize, Serialize};

/// Window and overlay settings for the demo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Window title
    pub title: String,
    /// Initial window width in screen coordinates
    pub width: u32,
    /// Initial window height in screen coordinates
    pub height: u32,
    /// Overlay compositor settings
    pub overlay: OverlayConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "RT Overlay Demo".to_string(),
            width: 1280,
            height: 720,
            overlay: OverlayConfig::default(),
        }
    }
}

impl Config for DemoConfig {}

impl DemoConfig {
    /// Load from `path`, or use the defaults when no path was given
    pub fn from_args(path: Option<String>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_path_uses_defaults() {
        let config = DemoConfig::from_args(None).unwrap();
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(config.overlay.validate().is_ok());
    }

    #[test]
    fn test_nested_overlay_section() {
        let config: DemoConfig = toml::from_str(
            r#"
            title = "Bench"

            [overlay]
            font_size = 18.0
            "#,
        )
        .unwrap();

        assert_eq!(config.title, "Bench");
        assert_eq!(config.width, 1280);
        assert_eq!(config.overlay.font_size, 18.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(DemoConfig::from_args(Some("does/not/exist.toml".to_string())).is_err());
    }
}
