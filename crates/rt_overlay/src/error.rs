//! Overlay error types
//!
//! Every construction failure of the overlay is fatal at this layer and surfaces as an
//! [`OverlayError`]; the caller decides whether to terminate or degrade.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::render::vulkan::VulkanError;

/// Overlay errors
#[derive(Error, Debug)]
pub enum OverlayError {
    /// A GUI context is already live in this process
    #[error("GUI context already exists; only one overlay may be live at a time")]
    ContextAlreadyLive,

    /// The windowing adapter could not be initialized
    #[error("Windowing adapter initialization failed: {0}")]
    WindowAdapter(String),

    /// The graphics adapter could not be initialized
    #[error("Graphics adapter initialization failed: {0}")]
    GraphicsAdapter(String),

    /// The font face could not be read
    #[error("Failed to load GUI font {path:?}: {source}")]
    FontLoad {
        /// Font file that was requested
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The font atlas could not be uploaded to the device
    #[error("Failed to create GUI font textures: {0}")]
    FontUpload(#[source] VulkanError),

    /// An overlay shader could not be loaded
    #[error("Failed to load overlay shader {path:?}: {source}")]
    Shader {
        /// SPIR-V file that was requested
        path: PathBuf,
        /// Underlying failure
        source: VulkanError,
    },

    /// Configuration rejected
    #[error("Invalid overlay configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Graphics API error raised while recording or allocating
    #[error(transparent)]
    Vulkan(#[from] VulkanError),
}

/// Result type for overlay operations
pub type OverlayResult<T> = Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;

    #[test]
    fn test_vulkan_errors_convert_transparently() {
        let error: OverlayError = VulkanError::Api(vk::Result::ERROR_DEVICE_LOST).into();
        assert!(matches!(error, OverlayError::Vulkan(VulkanError::Api(vk::Result::ERROR_DEVICE_LOST))));
        assert!(error.to_string().contains("ERROR_DEVICE_LOST"));
    }

    #[test]
    fn test_font_load_message_names_path() {
        let error = OverlayError::FontLoad {
            path: PathBuf::from("missing/font.ttf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(error.to_string().contains("missing/font.ttf"));
    }
}
