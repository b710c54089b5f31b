//! Vulkan backend
//!
//! RAII wrappers over the handles the overlay borrows from its host renderer.
//! Every wrapper keeps a clone of the logical device and destroys its handle in `Drop`.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod descriptor;
pub mod framebuffer;
pub mod image;
pub mod render_pass;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod texture;
pub mod window;

use ash::vk;
use thiserror::Error;

pub use buffer::Buffer;
pub use commands::{ActiveRenderPass, CommandPool, CommandRecorder};
pub use context::{PhysicalDeviceInfo, QueueFamilies, VulkanContext};
pub use descriptor::{DescriptorPool, DescriptorSetLayout};
pub use framebuffer::{DepthBuffer, Framebuffer};
pub use image::{DeviceImage, ImageDesc};
pub use render_pass::{AttachmentLoad, RenderPass};
pub use shader::ShaderModule;
pub use swapchain::{AcquiredImage, Swapchain};
pub use sync::{Fence, FrameSync, Semaphore};
pub use texture::Texture;
pub use window::{Window, WindowError, WindowResult};

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No suitable memory type found for allocation
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Turn a raw result code into a [`VulkanResult`]
///
/// Any non-success code is an error; there is no retry.
pub fn check_vk_result(result: vk::Result) -> VulkanResult<()> {
    if result == vk::Result::SUCCESS {
        Ok(())
    } else {
        log::error!("Vulkan call failed: {:?}", result);
        Err(VulkanError::Api(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_vk_result() {
        assert!(check_vk_result(vk::Result::SUCCESS).is_ok());
        assert!(matches!(
            check_vk_result(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY),
            Err(VulkanError::Api(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY))
        ));
        // Positive status codes are not success either
        assert!(check_vk_result(vk::Result::INCOMPLETE).is_err());
    }
}
