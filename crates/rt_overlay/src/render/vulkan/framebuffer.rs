//! Framebuffers and the depth buffer they share
//!
//! A framebuffer made for one render pass is usable with any compatible pass, so the
//! host's clearing pass and the overlay's loading pass can target the same one.

use ash::{vk, Device};

use super::image::{DeviceImage, ImageDesc};
use super::{RenderPass, VulkanContext, VulkanError, VulkanResult};

/// Framebuffer wrapper with RAII cleanup
pub struct Framebuffer {
    device: Device,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
}

impl Framebuffer {
    /// Create a framebuffer over `attachments` (colour first, then depth) for `render_pass`
    pub fn new(render_pass: &RenderPass, attachments: &[vk::ImageView], extent: vk::Extent2D) -> VulkanResult<Self> {
        if attachments.len() != 2 {
            return Err(VulkanError::InvalidOperation {
                reason: format!("Expected colour and depth attachments, got {}", attachments.len()),
            });
        }

        let device = render_pass.device().clone();
        let create_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass.handle())
            .attachments(attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe { device.create_framebuffer(&create_info, None).map_err(VulkanError::Api)? };

        Ok(Self {
            device,
            framebuffer,
            extent,
        })
    }

    /// Get the framebuffer handle
    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }

    /// Get the framebuffer extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get the rectangle covering the whole framebuffer
    pub fn full_area(&self) -> vk::Rect2D {
        vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: self.extent,
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}

/// Depth attachment sized to the swapchain
pub struct DepthBuffer {
    image: DeviceImage,
}

impl DepthBuffer {
    /// Format used for every depth buffer
    pub const FORMAT: vk::Format = vk::Format::D32_SFLOAT;

    /// Create a depth buffer covering `extent`
    pub fn new(context: &VulkanContext, extent: vk::Extent2D) -> VulkanResult<Self> {
        let image = DeviceImage::new(
            context.raw_device(),
            context.memory_properties(),
            ImageDesc::depth_attachment(extent, Self::FORMAT),
        )?;
        log::debug!("Depth buffer created at {}x{}", extent.width, extent.height);
        Ok(Self { image })
    }

    /// Get the image view handle
    pub fn image_view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Get the depth format
    pub fn format(&self) -> vk::Format {
        self.image.desc().format
    }

    /// Get the size in pixels
    pub fn extent(&self) -> vk::Extent2D {
        self.image.desc().extent
    }
}
