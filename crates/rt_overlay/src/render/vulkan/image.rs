//! Device-local images
//!
//! One image, its dedicated allocation and a view over the whole image. Depth
//! buffers and sampled textures are both built on this.

use ash::{vk, Device};

use super::buffer::select_memory_type;
use super::{VulkanError, VulkanResult};

/// Shape and purpose of a single-mip 2D image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    /// Size in pixels
    pub extent: vk::Extent2D,
    /// Texel format
    pub format: vk::Format,
    /// How the image will be used
    pub usage: vk::ImageUsageFlags,
    /// Aspect the view exposes
    pub aspect: vk::ImageAspectFlags,
}

impl ImageDesc {
    /// Depth attachment shared by the scene and overlay passes
    pub fn depth_attachment(extent: vk::Extent2D, format: vk::Format) -> Self {
        Self {
            extent,
            format,
            usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            aspect: vk::ImageAspectFlags::DEPTH,
        }
    }

    /// RGBA8 texture filled by a transfer and then sampled
    pub fn sampled_rgba(extent: vk::Extent2D) -> Self {
        Self {
            extent,
            format: vk::Format::R8G8B8A8_UNORM,
            usage: vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED,
            aspect: vk::ImageAspectFlags::COLOR,
        }
    }

    /// Subresource range covering the whole image
    pub fn full_range(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        }
    }

    /// Byte size of tightly packed texel data, for formats with four bytes per texel
    pub fn packed_rgba_size(&self) -> usize {
        self.extent.width as usize * self.extent.height as usize * 4
    }
}

/// Image with its own device-local memory and a whole-image view
pub struct DeviceImage {
    device: Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    view: vk::ImageView,
    desc: ImageDesc,
}

impl DeviceImage {
    /// Create the image, allocate and bind memory, then create the view
    ///
    /// Whatever was created before a failing step is released again.
    pub fn new(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        desc: ImageDesc,
    ) -> VulkanResult<Self> {
        if desc.extent.width == 0 || desc.extent.height == 0 {
            return Err(VulkanError::InvalidOperation {
                reason: format!("Image extent {}x{} is empty", desc.extent.width, desc.extent.height),
            });
        }

        let image_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(desc.format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(desc.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);

        let image = unsafe { device.create_image(&image_info, None).map_err(VulkanError::Api)? };

        // Null handles are skipped by the destroy calls in Drop
        let mut owned = Self {
            device,
            image,
            memory: vk::DeviceMemory::null(),
            view: vk::ImageView::null(),
            desc,
        };

        let requirements = unsafe { owned.device.get_image_memory_requirements(image) };
        let memory_type_index = select_memory_type(
            memory_properties,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;
        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        unsafe {
            owned.memory = owned.device.allocate_memory(&alloc_info, None).map_err(VulkanError::Api)?;
            owned
                .device
                .bind_image_memory(image, owned.memory, 0)
                .map_err(VulkanError::Api)?;
        }

        let view_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(desc.format)
            .subresource_range(desc.full_range());
        owned.view = unsafe { owned.device.create_image_view(&view_info, None).map_err(VulkanError::Api)? };

        Ok(owned)
    }

    /// Get the image handle
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// Get the whole-image view
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Get the description the image was created from
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }
}

impl Drop for DeviceImage {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.view, None);
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENT: vk::Extent2D = vk::Extent2D { width: 512, height: 64 };

    #[test]
    fn test_depth_attachment_desc() {
        let desc = ImageDesc::depth_attachment(EXTENT, vk::Format::D32_SFLOAT);
        assert_eq!(desc.full_range().aspect_mask, vk::ImageAspectFlags::DEPTH);
        assert!(desc.usage.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
        assert!(!desc.usage.contains(vk::ImageUsageFlags::SAMPLED));
    }

    #[test]
    fn test_sampled_rgba_desc() {
        let desc = ImageDesc::sampled_rgba(EXTENT);
        assert_eq!(desc.format, vk::Format::R8G8B8A8_UNORM);
        assert!(desc.usage.contains(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED));
        assert_eq!(desc.packed_rgba_size(), 512 * 64 * 4);

        let range = desc.full_range();
        assert_eq!((range.level_count, range.layer_count), (1, 1));
    }
}
