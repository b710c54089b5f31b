//! Sampled RGBA textures uploaded through a staging buffer

use ash::{vk, Device};

use super::image::{DeviceImage, ImageDesc};
use super::{Buffer, CommandPool, CommandRecorder, VulkanContext, VulkanError, VulkanResult};

/// Access masks and stages for one upload layout transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    old: vk::ImageLayout,
    new: vk::ImageLayout,
    src_access: vk::AccessFlags,
    dst_access: vk::AccessFlags,
    src_stage: vk::PipelineStageFlags,
    dst_stage: vk::PipelineStageFlags,
}

/// Fresh image to copy destination
const TO_TRANSFER_DST: Transition = Transition {
    old: vk::ImageLayout::UNDEFINED,
    new: vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    src_access: vk::AccessFlags::empty(),
    dst_access: vk::AccessFlags::TRANSFER_WRITE,
    src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
    dst_stage: vk::PipelineStageFlags::TRANSFER,
};

/// Copy destination to fragment shader input
const TO_SHADER_READ: Transition = Transition {
    old: vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    new: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    src_access: vk::AccessFlags::TRANSFER_WRITE,
    dst_access: vk::AccessFlags::SHADER_READ,
    src_stage: vk::PipelineStageFlags::TRANSFER,
    dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
};

impl Transition {
    fn record(&self, recorder: &mut CommandRecorder, image: &DeviceImage) {
        let barrier = vk::ImageMemoryBarrier::builder()
            .old_layout(self.old)
            .new_layout(self.new)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image.handle())
            .subresource_range(image.desc().full_range())
            .src_access_mask(self.src_access)
            .dst_access_mask(self.dst_access)
            .build();

        recorder.cmd_pipeline_barrier(self.src_stage, self.dst_stage, &[barrier]);
    }
}

/// Device-local RGBA8 texture with a linear clamp-to-edge sampler
pub struct Texture {
    sampler: vk::Sampler,
    image: DeviceImage,
    device: Device,
}

impl Texture {
    /// Upload tightly packed RGBA8 pixels and leave the image shader-readable
    ///
    /// Blocks until the copy has finished on `queue`; the staging buffer is gone on return.
    pub fn from_rgba(
        context: &VulkanContext,
        command_pool: &CommandPool,
        queue: vk::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> VulkanResult<Self> {
        let desc = ImageDesc::sampled_rgba(vk::Extent2D { width, height });
        if pixels.len() != desc.packed_rgba_size() {
            return Err(VulkanError::InvalidOperation {
                reason: format!(
                    "Texture {}x{} needs {} bytes of RGBA data, got {}",
                    width,
                    height,
                    desc.packed_rgba_size(),
                    pixels.len()
                ),
            });
        }

        let device = context.raw_device();
        let image = DeviceImage::new(device.clone(), context.memory_properties(), desc)?;

        let staging = Buffer::new(context, pixels.len() as vk::DeviceSize, vk::BufferUsageFlags::TRANSFER_SRC)?;
        staging.write_bytes(0, pixels)?;

        command_pool.submit_one_shot(queue, |recorder| {
            TO_TRANSFER_DST.record(recorder, &image);

            let region = vk::BufferImageCopy::builder()
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: desc.aspect,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_extent(vk::Extent3D { width, height, depth: 1 })
                .build();
            recorder.cmd_copy_buffer_to_image(staging.handle(), image.handle(), &[region]);

            TO_SHADER_READ.record(recorder, &image);
            Ok(())
        })?;

        let sampler_info = vk::SamplerCreateInfo::builder()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .max_anisotropy(1.0)
            .min_lod(-1000.0)
            .max_lod(1000.0);

        let sampler = unsafe { device.create_sampler(&sampler_info, None).map_err(VulkanError::Api)? };

        log::debug!("Uploaded {}x{} texture", width, height);

        Ok(Self { sampler, image, device })
    }

    /// Get the image view for descriptor set binding
    pub fn image_view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Get the sampler for descriptor set binding
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler
    }

    /// Get the texture size in pixels
    pub fn extent(&self) -> vk::Extent2D {
        self.image.desc().extent
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
    }
}
