//! Vulkan graphics adapter for GUI draw data
//!
//! Owns the overlay pipeline and the font atlas texture, and turns each frame's
//! [`DrawData`] into indexed draws inside the compositor's render pass.

use ash::{vk, Device};
use bytemuck::{Pod, Zeroable};
use imgui::{DrawCmd, DrawData, DrawIdx, DrawVert, FontAtlas, TextureId};

use crate::config::ShaderPaths;
use crate::error::{OverlayError, OverlayResult};
use crate::render::vulkan::{
    ActiveRenderPass, Buffer, CommandPool, DescriptorPool, DescriptorSetLayout, RenderPass, ShaderModule,
    Texture, VulkanContext, VulkanError, VulkanResult,
};

/// Texture id handed to the GUI for the font atlas; it is the only texture the overlay binds
pub const FONT_TEXTURE_ID: TextureId = TextureId::new(1);

/// Smallest vertex or index buffer allocated, in bytes
const MIN_BUFFER_SIZE: vk::DeviceSize = 16 * 1024;

/// Vertex layout matching [`DrawVert`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct GuiVertex {
    pos: [f32; 2],
    uv: [f32; 2],
    col: [u8; 4],
}

impl From<&DrawVert> for GuiVertex {
    fn from(vertex: &DrawVert) -> Self {
        Self {
            pos: vertex.pos,
            uv: vertex.uv,
            col: vertex.col,
        }
    }
}

/// Orthographic projection from GUI coordinates to clip space
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PushConstants {
    /// Multiplier applied to GUI positions
    pub scale: [f32; 2],
    /// Offset applied after scaling
    pub translate: [f32; 2],
}

impl PushConstants {
    /// Projection mapping the display rectangle onto [-1, 1]
    pub fn for_display(display_pos: [f32; 2], display_size: [f32; 2]) -> Self {
        let scale = [2.0 / display_size[0], 2.0 / display_size[1]];
        Self {
            scale,
            translate: [-1.0 - display_pos[0] * scale[0], -1.0 - display_pos[1] * scale[1]],
        }
    }
}

/// Project a GUI clip rectangle into framebuffer pixels
///
/// Returns `None` when nothing of the rectangle is left after clamping to the framebuffer.
pub fn project_clip_rect(
    clip_rect: [f32; 4],
    display_pos: [f32; 2],
    framebuffer_scale: [f32; 2],
    framebuffer_size: [f32; 2],
) -> Option<vk::Rect2D> {
    let min_x = ((clip_rect[0] - display_pos[0]) * framebuffer_scale[0]).max(0.0);
    let min_y = ((clip_rect[1] - display_pos[1]) * framebuffer_scale[1]).max(0.0);
    let max_x = ((clip_rect[2] - display_pos[0]) * framebuffer_scale[0]).min(framebuffer_size[0]);
    let max_y = ((clip_rect[3] - display_pos[1]) * framebuffer_scale[1]).min(framebuffer_size[1]);

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    Some(vk::Rect2D {
        offset: vk::Offset2D {
            x: min_x as i32,
            y: min_y as i32,
        },
        extent: vk::Extent2D {
            width: (max_x - min_x) as u32,
            height: (max_y - min_y) as u32,
        },
    })
}

fn index_type() -> vk::IndexType {
    if std::mem::size_of::<DrawIdx>() == 2 {
        vk::IndexType::UINT16
    } else {
        vk::IndexType::UINT32
    }
}

/// Everything the graphics adapter borrows at construction
pub struct RendererInit<'a> {
    /// Device, queues and memory properties
    pub context: &'a VulkanContext,
    /// Render pass the overlay draws in
    pub render_pass: &'a RenderPass,
    /// Pool the font descriptor set is allocated from
    pub descriptor_pool: &'a DescriptorPool,
    /// Swapchain image count; one geometry buffer pair is kept per image
    pub image_count: u32,
    /// Minimum image count the surface allows
    pub min_image_count: u32,
    /// SPIR-V locations
    pub shaders: &'a ShaderPaths,
}

/// Alpha-blended, depth-less pipeline for GUI triangles
struct OverlayPipeline {
    device: Device,
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
}

impl OverlayPipeline {
    fn new(
        device: Device,
        render_pass: vk::RenderPass,
        vertex_shader: &ShaderModule,
        fragment_shader: &ShaderModule,
        set_layout: vk::DescriptorSetLayout,
    ) -> VulkanResult<Self> {
        let shader_stages = [
            vertex_shader.stage_info(vk::ShaderStageFlags::VERTEX),
            fragment_shader.stage_info(vk::ShaderStageFlags::FRAGMENT),
        ];

        // pos, uv, col as laid out by the GUI library
        let binding_description = vk::VertexInputBindingDescription::builder()
            .binding(0)
            .stride(std::mem::size_of::<GuiVertex>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)
            .build();

        let attribute_descriptions = [
            vk::VertexInputAttributeDescription::builder()
                .location(0)
                .binding(0)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(0)
                .build(),
            vk::VertexInputAttributeDescription::builder()
                .location(1)
                .binding(0)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(8)
                .build(),
            vk::VertexInputAttributeDescription::builder()
                .location(2)
                .binding(0)
                .format(vk::Format::R8G8B8A8_UNORM)
                .offset(16)
                .build(),
        ];

        let vertex_input_info = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(std::slice::from_ref(&binding_description))
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        // The overlay always wins against scene depth
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(false)
            .depth_write_enable(false)
            .depth_compare_op(vk::CompareOp::ALWAYS);

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(true)
            .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
            .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(vk::BlendFactor::ONE)
            .dst_alpha_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
            .alpha_blend_op(vk::BlendOp::ADD)
            .build();

        let color_blend_attachments = [color_blend_attachment];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let push_constant_range = vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size: std::mem::size_of::<PushConstants>() as u32,
        };

        let set_layouts = [set_layout];
        let layout_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(&set_layouts)
            .push_constant_ranges(std::slice::from_ref(&push_constant_range));

        let layout = unsafe { device.create_pipeline_layout(&layout_info, None).map_err(VulkanError::Api)? };

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_info)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blending)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = unsafe {
            device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info.build()], None)
        };
        let pipeline = match pipelines {
            Ok(pipelines) => pipelines[0],
            Err((_, err)) => {
                unsafe { device.destroy_pipeline_layout(layout, None) };
                return Err(VulkanError::Api(err));
            }
        };

        Ok(Self {
            device,
            pipeline,
            layout,
        })
    }
}

impl Drop for OverlayPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

/// Geometry buffers for one swapchain image
#[derive(Default)]
struct FrameGeometry {
    vertices: Option<Buffer>,
    indices: Option<Buffer>,
}

/// Grow `slot` so it holds at least `required` bytes
fn ensure_capacity(
    slot: &mut Option<Buffer>,
    device: &Device,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    required: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
) -> VulkanResult<()> {
    if slot.as_ref().is_some_and(|buffer| buffer.size() >= required) {
        return Ok(());
    }

    let size = required.max(MIN_BUFFER_SIZE).next_power_of_two();
    log::debug!("Growing overlay {:?} buffer to {} bytes", usage, size);
    *slot = Some(Buffer::with_memory_properties(
        device.clone(),
        memory_properties,
        size,
        usage,
    )?);
    Ok(())
}

/// Graphics adapter: pipeline, font texture and per-image geometry
pub struct OverlayRenderer {
    frames: Vec<FrameGeometry>,
    frame_index: usize,
    font_texture: Option<Texture>,
    pipeline: OverlayPipeline,
    descriptor_set: vk::DescriptorSet,
    descriptor_pool: vk::DescriptorPool,
    descriptor_set_layout: DescriptorSetLayout,
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    device: Device,
}

impl OverlayRenderer {
    /// Create the pipeline and allocate the font descriptor set
    pub fn new(init: &RendererInit<'_>) -> OverlayResult<Self> {
        if init.image_count == 0 || init.image_count < init.min_image_count {
            return Err(OverlayError::GraphicsAdapter(format!(
                "Swapchain has {} images but the surface needs at least {}",
                init.image_count, init.min_image_count
            )));
        }

        let context = init.context;
        let device = context.raw_device();
        let adapter_error = |e: VulkanError| OverlayError::GraphicsAdapter(e.to_string());

        let descriptor_set_layout =
            DescriptorSetLayout::combined_image_sampler(device.clone(), 0, vk::ShaderStageFlags::FRAGMENT)
                .map_err(adapter_error)?;

        let vertex_shader =
            ShaderModule::from_file(device.clone(), &init.shaders.vertex).map_err(|source| OverlayError::Shader {
                path: init.shaders.vertex.clone(),
                source,
            })?;
        let fragment_shader =
            ShaderModule::from_file(device.clone(), &init.shaders.fragment).map_err(|source| OverlayError::Shader {
                path: init.shaders.fragment.clone(),
                source,
            })?;

        let pipeline = OverlayPipeline::new(
            device.clone(),
            init.render_pass.handle(),
            &vertex_shader,
            &fragment_shader,
            descriptor_set_layout.handle(),
        )
        .map_err(adapter_error)?;

        let descriptor_set = init
            .descriptor_pool
            .allocate(&[descriptor_set_layout.handle()])
            .map_err(adapter_error)?
            .into_iter()
            .next()
            .ok_or_else(|| OverlayError::GraphicsAdapter("Descriptor pool returned no set".to_string()))?;

        let memory_properties = *context.memory_properties();

        log::info!("Overlay renderer created for {} swapchain images", init.image_count);

        Ok(Self {
            frames: (0..init.image_count).map(|_| FrameGeometry::default()).collect(),
            frame_index: 0,
            font_texture: None,
            pipeline,
            descriptor_set,
            descriptor_pool: init.descriptor_pool.handle(),
            descriptor_set_layout,
            memory_properties,
            device,
        })
    }

    /// Rasterize the font atlas, upload it, and point the descriptor set at it
    ///
    /// Blocks until the upload has completed on `queue`.
    pub fn upload_fonts(
        &mut self,
        context: &VulkanContext,
        command_pool: &CommandPool,
        queue: vk::Queue,
        fonts: &mut FontAtlas,
    ) -> OverlayResult<()> {
        let texture = {
            let atlas = fonts.build_rgba32_texture();
            Texture::from_rgba(context, command_pool, queue, atlas.width, atlas.height, atlas.data)
                .map_err(OverlayError::FontUpload)?
        };

        let image_info = vk::DescriptorImageInfo {
            sampler: texture.sampler(),
            image_view: texture.image_view(),
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        };
        let write = vk::WriteDescriptorSet::builder()
            .dst_set(self.descriptor_set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(std::slice::from_ref(&image_info))
            .build();
        unsafe {
            self.device.update_descriptor_sets(&[write], &[]);
        }

        fonts.tex_id = FONT_TEXTURE_ID;
        let extent = texture.extent();
        log::info!("Font atlas uploaded ({}x{})", extent.width, extent.height);
        self.font_texture = Some(texture);
        Ok(())
    }

    /// Check that the renderer is ready for a frame
    pub fn new_frame(&self) -> OverlayResult<()> {
        if self.font_texture.is_none() {
            return Err(OverlayError::GraphicsAdapter(
                "Font atlas must be uploaded before the first frame".to_string(),
            ));
        }
        Ok(())
    }

    /// Check whether the font atlas has been uploaded
    pub fn has_fonts(&self) -> bool {
        self.font_texture.is_some()
    }

    /// Record draws for `draw_data` into the open render pass
    pub fn render_draw_data(&mut self, pass: &mut ActiveRenderPass<'_>, draw_data: &DrawData) -> OverlayResult<()> {
        let framebuffer_size = [
            draw_data.display_size[0] * draw_data.framebuffer_scale[0],
            draw_data.display_size[1] * draw_data.framebuffer_scale[1],
        ];
        if framebuffer_size[0] <= 0.0 || framebuffer_size[1] <= 0.0 || draw_data.total_vtx_count <= 0 {
            return Ok(());
        }

        let vertices: Vec<GuiVertex> = draw_data
            .draw_lists()
            .flat_map(|list| list.vtx_buffer().iter().map(GuiVertex::from))
            .collect();
        let indices: Vec<DrawIdx> = draw_data
            .draw_lists()
            .flat_map(|list| list.idx_buffer().iter().copied())
            .collect();

        let current_frame = self.frame_index;
        self.frame_index = (self.frame_index + 1) % self.frames.len();
        let frame = &mut self.frames[current_frame];

        ensure_capacity(
            &mut frame.vertices,
            &self.device,
            &self.memory_properties,
            std::mem::size_of_val(vertices.as_slice()) as vk::DeviceSize,
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;
        ensure_capacity(
            &mut frame.indices,
            &self.device,
            &self.memory_properties,
            std::mem::size_of_val(indices.as_slice()) as vk::DeviceSize,
            vk::BufferUsageFlags::INDEX_BUFFER,
        )?;

        let (Some(vertex_buffer), Some(index_buffer)) = (frame.vertices.as_ref(), frame.indices.as_ref()) else {
            return Ok(());
        };
        vertex_buffer.write_data(&vertices)?;
        index_buffer.write_data(&indices)?;

        let state = RenderState {
            pipeline: self.pipeline.pipeline,
            layout: self.pipeline.layout,
            descriptor_set: self.descriptor_set,
            vertex_buffer: vertex_buffer.handle(),
            index_buffer: index_buffer.handle(),
            framebuffer_size,
            push_constants: PushConstants::for_display(draw_data.display_pos, draw_data.display_size),
        };
        state.bind(pass);

        let mut global_vtx_offset = 0usize;
        let mut global_idx_offset = 0usize;
        for list in draw_data.draw_lists() {
            for command in list.commands() {
                match command {
                    DrawCmd::Elements { count, cmd_params } => {
                        let Some(scissor) = project_clip_rect(
                            cmd_params.clip_rect,
                            draw_data.display_pos,
                            draw_data.framebuffer_scale,
                            framebuffer_size,
                        ) else {
                            continue;
                        };

                        pass.set_scissor(&scissor);
                        pass.cmd_draw_indexed(
                            count as u32,
                            (cmd_params.idx_offset + global_idx_offset) as u32,
                            (cmd_params.vtx_offset + global_vtx_offset) as i32,
                        );
                    }
                    DrawCmd::ResetRenderState => state.bind(pass),
                    DrawCmd::RawCallback { .. } => {
                        log::warn!("Ignoring GUI draw callback; the overlay renderer does not run them");
                    }
                }
            }
            global_vtx_offset += list.vtx_buffer().len();
            global_idx_offset += list.idx_buffer().len();
        }

        Ok(())
    }
}

impl Drop for OverlayRenderer {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self
                .device
                .free_descriptor_sets(self.descriptor_pool, &[self.descriptor_set])
            {
                log::warn!("Failed to free overlay descriptor set: {:?}", e);
            }
        }
        log::info!("Overlay renderer destroyed");
    }
}

/// Bindings shared by the initial setup and `ResetRenderState` commands
struct RenderState {
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
    descriptor_set: vk::DescriptorSet,
    vertex_buffer: vk::Buffer,
    index_buffer: vk::Buffer,
    framebuffer_size: [f32; 2],
    push_constants: PushConstants,
}

impl RenderState {
    fn bind(&self, pass: &mut ActiveRenderPass<'_>) {
        pass.cmd_bind_pipeline(self.pipeline);
        pass.cmd_bind_descriptor_sets(self.layout, &[self.descriptor_set]);
        pass.cmd_bind_vertex_buffers(0, &[self.vertex_buffer], &[0]);
        pass.cmd_bind_index_buffer(self.index_buffer, 0, index_type());
        pass.set_viewport(&vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: self.framebuffer_size[0],
            height: self.framebuffer_size[1],
            min_depth: 0.0,
            max_depth: 1.0,
        });
        pass.cmd_push_constants(
            self.layout,
            vk::ShaderStageFlags::VERTEX,
            0,
            bytemuck::bytes_of(&self.push_constants),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vertex_layout_matches_gui() {
        assert_eq!(std::mem::size_of::<GuiVertex>(), 20);
        assert_eq!(std::mem::size_of::<GuiVertex>(), std::mem::size_of::<DrawVert>());

        let source = DrawVert {
            pos: [1.0, 2.0],
            uv: [0.5, 0.25],
            col: [255, 128, 0, 255],
        };
        let vertex = GuiVertex::from(&source);
        assert_eq!(bytemuck::bytes_of(&vertex).len(), 20);
        assert_eq!(vertex.col, [255, 128, 0, 255]);
    }

    #[test]
    fn test_push_constants_projection() {
        let pc = PushConstants::for_display([0.0, 0.0], [800.0, 600.0]);
        assert_relative_eq!(pc.scale[0], 0.0025);
        assert_relative_eq!(pc.scale[1], 2.0 / 600.0);
        assert_eq!(pc.translate, [-1.0, -1.0]);

        // Bottom-right corner lands on +1
        assert_relative_eq!(800.0 * pc.scale[0] + pc.translate[0], 1.0);
        assert_relative_eq!(600.0 * pc.scale[1] + pc.translate[1], 1.0);

        let offset = PushConstants::for_display([100.0, 50.0], [800.0, 600.0]);
        assert_relative_eq!(offset.translate[0], -1.25);
        assert_eq!(std::mem::size_of::<PushConstants>(), 16);
    }

    #[test]
    fn test_clip_rect_projection() {
        let rect = project_clip_rect([10.0, 20.0, 110.0, 70.0], [0.0, 0.0], [1.0, 1.0], [800.0, 600.0]).unwrap();
        assert_eq!((rect.offset.x, rect.offset.y), (10, 20));
        assert_eq!((rect.extent.width, rect.extent.height), (100, 50));

        // HiDPI scaling and display offset
        let rect = project_clip_rect([60.0, 60.0, 160.0, 110.0], [50.0, 50.0], [2.0, 2.0], [1600.0, 1200.0]).unwrap();
        assert_eq!((rect.offset.x, rect.offset.y), (20, 20));
        assert_eq!((rect.extent.width, rect.extent.height), (200, 100));
    }

    #[test]
    fn test_clip_rect_clamped_to_framebuffer() {
        let rect = project_clip_rect([-50.0, -50.0, 900.0, 700.0], [0.0, 0.0], [1.0, 1.0], [800.0, 600.0]).unwrap();
        assert_eq!((rect.offset.x, rect.offset.y), (0, 0));
        assert_eq!((rect.extent.width, rect.extent.height), (800, 600));
    }

    #[test]
    fn test_empty_clip_rect_skipped() {
        assert!(project_clip_rect([10.0, 10.0, 10.0, 50.0], [0.0, 0.0], [1.0, 1.0], [800.0, 600.0]).is_none());
        assert!(project_clip_rect([900.0, 10.0, 950.0, 50.0], [0.0, 0.0], [1.0, 1.0], [800.0, 600.0]).is_none());
        assert!(project_clip_rect([50.0, 50.0, 10.0, 10.0], [0.0, 0.0], [1.0, 1.0], [800.0, 600.0]).is_none());
    }
}
