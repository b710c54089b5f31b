//! Overlay compositor
//!
//! Owns everything the overlay needs on the device and in the GUI library, and records the
//! overlay into a frame the host has already rendered.

use ash::vk;

use crate::config::OverlayConfig;
use crate::error::{OverlayError, OverlayResult};
use crate::render::vulkan::{
    AttachmentLoad, CommandPool, CommandRecorder, DepthBuffer, DescriptorPool, Framebuffer, RenderPass, Swapchain,
    VulkanContext, Window,
};
use crate::scene::SceneRegistry;
use crate::settings::UserSettings;
use crate::statistics::Statistics;

use super::context::{FontFace, GuiContext};
use super::imgui_frame::ImguiFrame;
use super::panels::OverlayPanels;
use super::platform::GlfwPlatform;
use super::renderer::{OverlayRenderer, RendererInit};
use super::settings_panel::MovementKeys;

/// Composites the configuration panel and performance overlay over a rendered frame
///
/// Field order is drop order: graphics adapter, windowing adapter, GUI context, then the
/// render pass and descriptor pool. Dropping waits for the device to go idle first.
pub struct OverlayCompositor {
    renderer: OverlayRenderer,
    platform: GlfwPlatform,
    gui: GuiContext,
    panels: OverlayPanels,
    render_pass: RenderPass,
    _descriptor_pool: DescriptorPool,
    device: ash::Device,
}

impl OverlayCompositor {
    /// Create the overlay for `swapchain` and `depth`, bound to `window`
    ///
    /// Any failure aborts construction; nothing created before it is leaked or left live.
    pub fn new(
        context: &VulkanContext,
        swapchain: &Swapchain,
        depth: &DepthBuffer,
        window: &mut Window,
        scenes: &SceneRegistry,
        config: &OverlayConfig,
    ) -> OverlayResult<Self> {
        config.validate().map_err(OverlayError::InvalidConfig)?;
        let device = context.raw_device();

        // One combined image sampler: the font atlas
        let pool_sizes = [vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: 1,
        }];
        let descriptor_pool = DescriptorPool::new(device.clone(), &pool_sizes, 1)
            .map_err(|e| OverlayError::GraphicsAdapter(e.to_string()))?;

        let render_pass = RenderPass::new(
            device.clone(),
            swapchain.format().format,
            depth.format(),
            AttachmentLoad::Load,
        )
        .map_err(|e| OverlayError::GraphicsAdapter(e.to_string()))?;

        let mut renderer = OverlayRenderer::new(&RendererInit {
            context,
            render_pass: &render_pass,
            descriptor_pool: &descriptor_pool,
            image_count: swapchain.image_count(),
            min_image_count: swapchain.min_image_count(),
            shaders: &config.shaders,
        })?;

        let platform = GlfwPlatform::new(window)?;

        let font = FontFace::from_config(config.font_path.as_deref());
        let mut gui = GuiContext::new(&font, config.font_size, platform.content_scale())?;

        {
            let upload_pool =
                CommandPool::new(device.clone(), context.graphics_queue_family()).map_err(OverlayError::FontUpload)?;
            renderer.upload_fonts(context, &upload_pool, context.graphics_queue(), gui.context_mut().fonts())?;
        }

        let movement_keys = MovementKeys::resolve(|letter| movement_key(letter).and_then(|key| window.key_name(key)));
        let panels = OverlayPanels::new(scenes.names().to_vec(), movement_keys, config.panel_margin);

        log::info!(
            "Overlay compositor ready ({} scenes, {} swapchain images)",
            scenes.len(),
            swapchain.image_count()
        );

        Ok(Self {
            renderer,
            platform,
            gui,
            panels,
            render_pass,
            _descriptor_pool: descriptor_pool,
            device,
        })
    }

    /// Feed a window event to the GUI
    ///
    /// Returns `true` when the event was taken as GUI input. Whether the host should also act on
    /// it is answered by [`Self::wants_keyboard`] and [`Self::wants_mouse`].
    pub fn handle_event(&mut self, event: &glfw::WindowEvent) -> bool {
        self.platform.handle_event(self.gui.io_mut(), event)
    }

    /// Build this frame's panels and record them into `recorder`
    ///
    /// `recorder` must be recording and outside any render pass. The overlay pass loads the
    /// existing attachments of `framebuffer`, so whatever the host rendered stays visible.
    /// Widget changes are written into `settings` before this returns. Nothing is submitted.
    pub fn render(
        &mut self,
        recorder: &mut CommandRecorder,
        framebuffer: &Framebuffer,
        settings: &mut UserSettings,
        stats: &Statistics,
    ) -> OverlayResult<()> {
        self.platform.prepare_frame(self.gui.io_mut());
        self.renderer.new_frame()?;

        let ui = self.gui.context_mut().new_frame();
        {
            let mut frame = ImguiFrame::new(ui);
            self.panels.build(&mut frame, settings, stats);
        }
        let draw_data = self.gui.context_mut().render();

        // Load pass: no clear values, the host's pixels stay underneath
        let mut pass = recorder.begin_render_pass(&self.render_pass, framebuffer, &[])?;
        self.renderer.render_draw_data(&mut pass, draw_data)
    }

    /// Whether the last built frame wants keyboard input
    pub fn wants_keyboard(&self) -> bool {
        self.gui.wants_keyboard()
    }

    /// Whether the last built frame wants mouse input
    pub fn wants_mouse(&self) -> bool {
        self.gui.wants_mouse()
    }
}

impl Drop for OverlayCompositor {
    fn drop(&mut self) {
        // In-flight frames may still reference the pipeline and font texture
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                log::warn!("Device wait before overlay teardown failed: {:?}", e);
            }
        }
        log::info!("Overlay compositor shutting down");
    }
}

/// Physical key behind one of the QWERTY movement letters
fn movement_key(letter: char) -> Option<glfw::Key> {
    match letter {
        'W' => Some(glfw::Key::W),
        'A' => Some(glfw::Key::A),
        'S' => Some(glfw::Key::S),
        'D' => Some(glfw::Key::D),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_letters_map_to_keys() {
        for letter in MovementKeys::QWERTY {
            assert!(movement_key(letter).is_some());
        }
        assert_eq!(movement_key('Q'), None);
    }
}
