//! Overlay demo application
//!
//! Clears the window to a colour picked by the selected scene and composites the
//! configuration panel and performance overlay on top.
//!
//! F1 toggles the configuration panel, F2 the performance overlay, Escape quits.

mod config;

use ash::vk;
use glfw::{Action, Key, WindowEvent};
use rt_overlay::foundation::logging;
use rt_overlay::prelude::*;
use rt_overlay::render::vulkan::{AcquiredImage, WindowError};

use config::DemoConfig;

const MAX_FRAMES_IN_FLIGHT: usize = 2;

const SCENES: [&str; 6] = [
    "Cube And Spheres",
    "Ray Tracing In One Weekend",
    "Planets In One Weekend",
    "Lucy In One Weekend",
    "Cornell Box",
    "Cornell Box & Lucy",
];

/// Demo errors
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),
}

/// Background colour standing in for the selected scene's render
fn scene_clear_color(scene_index: usize, settings: &UserSettings) -> [f32; 4] {
    const PALETTE: [[f32; 3]; 6] = [
        [0.10, 0.12, 0.18],
        [0.35, 0.45, 0.60],
        [0.02, 0.02, 0.05],
        [0.20, 0.14, 0.10],
        [0.30, 0.08, 0.08],
        [0.08, 0.25, 0.10],
    ];
    let [r, g, b] = PALETTE[scene_index % PALETTE.len()];
    if settings.show_heatmap {
        [r * settings.heatmap_scale, g * 0.2, b * 0.2, 1.0]
    } else {
        [r, g, b, 1.0]
    }
}

/// Swapchain plus the per-image attachments rendered into
struct SwapchainTargets {
    framebuffers: Vec<Framebuffer>,
    depth: DepthBuffer,
    swapchain: Swapchain,
}

impl SwapchainTargets {
    fn new(context: &VulkanContext, render_pass: &RenderPass, swapchain: Swapchain) -> VulkanResult<Self> {
        let extent = swapchain.extent();
        let depth = DepthBuffer::new(context, extent)?;
        let framebuffers = swapchain
            .image_views()
            .iter()
            .map(|&view| Framebuffer::new(render_pass, &[view, depth.image_view()], extent))
            .collect::<VulkanResult<Vec<_>>>()?;

        Ok(Self {
            framebuffers,
            depth,
            swapchain,
        })
    }
}

/// Demo application; field order is drop order
struct OverlayDemo {
    overlay: OverlayCompositor,
    frames: Vec<FrameSync>,
    command_buffers: Vec<vk::CommandBuffer>,
    _command_pool: CommandPool,
    targets: SwapchainTargets,
    scene_pass: RenderPass,
    context: VulkanContext,
    window: Window,
    settings: UserSettings,
    previous_settings: UserSettings,
    scenes: SceneRegistry,
    timer: FrameTimer,
    current_frame: usize,
    needs_recreate: bool,
}

impl OverlayDemo {
    fn new(config: &DemoConfig) -> Result<Self, DemoError> {
        let mut window = Window::new(&config.title, config.width, config.height)?;
        let context = VulkanContext::new(&window, &config.title)?;
        let device = context.raw_device();

        let extent = framebuffer_extent(&window);
        let swapchain = Swapchain::new(&context, extent, None)?;
        let scene_pass = RenderPass::new(
            device.clone(),
            swapchain.format().format,
            DepthBuffer::FORMAT,
            AttachmentLoad::Clear,
        )?;
        let targets = SwapchainTargets::new(&context, &scene_pass, swapchain)?;

        let command_pool = CommandPool::new(device.clone(), context.graphics_queue_family())?;
        let command_buffers = command_pool.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;
        let frames = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| FrameSync::new(device.clone()))
            .collect::<VulkanResult<Vec<_>>>()?;

        let scenes = SceneRegistry::new(SCENES);
        let overlay = OverlayCompositor::new(
            &context,
            &targets.swapchain,
            &targets.depth,
            &mut window,
            &scenes,
            &config.overlay,
        )?;

        let settings = UserSettings::default();
        Ok(Self {
            overlay,
            frames,
            command_buffers,
            _command_pool: command_pool,
            targets,
            scene_pass,
            context,
            window,
            previous_settings: settings.clone(),
            settings,
            scenes,
            timer: FrameTimer::new(),
            current_frame: 0,
            needs_recreate: false,
        })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        log::info!("Entering main loop with {} scenes", self.scenes.len());

        while !self.window.should_close() {
            self.window.poll_events();
            let events: Vec<WindowEvent> = self.window.flush_events().map(|(_, event)| event).collect();
            for event in &events {
                self.handle_event(event);
            }

            if self.needs_recreate {
                self.recreate_swapchain()?;
                if self.needs_recreate {
                    // Minimised; nothing to draw into
                    self.window.wait_events();
                    continue;
                }
            }

            self.draw_frame()?;
        }

        self.context.wait_idle()?;
        log::info!("Main loop finished");
        Ok(())
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        self.overlay.handle_event(event);

        match *event {
            WindowEvent::FramebufferSize(..) => self.needs_recreate = true,
            WindowEvent::Key(key, _, Action::Press, _) if !self.overlay.wants_keyboard() => match key {
                Key::Escape => self.window.set_should_close(true),
                Key::F1 => self.settings.show_settings = !self.settings.show_settings,
                Key::F2 => self.settings.show_overlay = !self.settings.show_overlay,
                _ => {}
            },
            _ => {}
        }
    }

    fn recreate_swapchain(&mut self) -> Result<(), DemoError> {
        let extent = framebuffer_extent(&self.window);
        if extent.width == 0 || extent.height == 0 {
            return Ok(());
        }

        self.context.wait_idle()?;
        let swapchain = Swapchain::new(&self.context, extent, Some(&self.targets.swapchain))?;
        self.targets = SwapchainTargets::new(&self.context, &self.scene_pass, swapchain)?;
        self.needs_recreate = false;

        log::info!("Swapchain recreated at {}x{}", extent.width, extent.height);
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<(), DemoError> {
        let device = self.context.raw_device();
        let sync = &self.frames[self.current_frame];
        sync.in_flight.wait(u64::MAX)?;

        let image_index = match self.targets.swapchain.acquire_next_image(sync.image_available.handle())? {
            AcquiredImage::Ready { index, suboptimal } => {
                self.needs_recreate |= suboptimal;
                index
            }
            AcquiredImage::OutOfDate => {
                self.needs_recreate = true;
                return Ok(());
            }
        };
        sync.in_flight.reset()?;

        self.timer.tick();
        if self.settings.requires_accumulation_reset(&self.previous_settings) {
            self.timer.reset_accumulation();
        }
        self.previous_settings = self.settings.clone();
        self.timer.record_samples(&self.settings);

        let extent = self.targets.swapchain.extent();
        let stats = self.timer.snapshot([extent.width, extent.height], &self.settings);
        let framebuffer = &self.targets.framebuffers[image_index as usize];

        let command_buffer = self.command_buffers[self.current_frame];
        let mut recorder = CommandRecorder::new(command_buffer, device.clone());
        recorder.begin()?;
        {
            let clear_values = [
                vk::ClearValue {
                    color: vk::ClearColorValue {
                        float32: scene_clear_color(self.settings.scene_index, &self.settings),
                    },
                },
                vk::ClearValue {
                    depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
                },
            ];
            let _scene = recorder.begin_render_pass(&self.scene_pass, framebuffer, &clear_values)?;
        }
        self.overlay.render(&mut recorder, framebuffer, &mut self.settings, &stats)?;
        let command_buffer = recorder.end()?;

        let wait_semaphores = [sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.render_finished.handle()];
        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        unsafe {
            device
                .queue_submit(self.context.graphics_queue(), &[submit_info], sync.in_flight.handle())
                .map_err(VulkanError::Api)?;
        }

        self.needs_recreate |= self.targets.swapchain.present(
            self.context.present_queue(),
            image_index,
            sync.render_finished.handle(),
        )?;
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;
        Ok(())
    }
}

fn framebuffer_extent(window: &Window) -> vk::Extent2D {
    let (width, height) = window.get_framebuffer_size();
    vk::Extent2D { width, height }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DemoConfig::from_args(std::env::args().nth(1))?;

    logging::init_with_filter(&config.overlay.log_filter);

    log::info!("Starting overlay demo");

    let mut demo = OverlayDemo::new(&config)?;
    let result = demo.run();
    drop(demo);

    match result {
        Ok(()) => {
            log::info!("Overlay demo finished successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Application error: {}", e);
            Err(e.into())
        }
    }
}
