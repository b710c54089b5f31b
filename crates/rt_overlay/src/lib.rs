//! # RT Overlay
//!
//! Immediate-mode GUI overlay for Vulkan renderers.
//!
//! ## Features
//!
//! - **Overlay Compositor**: composites Dear ImGui draw data over an already rendered frame
//!   using a dedicated render pass that loads existing attachments
//! - **Settings Panel**: render-and-mutate widgets bound to [`UserSettings`]
//! - **Performance Overlay**: fixed-width frame statistics with colour-banded frame rate
//! - **Scoped Theming**: style pushes released by guard, never by hand
//! - **Input Capture**: keyboard/mouse capture queries for the host input router
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rt_overlay::prelude::*;
//!
//! fn run(
//!     window: &mut Window,
//!     context: &VulkanContext,
//!     swapchain: &Swapchain,
//!     depth: &DepthBuffer,
//!     recorder: &mut CommandRecorder,
//!     framebuffer: &Framebuffer,
//! ) -> Result<(), OverlayError> {
//!     let scenes = SceneRegistry::new(["Cornell Box", "Lucy In One Weekend"]);
//!     let mut overlay = OverlayCompositor::new(
//!         context, swapchain, depth, window, &scenes, &OverlayConfig::default(),
//!     )?;
//!     let mut settings = UserSettings::default();
//!     let stats = Statistics::default();
//!     // Inside the frame loop, after the scene pass was recorded:
//!     overlay.render(recorder, framebuffer, &mut settings, &stats)?;
//!     if !overlay.wants_keyboard() {
//!         // route keys to the camera
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod settings;
pub mod statistics;
pub mod ui;

pub use error::{OverlayError, OverlayResult};

/// Common imports for overlay users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, OverlayConfig},
        error::{OverlayError, OverlayResult},
        render::vulkan::{
            AttachmentLoad, CommandPool, CommandRecorder, DepthBuffer, Framebuffer, FrameSync,
            RenderPass, Swapchain, VulkanContext, VulkanError, VulkanResult, Window,
        },
        scene::SceneRegistry,
        settings::UserSettings,
        statistics::{FrameTimer, Statistics},
        ui::OverlayCompositor,
    };
}
