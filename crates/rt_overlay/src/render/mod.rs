//! Rendering collaborators
//!
//! Vulkan and GLFW wrappers owning the device, swapchain and window that the
//! overlay composites into.

pub mod vulkan;
