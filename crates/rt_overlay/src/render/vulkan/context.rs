//! Vulkan context management
//!
//! Instance, surface, physical device and logical device for one window. The
//! overlay reads its native handles from here; it never creates its own device.

#[cfg(debug_assertions)]
use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::vk;
use ash::{Device, Entry, Instance};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use super::{VulkanError, VulkanResult, Window};

const ENGINE_NAME: &str = "RtOverlay";
const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Entry point and instance, plus the validation messenger in debug builds
struct InstanceHandles {
    entry: Entry,
    instance: Instance,
    #[cfg(debug_assertions)]
    messenger: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl InstanceHandles {
    fn new(window: &Window, app_name: &str) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to load Vulkan: {e:?}")))?;

        let app_name = c_string(app_name)?;
        let engine_name = c_string(ENGINE_NAME)?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let window_extensions = window
            .get_required_instance_extensions()
            .map_err(|e| VulkanError::InitializationFailed(format!("Window system extensions unavailable: {e}")))?
            .iter()
            .map(|name| c_string(name))
            .collect::<VulkanResult<Vec<_>>>()?;

        #[allow(unused_mut)]
        let mut extensions: Vec<*const c_char> = window_extensions.iter().map(|name| name.as_ptr()).collect();

        let validation = cfg!(debug_assertions) && validation_layer_present(&entry);
        #[cfg(debug_assertions)]
        if validation {
            extensions.push(DebugUtils::name().as_ptr());
        }

        let layers = if validation { vec![c_string(VALIDATION_LAYER)?] } else { Vec::new() };
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe { entry.create_instance(&create_info, None).map_err(VulkanError::Api)? };
        log::info!("Vulkan instance created (validation {})", if validation { "on" } else { "off" });

        #[cfg(debug_assertions)]
        let messenger = if validation {
            let debug_utils = DebugUtils::new(&entry, &instance);
            match create_messenger(&debug_utils) {
                Ok(handle) => Some((debug_utils, handle)),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            None
        };

        Ok(Self {
            entry,
            instance,
            #[cfg(debug_assertions)]
            messenger,
        })
    }
}

impl Drop for InstanceHandles {
    fn drop(&mut self) {
        unsafe {
            #[cfg(debug_assertions)]
            if let Some((debug_utils, handle)) = self.messenger.take() {
                debug_utils.destroy_debug_utils_messenger(handle, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

fn validation_layer_present(entry: &Entry) -> bool {
    let Ok(layers) = entry.enumerate_instance_layer_properties() else {
        return false;
    };
    let present = layers
        .iter()
        .any(|layer| unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) }.to_bytes() == VALIDATION_LAYER.as_bytes());
    if !present {
        log::warn!("{} not installed; running without validation", VALIDATION_LAYER);
    }
    present
}

#[cfg(debug_assertions)]
fn create_messenger(debug_utils: &DebugUtils) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(validation_callback));

    unsafe { debug_utils.create_debug_utils_messenger(&create_info, None).map_err(VulkanError::Api) }
}

/// Log level for a validation message
#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Debug
    } else {
        log::Level::Trace
    }
}

#[cfg(debug_assertions)]
unsafe extern "system" fn validation_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();
    log::log!(severity_level(severity), "[Vulkan {:?}] {}", message_type, message);
    vk::FALSE
}

/// Graphics and presentation queue families of one physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    /// Family the overlay records and submits on
    pub graphics: u32,
    /// Family that can present to the window surface
    pub present: u32,
}

impl QueueFamilies {
    /// Pick queue families, preferring a single family that can do both
    ///
    /// `supports_present` is asked once per family index. `Ok(None)` means the device
    /// cannot drive the surface at all.
    pub fn select<F>(families: &[vk::QueueFamilyProperties], mut supports_present: F) -> VulkanResult<Option<Self>>
    where
        F: FnMut(u32) -> VulkanResult<bool>,
    {
        let mut graphics = None;
        let mut present = None;

        for (index, family) in (0u32..).zip(families) {
            let can_draw = family.queue_count > 0 && family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let can_present = supports_present(index)?;

            if can_draw && can_present {
                return Ok(Some(Self {
                    graphics: index,
                    present: index,
                }));
            }
            if can_draw {
                graphics.get_or_insert(index);
            }
            if can_present {
                present.get_or_insert(index);
            }
        }

        Ok(graphics
            .zip(present)
            .map(|(graphics, present)| Self { graphics, present }))
    }

    /// Whether drawing and presenting share one family
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }
}

/// Preference order when several GPUs qualify
fn device_type_rank(device_type: vk::PhysicalDeviceType) -> u8 {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 3,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 2,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 1,
        _ => 0,
    }
}

/// Selected physical device and what was queried from it
pub struct PhysicalDeviceInfo {
    /// Vulkan physical device handle
    pub device: vk::PhysicalDevice,
    /// Device properties and limits
    pub properties: vk::PhysicalDeviceProperties,
    /// Memory heaps and types, queried once
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    /// Queue families used for drawing and presentation
    pub queue_families: QueueFamilies,
}

impl PhysicalDeviceInfo {
    /// Pick the best GPU that can render and present to `surface`
    pub fn select(instance: &Instance, surface: vk::SurfaceKHR, surface_loader: &Surface) -> VulkanResult<Self> {
        let devices = unsafe { instance.enumerate_physical_devices().map_err(VulkanError::Api)? };

        let mut best: Option<Self> = None;
        for device in devices {
            let Some(candidate) = Self::evaluate(instance, device, surface, surface_loader)? else {
                continue;
            };
            let better = best.as_ref().map_or(true, |current| {
                device_type_rank(candidate.properties.device_type) > device_type_rank(current.properties.device_type)
            });
            if better {
                best = Some(candidate);
            }
        }

        let selected = best.ok_or_else(|| VulkanError::InitializationFailed("No suitable GPU found".to_string()))?;
        log::info!(
            "Selected GPU: {} ({:?})",
            selected.name(),
            selected.properties.device_type
        );
        Ok(selected)
    }

    fn evaluate(
        instance: &Instance,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> VulkanResult<Option<Self>> {
        let extensions = unsafe { instance.enumerate_device_extension_properties(device).map_err(VulkanError::Api)? };
        let has_swapchain = extensions
            .iter()
            .any(|ext| unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) } == SwapchainLoader::name());
        if !has_swapchain {
            return Ok(None);
        }

        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };
        let queue_families = QueueFamilies::select(&families, |index| unsafe {
            surface_loader
                .get_physical_device_surface_support(device, index, surface)
                .map_err(VulkanError::Api)
        })?;
        let Some(queue_families) = queue_families else {
            return Ok(None);
        };

        let (properties, memory_properties) = unsafe {
            (
                instance.get_physical_device_properties(device),
                instance.get_physical_device_memory_properties(device),
            )
        };

        Ok(Some(Self {
            device,
            properties,
            memory_properties,
            queue_families,
        }))
    }

    /// Get the driver-reported device name
    pub fn name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Logical device and the queues fetched from it
struct DeviceQueues {
    device: Device,
    graphics: vk::Queue,
    present: vk::Queue,
}

impl DeviceQueues {
    fn new(instance: &Instance, physical: &PhysicalDeviceInfo) -> VulkanResult<Self> {
        let families = physical.queue_families;
        let priorities = [1.0];
        let mut queue_infos = vec![vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(families.graphics)
            .queue_priorities(&priorities)
            .build()];
        if !families.is_shared() {
            queue_infos.push(
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(families.present)
                    .queue_priorities(&priorities)
                    .build(),
            );
        }

        let extensions = [SwapchainLoader::name().as_ptr()];
        let features = vk::PhysicalDeviceFeatures::default();
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .create_device(physical.device, &create_info, None)
                .map_err(VulkanError::Api)?
        };
        let (graphics, present) = unsafe {
            (
                device.get_device_queue(families.graphics, 0),
                device.get_device_queue(families.present, 0),
            )
        };

        Ok(Self {
            device,
            graphics,
            present,
        })
    }
}

impl Drop for DeviceQueues {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

/// Core Vulkan objects for one window
///
/// Field order is drop order: surface, device, then instance.
pub struct VulkanContext {
    surface: SurfaceHandle,
    physical_device: PhysicalDeviceInfo,
    device: DeviceQueues,
    instance: InstanceHandles,
}

struct SurfaceHandle {
    loader: Surface,
    surface: vk::SurfaceKHR,
}

impl Drop for SurfaceHandle {
    fn drop(&mut self) {
        unsafe { self.loader.destroy_surface(self.surface, None) };
    }
}

impl VulkanContext {
    /// Create a new Vulkan context for the window
    pub fn new(window: &Window, app_name: &str) -> VulkanResult<Self> {
        let instance = InstanceHandles::new(window, app_name)?;
        let surface = SurfaceHandle {
            loader: Surface::new(&instance.entry, &instance.instance),
            surface: window.create_vulkan_surface(instance.instance.handle())?,
        };

        let physical_device = PhysicalDeviceInfo::select(&instance.instance, surface.surface, &surface.loader)?;
        let device = DeviceQueues::new(&instance.instance, &physical_device)?;

        log::info!(
            "Vulkan context ready (graphics family {}, present family {})",
            physical_device.queue_families.graphics,
            physical_device.queue_families.present
        );

        Ok(Self {
            surface,
            physical_device,
            device,
            instance,
        })
    }

    /// Get a reference to the Vulkan instance
    pub fn instance(&self) -> &Instance {
        &self.instance.instance
    }

    /// Get the surface handle
    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface.surface
    }

    /// Get the surface loader
    pub fn surface_loader(&self) -> &Surface {
        &self.surface.loader
    }

    /// Get the physical device info
    pub fn physical_device(&self) -> &PhysicalDeviceInfo {
        &self.physical_device
    }

    /// Get the memory properties of the selected GPU
    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.physical_device.memory_properties
    }

    /// Get the raw Device handle
    pub fn raw_device(&self) -> Device {
        self.device.device.clone()
    }

    /// Get the graphics queue
    pub fn graphics_queue(&self) -> vk::Queue {
        self.device.graphics
    }

    /// Get the present queue
    pub fn present_queue(&self) -> vk::Queue {
        self.device.present
    }

    /// Get the graphics queue family index
    pub fn graphics_queue_family(&self) -> u32 {
        self.physical_device.queue_families.graphics
    }

    /// Block until the device has finished all submitted work
    pub fn wait_idle(&self) -> VulkanResult<()> {
        unsafe { self.device.device.device_wait_idle().map_err(VulkanError::Api) }
    }
}

fn c_string(value: &str) -> VulkanResult<CString> {
    CString::new(value).map_err(|e| VulkanError::InitializationFailed(format!("Invalid name {value:?}: {e}")))
}
