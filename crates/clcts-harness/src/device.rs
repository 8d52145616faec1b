//! Platform and device selection against a real OpenCL ICD.
//!
//! Compiled only with the `driver` feature; everything here talks to the
//! vendor runtime, which is the system under test.

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{
    Device, CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_CUSTOM,
    CL_DEVICE_TYPE_DEFAULT, CL_DEVICE_TYPE_GPU,
};
use opencl3::platform::{get_platforms, Platform};
use opencl3::types::cl_device_type;
use tracing::{debug, info};

use crate::config::{DeviceType, HarnessConfig};
use crate::error::{HarnessError, Result};

impl DeviceType {
    /// The raw `cl_device_type` bit for platform enumeration.
    pub fn to_cl(self) -> cl_device_type {
        match self {
            Self::Default => CL_DEVICE_TYPE_DEFAULT,
            Self::Cpu => CL_DEVICE_TYPE_CPU,
            Self::Gpu => CL_DEVICE_TYPE_GPU,
            Self::Accelerator => CL_DEVICE_TYPE_ACCELERATOR,
            Self::Custom => CL_DEVICE_TYPE_CUSTOM,
        }
    }
}

/// The opened driver objects shared by every test in a run.
pub struct DriverHandles {
    pub platform: Platform,
    pub device: Device,
    pub context: Context,
    pub queue: CommandQueue,
    pub platform_name: String,
    pub device_name: String,
    /// Device pointer width, after any `w32` override from the config.
    pub address_bits: u32,
}

impl std::fmt::Debug for DriverHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverHandles")
            .field("platform", &self.platform_name)
            .field("device", &self.device_name)
            .field("address_bits", &self.address_bits)
            .finish()
    }
}

impl DriverHandles {
    /// Open the platform/device named by the config and create the shared
    /// context and in-order queue.
    pub fn open(config: &HarnessConfig) -> Result<Self> {
        let platforms =
            get_platforms().map_err(|e| HarnessError::api("clGetPlatformIDs", e.0))?;
        if platforms.is_empty() {
            return Err(HarnessError::NoPlatforms);
        }

        let platform = platforms.get(config.platform_index).copied().ok_or_else(|| {
            HarnessError::NoDevice {
                reason: format!(
                    "platform index {} out of range ({} platforms)",
                    config.platform_index,
                    platforms.len()
                ),
            }
        })?;
        let platform_name = platform.name().unwrap_or_default();
        debug!(platform = %platform_name, "selected OpenCL platform");

        let device_ids = platform
            .get_devices(config.device_type.to_cl())
            .map_err(|e| HarnessError::api("clGetDeviceIDs", e.0))?;
        let device_id = device_ids.get(config.device_index).copied().ok_or_else(|| {
            HarnessError::NoDevice {
                reason: format!(
                    "device index {} out of range ({} devices of type {})",
                    config.device_index,
                    device_ids.len(),
                    config.device_type
                ),
            }
        })?;

        let device = Device::new(device_id);
        let device_name = device.name().unwrap_or_default();
        let native_bits = device
            .address_bits()
            .map_err(|e| HarnessError::api("clGetDeviceInfo", e.0))?;
        let address_bits = config.address_bits.unwrap_or(native_bits);

        let context = Context::from_device(&device)
            .map_err(|e| HarnessError::api("clCreateContext", e.0))?;
        let queue = CommandQueue::create_default_with_properties(&context, 0, 0)
            .map_err(|e| HarnessError::api("clCreateCommandQueueWithProperties", e.0))?;

        info!(device = %device_name, platform = %platform_name, "opened device");
        Ok(Self {
            platform,
            device,
            context,
            queue,
            platform_name,
            device_name,
            address_bits,
        })
    }

    /// The device extension string, for capability gating.
    pub fn extensions(&self) -> Result<String> {
        self.device
            .extensions()
            .map_err(|e| HarnessError::api("clGetDeviceInfo", e.0))
    }

    /// The device profile string (`FULL_PROFILE` / `EMBEDDED_PROFILE`).
    pub fn profile(&self) -> Result<String> {
        self.device
            .profile()
            .map_err(|e| HarnessError::api("clGetDeviceInfo", e.0))
    }

    /// Whether the device reports image support.
    pub fn supports_images(&self) -> Result<bool> {
        self.device
            .image_support()
            .map(|b| b != 0)
            .map_err(|e| HarnessError::api("clGetDeviceInfo", e.0))
    }
}
