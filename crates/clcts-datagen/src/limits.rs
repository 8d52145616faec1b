//! Device limits the generators consult when sizing buffers.

use crate::work_size::WorkSizeInfo;

/// The subset of device/kernel queries argument sizing depends on.
///
/// Carries a [`DeviceLimits::mock`] so the layout logic tests without real
/// hardware; with the `driver` feature the fields are filled from device
/// and kernel-work-group queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// `CL_DEVICE_LOCAL_MEM_SIZE`.
    pub local_mem_size: u64,
    /// `CL_DEVICE_MAX_CONSTANT_BUFFER_SIZE`.
    pub max_constant_buffer_size: u64,
    /// Local memory already consumed by the kernel and implementation.
    pub kernel_local_mem_size: u64,
    /// Number of `__local` arguments in the kernel signature.
    pub num_local_args: u32,
}

impl DeviceLimits {
    /// Mid-range defaults for driverless tests: 64 KB local memory and a
    /// 64 KB constant buffer.
    pub fn mock() -> Self {
        Self {
            local_mem_size: 64 * 1024,
            max_constant_buffer_size: 64 * 1024,
            kernel_local_mem_size: 0,
            num_local_args: 0,
        }
    }

    /// Local memory left for dividing across `__local` arguments.
    pub fn available_local_mem(&self) -> u64 {
        self.local_mem_size.saturating_sub(self.kernel_local_mem_size)
    }
}

/// Everything a generator needs besides the argument descriptor itself.
#[derive(Debug, Clone, Copy)]
pub struct GenContext {
    pub ws: WorkSizeInfo,
    pub limits: DeviceLimits,
}

impl GenContext {
    pub fn new(ws: WorkSizeInfo, limits: DeviceLimits) -> Self {
        Self { ws, limits }
    }

    /// A context over mock limits, for offline generation.
    pub fn mock(ws: WorkSizeInfo) -> Self {
        Self { ws, limits: DeviceLimits::mock() }
    }
}
