//! Binding generated argument values to a live kernel.
//!
//! Compiled only with the `driver` feature. Host payloads become device
//! buffers, images, and samplers here; the device objects stay alive for
//! the duration of one enqueue so read-back can observe kernel output.

use std::ffi::c_void;
use std::ptr;

use opencl3::context::Context;
use opencl3::command_queue::CommandQueue;
use opencl3::kernel::{
    get_kernel_work_group_info, set_kernel_arg, Kernel, CL_KERNEL_ARG_ACCESS_READ_ONLY,
    CL_KERNEL_ARG_ACCESS_READ_WRITE, CL_KERNEL_ARG_ACCESS_WRITE_ONLY,
    CL_KERNEL_ARG_ADDRESS_CONSTANT, CL_KERNEL_ARG_ADDRESS_GLOBAL, CL_KERNEL_ARG_ADDRESS_LOCAL,
    CL_KERNEL_COMPILE_WORK_GROUP_SIZE, CL_KERNEL_LOCAL_MEM_SIZE,
};
use opencl3::memory::{
    cl_image_desc, cl_image_format, Buffer, ClMem, Image, CL_MEM_COPY_HOST_PTR,
    CL_MEM_READ_ONLY, CL_MEM_READ_WRITE, CL_MEM_WRITE_ONLY,
};
use opencl3::types::{cl_mem, cl_sampler, CL_BLOCKING, CL_FALSE, CL_TRUE};
use tracing::debug;

use crate::arg_info::{AccessQualifier, AddressQualifier, KernelArgInfo, TypeQualifiers};
use crate::arg_value::KernelArgValue;
use crate::error::{DataGenError, Result};
use crate::limits::DeviceLimits;
use crate::work_size::WorkSizeInfo;

/// Read one argument's declaration out of the compiled kernel.
pub fn kernel_arg_info(kernel: &Kernel, index: u32) -> Result<KernelArgInfo> {
    let name = kernel
        .get_arg_name(index)
        .map_err(|e| DataGenError::api("clGetKernelArgInfo", e.0))?;
    let type_name = kernel
        .get_arg_type_name(index)
        .map_err(|e| DataGenError::api("clGetKernelArgInfo", e.0))?;
    // Drivers may null-terminate the reported names.
    let name = name.trim_end_matches('\0').to_string();
    let type_name = type_name.trim_end_matches('\0').to_string();

    let address = match kernel
        .get_arg_address_qualifier(index)
        .map_err(|e| DataGenError::api("clGetKernelArgInfo", e.0))?
    {
        CL_KERNEL_ARG_ADDRESS_GLOBAL => AddressQualifier::Global,
        CL_KERNEL_ARG_ADDRESS_LOCAL => AddressQualifier::Local,
        CL_KERNEL_ARG_ADDRESS_CONSTANT => AddressQualifier::Constant,
        _ => AddressQualifier::Private,
    };
    let access = match kernel
        .get_arg_access_qualifier(index)
        .map_err(|e| DataGenError::api("clGetKernelArgInfo", e.0))?
    {
        CL_KERNEL_ARG_ACCESS_READ_ONLY => AccessQualifier::ReadOnly,
        CL_KERNEL_ARG_ACCESS_WRITE_ONLY => AccessQualifier::WriteOnly,
        CL_KERNEL_ARG_ACCESS_READ_WRITE => AccessQualifier::ReadWrite,
        _ => AccessQualifier::None,
    };
    let raw_qualifiers = kernel
        .get_arg_type_qualifier(index)
        .map_err(|e| DataGenError::api("clGetKernelArgInfo", e.0))?;
    let mut qualifiers = TypeQualifiers::empty();
    if raw_qualifiers & 1 != 0 {
        qualifiers |= TypeQualifiers::CONST;
    }
    if raw_qualifiers & 2 != 0 {
        qualifiers |= TypeQualifiers::RESTRICT;
    }
    if raw_qualifiers & 4 != 0 {
        qualifiers |= TypeQualifiers::VOLATILE;
    }

    Ok(KernelArgInfo {
        name,
        type_name,
        address,
        access,
        qualifiers,
    })
}

/// Read every argument declaration of the kernel, in index order.
pub fn kernel_arg_infos(kernel: &Kernel) -> Result<Vec<KernelArgInfo>> {
    let num_args = kernel.num_args().map_err(|e| DataGenError::api("clGetKernelInfo", e.0))?;
    (0..num_args).map(|i| kernel_arg_info(kernel, i)).collect()
}

/// Query the limits that drive buffer sizing for one kernel.
pub fn query_limits(
    device: &opencl3::device::Device,
    kernel: &Kernel,
    arg_infos: &[KernelArgInfo],
) -> Result<DeviceLimits> {
    let local_mem_size = device
        .local_mem_size()
        .map_err(|e| DataGenError::api("clGetDeviceInfo", e.0))?;
    let max_constant_buffer_size = device
        .max_constant_buffer_size()
        .map_err(|e| DataGenError::api("clGetDeviceInfo", e.0))?;
    let kernel_local_mem_size =
        get_kernel_work_group_info(kernel.get(), device.id(), CL_KERNEL_LOCAL_MEM_SIZE)
            .map_err(|e| DataGenError::api("clGetKernelWorkGroupInfo", e))?
            .to_ulong();
    let num_local_args = arg_infos
        .iter()
        .filter(|a| a.address == AddressQualifier::Local)
        .count() as u32;
    Ok(DeviceLimits {
        local_mem_size,
        max_constant_buffer_size,
        kernel_local_mem_size,
        num_local_args,
    })
}

/// Derive the enqueue geometry for a kernel, honoring a compiled
/// `reqd_work_group_size` attribute when the kernel carries one.
pub fn work_size_for_kernel(
    device: &opencl3::device::Device,
    kernel: &Kernel,
    global: usize,
) -> Result<WorkSizeInfo> {
    let mut ws = WorkSizeInfo::one_dim(global);
    let compiled =
        get_kernel_work_group_info(kernel.get(), device.id(), CL_KERNEL_COMPILE_WORK_GROUP_SIZE)
            .map_err(|e| DataGenError::api("clGetKernelWorkGroupInfo", e))?
            .to_vec_size();
    let mut reqd = [0usize; 3];
    for (dst, src) in reqd.iter_mut().zip(&compiled) {
        *dst = *src;
    }
    ws.apply_compiled_work_group_size(reqd);
    Ok(ws)
}

/// Releases the sampler handle when the bound arguments drop.
struct SamplerGuard(cl_sampler);

impl Drop for SamplerGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = cl3::sampler::release_sampler(self.0);
        }
    }
}

/// One bound argument: keeps the backing device objects alive.
enum BoundArg {
    Buffer { index: u32, mem: Buffer<u8> },
    Image {
        index: u32,
        image: Image,
        /// 1D-buffer images sit on top of a buffer object; it must
        /// outlive the image.
        _backing: Option<Buffer<u8>>,
    },
    Sampler { _sampler: SamplerGuard },
    Inline,
}

/// All device objects for one kernel invocation.
pub struct BoundArgs {
    bound: Vec<BoundArg>,
}

impl BoundArgs {
    /// Create device objects for every argument value and set them on the
    /// kernel. `values` must be in argument-index order.
    pub fn bind(
        context: &Context,
        kernel: &Kernel,
        infos: &[KernelArgInfo],
        values: &[KernelArgValue],
    ) -> Result<Self> {
        let mut bound = Vec::with_capacity(values.len());
        for (index, (info, value)) in infos.iter().zip(values).enumerate() {
            let index = index as u32;
            debug!(arg = %info, index, size = value.size(), "binding kernel argument");
            bound.push(bind_one(context, kernel, index, info, value)?);
        }
        Ok(Self { bound })
    }

    /// Read every buffer and image payload back into the host-side values.
    /// `values` must be the same slice (same order) passed to [`bind`].
    ///
    /// [`bind`]: Self::bind
    pub fn read_back(&self, queue: &CommandQueue, values: &mut [KernelArgValue]) -> Result<()> {
        for arg in &self.bound {
            match arg {
                BoundArg::Buffer { index, mem } => {
                    let value = &mut values[*index as usize];
                    let bytes = value.bytes_mut().ok_or_else(|| {
                        DataGenError::api("clEnqueueReadBuffer", -38) // CL_INVALID_MEM_OBJECT
                    })?;
                    unsafe {
                        queue
                            .enqueue_read_buffer(mem, CL_BLOCKING, 0, bytes, &[])
                            .map_err(|e| DataGenError::api("clEnqueueReadBuffer", e.0))?;
                    }
                }
                BoundArg::Image { index, image, .. } => {
                    let value = &mut values[*index as usize];
                    let KernelArgValue::Image { data, desc, .. } = value else {
                        continue;
                    };
                    let origin = [0usize; 3];
                    let region = [desc.width, desc.height, desc.depth * desc.array_size];
                    unsafe {
                        queue
                            .enqueue_read_image(
                                image,
                                CL_BLOCKING,
                                origin.as_ptr(),
                                region.as_ptr(),
                                desc.row_pitch,
                                desc.slice_pitch,
                                data.as_mut_ptr() as *mut c_void,
                                &[],
                            )
                            .map_err(|e| DataGenError::api("clEnqueueReadImage", e.0))?;
                    }
                }
                BoundArg::Sampler { .. } | BoundArg::Inline => {}
            }
        }
        Ok(())
    }
}

fn access_flags(access: AccessQualifier) -> u64 {
    match access {
        AccessQualifier::ReadOnly => CL_MEM_READ_ONLY,
        AccessQualifier::WriteOnly => CL_MEM_WRITE_ONLY,
        AccessQualifier::ReadWrite | AccessQualifier::None => CL_MEM_READ_WRITE,
    }
}

fn bind_one(
    context: &Context,
    kernel: &Kernel,
    index: u32,
    info: &KernelArgInfo,
    value: &KernelArgValue,
) -> Result<BoundArg> {
    match value {
        KernelArgValue::Value { data } => {
            unsafe {
                set_kernel_arg(
                    kernel.get(),
                    index,
                    data.len(),
                    data.as_ptr() as *const c_void,
                )
                .map_err(|e| DataGenError::api("clSetKernelArg", e))?;
            }
            Ok(BoundArg::Inline)
        }
        KernelArgValue::Local { size } => {
            unsafe {
                set_kernel_arg(kernel.get(), index, *size, ptr::null())
                    .map_err(|e| DataGenError::api("clSetKernelArg", e))?;
            }
            Ok(BoundArg::Inline)
        }
        KernelArgValue::Buffer { data } => {
            let mem = unsafe {
                Buffer::<u8>::create(
                    context,
                    CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
                    data.len(),
                    data.as_ptr() as *mut c_void,
                )
                .map_err(|e| DataGenError::api("clCreateBuffer", e.0))?
            };
            set_mem_arg(kernel, index, mem.get())?;
            Ok(BoundArg::Buffer { index, mem })
        }
        KernelArgValue::Image { data, format, desc } => {
            let cl_format = cl_image_format {
                image_channel_order: format.order.cl_code(),
                image_channel_data_type: format.channel_type.cl_code(),
            };
            let mut cl_desc = cl_image_desc {
                image_type: desc.image_type.cl_code(),
                image_width: desc.width,
                image_height: desc.height,
                image_depth: desc.depth,
                image_array_size: desc.array_size,
                image_row_pitch: desc.row_pitch,
                image_slice_pitch: desc.slice_pitch,
                num_mip_levels: 0,
                num_samples: 0,
                buffer: ptr::null_mut(),
            };
            let mut flags = access_flags(info.access);
            let mut host_ptr = data.as_ptr() as *mut c_void;
            // 1D-buffer images take their payload through a buffer object
            // named in the descriptor; pitches and the host pointer must
            // then stay clear.
            let backing = if desc.image_type.backed_by_buffer() {
                let buffer = unsafe {
                    Buffer::<u8>::create(
                        context,
                        CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
                        data.len(),
                        data.as_ptr() as *mut c_void,
                    )
                    .map_err(|e| DataGenError::api("clCreateBuffer", e.0))?
                };
                cl_desc.buffer = buffer.get();
                cl_desc.image_row_pitch = 0;
                cl_desc.image_slice_pitch = 0;
                host_ptr = ptr::null_mut();
                Some(buffer)
            } else {
                flags |= CL_MEM_COPY_HOST_PTR;
                None
            };
            let image = unsafe {
                Image::create(context, flags, &cl_format, &cl_desc, host_ptr)
                    .map_err(|e| DataGenError::api("clCreateImage", e.0))?
            };
            set_mem_arg(kernel, index, image.get())?;
            Ok(BoundArg::Image { index, image, _backing: backing })
        }
        KernelArgValue::Sampler(settings) => {
            let raw = unsafe {
                cl3::sampler::create_sampler(
                    context.get(),
                    if settings.normalized { CL_TRUE } else { CL_FALSE },
                    settings.addressing.cl_code(),
                    settings.filter.cl_code(),
                )
                .map_err(|e| DataGenError::api("clCreateSampler", e))?
            };
            let sampler = SamplerGuard(raw);
            unsafe {
                set_kernel_arg(
                    kernel.get(),
                    index,
                    std::mem::size_of_val(&raw),
                    &raw as *const _ as *const c_void,
                )
                .map_err(|e| DataGenError::api("clSetKernelArg", e))?;
            }
            Ok(BoundArg::Sampler { _sampler: sampler })
        }
    }
}

fn set_mem_arg(kernel: &Kernel, index: u32, mem: cl_mem) -> Result<()> {
    unsafe {
        set_kernel_arg(
            kernel.get(),
            index,
            std::mem::size_of::<cl_mem>(),
            &mem as *const cl_mem as *const c_void,
        )
        .map_err(|e| DataGenError::api("clSetKernelArg", e))?;
    }
    Ok(())
}

/// Enqueue the kernel over the given geometry and wait for completion.
pub fn execute(queue: &CommandQueue, kernel: &Kernel, ws: &WorkSizeInfo) -> Result<()> {
    let dims = ws.work_dim as usize;
    unsafe {
        opencl3::command_queue::enqueue_nd_range_kernel(
            queue.get(),
            kernel.get(),
            ws.work_dim,
            ws.global_work_offset[..dims].as_ptr(),
            ws.global_work_size[..dims].as_ptr(),
            ws.local_work_size[..dims].as_ptr(),
            0,
            ptr::null(),
        )
        .map_err(|e| DataGenError::api("clEnqueueNDRangeKernel", e))?;
    }
    queue.finish().map_err(|e| DataGenError::api("clFinish", e.0))?;
    Ok(())
}
