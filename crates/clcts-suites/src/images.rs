//! Image tests: a 2D write/read round trip under the deterministic pitch
//! rules, and a supported-format sanity query. Both skip on devices
//! without image support.

use std::ffi::c_void;
use std::ptr;

use clcts_datagen::{ChannelOrder, ChannelType, ImageDesc, ImageType};
use clcts_harness::{HarnessError, Result, TestEnv, TestStatus};
use opencl3::memory::{
    cl_image_desc, cl_image_format, Image, CL_MEM_COPY_HOST_PTR, CL_MEM_OBJECT_IMAGE2D,
    CL_MEM_READ_WRITE,
};
use opencl3::types::CL_BLOCKING;
use tracing::{info, warn};

use crate::common::random_bytes;

/// Round-trip a random RGBA/uint payload through a 2D image.
pub fn image_read_write_2d(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    if !cl.supports_images()? {
        info!("images are not supported by the device");
        return Ok(TestStatus::Skip);
    }

    let desc = ImageDesc::for_type(ImageType::Image2d);
    let host = random_bytes(17, desc.byte_size());

    let cl_format = cl_image_format {
        image_channel_order: ChannelOrder::Rgba.cl_code(),
        image_channel_data_type: ChannelType::UnsignedInt32.cl_code(),
    };
    let cl_desc = cl_image_desc {
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
    let image = unsafe {
        Image::create(
            &cl.context,
            CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
            &cl_format,
            &cl_desc,
            host.as_ptr() as *mut c_void,
        )
        .map_err(|e| HarnessError::api("clCreateImage", e.0))?
    };

    let mut read = vec![0u8; desc.byte_size()];
    let origin = [0usize; 3];
    let region = [desc.width, desc.height, 1];
    unsafe {
        cl.queue
            .enqueue_read_image(
                &image,
                CL_BLOCKING,
                origin.as_ptr(),
                region.as_ptr(),
                desc.row_pitch,
                desc.slice_pitch,
                read.as_mut_ptr() as *mut c_void,
                &[],
            )
            .map_err(|e| HarnessError::api("clEnqueueReadImage", e.0))?;
    }

    if read == host {
        Ok(TestStatus::Pass)
    } else {
        warn!(
            offset = host.iter().zip(&read).position(|(a, b)| a != b),
            "2D image read-back differs from written payload"
        );
        Ok(TestStatus::Fail)
    }
}

/// Every device with image support must report RGBA/uint32 among its
/// supported 2D read-write formats (OpenCL 1.2 s5.3.2.1).
pub fn supported_format_query(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    if !cl.supports_images()? {
        info!("images are not supported by the device");
        return Ok(TestStatus::Skip);
    }

    let formats = cl
        .context
        .get_supported_image_formats(CL_MEM_READ_WRITE, CL_MEM_OBJECT_IMAGE2D)
        .map_err(|e| HarnessError::api("clGetSupportedImageFormats", e.0))?;
    info!(count = formats.len(), "device reported supported 2D formats");

    let found = formats.iter().any(|f| {
        f.image_channel_order == ChannelOrder::Rgba.cl_code()
            && f.image_channel_data_type == ChannelType::UnsignedInt32.cl_code()
    });
    if found {
        Ok(TestStatus::Pass)
    } else {
        warn!("mandatory RGBA/uint32 2D format is missing");
        Ok(TestStatus::Fail)
    }
}
