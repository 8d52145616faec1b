//! Buffer round-trip tests: write/read, copy, and pattern fill, all
//! compared byte for byte.

use std::ffi::c_void;
use std::ptr;

use clcts_harness::{HarnessError, Result, TestEnv, TestStatus};
use opencl3::memory::{Buffer, CL_MEM_COPY_HOST_PTR, CL_MEM_READ_WRITE};
use opencl3::types::CL_BLOCKING;
use tracing::warn;

use crate::common::random_bytes;

const BUFFER_BYTES: usize = 4096;
const FILL_PATTERN: [u8; 16] = [
    0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa,
    0xbb,
];

fn create_empty(env: &TestEnv, len: usize) -> Result<Buffer<u8>> {
    let cl = env.cl()?;
    unsafe {
        Buffer::<u8>::create(&cl.context, CL_MEM_READ_WRITE, len, ptr::null_mut())
            .map_err(|e| HarnessError::api("clCreateBuffer", e.0))
    }
}

fn create_with_data(env: &TestEnv, data: &[u8]) -> Result<Buffer<u8>> {
    let cl = env.cl()?;
    unsafe {
        Buffer::<u8>::create(
            &cl.context,
            CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
            data.len(),
            data.as_ptr() as *mut c_void,
        )
        .map_err(|e| HarnessError::api("clCreateBuffer", e.0))
    }
}

fn read_all(env: &TestEnv, buffer: &Buffer<u8>, len: usize) -> Result<Vec<u8>> {
    let cl = env.cl()?;
    let mut out = vec![0u8; len];
    unsafe {
        cl.queue
            .enqueue_read_buffer(buffer, CL_BLOCKING, 0, &mut out, &[])
            .map_err(|e| HarnessError::api("clEnqueueReadBuffer", e.0))?;
    }
    Ok(out)
}

/// Write a host payload into a device buffer and read it straight back.
pub fn buffer_read_write(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let host = random_bytes(11, BUFFER_BYTES);
    let mut buffer = create_empty(env, BUFFER_BYTES)?;
    unsafe {
        cl.queue
            .enqueue_write_buffer(&mut buffer, CL_BLOCKING, 0, &host, &[])
            .map_err(|e| HarnessError::api("clEnqueueWriteBuffer", e.0))?;
    }
    let read = read_all(env, &buffer, BUFFER_BYTES)?;
    if read == host {
        Ok(TestStatus::Pass)
    } else {
        warn!(
            offset = host.iter().zip(&read).position(|(a, b)| a != b),
            "read-back bytes differ from written payload"
        );
        Ok(TestStatus::Fail)
    }
}

/// Device-to-device copy must reproduce the source payload in the
/// destination buffer.
pub fn buffer_copy(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let host = random_bytes(13, BUFFER_BYTES);
    let src = create_with_data(env, &host)?;
    let mut dst = create_with_data(env, &vec![0u8; BUFFER_BYTES])?;
    unsafe {
        cl.queue
            .enqueue_copy_buffer(&src, &mut dst, 0, 0, BUFFER_BYTES, &[])
            .map_err(|e| HarnessError::api("clEnqueueCopyBuffer", e.0))?;
    }
    cl.queue.finish().map_err(|e| HarnessError::api("clFinish", e.0))?;
    let read = read_all(env, &dst, BUFFER_BYTES)?;
    if read == host {
        Ok(TestStatus::Pass)
    } else {
        warn!("copied buffer differs from source");
        Ok(TestStatus::Fail)
    }
}

/// `clEnqueueFillBuffer` must tile the pattern across the whole buffer.
pub fn buffer_fill(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let mut buffer = create_with_data(env, &vec![0u8; BUFFER_BYTES])?;
    unsafe {
        cl.queue
            .enqueue_fill_buffer(&mut buffer, &FILL_PATTERN, 0, BUFFER_BYTES, &[])
            .map_err(|e| HarnessError::api("clEnqueueFillBuffer", e.0))?;
    }
    cl.queue.finish().map_err(|e| HarnessError::api("clFinish", e.0))?;
    let read = read_all(env, &buffer, BUFFER_BYTES)?;
    let ok = read
        .chunks_exact(FILL_PATTERN.len())
        .all(|chunk| chunk == FILL_PATTERN);
    if ok {
        Ok(TestStatus::Pass)
    } else {
        warn!("filled buffer does not repeat the pattern");
        Ok(TestStatus::Fail)
    }
}
