//! Shared virtual memory tests: a coarse-grain map/write/read round trip
//! and `clEnqueueSVMFree` completion signalling through its callback.
//!
//! The free test waits on an atomic flag set from the driver's callback
//! thread, polled with a sleep loop. There is deliberately no timeout: a
//! callback that never fires is a driver hang the run should expose, not
//! paper over.

use std::ffi::c_void;
use std::ptr;
use std::slice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clcts_harness::{HarnessError, Result, TestEnv, TestStatus};
use opencl3::command_queue::{enqueue_svm_free, enqueue_svm_map, enqueue_svm_unmap};
use opencl3::device::CL_DEVICE_SVM_COARSE_GRAIN_BUFFER;
use opencl3::memory::{svm_alloc, svm_free, CL_MAP_READ, CL_MAP_WRITE, CL_MEM_READ_WRITE};
use opencl3::types::{cl_command_queue, cl_uint, CL_BLOCKING};
use tracing::{debug, info, warn};

use crate::common::random_bytes;

const SVM_BYTES: usize = 4096;

fn coarse_grain_supported(env: &TestEnv) -> Result<bool> {
    let cl = env.cl()?;
    let caps = cl.device.svm_mem_capability();
    debug!(caps, "device SVM capabilities");
    Ok(caps & CL_DEVICE_SVM_COARSE_GRAIN_BUFFER != 0)
}

/// Allocate a coarse-grain SVM buffer, write through a mapped pointer,
/// read it back through a second mapping, and free it.
pub fn coarse_grain_round_trip(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    if !coarse_grain_supported(env)? {
        info!("coarse-grain SVM is not supported by the device");
        return Ok(TestStatus::Skip);
    }

    let svm = unsafe {
        svm_alloc(cl.context.get(), CL_MEM_READ_WRITE, SVM_BYTES, 0)
            .map_err(|e| HarnessError::api("clSVMAlloc", e))?
    };

    let host = random_bytes(19, SVM_BYTES);
    unsafe {
        enqueue_svm_map(
            cl.queue.get(),
            CL_BLOCKING,
            CL_MAP_WRITE,
            svm,
            SVM_BYTES,
            0,
            ptr::null(),
        )
        .map_err(|e| HarnessError::api("clEnqueueSVMMap", e))?;
        slice::from_raw_parts_mut(svm as *mut u8, SVM_BYTES).copy_from_slice(&host);
        enqueue_svm_unmap(cl.queue.get(), svm, 0, ptr::null())
            .map_err(|e| HarnessError::api("clEnqueueSVMUnmap", e))?;
    }

    let matches = unsafe {
        enqueue_svm_map(
            cl.queue.get(),
            CL_BLOCKING,
            CL_MAP_READ,
            svm,
            SVM_BYTES,
            0,
            ptr::null(),
        )
        .map_err(|e| HarnessError::api("clEnqueueSVMMap", e))?;
        let matches = slice::from_raw_parts(svm as *const u8, SVM_BYTES) == host.as_slice();
        enqueue_svm_unmap(cl.queue.get(), svm, 0, ptr::null())
            .map_err(|e| HarnessError::api("clEnqueueSVMUnmap", e))?;
        matches
    };
    cl.queue.finish().map_err(|e| HarnessError::api("clFinish", e.0))?;

    unsafe {
        svm_free(cl.context.get(), svm);
    }

    if matches {
        Ok(TestStatus::Pass)
    } else {
        warn!("SVM read-back differs from written payload");
        Ok(TestStatus::Fail)
    }
}

extern "C" fn mark_freed(
    _queue: cl_command_queue,
    _num_svm_pointers: cl_uint,
    _svm_pointers: *mut *mut c_void,
    user_data: *mut c_void,
) {
    // Points at the AtomicBool the enqueueing thread is polling; it stays
    // alive until the flag is observed set.
    let freed = unsafe { &*(user_data as *const AtomicBool) };
    freed.store(true, Ordering::Release);
}

/// `clEnqueueSVMFree` must run its completion callback; the test blocks
/// until the callback's flag flips.
pub fn unified_free(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    if !coarse_grain_supported(env)? {
        info!("coarse-grain SVM is not supported by the device");
        return Ok(TestStatus::Skip);
    }

    let svm = unsafe {
        svm_alloc(cl.context.get(), CL_MEM_READ_WRITE, SVM_BYTES, 0)
            .map_err(|e| HarnessError::api("clSVMAlloc", e))?
    };

    let freed = AtomicBool::new(false);
    let pointers = [svm as *const c_void];
    unsafe {
        enqueue_svm_free(
            cl.queue.get(),
            pointers.len() as cl_uint,
            pointers.as_ptr(),
            Some(mark_freed),
            &freed as *const AtomicBool as *mut c_void,
            0,
            ptr::null(),
        )
        .map_err(|e| HarnessError::api("clEnqueueSVMFree", e))?;
    }
    cl.queue.flush().map_err(|e| HarnessError::api("clFlush", e.0))?;

    while !freed.load(Ordering::Acquire) {
        thread::sleep(Duration::from_millis(1));
    }
    debug!("SVM free callback observed");
    Ok(TestStatus::Pass)
}
