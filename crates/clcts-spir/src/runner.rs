//! End-to-end execution of one bundle test: build the kernel from source
//! and from portable IR, drive both with identical generated arguments,
//! and compare the results.
//!
//! Compiled only with the `driver` feature.

use clcts_datagen::bind::{self, BoundArgs};
use clcts_datagen::{ArgRng, DataGenerator, GenContext};
use clcts_harness::device::DriverHandles;
use clcts_harness::TestStatus;
use opencl3::device::CL_FP_CORRECTLY_ROUNDED_DIVIDE_SQRT;
use opencl3::kernel::Kernel;
use tracing::{info, warn};

use crate::bundle::KernelBundle;
use crate::error::{Result, SpirError};
use crate::extensions::OclExtensions;
use crate::khr_csv::KhrSupport;
use crate::tasks::{build_options, program_from_binary, program_from_source, BuildTask, Task};
use crate::vectors::TestVectors;

/// Global work size used when the kernel does not dictate its own
/// geometry.
pub const DEFAULT_GLOBAL_WORK_SIZE: usize = 32;

/// Runs bundle tests against one opened device.
pub struct TestRunner<'a> {
    khr: &'a KhrSupport,
    dev_ext: OclExtensions,
}

impl<'a> TestRunner<'a> {
    pub fn new(khr: &'a KhrSupport, dev_ext: OclExtensions) -> Self {
        Self { khr, dev_ext }
    }

    /// Decide whether the device can host the test at all; `Some(reason)`
    /// means skip.
    fn skip_reason(
        &self,
        handles: &DriverHandles,
        folder: &str,
        test_name: &str,
    ) -> Result<Option<String>> {
        if self.khr.is_images_required(folder, test_name) && !handles.supports_images()? {
            return Ok(Some("images are not supported by the device".to_string()));
        }
        if self.khr.is_images_3d_required(folder, test_name) && !supports_3d_images(handles)? {
            return Ok(Some("3D images are not supported by the device".to_string()));
        }
        let required = self.khr.required_extensions(folder, test_name);
        if !self.dev_ext.supports(required) {
            return Ok(Some(format!(
                "missing extensions: {}",
                self.dev_ext.missing(required)
            )));
        }
        if needs_correctly_rounded(test_name) && !supports_correctly_rounded(handles)? {
            return Ok(Some(
                "CL_FP_CORRECTLY_ROUNDED_DIVIDE_SQRT is not supported".to_string(),
            ));
        }
        Ok(None)
    }

    /// Build and run one test's kernel from both program flavors and
    /// compare the argument vectors afterwards.
    pub fn run_build_test(
        &self,
        handles: &DriverHandles,
        bundle: &KernelBundle,
        folder: &str,
        test_name: &str,
        seed: u64,
        ulps: f32,
    ) -> Result<TestStatus> {
        info!(test = test_name, folder, "running bundle test");

        if let Some(reason) = self.skip_reason(handles, folder, test_name)? {
            info!(test = test_name, reason, "skipped");
            return Ok(TestStatus::Skip);
        }

        let source = bundle.load_source(test_name)?;
        let binary = bundle.load_binary(test_name, handles.address_bits)?;
        let kernel_name = KernelBundle::kernel_name(test_name);

        let correctly_rounded = needs_correctly_rounded(test_name);
        let mut cl_program = program_from_source(&handles.context, &source)?;
        let mut bc_program = program_from_binary(&handles.context, handles.device.id(), &binary)?;

        BuildTask::new(&mut cl_program, handles.device.id(), &build_options(false, correctly_rounded))
            .execute()?;
        BuildTask::new(&mut bc_program, handles.device.id(), &build_options(true, correctly_rounded))
            .execute()?;

        let cl_kernel = Kernel::create(&cl_program, kernel_name)
            .map_err(|e| SpirError::api("clCreateKernel", e.0))?;
        let bc_kernel = Kernel::create(&bc_program, kernel_name)
            .map_err(|e| SpirError::api("clCreateKernel", e.0))?;

        // The source build drives generation; both kernels then see the
        // exact same bytes.
        let infos = bind::kernel_arg_infos(&cl_kernel)?;
        let limits = bind::query_limits(&handles.device, &cl_kernel, &infos)?;
        let ws = bind::work_size_for_kernel(&handles.device, &cl_kernel, DEFAULT_GLOBAL_WORK_SIZE)?;
        let ctx = GenContext::new(ws, limits);

        let registry = DataGenerator::default();
        let mut rng = ArgRng::new(seed);
        let cl_vectors = TestVectors::generate(&registry, &ctx, &infos, &mut rng)?;
        let bc_vectors = cl_vectors.clone_for_replay(&registry, &ctx, &mut rng)?;

        let (cl_infos, mut cl_values) = cl_vectors.into_parts();
        let bound = BoundArgs::bind(&handles.context, &cl_kernel, &cl_infos, &cl_values)?;
        bind::execute(&handles.queue, &cl_kernel, &ws)?;
        bound.read_back(&handles.queue, &mut cl_values)?;

        let (bc_infos, mut bc_values) = bc_vectors.into_parts();
        let bound = BoundArgs::bind(&handles.context, &bc_kernel, &bc_infos, &bc_values)?;
        bind::execute(&handles.queue, &bc_kernel, &ws)?;
        bound.read_back(&handles.queue, &mut bc_values)?;

        let cl_vectors = TestVectors::from_parts(cl_infos, cl_values);
        let bc_vectors = TestVectors::from_parts(bc_infos, bc_values);
        match cl_vectors.compare(&bc_vectors, ulps) {
            None => {
                info!(test = test_name, kernel = kernel_name, "kernel passed");
                Ok(TestStatus::Pass)
            }
            Some(mismatch) => {
                warn!(test = test_name, kernel = kernel_name, %mismatch, "kernel failed");
                Ok(TestStatus::Fail)
            }
        }
    }
}

fn needs_correctly_rounded(test_name: &str) -> bool {
    test_name.contains("div_cr") || test_name.contains("sqrt_cr")
}

fn supports_3d_images(handles: &DriverHandles) -> Result<bool> {
    let width = handles
        .device
        .image3d_max_width()
        .map_err(|e| SpirError::api("clGetDeviceInfo", e.0))?;
    Ok(width > 0)
}

fn supports_correctly_rounded(handles: &DriverHandles) -> Result<bool> {
    let fp_config = handles
        .device
        .single_fp_config()
        .map_err(|e| SpirError::api("clGetDeviceInfo", e.0))?;
    Ok(fp_config & CL_FP_CORRECTLY_ROUNDED_DIVIDE_SQRT != 0)
}
