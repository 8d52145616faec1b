//! Kernel-arg-info reflection driving the argument generator end to end:
//! the declared argument list comes back from the compiled kernel, the
//! registry synthesizes matching payloads, and the kernel runs on them.

use clcts_datagen::bind::{self, BoundArgs};
use clcts_datagen::{AddressQualifier, ArgRng, DataGenerator, GenContext};
use clcts_harness::{Result, TestEnv, TestStatus};
use clcts_spir::tasks::{build_options, program_from_source, BuildTask, Task};
use clcts_spir::TestVectors;
use opencl3::kernel::Kernel;
use tracing::{info, warn};

use crate::common::setup_error;

const GLOBAL_WORK_SIZE: usize = 32;

const SAMPLE_KERNEL: &str = r#"
__kernel void sample_test(__global float4 *src, __global int *dst, float factor,
                          __local float *scratch)
{
    size_t i = get_global_id(0);
    size_t l = get_local_id(0);
    scratch[l] = src[i].x * factor;
    barrier(CLK_LOCAL_MEM_FENCE);
    dst[i] = (int)scratch[l];
}
"#;

fn build_sample_kernel(env: &TestEnv) -> Result<Kernel> {
    let cl = env.cl()?;
    let mut program = program_from_source(&cl.context, SAMPLE_KERNEL).map_err(setup_error)?;
    BuildTask::new(&mut program, cl.device.id(), &build_options(false, false))
        .execute()
        .map_err(setup_error)?;
    Kernel::create(&program, "sample_test").map_err(setup_error)
}

/// The reflected argument list must match the kernel declaration in name,
/// type spelling, and address space.
pub fn kernel_arg_reflection(env: &TestEnv) -> Result<TestStatus> {
    let kernel = build_sample_kernel(env)?;
    let infos = bind::kernel_arg_infos(&kernel).map_err(setup_error)?;

    let expected = [
        ("src", "float4*", AddressQualifier::Global),
        ("dst", "int*", AddressQualifier::Global),
        ("factor", "float", AddressQualifier::Private),
        ("scratch", "float*", AddressQualifier::Local),
    ];
    if infos.len() != expected.len() {
        warn!(reported = infos.len(), "wrong argument count reflected");
        return Ok(TestStatus::Fail);
    }
    for (info, (name, type_name, address)) in infos.iter().zip(expected) {
        if info.name != name || info.type_name != type_name || info.address != address {
            warn!(got = %info, want = format!("{type_name} {name}"), "reflected argument differs");
            return Ok(TestStatus::Fail);
        }
    }
    Ok(TestStatus::Pass)
}

/// Generate arguments for the reflected declarations, bind them, and run
/// the kernel; any driver rejection along the way fails the test.
pub fn generated_arguments_execute(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let kernel = build_sample_kernel(env)?;
    let infos = bind::kernel_arg_infos(&kernel).map_err(setup_error)?;
    let limits = bind::query_limits(&cl.device, &kernel, &infos).map_err(setup_error)?;
    let ws = bind::work_size_for_kernel(&cl.device, &kernel, GLOBAL_WORK_SIZE)
        .map_err(setup_error)?;
    let flat = ws.flat_global_size().map_err(setup_error)?;
    let ctx = GenContext::new(ws, limits);

    let registry = DataGenerator::default();
    let mut rng = ArgRng::new(23);
    let vectors =
        TestVectors::generate(&registry, &ctx, &infos, &mut rng).map_err(setup_error)?;

    let (infos, mut values) = vectors.into_parts();
    // The int output buffer must cover one element per work item.
    if values[1].size() != flat * std::mem::size_of::<i32>() {
        warn!(size = values[1].size(), flat, "output buffer sized wrong for the range");
        return Ok(TestStatus::Fail);
    }

    let bound = BoundArgs::bind(&cl.context, &kernel, &infos, &values).map_err(setup_error)?;
    bind::execute(&cl.queue, &kernel, &ctx.ws).map_err(setup_error)?;
    bound.read_back(&cl.queue, &mut values).map_err(setup_error)?;

    info!(args = infos.len(), flat, "generated arguments executed");
    Ok(TestStatus::Pass)
}
