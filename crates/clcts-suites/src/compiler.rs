//! Program build behavior: option acceptance, build-log capture on a
//! broken kernel, and separate compilation with an embedded header.

use clcts_harness::{Result, TestEnv, TestStatus};
use clcts_spir::tasks::{program_from_source, BuildTask, CompileTask, Task, CL_BUILD_OPTIONS};
use clcts_spir::SpirError;
use tracing::{debug, warn};

use crate::common::setup_error;

const SCALE_KERNEL: &str = r#"
__kernel void scale(__global float *data, float factor)
{
    size_t i = get_global_id(0);
    data[i] *= factor;
}
"#;

// Undeclared function: must fail to build on every conformant compiler.
const BROKEN_KERNEL: &str = r#"
__kernel void broken(__global float *data)
{
    data[get_global_id(0)] = no_such_function(data);
}
"#;

const HEADER_SOURCE: &str = "#define SCALE_FACTOR 2.0f\n";

const INCLUDING_KERNEL: &str = r#"
#include "defs.h"

__kernel void scale_by_header(__global float *data)
{
    data[get_global_id(0)] *= SCALE_FACTOR;
}
"#;

/// A well-formed kernel must build under the standard option set plus
/// `-w`.
pub fn build_options_accepted(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let mut program = program_from_source(&cl.context, SCALE_KERNEL).map_err(setup_error)?;
    let options = format!("{CL_BUILD_OPTIONS} -w");
    match BuildTask::new(&mut program, cl.device.id(), &options).execute() {
        Ok(()) => Ok(TestStatus::Pass),
        Err(e) => {
            warn!(error = %e, "build rejected standard options");
            Ok(TestStatus::Fail)
        }
    }
}

/// Building a broken kernel must fail and surface a non-empty build log.
pub fn build_log_captured(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let mut program = program_from_source(&cl.context, BROKEN_KERNEL).map_err(setup_error)?;
    match BuildTask::new(&mut program, cl.device.id(), CL_BUILD_OPTIONS).execute() {
        Ok(()) => {
            warn!("broken kernel built successfully");
            Ok(TestStatus::Fail)
        }
        Err(SpirError::Build { log, .. }) if !log.trim().is_empty() => {
            debug!(log_len = log.len(), "captured build log from failed build");
            Ok(TestStatus::Pass)
        }
        Err(e) => {
            warn!(error = %e, "build failed without a usable log");
            Ok(TestStatus::Fail)
        }
    }
}

/// Separate compilation must resolve `#include` directives against
/// embedded header programs.
pub fn compile_with_embedded_header(env: &TestEnv) -> Result<TestStatus> {
    let cl = env.cl()?;
    let header = program_from_source(&cl.context, HEADER_SOURCE).map_err(setup_error)?;
    let mut program =
        program_from_source(&cl.context, INCLUDING_KERNEL).map_err(setup_error)?;
    let mut task = CompileTask::new(&mut program, cl.device.id(), CL_BUILD_OPTIONS);
    task.add_header("defs.h", &header);
    match task.execute() {
        Ok(()) => Ok(TestStatus::Pass),
        Err(e) => {
            warn!(error = %e, log = task.error_log(), "compile with header failed");
            Ok(TestStatus::Fail)
        }
    }
}
