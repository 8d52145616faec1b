//! Program build, compile, and link steps against the vendor runtime.
//!
//! Compiled only with the `driver` feature. Each task runs once; on
//! failure it captures the vendor build log and fails the enclosing test.
//! There is no retry and no partial success.

use std::ffi::CString;

use opencl3::context::Context;
use opencl3::program::Program;
use opencl3::types::{cl_device_id, cl_program};
use tracing::debug;

use crate::error::{Result, SpirError};

/// Options for building kernels from OpenCL C source.
pub const CL_BUILD_OPTIONS: &str = "-cl-kernel-arg-info";

/// Options for building kernels from portable-IR binaries.
pub const SPIR_BUILD_OPTIONS: &str = "-x spir -spir-std=1.2 -cl-kernel-arg-info";

/// Build options for one program flavor, with the correctly-rounded
/// divide/sqrt flag appended when the test demands it.
pub fn build_options(portable_ir: bool, correctly_rounded: bool) -> String {
    let mut options =
        String::from(if portable_ir { SPIR_BUILD_OPTIONS } else { CL_BUILD_OPTIONS });
    if correctly_rounded {
        options.push_str(" -cl-fp32-correctly-rounded-divide-sqrt");
    }
    options
}

/// A single program-processing step with a captured error log.
pub trait Task {
    fn execute(&mut self) -> Result<()>;
    /// The vendor build log from the last failed execution.
    fn error_log(&self) -> &str;
}

fn fetch_log(program: &Program, device: cl_device_id) -> String {
    program
        .get_build_log(device)
        .unwrap_or_else(|e| format!("(build log unavailable: status {})", e.0))
}

// ── Build ────────────────────────────────────────────────────────────────────

/// One-step program build (`clBuildProgram`), for both source and
/// portable-IR programs; the flavor lives in the options string.
pub struct BuildTask<'a> {
    program: &'a mut Program,
    device: cl_device_id,
    options: String,
    log: String,
}

impl<'a> BuildTask<'a> {
    pub fn new(program: &'a mut Program, device: cl_device_id, options: &str) -> Self {
        Self { program, device, options: options.to_string(), log: String::new() }
    }
}

impl Task for BuildTask<'_> {
    fn execute(&mut self) -> Result<()> {
        debug!(options = %self.options, "building program");
        match self.program.build(&[self.device], &self.options) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.log = fetch_log(self.program, self.device);
                Err(SpirError::Build { stage: "clBuildProgram", code: e.0, log: self.log.clone() })
            }
        }
    }

    fn error_log(&self) -> &str {
        &self.log
    }
}

// ── Compile ──────────────────────────────────────────────────────────────────

/// Separate compilation (`clCompileProgram`), optionally with embedded
/// headers registered by include name.
pub struct CompileTask<'a> {
    program: &'a mut Program,
    device: cl_device_id,
    options: String,
    headers: Vec<(CString, cl_program)>,
    log: String,
}

impl<'a> CompileTask<'a> {
    pub fn new(program: &'a mut Program, device: cl_device_id, options: &str) -> Self {
        Self {
            program,
            device,
            options: options.to_string(),
            headers: Vec::new(),
            log: String::new(),
        }
    }

    /// Register an embedded header program under its include name.
    pub fn add_header(&mut self, name: &str, header: &Program) {
        let name = CString::new(name).unwrap_or_default();
        self.headers.push((name, header.get()));
    }
}

impl Task for CompileTask<'_> {
    fn execute(&mut self) -> Result<()> {
        let names: Vec<&std::ffi::CStr> = self.headers.iter().map(|(n, _)| n.as_c_str()).collect();
        let programs: Vec<cl_program> = self.headers.iter().map(|(_, p)| *p).collect();
        debug!(options = %self.options, headers = names.len(), "compiling program");
        match self.program.compile(&[self.device], &self.options, &programs, &names) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.log = fetch_log(self.program, self.device);
                Err(SpirError::Build {
                    stage: "clCompileProgram",
                    code: e.0,
                    log: self.log.clone(),
                })
            }
        }
    }

    fn error_log(&self) -> &str {
        &self.log
    }
}

// ── Link ─────────────────────────────────────────────────────────────────────

/// Compile each input as portable IR, then link them into an executable
/// program.
pub struct LinkTask<'a> {
    programs: &'a mut [Program],
    context: &'a Context,
    device: cl_device_id,
    options: String,
    executable: Option<Program>,
    log: String,
}

impl<'a> LinkTask<'a> {
    pub fn new(
        programs: &'a mut [Program],
        context: &'a Context,
        device: cl_device_id,
        options: &str,
    ) -> Self {
        Self {
            programs,
            context,
            device,
            options: options.to_string(),
            executable: None,
            log: String::new(),
        }
    }

    /// The linked executable, once [`Task::execute`] has succeeded.
    pub fn executable(&self) -> Option<&Program> {
        self.executable.as_ref()
    }

    pub fn take_executable(&mut self) -> Option<Program> {
        self.executable.take()
    }
}

impl Task for LinkTask<'_> {
    fn execute(&mut self) -> Result<()> {
        for program in self.programs.iter_mut() {
            if let Err(e) = program.compile(&[self.device], SPIR_BUILD_OPTIONS, &[], &[]) {
                self.log = fetch_log(program, self.device);
                return Err(SpirError::Build {
                    stage: "clCompileProgram",
                    code: e.0,
                    log: self.log.clone(),
                });
            }
        }

        let inputs: Vec<cl_program> = self.programs.iter().map(|p| p.get()).collect();
        debug!(inputs = inputs.len(), options = %self.options, "linking programs");
        match Program::link(self.context, &[self.device], &self.options, &inputs) {
            Ok(executable) => {
                self.executable = Some(executable);
                Ok(())
            }
            // The binding drops the failed executable's handle, so its
            // build log is unreachable; the compile-stage log is all
            // there is to attach.
            Err(e) => Err(SpirError::Build {
                stage: "clLinkProgram",
                code: e.0,
                log: self.log.clone(),
            }),
        }
    }

    fn error_log(&self) -> &str {
        &self.log
    }
}

// ── Program creation ─────────────────────────────────────────────────────────

/// Create an unbuilt program from OpenCL C source text.
pub fn program_from_source(context: &Context, source: &str) -> Result<Program> {
    Program::create_from_sources(context, &[source])
        .map_err(|e| SpirError::api("clCreateProgramWithSource", e.0))
}

/// Create an unbuilt program from a portable-IR binary.
pub fn program_from_binary(
    context: &Context,
    device: cl_device_id,
    binary: &[u8],
) -> Result<Program> {
    Program::create_from_binary(context, &[device], &[binary])
        .map_err(|e| SpirError::api("clCreateProgramWithBinary", e.0))
}
