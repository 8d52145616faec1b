//! Portable-IR conformance driver services.
//!
//! Builds each bundle kernel twice, once from OpenCL C source and once
//! from its pre-built portable-IR binary, drives both builds with
//! identical generated arguments, and compares the results. The pure
//! services (suite table, command line, side table, path composition,
//! capability sets, vector comparison) compile without a driver; the
//! `driver` feature adds program building and kernel execution.

pub mod bundle;
pub mod cli;
pub mod error;
pub mod extensions;
pub mod khr_csv;
#[cfg(feature = "driver")]
pub mod runner;
#[cfg(feature = "driver")]
pub mod tasks;
pub mod vectors;

pub use bundle::{find_suite, KernelBundle, SubSuite, SUITES};
pub use cli::SpirCli;
pub use error::{Result, SpirError};
pub use extensions::OclExtensions;
pub use khr_csv::KhrSupport;
pub use vectors::{TestVectors, VectorMismatch};
