//! Conformance-test harness for an OpenCL driver under test.
//!
//! Provides the pieces every suite shares: tri-state [`TestStatus`]
//! results, a [`TestRegistry`] for registration and dispatch, environment
//! and command-line [`config`], a JSON results [`report`], and (with the
//! `driver` feature) platform/device selection against a real ICD.
//!
//! The harness never retries a failed native call: a non-success status
//! from the driver is the finding, and it fails the enclosing test.

pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod status;

#[cfg(feature = "driver")]
pub mod device;

pub use config::{DeviceType, HarnessConfig};
pub use error::{HarnessError, Result};
pub use registry::{TestDefinition, TestEnv, TestFn, TestRegistry};
pub use report::ResultsReport;
pub use status::{RunSummary, TestOutcome, TestStatus};

#[cfg(feature = "driver")]
pub use device::DriverHandles;
