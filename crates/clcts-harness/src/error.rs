//! Error types shared by the conformance harness.

use thiserror::Error;

/// Errors raised while configuring or driving a conformance run.
///
/// Every variant is terminal for the enclosing test or run; the harness
/// never retries a failed native call (the vendor driver is the system
/// under test, and a retry would mask the defect being reported).
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A native API call returned a non-success status code.
    #[error("{call} returned non-success status {code}")]
    Api { call: &'static str, code: i32 },

    /// `CL_DEVICE_TYPE` (env or argv) named a type the harness does not know.
    #[error("unknown device type: {0:?} (expected cpu|gpu|accelerator|custom|default)")]
    UnknownDeviceType(String),

    /// An index-style setting (`CL_PLATFORM_INDEX`, `CL_DEVICE_INDEX`, ...) was not a number.
    #[error("invalid value for {name}: {value:?}")]
    InvalidIndex { name: &'static str, value: String },

    /// A test was registered twice under the same name.
    #[error("duplicate test registration: {0}")]
    DuplicateTest(String),

    /// A test name given on the command line is not registered.
    #[error("unknown test: {0}")]
    UnknownTest(String),

    /// No OpenCL platform is visible to the process.
    #[error("no OpenCL platforms found")]
    NoPlatforms,

    /// Platform/device selection came up empty.
    #[error("no suitable device: {reason}")]
    NoDevice { reason: String },

    /// Writing the results report failed.
    #[error("failed to write results report: {0}")]
    Report(#[from] std::io::Error),

    /// Serializing the results report failed.
    #[error("failed to serialize results report: {0}")]
    ReportJson(#[from] serde_json::Error),

    /// Fatal setup failure reported by a test (missing fixture, bad state).
    #[error("test setup failed: {0}")]
    Setup(String),
}

/// Convenience alias used throughout the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;

impl HarnessError {
    /// Wrap a native status code from the named entry point.
    pub fn api(call: &'static str, code: i32) -> Self {
        Self::Api { call, code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_names_the_call() {
        let e = HarnessError::api("clCreateBuffer", -61);
        assert_eq!(e.to_string(), "clCreateBuffer returned non-success status -61");
    }

    #[test]
    fn unknown_device_type_mentions_valid_spellings() {
        let e = HarnessError::UnknownDeviceType("fpga".into());
        assert!(e.to_string().contains("fpga"));
        assert!(e.to_string().contains("accelerator"));
    }
}
