//! Per-feature conformance test suites.
//!
//! Each suite module holds a handful of representative tests following the
//! same shape: check the device capability the feature needs (returning
//! [`TestStatus::Skip`] when absent), set up buffers/programs on the shared
//! context and queue, enqueue, read results back, compare, and report
//! tri-state. All suites talk to the vendor runtime and therefore compile
//! only with the `driver` feature; without it [`register_all`] registers
//! nothing and the runner binary refuses to run.
//!
//! [`TestStatus::Skip`]: clcts_harness::TestStatus

use clcts_harness::{Result, TestRegistry};

#[cfg(feature = "driver")]
pub mod api;
#[cfg(feature = "driver")]
pub mod buffers;
#[cfg(feature = "driver")]
mod common;
#[cfg(feature = "driver")]
pub mod compiler;
#[cfg(feature = "driver")]
pub mod images;
#[cfg(feature = "driver")]
pub mod svm;

/// Register every suite's tests, in suite order.
#[cfg(feature = "driver")]
pub fn register_all(registry: &mut TestRegistry) -> Result<()> {
    registry.register("buffers.read_write", buffers::buffer_read_write)?;
    registry.register("buffers.copy", buffers::buffer_copy)?;
    registry.register("buffers.fill", buffers::buffer_fill)?;
    registry.register("compiler.build_options", compiler::build_options_accepted)?;
    registry.register("compiler.build_log_capture", compiler::build_log_captured)?;
    registry.register("compiler.compile_with_header", compiler::compile_with_embedded_header)?;
    registry.register("images.read_write_2d", images::image_read_write_2d)?;
    registry.register("images.supported_format_query", images::supported_format_query)?;
    registry.register("svm.coarse_grain_round_trip", svm::coarse_grain_round_trip)?;
    registry.register("svm.unified_free", svm::unified_free)?;
    registry.register("api.kernel_arg_reflection", api::kernel_arg_reflection)?;
    registry.register("api.generated_arguments_execute", api::generated_arguments_execute)?;
    Ok(())
}

/// Without the `driver` feature there is nothing to register.
#[cfg(not(feature = "driver"))]
pub fn register_all(_registry: &mut TestRegistry) -> Result<()> {
    Ok(())
}

#[cfg(all(test, feature = "driver"))]
mod tests {
    use super::*;

    #[test]
    fn all_suites_register_cleanly() {
        let mut registry = TestRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 12);
        assert!(registry.contains("buffers.fill"));
        assert!(registry.contains("svm.unified_free"));
    }

    #[test]
    fn registration_groups_by_suite_prefix() {
        let mut registry = TestRegistry::new();
        register_all(&mut registry).unwrap();
        for name in registry.names() {
            assert!(name.contains('.'), "{name} has no suite prefix");
        }
    }
}

#[cfg(all(test, not(feature = "driver")))]
mod tests {
    use super::*;

    #[test]
    fn without_a_driver_nothing_registers() {
        let mut registry = TestRegistry::new();
        register_all(&mut registry).unwrap();
        assert!(registry.is_empty());
    }
}
