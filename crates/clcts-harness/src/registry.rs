//! Test registration and dispatch.
//!
//! Suites register named test functions into a [`TestRegistry`]; the
//! runner dispatches all of them, or a single test selected by name, and
//! collects a [`RunSummary`]. Registration order is preserved so runs are
//! reproducible.

use tracing::{error, info};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::status::{RunSummary, TestOutcome, TestStatus};

/// Per-run context handed to every test function.
///
/// Without the `driver` feature this is just the resolved configuration;
/// with it, `cl` carries the opened device, context, and queue the suites
/// share (the fixture-reuse pattern of the original suites).
#[derive(Debug)]
pub struct TestEnv {
    pub config: HarnessConfig,
    #[cfg(feature = "driver")]
    pub cl: Option<crate::device::DriverHandles>,
}

impl TestEnv {
    /// An environment with no opened device. Tests that need the driver
    /// report a setup failure when handed one of these.
    pub fn offline(config: HarnessConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "driver")]
            cl: None,
        }
    }

    /// The opened driver handles, or a setup error when running offline.
    #[cfg(feature = "driver")]
    pub fn cl(&self) -> Result<&crate::device::DriverHandles> {
        self.cl
            .as_ref()
            .ok_or_else(|| HarnessError::Setup("no device opened for this run".into()))
    }
}

/// A conformance test: sets up, enqueues, compares, and reports tri-state.
pub type TestFn = fn(&TestEnv) -> Result<TestStatus>;

/// A registered test.
#[derive(Clone, Copy)]
pub struct TestDefinition {
    pub name: &'static str,
    pub func: TestFn,
}

impl std::fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestDefinition").field("name", &self.name).finish()
    }
}

/// Ordered, duplicate-free collection of test definitions.
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Vec<TestDefinition>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test under a unique name.
    pub fn register(&mut self, name: &'static str, func: TestFn) -> Result<()> {
        if self.tests.iter().any(|t| t.name == name) {
            return Err(HarnessError::DuplicateTest(name.to_string()));
        }
        self.tests.push(TestDefinition { name, func });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tests.iter().map(|t| t.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t.name == name)
    }

    /// Dispatch every registered test, or only `filter` when given.
    ///
    /// A test returning `Err` is recorded as a failure with the error text;
    /// the run continues. An unknown filter name is a hard error.
    pub fn run(&self, env: &TestEnv, filter: Option<&str>) -> Result<RunSummary> {
        if let Some(name) = filter {
            if !self.contains(name) {
                return Err(HarnessError::UnknownTest(name.to_string()));
            }
        }

        let mut summary = RunSummary::new();
        for test in &self.tests {
            if let Some(name) = filter {
                if test.name != name {
                    continue;
                }
            }

            info!(test = test.name, "running");
            let outcome = match (test.func)(env) {
                Ok(status) => {
                    info!(test = test.name, status = %status, "finished");
                    TestOutcome { name: test.name.to_string(), status, message: None }
                }
                Err(e) => {
                    error!(test = test.name, error = %e, "failed");
                    TestOutcome {
                        name: test.name.to_string(),
                        status: TestStatus::Fail,
                        message: Some(e.to_string()),
                    }
                }
            };
            summary.record(outcome);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(_: &TestEnv) -> Result<TestStatus> {
        Ok(TestStatus::Pass)
    }

    fn skip(_: &TestEnv) -> Result<TestStatus> {
        Ok(TestStatus::Skip)
    }

    fn blows_up(_: &TestEnv) -> Result<TestStatus> {
        Err(HarnessError::Setup("missing fixture".into()))
    }

    fn env() -> TestEnv {
        TestEnv::offline(HarnessConfig::default())
    }

    #[test]
    fn registration_preserves_order() {
        let mut reg = TestRegistry::new();
        reg.register("b", pass).unwrap();
        reg.register("a", pass).unwrap();
        let names: Vec<_> = reg.names().collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut reg = TestRegistry::new();
        reg.register("x", pass).unwrap();
        let err = reg.register("x", skip).unwrap_err();
        assert!(matches!(err, HarnessError::DuplicateTest(_)));
    }

    #[test]
    fn run_all_counts_statuses() {
        let mut reg = TestRegistry::new();
        reg.register("ok", pass).unwrap();
        reg.register("skipped", skip).unwrap();
        reg.register("broken", blows_up).unwrap();
        let summary = reg.run(&env(), None).unwrap();
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn erroring_test_records_message() {
        let mut reg = TestRegistry::new();
        reg.register("broken", blows_up).unwrap();
        let summary = reg.run(&env(), None).unwrap();
        let outcome = &summary.outcomes()[0];
        assert_eq!(outcome.status, TestStatus::Fail);
        assert!(outcome.message.as_deref().unwrap().contains("missing fixture"));
    }

    #[test]
    fn filter_runs_single_test() {
        let mut reg = TestRegistry::new();
        reg.register("a", pass).unwrap();
        reg.register("b", skip).unwrap();
        let summary = reg.run(&env(), Some("b")).unwrap();
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn unknown_filter_is_an_error() {
        let reg = TestRegistry::new();
        let err = reg.run(&env(), Some("nope")).unwrap_err();
        assert!(matches!(err, HarnessError::UnknownTest(_)));
    }
}
