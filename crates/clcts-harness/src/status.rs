//! Test statuses and run summaries.

use std::fmt;

use serde::Serialize;

/// Result of a single conformance test.
///
/// `Skip` is reserved for tests whose required capability (an extension,
/// image support, an SVM capability level) is absent on the device; it
/// never counts against the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// The recorded outcome of one dispatched test.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub name: String,
    pub status: TestStatus,
    /// Failure detail, present only when `status` is `Fail`.
    pub message: Option<String>,
}

/// Aggregated counters for a run, in the console style of the original
/// harness (`PASSED n of m tests.`).
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    outcomes: Vec<TestOutcome>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.count(TestStatus::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(TestStatus::Fail)
    }

    pub fn skipped(&self) -> usize {
        self.count(TestStatus::Skip)
    }

    /// Names of the tests that failed, in dispatch order.
    pub fn failed_names(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == TestStatus::Fail)
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// True when no dispatched test failed (skips do not count).
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: TestStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Render the closing console summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.failed() == 0 {
            out.push_str(&format!("PASSED {} of {} tests.\n", self.passed(), self.total()));
        } else {
            out.push_str(&format!("FAILED {} of {} tests.\n", self.failed(), self.total()));
            for name in self.failed_names() {
                out.push_str(&format!("\t{name}\n"));
            }
        }
        if self.skipped() > 0 {
            out.push_str(&format!("SKIPPED {} of {} tests.\n", self.skipped(), self.total()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: TestStatus) -> TestOutcome {
        TestOutcome { name: name.into(), status, message: None }
    }

    #[test]
    fn empty_summary_passes() {
        let s = RunSummary::new();
        assert!(s.all_passed());
        assert_eq!(s.total(), 0);
    }

    #[test]
    fn counters_track_each_status() {
        let mut s = RunSummary::new();
        s.record(outcome("a", TestStatus::Pass));
        s.record(outcome("b", TestStatus::Fail));
        s.record(outcome("c", TestStatus::Skip));
        assert_eq!((s.passed(), s.failed(), s.skipped()), (1, 1, 1));
        assert_eq!(s.total(), 3);
    }

    #[test]
    fn skips_do_not_fail_the_run() {
        let mut s = RunSummary::new();
        s.record(outcome("a", TestStatus::Skip));
        assert!(s.all_passed());
    }

    #[test]
    fn render_lists_failed_names() {
        let mut s = RunSummary::new();
        s.record(outcome("buffers.fill", TestStatus::Pass));
        s.record(outcome("images.read_2d", TestStatus::Fail));
        let text = s.render();
        assert!(text.starts_with("FAILED 1 of 2 tests."));
        assert!(text.contains("images.read_2d"));
    }

    #[test]
    fn render_counts_skips_separately() {
        let mut s = RunSummary::new();
        s.record(outcome("a", TestStatus::Pass));
        s.record(outcome("b", TestStatus::Skip));
        let text = s.render();
        assert!(text.contains("PASSED 1 of 2 tests."));
        assert!(text.contains("SKIPPED 1 of 2 tests."));
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(TestStatus::Pass.to_string(), "pass");
        assert_eq!(TestStatus::Fail.to_string(), "fail");
        assert_eq!(TestStatus::Skip.to_string(), "skip");
    }
}
