//! Per-test outcomes and the aggregated result of one test run.
//!
//! A run produces exactly one [`TestRunResult`]. It is owned by the runner, projected into reporter output and an
//! exit code, and then dropped.
//!
//! ## Invariant
//!
//! [`TestRunResult::exit_code`] is `0` if and only if [`TestRunResult::failed`] is `0`. Skipped tests never count as
//! run or failed.

use std::time::Duration;

/// Exit code for a run where every attempted test passed.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for a run with at least one failed test (also used for load failures).
pub const EXIT_FAILURE: i32 = 1;

/// Distinguish an unmet expectation from an error raised outside the assertion mechanism.
///
/// Both kinds fail the test they occur in and count the same way toward the exit code. They differ only in how the
/// detail is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureKind {
    /// An expectation was not met.
    Assertion,
    /// The test raised an error outside the assertion mechanism (panic, spawn error, timeout, type mismatch).
    Fault,
}

impl FailureKind {
    /// Return the heading reporters print for this kind.
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Assertion => "Message",
            FailureKind::Fault => "Error",
        }
    }
}

/// A single failure detail within a failed test.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// Where the failure originated: a source location for native tests, a bundle pointer for bundle specs.
    pub location: Option<String>,
}

impl Failure {
    /// Create an assertion failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Assertion,
            message: message.into(),
            location: None,
        }
    }

    /// Create an unexpected fault.
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Fault,
            message: message.into(),
            location: None,
        }
    }

    /// Attach the originating location.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_fault(&self) -> bool {
        self.kind == FailureKind::Fault
    }
}

/// Outcome of attempting a single test.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    Passed(Duration),
    /// Failed with one or more details, in the order they were raised.
    Failed(Duration, Vec<Failure>),
    /// Not attempted; carries the skip reason (possibly empty).
    Skipped(String),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed(..))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestOutcome::Skipped(_))
    }

    /// Wall-clock time spent in the test. Skipped tests report zero.
    pub fn duration(&self) -> Duration {
        match self {
            TestOutcome::Passed(d) | TestOutcome::Failed(d, _) => *d,
            TestOutcome::Skipped(_) => Duration::ZERO,
        }
    }

    /// Failure details, empty unless the test failed.
    pub fn failures(&self) -> &[Failure] {
        match self {
            TestOutcome::Failed(_, failures) => failures,
            _ => &[],
        }
    }
}

/// A test's full name paired with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub name: String,
    pub outcome: TestOutcome,
}

impl TestRecord {
    pub fn new(name: impl Into<String>, outcome: TestOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// Aggregated result of one test run, records kept in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestRunResult {
    pub records: Vec<TestRecord>,
    pub duration: Duration,
    /// Set when the run stopped early (fail-fast) and some discovered tests were never attempted.
    pub not_attempted: usize,
}

impl TestRunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TestRecord) {
        self.records.push(record);
    }

    /// Number of tests that were run (passed + failed). Skipped tests are not counted.
    pub fn total(&self) -> usize {
        self.passed() + self.failed()
    }

    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    /// Failed records in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.iter().filter(|r| r.outcome.is_failed())
    }

    /// Names of failed tests in execution order.
    pub fn failed_names(&self) -> Vec<&str> {
        self.failures().map(|r| r.name.as_str()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { EXIT_SUCCESS } else { EXIT_FAILURE }
    }

    /// Render the one-line count summary, e.g. `3 run, 1 failed` or `2 run, 0 failed, 1 skipped`.
    pub fn summary_line(&self) -> String {
        let mut line = format!("{} run, {} failed", self.total(), self.failed());
        let skipped = self.skipped();
        if skipped > 0 {
            line.push_str(&format!(", {} skipped", skipped));
        }
        if self.not_attempted > 0 {
            line.push_str(&format!(", {} not attempted", self.not_attempted));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn passed(name: &str) -> TestRecord {
        TestRecord::new(name, TestOutcome::Passed(Duration::from_millis(1)))
    }

    fn failed(name: &str, msg: &str) -> TestRecord {
        TestRecord::new(
            name,
            TestOutcome::Failed(Duration::from_millis(1), vec![Failure::assertion(msg)]),
        )
    }

    #[test]
    fn test_empty_run_is_success() {
        let result = TestRunResult::new();
        assert_eq!(result.total(), 0);
        assert_eq!(result.failed(), 0);
        assert_eq!(result.exit_code(), EXIT_SUCCESS);
        assert_eq!(result.summary_line(), "0 run, 0 failed");
    }

    #[test]
    fn test_one_failure_among_three() {
        let mut result = TestRunResult::new();
        result.push(passed("A"));
        result.push(failed("B", "expected 1 to equal 2"));
        result.push(passed("C"));

        assert_eq!(result.summary_line(), "3 run, 1 failed");
        assert_eq!(result.failed_names(), vec!["B"]);
        assert_eq!(result.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_skipped_not_counted_as_run() {
        let mut result = TestRunResult::new();
        result.push(passed("A"));
        result.push(TestRecord::new("B", TestOutcome::Skipped("later".into())));

        assert_eq!(result.total(), 1);
        assert_eq!(result.skipped(), 1);
        assert_eq!(result.summary_line(), "1 run, 0 failed, 1 skipped");
        assert!(result.is_success());
    }

    #[test]
    fn test_fault_counts_as_failure() {
        let mut result = TestRunResult::new();
        result.push(TestRecord::new(
            "boom",
            TestOutcome::Failed(Duration::ZERO, vec![Failure::fault("panicked")]),
        ));
        assert_eq!(result.failed(), 1);
        assert!(result.records[0].outcome.failures()[0].is_fault());
        assert_eq!(result.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_failure_location() {
        let f = Failure::assertion("nope").at("bundle.json#/specs/0");
        assert_eq!(f.location.as_deref(), Some("bundle.json#/specs/0"));
        assert_eq!(f.kind.label(), "Message");
        assert_eq!(Failure::fault("x").kind.label(), "Error");
    }

    proptest! {
        /// Property: exit code is zero iff no test failed, whatever mix of outcomes the run holds.
        #[test]
        fn exit_code_zero_iff_no_failures(outcomes in proptest::collection::vec(0u8..3, 0..40)) {
            let mut result = TestRunResult::new();
            for (i, o) in outcomes.iter().enumerate() {
                let name = format!("t{}", i);
                let record = match o {
                    0 => passed(&name),
                    1 => failed(&name, "x"),
                    _ => TestRecord::new(name, TestOutcome::Skipped(String::new())),
                };
                result.push(record);
            }
            let any_failed = outcomes.contains(&1);
            prop_assert_eq!(result.exit_code() == EXIT_SUCCESS, !any_failed);
            prop_assert_eq!(result.total() + result.skipped(), outcomes.len());
        }
    }
}
