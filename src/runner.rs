//! Test bootstrap: load one bundle, run every test in it, report, and produce a [`TestRunResult`].
//!
//! A [`Session`] is built fresh for each invocation and moves through
//! `NotStarted → Loading → Running → Completed(success | failure)`, or `Loading → LoadFailed` when the bundle cannot
//! be read. Terminal phases are never left; nothing is retried.
//!
//! Tests run sequentially in discovery order on the calling thread. Each test is isolated: a failure or fault in one
//! never prevents the next from running (unless `fail_fast` was requested).

use std::path::Path;
use std::time::{Duration, Instant};

use testbundle_core::{TestOutcome, TestRecord, TestRunResult};

use crate::error::TestError;
use crate::interfaces::{BundleSource, CaseExecutor, DefaultCaseExecutor, FsBundleSource};
use crate::registry::TestRegistry;
use crate::report::{ConsoleReporter, TestReporter};

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Emit ANSI color codes in console output.
    pub show_colors: bool,
    /// One line per test instead of progress glyphs.
    pub verbose: bool,
    /// Stop after the first failed test.
    pub fail_fast: bool,
    /// Only run tests whose full name contains this substring.
    pub filter: Option<String>,
    /// Timeout applied to command cases that don't set their own.
    pub default_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            show_colors: true,
            verbose: false,
            fail_fast: false,
            filter: None,
            default_timeout: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_show_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Loading,
    Running,
    /// Finished; `true` when every attempted test passed.
    Completed(bool),
    LoadFailed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed(_) | Phase::LoadFailed)
    }
}

/// One test run against one bundle.
pub struct Session<'r> {
    options: RunOptions,
    reporter: &'r mut dyn TestReporter,
    phase: Phase,
}

impl<'r> Session<'r> {
    pub fn new(options: RunOptions, reporter: &'r mut dyn TestReporter) -> Self {
        Self {
            options,
            reporter,
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    fn enter(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase, to = ?next, "session phase");
        self.phase = next;
    }

    /// Load the bundle at `path` through `source` and run it.
    ///
    /// ## Errors
    ///
    /// Load errors leave the session in [`Phase::LoadFailed`]; the reporter has seen only `on_discovery_start` and no
    /// test has run.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn run_bundle(
        &mut self,
        source: &dyn BundleSource,
        path: &Path,
        executor: &dyn CaseExecutor,
    ) -> Result<TestRunResult, TestError> {
        self.enter(Phase::Loading);
        self.reporter.on_discovery_start(path);

        let registry = match source.load(path) {
            Ok(registry) => registry,
            Err(e) => {
                self.enter(Phase::LoadFailed);
                return Err(e);
            }
        };
        Ok(self.run_registry(registry, executor))
    }

    /// Run already-registered tests.
    pub fn run_registry(&mut self, mut registry: TestRegistry, executor: &dyn CaseExecutor) -> TestRunResult {
        let start_time = Instant::now();
        self.enter(Phase::Running);
        self.reporter.on_run_start();

        if let Some(keyword) = &self.options.filter {
            registry.retain_matching(keyword);
        }
        self.reporter.on_collection_complete(registry.len());

        let cases = registry.into_cases();
        let count = cases.len();
        let mut result = TestRunResult::new();

        for (index, case) in cases.into_iter().enumerate() {
            self.reporter.on_test_start(&case.name);

            let outcome = match &case.skip {
                Some(reason) => TestOutcome::Skipped(reason.clone()),
                None => {
                    let started = Instant::now();
                    let failures = executor.execute(&case);
                    let elapsed = started.elapsed();
                    if failures.is_empty() {
                        TestOutcome::Passed(elapsed)
                    } else {
                        TestOutcome::Failed(elapsed, failures)
                    }
                }
            };
            tracing::debug!(test = %case.name, passed = outcome.is_passed(), skipped = outcome.is_skipped(), "test finished");

            let stop = self.options.fail_fast && outcome.is_failed();
            let record = TestRecord::new(case.name, outcome);
            self.reporter.on_test_complete(&record);
            result.push(record);

            if stop {
                result.not_attempted = count - index - 1;
                tracing::debug!(not_attempted = result.not_attempted, "stopping after first failure");
                break;
            }
        }

        result.duration = start_time.elapsed();
        self.enter(Phase::Completed(result.is_success()));
        self.reporter.on_run_complete(&result);
        result
    }
}

/// Run every test in the bundle at `bundle_path`, reporting to stdout.
///
/// This is the whole bootstrap: filesystem bundle loading, the default executor, and the console reporter configured
/// from `options`. The caller turns the result into an exit code with [`TestRunResult::exit_code`].
pub fn run(bundle_path: &Path, options: &RunOptions) -> Result<TestRunResult, TestError> {
    let mut reporter = ConsoleReporter::stdout(options.show_colors, options.verbose);
    run_with(bundle_path, options, &mut reporter)
}

/// [`run`] with a caller-provided reporter.
pub fn run_with(
    bundle_path: &Path,
    options: &RunOptions,
    reporter: &mut dyn TestReporter,
) -> Result<TestRunResult, TestError> {
    let executor = DefaultCaseExecutor::new(options.default_timeout)?;
    let mut session = Session::new(options.clone(), reporter);
    session.run_bundle(&FsBundleSource, bundle_path, &executor)
}
