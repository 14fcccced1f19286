//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations that touch the outside world:
//! - Bundle loading (filesystem read + parse + registration)
//! - Case execution (calling native closures, evaluating expectations, spawning processes)
//!
//! The runner only talks to these traits, so tests can substitute in-memory bundles or scripted executors.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Duration;

use testbundle_core::Failure;

use crate::bundle;
use crate::command::CommandRunner;
use crate::error::TestError;
use crate::registry::{TestBody, TestCase, TestRegistry};

// ============================================================================
// Bundle Source Interface
// ============================================================================

/// Locate a bundle and register its tests.
pub trait BundleSource {
    fn load(&self, path: &Path) -> Result<TestRegistry, TestError>;
}

/// Filesystem-based bundle loading.
pub struct FsBundleSource;

impl BundleSource for FsBundleSource {
    fn load(&self, path: &Path) -> Result<TestRegistry, TestError> {
        bundle::load_bundle(path)
    }
}

// ============================================================================
// Case Executor Interface
// ============================================================================

/// Execute one registered test and collect its failures.
///
/// An empty vector means the test passed. Implementations must not panic: a fault inside the test is a
/// [`Failure`], never an unwinding runner.
pub trait CaseExecutor {
    fn execute(&self, case: &TestCase) -> Vec<Failure>;
}

/// Executes every [`TestBody`] kind in-process; command bodies go through a [`CommandRunner`].
pub struct DefaultCaseExecutor {
    commands: CommandRunner,
}

impl DefaultCaseExecutor {
    pub fn new(default_timeout: Option<Duration>) -> Result<Self, TestError> {
        Ok(Self {
            commands: CommandRunner::new(default_timeout)?,
        })
    }
}

impl DefaultCaseExecutor {
    fn run_body(&self, body: &TestBody) -> Vec<Failure> {
        match body {
            TestBody::Native(f) => f().err().into_iter().collect(),
            TestBody::Expect(list) => list.iter().filter_map(|e| e.evaluate().err()).collect(),
            TestBody::Command(spec) => self.commands.run(spec),
            TestBody::Fault(failure) => vec![failure.clone()],
        }
    }
}

impl CaseExecutor for DefaultCaseExecutor {
    fn execute(&self, case: &TestCase) -> Vec<Failure> {
        // A panic in any body, evaluator included, fails this case only.
        let failures = match panic::catch_unwind(AssertUnwindSafe(|| self.run_body(&case.body))) {
            Ok(failures) => failures,
            Err(payload) => vec![Failure::fault(panic_message(&*payload))],
        };

        failures
            .into_iter()
            .map(|f| match (&f.location, &case.location) {
                (None, Some(loc)) => f.at(loc.clone()),
                _ => f,
            })
            .collect()
    }
}

/// Extract the message carried by a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked with a non-string payload".to_string()
    }
}
