//! Test reporting.
//!
//! ## TestReporter Trait
//!
//! The runner uses a `TestReporter` trait to separate reporting from execution. The console reporter renders
//! Jasmine-style progress for humans; the JSON reporter emits one document for CI. Custom formats implement the trait.
//!
//! Reporters receive callbacks strictly in this order for a run that loads:
//! `on_discovery_start`, `on_run_start`, `on_collection_complete`, then `on_test_start`/`on_test_complete` per test,
//! then `on_run_complete`. A run whose bundle fails to load only ever sees `on_discovery_start`.

pub mod console;
pub mod json;

use std::path::Path;

use testbundle_core::{TestRecord, TestRunResult};

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called before the bundle is located and loaded
    fn on_discovery_start(&mut self, _path: &Path) {}

    /// Called once the bundle has loaded, before any test runs
    fn on_run_start(&mut self) {}

    /// Called when test collection (including filtering) is complete
    fn on_collection_complete(&mut self, test_count: usize);

    /// Called before each test, skipped ones included
    fn on_test_start(&mut self, _name: &str) {}

    /// Called when a test completes
    fn on_test_complete(&mut self, record: &TestRecord);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, result: &TestRunResult);
}
