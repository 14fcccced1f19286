#![forbid(unsafe_code)]
//! Test bootstrap for precompiled test bundles.
//!
//! Loads a bundle of registered tests, runs all of them in discovery order with per-test isolation, reports the
//! results, and turns the outcome into a process exit code: `0` if and only if no test failed.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test bodies**: A panic inside a native test body is caught and recorded as a fault for that test only.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod bundle;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod expect;
pub mod interfaces;
pub mod registry;
pub mod report;
pub mod runner;

pub use bundle::{load_bundle, parse_bundle};
pub use config::{ReportFormat, RunConfig};
pub use error::TestError;
pub use registry::{TestBody, TestCase, TestRegistry};
pub use runner::{Phase, RunOptions, Session, run, run_with};

pub use testbundle_core::{Failure, FailureKind, TestOutcome, TestRecord, TestRunResult};
