//! Provide the pure outcome model and matcher vocabulary shared by the testbundle runner and its reporters.
//!
//! This crate is intentionally small and dependency-light. It contains:
//! - the per-test outcome types and the aggregated [`TestRunResult`] with its exit-code rule, and
//! - the registry of expectation matchers with their canonical spellings and failure-message phrasing.
//!
//! ## Notes
//!
//! - **No IO**, no global state, no runner-specific types. Loading bundles, spawning processes, and writing reports
//!   all live in the `testbundle` crate.
//! - The optional `serde` feature derives `Serialize` for the outcome types so reporters can emit them as JSON.

pub mod matchers;
pub mod outcome;

pub use outcome::{Failure, FailureKind, TestOutcome, TestRecord, TestRunResult};
