//! Errors that stop a run before any test executes.
//!
//! Per-test failures are not errors: they are recorded as [`testbundle_core::Failure`] values and never abort the
//! run. Everything in [`TestError`] is fatal for the invocation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while configuring, loading, or preparing a run.
#[derive(Debug, Error)]
pub enum TestError {
    /// The bundle path does not resolve to a readable file.
    #[error("test bundle not found: '{}': {source}", path.display())]
    BundleNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bundle exists but does not parse or validate.
    #[error("invalid test bundle '{}': {message}", path.display())]
    BundleFormat { path: PathBuf, message: String },

    /// The config file is unreadable or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The execution environment (async runtime) could not be set up.
    #[error("failed to prepare test execution: {0}")]
    Runtime(#[from] io::Error),
}

impl TestError {
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TestError::BundleFormat {
            path: path.into(),
            message: message.into(),
        }
    }
}
