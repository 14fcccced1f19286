//! Run configuration.
//!
//! Settings are layered, later layers winning: built-in defaults, then an optional JSON config file, then the
//! environment, then command-line flags.
//!
//! ```json
//! { "bundle": "build/test_bundle.json", "showColors": false, "failFast": true, "timeoutMs": 30000 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::TestError;
use crate::runner::RunOptions;

/// Bundle path used when nothing else names one.
pub const DEFAULT_BUNDLE_PATH: &str = "build/test_bundle.json";

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "testbundle.json";

/// Environment variable naming the bundle path.
pub const BUNDLE_PATH_ENV: &str = "TESTBUNDLE_PATH";

/// Any non-empty value disables colors (https://no-color.org).
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub bundle_path: PathBuf,
    pub show_colors: bool,
    pub verbose: bool,
    pub fail_fast: bool,
    pub filter: Option<String>,
    pub format: ReportFormat,
    pub default_timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bundle_path: PathBuf::from(DEFAULT_BUNDLE_PATH),
            show_colors: true,
            verbose: false,
            fail_fast: false,
            filter: None,
            format: ReportFormat::Console,
            default_timeout: None,
        }
    }
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundle_path = path.into();
        self
    }

    pub fn with_show_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Overlay every setting the config file specifies.
    pub fn apply_file(mut self, file: &ConfigFile) -> Self {
        if let Some(bundle) = &file.bundle {
            self.bundle_path = bundle.clone();
        }
        if let Some(show_colors) = file.show_colors {
            self.show_colors = show_colors;
        }
        if let Some(verbose) = file.verbose {
            self.verbose = verbose;
        }
        if let Some(fail_fast) = file.fail_fast {
            self.fail_fast = fail_fast;
        }
        if let Some(filter) = &file.filter {
            self.filter = Some(filter.clone());
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(ms) = file.timeout_ms {
            self.default_timeout = Some(Duration::from_millis(ms));
        }
        self
    }

    /// Overlay environment settings, reading variables through `lookup`.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(BUNDLE_PATH_ENV).filter(|p| !p.is_empty()) {
            self.bundle_path = PathBuf::from(path);
        }
        if lookup(NO_COLOR_ENV).is_some_and(|v| !v.is_empty()) {
            self.show_colors = false;
        }
        self
    }

    /// Project the settings the runner needs.
    pub fn options(&self) -> RunOptions {
        RunOptions {
            show_colors: self.show_colors,
            verbose: self.verbose,
            fail_fast: self.fail_fast,
            filter: self.filter.clone(),
            default_timeout: self.default_timeout,
        }
    }
}

/// On-disk config file. Every field is optional; absent fields keep the lower layer's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfigFile {
    pub bundle: Option<PathBuf>,
    pub show_colors: Option<bool>,
    pub verbose: Option<bool>,
    #[serde(alias = "stopOnSpecFailure")]
    pub fail_fast: Option<bool>,
    pub filter: Option<String>,
    pub format: Option<ReportFormat>,
    pub timeout_ms: Option<u64>,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, TestError> {
        let source = fs::read_to_string(path)
            .map_err(|e| TestError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::parse(&source).map_err(|e| TestError::Config(format!("'{}': {}", path.display(), e)))
    }

    pub fn parse(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Load `explicit` if given (it must exist), else the default file if present, else nothing.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>, TestError> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            tracing::debug!(path = DEFAULT_CONFIG_FILE, "using config file from working directory");
            return Self::load(default).map(Some);
        }
        Ok(None)
    }
}
