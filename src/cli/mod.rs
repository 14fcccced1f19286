//! CLI module for the test bootstrap
//!
//! ## Commands
//!
//! - `[run] [BUNDLE]` - Run every test in the bundle (the default action)
//! - `list [BUNDLE]` - Print discovered test names without running them
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigFile, ReportFormat, RunConfig};
use crate::error::TestError;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<TestError> for CliError {
    fn from(e: TestError) -> Self {
        CliError::failure(format!("error: {}", e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run a precompiled test bundle and report the results
#[derive(Parser, Debug)]
#[command(name = "testbundle")]
#[command(version = VERSION)]
#[command(about = "Run a precompiled test bundle and report the results", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Run options (default action when no subcommand given)
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every test in the bundle
    Run(RunArgs),

    /// List discovered tests without running them
    List {
        /// Path to the compiled test bundle
        #[arg(value_name = "BUNDLE")]
        bundle: Option<PathBuf>,
        /// Only list tests whose name contains EXPR
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
        /// Config file (default: ./testbundle.json when present)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Path to the compiled test bundle (default: build/test_bundle.json)
    #[arg(value_name = "BUNDLE")]
    pub bundle: Option<PathBuf>,
    /// Disable ANSI colors in console output
    #[arg(long = "no-color")]
    pub no_color: bool,
    /// Print one line per test
    #[arg(short, long)]
    pub verbose: bool,
    /// Stop on first failure
    #[arg(short = 'x', long = "exitfirst")]
    pub fail_fast: bool,
    /// Only run tests whose name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,
    /// Report format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,
    /// Timeout for command tests that don't set their own
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,
    /// Config file (default: ./testbundle.json when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(bundle) = &self.bundle {
            config.bundle_path = bundle.clone();
        }
        if self.no_color {
            config.show_colors = false;
        }
        if self.verbose {
            config.verbose = true;
        }
        if self.fail_fast {
            config.fail_fast = true;
        }
        if let Some(filter) = &self.filter {
            config.filter = Some(filter.clone());
        }
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        if let Some(ms) = self.timeout_ms {
            config.default_timeout = Some(std::time::Duration::from_millis(ms));
        }
        config
    }
}

/// Build the effective configuration: defaults, config file, environment, then flags.
pub fn resolve_config(args: &RunArgs) -> CliResult<RunConfig> {
    let mut config = RunConfig::default();
    if let Some(file) = ConfigFile::discover(args.config.as_deref())? {
        config = config.apply_file(&file);
    }
    let config = config.apply_env(|key| env::var(key).ok());
    Ok(args.apply(config))
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Some(Command::Run(args)) => commands::run_bundle(&resolve_config(&args)?),
        Some(Command::List { bundle, filter, config }) => {
            let args = RunArgs {
                bundle,
                filter,
                config,
                ..RunArgs::default()
            };
            commands::list_bundle(&resolve_config(&args)?)
        }
        None => commands::run_bundle(&resolve_config(&cli.run)?),
    }
}

// ============================================================================
// Tests
// ============================================================================
