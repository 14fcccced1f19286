//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use crate::bundle::load_bundle;
use crate::config::{ReportFormat, RunConfig};
use crate::report::{ConsoleReporter, JsonReporter, TestReporter};
use crate::runner;

use super::{CliError, CliResult, ExitCode};

/// Run every test in the configured bundle.
///
/// A bundle that cannot be loaded is an error; a run with failed tests is a
/// normal `ExitCode::FAILURE` since the report already explains it.
pub fn run_bundle(config: &RunConfig) -> CliResult<ExitCode> {
    let options = config.options();
    let mut reporter: Box<dyn TestReporter> = match config.format {
        ReportFormat::Console => Box::new(ConsoleReporter::stdout(options.show_colors, options.verbose)),
        ReportFormat::Json => Box::new(JsonReporter::stdout()),
    };

    let result = runner::run_with(&config.bundle_path, &options, reporter.as_mut())?;
    tracing::info!(
        total = result.total(),
        failed = result.failed(),
        "test run finished"
    );
    Ok(ExitCode(result.exit_code()))
}

/// Print the full name of every test that `run` would execute, in order.
pub fn list_bundle(config: &RunConfig) -> CliResult<ExitCode> {
    let mut registry = load_bundle(&config.bundle_path).map_err(CliError::from)?;
    if let Some(keyword) = &config.filter {
        registry.retain_matching(keyword);
    }
    for name in registry.names() {
        println!("{}", name);
    }
    println!("{} test(s)", registry.len());
    Ok(ExitCode::SUCCESS)
}
