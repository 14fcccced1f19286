//! Default console reporter (Jasmine-style)
//!
//! ```text
//! Started
//! .F.
//!
//! Failures:
//! 1) B
//!   Message:
//!     expected 1 to equal 2
//!   Stack:
//!     at build/test_bundle.json#/specs/1/expect/0
//!
//! 3 run, 1 failed
//! Finished in 0.004 seconds
//! ```

use std::fmt;
use std::io::{self, Write};

use testbundle_core::{TestOutcome, TestRecord, TestRunResult};

use super::TestReporter;

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const BOLD: &str = "1";
const BOLD_GREEN: &str = "1;32";
const BOLD_RED: &str = "1;31";

/// ANSI styling that collapses to plain text when colors are off.
#[derive(Debug, Clone, Copy)]
struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }
}

pub struct ConsoleReporter<W: Write> {
    out: W,
    palette: Palette,
    verbose: bool,
    /// Progress glyphs were written on the current line.
    progress: bool,
    write_failed: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(show_colors: bool, verbose: bool) -> Self {
        Self::new(io::stdout(), show_colors, verbose)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, show_colors: bool, verbose: bool) -> Self {
        Self {
            out,
            palette: Palette { enabled: show_colors },
            verbose,
            progress: false,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args) {
            // Keep running the tests; one warning is enough.
            if !self.write_failed {
                tracing::warn!(error = %e, "failed to write test report");
                self.write_failed = true;
            }
        }
    }

    fn status(&self, outcome: &TestOutcome) -> String {
        let p = self.palette;
        match outcome {
            TestOutcome::Passed(d) if self.verbose => format!("{} ({}ms)", p.paint(GREEN, "PASSED"), d.as_millis()),
            TestOutcome::Passed(_) => p.paint(GREEN, "."),
            TestOutcome::Failed(d, _) if self.verbose => format!("{} ({}ms)", p.paint(RED, "FAILED"), d.as_millis()),
            TestOutcome::Failed(..) => p.paint(RED, "F"),
            TestOutcome::Skipped(reason) if self.verbose => {
                if reason.is_empty() {
                    p.paint(YELLOW, "SKIPPED")
                } else {
                    format!("{} ({})", p.paint(YELLOW, "SKIPPED"), reason)
                }
            }
            TestOutcome::Skipped(_) => p.paint(YELLOW, "*"),
        }
    }

    fn write_failures(&mut self, result: &TestRunResult) {
        if result.failed() == 0 {
            return;
        }
        let heading = self.palette.paint(BOLD_RED, "Failures:");
        self.emit(format_args!("\n{}\n", heading));

        for (i, record) in result.failures().enumerate() {
            let name = self.palette.paint(BOLD, &record.name);
            self.emit(format_args!("{}) {}\n", i + 1, name));
            for failure in record.outcome.failures() {
                self.emit(format_args!("  {}:\n", failure.kind.label()));
                for line in failure.message.lines() {
                    self.emit(format_args!("    {}\n", line));
                }
                if let Some(location) = &failure.location {
                    self.emit(format_args!("  Stack:\n    at {}\n", location));
                }
            }
        }
    }

    fn write_pending(&mut self, result: &TestRunResult) {
        if result.skipped() == 0 {
            return;
        }
        let heading = self.palette.paint(YELLOW, "Pending:");
        self.emit(format_args!("\n{}\n", heading));

        let pending = result.records.iter().filter(|r| r.outcome.is_skipped());
        for (i, record) in pending.enumerate() {
            let reason = match &record.outcome {
                TestOutcome::Skipped(reason) if !reason.is_empty() => reason.as_str(),
                _ => "No reason given",
            };
            self.emit(format_args!("{}) {}\n  {}\n", i + 1, record.name, reason));
        }
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_run_start(&mut self) {
        self.emit(format_args!("Started\n"));
    }

    fn on_collection_complete(&mut self, test_count: usize) {
        if test_count == 0 {
            self.emit(format_args!("No tests collected\n"));
        }
    }

    fn on_test_start(&mut self, name: &str) {
        if self.verbose {
            self.emit(format_args!("{} ... ", name));
        }
    }

    fn on_test_complete(&mut self, record: &TestRecord) {
        let status = self.status(&record.outcome);
        if self.verbose {
            self.emit(format_args!("{}\n", status));
        } else {
            self.emit(format_args!("{}", status));
            self.progress = true;
        }
    }

    fn on_run_complete(&mut self, result: &TestRunResult) {
        if self.progress {
            self.emit(format_args!("\n"));
            self.progress = false;
        }

        self.write_failures(result);
        self.write_pending(result);

        let color = if result.is_success() { BOLD_GREEN } else { BOLD_RED };
        let summary = self.palette.paint(color, &result.summary_line());
        self.emit(format_args!(
            "\n{}\nFinished in {:.3} seconds\n",
            summary,
            result.duration.as_secs_f64()
        ));

        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "failed to flush test report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use testbundle_core::Failure;

    fn record(name: &str, outcome: TestOutcome) -> TestRecord {
        TestRecord::new(name, outcome)
    }

    fn scenario() -> TestRunResult {
        let mut result = TestRunResult::new();
        result.push(record("A", TestOutcome::Passed(Duration::from_millis(1))));
        result.push(record(
            "B",
            TestOutcome::Failed(
                Duration::from_millis(2),
                vec![Failure::assertion("expected 1 to equal 2").at("b.json#/specs/1/expect/0")],
            ),
        ));
        result.push(record("C", TestOutcome::Passed(Duration::from_millis(1))));
        result.duration = Duration::from_millis(4);
        result
    }

    fn render(show_colors: bool, verbose: bool, result: &TestRunResult) -> String {
        let mut reporter = ConsoleReporter::new(Vec::new(), show_colors, verbose);
        reporter.on_run_start();
        reporter.on_collection_complete(result.records.len());
        for r in &result.records {
            reporter.on_test_start(&r.name);
            reporter.on_test_complete(r);
        }
        reporter.on_run_complete(result);
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_progress_output() {
        let out = render(false, false, &scenario());
        insta::assert_snapshot!(out, @r"
Started
.F.

Failures:
1) B
  Message:
    expected 1 to equal 2
  Stack:
    at b.json#/specs/1/expect/0

3 run, 1 failed
Finished in 0.004 seconds
");
    }

    #[test]
    fn test_verbose_output_lists_each_test() {
        let out = render(false, true, &scenario());
        assert!(out.contains("A ... PASSED (1ms)\n"), "{}", out);
        assert!(out.contains("B ... FAILED (2ms)\n"), "{}", out);
        assert!(out.contains("C ... PASSED (1ms)\n"), "{}", out);
    }

    #[test]
    fn test_colors_only_when_enabled() {
        let plain = render(false, false, &scenario());
        assert!(!plain.contains('\x1b'));

        let colored = render(true, false, &scenario());
        assert!(colored.contains("\x1b[32m.\x1b[0m"));
        assert!(colored.contains("\x1b[31mF\x1b[0m"));
        assert!(colored.contains("\x1b[1;31m3 run, 1 failed\x1b[0m"));
    }

    #[test]
    fn test_empty_run() {
        let out = render(false, false, &TestRunResult::new());
        assert_eq!(out, "Started\nNo tests collected\n\n0 run, 0 failed\nFinished in 0.000 seconds\n");
    }

    #[test]
    fn test_pending_and_fault_sections() {
        let mut result = TestRunResult::new();
        result.push(record("later", TestOutcome::Skipped(String::new())));
        result.push(record(
            "boom",
            TestOutcome::Failed(Duration::ZERO, vec![Failure::fault("panicked: bad\nsecond line")]),
        ));
        let out = render(false, false, &result);
        assert!(out.contains("*F\n"), "{}", out);
        assert!(out.contains("1) boom\n  Error:\n    panicked: bad\n    second line\n"), "{}", out);
        assert!(out.contains("Pending:\n1) later\n  No reason given\n"), "{}", out);
        assert!(out.contains("1 run, 1 failed, 1 skipped"), "{}", out);
    }
}
