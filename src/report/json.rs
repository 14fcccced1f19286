//! Machine-readable reporter: one JSON document per run, written when the run completes.

use std::io::{self, Write};

use serde::Serialize;
use testbundle_core::{Failure, TestOutcome, TestRecord, TestRunResult};

use super::TestReporter;

#[derive(Debug, Serialize)]
struct RunDocument<'a> {
    success: bool,
    exit_code: i32,
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    not_attempted: usize,
    duration_ms: u64,
    tests: Vec<TestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct TestEntry<'a> {
    name: &'a str,
    status: &'static str,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "no_failures")]
    failures: &'a [Failure],
}

fn no_failures(failures: &&[Failure]) -> bool {
    failures.is_empty()
}

impl<'a> TestEntry<'a> {
    fn from_record(record: &'a TestRecord) -> Self {
        let (status, reason) = match &record.outcome {
            TestOutcome::Passed(_) => ("passed", None),
            TestOutcome::Failed(..) => ("failed", None),
            TestOutcome::Skipped(reason) => ("skipped", Some(reason.as_str())),
        };
        Self {
            name: &record.name,
            status,
            duration_ms: record.outcome.duration().as_millis() as u64,
            reason,
            failures: record.outcome.failures(),
        }
    }
}

pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_collection_complete(&mut self, test_count: usize) {
        tracing::debug!(test_count, "collected tests");
    }

    fn on_test_complete(&mut self, _record: &TestRecord) {}

    fn on_run_complete(&mut self, result: &TestRunResult) {
        let doc = RunDocument {
            success: result.is_success(),
            exit_code: result.exit_code(),
            total: result.total(),
            passed: result.passed(),
            failed: result.failed(),
            skipped: result.skipped(),
            not_attempted: result.not_attempted,
            duration_ms: result.duration.as_millis() as u64,
            tests: result.records.iter().map(TestEntry::from_record).collect(),
        };
        let written = serde_json::to_writer_pretty(&mut self.out, &doc)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write JSON report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::time::Duration;

    #[test]
    fn test_document_shape() {
        let mut result = TestRunResult::new();
        result.push(TestRecord::new("A", TestOutcome::Passed(Duration::from_millis(3))));
        result.push(TestRecord::new(
            "B",
            TestOutcome::Failed(
                Duration::ZERO,
                vec![Failure::assertion("expected 1 to equal 2").at("b.json#/specs/1")],
            ),
        ));
        result.push(TestRecord::new("C", TestOutcome::Skipped("later".into())));

        let mut reporter = JsonReporter::new(Vec::new());
        reporter.on_run_complete(&result);
        let doc: Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

        assert_eq!(doc["success"], json!(false));
        assert_eq!(doc["exit_code"], json!(1));
        assert_eq!(doc["total"], json!(2));
        assert_eq!(doc["skipped"], json!(1));
        assert_eq!(doc["tests"][0], json!({"name": "A", "status": "passed", "duration_ms": 3}));
        assert_eq!(
            doc["tests"][1]["failures"],
            json!([{"kind": "assertion", "message": "expected 1 to equal 2", "location": "b.json#/specs/1"}])
        );
        assert_eq!(doc["tests"][2]["reason"], json!("later"));
    }
}
