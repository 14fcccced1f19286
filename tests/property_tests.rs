//! Property-based tests for the bootstrap
//!
//! These tests use proptest to check the run invariants across many randomly
//! generated bundles, catching edge cases that hand-written tests might miss.

use proptest::prelude::*;
use serde_json::json;
use testbundle::interfaces::DefaultCaseExecutor;
use testbundle::report::ConsoleReporter;
use testbundle::{RunOptions, Session, parse_bundle};

/// Build a bundle with one spec per flag: `true` passes, `false` fails.
fn bundle_source(outcomes: &[bool]) -> String {
    let specs: Vec<_> = outcomes
        .iter()
        .enumerate()
        .map(|(i, pass)| {
            let expected = if *pass { 1 } else { 2 };
            json!({
                "name": format!("spec {}", i),
                "expect": [{ "actual": 1, "matcher": "toEqual", "expected": expected }]
            })
        })
        .collect();
    json!({ "specs": specs }).to_string()
}

fn run(source: &str) -> testbundle::TestRunResult {
    let registry = parse_bundle(source, "prop.json").unwrap();
    let executor = DefaultCaseExecutor::new(None).unwrap();
    let mut reporter = ConsoleReporter::new(Vec::new(), false, false);
    Session::new(RunOptions::default(), &mut reporter).run_registry(registry, &executor)
}

proptest! {
    /// Property: exit code is 0 exactly when no test failed
    #[test]
    fn exit_code_reflects_failures(outcomes in prop::collection::vec(any::<bool>(), 0..24)) {
        let result = run(&bundle_source(&outcomes));
        let failures = outcomes.iter().filter(|p| !**p).count();

        prop_assert_eq!(result.total(), outcomes.len());
        prop_assert_eq!(result.failed(), failures);
        prop_assert_eq!(result.exit_code() == 0, failures == 0);
    }

    /// Property: the failed names are exactly the failing specs, in discovery order
    #[test]
    fn failed_names_match_failing_specs(outcomes in prop::collection::vec(any::<bool>(), 0..24)) {
        let result = run(&bundle_source(&outcomes));
        let expected: Vec<String> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, pass)| !**pass)
            .map(|(i, _)| format!("spec {}", i))
            .collect();

        prop_assert_eq!(result.failed_names(), expected);
    }

    /// Property: running the same bundle twice gives the same counts
    #[test]
    fn runs_are_repeatable(outcomes in prop::collection::vec(any::<bool>(), 0..16)) {
        let source = bundle_source(&outcomes);
        let first = run(&source);
        let second = run(&source);

        prop_assert_eq!(first.summary_line(), second.summary_line());
        prop_assert_eq!(first.failed_names(), second.failed_names());
    }
}
