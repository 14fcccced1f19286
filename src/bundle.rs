//! Bundle loading.
//!
//! A bundle is a JSON document produced by an upstream build step. It holds top-level specs and nested suites:
//!
//! ```json
//! {
//!   "name": "perspective",
//!   "specs": [
//!     { "name": "A", "expect": [{ "actual": 1, "matcher": "toEqual", "expected": 1 }] }
//!   ],
//!   "suites": [
//!     { "description": "view", "specs": [{ "name": "builds", "command": { "program": "true" } }] }
//!   ]
//! }
//! ```
//!
//! Loading validates the whole document before anything runs, then registers every spec against a
//! [`TestRegistry`] in discovery order: a suite's own specs first, then its child suites. Each registered case
//! carries its JSON pointer inside the bundle so failures can point back at the definition.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use testbundle_core::Failure;
use testbundle_core::matchers::{self, CLOSE_TO_PRECISION_LIMIT};

use crate::command::CommandSpec;
use crate::error::TestError;
use crate::expect::Expectation;
use crate::registry::{TestBody, TestCase, TestRegistry};

/// Maximum bundle size (256 MB)
///
/// Larger files are rejected instead of being read into memory.
const MAX_BUNDLE_SIZE: u64 = 256 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    specs: Vec<SpecDef>,
    #[serde(default)]
    suites: Vec<SuiteDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteDef {
    description: String,
    /// Skips every spec in the suite (Jasmine `xdescribe`).
    #[serde(default)]
    skip: Option<String>,
    #[serde(default)]
    specs: Vec<SpecDef>,
    #[serde(default)]
    suites: Vec<SuiteDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecDef {
    name: String,
    #[serde(default)]
    skip: Option<String>,
    #[serde(default)]
    expect: Option<Vec<ExpectDef>>,
    #[serde(default)]
    command: Option<CommandSpec>,
    #[serde(default)]
    fault: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpectDef {
    #[serde(default, deserialize_with = "present")]
    actual: Option<Value>,
    matcher: String,
    #[serde(default, deserialize_with = "present")]
    expected: Option<Value>,
    #[serde(default)]
    not: bool,
    #[serde(default)]
    precision: Option<i32>,
}

/// Keep an explicit `null` as `Some(Value::Null)`; only an absent field is undefined.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Read, validate, and register the bundle at `path`.
///
/// ## Errors
///
/// - [`TestError::BundleNotFound`] if the path does not resolve to a readable file.
/// - [`TestError::BundleFormat`] if the file is too large, is not valid JSON, or fails validation.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_bundle(path: &Path) -> Result<TestRegistry, TestError> {
    let not_found = |source| TestError::BundleNotFound {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(not_found)?;
    if metadata.len() > MAX_BUNDLE_SIZE {
        return Err(TestError::format(
            path,
            format!("file is too large ({} bytes, max {} bytes)", metadata.len(), MAX_BUNDLE_SIZE),
        ));
    }
    let bytes = fs::read(path).map_err(not_found)?;
    let source = String::from_utf8(bytes).map_err(|e| TestError::format(path, format!("not valid UTF-8: {}", e)))?;

    let registry = parse_bundle(&source, &path.display().to_string()).map_err(|msg| TestError::format(path, msg))?;
    tracing::debug!(tests = registry.len(), "bundle loaded");
    Ok(registry)
}

/// Parse and register bundle `source`. `origin` prefixes every location (usually the bundle path).
pub fn parse_bundle(source: &str, origin: &str) -> Result<TestRegistry, String> {
    let file: BundleFile = serde_json::from_str(source).map_err(|e| e.to_string())?;
    if let Some(name) = &file.name {
        tracing::debug!(bundle = %name, "parsed bundle");
    }

    let mut registry = TestRegistry::new();
    let loader = Loader { origin };
    loader.register_specs(&mut registry, &file.specs, "", None)?;
    loader.register_suites(&mut registry, &file.suites, "", None)?;
    Ok(registry)
}

struct Loader<'a> {
    origin: &'a str,
}

impl Loader<'_> {
    fn location(&self, pointer: &str) -> String {
        format!("{}#{}", self.origin, pointer)
    }

    fn register_suites(
        &self,
        registry: &mut TestRegistry,
        suites: &[SuiteDef],
        base: &str,
        inherited_skip: Option<&str>,
    ) -> Result<(), String> {
        for (i, suite) in suites.iter().enumerate() {
            let pointer = format!("{}/suites/{}", base, i);
            if suite.description.trim().is_empty() {
                return Err(format!("suite at {} has an empty description", pointer));
            }
            let skip = inherited_skip.or(suite.skip.as_deref());
            registry.describe(&suite.description, |r| {
                self.register_specs(r, &suite.specs, &pointer, skip)?;
                self.register_suites(r, &suite.suites, &pointer, skip)
            })?;
        }
        Ok(())
    }

    fn register_specs(
        &self,
        registry: &mut TestRegistry,
        specs: &[SpecDef],
        base: &str,
        inherited_skip: Option<&str>,
    ) -> Result<(), String> {
        for (i, spec) in specs.iter().enumerate() {
            let pointer = format!("{}/specs/{}", base, i);
            let case = self.build_case(spec, &pointer)?;
            let case = match inherited_skip.or(spec.skip.as_deref()) {
                Some(reason) => case.skipped(reason),
                None => case,
            };
            registry.register(case);
        }
        Ok(())
    }

    fn build_case(&self, spec: &SpecDef, pointer: &str) -> Result<TestCase, String> {
        if spec.name.trim().is_empty() {
            return Err(format!("spec at {} has an empty name", pointer));
        }

        let body = match (&spec.expect, &spec.command, &spec.fault) {
            (Some(list), None, None) => TestBody::Expect(self.build_expectations(list, pointer)?),
            (None, Some(command), None) => TestBody::Command(command.clone()),
            (None, None, Some(message)) => TestBody::Fault(Failure::fault(message.clone())),
            (None, None, None) => {
                return Err(format!(
                    "spec '{}' at {} has no body (expected one of \"expect\", \"command\", \"fault\")",
                    spec.name, pointer
                ));
            }
            _ => {
                return Err(format!(
                    "spec '{}' at {} has more than one body (\"expect\", \"command\", \"fault\" are exclusive)",
                    spec.name, pointer
                ));
            }
        };

        Ok(TestCase::new(spec.name.clone(), body).at(self.location(pointer)))
    }

    fn build_expectations(&self, list: &[ExpectDef], base: &str) -> Result<Vec<Expectation>, String> {
        list.iter()
            .enumerate()
            .map(|(i, def)| {
                let pointer = format!("{}/expect/{}", base, i);
                let matcher = matchers::from_str(&def.matcher)
                    .ok_or_else(|| format!("unknown matcher '{}' at {}", def.matcher, pointer))?;
                let in_range = |p: &i32| (-CLOSE_TO_PRECISION_LIMIT..=CLOSE_TO_PRECISION_LIMIT).contains(p);
                if let Some(p) = def.precision.filter(|p| !in_range(p)) {
                    return Err(format!(
                        "precision {} at {} is out of range (at most {} digits either way)",
                        p, pointer, CLOSE_TO_PRECISION_LIMIT
                    ));
                }
                Ok(Expectation {
                    matcher,
                    actual: def.actual.clone(),
                    expected: def.expected.clone(),
                    negate: def.not,
                    precision: def.precision,
                    location: Some(self.location(&pointer)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testbundle_core::matchers::MatcherId;

    fn parse(source: &str) -> Result<TestRegistry, String> {
        parse_bundle(source, "b.json")
    }

    #[test]
    fn test_empty_bundle() {
        assert!(parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_discovery_order_and_full_names() {
        let registry = parse(
            r#"{
                "specs": [{ "name": "top", "fault": "x" }],
                "suites": [
                    {
                        "description": "outer",
                        "specs": [{ "name": "first", "fault": "x" }],
                        "suites": [{ "description": "inner", "specs": [{ "name": "deep", "fault": "x" }] }]
                    },
                    { "description": "second", "specs": [{ "name": "last", "fault": "x" }] }
                ]
            }"#,
        )
        .unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["top", "outer first", "outer inner deep", "second last"]);
        assert_eq!(
            registry.cases()[2].location.as_deref(),
            Some("b.json#/suites/0/suites/0/specs/0")
        );
    }

    #[test]
    fn test_expectation_pointer_and_null_vs_undefined() {
        let registry = parse(
            r#"{ "specs": [{ "name": "n", "expect": [
                { "actual": null, "matcher": "toBeNull" },
                { "matcher": "to_be_undefined" }
            ] }] }"#,
        )
        .unwrap();

        let TestBody::Expect(list) = &registry.cases()[0].body else {
            panic!("expected an expectation body");
        };
        assert_eq!(list[0].actual, Some(json!(null)));
        assert_eq!(list[1].actual, None);
        assert_eq!(list[1].matcher, MatcherId::ToBeUndefined);
        assert_eq!(list[1].location.as_deref(), Some("b.json#/specs/0/expect/1"));
    }

    #[test]
    fn test_suite_skip_is_inherited() {
        let registry = parse(
            r#"{ "suites": [{ "description": "s", "skip": "flaky upstream",
                 "specs": [{ "name": "a", "fault": "x" }],
                 "suites": [{ "description": "t", "specs": [{ "name": "b", "fault": "x" }] }] }] }"#,
        )
        .unwrap();
        for case in registry.cases() {
            assert_eq!(case.skip.as_deref(), Some("flaky upstream"));
        }
    }

    #[test]
    fn test_unknown_matcher_rejected() {
        let err = parse(r#"{ "specs": [{ "name": "a", "expect": [{ "actual": 1, "matcher": "toMatch" }] }] }"#)
            .unwrap_err();
        assert_eq!(err, "unknown matcher 'toMatch' at /specs/0/expect/0");
    }

    #[test]
    fn test_close_to_precision_range() {
        let bundle = |p: i64| {
            format!(
                r#"{{ "specs": [{{ "name": "a", "expect": [{{ "actual": 1, "matcher": "toBeCloseTo", "expected": 1, "precision": {} }}] }}] }}"#,
                p
            )
        };
        assert!(parse(&bundle(5)).is_ok());
        assert!(parse(&bundle(-1)).is_ok());
        let err = parse(&bundle(i32::MIN as i64)).unwrap_err();
        assert_eq!(err, "precision -2147483648 at /specs/0/expect/0 is out of range (at most 308 digits either way)");
    }

    #[test]
    fn test_non_utf8_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        fs::write(&path, b"{\xff\xfe}").unwrap();
        let err = load_bundle(&path).unwrap_err();
        assert!(matches!(err, TestError::BundleFormat { .. }), "{:?}", err);
        assert!(err.to_string().contains("not valid UTF-8"), "{}", err);
    }

    #[test]
    fn test_body_rules() {
        let none = parse(r#"{ "specs": [{ "name": "a" }] }"#).unwrap_err();
        assert!(none.contains("has no body"), "{}", none);

        let both = parse(r#"{ "specs": [{ "name": "a", "fault": "x", "command": { "program": "true" } }] }"#)
            .unwrap_err();
        assert!(both.contains("more than one body"), "{}", both);

        let unnamed = parse(r#"{ "specs": [{ "name": " ", "fault": "x" }] }"#).unwrap_err();
        assert_eq!(unnamed, "spec at /specs/0 has an empty name");
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let err = parse("{ \"specs\": [ }").unwrap_err();
        assert!(err.contains("line 1"), "{}", err);
    }

    #[test]
    fn test_unknown_top_level_field_rejected() {
        assert!(parse(r#"{ "spec": [] }"#).is_err());
    }
}
