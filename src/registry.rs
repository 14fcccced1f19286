//! Test registration.
//!
//! Every test is a named unit registered against a [`TestRegistry`] before execution begins. The registry is the only
//! thing the runner sees: how a test was authored (a Rust closure, a bundle expectation list, a bundle command) is
//! hidden behind [`TestBody`].
//!
//! Names nest like Jasmine `describe` blocks: registering `"adds"` inside `describe("math", ..)` yields the full name
//! `"math adds"`.

use std::fmt;
use std::panic::Location;

use serde::Serialize;
use testbundle_core::Failure;

use crate::command::CommandSpec;
use crate::expect::{Expectation, pretty};

/// A native test body. Returning `Err` records the failure; panicking records an unexpected fault.
pub type NativeFn = Box<dyn Fn() -> Result<(), Failure>>;

/// What a registered test does when executed.
pub enum TestBody {
    Native(NativeFn),
    /// Evaluate every expectation; each one that fails is reported.
    Expect(Vec<Expectation>),
    Command(CommandSpec),
    /// Always fails with the given fault (a test that could not be built into the bundle).
    Fault(Failure),
}

impl fmt::Debug for TestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestBody::Native(_) => f.write_str("Native(..)"),
            TestBody::Expect(e) => f.debug_tuple("Expect").field(e).finish(),
            TestBody::Command(c) => f.debug_tuple("Command").field(c).finish(),
            TestBody::Fault(fl) => f.debug_tuple("Fault").field(fl).finish(),
        }
    }
}

/// A registered test.
#[derive(Debug)]
pub struct TestCase {
    /// Full name, including enclosing suite descriptions.
    pub name: String,
    /// Where the test was defined; used for failures that carry no location of their own.
    pub location: Option<String>,
    /// Skip reason. `Some` means the test is reported as skipped and never executed.
    pub skip: Option<String>,
    pub body: TestBody,
}

impl TestCase {
    pub fn new(name: impl Into<String>, body: TestBody) -> Self {
        Self {
            name: name.into(),
            location: None,
            skip: None,
            body,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }
}

/// Ordered collection of registered tests.
#[derive(Debug, Default)]
pub struct TestRegistry {
    cases: Vec<TestCase>,
    scope: Vec<String>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native test under the current scope.
    #[track_caller]
    pub fn test<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn() -> Result<(), Failure> + 'static,
    {
        let location = Location::caller().to_string();
        self.register(TestCase::new(name, TestBody::Native(Box::new(f))).at(location))
    }

    /// Register a pending test that is reported as skipped.
    pub fn skip(&mut self, name: &str, reason: &str) -> &mut Self {
        self.register(TestCase::new(name, TestBody::Native(Box::new(pending))).skipped(reason))
    }

    /// Run `f` with `description` pushed onto the name scope.
    pub fn describe<T>(&mut self, description: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scope.push(description.to_string());
        let out = f(self);
        self.scope.pop();
        out
    }

    /// Register a case whose name is relative to the current scope.
    pub fn register(&mut self, mut case: TestCase) -> &mut Self {
        case.name = self.full_name(&case.name);
        self.cases.push(case);
        self
    }

    /// Join the current scope and `name` the way reporters display it.
    pub fn full_name(&self, name: &str) -> String {
        if self.scope.is_empty() {
            return name.to_string();
        }
        let mut full = self.scope.join(" ");
        full.push(' ');
        full.push_str(name);
        full
    }

    /// Keep only tests whose full name contains `keyword`.
    pub fn retain_matching(&mut self, keyword: &str) {
        self.cases.retain(|c| c.name.contains(keyword));
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.name.as_str())
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn into_cases(self) -> Vec<TestCase> {
        self.cases
    }
}

fn pending() -> Result<(), Failure> {
    Ok(())
}

// ============================================================================
// Assertion helpers for native tests
// ============================================================================

/// Fail with `message` unless `condition` holds.
#[track_caller]
pub fn expect_true(condition: bool, message: &str) -> Result<(), Failure> {
    if condition {
        Ok(())
    } else {
        Err(Failure::assertion(message).at(Location::caller().to_string()))
    }
}

/// Fail unless `actual == expected`. Values are shown the way bundle matchers show them.
#[track_caller]
pub fn expect_eq<T: PartialEq + Serialize>(actual: T, expected: T) -> Result<(), Failure> {
    if actual == expected {
        Ok(())
    } else {
        Err(Failure::assertion(format!("expected {} to equal {}", show(&actual), show(&expected)))
            .at(Location::caller().to_string()))
    }
}

/// Fail if `actual == expected`.
#[track_caller]
pub fn expect_ne<T: PartialEq + Serialize>(actual: T, expected: T) -> Result<(), Failure> {
    if actual != expected {
        Ok(())
    } else {
        Err(Failure::assertion(format!("expected {} not to equal {}", show(&actual), show(&expected)))
            .at(Location::caller().to_string()))
    }
}

fn show<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(v) => pretty(Some(&v)),
        Err(e) => format!("<unprintable: {}>", e),
    }
}

/// Explicitly fail a test.
#[track_caller]
pub fn fail(message: &str) -> Result<(), Failure> {
    Err(Failure::assertion(message).at(Location::caller().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_and_names() {
        let mut registry = TestRegistry::new();
        registry.test("A", || Ok(()));
        registry.describe("suite", |r| {
            r.test("B", || Ok(()));
            r.describe("nested", |r| {
                r.test("C", || Ok(()));
            });
        });
        registry.test("D", || Ok(()));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["A", "suite B", "suite nested C", "D"]);
    }

    #[test]
    fn test_native_location_is_caller() {
        let mut registry = TestRegistry::new();
        registry.test("here", || Ok(()));
        let location = registry.cases()[0].location.clone().unwrap();
        assert!(location.starts_with("src/registry.rs:"), "{}", location);
    }

    #[test]
    fn test_skip_registers_reason() {
        let mut registry = TestRegistry::new();
        registry.skip("later", "not ready");
        assert_eq!(registry.cases()[0].skip.as_deref(), Some("not ready"));
    }

    #[test]
    fn test_retain_matching() {
        let mut registry = TestRegistry::new();
        registry.test("parse header", || Ok(()));
        registry.test("parse body", || Ok(()));
        registry.test("render", || Ok(()));
        registry.retain_matching("parse");
        assert_eq!(registry.len(), 2);
        registry.retain_matching("nothing");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expect_eq_message() {
        let err = expect_eq(1, 2).unwrap_err();
        assert_eq!(err.message, "expected 1 to equal 2");
        assert!(err.location.unwrap().contains("registry.rs"));
        assert!(expect_eq("a", "a").is_ok());
    }

    #[test]
    fn test_helper_messages_match_bundle_matchers() {
        assert_eq!(expect_eq("a", "b").unwrap_err().message, "expected 'a' to equal 'b'");
        assert_eq!(expect_eq(vec![1], vec![2]).unwrap_err().message, "expected [ 1 ] to equal [ 2 ]");
        assert_eq!(expect_ne("x", "x").unwrap_err().message, "expected 'x' not to equal 'x'");
    }

    #[test]
    fn test_expect_ne_and_fail() {
        assert_eq!(expect_ne(3, 3).unwrap_err().message, "expected 3 not to equal 3");
        assert!(expect_ne(3, 4).is_ok());
        assert_eq!(fail("nope").unwrap_err().message, "nope");
        assert!(expect_true(false, "must hold").is_err());
        assert!(expect_true(true, "must hold").is_ok());
    }
}
