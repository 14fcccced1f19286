//! Jasmine-style expectations over JSON values.
//!
//! An [`Expectation`] pairs an `actual` value with a matcher and, for binary matchers, an `expected` value. `None`
//! stands for *undefined* (the field was absent from the bundle), which is distinct from JSON `null`.
//!
//! Evaluation returns `Ok(())` when the (possibly negated) matcher holds, an assertion [`Failure`] when it does not,
//! and a fault when the matcher cannot be applied to the operands at all (`toBeGreaterThan` on a string).

use serde_json::Value;
use testbundle_core::Failure;
use testbundle_core::matchers::{
    self, CLOSE_TO_DEFAULT_PRECISION, CLOSE_TO_PRECISION_LIMIT, MatcherId, TO_BE_DEEP_EQUALITY_TIP,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub matcher: MatcherId,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
    pub negate: bool,
    /// Decimal digits compared by `toBeCloseTo`.
    pub precision: Option<i32>,
    pub location: Option<String>,
}

impl Expectation {
    pub fn new(matcher: MatcherId, actual: Option<Value>) -> Self {
        Self {
            matcher,
            actual,
            expected: None,
            negate: false,
            precision: None,
            location: None,
        }
    }

    pub fn expected(mut self, value: Value) -> Self {
        self.expected = Some(value);
        self
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn evaluate(&self) -> Result<(), Failure> {
        let holds = self.check().map_err(|msg| self.locate(Failure::fault(msg)))?;
        if holds != self.negate {
            return Ok(());
        }
        Err(self.locate(Failure::assertion(self.message())))
    }

    fn locate(&self, failure: Failure) -> Failure {
        match &self.location {
            Some(loc) => failure.at(loc.clone()),
            None => failure,
        }
    }

    /// Build the failure message, e.g. `expected 1 to equal 2` or `expected 'a' not to be null`.
    fn message(&self) -> String {
        let mut msg = format!("expected {} ", pretty(self.actual.as_ref()));
        if self.negate {
            msg.push_str("not ");
        }
        msg.push_str(&matchers::phrase(self.matcher));
        if matchers::info_for(self.matcher).arity == matchers::Arity::Binary {
            msg.push(' ');
            msg.push_str(&pretty(self.expected.as_ref()));
        }
        if self.matcher == MatcherId::ToBe && !self.negate && both_containers(&self.actual, &self.expected) {
            msg.push_str(". ");
            msg.push_str(TO_BE_DEEP_EQUALITY_TIP);
        }
        msg
    }

    /// Decide whether the un-negated matcher holds. `Err` means the operands are unusable.
    fn check(&self) -> Result<bool, String> {
        let actual = self.actual.as_ref();
        let expected = self.expected.as_ref();
        match self.matcher {
            MatcherId::ToBe => Ok(match (actual, expected) {
                (None, None) => true,
                (Some(a), Some(e)) => !is_container(a) && !is_container(e) && deep_eq(a, e),
                _ => false,
            }),
            MatcherId::ToEqual => Ok(match (actual, expected) {
                (None, None) => true,
                (Some(a), Some(e)) => deep_eq(a, e),
                _ => false,
            }),
            MatcherId::ToBeTruthy => Ok(is_truthy(actual)),
            MatcherId::ToBeFalsy => Ok(!is_truthy(actual)),
            MatcherId::ToBeNull => Ok(matches!(actual, Some(Value::Null))),
            MatcherId::ToBeDefined => Ok(actual.is_some()),
            MatcherId::ToBeUndefined => Ok(actual.is_none()),
            MatcherId::ToContain => match (actual, expected) {
                (Some(Value::Array(items)), Some(e)) => Ok(items.iter().any(|item| deep_eq(item, e))),
                (Some(Value::String(s)), Some(Value::String(sub))) => Ok(s.contains(sub.as_str())),
                _ => Err(format!(
                    "toContain expects an array or a string containing a string, got {} and {}",
                    type_name(actual),
                    type_name(expected)
                )),
            },
            MatcherId::ToBeGreaterThan => self.compare(|a, e| a > e),
            MatcherId::ToBeGreaterThanOrEqual => self.compare(|a, e| a >= e),
            MatcherId::ToBeLessThan => self.compare(|a, e| a < e),
            MatcherId::ToBeLessThanOrEqual => self.compare(|a, e| a <= e),
            MatcherId::ToBeCloseTo => {
                let precision = self.precision.unwrap_or(CLOSE_TO_DEFAULT_PRECISION);
                if !(-CLOSE_TO_PRECISION_LIMIT..=CLOSE_TO_PRECISION_LIMIT).contains(&precision) {
                    return Err(format!(
                        "toBeCloseTo precision must be within {} digits, got {}",
                        CLOSE_TO_PRECISION_LIMIT, precision
                    ));
                }
                self.compare(|a, e| (e - a).abs() < 10f64.powi(-precision) / 2.0)
            }
            MatcherId::ToHaveSize => {
                let Some(size) = expected.and_then(Value::as_u64) else {
                    return Err(format!(
                        "toHaveSize expects a non-negative integer size, got {}",
                        type_name(expected)
                    ));
                };
                let len = match actual {
                    Some(Value::Array(items)) => items.len(),
                    Some(Value::Object(map)) => map.len(),
                    Some(Value::String(s)) => s.chars().count(),
                    _ => {
                        return Err(format!(
                            "toHaveSize expects an array, object, or string, got {}",
                            type_name(actual)
                        ));
                    }
                };
                Ok(len as u64 == size)
            }
        }
    }

    fn compare(&self, op: impl Fn(f64, f64) -> bool) -> Result<bool, String> {
        let a = self.actual.as_ref().and_then(Value::as_f64);
        let e = self.expected.as_ref().and_then(Value::as_f64);
        match (a, e) {
            (Some(a), Some(e)) => Ok(op(a, e)),
            _ => Err(format!(
                "{} expects numbers, got {} and {}",
                matchers::as_str(self.matcher),
                type_name(self.actual.as_ref()),
                type_name(self.expected.as_ref())
            )),
        }
    }
}

fn is_container(v: &Value) -> bool {
    matches!(v, Value::Array(_) | Value::Object(_))
}

fn both_containers(a: &Option<Value>, e: &Option<Value>) -> bool {
    matches!((a, e), (Some(a), Some(e)) if is_container(a) && is_container(e))
}

/// Structural equality where `1` and `1.0` are the same number but `0` and `-0` are not.
pub fn deep_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y && (x != 0.0 || x.is_sign_negative() == y.is_sign_negative()),
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_eq(x, y)),
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len() && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| deep_eq(x, y)))
        }
        _ => a == b,
    }
}

/// JavaScript truthiness; undefined is falsy.
fn is_truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn type_name(v: Option<&Value>) -> &'static str {
    match v {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Render a value the way Jasmine's pretty printer does: `'text'`, `[ 1, 2 ]`, `Object({ a: 1 })`, `undefined`.
pub fn pretty(v: Option<&Value>) -> String {
    match v {
        None => "undefined".to_string(),
        Some(v) => pretty_value(v),
    }
}

fn pretty_value(v: &Value) -> String {
    match v {
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(pretty_value).collect();
            format!("[ {} ]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, pretty_value(v))).collect();
            format!("Object({{ {} }})", inner.join(", "))
        }
        other => other.to_string(),
    }
}
