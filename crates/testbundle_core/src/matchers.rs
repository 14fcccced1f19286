//! Expectation matcher vocabulary.
//!
//! This module centralizes the recognized matcher spellings so the bundle loader and the expectation evaluator don't
//! need stringly-typed comparisons. Canonical names follow the Jasmine spelling (`toEqual`); snake_case aliases
//! (`to_equal`) are accepted for bundles produced by non-JavaScript toolchains.
//!
//! ## Examples
//! ```rust
//! use testbundle_core::matchers::{self, MatcherId};
//!
//! assert_eq!(matchers::from_str("toEqual"), Some(MatcherId::ToEqual));
//! assert_eq!(matchers::from_str("to_equal"), Some(MatcherId::ToEqual));
//! assert_eq!(matchers::phrase(MatcherId::ToBeGreaterThan), "to be greater than");
//! ```

/// Stable identifier for supported matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherId {
    ToBe,
    ToEqual,
    ToBeTruthy,
    ToBeFalsy,
    ToBeNull,
    ToBeDefined,
    ToBeUndefined,
    ToContain,
    ToBeGreaterThan,
    ToBeGreaterThanOrEqual,
    ToBeLessThan,
    ToBeLessThanOrEqual,
    ToBeCloseTo,
    ToHaveSize,
}

/// Whether a matcher compares against an `expected` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Inspects `actual` only (`toBeTruthy`).
    Unary,
    /// Compares `actual` against `expected` (`toEqual`).
    Binary,
}

/// Metadata entry for a matcher.
#[derive(Debug, Clone, Copy)]
pub struct MatcherInfo {
    pub id: MatcherId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub arity: Arity,
    pub description: &'static str,
}

/// Default number of decimal digits compared by `toBeCloseTo`.
pub const CLOSE_TO_DEFAULT_PRECISION: i32 = 2;

/// Largest `toBeCloseTo` precision magnitude; beyond it `10^-p` leaves the `f64` range.
pub const CLOSE_TO_PRECISION_LIMIT: i32 = 308;

/// Appended to a failed `toBe` when both operands are containers.
pub const TO_BE_DEEP_EQUALITY_TIP: &str = "Tip: to check for deep equality, use toEqual() instead of toBe().";

/// Registry of supported matchers.
pub const MATCHERS: &[MatcherInfo] = &[
    info(MatcherId::ToBe, "toBe", &["to_be"], Arity::Binary, "Strict equality of scalar values."),
    info(MatcherId::ToEqual, "toEqual", &["to_equal"], Arity::Binary, "Deep structural equality."),
    info(MatcherId::ToBeTruthy, "toBeTruthy", &["to_be_truthy"], Arity::Unary, "Value is truthy."),
    info(MatcherId::ToBeFalsy, "toBeFalsy", &["to_be_falsy"], Arity::Unary, "Value is falsy."),
    info(MatcherId::ToBeNull, "toBeNull", &["to_be_null"], Arity::Unary, "Value is null."),
    info(MatcherId::ToBeDefined, "toBeDefined", &["to_be_defined"], Arity::Unary, "Value is present."),
    info(
        MatcherId::ToBeUndefined,
        "toBeUndefined",
        &["to_be_undefined"],
        Arity::Unary,
        "Value is absent.",
    ),
    info(
        MatcherId::ToContain,
        "toContain",
        &["to_contain"],
        Arity::Binary,
        "Array contains an element, or string contains a substring.",
    ),
    info(
        MatcherId::ToBeGreaterThan,
        "toBeGreaterThan",
        &["to_be_greater_than"],
        Arity::Binary,
        "Number is strictly greater.",
    ),
    info(
        MatcherId::ToBeGreaterThanOrEqual,
        "toBeGreaterThanOrEqual",
        &["to_be_greater_than_or_equal"],
        Arity::Binary,
        "Number is greater or equal.",
    ),
    info(
        MatcherId::ToBeLessThan,
        "toBeLessThan",
        &["to_be_less_than"],
        Arity::Binary,
        "Number is strictly less.",
    ),
    info(
        MatcherId::ToBeLessThanOrEqual,
        "toBeLessThanOrEqual",
        &["to_be_less_than_or_equal"],
        Arity::Binary,
        "Number is less or equal.",
    ),
    info(
        MatcherId::ToBeCloseTo,
        "toBeCloseTo",
        &["to_be_close_to"],
        Arity::Binary,
        "Number is within 10^-precision / 2 of the expected value.",
    ),
    info(
        MatcherId::ToHaveSize,
        "toHaveSize",
        &["to_have_size"],
        Arity::Binary,
        "Array, object, or string has the expected length.",
    ),
];

/// Resolve a matcher name (canonical or alias) to its stable id.
pub fn from_str(name: &str) -> Option<MatcherId> {
    MATCHERS
        .iter()
        .find(|m| m.canonical == name || m.aliases.contains(&name))
        .map(|m| m.id)
}

/// Return the canonical spelling for a matcher.
pub fn as_str(id: MatcherId) -> &'static str {
    info_for(id).canonical
}

/// Return the metadata entry for a matcher.
pub fn info_for(id: MatcherId) -> &'static MatcherInfo {
    // Every id has exactly one entry; `matcher_table_is_complete` guards this.
    let idx = MATCHERS.iter().position(|m| m.id == id).unwrap_or(0);
    &MATCHERS[idx]
}

/// Return the English phrasing used in failure messages, e.g. `toBeCloseTo` → `to be close to`.
pub fn phrase(id: MatcherId) -> String {
    let mut out = String::new();
    for ch in as_str(id).chars() {
        if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

const fn info(
    id: MatcherId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    arity: Arity,
    description: &'static str,
) -> MatcherInfo {
    MatcherInfo {
        id,
        canonical,
        aliases,
        arity,
        description,
    }
}
