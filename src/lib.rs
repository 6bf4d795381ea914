//! # mathgrader
//!
//! mathgrader checks free-form mathematical answers numerically. It parses
//! formulas such as `2*sin(x)*cos(x)` into expression trees, evaluates them
//! to real, complex, vector, matrix or tensor values, and decides whether a
//! student's formula agrees with a reference by comparing both across
//! randomly sampled variable assignments.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::sync::LazyLock;

use crate::{
    error::MathResult,
    interpreter::{
        evaluator::core::{EvalMetadata, EvalOptions, Evaluator, Scope},
        value::core::Value,
    },
};

/// Defines the structure of parsed formulas.
///
/// The closed `Expr` enum has one variant per node kind, so the evaluator
/// matches on it exhaustively. `UsedNames` collects the variables, functions
/// and suffixes a tree refers to.
pub mod ast;
/// Provides the error types of every layer.
///
/// Parse and evaluation errors are student-facing and safe to display as
/// they are. Configuration errors point at the author of a problem. The
/// grading boundary combines both in `GradingError`.
pub mod error;
/// Parses and evaluates formulas.
///
/// # Responsibilities
/// - Validates bracket balance and tokenizes formulas.
/// - Builds expression trees and caches them per formula and suffix set.
/// - Evaluates trees against a scope, with shape-checked array algebra and
///   the default function library.
pub mod interpreter;
/// Draws random values for the variables and functions of a problem.
///
/// Every sample builds a fresh scope; sampling sets are validated before the
/// first draw, and all randomness comes from a caller-supplied generator.
pub mod sampling;
/// Compares a student's formula against reference answers.
///
/// # Responsibilities
/// - Validates a problem configuration.
/// - Runs the sampling protocol and consolidates per-sample comparisons.
/// - Applies policy checks on forbidden strings and functions.
pub mod grading;
/// Numeric integrals and sums of formulas.
pub mod calculus;
/// General utilities for safe numeric conversion and message text.
pub mod util;

static DEFAULT_EVALUATOR: LazyLock<Evaluator> = LazyLock::new(Evaluator::new);

/// Evaluates a formula using a process-wide parse cache.
///
/// This is the convenience form of [`Evaluator::evaluate`]. Use an
/// [`Evaluator`] of your own to control which cache is used.
///
/// # Errors
/// Any [`error::MathError`] raised while parsing or evaluating.
///
/// # Examples
/// ```
/// use mathgrader::{
///     evaluate,
///     interpreter::{evaluator::core::{EvalOptions, Scope}, value::core::Value},
/// };
///
/// let scope = Scope::with_defaults().with_variable("x", 2.0);
/// let (value, _) = evaluate("2^3^2 + x", &scope, &EvalOptions::default()).unwrap();
/// assert_eq!(value, Value::from(514.0));
///
/// // Unknown names are reported with suggestions.
/// let error = evaluate("X", &scope, &EvalOptions::default()).unwrap_err();
/// assert!(error.to_string().contains("did you mean x?"));
/// ```
pub fn evaluate(formula: &str,
                scope: &Scope,
                options: &EvalOptions)
                -> MathResult<(Value, EvalMetadata)> {
    DEFAULT_EVALUATOR.evaluate(formula, scope, options)
}
