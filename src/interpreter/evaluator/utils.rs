use std::fmt::Write;

use crate::{
    ast::{Expr, UsedNames},
    error::{MathError, MathResult},
    interpreter::{
        evaluator::core::{Context, Scope},
        value::core::Value,
    },
    util::text::case_insensitive_matches,
};

/// Checks that every name a formula uses is defined in `scope`.
///
/// Variables are checked first, then functions, then suffixes, each in
/// alphabetical order, so the reported name is deterministic.
///
/// # Errors
/// - [`MathError::UndefinedVariable`], suggesting names that differ only in
///   case.
/// - [`MathError::UndefinedFunction`], suggesting names that differ only in
///   case, or a missing `*` when a variable of that name exists.
/// - [`MathError::UndefinedSuffix`].
///
/// # Example
/// ```
/// use mathgrader::{
///     ast::UsedNames,
///     interpreter::evaluator::{core::Scope, utils::validate_names},
/// };
///
/// let scope = Scope::new().with_variable("x", 5.0);
/// let mut names = UsedNames::default();
/// names.variables.insert("X".to_string());
///
/// let err = validate_names(&scope, &names).unwrap_err();
/// assert_eq!(err.to_string(),
///            "Invalid Input: X not permitted in answer as a variable (did you mean x?)");
/// ```
pub fn validate_names(scope: &Scope, names: &UsedNames) -> MathResult<()> {
    if let Some(name) = names.variables
                             .iter()
                             .find(|name| !scope.variables.contains_key(*name))
    {
        return Err(undefined_variable(scope, name));
    }

    if let Some(name) = names.functions
                             .iter()
                             .find(|name| !scope.functions.contains_key(*name))
    {
        return Err(undefined_function(scope, name));
    }

    if let Some(name) = names.suffixes
                             .iter()
                             .find(|name| !scope.suffixes.contains_key(*name))
    {
        return Err(MathError::UndefinedSuffix { name: name.clone() });
    }

    Ok(())
}

fn undefined_variable(scope: &Scope, name: &str) -> MathError {
    let mut message = format!("Invalid Input: {name} not permitted in answer as a variable");
    let matches = case_insensitive_matches(name, scope.variables.keys().map(String::as_str));

    if !matches.is_empty() {
        let _ = write!(message, " (did you mean {}?)", matches.join(" or "));
    } else if scope.functions.contains_key(name) {
        let _ = write!(message, " (did you forget the parentheses after {name}?)");
    }

    MathError::UndefinedVariable { name: name.to_string(),
                                   message }
}

fn undefined_function(scope: &Scope, name: &str) -> MathError {
    let mut message = format!("Invalid Input: {name} not permitted in answer as a function");
    let matches = case_insensitive_matches(name, scope.functions.keys().map(String::as_str));

    if scope.variables.contains_key(name) {
        message.push_str(" (did you forget to use * for multiplication?)");
    } else if !matches.is_empty() {
        let _ = write!(message, " (did you mean {}?)", matches.join(" or "));
    }

    MathError::UndefinedFunction { name: name.to_string(),
                                   message }
}

impl Context<'_> {
    /// Evaluates child expressions left to right.
    ///
    /// Returns `None` as soon as a child evaluates to NaN; the remaining
    /// children are not evaluated.
    pub(crate) fn eval_children(&mut self, exprs: &[Expr]) -> MathResult<Option<Vec<Value>>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.eval(expr)?;
            if value.has_nan() {
                return Ok(None);
            }
            values.push(value);
        }
        Ok(Some(values))
    }

    /// Applies the per-node result checks.
    ///
    /// NaN is returned untouched and takes precedence over the infinity
    /// check, which raises [`MathError::Overflow`] unless infinities are
    /// allowed.
    pub(crate) fn check_node(&self, value: Value) -> MathResult<Value> {
        if value.has_nan() {
            return Ok(value);
        }
        if !self.options.allow_inf && value.has_inf() {
            return Err(MathError::Overflow);
        }
        Ok(value)
    }
}
