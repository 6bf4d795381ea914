use crate::{
    error::{MathError, MathResult},
    interpreter::evaluator::core::{EvalOptions, Evaluator, Scope},
};

/// Name bound to `+∞` while limits are evaluated.
pub const INFINITY_NAME: &str = "infty";

/// Which consumer a limit belongs to, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Integration limits.
    Integration,
    /// Summation limits.
    Summation,
}

impl LimitKind {
    /// Wraps a message in the consumer's error type.
    #[must_use]
    pub fn error(self, message: &str) -> MathError {
        match self {
            Self::Integration => MathError::integration(format!("Integration Error: {message}")),
            Self::Summation => MathError::summation(format!("Summation Error: {message}")),
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Integration => "Integration",
            Self::Summation => "Summation",
        }
    }
}

/// Evaluates a limit formula, which may use `infty`.
///
/// # Errors
/// Evaluation errors pass through. A limit that is not a real number
/// raises the consumer's error.
///
/// # Example
/// ```
/// use mathgrader::{
///     calculus::limits::{LimitKind, evaluate_limit},
///     interpreter::evaluator::core::{Evaluator, Scope},
/// };
///
/// let evaluator = Evaluator::new();
/// let scope = Scope::with_defaults();
/// let upper = evaluate_limit(&evaluator, &scope, "-infty", LimitKind::Integration).unwrap();
/// assert_eq!(upper, f64::NEG_INFINITY);
/// assert!(evaluate_limit(&evaluator, &scope, "i", LimitKind::Integration).is_err());
/// ```
pub fn evaluate_limit(evaluator: &Evaluator,
                      scope: &Scope,
                      formula: &str,
                      kind: LimitKind)
                      -> MathResult<f64> {
    let scope = scope.clone().with_variable(INFINITY_NAME, f64::INFINITY);
    let options = EvalOptions { allow_inf: true,
                                ..EvalOptions::default() };
    let (value, _) = evaluator.evaluate(formula, &scope, &options)?;

    value.as_scalar().and_then(|s| s.as_real()).ok_or_else(|| {
        kind.error(&format!("{} limits must be real but have evaluated to {}.",
                            kind.noun(),
                            if value.as_scalar().is_some() {
                                "complex numbers".to_string()
                            } else {
                                format!("a {}", value.describe())
                            }))
    })
}
