use std::sync::Arc;

use crate::{
    calculus::{
        limits::{LimitKind, evaluate_limit},
        quadrature::{QuadratureOptions, integrate_real},
    },
    error::MathResult,
    interpreter::{
        cache::ParsedExpression,
        evaluator::core::{EvalOptions, Evaluator, Scope, evaluate_parsed},
        value::{core::Value, scalar::Scalar},
    },
};

/// Evaluates `integrand` at `variable = x`.
fn integrand_at(parsed: &ParsedExpression,
                scope: &mut Scope,
                variable: &str,
                x: f64)
                -> MathResult<Scalar> {
    scope.variables.insert(variable.to_string(), Value::from(x));
    let (value, _) = evaluate_parsed(parsed, scope, &EvalOptions::default())?;
    value.as_scalar().ok_or_else(|| {
                         LimitKind::Integration.error(&format!("The integrand must evaluate \
                                                                to a scalar, but evaluated to \
                                                                a {}.",
                                                               value.describe()))
                     })
}

/// Computes a definite integral of a formula.
///
/// Limits may use `infty`. The real part of the integrand is integrated
/// first; the imaginary part gets its own pass only when a complex value was
/// seen. The result is complex only in that case.
///
/// # Parameters
/// - `lower`, `upper`: Limit formulas.
/// - `integrand`: Formula to integrate.
/// - `variable`: Integration variable, bound on top of `scope`.
///
/// # Errors
/// - [`crate::error::MathError::Integration`] for complex limits, a non-scalar or
///   non-finite integrand, or a quadrature that does not converge.
/// - Any error from evaluating the limits or the integrand.
///
/// # Example
/// ```
/// use approx::assert_abs_diff_eq;
/// use mathgrader::{
///     calculus::integral::integrate,
///     interpreter::evaluator::core::{Evaluator, Scope},
/// };
///
/// let evaluator = Evaluator::new();
/// let scope = Scope::with_defaults();
/// let area = integrate(&evaluator, &scope, "0", "infty", "e^(-x)", "x").unwrap();
/// assert_abs_diff_eq!(area.re(), 1.0, epsilon = 1e-8);
/// ```
pub fn integrate(evaluator: &Evaluator,
                 scope: &Scope,
                 lower: &str,
                 upper: &str,
                 integrand: &str,
                 variable: &str)
                 -> MathResult<Scalar> {
    integrate_with(evaluator,
                   scope,
                   [lower, upper],
                   integrand,
                   variable,
                   &QuadratureOptions::default())
}

/// Like [`integrate`], with explicit quadrature settings.
pub fn integrate_with(evaluator: &Evaluator,
                      scope: &Scope,
                      [lower, upper]: [&str; 2],
                      integrand: &str,
                      variable: &str,
                      options: &QuadratureOptions)
                      -> MathResult<Scalar> {
    let a = evaluate_limit(evaluator, scope, lower, LimitKind::Integration)?;
    let b = evaluate_limit(evaluator, scope, upper, LimitKind::Integration)?;

    let mut working = scope.clone();
    let parsed: Arc<ParsedExpression> =
        evaluator.parse(integrand, &working.suffix_names())?;

    let mut complex = false;
    let real = integrate_real(|x| {
                                  let value = integrand_at(&parsed, &mut working, variable, x)?;
                                  complex |= value.im() != 0.0;
                                  Ok(value.re())
                              },
                              a,
                              b,
                              options)?;
    log::debug!("real part of integral: {} (error {:.2e})", real.value, real.error);

    if !complex {
        return Ok(Scalar::Real(real.value));
    }

    let imaginary = integrate_real(|x| Ok(integrand_at(&parsed, &mut working, variable, x)?.im()),
                                   a,
                                   b,
                                   options)?;
    log::debug!("imaginary part of integral: {} (error {:.2e})",
                imaginary.value,
                imaginary.error);

    Ok(Scalar::complex(real.value, imaginary.value))
}
