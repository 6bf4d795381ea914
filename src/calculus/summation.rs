use std::str::FromStr;

use crate::{
    calculus::limits::{LimitKind, evaluate_limit},
    error::{MathError, MathResult},
    interpreter::{
        evaluator::{
            binary::array::add_values,
            core::{EvalOptions, Evaluator, Scope, evaluate_parsed},
        },
        value::core::Value,
    },
    util::num::{f64_to_i64_exact, i64_to_f64},
};

/// Stand-in for an infinite summation limit.
pub const INFINITE_CUTOFF: i64 = 1000;

/// Stand-in for an infinite limit when the summand uses a factorial, which
/// overflows long before [`INFINITE_CUTOFF`].
pub const FACTORIAL_CUTOFF: i64 = 80;

/// Most terms a single summation will evaluate.
pub const MAX_TERMS: i64 = 1_000_000;

/// Which integers in the range are summed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parity {
    /// Every integer.
    #[default]
    All,
    /// Even integers only.
    Even,
    /// Odd integers only.
    Odd,
}

impl FromStr for Parity {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "even" => Ok(Self::Even),
            "odd" => Ok(Self::Odd),
            other => Err(LimitKind::Summation.error(&format!("unknown parity '{other}'"))),
        }
    }
}

impl Parity {
    /// First integer at or after `n` with this parity.
    const fn first_from(self, n: i64) -> i64 {
        match (self, n.rem_euclid(2)) {
            (Self::Even, 1) | (Self::Odd, 0) => n + 1,
            _ => n,
        }
    }

    const fn step(self) -> i64 {
        match self {
            Self::All => 1,
            Self::Even | Self::Odd => 2,
        }
    }
}

fn integer_limit(value: f64, cutoff: i64) -> MathResult<i64> {
    if value == f64::INFINITY {
        return Ok(cutoff);
    }
    if value == f64::NEG_INFINITY {
        return Ok(-cutoff);
    }
    f64_to_i64_exact(value).ok_or_else(|| {
                               LimitKind::Summation.error("Summation limits must be integers, \
                                                           but have evaluated to non-integers.")
                           })
}

/// Sums a formula over a range of integers.
///
/// Limits may use `infty`. An infinite limit is replaced by
/// [`INFINITE_CUTOFF`], or by [`FACTORIAL_CUTOFF`] when the summand calls
/// `fact` or `factorial`. A range with no integers of the requested parity
/// sums to zero.
///
/// # Parameters
/// - `lower`, `upper`: Limit formulas.
/// - `summand`: Formula to sum.
/// - `variable`: Summation variable, bound on top of `scope`.
/// - `parity`: Which integers to include.
///
/// # Errors
/// - [`MathError::Summation`] for limits that are not real integers or a
///   range with too many terms.
/// - Any error from evaluating the limits or the summand.
///
/// # Example
/// ```
/// use approx::assert_abs_diff_eq;
/// use mathgrader::{
///     calculus::summation::{Parity, summation},
///     interpreter::evaluator::core::{Evaluator, Scope},
/// };
///
/// let evaluator = Evaluator::new();
/// let scope = Scope::with_defaults();
///
/// let odd = summation(&evaluator, &scope, "1", "9", "n", "n", Parity::Odd).unwrap();
/// assert_eq!(odd.as_scalar().unwrap().re(), 25.0);
///
/// let e = summation(&evaluator, &scope, "0", "infty", "1/fact(n)", "n", Parity::All).unwrap();
/// assert_abs_diff_eq!(e.as_scalar().unwrap().re(), std::f64::consts::E, epsilon = 1e-12);
/// ```
pub fn summation(evaluator: &Evaluator,
                 scope: &Scope,
                 lower: &str,
                 upper: &str,
                 summand: &str,
                 variable: &str,
                 parity: Parity)
                 -> MathResult<Value> {
    let a = evaluate_limit(evaluator, scope, lower, LimitKind::Summation)?;
    let b = evaluate_limit(evaluator, scope, upper, LimitKind::Summation)?;

    let mut working = scope.clone();
    let parsed = evaluator.parse(summand, &working.suffix_names())?;
    let cutoff = if parsed.names.functions.iter().any(|f| f == "fact" || f == "factorial") {
        FACTORIAL_CUTOFF
    } else {
        INFINITE_CUTOFF
    };

    let start = parity.first_from(integer_limit(a, cutoff)?);
    let stop = integer_limit(b, cutoff)?;
    if start > stop {
        return Ok(Value::from(0.0));
    }
    let step = parity.step();
    if (stop - start) / step >= MAX_TERMS {
        return Err(LimitKind::Summation.error("The summation range contains too many terms."));
    }
    log::debug!("summing {summand} for {variable} from {start} to {stop} in steps of {step}");

    let options = EvalOptions::default();
    let mut total: Option<Value> = None;
    let mut n = start;
    while n <= stop {
        working.variables.insert(variable.to_string(), Value::from(i64_to_f64(n)));
        let (term, _) = evaluate_parsed(&parsed, &working, &options)?;
        total = Some(match total {
                         Some(sum) => add_values(&sum, &term)?,
                         None => term,
                     });
        n += step;
    }

    Ok(total.unwrap_or_else(|| Value::from(0.0)))
}
