use std::{fmt::Debug, sync::Arc};

use num_complex::Complex64;

use crate::{
    error::{ConfigError, GradingError, MathError},
    grading::{result::ComparisonResult, tolerance::Tolerance},
    interpreter::value::{core::Value, shape::shape_kind},
    util::num::usize_to_f64,
};

/// Result of a comparer call.
pub type CompareResult = Result<ComparisonResult, GradingError>;

/// Compares one sample of a student's input against evaluated parameters.
pub trait SampleComparer: Debug + Send + Sync {
    /// Number of parameter formulas each answer supplies.
    fn param_count(&self) -> usize;

    /// Compares the student's value for one sample.
    ///
    /// # Parameters
    /// - `params`: The answer's parameter formulas, evaluated for this sample.
    /// - `student`: The student's value for the same sample.
    /// - `tolerance`: The configured tolerance.
    fn compare(&self, params: &[Value], student: &Value, tolerance: &Tolerance) -> CompareResult;
}

/// Compares every sample at once, for relations that only show across the
/// whole ensemble.
pub trait CorrelatedComparer: Debug + Send + Sync {
    /// Number of parameter formulas each answer supplies.
    fn param_count(&self) -> usize;

    /// Fewest samples the comparison is meaningful for.
    fn min_samples(&self) -> usize;

    /// Compares all samples.
    ///
    /// `params[k]` holds the evaluated parameters of sample `k` and
    /// `student[k]` the student's value for it.
    fn compare(&self,
               params: &[Vec<Value>],
               student: &[Value],
               tolerance: &Tolerance)
               -> CompareResult;
}

/// A comparer of either kind.
#[derive(Debug, Clone)]
pub enum Comparer {
    /// One result per sample.
    PerSample(Arc<dyn SampleComparer>),
    /// One result for all samples together.
    Correlated(Arc<dyn CorrelatedComparer>),
}

impl Default for Comparer {
    fn default() -> Self {
        Self::PerSample(Arc::new(EqualityComparer))
    }
}

impl Comparer {
    /// Wraps a per-sample comparer.
    pub fn per_sample(comparer: impl SampleComparer + 'static) -> Self {
        Self::PerSample(Arc::new(comparer))
    }

    /// Wraps a correlated comparer.
    pub fn correlated(comparer: impl CorrelatedComparer + 'static) -> Self {
        Self::Correlated(Arc::new(comparer))
    }

    /// Number of parameter formulas each answer must supply.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Self::PerSample(comparer) => comparer.param_count(),
            Self::Correlated(comparer) => comparer.param_count(),
        }
    }
}

/// Fails unless `student` has the same shape as `expected`.
///
/// # Example
/// ```
/// use mathgrader::{
///     grading::comparer::check_shape,
///     interpreter::value::{array::MathArray, core::Value},
/// };
///
/// let vector = Value::Array(MathArray::real_vector(&[1.0, 2.0]).unwrap());
/// let error = check_shape(&Value::from(1.0), &vector).unwrap_err();
/// assert_eq!(error.to_string(), "Expected answer to be a scalar, but input is a vector.");
/// ```
pub fn check_shape(expected: &Value, student: &Value) -> Result<(), MathError> {
    if expected.shape() == student.shape() {
        return Ok(());
    }
    let (expected_kind, student_kind) = (shape_kind(expected.shape()), shape_kind(student.shape()));
    let message = if expected_kind == student_kind {
        format!("Expected answer to be a {}, but input is a {} of incorrect shape.",
                expected.describe(),
                student.describe())
    } else {
        format!("Expected answer to be a {expected_kind}, but input is a {student_kind}.")
    };
    Err(MathError::shape(message))
}

fn real_student(student: &Value) -> Result<f64, MathError> {
    check_shape(&Value::from(0.0), student)?;
    student.as_scalar()
           .and_then(|s| s.as_real())
           .ok_or_else(|| MathError::invalid_input("Input must be real."))
}

fn real_param(params: &[Value], index: usize, role: &str) -> Result<f64, ConfigError> {
    params.get(index)
          .and_then(Value::as_scalar)
          .and_then(|s| s.as_real())
          .ok_or_else(|| ConfigError::invalid(format!("comparer parameter '{role}' must evaluate \
                                                       to a real number")))
}

/// Checks that the student's value equals the single parameter, within
/// tolerance. This is the default comparer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EqualityComparer;

impl SampleComparer for EqualityComparer {
    fn param_count(&self) -> usize {
        1
    }

    fn compare(&self, params: &[Value], student: &Value, tolerance: &Tolerance) -> CompareResult {
        let expected = params.first()
                             .ok_or_else(|| ConfigError::invalid("equality comparison needs \
                                                                  an expected value"))?;
        check_shape(expected, student)?;
        Ok(ComparisonResult::from_bool(tolerance.within(expected, student)))
    }
}

/// Checks that the student's value lies between two real parameters.
///
/// Tolerance does not apply. With `strict` the ends are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BetweenComparer {
    /// Exclude the ends of the range.
    pub strict: bool,
}

impl SampleComparer for BetweenComparer {
    fn param_count(&self) -> usize {
        2
    }

    fn compare(&self, params: &[Value], student: &Value, _tolerance: &Tolerance) -> CompareResult {
        let start = real_param(params, 0, "start")?;
        let stop = real_param(params, 1, "stop")?;
        if start > stop {
            return Err(ConfigError::invalid(format!("comparer range start {start} exceeds \
                                                     stop {stop}")).into());
        }

        let value = real_student(student)?;
        let inside = if self.strict {
            start < value && value < stop
        } else {
            (start..=stop).contains(&value)
        };
        Ok(ComparisonResult::from_bool(inside))
    }
}

/// Checks that the student's value matches the single parameter modulo a
/// fixed period, within tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CongruenceComparer {
    /// The period; must be positive.
    pub modulus: f64,
}

impl SampleComparer for CongruenceComparer {
    fn param_count(&self) -> usize {
        1
    }

    fn compare(&self, params: &[Value], student: &Value, tolerance: &Tolerance) -> CompareResult {
        if !(self.modulus.is_finite() && self.modulus > 0.0) {
            return Err(ConfigError::invalid(format!("modulus must be positive, got {}",
                                                    self.modulus)).into());
        }
        let expected = real_param(params, 0, "answer")?;
        let value = real_student(student)?;

        let offset = (value - expected).rem_euclid(self.modulus);
        let distance = offset.min(self.modulus - offset);
        let bound = tolerance.bound(&Value::from(expected));
        Ok(ComparisonResult::from_bool(distance.is_finite() && distance <= bound))
    }
}

/// Message given by default when the input is proportional to the answer.
pub const PROPORTIONAL_MESSAGE: &str =
    "The submitted answer differs from an expected answer by a constant factor.";

/// Recognizes answers related to the expected one across all samples.
///
/// Each relation, checked in order, is enabled by giving it a grade:
/// - `equals`: the values agree.
/// - `proportional`: `student = a * expected` for one constant `a`.
/// - `offset`: `student = expected + b` for one constant `b`.
/// - `linear`: `student = a * expected + b`.
///
/// The first relation that holds for every sample decides the result. When
/// every expected value is zero only `equals` is considered.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearComparer {
    /// Grade for equal values.
    pub equals:           Option<f64>,
    /// Grade for proportional values.
    pub proportional:     Option<f64>,
    /// Grade for values differing by a constant.
    pub offset:           Option<f64>,
    /// Grade for values related linearly.
    pub linear:           Option<f64>,
    /// Message for equal values.
    pub equals_msg:       String,
    /// Message for proportional values.
    pub proportional_msg: String,
    /// Message for values differing by a constant.
    pub offset_msg:       String,
    /// Message for values related linearly.
    pub linear_msg:       String,
}

impl Default for LinearComparer {
    fn default() -> Self {
        Self { equals:           Some(1.0),
               proportional:     Some(0.5),
               offset:           None,
               linear:           None,
               equals_msg:       String::new(),
               proportional_msg: PROPORTIONAL_MESSAGE.to_string(),
               offset_msg:       String::new(),
               linear_msg:       String::new(), }
    }
}

/// Least-squares fit `y ≈ a x + b`, with `b` forced to zero unless `offset`.
fn fit(x: &[Complex64], y: &[Complex64], offset: bool) -> Option<(Complex64, Complex64)> {
    let n = usize_to_f64(x.len());
    let (mean_x, mean_y) = if offset {
        (x.iter().sum::<Complex64>() / n, y.iter().sum::<Complex64>() / n)
    } else {
        (Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0))
    };

    let (cross, spread) = x.iter()
                           .zip(y)
                           .fold((Complex64::new(0.0, 0.0), 0.0), |(cross, spread), (xi, yi)| {
                               let dx = xi - mean_x;
                               (cross + dx.conj() * (yi - mean_y), spread + dx.norm_sqr())
                           });
    if spread == 0.0 {
        return None;
    }
    let slope = cross / spread;
    Some((slope, mean_y - slope * mean_x))
}

impl LinearComparer {
    fn holds(expected: &[Complex64],
             student: &[Complex64],
             tolerance: &Tolerance,
             relation: impl Fn(Complex64) -> Complex64)
             -> bool {
        expected.iter().zip(student).all(|(e, s)| {
                                        tolerance.within(&Value::from(relation(*e)),
                                                         &Value::from(*s))
                                    })
    }

    fn result(grade: f64, msg: &str) -> ComparisonResult {
        ComparisonResult::from_grade(grade, msg)
    }
}

impl CorrelatedComparer for LinearComparer {
    fn param_count(&self) -> usize {
        1
    }

    fn min_samples(&self) -> usize {
        3
    }

    fn compare(&self,
               params: &[Vec<Value>],
               student: &[Value],
               tolerance: &Tolerance)
               -> CompareResult {
        if student.len() < self.min_samples() {
            return Err(ConfigError::invalid("Cannot perform linear comparison with less than 3 \
                                             samples").into());
        }

        let mut expected = Vec::with_capacity(params.len());
        for sample in params {
            let value = sample.first()
                              .and_then(Value::as_scalar)
                              .ok_or_else(|| ConfigError::invalid("linear comparison needs a \
                                                                   scalar expected value"))?;
            expected.push(value.to_complex());
        }
        let mut values = Vec::with_capacity(student.len());
        for value in student {
            check_shape(&Value::from(0.0), value)?;
            let scalar = value.as_scalar().ok_or_else(|| {
                                              MathError::shape(format!("Expected answer to be \
                                                                        a scalar, but input is \
                                                                        a {}.",
                                                                       value.describe()))
                                          })?;
            values.push(scalar.to_complex());
        }
        if values.iter().chain(&expected).any(|z| z.is_nan()) {
            return Ok(ComparisonResult::incorrect());
        }

        if let Some(grade) = self.equals
           && Self::holds(&expected, &values, tolerance, |e| e)
        {
            return Ok(Self::result(grade, &self.equals_msg));
        }

        if expected.iter().all(|e| e.norm_sqr() == 0.0) {
            return Ok(ComparisonResult::incorrect());
        }

        if let Some(grade) = self.proportional
           && let Some((slope, _)) = fit(&expected, &values, false)
           && Self::holds(&expected, &values, tolerance, |e| slope * e)
        {
            return Ok(Self::result(grade, &self.proportional_msg));
        }

        if let Some(grade) = self.offset {
            let n = usize_to_f64(values.len());
            let shift = values.iter().zip(&expected).map(|(s, e)| s - e).sum::<Complex64>() / n;
            if Self::holds(&expected, &values, tolerance, |e| e + shift) {
                return Ok(Self::result(grade, &self.offset_msg));
            }
        }

        if let Some(grade) = self.linear
           && let Some((slope, intercept)) = fit(&expected, &values, true)
           && Self::holds(&expected, &values, tolerance, |e| slope * e + intercept)
        {
            return Ok(Self::result(grade, &self.linear_msg));
        }

        Ok(ComparisonResult::incorrect())
    }
}
