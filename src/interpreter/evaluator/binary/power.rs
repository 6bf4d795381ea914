use crate::{
    error::{MathError, MathResult},
    interpreter::value::{core::Value, scalar::Scalar},
    util::num::f64_to_i64_exact,
};

/// Raises `base` to `exponent`.
///
/// Scalars use the complex-aware power of [`Scalar::pow`]. Square matrices
/// accept integer exponents: non-negative powers by repeated squaring, and
/// negative powers through the inverse when `negative_powers` is set.
///
/// # Errors
/// - [`MathError::Shape`] for array exponents, vectors, tensors, non-square
///   matrices, fractional matrix powers, and negative matrix powers when
///   they are disabled.
/// - [`MathError::Domain`] for negative powers of a singular matrix.
/// - [`MathError::Overflow`] for integer matrix exponents too large to
///   represent exactly.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::binary::power::pow_values,
///     value::{array::MathArray, core::Value},
/// };
///
/// let m = Value::Array(MathArray::real_matrix(&[vec![1.0, 1.0], vec![0.0, 1.0]]).unwrap());
/// let cube = pow_values(&m, &Value::from(3.0), true).unwrap();
/// assert_eq!(cube,
///            Value::Array(MathArray::real_matrix(&[vec![1.0, 3.0], vec![0.0, 1.0]]).unwrap()));
///
/// assert_eq!(pow_values(&m, &Value::from(0.5), true).unwrap_err().to_string(),
///            "Cannot raise a matrix to non-integer powers.");
/// assert!(pow_values(&m, &Value::from(-1.0), false).is_err());
/// ```
pub fn pow_values(base: &Value, exponent: &Value, negative_powers: bool) -> MathResult<Value> {
    let Value::Scalar(e) = exponent else {
        return Err(MathError::shape(format!("Cannot raise a {} to the power of a {}.",
                                            base.describe(),
                                            exponent.describe())));
    };

    match base {
        Value::Scalar(b) => Ok(Value::Scalar(b.pow(*e)?)),
        Value::IdentityMultiple(b) => {
            if !negative_powers && e.re() < 0.0 {
                return Err(MathError::shape("Cannot raise a matrix to negative powers."));
            }
            Ok(Value::IdentityMultiple(b.pow(*e)?))
        },
        Value::Array(a) => {
            match a.ndim() {
                1 => return Err(MathError::shape("Cannot raise a vector to powers.")),
                2 => {},
                _ => return Err(MathError::shape("Cannot raise a tensor to powers.")),
            }
            if !a.is_square() {
                return Err(MathError::shape("Cannot raise a non-square matrix to powers."));
            }

            let n = integer_exponent(*e)?;
            if n >= 0 {
                return Ok(Value::Array(a.matrix_power(n.unsigned_abs())));
            }
            if !negative_powers {
                return Err(MathError::shape("Cannot raise a matrix to negative powers."));
            }
            let inverse = a.inverse().ok_or_else(|| {
                                         MathError::domain("Cannot raise a singular matrix to \
                                                            negative powers.")
                                     })?;
            Ok(Value::Array(inverse.matrix_power(n.unsigned_abs())))
        },
    }
}

fn integer_exponent(exponent: Scalar) -> MathResult<i64> {
    let non_integer = || MathError::shape("Cannot raise a matrix to non-integer powers.");

    let real = exponent.as_real().ok_or_else(non_integer)?;
    if !real.is_finite() || real.fract() != 0.0 {
        return Err(non_integer());
    }
    f64_to_i64_exact(real).ok_or(MathError::Overflow)
}
