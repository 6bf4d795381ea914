use crate::{
    error::{MathError, MathResult},
    interpreter::value::{array::MathArray, core::Value, shape::shape_kind},
};

/// Multiplies two values.
///
/// A scalar or identity multiple scales the other operand. Between arrays,
/// `vector * vector` is a dot product without conjugation, and products
/// involving matrices follow the usual contraction over the inner axis.
///
/// # Shape rules
/// - `vector * vector` produces a scalar.
/// - `matrix * vector` and `vector * matrix` produce a vector.
/// - `matrix * matrix` produces a matrix.
/// - Anything with more than two dimensions is rejected.
///
/// # Errors
/// [`MathError::Shape`] when the inner dimensions disagree or a tensor is
/// involved.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::binary::matmul::mul_values,
///     value::{array::MathArray, core::Value},
/// };
///
/// let m = Value::Array(MathArray::real_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
/// let v = Value::Array(MathArray::real_vector(&[1.0, 2.0]).unwrap());
///
/// let product = mul_values(&m, &v).unwrap();
/// assert_eq!(product, Value::Array(MathArray::real_vector(&[5.0, 11.0]).unwrap()));
/// assert_eq!(mul_values(&v, &v).unwrap(), Value::from(5.0));
/// ```
pub fn mul_values(left: &Value, right: &Value) -> MathResult<Value> {
    use Value::{Array, IdentityMultiple, Scalar};

    match (left, right) {
        (Scalar(a), Scalar(b)) => Ok(Scalar(*a * *b)),
        (Scalar(s), Array(a)) | (Array(a), Scalar(s)) => Ok(Array(a.map(|x| x * *s))),
        (IdentityMultiple(a), IdentityMultiple(b)) => Ok(IdentityMultiple(*a * *b)),
        (Scalar(s), IdentityMultiple(a)) | (IdentityMultiple(a), Scalar(s)) => {
            Ok(IdentityMultiple(*a * *s))
        },
        (IdentityMultiple(s), Array(a)) | (Array(a), IdentityMultiple(s)) => {
            if a.ndim() > 2 {
                return Err(tensor_product());
            }
            Ok(Array(a.map(|x| x * *s)))
        },
        (Array(a), Array(b)) => array_product(a, b, left, right),
    }
}

fn array_product(a: &MathArray, b: &MathArray, left: &Value, right: &Value) -> MathResult<Value> {
    let mismatch = || {
        MathError::shape(format!("Cannot multiply a {} with a {}.",
                                 left.describe(),
                                 right.describe()))
    };

    match (a.shape(), b.shape()) {
        (&[n], &[m]) => {
            if n != m {
                return Err(MathError::shape(format!("Cannot calculate the dot product of a \
                                                     vector of length {n} with a vector of \
                                                     length {m}.")));
            }
            Ok(Value::Scalar(a.dot(b)))
        },
        (&[_, k], &[m]) => {
            if k != m {
                return Err(mismatch());
            }
            Ok(Value::Array(a.mat_vec(b)))
        },
        (&[n], &[k, _]) => {
            if n != k {
                return Err(mismatch());
            }
            Ok(Value::Array(a.vec_mat(b)))
        },
        (&[_, k], &[m, _]) => {
            if k != m {
                return Err(mismatch());
            }
            Ok(Value::Array(a.matmul(b)))
        },
        _ => Err(tensor_product()),
    }
}

fn tensor_product() -> MathError {
    MathError::shape("Tensor multiplication is not currently supported.")
}

/// Divides `left` by `right`.
///
/// Only scalars and identity multiples can be divisors; dividing by an
/// identity multiple divides by its scale.
///
/// # Errors
/// - [`MathError::ZeroDivision`] when the divisor is zero.
/// - [`MathError::Shape`] when the divisor is an array.
///
/// # Example
/// ```
/// use mathgrader::{
///     error::MathError,
///     interpreter::{
///         evaluator::binary::matmul::div_values,
///         value::{array::MathArray, core::Value},
///     },
/// };
///
/// let v = Value::Array(MathArray::real_vector(&[2.0, 4.0]).unwrap());
/// assert_eq!(div_values(&v, &Value::from(2.0)).unwrap(),
///            Value::Array(MathArray::real_vector(&[1.0, 2.0]).unwrap()));
/// assert_eq!(div_values(&Value::from(1.0), &v).unwrap_err().to_string(),
///            "Cannot divide by a vector.");
/// assert_eq!(div_values(&v, &Value::from(0.0)), Err(MathError::ZeroDivision));
/// ```
pub fn div_values(left: &Value, right: &Value) -> MathResult<Value> {
    use Value::{Array, IdentityMultiple, Scalar};

    let divisor = match right {
        Scalar(s) | IdentityMultiple(s) => *s,
        Array(b) => {
            return Err(MathError::shape(format!("Cannot divide by a {}.",
                                                shape_kind(b.shape()))));
        },
    };
    if divisor.is_zero() {
        return Err(MathError::ZeroDivision);
    }

    match (left, right) {
        (Scalar(a), Scalar(_)) => Ok(Scalar(*a / divisor)),
        (Scalar(a) | IdentityMultiple(a), _) => Ok(IdentityMultiple(*a / divisor)),
        (Array(a), _) => Ok(Array(a.map(|x| x / divisor))),
    }
}
