use crate::{
    error::{MathError, MathResult},
    interpreter::value::{array::MathArray, core::Value, shape::describe_shape},
};

/// Adds two values.
///
/// Same-shape arrays add elementwise. A scalar cannot be added to an array,
/// and an identity multiple can only be added to a square matrix, whose size
/// it then takes.
///
/// # Errors
/// [`MathError::Shape`] naming both operands when the shapes are
/// incompatible.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::binary::array::add_values,
///     value::{array::MathArray, core::Value},
/// };
///
/// let a = Value::Array(MathArray::real_matrix(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap());
/// let b = Value::Array(MathArray::real_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap());
///
/// assert_eq!(add_values(&a, &b).unwrap_err().to_string(),
///            "Cannot add/subtract a matrix of shape (rows: 2, cols: 3) with a matrix of shape \
///             (rows: 3, cols: 2).");
/// assert!(add_values(&a, &a).is_ok());
/// ```
pub fn add_values(left: &Value, right: &Value) -> MathResult<Value> {
    use Value::{Array, IdentityMultiple, Scalar};

    match (left, right) {
        (Scalar(a), Scalar(b)) => Ok(Scalar(*a + *b)),
        (IdentityMultiple(a), IdentityMultiple(b)) => Ok(IdentityMultiple(*a + *b)),
        (Array(a), Array(b)) => {
            if a.shape() != b.shape() {
                return Err(MathError::shape(format!("Cannot add/subtract a {} with a {}.",
                                                    left.describe(),
                                                    right.describe())));
            }
            Ok(Array(a.zip_map(b, |x, y| x + y)))
        },
        (IdentityMultiple(s), Array(a)) | (Array(a), IdentityMultiple(s)) => {
            if !a.is_square() {
                return Err(MathError::shape(format!("Cannot add/subtract multiples of the \
                                                     identity to a {}.",
                                                    describe_shape(a.shape()))));
            }
            let expanded = MathArray::identity(a.shape()[0]).map(|x| x * *s);
            Ok(Array(a.zip_map(&expanded, |x, y| x + y)))
        },
        (Scalar(_), other) | (other, Scalar(_)) => {
            Err(MathError::shape(format!("Cannot add/subtract scalars to a {}.",
                                         other.describe())))
        },
    }
}

/// Subtracts `right` from `left` by adding its negation.
pub fn sub_values(left: &Value, right: &Value) -> MathResult<Value> {
    add_values(left, &negate_value(right))
}

/// Negates every component of a value.
#[must_use]
pub fn negate_value(value: &Value) -> Value {
    value.map_scalars(|s| -s)
}
