use crate::{
    error::{MathError, MathResult},
    interpreter::value::{array::MathArray, core::Value},
};

fn single_array<'a>(args: &'a [Value], name: &str) -> MathResult<&'a MathArray> {
    match args {
        [Value::Array(a)] => Ok(a),
        _ => Err(MathError::domain(format!("{name} expects a single array input."))),
    }
}

/// Determinant of a square matrix.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::function::array::det,
///     value::{array::MathArray, core::Value},
/// };
///
/// let m = MathArray::real_matrix(&[vec![2.0, 0.0], vec![0.0, 3.0]]).unwrap();
/// assert_eq!(det(&[Value::Array(m)]).unwrap(), Value::from(6.0));
/// ```
pub fn det(args: &[Value]) -> MathResult<Value> {
    Ok(Value::Scalar(single_array(args, "det")?.determinant()))
}

/// Sum of the diagonal entries of a square matrix.
pub fn trace(args: &[Value]) -> MathResult<Value> {
    Ok(Value::Scalar(single_array(args, "trace")?.trace()))
}

/// Transpose of a matrix.
pub fn trans(args: &[Value]) -> MathResult<Value> {
    Ok(Value::Array(single_array(args, "trans")?.transpose()))
}

/// Conjugate transpose of a matrix, also available as `adj`.
pub fn ctrans(args: &[Value]) -> MathResult<Value> {
    Ok(Value::Array(single_array(args, "ctrans")?.conj_transpose()))
}

/// Cross product of two 3-vectors.
pub fn cross(args: &[Value]) -> MathResult<Value> {
    match args {
        [Value::Array(a), Value::Array(b)] => Ok(Value::Array(a.cross(b))),
        _ => Err(MathError::domain("cross expects two vectors of length 3.")),
    }
}

/// Euclidean norm of any value: the modulus of a scalar, the length of a
/// vector, or the Frobenius norm of a matrix or tensor.
pub fn norm(args: &[Value]) -> MathResult<Value> {
    match args {
        [value] => Ok(Value::from(value.norm())),
        _ => Err(MathError::domain("norm expects a single input.")),
    }
}
