use crate::{
    error::{MathError, MathResult},
    interpreter::value::{core::Value, shape::describe_shape},
    util::text::ordinal,
};

/// The shape a function expects for one of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainShape {
    /// A real or complex number.
    Scalar,
    /// A vector, optionally of a fixed length.
    Vector(Option<usize>),
    /// A matrix, optionally of a fixed shape `(rows, cols)`.
    Matrix(Option<(usize, usize)>),
    /// A square matrix of any size.
    SquareMatrix,
    /// Any value at all.
    Any,
}

impl DomainShape {
    /// Returns `true` when `value` has an acceptable shape.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) | (Self::Scalar, Value::Scalar(_)) => true,
            (Self::Vector(len), Value::Array(a)) => {
                a.ndim() == 1 && len.is_none_or(|n| a.shape()[0] == n)
            },
            (Self::Matrix(dims), Value::Array(a)) => {
                a.ndim() == 2 && dims.is_none_or(|(r, c)| a.shape() == [r, c])
            },
            (Self::SquareMatrix, Value::Array(a)) => a.is_square(),
            _ => false,
        }
    }

    /// Describes the expected shape in the words used by error messages.
    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Scalar => "scalar".to_string(),
            Self::Vector(Some(n)) => describe_shape(&[n]),
            Self::Vector(None) => "vector".to_string(),
            Self::Matrix(Some((r, c))) => describe_shape(&[r, c]),
            Self::Matrix(None) => "matrix".to_string(),
            Self::SquareMatrix => "square matrix".to_string(),
            Self::Any => "value".to_string(),
        }
    }
}

/// Validates every argument against its declared shape.
///
/// Validation does not stop at the first failure: when any argument is
/// rejected, the error lists the status of each argument in order.
///
/// # Errors
/// [`MathError::ArgumentCount`] when the number of arguments differs from
/// `shapes.len()`, or [`MathError::Domain`] with one line per argument.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::function::domain::{DomainShape, check_domain},
///     value::{array::MathArray, core::Value},
/// };
///
/// let shapes = [DomainShape::Vector(Some(3)), DomainShape::Vector(Some(3))];
/// let a = Value::Array(MathArray::real_vector(&[1.0, 2.0, 3.0]).unwrap());
/// let b = Value::Array(MathArray::real_vector(&[1.0, 2.0]).unwrap());
///
/// let err = check_domain("cross", &shapes, &[a, b]).unwrap_err();
/// assert_eq!(err.to_string(),
///            "There was an error evaluating function cross(...)\n\
///             1st input is ok: received a vector of length 3 as expected\n\
///             2nd input has an error: received a vector of length 2, expected a vector of length 3");
/// ```
pub fn check_domain(name: &str, shapes: &[DomainShape], args: &[Value]) -> MathResult<()> {
    if args.len() != shapes.len() {
        return Err(MathError::ArgumentCount { name:     name.to_string(),
                                              expected: shapes.len(),
                                              received: args.len(), });
    }

    let mut failed = false;
    let lines = shapes.iter()
                      .zip(args)
                      .enumerate()
                      .map(|(index, (shape, arg))| {
                          let position = ordinal(index + 1);
                          if shape.accepts(arg) {
                              format!("{position} input is ok: received a {} as expected",
                                      arg.describe())
                          } else {
                              failed = true;
                              format!("{position} input has an error: received a {}, expected a {}",
                                      arg.describe(),
                                      shape.describe())
                          }
                      })
                      .collect::<Vec<_>>();

    if !failed {
        return Ok(());
    }

    Err(MathError::domain(format!("There was an error evaluating function {name}(...)\n{}",
                                  lines.join("\n"))))
}
