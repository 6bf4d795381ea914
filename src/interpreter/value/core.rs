use std::fmt::Display;

use num_complex::Complex64;

use crate::interpreter::value::{array::MathArray, scalar::Scalar, shape::describe_shape};

/// The result of evaluating a formula or any of its sub-expressions.
///
/// Values are owned: looking up a variable hands out a copy, so nothing one
/// evaluation does can leak into another.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A real or complex number.
    Scalar(Scalar),
    /// A vector, matrix or tensor.
    Array(MathArray),
    /// A scalar multiple of an identity matrix whose dimension is taken from
    /// whatever square matrix it is combined with.
    IdentityMultiple(Scalar),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(Scalar::Real(v))
    }
}

impl From<Complex64> for Value {
    fn from(c: Complex64) -> Self {
        Self::Scalar(Scalar::Complex(c))
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<MathArray> for Value {
    fn from(a: MathArray) -> Self {
        Self::Array(a)
    }
}

impl Value {
    /// A real NaN, used as the propagated "undefined" result.
    #[must_use]
    pub const fn nan() -> Self {
        Self::Scalar(Scalar::Real(f64::NAN))
    }

    /// Builds a complex scalar value.
    #[must_use]
    pub const fn complex(re: f64, im: f64) -> Self {
        Self::Scalar(Scalar::complex(re, im))
    }

    /// The shape of the value; scalars have the empty shape.
    ///
    /// An identity multiple has no fixed shape and reports the empty shape;
    /// use [`Value::describe`] for messages.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Array(a) => a.shape(),
            Self::Scalar(_) | Self::IdentityMultiple(_) => &[],
        }
    }

    /// Number of array dimensions; `0` for scalars.
    #[must_use]
    pub fn ndim(&self) -> usize {
        match self {
            Self::Array(a) => a.ndim(),
            Self::Scalar(_) => 0,
            Self::IdentityMultiple(_) => 2,
        }
    }

    /// Describes the value for error messages, e.g. `vector of length 3`.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::{array::MathArray, core::Value};
    ///
    /// assert_eq!(Value::from(2.0).describe(), "scalar");
    /// let v = Value::Array(MathArray::real_vector(&[1.0, 2.0, 3.0]).unwrap());
    /// assert_eq!(v.describe(), "vector of length 3");
    /// ```
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::IdentityMultiple(_) => "multiple of the identity matrix".to_string(),
            other => describe_shape(other.shape()),
        }
    }

    /// Returns the scalar, if this is one.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Returns the array, if this is one.
    #[must_use]
    pub const fn as_array(&self) -> Option<&MathArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns `true` for one-dimensional arrays.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Array(a) if a.ndim() == 1)
    }

    /// Returns `true` when any component is NaN.
    #[must_use]
    pub fn has_nan(&self) -> bool {
        match self {
            Self::Scalar(s) | Self::IdentityMultiple(s) => s.is_nan(),
            Self::Array(a) => a.data().iter().any(|s| s.is_nan()),
        }
    }

    /// Returns `true` when any component is infinite.
    #[must_use]
    pub fn has_inf(&self) -> bool {
        match self {
            Self::Scalar(s) | Self::IdentityMultiple(s) => s.is_infinite(),
            Self::Array(a) => a.data().iter().any(|s| s.is_infinite()),
        }
    }

    /// Applies `f` to every scalar component.
    #[must_use]
    pub fn map_scalars(&self, f: impl Fn(Scalar) -> Scalar) -> Self {
        match self {
            Self::Scalar(s) => Self::Scalar(f(*s)),
            Self::Array(a) => Self::Array(a.map(f)),
            Self::IdentityMultiple(s) => Self::IdentityMultiple(f(*s)),
        }
    }

    /// The Euclidean (Frobenius) norm, or the modulus of a scalar.
    #[must_use]
    pub fn norm(&self) -> f64 {
        match self {
            Self::Scalar(s) | Self::IdentityMultiple(s) => s.abs(),
            Self::Array(a) => a.norm(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::IdentityMultiple(s) => write!(f, "({s})*I"),
            Self::Array(a) => write_nested(f, a.shape(), a.data()),
        }
    }
}

/// Writes nested brackets for an array of any rank.
fn write_nested(f: &mut std::fmt::Formatter<'_>,
                shape: &[usize],
                data: &[Scalar])
                -> std::fmt::Result {
    let Some((&outer, inner)) = shape.split_first() else {
        return match data.first() {
            Some(s) => write!(f, "{s}"),
            None => Ok(()),
        };
    };
    let stride = inner.iter().product::<usize>();

    write!(f, "[")?;
    for i in 0..outer {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_nested(f, inner, &data[i * stride..(i + 1) * stride])?;
    }
    write!(f, "]")
}
