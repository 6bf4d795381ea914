use std::f64::consts::{FRAC_PI_2, PI};

use num_complex::Complex64;

use crate::{
    error::{MathError, MathResult},
    interpreter::value::{core::Value, scalar::Scalar},
};

/// Extracts the single scalar argument of a one-argument function.
pub(crate) fn scalar_arg(args: &[Value]) -> MathResult<Scalar> {
    match args {
        [Value::Scalar(s)] => Ok(*s),
        [other] => Err(MathError::domain(format!("Expected a scalar, but received a {}.",
                                                 other.describe()))),
        _ => Err(MathError::domain(format!("Expected a single input, but received {}.",
                                           args.len()))),
    }
}

/// Defines a scalar builtin that stays real inside its real domain.
///
/// The real closure returns `None` outside of that domain, in which case the
/// complex closure computes the principal value instead of producing NaN.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{evaluator::function::builtin::sqrt, value::core::Value};
///
/// assert_eq!(sqrt(&[Value::from(4.0)]).unwrap(), Value::from(2.0));
/// assert_eq!(sqrt(&[Value::from(-4.0)]).unwrap(), Value::complex(0.0, 2.0));
/// ```
macro_rules! branch_builtin {
    ($fname:ident, $real:expr, $complex:expr) => {
        pub fn $fname(args: &[Value]) -> MathResult<Value> {
            let x = scalar_arg(args)?;
            Ok(Value::Scalar(x.map_branch($real, $complex)))
        }
    };
}

branch_builtin!(sin, |x: f64| Some(x.sin()), |z: Complex64| z.sin());
branch_builtin!(cos, |x: f64| Some(x.cos()), |z: Complex64| z.cos());
branch_builtin!(tan, |x: f64| Some(x.tan()), |z: Complex64| z.tan());
branch_builtin!(arcsin, |x: f64| (x.abs() <= 1.0).then(|| x.asin()), |z: Complex64| z.asin());
branch_builtin!(arccos, |x: f64| (x.abs() <= 1.0).then(|| x.acos()), |z: Complex64| z.acos());
branch_builtin!(arctan, |x: f64| Some(x.atan()), |z: Complex64| z.atan());
branch_builtin!(sinh, |x: f64| Some(x.sinh()), |z: Complex64| z.sinh());
branch_builtin!(cosh, |x: f64| Some(x.cosh()), |z: Complex64| z.cosh());
branch_builtin!(tanh, |x: f64| Some(x.tanh()), |z: Complex64| z.tanh());
branch_builtin!(arcsinh, |x: f64| Some(x.asinh()), |z: Complex64| z.asinh());
branch_builtin!(arccosh, |x: f64| (x >= 1.0).then(|| x.acosh()), |z: Complex64| z.acosh());
branch_builtin!(arctanh, |x: f64| (x.abs() <= 1.0).then(|| x.atanh()), |z: Complex64| z.atanh());
branch_builtin!(sqrt, |x: f64| (x >= 0.0).then(|| x.sqrt()), |z: Complex64| z.sqrt());
branch_builtin!(ln, |x: f64| (x >= 0.0).then(|| x.ln()), |z: Complex64| z.ln());
branch_builtin!(log10, |x: f64| (x >= 0.0).then(|| x.log10()), |z: Complex64| z.log10());
branch_builtin!(log2, |x: f64| (x >= 0.0).then(|| x.log2()), |z: Complex64| z.log2());
branch_builtin!(exp, |x: f64| Some(x.exp()), |z: Complex64| z.exp());

/// Defines the reciprocal of an existing builtin, such as `sec = 1/cos`.
///
/// A zero denominator raises a division by zero, which the caller reports as
/// an input outside the function's domain.
macro_rules! reciprocal_builtin {
    ($fname:ident, $inner:ident) => {
        pub fn $fname(args: &[Value]) -> MathResult<Value> {
            let inner = scalar_arg(&[$inner(args)?])?;
            Ok(Value::Scalar(inner.recip()?))
        }
    };
}

reciprocal_builtin!(sec, cos);
reciprocal_builtin!(csc, sin);
reciprocal_builtin!(cot, tan);
reciprocal_builtin!(sech, cosh);
reciprocal_builtin!(csch, sinh);
reciprocal_builtin!(coth, tanh);

/// Defines an inverse function through the reciprocal of its argument, such
/// as `arcsec(x) = arccos(1/x)`.
macro_rules! inverse_reciprocal_builtin {
    ($fname:ident, $inner:ident) => {
        pub fn $fname(args: &[Value]) -> MathResult<Value> {
            let x = scalar_arg(args)?;
            $inner(&[Value::Scalar(x.recip()?)])
        }
    };
}

inverse_reciprocal_builtin!(arcsec, arccos);
inverse_reciprocal_builtin!(arccsc, arcsin);
inverse_reciprocal_builtin!(arcsech, arccosh);
inverse_reciprocal_builtin!(arccsch, arcsinh);
inverse_reciprocal_builtin!(arccoth, arctanh);

/// Inverse cotangent with range `(0, π)` on the real line.
///
/// `arccot(0)` is `π/2`. Away from zero, the value is `arctan(1/x)`, shifted by
/// `π` when the real part of the argument is negative so that the branch is
/// continuous through zero.
///
/// # Example
/// ```
/// use std::f64::consts::{FRAC_PI_2, PI};
///
/// use mathgrader::interpreter::{evaluator::function::builtin::arccot, value::core::Value};
///
/// assert_eq!(arccot(&[Value::from(0.0)]).unwrap(), Value::from(FRAC_PI_2));
/// let Value::Scalar(s) = arccot(&[Value::from(-1.0)]).unwrap() else { panic!() };
/// assert!((s.re() - 3.0 * PI / 4.0).abs() < 1e-12);
/// ```
pub fn arccot(args: &[Value]) -> MathResult<Value> {
    let x = scalar_arg(args)?;
    if x.is_zero() {
        return Ok(Value::from(FRAC_PI_2));
    }

    let principal = scalar_arg(&[arctan(&[Value::Scalar(x.recip()?)])?])?;
    if x.re() < 0.0 {
        return Ok(Value::Scalar(principal + Scalar::Real(PI)));
    }
    Ok(Value::Scalar(principal))
}

/// Two-argument arctangent: `arctan2(x, y)` is the angle of the point
/// `(x, y)`.
///
/// Both arguments must be real.
pub fn arctan2(args: &[Value]) -> MathResult<Value> {
    let (x, y) = match args {
        [Value::Scalar(x), Value::Scalar(y)] => (*x, *y),
        _ => return Err(MathError::domain("arctan2 expects two scalar inputs.")),
    };

    match (x.as_real(), y.as_real()) {
        (Some(x), Some(y)) => Ok(Value::from(y.atan2(x))),
        _ => Err(MathError::domain("arctan2 can only be used with real inputs.")),
    }
}

/// Absolute value of a scalar, or the length of a vector.
///
/// Matrices and tensors are rejected with a pointer to `norm`.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::function::builtin::abs,
///     value::{array::MathArray, core::Value},
/// };
///
/// assert_eq!(abs(&[Value::complex(3.0, 4.0)]).unwrap(), Value::from(5.0));
///
/// let m = Value::Array(MathArray::real_matrix(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap());
/// assert_eq!(abs(&[m]).unwrap_err().to_string(),
///            "The abs function expects a scalar or vector. To take the norm of a matrix of \
///             shape (rows: 2, cols: 2), try norm(...) instead.");
/// ```
pub fn abs(args: &[Value]) -> MathResult<Value> {
    match args {
        [Value::Scalar(s)] => Ok(Value::from(s.abs())),
        [Value::Array(a)] if a.ndim() == 1 => Ok(Value::from(a.norm())),
        [other] => Err(MathError::domain(format!("The abs function expects a scalar or vector. \
                                                  To take the norm of a {}, try norm(...) \
                                                  instead.",
                                                 other.describe()))),
        _ => Err(MathError::domain("The abs function expects a single input.")),
    }
}

/// Defines a function applied to every component of its argument.
macro_rules! elementwise_builtin {
    ($fname:ident, $map:expr) => {
        pub fn $fname(args: &[Value]) -> MathResult<Value> {
            match args {
                [value] => Ok(value.map_scalars($map)),
                _ => Err(MathError::domain(format!("{} expects a single input.",
                                                   stringify!($fname)))),
            }
        }
    };
}

elementwise_builtin!(re, |s: Scalar| Scalar::Real(s.re()));
elementwise_builtin!(im, |s: Scalar| Scalar::Real(s.im()));
elementwise_builtin!(conj, Scalar::conj);
