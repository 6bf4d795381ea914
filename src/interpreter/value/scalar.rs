use std::{
    fmt::Display,
    ops::{Add, Div, Mul, Neg, Sub},
};

use num_complex::Complex64;

use crate::{
    error::{MathError, MathResult},
    util::num::{f64_to_i64_exact, is_integral},
};

/// A real or complex number.
///
/// Operations between two real scalars produce real scalars whenever the real
/// result is defined. Anything involving a complex operand is complex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// A real number.
    Real(f64),
    /// A complex number.
    Complex(Complex64),
}

impl Default for Scalar {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Complex64> for Scalar {
    fn from(value: Complex64) -> Self {
        Self::Complex(value)
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(r) => write!(f, "{r}"),
            Self::Complex(c) if c.im < 0.0 => write!(f, "{} - {}i", c.re, -c.im),
            Self::Complex(c) => write!(f, "{} + {}i", c.re, c.im),
        }
    }
}

impl Scalar {
    /// `0`
    pub const ZERO: Self = Self::Real(0.0);
    /// `1`
    pub const ONE: Self = Self::Real(1.0);
    /// The imaginary unit.
    pub const I: Self = Self::Complex(Complex64::new(0.0, 1.0));

    /// Builds a complex scalar from its parts.
    #[must_use]
    pub const fn complex(re: f64, im: f64) -> Self {
        Self::Complex(Complex64::new(re, im))
    }

    /// Returns the value as a complex number.
    #[must_use]
    pub const fn to_complex(self) -> Complex64 {
        match self {
            Self::Real(r) => Complex64::new(r, 0.0),
            Self::Complex(c) => c,
        }
    }

    /// Real part.
    #[must_use]
    pub const fn re(self) -> f64 {
        match self {
            Self::Real(r) => r,
            Self::Complex(c) => c.re,
        }
    }

    /// Imaginary part.
    #[must_use]
    pub const fn im(self) -> f64 {
        match self {
            Self::Real(_) => 0.0,
            Self::Complex(c) => c.im,
        }
    }

    /// Returns the real value when the imaginary part is exactly zero.
    #[must_use]
    pub const fn as_real(self) -> Option<f64> {
        match self {
            Self::Real(r) => Some(r),
            Self::Complex(c) if c.im == 0.0 => Some(c.re),
            Self::Complex(_) => None,
        }
    }

    /// Returns `true` for the `Real` variant.
    #[must_use]
    pub const fn is_real(self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// Returns `true` when the value is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        match self {
            Self::Real(r) => r == 0.0,
            Self::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    /// Returns `true` when any component is NaN.
    #[must_use]
    pub fn is_nan(self) -> bool {
        match self {
            Self::Real(r) => r.is_nan(),
            Self::Complex(c) => c.is_nan(),
        }
    }

    /// Returns `true` when any component is infinite.
    #[must_use]
    pub fn is_infinite(self) -> bool {
        match self {
            Self::Real(r) => r.is_infinite(),
            Self::Complex(c) => c.re.is_infinite() || c.im.is_infinite(),
        }
    }

    /// The modulus `|z|`.
    #[must_use]
    pub fn abs(self) -> f64 {
        match self {
            Self::Real(r) => r.abs(),
            Self::Complex(c) => c.norm(),
        }
    }

    /// Complex conjugate. Real values are unchanged.
    #[must_use]
    pub fn conj(self) -> Self {
        match self {
            Self::Real(r) => Self::Real(r),
            Self::Complex(c) => Self::Complex(c.conj()),
        }
    }

    /// Divides, treating division by exact zero as an error.
    ///
    /// # Errors
    /// Returns [`MathError::ZeroDivision`] when `other` is zero.
    ///
    /// # Example
    /// ```
    /// use mathgrader::{error::MathError, interpreter::value::scalar::Scalar};
    ///
    /// assert_eq!(Scalar::Real(1.0).checked_div(Scalar::Real(4.0)), Ok(Scalar::Real(0.25)));
    /// assert_eq!(Scalar::Real(1.0).checked_div(Scalar::ZERO), Err(MathError::ZeroDivision));
    /// ```
    pub fn checked_div(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::ZeroDivision);
        }
        Ok(self / other)
    }

    /// Computes `1 / self`.
    ///
    /// # Errors
    /// Returns [`MathError::ZeroDivision`] when `self` is zero.
    pub fn recip(self) -> MathResult<Self> {
        Self::ONE.checked_div(self)
    }

    /// Raises `self` to `exponent`, leaving the real line when needed.
    ///
    /// A negative real base with a fractional real exponent produces the
    /// principal complex value instead of NaN, so `(-4)^0.5` is `2i`. Zero
    /// raised to a negative power is a division by zero.
    ///
    /// # Errors
    /// Returns [`MathError::ZeroDivision`] for zero raised to a power with a
    /// negative real part.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::scalar::Scalar;
    ///
    /// assert_eq!(Scalar::Real(2.0).pow(Scalar::Real(10.0)), Ok(Scalar::Real(1024.0)));
    ///
    /// let root = Scalar::Real(-4.0).pow(Scalar::Real(0.5)).unwrap();
    /// assert!(root.re().abs() < 1e-12);
    /// assert!((root.im() - 2.0).abs() < 1e-12);
    ///
    /// assert!(Scalar::ZERO.pow(Scalar::Real(-1.0)).is_err());
    /// ```
    pub fn pow(self, exponent: Self) -> MathResult<Self> {
        if self.is_zero() && exponent.re() < 0.0 {
            return Err(MathError::ZeroDivision);
        }

        match (self, exponent) {
            (Self::Real(base), Self::Real(exp)) => {
                if base >= 0.0 || is_integral(exp) || base.is_nan() || exp.is_nan() {
                    Ok(Self::Real(base.powf(exp)))
                } else {
                    Ok(Self::Complex(Complex64::new(base, 0.0).powf(exp)))
                }
            },
            (Self::Complex(base), Self::Real(exp)) => {
                if base.re == 0.0 && base.im == 0.0 {
                    return Ok(if exp == 0.0 { Self::ONE } else { Self::complex(0.0, 0.0) });
                }
                match f64_to_i64_exact(exp).and_then(|n| i32::try_from(n).ok()) {
                    Some(n) => Ok(Self::Complex(base.powi(n))),
                    None => Ok(Self::Complex(base.powf(exp))),
                }
            },
            (base, Self::Complex(exp)) => {
                if base.is_zero() {
                    return Ok(if exp.re == 0.0 && exp.im == 0.0 {
                                  Self::ONE
                              } else {
                                  Self::complex(0.0, 0.0)
                              });
                }
                Ok(Self::Complex(base.to_complex().powc(exp)))
            },
        }
    }

    /// Applies a real function when `real` accepts the input, and the complex
    /// counterpart otherwise.
    ///
    /// `real` returns `None` when the argument lies outside its real domain,
    /// which sends the computation to `complex` instead of producing NaN.
    pub fn map_branch<R, C>(self, real: R, complex: C) -> Self
        where R: Fn(f64) -> Option<f64>,
              C: Fn(Complex64) -> Complex64
    {
        match self {
            Self::Real(r) => match real(r) {
                Some(value) => Self::Real(value),
                None => Self::Complex(complex(Complex64::new(r, 0.0))),
            },
            Self::Complex(c) => Self::Complex(complex(c)),
        }
    }
}

impl Add for Scalar {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a + b),
            (a, b) => Self::Complex(a.to_complex() + b.to_complex()),
        }
    }
}

impl Sub for Scalar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a - b),
            (a, b) => Self::Complex(a.to_complex() - b.to_complex()),
        }
    }
}

impl Mul for Scalar {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a * b),
            (a, b) => Self::Complex(a.to_complex() * b.to_complex()),
        }
    }
}

/// Unchecked division following IEEE semantics. User-facing division goes
/// through [`Scalar::checked_div`].
impl Div for Scalar {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a / b),
            (a, b) => Self::Complex(a.to_complex() / b.to_complex()),
        }
    }
}

impl Neg for Scalar {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Real(r) => Self::Real(-r),
            Self::Complex(c) => Self::Complex(-c),
        }
    }
}
