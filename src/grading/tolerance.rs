use std::{fmt::Display, str::FromStr};

use crate::{
    error::ConfigError,
    interpreter::{evaluator::binary::array::sub_values, value::core::Value},
};

/// How far a student's value may stray from the expected one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// A fixed bound on the norm of the difference.
    Absolute(f64),
    /// A bound relative to the norm of the expected value, in percent.
    Percent(f64),
}

impl Default for Tolerance {
    /// `0.01%`.
    fn default() -> Self {
        Self::Percent(0.01)
    }
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute(value) => write!(f, "{value}"),
            Self::Percent(value) => write!(f, "{value}%"),
        }
    }
}

impl FromStr for Tolerance {
    type Err = ConfigError;

    /// Parses `0.001` as an absolute tolerance and `0.1%` as a relative one.
    ///
    /// # Example
    /// ```
    /// use mathgrader::grading::tolerance::Tolerance;
    ///
    /// assert_eq!("0.1%".parse::<Tolerance>().unwrap(), Tolerance::Percent(0.1));
    /// assert_eq!("1e-3".parse::<Tolerance>().unwrap(), Tolerance::Absolute(0.001));
    /// assert!("-1".parse::<Tolerance>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (number, percent) = match s.strip_suffix('%') {
            Some(number) => (number.trim(), true),
            None => (s, false),
        };
        let value = number.parse::<f64>()
                          .map_err(|_| ConfigError::invalid(format!("invalid tolerance '{s}'")))?;
        let tolerance = if percent { Self::Percent(value) } else { Self::Absolute(value) };
        tolerance.validate()?;
        Ok(tolerance)
    }
}

impl Tolerance {
    /// Checks that the bound is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (Self::Absolute(value) | Self::Percent(value)) = *self;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::invalid(format!("tolerance must be a non-negative finite \
                                                     number, got {self}")));
        }
        Ok(())
    }

    /// The absolute bound that applies when `expected` is the target.
    #[must_use]
    pub fn bound(&self, expected: &Value) -> f64 {
        match *self {
            Self::Absolute(value) => value,
            Self::Percent(value) => expected.norm() * value / 100.0,
        }
    }

    /// Whether `student` lies within tolerance of `expected`.
    ///
    /// Values of different shapes are never within tolerance. NaN on either
    /// side is never within tolerance; equal infinities are.
    ///
    /// # Example
    /// ```
    /// use mathgrader::{grading::tolerance::Tolerance, interpreter::value::core::Value};
    ///
    /// let tolerance = Tolerance::Percent(1.0);
    /// assert!(tolerance.within(&Value::from(100.0), &Value::from(100.9)));
    /// assert!(!tolerance.within(&Value::from(100.0), &Value::from(101.1)));
    /// ```
    #[must_use]
    pub fn within(&self, expected: &Value, student: &Value) -> bool {
        if expected.has_nan() || student.has_nan() {
            return false;
        }
        if expected == student {
            return true;
        }
        if expected.shape() != student.shape() {
            return false;
        }
        let Ok(difference) = sub_values(expected, student) else {
            return false;
        };
        let distance = difference.norm();
        distance.is_finite() && distance <= self.bound(expected)
    }
}
