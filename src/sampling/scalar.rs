use std::f64::consts::FRAC_PI_2;

use num_complex::Complex64;
use rand::Rng;

use crate::{
    error::{ConfigError, ConfigResult},
    interpreter::value::core::Value,
    util::num::{MAX_SAFE_INT, i64_to_f64},
};

/// A closed interval `[start, stop]` of real numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower end.
    pub start: f64,
    /// Upper end.
    pub stop:  f64,
}

impl Interval {
    /// Creates the interval `[start, stop]`.
    #[must_use]
    pub const fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    /// Draws a uniformly distributed number from the interval.
    ///
    /// # Example
    /// ```
    /// use mathgrader::sampling::scalar::Interval;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let x = Interval::new(2.0, 3.0).sample(&mut rng);
    /// assert!((2.0..=3.0).contains(&x));
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.start + (self.stop - self.start) * rng.random::<f64>()
    }

    /// Checks that both ends are finite and in order.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        if !self.start.is_finite() || !self.stop.is_finite() {
            return Err(ConfigError::sampling_set(name, "interval ends must be finite"));
        }
        if self.start > self.stop {
            return Err(ConfigError::sampling_set(name,
                                                 format!("interval start {} exceeds stop {}",
                                                         self.start, self.stop)));
        }
        Ok(())
    }
}

/// Sampling sets that produce a single number.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarSampler {
    /// A real number drawn uniformly from an interval.
    RealInterval(Interval),
    /// An integer drawn uniformly from an inclusive range.
    IntegerRange {
        /// Smallest value.
        start: i64,
        /// Largest value.
        stop:  i64,
    },
    /// One of a fixed list of values, each equally likely.
    DiscreteSet(Vec<Value>),
    /// A complex number with uniformly drawn real and imaginary parts.
    ComplexRectangle {
        /// Range of the real part.
        re: Interval,
        /// Range of the imaginary part.
        im: Interval,
    },
    /// A complex number with uniformly drawn modulus and argument.
    ComplexSector {
        /// Range of the modulus.
        modulus:  Interval,
        /// Range of the argument, in radians.
        argument: Interval,
    },
}

impl Default for ScalarSampler {
    /// Real numbers in `[1, 5]`.
    fn default() -> Self {
        Self::RealInterval(Interval::new(1.0, 5.0))
    }
}

impl ScalarSampler {
    /// Complex numbers with real and imaginary parts in `[1, 3]`.
    #[must_use]
    pub const fn complex_rectangle() -> Self {
        Self::ComplexRectangle { re: Interval::new(1.0, 3.0),
                                 im: Interval::new(1.0, 3.0), }
    }

    /// Complex numbers with modulus in `[1, 3]` and argument in `[0, π/2]`.
    #[must_use]
    pub const fn complex_sector() -> Self {
        Self::ComplexSector { modulus:  Interval::new(1.0, 3.0),
                              argument: Interval::new(0.0, FRAC_PI_2), }
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        match self {
            Self::RealInterval(interval) => Value::from(interval.sample(rng)),
            Self::IntegerRange { start, stop } => {
                Value::from(i64_to_f64(rng.random_range(*start..=*stop)))
            },
            Self::DiscreteSet(values) => {
                let index = rng.random_range(0..values.len());
                values[index].clone()
            },
            Self::ComplexRectangle { re, im } => {
                Value::from(Complex64::new(re.sample(rng), im.sample(rng)))
            },
            Self::ComplexSector { modulus, argument } => {
                Value::from(Complex64::from_polar(modulus.sample(rng), argument.sample(rng)))
            },
        }
    }

    /// Checks the set before any sampling happens, so that drawing never
    /// fails.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        match self {
            Self::RealInterval(interval) => interval.validate(name),
            Self::IntegerRange { start, stop } => {
                if start > stop {
                    return Err(ConfigError::sampling_set(name,
                                                         format!("integer range start {start} \
                                                                  exceeds stop {stop}")));
                }
                if start.unsigned_abs() > MAX_SAFE_INT || stop.unsigned_abs() > MAX_SAFE_INT {
                    return Err(ConfigError::sampling_set(name, "integer range is too large"));
                }
                Ok(())
            },
            Self::DiscreteSet(values) => {
                if values.is_empty() {
                    return Err(ConfigError::sampling_set(name, "discrete set is empty"));
                }
                Ok(())
            },
            Self::ComplexRectangle { re, im } => {
                re.validate(name)?;
                im.validate(name)
            },
            Self::ComplexSector { modulus, argument } => {
                modulus.validate(name)?;
                argument.validate(name)?;
                if modulus.start < 0.0 {
                    return Err(ConfigError::sampling_set(name, "modulus must be non-negative"));
                }
                Ok(())
            },
        }
    }
}
