use std::f64::consts::PI;

use num_complex::Complex64;

use crate::{
    error::{MathError, MathResult},
    interpreter::{evaluator::function::builtin::scalar_arg, value::{core::Value, scalar::Scalar}},
    util::num::{is_integral, usize_to_f64},
};

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [0.999_999_999_999_809_9,
                                        676.520_368_121_885_1,
                                        -1_259.139_216_722_402_8,
                                        771.323_428_777_653_1,
                                        -176.615_029_162_140_6,
                                        12.507_343_278_686_905,
                                        -0.138_571_095_265_720_12,
                                        9.984_369_578_019_572e-6,
                                        1.505_632_735_149_311_6e-7];

/// Factorial extended to real and complex numbers through `Γ(x + 1)`.
///
/// Large arguments overflow to infinity rather than failing, so that the
/// evaluator can decide whether infinity is acceptable.
///
/// # Errors
/// [`MathError::Domain`] at the poles, the negative integers.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{evaluator::function::special::factorial, value::core::Value};
///
/// assert_eq!(factorial(&[Value::from(5.0)]).unwrap(), Value::from(120.0));
/// assert!(factorial(&[Value::from(-2.0)]).is_err());
/// ```
pub fn factorial(args: &[Value]) -> MathResult<Value> {
    let x = scalar_arg(args)?;
    if x.im() == 0.0 && x.re() < 0.0 && is_integral(x.re()) {
        return Err(MathError::domain("The factorial function is not defined for negative \
                                      integers."));
    }

    match x {
        Scalar::Real(r) => Ok(Value::from(exact_factorial(r).unwrap_or_else(|| gamma(r + 1.0)))),
        Scalar::Complex(z) => Ok(Value::from(complex_gamma(z + 1.0))),
    }
}

/// Exact factorials for small non-negative integers.
fn exact_factorial(n: f64) -> Option<f64> {
    if !(is_integral(n) && (0.0..=20.0).contains(&n)) {
        return None;
    }
    let mut product = 1.0;
    let mut k = 2.0;
    while k <= n {
        product *= k;
        k += 1.0;
    }
    Some(product)
}

/// The gamma function on the real line, by the Lanczos approximation.
///
/// The power `t^(x - 1/2)` is applied in two halves around `e^-t` so that the
/// intermediate product does not overflow before the true result does.
#[must_use]
pub fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }

    let x = x - 1.0;
    let series = LANCZOS_COEFFICIENTS[1..].iter()
                                          .enumerate()
                                          .fold(LANCZOS_COEFFICIENTS[0], |acc, (k, c)| {
                                              acc + c / (x + usize_to_f64(k + 1))
                                          });
    let t = x + LANCZOS_G + 0.5;
    let half_power = t.powf((x + 0.5) / 2.0);

    (2.0 * PI).sqrt() * half_power * ((-t).exp() * half_power) * series
}

/// The gamma function for complex arguments, by the Lanczos approximation.
#[must_use]
pub fn complex_gamma(z: Complex64) -> Complex64 {
    if z.re < 0.5 {
        return PI / ((z * PI).sin() * complex_gamma(1.0 - z));
    }

    let z = z - 1.0;
    let series = LANCZOS_COEFFICIENTS[1..].iter()
                                          .enumerate()
                                          .fold(Complex64::new(LANCZOS_COEFFICIENTS[0], 0.0),
                                                |acc, (k, c)| acc + *c / (z + usize_to_f64(k + 1)));
    let t = z + LANCZOS_G + 0.5;

    (2.0 * PI).sqrt() * t.powc(z + 0.5) * (-t).exp() * series
}
