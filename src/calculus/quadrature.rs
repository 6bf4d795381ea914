use crate::error::{MathError, MathResult};

/// Kronrod abscissae on `[0, 1]`; odd indices are also Gauss nodes.
const XGK: [f64; 8] = [0.991_455_371_120_812_6,
                       0.949_107_912_342_758_5,
                       0.864_864_423_359_769_1,
                       0.741_531_185_599_394_4,
                       0.586_087_235_467_691_1,
                       0.405_845_151_377_397_2,
                       0.207_784_955_007_898_5,
                       0.0];

/// Kronrod weights matching [`XGK`].
const WGK: [f64; 8] = [0.022_935_322_010_529_22,
                       0.063_092_092_629_978_55,
                       0.104_790_010_322_250_18,
                       0.140_653_259_715_525_92,
                       0.169_004_726_639_267_9,
                       0.190_350_578_064_785_4,
                       0.204_432_940_075_298_9,
                       0.209_482_141_084_727_83];

/// Seven-point Gauss weights for nodes `XGK[1]`, `XGK[3]`, `XGK[5]`, `XGK[7]`.
const WG: [f64; 4] = [0.129_484_966_168_869_7,
                      0.279_705_391_489_276_7,
                      0.381_830_050_505_118_94,
                      0.417_959_183_673_469_4];

/// Accuracy and effort limits for [`integrate_real`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureOptions {
    /// Absolute error goal.
    pub epsabs: f64,
    /// Relative error goal.
    pub epsrel: f64,
    /// Most subintervals before giving up.
    pub limit:  usize,
}

impl Default for QuadratureOptions {
    fn default() -> Self {
        Self { epsabs: 1.49e-8,
               epsrel: 1.49e-8,
               limit:  50, }
    }
}

/// An integral estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    /// Estimated value.
    pub value:        f64,
    /// Estimated absolute error.
    pub error:        f64,
    /// Subintervals used.
    pub subintervals: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
    error: f64,
}

/// Applies the 15-point Kronrod rule and its embedded 7-point Gauss rule.
fn kronrod<F>(f: &mut F, lower: f64, upper: f64) -> MathResult<Segment>
    where F: FnMut(f64) -> MathResult<f64>
{
    let center = 0.5 * (lower + upper);
    let half = 0.5 * (upper - lower);

    let mut sample = |x: f64| -> MathResult<f64> {
        let y = f(x)?;
        if !y.is_finite() {
            return Err(MathError::integration("Integration Error: The integrand is not finite \
                                               everywhere on the integration interval."));
        }
        Ok(y)
    };

    let fc = sample(center)?;
    let mut gauss = fc * WG[3];
    let mut kronrod_sum = fc * WGK[7];
    for (k, (&x, &w)) in XGK.iter().zip(&WGK).take(7).enumerate() {
        let pair = sample(center - half * x)? + sample(center + half * x)?;
        kronrod_sum += w * pair;
        if k % 2 == 1 {
            gauss += WG[k / 2] * pair;
        }
    }

    Ok(Segment { lower,
                 upper,
                 value: kronrod_sum * half,
                 error: ((kronrod_sum - gauss) * half).abs() })
}

/// Integrates a real function over a finite interval by adaptive bisection.
///
/// The segment with the largest error estimate is split until the total
/// error meets `max(epsabs, epsrel * |value|)`.
///
/// # Errors
/// [`MathError::Integration`] when the integrand is not finite, or the
/// subdivision limit is reached first. Errors from `f` pass through.
///
/// # Example
/// ```
/// use approx::assert_abs_diff_eq;
/// use mathgrader::calculus::quadrature::{QuadratureOptions, integrate_finite};
///
/// let result = integrate_finite(|x| Ok(x.sin()), 0.0, std::f64::consts::PI,
///                               &QuadratureOptions::default()).unwrap();
/// assert_abs_diff_eq!(result.value, 2.0, epsilon = 1e-10);
/// ```
pub fn integrate_finite<F>(mut f: F,
                           lower: f64,
                           upper: f64,
                           options: &QuadratureOptions)
                           -> MathResult<Quadrature>
    where F: FnMut(f64) -> MathResult<f64>
{
    if lower == upper {
        return Ok(Quadrature { value:        0.0,
                               error:        0.0,
                               subintervals: 0, });
    }

    let mut segments = vec![kronrod(&mut f, lower, upper)?];
    loop {
        let value = segments.iter().map(|s| s.value).sum::<f64>();
        let error = segments.iter().map(|s| s.error).sum::<f64>();
        if error <= options.epsabs.max(options.epsrel * value.abs()) {
            log::debug!("quadrature converged with {} subinterval(s)", segments.len());
            return Ok(Quadrature { value,
                                   error,
                                   subintervals: segments.len() });
        }
        if segments.len() >= options.limit {
            return Err(MathError::integration(format!("Integration Error: The maximum number \
                                                       of subdivisions ({}) has been \
                                                       achieved.",
                                                      options.limit)));
        }

        let worst = segments.iter()
                            .enumerate()
                            .max_by(|(_, a), (_, b)| a.error.total_cmp(&b.error))
                            .map_or(0, |(index, _)| index);
        let segment = segments.swap_remove(worst);
        let middle = 0.5 * (segment.lower + segment.upper);
        segments.push(kronrod(&mut f, segment.lower, middle)?);
        segments.push(kronrod(&mut f, middle, segment.upper)?);
    }
}

/// Integrates a real function over an interval whose ends may be infinite.
///
/// Infinite ends are mapped onto a finite interval by a change of variables:
/// `x = a + (1 - t) / t` for `[a, ∞)`, `x = b - (1 - t) / t` for `(-∞, b]`,
/// and `x = t / (1 - t²)` for the whole line. Reversed limits flip the sign.
///
/// # Example
/// ```
/// use approx::assert_abs_diff_eq;
/// use mathgrader::calculus::quadrature::{QuadratureOptions, integrate_real};
///
/// let options = QuadratureOptions::default();
/// let gauss = integrate_real(|x| Ok((-x * x).exp()), f64::NEG_INFINITY, f64::INFINITY, &options)
///     .unwrap();
/// assert_abs_diff_eq!(gauss.value, std::f64::consts::PI.sqrt(), epsilon = 1e-7);
///
/// let reversed = integrate_real(|x| Ok(x), 1.0, 0.0, &options).unwrap();
/// assert_abs_diff_eq!(reversed.value, -0.5, epsilon = 1e-12);
/// ```
pub fn integrate_real<F>(mut f: F,
                         lower: f64,
                         upper: f64,
                         options: &QuadratureOptions)
                         -> MathResult<Quadrature>
    where F: FnMut(f64) -> MathResult<f64>
{
    if lower.is_nan() || upper.is_nan() {
        return Err(MathError::integration("Integration Error: The integration limits are not \
                                           numbers."));
    }
    if lower > upper {
        let flipped = integrate_real(f, upper, lower, options)?;
        return Ok(Quadrature { value: -flipped.value,
                               ..flipped });
    }
    if lower == upper {
        return integrate_finite(f, lower, upper, options);
    }

    match (lower.is_infinite(), upper.is_infinite()) {
        (false, false) => integrate_finite(f, lower, upper, options),
        (false, true) => integrate_finite(|t| {
                                              let x = lower + (1.0 - t) / t;
                                              Ok(f(x)? / (t * t))
                                          },
                                          0.0,
                                          1.0,
                                          options),
        (true, false) => integrate_finite(|t| {
                                              let x = upper - (1.0 - t) / t;
                                              Ok(f(x)? / (t * t))
                                          },
                                          0.0,
                                          1.0,
                                          options),
        (true, true) => integrate_finite(|t| {
                                             let denominator = 1.0 - t * t;
                                             let x = t / denominator;
                                             Ok(f(x)? * (1.0 + t * t)
                                                / (denominator * denominator))
                                         },
                                         -1.0,
                                         1.0,
                                         options),
    }
}
