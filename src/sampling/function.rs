use std::f64::consts::TAU;

use rand::Rng;

use crate::{
    error::{ConfigError, ConfigResult, MathError, MathResult},
    interpreter::{
        evaluator::function::core::MathFunction,
        value::{array::MathArray, core::Value, scalar::Scalar},
    },
    util::num::usize_to_f64,
};

/// A smooth random function built from a sum of sinusoids.
///
/// Each output component is `center + amplitude * Σ a sin(b·x + c)` with
/// `a` drawn from `[-1, 1] / num_terms`, each entry of `b` from `[0.5, 1.5]`
/// and `c` from `[0, 2π]`. The function takes `input_dim` scalar arguments
/// and returns a scalar, or a vector when `output_dim > 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomFunction {
    /// Number of scalar arguments.
    pub input_dim:  usize,
    /// Number of output components.
    pub output_dim: usize,
    /// Number of sinusoids per component.
    pub num_terms:  usize,
    /// Offset added to every component.
    pub center:     f64,
    /// Scale applied to the sum of sinusoids.
    pub amplitude:  f64,
}

impl Default for RandomFunction {
    fn default() -> Self {
        Self { input_dim:  1,
               output_dim: 1,
               num_terms:  3,
               center:     0.0,
               amplitude:  10.0, }
    }
}

#[derive(Debug, Clone)]
struct Term {
    a: f64,
    b: Vec<f64>,
    c: f64,
}

fn scalar_inputs(label: &str, args: &[Value]) -> MathResult<Vec<Scalar>> {
    args.iter()
        .map(|arg| {
            arg.as_scalar().ok_or_else(|| {
                               MathError::domain(format!("{label} expects scalar inputs, but \
                                                          received a {}.",
                                                         arg.describe()))
                           })
        })
        .collect()
}

/// `Σ a sin(b·x + c)` over the terms of one component.
fn sum_terms(terms: &[Term], inputs: &[Scalar]) -> Scalar {
    terms.iter().fold(Scalar::ZERO, |acc, term| {
                    let phase = term.b.iter().zip(inputs).fold(Scalar::Real(term.c), |p, (b, x)| {
                                                             p + Scalar::Real(*b) * *x
                                                         });
                    acc + Scalar::Real(term.a) * phase.map_branch(|x| Some(x.sin()), |z| z.sin())
                })
}

impl RandomFunction {
    /// Draws one function named `name`.
    ///
    /// # Example
    /// ```
    /// use mathgrader::{
    ///     interpreter::value::core::Value,
    ///     sampling::function::RandomFunction,
    /// };
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(5);
    /// let f = RandomFunction::default().sample("f", &mut rng);
    ///
    /// let Value::Scalar(y) = f.call(&[Value::from(1.0)]).unwrap() else { panic!() };
    /// assert!(y.re().abs() <= 10.0);
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> MathFunction {
        let components = (0..self.output_dim).map(|_| self.draw_terms(rng))
                                             .collect::<Vec<_>>();
        let center = Scalar::Real(self.center);
        let amplitude = Scalar::Real(self.amplitude);
        let label = name.to_string();

        MathFunction::new(name, self.input_dim, move |args| {
            let inputs = scalar_inputs(&label, args)?;
            let mut values = components.iter()
                                       .map(|terms| center + amplitude * sum_terms(terms, &inputs))
                                       .collect::<Vec<_>>();

            if values.len() == 1 {
                return Ok(Value::Scalar(values.remove(0)));
            }
            MathArray::vector(values).map(Value::Array)
                                     .ok_or_else(|| {
                                         MathError::domain(format!("{label} has no outputs."))
                                     })
        })
    }

    fn draw_terms<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Term> {
        let scale = 1.0 / usize_to_f64(self.num_terms.max(1));
        (0..self.num_terms).map(|_| {
                               let a = rng.random_range(-1.0..=1.0) * scale;
                               let b = (0..self.input_dim).map(|_| rng.random_range(0.5..=1.5))
                                                          .collect();
                               let c = rng.random_range(0.0..=TAU);
                               Term { a, b, c }
                           })
                           .collect()
    }

    /// Checks the dimensions and coefficients.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        if self.input_dim == 0 || self.output_dim == 0 || self.num_terms == 0 {
            return Err(ConfigError::sampling_set(name,
                                                 "input_dim, output_dim and num_terms must be \
                                                  positive"));
        }
        if !self.center.is_finite() || !self.amplitude.is_finite() {
            return Err(ConfigError::sampling_set(name, "center and amplitude must be finite"));
        }
        Ok(())
    }
}

/// Sampling sets for function names.
#[derive(Debug, Clone)]
pub enum FunctionSamplingSet {
    /// A freshly drawn random function for every sample.
    Random(RandomFunction),
    /// One of a fixed list of functions, each equally likely.
    Specific(Vec<MathFunction>),
}

impl Default for FunctionSamplingSet {
    fn default() -> Self {
        Self::Random(RandomFunction::default())
    }
}

impl FunctionSamplingSet {
    /// Draws one function, named `name` in error messages.
    pub fn sample<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> ConfigResult<MathFunction> {
        match self {
            Self::Random(random) => Ok(random.sample(name, rng)),
            Self::Specific(functions) => {
                if functions.is_empty() {
                    return Err(ConfigError::sampling_set(name, "no functions to choose from"));
                }
                let index = rng.random_range(0..functions.len());
                Ok(functions[index].renamed(name))
            },
        }
    }

    /// Checks the set before any sampling happens.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        match self {
            Self::Random(random) => random.validate(name),
            Self::Specific(functions) if functions.is_empty() => {
                Err(ConfigError::sampling_set(name, "no functions to choose from"))
            },
            Self::Specific(_) => Ok(()),
        }
    }
}
