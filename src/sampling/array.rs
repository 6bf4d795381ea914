use rand::Rng;

use crate::{
    error::{ConfigError, ConfigResult},
    interpreter::value::{array::MathArray, core::Value, scalar::Scalar},
    sampling::scalar::Interval,
    util::num::usize_to_f64,
};

/// Draws attempted by a constrained sampler before it gives up.
pub const MAX_ATTEMPTS: usize = 100;

/// Norms below this are treated as zero when scaling.
const DEGENERATE_NORM: f64 = 1e-10;

/// A rejected draw; the sampler should try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry;

/// Runs `draw` until it succeeds, up to [`MAX_ATTEMPTS`] times.
fn retry_loop<T, F>(name: &str, mut draw: F) -> ConfigResult<T>
    where F: FnMut() -> Result<T, Retry>
{
    for attempt in 1..=MAX_ATTEMPTS {
        match draw() {
            Ok(value) => {
                if attempt > 1 {
                    log::debug!("sampled '{name}' after {attempt} attempts");
                }
                return Ok(value);
            },
            Err(Retry) => continue,
        }
    }
    Err(ConfigError::RetryLimit { name:     name.to_string(),
                                  attempts: MAX_ATTEMPTS, })
}

fn random_entry<R: Rng + ?Sized>(rng: &mut R, complex: bool) -> Scalar {
    let re = rng.random_range(-1.0..=1.0);
    if complex {
        return Scalar::complex(re, rng.random_range(-1.0..=1.0));
    }
    Scalar::Real(re)
}

fn random_array<R: Rng + ?Sized>(rng: &mut R, shape: &[usize], complex: bool) -> Vec<Scalar> {
    (0..shape.iter().product::<usize>()).map(|_| random_entry(rng, complex)).collect()
}

/// Random vectors, matrices or tensors of a fixed shape.
///
/// Entries are drawn uniformly from `[-1, 1]` (independently for real and
/// imaginary parts) and the result is rescaled to a norm drawn from `norm`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySampler {
    /// Shape of every sample.
    pub shape:   Vec<usize>,
    /// Range of the Frobenius norm.
    pub norm:    Interval,
    /// Whether entries are complex.
    pub complex: bool,
}

impl ArraySampler {
    /// Real vectors of length `n` with norm in `[1, 5]`.
    #[must_use]
    pub fn real_vectors(n: usize) -> Self {
        Self { shape:   vec![n],
               norm:    Interval::new(1.0, 5.0),
               complex: false, }
    }

    /// Complex vectors of length `n` with norm in `[1, 5]`.
    #[must_use]
    pub fn complex_vectors(n: usize) -> Self {
        Self { complex: true,
               ..Self::real_vectors(n) }
    }

    /// Real `rows x cols` matrices with norm in `[1, 5]`.
    #[must_use]
    pub fn real_matrices(rows: usize, cols: usize) -> Self {
        Self { shape:   vec![rows, cols],
               norm:    Interval::new(1.0, 5.0),
               complex: false, }
    }

    /// Complex `rows x cols` matrices with norm in `[1, 5]`.
    #[must_use]
    pub fn complex_matrices(rows: usize, cols: usize) -> Self {
        Self { complex: true,
               ..Self::real_matrices(rows, cols) }
    }

    /// Draws one array.
    ///
    /// # Example
    /// ```
    /// use mathgrader::sampling::array::ArraySampler;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let sample = ArraySampler::real_vectors(3).sample("v", &mut rng).unwrap();
    /// assert_eq!(sample.shape(), &[3]);
    /// assert!((1.0 - 1e-9..=5.0 + 1e-9).contains(&sample.norm()));
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> ConfigResult<Value> {
        let array = retry_loop(name, || {
                        let data = random_array(rng, &self.shape, self.complex);
                        let array = MathArray::new(self.shape.clone(), data).ok_or(Retry)?;
                        if array.norm() < DEGENERATE_NORM {
                            return Err(Retry);
                        }
                        Ok(array)
                    })?;
        Ok(Value::Array(array.with_norm(self.norm.sample(rng))))
    }

    /// Checks the shape and norm range.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        if self.shape.is_empty() || self.shape.contains(&0) {
            return Err(ConfigError::sampling_set(name, "array dimensions must be positive"));
        }
        self.norm.validate(name)?;
        if self.norm.start < 0.0 {
            return Err(ConfigError::sampling_set(name, "norm must be non-negative"));
        }
        Ok(())
    }
}

/// Structural constraint on a sampled square matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetry {
    /// No constraint.
    #[default]
    None,
    /// Only diagonal entries are non-zero.
    Diagonal,
    /// `A = A^T`.
    Symmetric,
    /// `A = -A^T`.
    Antisymmetric,
    /// `A = A^H`; entries are complex.
    Hermitian,
    /// `A = -A^H`; entries are complex.
    Antihermitian,
}

/// Required determinant of a sampled square matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Determinant {
    /// Singular matrices.
    Zero,
    /// Matrices of unit determinant. The norm range is ignored.
    One,
}

/// Random square matrices with optional structure.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrixSampler {
    /// Number of rows and columns.
    pub dimension:   usize,
    /// Range of the Frobenius norm.
    pub norm:        Interval,
    /// Whether entries are complex.
    pub complex:     bool,
    /// Structural constraint.
    pub symmetry:    Symmetry,
    /// Whether the trace is zero.
    pub traceless:   bool,
    /// Required determinant, if any.
    pub determinant: Option<Determinant>,
}

impl Default for SquareMatrixSampler {
    fn default() -> Self {
        Self { dimension:   2,
               norm:        Interval::new(1.0, 5.0),
               complex:     false,
               symmetry:    Symmetry::None,
               traceless:   false,
               determinant: None, }
    }
}

impl SquareMatrixSampler {
    /// Draws one matrix.
    ///
    /// # Example
    /// ```
    /// use mathgrader::sampling::array::{Determinant, SquareMatrixSampler, Symmetry};
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let sampler = SquareMatrixSampler { dimension: 3,
    ///                                     symmetry: Symmetry::Symmetric,
    ///                                     determinant: Some(Determinant::Zero),
    ///                                     ..SquareMatrixSampler::default() };
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let sample = sampler.sample("A", &mut rng).unwrap();
    /// let matrix = sample.as_array().unwrap();
    /// assert!(matrix.determinant().abs() < 1e-9);
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> ConfigResult<Value> {
        let array = retry_loop(name, || self.draw(rng))?;
        Ok(Value::Array(array))
    }

    fn is_complex(&self) -> bool {
        self.complex || matches!(self.symmetry, Symmetry::Hermitian | Symmetry::Antihermitian)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MathArray, Retry> {
        let n = self.dimension;
        let mut matrix = match self.determinant {
            Some(Determinant::Zero) => self.singular(rng)?,
            _ => self.structured(rng)?,
        };

        if self.traceless && self.determinant != Some(Determinant::Zero) {
            let shift = matrix.trace() / Scalar::Real(usize_to_f64(n));
            let identity = MathArray::identity(n).map(|x| x * shift);
            matrix = matrix.zip_map(&identity, |a, b| a - b);
        }

        if self.determinant == Some(Determinant::One) {
            return self.unit_determinant(&matrix);
        }

        if matrix.norm() < DEGENERATE_NORM {
            return Err(Retry);
        }
        Ok(matrix.with_norm(self.norm.sample(rng)))
    }

    /// A random matrix with the requested symmetry.
    fn structured<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MathArray, Retry> {
        let n = self.dimension;
        let complex = self.is_complex();
        let base = MathArray::new(vec![n, n], random_array(rng, &[n, n], complex)).ok_or(Retry)?;
        let half = Scalar::Real(0.5);

        let matrix = match self.symmetry {
            Symmetry::None => base,
            Symmetry::Diagonal => {
                let identity = MathArray::identity(n);
                base.zip_map(&identity, |a, b| a * b)
            },
            Symmetry::Symmetric => base.zip_map(&base.transpose(), |a, b| (a + b) * half),
            Symmetry::Antisymmetric => base.zip_map(&base.transpose(), |a, b| (a - b) * half),
            Symmetry::Hermitian => base.zip_map(&base.conj_transpose(), |a, b| (a + b) * half),
            Symmetry::Antihermitian => {
                base.zip_map(&base.conj_transpose(), |a, b| (a - b) * half)
            },
        };
        Ok(matrix)
    }

    /// A random singular matrix with the requested symmetry.
    ///
    /// Validation has already rejected the combinations handled by
    /// returning [`Retry`] here.
    fn singular<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MathArray, Retry> {
        let n = self.dimension;
        let complex = self.is_complex();

        match self.symmetry {
            Symmetry::None => {
                // Last row is a random combination of the others.
                let mut data = random_array(rng, &[n, n], complex);
                let weights = random_array(rng, &[n - 1], complex);
                for col in 0..n {
                    let combined = (0..n - 1).fold(Scalar::ZERO, |acc, row| {
                                                 acc + weights[row] * data[row * n + col]
                                             });
                    data[(n - 1) * n + col] = combined;
                }
                MathArray::new(vec![n, n], data).ok_or(Retry)
            },
            Symmetry::Diagonal => {
                let mut diagonal = random_array(rng, &[n], complex);
                let zero_at = rng.random_range(0..n);
                diagonal[zero_at] = Scalar::ZERO;
                if self.traceless {
                    let fix = (0..n).find(|&k| k != zero_at).ok_or(Retry)?;
                    diagonal[fix] = Scalar::ZERO;
                    let rest = diagonal.iter().fold(Scalar::ZERO, |acc, d| acc + *d);
                    diagonal[fix] = -rest;
                }
                let mut data = vec![Scalar::ZERO; n * n];
                for (k, d) in diagonal.into_iter().enumerate() {
                    data[k * n + k] = d;
                }
                MathArray::new(vec![n, n], data).ok_or(Retry)
            },
            Symmetry::Symmetric | Symmetry::Hermitian => {
                // A sum of n - 1 rank-one terms has rank at most n - 1.
                let mut data = vec![Scalar::ZERO; n * n];
                for _ in 0..n - 1 {
                    let v = random_array(rng, &[n], complex);
                    let sign = if rng.random::<bool>() { Scalar::ONE } else { -Scalar::ONE };
                    for row in 0..n {
                        for col in 0..n {
                            let outer = if self.symmetry == Symmetry::Hermitian {
                                v[row] * v[col].conj()
                            } else {
                                v[row] * v[col]
                            };
                            data[row * n + col] = data[row * n + col] + sign * outer;
                        }
                    }
                }
                MathArray::new(vec![n, n], data).ok_or(Retry)
            },
            Symmetry::Antisymmetric | Symmetry::Antihermitian => self.structured(rng),
        }
    }

    /// Rescales `matrix` to have determinant one.
    fn unit_determinant(&self, matrix: &MathArray) -> Result<MathArray, Retry> {
        let n = self.dimension;
        let det = matrix.determinant();
        if det.abs() < DEGENERATE_NORM {
            return Err(Retry);
        }
        let exponent = -1.0 / usize_to_f64(n);

        // A hermitian determinant is real up to rounding.
        let real_det = if self.symmetry == Symmetry::Hermitian {
            Some(det.re())
        } else {
            det.as_real()
        };

        let factor = match real_det {
            Some(d) if d > 0.0 => Scalar::Real(d.powf(exponent)),
            Some(d) if n % 2 == 1 => Scalar::Real(-((-d).powf(exponent))),
            Some(_) => return Err(Retry),
            None => Scalar::Complex(det.to_complex().powf(exponent)),
        };
        Ok(matrix.map(|x| x * factor))
    }

    /// Rejects combinations that cannot be sampled.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        if self.dimension == 0 {
            return Err(ConfigError::sampling_set(name, "dimension must be positive"));
        }
        self.norm.validate(name)?;

        let n = self.dimension;
        let unsupported = match (self.symmetry, self.determinant) {
            (Symmetry::None | Symmetry::Symmetric | Symmetry::Hermitian,
             Some(Determinant::Zero)) if self.traceless => {
                Some("traceless singular matrices are only supported for diagonal symmetry")
            },
            (_, Some(Determinant::Zero)) if n < 2 => {
                Some("a singular 1x1 matrix is always zero")
            },
            (Symmetry::Diagonal, Some(Determinant::Zero)) if self.traceless && n < 3 => {
                Some("traceless singular diagonal matrices need dimension at least 3")
            },
            (Symmetry::Antisymmetric, Some(Determinant::Zero)) if n % 2 == 0 => {
                Some("singular antisymmetric matrices are only supported in odd dimensions")
            },
            (Symmetry::Antihermitian, Some(Determinant::Zero)) => {
                Some("singular antihermitian matrices are not supported")
            },
            (Symmetry::Antisymmetric | Symmetry::Antihermitian, Some(Determinant::One)) => {
                Some("unit determinant is not supported for antisymmetric or antihermitian \
                      matrices")
            },
            (_, Some(Determinant::One)) if self.traceless && n < 2 => {
                Some("a traceless 1x1 matrix is always zero")
            },
            _ => None,
        };

        match unsupported {
            Some(message) => Err(ConfigError::sampling_set(name, message)),
            None => Ok(()),
        }
    }
}

/// Random orthogonal (real) or unitary (complex) matrices.
///
/// Built from the `Q` factor of a random matrix's QR decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrthogonalSampler {
    /// Number of rows and columns.
    pub dimension: usize,
    /// Whether the matrix is complex, making it unitary.
    pub complex:   bool,
    /// Whether the determinant is exactly one.
    pub unit_det:  bool,
}

impl OrthogonalSampler {
    /// Draws one matrix.
    ///
    /// # Example
    /// ```
    /// use mathgrader::sampling::array::OrthogonalSampler;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let sampler = OrthogonalSampler { dimension: 3,
    ///                                   complex:   false,
    ///                                   unit_det:  true, };
    /// let mut rng = StdRng::seed_from_u64(11);
    /// let q = sampler.sample("Q", &mut rng).unwrap();
    /// let q = q.as_array().unwrap();
    /// assert!((q.determinant().re() - 1.0).abs() < 1e-9);
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> ConfigResult<Value> {
        let array = retry_loop(name, || self.draw(rng))?;
        Ok(Value::Array(array))
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MathArray, Retry> {
        let n = self.dimension;
        let data = random_array(rng, &[n, n], self.complex);
        let base = MathArray::new(vec![n, n], data).ok_or(Retry)?;
        let mut matrix = base.orthonormal_factor().ok_or(Retry)?;

        if self.unit_det {
            let det = matrix.determinant();
            let fix = if self.complex {
                Scalar::Complex(det.to_complex().inv())
            } else if det.re() < 0.0 {
                -Scalar::ONE
            } else {
                Scalar::ONE
            };
            // Scaling only the first row multiplies the determinant by `fix`.
            let data = matrix.data()
                             .iter()
                             .enumerate()
                             .map(|(k, s)| if k < n { *s * fix } else { *s })
                             .collect();
            matrix = MathArray::new(vec![n, n], data).ok_or(Retry)?;
        }

        Ok(matrix)
    }

    /// Checks the dimension.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        if self.dimension == 0 {
            return Err(ConfigError::sampling_set(name, "dimension must be positive"));
        }
        Ok(())
    }
}

/// Multiples of the identity matrix of a fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityMultipleSampler {
    /// Number of rows and columns.
    pub dimension: usize,
    /// Range of the multiplying scalar.
    pub scale:     Interval,
}

impl IdentityMultipleSampler {
    /// Draws one matrix.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let scale = Scalar::Real(self.scale.sample(rng));
        Value::Array(MathArray::identity(self.dimension).map(|x| x * scale))
    }

    /// Checks the dimension and scale range.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        if self.dimension == 0 {
            return Err(ConfigError::sampling_set(name, "dimension must be positive"));
        }
        self.scale.validate(name)
    }
}
