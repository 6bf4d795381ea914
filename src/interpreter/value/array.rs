use nalgebra::{DMatrix, LU};
use num_complex::Complex64;

use crate::interpreter::value::scalar::Scalar;

/// Pivots smaller than this, relative to the matrix norm, are treated as zero.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A rectangular array of scalars stored in row-major order.
///
/// The shape has at least one dimension; zero-dimensional results are always
/// represented as plain scalars. `data.len()` always equals the product of the
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MathArray {
    shape: Vec<usize>,
    data:  Vec<Scalar>,
}

impl MathArray {
    /// Builds an array from a shape and row-major data.
    ///
    /// Returns `None` when the shape is empty, contains a zero extent, or does
    /// not match the number of elements.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::{array::MathArray, scalar::Scalar};
    ///
    /// let m = MathArray::new(vec![2, 2], vec![Scalar::ONE; 4]).unwrap();
    /// assert_eq!(m.shape(), &[2, 2]);
    ///
    /// assert!(MathArray::new(vec![2, 2], vec![Scalar::ONE; 3]).is_none());
    /// ```
    #[must_use]
    pub fn new(shape: Vec<usize>, data: Vec<Scalar>) -> Option<Self> {
        if shape.is_empty() || shape.contains(&0) || shape.iter().product::<usize>() != data.len() {
            return None;
        }
        Some(Self { shape, data })
    }

    /// Builds a vector.
    ///
    /// Returns `None` for an empty vector.
    #[must_use]
    pub fn vector(data: Vec<Scalar>) -> Option<Self> {
        Self::new(vec![data.len()], data)
    }

    /// Builds a real vector from `f64` entries.
    #[must_use]
    pub fn real_vector(data: &[f64]) -> Option<Self> {
        Self::vector(data.iter().copied().map(Scalar::Real).collect())
    }

    /// Builds a real matrix from rows of `f64` entries.
    ///
    /// Returns `None` when the rows are empty or ragged.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::array::MathArray;
    ///
    /// let m = MathArray::real_matrix(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    /// assert_eq!(m.shape(), &[2, 3]);
    ///
    /// assert!(MathArray::real_matrix(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    /// ```
    #[must_use]
    pub fn real_matrix(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first()?.len();
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let data = rows.iter().flatten().copied().map(Scalar::Real).collect();
        Self::new(vec![rows.len(), cols], data)
    }

    /// The `n x n` identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut data = vec![Scalar::ZERO; n * n];
        for i in 0..n {
            data[i * n + i] = Scalar::ONE;
        }
        Self { shape: vec![n, n],
               data }
    }

    /// Stacks arrays of identical shape along a new leading axis.
    ///
    /// Returns `None` if the parts are empty or their shapes differ.
    #[must_use]
    pub fn stack(parts: &[Self]) -> Option<Self> {
        let inner = parts.first()?.shape.clone();
        if parts.iter().any(|p| p.shape != inner) {
            return None;
        }
        let mut shape = vec![parts.len()];
        shape.extend(inner);
        let data = parts.iter().flat_map(|p| p.data.iter().copied()).collect();
        Self::new(shape, data)
    }

    /// The extents of each dimension.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Elements in row-major order.
    #[must_use]
    pub fn data(&self) -> &[Scalar] {
        &self.data
    }

    /// Returns `true` when this is a matrix with as many rows as columns.
    #[must_use]
    pub fn is_square(&self) -> bool {
        matches!(self.shape.as_slice(), [r, c] if r == c)
    }

    /// Returns `true` when every entry is stored as a real number.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.data.iter().all(|s| s.is_real())
    }

    /// Entry `(row, col)` of a matrix.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Scalar {
        self.data[row * self.shape[1] + col]
    }

    /// Applies `f` to every element.
    #[must_use]
    pub fn map(&self, f: impl Fn(Scalar) -> Scalar) -> Self {
        Self { shape: self.shape.clone(),
               data:  self.data.iter().copied().map(f).collect(), }
    }

    /// Combines two arrays of identical shape element by element.
    ///
    /// The caller is responsible for checking the shapes first.
    #[must_use]
    pub fn zip_map(&self, other: &Self, f: impl Fn(Scalar, Scalar) -> Scalar) -> Self {
        Self { shape: self.shape.clone(),
               data:  self.data
                          .iter()
                          .zip(&other.data)
                          .map(|(a, b)| f(*a, *b))
                          .collect(), }
    }

    /// Frobenius norm, the Euclidean norm for vectors.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::array::MathArray;
    ///
    /// let v = MathArray::real_vector(&[3.0, 4.0]).unwrap();
    /// assert_eq!(v.norm(), 5.0);
    /// ```
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|s| s.abs().powi(2)).sum::<f64>().sqrt()
    }

    /// Sum of `a[k] * b[k]` without conjugation.
    ///
    /// Both arrays must be vectors of the same length.
    #[must_use]
    pub fn dot(&self, other: &Self) -> Scalar {
        self.data
            .iter()
            .zip(&other.data)
            .fold(Scalar::ZERO, |acc, (a, b)| acc + *a * *b)
    }

    /// Matrix product of two matrices with matching inner dimension.
    #[must_use]
    pub fn matmul(&self, other: &Self) -> Self {
        let (m, k, n) = (self.shape[0], self.shape[1], other.shape[1]);
        let mut data = Vec::with_capacity(m * n);
        for i in 0..m {
            for j in 0..n {
                let sum =
                    (0..k).fold(Scalar::ZERO, |acc, t| acc + self.get(i, t) * other.get(t, j));
                data.push(sum);
            }
        }
        Self { shape: vec![m, n],
               data }
    }

    /// Matrix times vector: contracts the matrix columns with the vector.
    #[must_use]
    pub fn mat_vec(&self, vector: &Self) -> Self {
        let (m, k) = (self.shape[0], self.shape[1]);
        let row = |i| (0..k).fold(Scalar::ZERO, |acc, t| acc + self.get(i, t) * vector.data[t]);
        let data = (0..m).map(row).collect();
        Self { shape: vec![m],
               data }
    }

    /// Vector times matrix: contracts the vector with the matrix rows.
    #[must_use]
    pub fn vec_mat(&self, matrix: &Self) -> Self {
        let (k, n) = (matrix.shape[0], matrix.shape[1]);
        let col = |j| (0..k).fold(Scalar::ZERO, |acc, t| acc + self.data[t] * matrix.get(t, j));
        let data = (0..n).map(col).collect();
        Self { shape: vec![n],
               data }
    }

    /// Transpose of a matrix.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let (rows, cols) = (self.shape[0], self.shape[1]);
        let mut data = Vec::with_capacity(rows * cols);
        for j in 0..cols {
            for i in 0..rows {
                data.push(self.get(i, j));
            }
        }
        Self { shape: vec![cols, rows],
               data }
    }

    /// Conjugate transpose of a matrix.
    #[must_use]
    pub fn conj_transpose(&self) -> Self {
        self.transpose().map(Scalar::conj)
    }

    /// Sum of the diagonal of a square matrix.
    #[must_use]
    pub fn trace(&self) -> Scalar {
        (0..self.shape[0]).fold(Scalar::ZERO, |acc, i| acc + self.get(i, i))
    }

    /// Determinant of a square matrix from its LU factorization.
    ///
    /// Real matrices stay real; anything else is factored over the complex
    /// numbers.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::{array::MathArray, scalar::Scalar};
    ///
    /// let m = MathArray::real_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    /// let det = m.determinant().re();
    /// assert!((det + 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn determinant(&self) -> Scalar {
        match self.to_real_dmatrix() {
            Some(matrix) => Scalar::Real(LU::new(matrix).determinant()),
            None => Scalar::Complex(LU::new(self.to_complex_dmatrix()).determinant()),
        }
    }

    /// Inverse of a square matrix.
    ///
    /// Returns `None` when the matrix is singular to working precision.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let threshold = SINGULAR_EPSILON * self.norm().max(1.0);
        match self.to_real_dmatrix() {
            Some(matrix) => {
                let lu = LU::new(matrix);
                if lu.u().diagonal().iter().any(|p| p.abs() <= threshold) {
                    return None;
                }
                lu.try_inverse().map(|inverse| Self::from_real_dmatrix(&inverse))
            },
            None => {
                let lu = LU::new(self.to_complex_dmatrix());
                if lu.u().diagonal().iter().any(|p| p.norm() <= threshold) {
                    return None;
                }
                lu.try_inverse().map(|inverse| Self::from_complex_dmatrix(&inverse))
            },
        }
    }

    /// The orthonormal factor `Q` of the QR decomposition of a square matrix.
    ///
    /// Returns `None` when the columns are linearly dependent to working
    /// precision.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::value::array::MathArray;
    ///
    /// let m = MathArray::real_matrix(&[vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    /// let q = m.orthonormal_factor().unwrap();
    /// let product = q.matmul(&q.transpose());
    /// assert!((product.get(0, 0).re() - 1.0).abs() < 1e-12);
    /// assert!(product.get(0, 1).abs() < 1e-12);
    ///
    /// let rank_one = MathArray::real_matrix(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
    /// assert!(rank_one.orthonormal_factor().is_none());
    /// ```
    #[must_use]
    pub fn orthonormal_factor(&self) -> Option<Self> {
        let threshold = SINGULAR_EPSILON * self.norm().max(1.0);
        match self.to_real_dmatrix() {
            Some(matrix) => {
                let qr = matrix.qr();
                if qr.r().diagonal().iter().any(|d| d.abs() <= threshold) {
                    return None;
                }
                Some(Self::from_real_dmatrix(&qr.q()))
            },
            None => {
                let qr = self.to_complex_dmatrix().qr();
                if qr.r().diagonal().iter().any(|d| d.norm() <= threshold) {
                    return None;
                }
                Some(Self::from_complex_dmatrix(&qr.q()))
            },
        }
    }

    fn to_real_dmatrix(&self) -> Option<DMatrix<f64>> {
        let data = self.data.iter().map(|s| s.as_real()).collect::<Option<Vec<_>>>()?;
        Some(DMatrix::from_row_slice(self.shape[0], self.shape[1], &data))
    }

    fn to_complex_dmatrix(&self) -> DMatrix<Complex64> {
        let data: Vec<Complex64> = self.data.iter().map(|s| s.to_complex()).collect();
        DMatrix::from_row_slice(self.shape[0], self.shape[1], &data)
    }

    // nalgebra stores columns contiguously; the transpose yields our row order.
    fn from_real_dmatrix(matrix: &DMatrix<f64>) -> Self {
        Self { shape: vec![matrix.nrows(), matrix.ncols()],
               data:  matrix.transpose().iter().map(|&x| Scalar::Real(x)).collect(), }
    }

    fn from_complex_dmatrix(matrix: &DMatrix<Complex64>) -> Self {
        Self { shape: vec![matrix.nrows(), matrix.ncols()],
               data:  matrix.transpose().iter().map(|&z| Scalar::Complex(z)).collect(), }
    }

    /// Raises a square matrix to a non-negative integer power by repeated
    /// squaring.
    #[must_use]
    pub fn matrix_power(&self, mut exponent: u64) -> Self {
        let mut result = Self::identity(self.shape[0]);
        let mut base = self.clone();
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.matmul(&base);
            }
            exponent >>= 1;
            if exponent > 0 {
                base = base.matmul(&base);
            }
        }
        result
    }

    /// Cross product of two 3-vectors.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        let (a, b) = (&self.data, &other.data);
        let data = vec![a[1] * b[2] - a[2] * b[1],
                        a[2] * b[0] - a[0] * b[2],
                        a[0] * b[1] - a[1] * b[0]];
        Self { shape: vec![3],
               data }
    }

    /// Rescales the array so that its Frobenius norm equals `target`.
    ///
    /// A zero array is returned unchanged.
    #[must_use]
    pub fn with_norm(&self, target: f64) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            return self.clone();
        }
        let factor = Scalar::Real(target / norm);
        self.map(|s| s * factor)
    }
}
