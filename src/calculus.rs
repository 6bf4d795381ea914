/// Adaptive Gauss-Kronrod quadrature of real functions, including infinite
/// intervals.
pub mod quadrature;

/// Evaluation of integration and summation limits.
pub mod limits;

/// Definite integrals of formulas.
pub mod integral;

/// Sums of formulas over integer ranges.
pub mod summation;
