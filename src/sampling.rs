/// Sampling sets for single numbers: intervals, integer ranges, discrete
/// sets and complex regions.
pub mod scalar;

/// Sampling sets for vectors and matrices, including constrained square,
/// orthogonal and unitary matrices.
pub mod array;

/// Random and specific functions for function names.
pub mod function;

/// Variables computed from other variables of the same sample.
pub mod dependent;

/// The per-check [`core::SamplingPlan`] that turns sampling sets into one
/// fresh scope per sample.
pub mod core;
