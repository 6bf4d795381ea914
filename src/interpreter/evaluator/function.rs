/// The [`core::MathFunction`] type, arity checks and the default function
/// table.
pub mod core;

/// Per-argument shape validation with aggregated error reporting.
pub mod domain;

/// Elementwise scalar functions: trigonometric, hyperbolic, their inverses and
/// reciprocals, roots, logarithms and `abs`.
///
/// Each stays real inside its real domain and switches to the principal
/// complex value outside it.
pub mod builtin;

/// The gamma-based factorial for real and complex arguments.
pub mod special;

/// Functions of vectors and matrices: `det`, `trace`, `trans`, `ctrans`,
/// `cross` and `norm`.
pub mod array;
