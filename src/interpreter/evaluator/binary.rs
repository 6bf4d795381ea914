/// Evaluation of sum, product and parallel chains.
pub mod core;

/// Addition, subtraction and negation of values of any shape.
pub mod array;

/// Multiplication and division, including dot and matrix products.
pub mod matmul;

/// Exponentiation of scalars, matrices and identity multiples.
pub mod power;
