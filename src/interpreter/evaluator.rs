/// Evaluation of the binary operator chains: sums, products and the parallel
/// operator, together with the array algebra behind them.
///
/// Handles scalar arithmetic, elementwise array arithmetic, dot and matrix
/// products, and matrix powers.
pub mod binary;

/// Negation and exponentiation chains.
pub mod unary;

/// Core evaluation logic: scopes, options, metadata and the [`core::Evaluator`]
/// entry point.
///
/// Contains the node dispatch and the rules for NaN and infinity.
pub mod core;

/// Name validation with suggestions, and the per-node checks shared by the
/// evaluation routines.
pub mod utils;

/// Function values and the default function library.
///
/// Handles arity and shape checks, and reframes arithmetic failures inside a
/// function as errors that name the function.
pub mod function;
