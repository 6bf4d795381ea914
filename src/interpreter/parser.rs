/// Entry points and the syntax error type shared by the grammar levels.
pub mod core;

/// The left-associative operator levels: sums, products and the parallel
/// operator.
pub mod binary;

/// Negation, exponentiation chains and atoms: numbers, names, function calls,
/// parenthesized expressions and array literals.
pub mod unary;

/// Shared helpers for comma-separated lists and expected tokens.
pub mod utils;
