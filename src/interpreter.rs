/// Bracket validation run before a formula is tokenized.
///
/// Every opening `(`, `[` or `{` must be closed by the matching bracket. When
/// this fails, the error message carries a copy of the formula with the
/// offending brackets wrapped in highlight markup.
pub mod brackets;
/// The parse cache shared by every evaluation.
///
/// Parsing is pure, so a formula parsed once under a given suffix set can be
/// reused by later evaluations. The cache is safe to share between threads.
pub mod cache;
/// The evaluator walks a parsed tree and computes its value.
///
/// It resolves names against a [`evaluator::core::Scope`], applies scalar and
/// array arithmetic, calls functions and enforces the NaN and overflow rules.
///
/// # Responsibilities
/// - Validates referenced names and suggests corrections for typos.
/// - Performs scalar, vector, matrix and identity-multiple algebra.
/// - Provides the library of mathematical functions.
pub mod evaluator;
/// The lexer turns formula text into tokens.
///
/// Tokens are numbers, names (with optional subscripts, superscripts and
/// primes), operators and brackets. Whitespace is skipped.
pub mod lexer;
/// The parser builds an [`crate::ast::Expr`] tree from tokens.
///
/// # Responsibilities
/// - Implements operator precedence, including the parallel operator.
/// - Enforces the sign rules around `+` and `-`.
/// - Recognizes numeric suffixes from the active suffix set.
pub mod parser;
/// Runtime values: scalars, arrays and identity multiples.
pub mod value;
