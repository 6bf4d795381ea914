/// Scalar numbers.
///
/// Defines `Scalar`, a real or complex number. Real arithmetic stays real for
/// precision and promotes to complex only when an operation leaves the real
/// domain, such as a negative base raised to a fractional power.
pub mod scalar;
/// Rectangular arrays.
///
/// Defines `MathArray`, an owned row-major buffer plus a shape, together with
/// the linear algebra the evaluator needs: products, determinants, inverses
/// and transposes.
pub mod array;
/// Shape descriptions.
///
/// Produces the exact phrases used in shape error messages, such as
/// `vector of length 3` or `matrix of shape (rows: 2, cols: 3)`.
pub mod shape;

/// The `Value` enum and its conversions.
pub mod core;
