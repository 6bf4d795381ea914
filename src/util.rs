/// Numeric conversion helpers.
///
/// Safe conversions between `f64` and the integer types used for shapes,
/// exponents and summation bounds. Conversions that could lose information
/// return `None` instead of truncating silently.
pub mod num;
/// Text helpers for user-facing messages.
///
/// Ordinals, pluralisation and the case-insensitive "did you mean" lookup
/// used when a formula refers to an unknown name.
pub mod text;
