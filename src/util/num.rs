/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INT: u64 = 9_007_199_254_740_991;

/// Converts an `f64` to `i64` if the value is finite, integral and exactly
/// representable.
///
/// ## Parameters
/// - `value`: The floating-point value to convert.
///
/// ## Returns
/// - `Some(i64)`: The converted value.
/// - `None`: If the value is non-finite, fractional or too large.
///
/// ## Example
/// ```
/// use mathgrader::util::num::f64_to_i64_exact;
///
/// assert_eq!(f64_to_i64_exact(-12.0), Some(-12));
/// assert_eq!(f64_to_i64_exact(1.5), None);
/// assert_eq!(f64_to_i64_exact(f64::INFINITY), None);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn f64_to_i64_exact(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > MAX_SAFE_INT as f64 {
        return None;
    }
    Some(value as i64)
}

/// Converts a `usize` to `f64`.
///
/// Shapes and counts handled by this crate are far below `2^53`, so the
/// conversion is exact in practice; values above that bound saturate to the
/// nearest representable float.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Converts an `i64` to `f64`.
///
/// Exact for magnitudes up to [`MAX_SAFE_INT`]; callers validate their ranges
/// against that bound first.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn i64_to_f64(value: i64) -> f64 {
    value as f64
}

/// Returns `true` when `value` is a finite whole number.
#[must_use]
pub fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}
