/// Parsing errors.
///
/// Defines the failures raised before evaluation starts: unbalanced brackets
/// and formulas that do not match the grammar.
pub mod parse_error;
/// Evaluation errors.
///
/// Contains every student-facing failure that can occur while evaluating a
/// parsed formula, such as undefined names, shape mismatches, overflow or
/// division by zero. The display text of these errors is safe to show to the
/// person who typed the formula.
pub mod math_error;
/// Configuration errors.
///
/// Errors caused by the author of a problem rather than the student: invalid
/// sampling sets, circular dependent variables, reference answers that fail
/// to evaluate.
pub mod config_error;

pub use config_error::{ConfigError, ConfigResult};
pub use math_error::{MathError, MathResult};
pub use parse_error::{ParseError, ParseResult};

/// Error returned at the grading boundary.
///
/// Keeps the student's mistakes apart from problems in the check
/// configuration, so a host can show the former and log the latter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    /// The submitted expression could not be evaluated.
    #[error(transparent)]
    Student(#[from] MathError),
    /// The check itself is misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GradingError {
    /// Returns `true` when the message may be shown to the student verbatim.
    #[must_use]
    pub const fn is_student_facing(&self) -> bool {
        matches!(self, Self::Student(_))
    }
}
