use thiserror::Error;

use crate::error::ParseError;

/// Result type used by the evaluator and everything that evaluates formulas.
pub type MathResult<T> = Result<T, MathError>;

/// Student-facing evaluation errors.
///
/// The `Display` output of every variant is intended to be shown verbatim to
/// whoever typed the formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// The formula could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A variable name is not available in the evaluation scope.
    #[error("{message}")]
    UndefinedVariable {
        /// The offending name.
        name:    String,
        /// Full message, including any suggestions.
        message: String,
    },
    /// A function name is not available in the evaluation scope.
    #[error("{message}")]
    UndefinedFunction {
        /// The offending name.
        name:    String,
        /// Full message, including any suggestions.
        message: String,
    },
    /// A numeric suffix is not available in the evaluation scope.
    #[error("Invalid Input: {name} not permitted directly after a number")]
    UndefinedSuffix {
        /// The offending suffix.
        name: String,
    },
    /// A function received the wrong number of arguments.
    #[error("Wrong number of arguments passed to {name}(...): Expected {expected} inputs, but received {received}.")]
    ArgumentCount {
        /// Function name.
        name:     String,
        /// Declared arity.
        expected: usize,
        /// Number of arguments supplied.
        received: usize,
    },
    /// A function or operator was applied outside of its domain.
    #[error("{message}")]
    Domain {
        /// Human readable description.
        message: String,
    },
    /// Array operands have incompatible shapes.
    #[error("{message}")]
    Shape {
        /// Human readable description, naming both shapes.
        message: String,
    },
    /// A value overflowed to infinity.
    #[error("Numerical overflow occurred. Does your expression generate very large numbers?")]
    Overflow,
    /// A division by zero, or zero raised to a negative power.
    #[error("Division by zero occurred. Check your input's denominators.")]
    ZeroDivision,
    /// The input violates a policy, such as a forbidden function.
    #[error("{message}")]
    InvalidInput {
        /// Human readable description.
        message: String,
    },
    /// Numerical integration failed or produced an unreliable result.
    #[error("{message}")]
    Integration {
        /// Human readable description.
        message: String,
    },
    /// A summation was set up incorrectly.
    #[error("{message}")]
    Summation {
        /// Human readable description.
        message: String,
    },
}

impl MathError {
    /// Builds a [`MathError::Domain`].
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain { message: message.into() }
    }

    /// Builds a [`MathError::Shape`].
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape { message: message.into() }
    }

    /// Builds a [`MathError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Builds a [`MathError::Integration`].
    pub fn integration(message: impl Into<String>) -> Self {
        Self::Integration { message: message.into() }
    }

    /// Builds a [`MathError::Summation`].
    pub fn summation(message: impl Into<String>) -> Self {
        Self::Summation { message: message.into() }
    }

    /// Reframes an error raised inside a function body so that it names the
    /// function.
    ///
    /// Arithmetic failures become domain errors mentioning `name`; errors that
    /// already describe the problem precisely pass through unchanged.
    #[must_use]
    pub fn within_function(self, name: &str) -> Self {
        match self {
            Self::ZeroDivision => Self::domain(format!(
                "There was an error evaluating function {name}(...). Its input does not seem to be in its domain."
            )),
            Self::Overflow => Self::domain(format!(
                "There was an error evaluating function {name}(...). (Numerical overflow)."
            )),
            other => other,
        }
    }
}
