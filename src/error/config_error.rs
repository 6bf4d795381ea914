use thiserror::Error;

/// Result type for configuration validation and author-side failures.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors caused by the problem configuration, never by the student.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
    /// A sampling set is malformed.
    #[error("Invalid sampling set for '{name}': {message}")]
    SamplingSet {
        /// Variable or function the set belongs to.
        name:    String,
        /// Description of the problem.
        message: String,
    },
    /// Dependent variables depend on each other in a cycle.
    #[error("Circular dependency in dependent variables: {}", .names.join(", "))]
    CircularDependency {
        /// Variables that could not be resolved.
        names: Vec<String>,
    },
    /// A formula written by the author could not be parsed.
    #[error("Invalid expression '{expression}' in configuration: {message}")]
    InvalidExpression {
        /// The formula.
        expression: String,
        /// Underlying parse message.
        message:    String,
    },
    /// A reference formula failed to evaluate against a sample.
    #[error("Error evaluating '{expression}' (a configuration formula): {message}")]
    ReferenceEvaluation {
        /// The formula.
        expression: String,
        /// Underlying evaluation message.
        message:    String,
    },
    /// A constrained sampler gave up after too many rejected draws.
    #[error("Unable to generate a sample for '{name}' after {attempts} attempts")]
    RetryLimit {
        /// Variable being sampled.
        name:     String,
        /// Number of draws attempted.
        attempts: usize,
    },
}

impl ConfigError {
    /// Builds a [`ConfigError::Invalid`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }

    /// Builds a [`ConfigError::SamplingSet`].
    pub fn sampling_set(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SamplingSet { name:    name.into(),
                            message: message.into(), }
    }
}
