use thiserror::Error;

/// Result type used by the lexer, bracket validator and parser.
pub type ParseResult<T> = Result<T, ParseError>;

/// Represents all errors that can occur before a formula is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The formula does not match the grammar.
    ///
    /// The message is deliberately generic; the precise cause is logged at
    /// debug level by the parser.
    #[error("Invalid Input: Could not parse '{formula}' as a formula")]
    CouldNotParse {
        /// The formula exactly as it was submitted.
        formula: String,
    },
    /// Brackets are not correctly nested or closed.
    #[error("{message}")]
    UnbalancedBrackets {
        /// Human readable description, including the highlighted formula.
        message:   String,
        /// Character offsets of every offending bracket.
        positions: Vec<usize>,
    },
}

impl ParseError {
    /// Builds a [`ParseError::CouldNotParse`] for the given formula.
    pub fn could_not_parse(formula: impl Into<String>) -> Self {
        Self::CouldNotParse { formula: formula.into() }
    }
}
