use std::{collections::BTreeSet, iter::Peekable};

use crate::{
    ast::Expr,
    error::{ParseError, ParseResult},
    interpreter::{
        lexer::{Token, tokenize},
        parser::binary::parse_sum,
    },
};

/// Internal description of why a formula failed to parse.
///
/// Never shown to students: [`parse_formula`] logs it and reports the generic
/// [`ParseError::CouldNotParse`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// What went wrong.
    pub detail: String,
    /// Byte offset of the offending token, when known.
    pub offset: Option<usize>,
}

impl SyntaxError {
    pub(crate) fn at(detail: impl Into<String>, offset: usize) -> Self {
        Self { detail: detail.into(),
               offset: Some(offset), }
    }

    pub(crate) fn end_of_input(expected: &str) -> Self {
        Self { detail: format!("unexpected end of input, expected {expected}"),
               offset: None, }
    }
}

/// Result type used by the individual grammar levels.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Parses a whitespace-free formula into an expression tree.
///
/// `suffixes` lists the names that may directly follow a number; any other
/// name after a number is a syntax error because multiplication must always
/// be written explicitly.
///
/// Bracket balance is expected to have been validated already.
///
/// # Errors
/// Returns [`ParseError::CouldNotParse`] naming the formula. The precise cause
/// is logged at debug level.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
///
/// use mathgrader::{ast::Expr, interpreter::parser::core::parse_formula};
///
/// let suffixes = BTreeSet::from(["%".to_string()]);
/// let tree = parse_formula("50%", &suffixes).unwrap();
/// assert_eq!(tree, Expr::Number { value:  50.0,
///                                 suffix: Some("%".to_string()), });
///
/// assert!(parse_formula("2x", &suffixes).is_err());
/// assert!(parse_formula("1---1", &suffixes).is_err());
/// ```
pub fn parse_formula(text: &str, suffixes: &BTreeSet<String>) -> ParseResult<Expr> {
    parse_tokens(text, suffixes).map_err(|e| {
                                    log::debug!("could not parse '{text}': {} (offset {:?})",
                                                e.detail,
                                                e.offset);
                                    ParseError::could_not_parse(text)
                                })
}

fn parse_tokens(text: &str, suffixes: &BTreeSet<String>) -> SyntaxResult<Expr> {
    let tokens = tokenize(text).map_err(|detail| SyntaxError { detail,
                                                                offset: None })?;
    if tokens.is_empty() {
        return Err(SyntaxError::end_of_input("a formula"));
    }

    let mut iter = tokens.iter().peekable();
    let expr = parse_expression(&mut iter, suffixes)?;

    match iter.next() {
        None => Ok(expr),
        Some((tok, offset)) => Err(SyntaxError::at(format!("unexpected trailing token {tok:?}"),
                                                   *offset)),
    }
}

/// Parses a full expression.
///
/// This is the entry point of the recursive descent. It begins at the lowest
/// precedence level, the sum, and descends through products, the parallel
/// operator, negation and exponentiation down to atoms.
///
/// Grammar: `expression := sum`
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, offset)` pairs.
/// - `suffixes`: Names allowed directly after a number.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>,
                               suffixes: &BTreeSet<String>)
                               -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_sum(tokens, suffixes)
}
