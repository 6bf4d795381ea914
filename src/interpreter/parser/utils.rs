use std::iter::Peekable;

use crate::interpreter::{
    lexer::Token,
    parser::core::{SyntaxError, SyntaxResult},
};

/// Parses a non-empty comma-separated list of items up to a closing token.
///
/// Shared by function argument lists and array literals. It repeatedly calls
/// `parse_item` and then expects either a comma, to continue the list, or the
/// closing token, to end it. An immediately encountered closing token is an
/// error: neither `f()` nor `[]` is valid.
///
/// Grammar (simplified): `list := item ("," item)*`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token that terminates the list (`)` or `]`).
///
/// # Returns
/// A vector of parsed items, never empty.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    parse_item: impl Fn(&mut Peekable<I>) -> SyntaxResult<T>,
    closing: &Token)
    -> SyntaxResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if let Some((tok, offset)) = tokens.peek()
       && tok == closing
    {
        return Err(SyntaxError::at("empty list", *offset));
    }

    let mut items = Vec::new();
    loop {
        items.push(parse_item(tokens)?);
        match tokens.next() {
            Some((Token::Comma, _)) => {},
            Some((tok, _)) if tok == closing => break,
            Some((tok, offset)) => {
                return Err(SyntaxError::at(format!("expected ',' or {closing:?}, found {tok:?}"),
                                           *offset));
            },
            None => return Err(SyntaxError::end_of_input(&format!("{closing:?}"))),
        }
    }
    Ok(items)
}

/// Consumes the next token, which must equal `expected`.
pub(in crate::interpreter::parser) fn expect_token<'a, I>(tokens: &mut Peekable<I>,
                                                          expected: &Token)
                                                          -> SyntaxResult<()>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((tok, _)) if tok == expected => Ok(()),
        Some((tok, offset)) => {
            Err(SyntaxError::at(format!("expected {expected:?}, found {tok:?}"), *offset))
        },
        None => Err(SyntaxError::end_of_input(&format!("{expected:?}"))),
    }
}
