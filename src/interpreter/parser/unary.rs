use std::{collections::BTreeSet, iter::Peekable};

use crate::{
    ast::Expr,
    interpreter::{
        lexer::Token,
        parser::{
            core::{SyntaxError, SyntaxResult, parse_expression},
            utils::{expect_token, parse_comma_separated},
        },
    },
};

/// Parses zero or more leading minus signs applied to a power.
///
/// An odd number of signs negates the operand and an even number leaves it
/// unchanged. Only `-` may appear in the run; `-+x` is rejected when the atom
/// parser meets the `+`.
///
/// Grammar:
/// ```text
///     negation := "-"* power
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
/// - `suffixes`: Names allowed directly after a number.
///
/// # Returns
/// An [`Expr::Negation`] when at least one sign was present, otherwise the
/// power itself.
pub(crate) fn parse_negation<'a, I>(tokens: &mut Peekable<I>,
                                    suffixes: &BTreeSet<String>)
                                    -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut count = 0;
    while let Some((Token::Minus, _)) = tokens.peek() {
        tokens.next();
        count += 1;
    }

    let operand = parse_power(tokens, suffixes)?;
    if count == 0 {
        return Ok(operand);
    }

    Ok(Expr::Negation { count,
                        operand: Box::new(operand) })
}

/// Parses a right-associative exponentiation chain.
///
/// Each `^` may be directly followed by a single `-`, which negates everything
/// to its right: `a^-b^c` means `a^(-(b^c))`.
///
/// Grammar:
/// ```text
///     power := atom ("^" "-"? atom)*
/// ```
pub(crate) fn parse_power<'a, I>(tokens: &mut Peekable<I>,
                                 suffixes: &BTreeSet<String>)
                                 -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut operands = vec![parse_atom(tokens, suffixes)?];
    let mut negations = Vec::new();

    while let Some((Token::Caret, _)) = tokens.peek() {
        tokens.next();
        let negated = matches!(tokens.peek(), Some((Token::Minus, _)));
        if negated {
            tokens.next();
        }
        negations.push(negated);
        operands.push(parse_atom(tokens, suffixes)?);
    }

    if negations.is_empty() {
        return Ok(operands.remove(0));
    }

    Ok(Expr::Power { operands, negations })
}

/// Parses an atom, the highest precedence level.
///
/// Atoms are numbers (with an optional suffix), variables, function calls,
/// parenthesized expressions and array literals. Unary operators are handled
/// by the levels above.
///
/// Grammar (simplified):
/// ```text
///     atom := number suffix?
///           | name "(" expression ("," expression)* ")"
///           | name
///           | "(" expression ")"
///           | "[" expression ("," expression)* "]"
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of an atom.
/// - `suffixes`: Names allowed directly after a number.
///
/// # Returns
/// The parsed atom or a [`SyntaxError`] on failure.
pub(crate) fn parse_atom<'a, I>(tokens: &mut Peekable<I>,
                                suffixes: &BTreeSet<String>)
                                -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let peeked = tokens.peek()
                       .ok_or_else(|| SyntaxError::end_of_input("a number, name or bracket"))?;

    match peeked {
        (Token::Number(_), _) => parse_number(tokens, suffixes),
        (Token::Name(_), _) => parse_name_or_call(tokens, suffixes),
        (Token::LParen, _) => parse_parentheses(tokens, suffixes),
        (Token::LBracket, _) => parse_array_literal(tokens, suffixes),
        (tok, offset) => Err(SyntaxError::at(format!("unexpected token {tok:?}"), *offset)),
    }
}

/// Parses a numeric literal and an optional suffix.
///
/// A name or `%` directly after the number is consumed as a suffix only when
/// it appears in `suffixes`; otherwise it is left in the stream, where it
/// later causes a trailing-token error.
fn parse_number<'a, I>(tokens: &mut Peekable<I>, suffixes: &BTreeSet<String>) -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let value = match tokens.next() {
        Some((Token::Number(v), _)) => *v,
        Some((tok, offset)) => {
            return Err(SyntaxError::at(format!("expected number, found {tok:?}"), *offset));
        },
        None => return Err(SyntaxError::end_of_input("a number")),
    };

    let suffix = match tokens.peek() {
        Some((Token::Name(name), _)) if suffixes.contains(name) => Some(name.clone()),
        Some((Token::Percent, _)) if suffixes.contains("%") => Some("%".to_string()),
        _ => None,
    };
    if suffix.is_some() {
        tokens.next();
    }

    Ok(Expr::Number { value, suffix })
}

/// Parses a variable reference or a function call.
///
/// A name followed by `(` is a call, which requires at least one argument;
/// `f()` is a syntax error.
fn parse_name_or_call<'a, I>(tokens: &mut Peekable<I>,
                             suffixes: &BTreeSet<String>)
                             -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = match tokens.next() {
        Some((Token::Name(name), _)) => name.clone(),
        Some((tok, offset)) => {
            return Err(SyntaxError::at(format!("expected name, found {tok:?}"), *offset));
        },
        None => return Err(SyntaxError::end_of_input("a name")),
    };

    let Some((Token::LParen, _)) = tokens.peek() else {
        return Ok(Expr::Variable { name });
    };
    tokens.next();

    let arguments = parse_comma_separated(tokens,
                                          |t| parse_expression(t, suffixes),
                                          &Token::RParen)?;

    Ok(Expr::Function { name, arguments })
}

/// Parses an expression in parentheses, keeping the grouping in the tree.
fn parse_parentheses<'a, I>(tokens: &mut Peekable<I>,
                            suffixes: &BTreeSet<String>)
                            -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_token(tokens, &Token::LParen)?;
    let inner = parse_expression(tokens, suffixes)?;
    expect_token(tokens, &Token::RParen)?;

    Ok(Expr::Parentheses { inner: Box::new(inner) })
}

/// Parses an array literal of the form `[expr1, expr2, ..., exprN]`.
///
/// At least one element is required. Nesting produces matrices and tensors;
/// whether the rows agree in shape is checked during evaluation.
fn parse_array_literal<'a, I>(tokens: &mut Peekable<I>,
                              suffixes: &BTreeSet<String>)
                              -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_token(tokens, &Token::LBracket)?;
    let elements = parse_comma_separated(tokens,
                                         |t| parse_expression(t, suffixes),
                                         &Token::RBracket)?;

    Ok(Expr::Array { elements })
}
