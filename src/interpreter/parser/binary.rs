use std::{collections::BTreeSet, iter::Peekable};

use crate::{
    ast::{Expr, ProductOperator, SumOperator},
    interpreter::{
        lexer::Token,
        parser::{
            core::{SyntaxError, SyntaxResult},
            unary::parse_negation,
        },
    },
};

/// Parses addition and subtraction chains.
///
/// Handles an optional leading `+` followed by left-associative `+` and `-`.
/// After a binary operator at most one unary minus may follow, so `1--1` is
/// accepted while `1---1` and `1-+1` are rejected.
///
/// The rule is: `sum := "+"? product (("+" | "-") product)*`
///
/// # Parameters
/// - `tokens`: Token stream with offsets.
/// - `suffixes`: Names allowed directly after a number.
///
/// # Returns
/// An `Expr::Sum`, or the single operand when no operator occurs.
pub fn parse_sum<'a, I>(tokens: &mut Peekable<I>, suffixes: &BTreeSet<String>) -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let leading_plus = matches!(tokens.peek(), Some((Token::Plus, _)));
    if leading_plus {
        tokens.next();
    }

    let mut operands = vec![parse_product(tokens, suffixes)?];
    let mut operators = Vec::new();

    loop {
        let op = match tokens.peek() {
            Some((Token::Plus, _)) => SumOperator::Add,
            Some((Token::Minus, _)) => SumOperator::Subtract,
            _ => break,
        };
        tokens.next();
        check_signs_after_operator(tokens)?;
        operators.push(op);
        operands.push(parse_product(tokens, suffixes)?);
    }

    if operators.is_empty() && !leading_plus {
        return Ok(operands.remove(0));
    }

    Ok(Expr::Sum { leading_plus,
                   operands,
                   operators })
}

/// Rejects runs of signs after a binary `+` or `-`.
///
/// Looks ahead on a clone of the iterator so that no token is consumed.
fn check_signs_after_operator<'a, I>(tokens: &Peekable<I>) -> SyntaxResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut lookahead = tokens.clone();
    match (lookahead.next(), lookahead.next()) {
        (Some((Token::Plus, offset)), _) => {
            Err(SyntaxError::at("'+' cannot follow a binary operator", *offset))
        },
        (Some((Token::Minus, _)), Some((Token::Minus | Token::Plus, offset))) => {
            Err(SyntaxError::at("too many consecutive signs", *offset))
        },
        _ => Ok(()),
    }
}

/// Parses multiplication and division chains.
///
/// The rule is: `product := parallel (("*" | "/") parallel)*`
///
/// # Parameters
/// - `tokens`: Token stream with offsets.
/// - `suffixes`: Names allowed directly after a number.
///
/// # Returns
/// An `Expr::Product`, or the single operand when no operator occurs.
pub fn parse_product<'a, I>(tokens: &mut Peekable<I>,
                            suffixes: &BTreeSet<String>)
                            -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut operands = vec![parse_parallel(tokens, suffixes)?];
    let mut operators = Vec::new();

    loop {
        let op = match tokens.peek() {
            Some((Token::Star, _)) => ProductOperator::Multiply,
            Some((Token::Slash, _)) => ProductOperator::Divide,
            _ => break,
        };
        tokens.next();
        operators.push(op);
        operands.push(parse_parallel(tokens, suffixes)?);
    }

    if operators.is_empty() {
        return Ok(operands.remove(0));
    }

    Ok(Expr::Product { operands, operators })
}

/// Parses chains of the parallel-resistor operator `||`.
///
/// The rule is: `parallel := negation ("||" negation)*`
pub fn parse_parallel<'a, I>(tokens: &mut Peekable<I>,
                             suffixes: &BTreeSet<String>)
                             -> SyntaxResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut operands = vec![parse_negation(tokens, suffixes)?];

    while let Some((Token::DoublePipe, _)) = tokens.peek() {
        tokens.next();
        operands.push(parse_negation(tokens, suffixes)?);
    }

    if operands.len() == 1 {
        return Ok(operands.remove(0));
    }

    Ok(Expr::Parallel { operands })
}
