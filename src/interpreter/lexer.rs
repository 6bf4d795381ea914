use logos::Logos;

/// Represents a lexical token in a formula.
///
/// Whitespace is insignificant. Every other character must belong to one of
/// these tokens or lexing fails, which the parser reports as a formula that
/// could not be parsed.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// Numeric literal tokens, such as `3`, `3.`, `3.14`, `.5` or `2.1e-10`.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),
    /// Variable, function or suffix names.
    ///
    /// A name starts with a letter and continues either with letters, digits
    /// and underscores (`x_max`), or with a braced lower index and an optional
    /// braced upper index (`T_{ij}^{-1}`). The two forms cannot be mixed. Any
    /// number of trailing primes may follow (`f''`).
    #[regex(r"[a-zA-Z]([a-zA-Z0-9_]*|[a-zA-Z0-9]*(_\{-?[a-zA-Z0-9]+\})?(\^\{-?[a-zA-Z0-9]+\})?)'*",
            |lex| lex.slice().to_string())]
    Name(String),
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `^`
    #[token("^")]
    Caret,
    /// `||`
    #[token("||")]
    DoublePipe,
    /// `%`
    #[token("%")]
    Percent,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
}

/// Parses a numeric literal from the current token slice.
///
/// # Parameters
/// - `lex`: Reference to the Logos lexer at the current token.
///
/// # Returns
/// - `Some(f64)`: The parsed value. Literals too large for `f64` become
///   infinity and are caught later by the overflow check.
/// - `None`: If the slice is not a valid float.
fn parse_number(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Splits a formula into tokens paired with their byte offsets.
///
/// # Errors
/// Returns a description of the first unrecognised character sequence. The
/// description is meant for debug logging only.
///
/// # Example
/// ```
/// use mathgrader::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("2*x_{1}'").unwrap();
/// assert_eq!(tokens,
///            vec![(Token::Number(2.0), 0),
///                 (Token::Star, 1),
///                 (Token::Name("x_{1}'".to_string()), 2)]);
///
/// assert!(tokenize("2 # 3").is_err());
/// ```
pub fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, String> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(text);

    while let Some(token) = lexer.next() {
        match token {
            Ok(tok) => tokens.push((tok, lexer.span().start)),
            Err(()) => {
                return Err(format!("unrecognised input '{}' at offset {}",
                                   lexer.slice(),
                                   lexer.span().start));
            },
        }
    }

    Ok(tokens)
}
