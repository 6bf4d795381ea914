use crate::{error::ParseError, util::text::pluralize};

/// Marker placed before each offending bracket in error messages.
pub const HIGHLIGHT_OPEN: &str = r#"<span class="math-highlight">"#;
/// Marker placed after each offending bracket in error messages.
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// The bracket families recognised by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    Parenthesis,
    SquareBracket,
    CurlyBrace,
}

impl BracketKind {
    const ALL: [Self; 3] = [Self::Parenthesis, Self::SquareBracket, Self::CurlyBrace];

    const fn opening(c: char) -> Option<Self> {
        match c {
            '(' => Some(Self::Parenthesis),
            '[' => Some(Self::SquareBracket),
            '{' => Some(Self::CurlyBrace),
            _ => None,
        }
    }

    const fn closing(c: char) -> Option<Self> {
        match c {
            ')' => Some(Self::Parenthesis),
            ']' => Some(Self::SquareBracket),
            '}' => Some(Self::CurlyBrace),
            _ => None,
        }
    }

    const fn singular(self) -> &'static str {
        match self {
            Self::Parenthesis => "parenthesis",
            Self::SquareBracket => "square bracket",
            Self::CurlyBrace => "curly brace",
        }
    }

    const fn plural(self) -> &'static str {
        match self {
            Self::Parenthesis => "parentheses",
            Self::SquareBracket => "square brackets",
            Self::CurlyBrace => "curly braces",
        }
    }
}

/// Checks that every bracket in `text` is opened and closed in a properly
/// nested order.
///
/// Scans left to right with a stack of open brackets. The first closer with
/// nothing to close, or a closer of the wrong kind, fails immediately.
/// Otherwise every bracket left open at the end is reported together, with a
/// count per bracket kind.
///
/// # Errors
/// Returns [`ParseError::UnbalancedBrackets`] whose message embeds `text` with
/// each offending bracket wrapped in [`HIGHLIGHT_OPEN`] and
/// [`HIGHLIGHT_CLOSE`].
///
/// # Example
/// ```
/// use mathgrader::{error::ParseError, interpreter::brackets::validate_brackets};
///
/// assert!(validate_brackets("[(1+2)*3, sin(x)]").is_ok());
///
/// let err = validate_brackets("(1+(2)").unwrap_err();
/// assert!(err.to_string().contains("1 parenthesis was opened without being closed"));
/// ```
pub fn validate_brackets(text: &str) -> Result<(), ParseError> {
    let mut stack: Vec<(BracketKind, usize)> = Vec::new();

    for (position, c) in text.chars().enumerate() {
        if let Some(kind) = BracketKind::opening(c) {
            stack.push((kind, position));
        } else if let Some(kind) = BracketKind::closing(c) {
            match stack.pop() {
                None => {
                    let message = format!("Invalid Input: a {} was closed without ever being opened, highlighted below.\n{}",
                                          kind.singular(),
                                          highlight(text, &[position]));
                    return Err(ParseError::UnbalancedBrackets { message,
                                                                positions: vec![position] });
                },
                Some((open_kind, open_position)) if open_kind != kind => {
                    let positions = vec![open_position, position];
                    let message = format!("Invalid Input: a {} was opened and then closed by a {}, highlighted below.\n{}",
                                          open_kind.singular(),
                                          kind.singular(),
                                          highlight(text, &positions));
                    return Err(ParseError::UnbalancedBrackets { message, positions });
                },
                Some(_) => {},
            }
        }
    }

    if stack.is_empty() {
        return Ok(());
    }

    let positions = stack.iter().map(|(_, p)| *p).collect::<Vec<_>>();
    let mut lines = Vec::new();
    for kind in BracketKind::ALL {
        let count = stack.iter().filter(|(k, _)| *k == kind).count();
        if count > 0 {
            lines.push(format!("{count} {} {} opened without being closed",
                               pluralize(count, kind.singular(), kind.plural()),
                               pluralize(count, "was", "were")));
        }
    }
    let message = format!("Invalid Input: {}, highlighted below.\n{}",
                          lines.join(" and "),
                          highlight(text, &positions));

    Err(ParseError::UnbalancedBrackets { message, positions })
}

/// Wraps the characters at `positions` in highlight markers.
fn highlight(text: &str, positions: &[usize]) -> String {
    let mut out = String::with_capacity(text.len() + positions.len() * 40);
    for (position, c) in text.chars().enumerate() {
        if positions.contains(&position) {
            out.push_str(HIGHLIGHT_OPEN);
            out.push(c);
            out.push_str(HIGHLIGHT_CLOSE);
        } else {
            out.push(c);
        }
    }
    out
}
