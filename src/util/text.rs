/// Returns the English ordinal for a 1-based position: `1st`, `2nd`, `3rd`,
/// `4th`, ..., `11th`, `12th`, `13th`, `21st`.
///
/// # Example
/// ```
/// use mathgrader::util::text::ordinal;
///
/// assert_eq!(ordinal(1), "1st");
/// assert_eq!(ordinal(12), "12th");
/// assert_eq!(ordinal(22), "22nd");
/// ```
#[must_use]
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Chooses between the singular and plural form of a noun.
#[must_use]
pub const fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Finds every candidate equal to `name` ignoring ASCII case, excluding an
/// exact match.
///
/// Results are returned sorted so that messages built from them are stable.
///
/// # Example
/// ```
/// use mathgrader::util::text::case_insensitive_matches;
///
/// let names = ["x", "y", "Sin"];
/// assert_eq!(case_insensitive_matches("X", names), vec!["x".to_string()]);
/// assert_eq!(case_insensitive_matches("sin", names), vec!["Sin".to_string()]);
/// assert!(case_insensitive_matches("x", names).is_empty());
/// ```
pub fn case_insensitive_matches<'a, I>(name: &str, candidates: I) -> Vec<String>
    where I: IntoIterator<Item = &'a str>
{
    let mut found = candidates.into_iter()
                              .filter(|c| *c != name && c.eq_ignore_ascii_case(name))
                              .map(str::to_string)
                              .collect::<Vec<_>>();
    found.sort();
    found.dedup();
    found
}

/// Removes every whitespace character from `text`.
#[must_use]
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
