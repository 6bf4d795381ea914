use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{
    ast::{Expr, UsedNames},
    error::ParseResult,
    interpreter::{brackets::validate_brackets, parser::core::parse_formula},
    util::text::strip_whitespace,
};

/// A successfully parsed formula together with the names it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    /// The formula with all whitespace removed.
    pub text:  String,
    /// The parse tree.
    pub tree:  Expr,
    /// Variables, functions and suffixes appearing in the tree.
    pub names: UsedNames,
}

type CacheKey = (String, Vec<String>);

/// A thread-safe cache of parsed formulas.
///
/// Keys are the whitespace-stripped formula together with the sorted suffix
/// names it was parsed under, since the suffix set changes how a formula
/// parses. Failed parses are not stored.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: RwLock<HashMap<CacheKey, Arc<ParsedExpression>>>,
}

impl ParseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `formula`, returning a cached tree when one exists.
    ///
    /// Two calls with formulas that differ only in whitespace, under the same
    /// suffix set, return the same shared tree.
    ///
    /// # Example
    /// ```
    /// use std::{collections::BTreeSet, sync::Arc};
    ///
    /// use mathgrader::interpreter::cache::ParseCache;
    ///
    /// let cache = ParseCache::new();
    /// let suffixes = BTreeSet::new();
    /// let a = cache.parse("x + 1", &suffixes).unwrap();
    /// let b = cache.parse("x+1", &suffixes).unwrap();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn parse(&self,
                 formula: &str,
                 suffixes: &BTreeSet<String>)
                 -> ParseResult<Arc<ParsedExpression>> {
        let text = strip_whitespace(formula);
        let key = (text, suffixes.iter().cloned().collect::<Vec<_>>());

        if let Some(hit) = self.entries.read().get(&key) {
            log::debug!("parse cache hit for '{}'", key.0);
            return Ok(Arc::clone(hit));
        }

        log::debug!("parse cache miss for '{}'", key.0);
        validate_brackets(formula)?;
        let tree = parse_formula(&key.0, suffixes)?;
        let names = tree.used_names();
        let parsed = Arc::new(ParsedExpression { text: key.0.clone(),
                                                 tree,
                                                 names });

        let mut entries = self.entries.write();
        let stored = entries.entry(key).or_insert(parsed);
        Ok(Arc::clone(stored))
    }

    /// Number of cached formulas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every cached formula.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
