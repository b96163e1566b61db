/// Alias registry
///
/// Maps symbolic placeholder tokens (`<int>`, `<word>`, ...) to the regex
/// fragments they expand to inside a route pattern. Tokens are looked up in
/// the *escaped* pattern text and replaced in a single pass, so a fragment
/// that was just substituted is never scanned again for other tokens.
use crate::error::{Result, RouteError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;

/// The built-in placeholder set
pub const STANDARD_ALIASES: &[(&str, &str)] = &[
    ("<int>", r"([0-9\-]+)"),
    ("<float>", r"([0-9\.\-]+)"),
    ("<num>", r"([0-9\.\-,]*)"),
    ("<string>", r"([a-z0-9\-_]+)"),
    ("<page>", r"([0-9]*)/?([0-9]*)/?"),
    ("<path>", r"([a-z0-9\-_/]*)"),
    ("<word>", r"([^/]*)"),
];

/// Process-wide default table, built on first use and never mutated
pub static DEFAULT_ALIASES: Lazy<AliasTable> = Lazy::new(|| {
    AliasTable::new(STANDARD_ALIASES.iter().copied()).expect("standard alias tokens are valid")
});

/// Ordered set of (token, fragment) pairs with a prebuilt token matcher
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
    /// Escaped token text -> fragment
    by_escaped: HashMap<String, String>,
    matcher: Option<Regex>,
}

impl AliasTable {
    /// Builds a table from (token, fragment) pairs
    ///
    /// Tokens are lowercased, since patterns are lowercased before
    /// substitution. A later pair with the same token replaces the earlier one.
    pub fn new<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (token, fragment) in pairs {
            let token = token.as_ref().to_lowercase();
            if token.is_empty() {
                return Err(RouteError::InvalidAlias {
                    token,
                    reason: "token must not be empty".to_string(),
                });
            }
            let fragment = fragment.into();
            match entries.iter_mut().find(|(t, _)| *t == token) {
                Some(existing) => existing.1 = fragment,
                None => entries.push((token, fragment)),
            }
        }

        let by_escaped: HashMap<String, String> = entries
            .iter()
            .map(|(token, fragment)| (regex::escape(token), fragment.clone()))
            .collect();

        // Longest token first so overlapping tokens resolve to the most specific one
        let mut escaped: Vec<&String> = by_escaped.keys().collect();
        escaped.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let matcher = if escaped.is_empty() {
            None
        } else {
            let alternation = escaped
                .iter()
                .map(|token| regex::escape(token))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&alternation).map_err(|e| RouteError::InvalidAlias {
                token: alternation.clone(),
                reason: e.to_string(),
            })?;
            Some(regex)
        };

        Ok(Self {
            entries,
            by_escaped,
            matcher,
        })
    }

    /// A table with no tokens: patterns compile as plain literals
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            by_escaped: HashMap::new(),
            matcher: None,
        }
    }

    /// Returns a copy of this table with `extra` pairs layered on top
    pub fn extended<I, K, V>(&self, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let extra: Vec<(String, String)> = extra
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();
        Self::new(self.entries.iter().cloned().chain(extra))
    }

    /// Fragment registered for `token`
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, fragment)| fragment.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates (token, fragment) in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(token, fragment)| (token.as_str(), fragment.as_str()))
    }

    /// Replaces every token occurring in an already-escaped pattern
    pub fn expand<'p>(&self, escaped_pattern: &'p str) -> Cow<'p, str> {
        match &self.matcher {
            Some(matcher) => matcher.replace_all(escaped_pattern, |caps: &Captures<'_>| {
                self.by_escaped
                    .get(&caps[0])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            }),
            None => Cow::Borrowed(escaped_pattern),
        }
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        DEFAULT_ALIASES.clone()
    }
}
