/// Pattern compilation for route items
///
/// Turns a declared path pattern such as `/post/<int>` into an anchored,
/// case-insensitive regular expression. The compiled expression text doubles
/// as the rule key used to order and identify route items inside a node.
use crate::alias::{AliasTable, DEFAULT_ALIASES};
use crate::error::{Result, RouteError};
use crate::path::normalize_prefix;
use regex::{Regex, RegexBuilder};

/// Trailing group appended for wildcard continuation
const WILDCARD_GROUP: &str = "(.*)?";

/// A route pattern compiled into its matching expression
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Declared pattern after lowercasing and trailing-slash removal
    raw: String,
    /// Expression text, also the rule key
    rule: String,
    regex: Regex,
    wildcard: bool,
}

/// Compiles `raw` against the process-wide alias table
///
/// # Examples
///
/// ```
/// use docx_router::pattern::compile;
///
/// let pattern = compile("/post/<int>", false).unwrap();
/// assert_eq!(pattern.rule(), r"^/post/([0-9\-]+)/?$");
/// assert!(pattern.captures("/post/42/").is_some());
/// assert!(pattern.captures("/post/abc/").is_none());
/// ```
pub fn compile(raw: &str, wildcard: bool) -> Result<CompiledPattern> {
    compile_with(&DEFAULT_ALIASES, raw, wildcard)
}

/// Compiles `raw` using the given alias table
///
/// Steps: normalize (lowercase, strip trailing `/`), escape metacharacters,
/// substitute alias tokens in one pass, then anchor with an optional trailing
/// slash and, if requested, a wildcard continuation group.
pub fn compile_with(aliases: &AliasTable, raw: &str, wildcard: bool) -> Result<CompiledPattern> {
    let raw = normalize_prefix(raw);
    let escaped = regex::escape(&raw);
    let body = aliases.expand(&escaped);

    let rule = format!(
        "^{}/?{}$",
        body,
        if wildcard { WILDCARD_GROUP } else { "" }
    );

    let regex = RegexBuilder::new(&rule)
        .case_insensitive(true)
        .build()
        .map_err(|source| RouteError::PatternCompile {
            pattern: raw.clone(),
            source,
        })?;

    Ok(CompiledPattern {
        raw,
        rule,
        regex,
        wildcard,
    })
}

impl CompiledPattern {
    /// The normalized declared pattern
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The expression text; used as the sort and lookup key of the route item
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Matches a normalized path
    ///
    /// Returns the full matched text followed by the captured groups in
    /// pattern order. Groups that did not participate yield empty strings.
    pub fn captures<'p>(&self, path: &'p str) -> Option<(&'p str, Vec<String>)> {
        let caps = self.regex.captures(path)?;
        let consumed = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let args = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();
        Some((consumed, args))
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule
    }
}

impl Eq for CompiledPattern {}
