/// Candidate ordering for greedy matching
///
/// Child prefixes and route rules are both tried in descending byte order of
/// their raw key. For keys sharing a prefix the longer one sorts first, which
/// approximates "most specific first" without being a true longest-prefix
/// match: `/b` is tried before `/abc`. Routing outcomes depend on this exact
/// order, so every sort goes through [`most_specific_first`].
use std::cmp::Ordering;

/// Comparator: greater keys first
pub fn most_specific_first(a: &str, b: &str) -> Ordering {
    b.cmp(a)
}

/// Sorts `entries` in place by their key, most specific first
pub(crate) fn sort_most_specific_first<T, F>(entries: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    entries.sort_by(|a, b| most_specific_first(key(a), key(b)));
}
