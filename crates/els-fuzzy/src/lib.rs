//! Fuzzy matching used to rank and trim completion candidates.
//!
//! Matching is ASCII case-insensitive over UTF-8 bytes; template identifiers
//! (`foo-bar`, `Foo::Bar`, `this.model`, `@arg`) are ASCII in practice.

#![forbid(unsafe_code)]

mod scoring;

pub use scoring::{fuzzy_match, MatchKind, MatchScore};

/// Keep the `max_results` best matches of `query` among `items`.
///
/// `key` selects the string each item is matched on. With an empty query the
/// original order is kept and only truncated. Otherwise items are ordered by
/// descending rank; ties keep their original relative order.
pub fn filter<T>(
    items: impl IntoIterator<Item = T>,
    query: &str,
    key: impl Fn(&T) -> &str,
    max_results: usize,
) -> Vec<T> {
    if query.is_empty() {
        return items.into_iter().take(max_results).collect();
    }

    let mut scored: Vec<(MatchScore, T)> = items
        .into_iter()
        .filter_map(|item| fuzzy_match(query, key(&item)).map(|score| (score, item)))
        .collect();
    scored.sort_by(|(a, _), (b, _)| b.cmp(a));
    scored.truncate(max_results);
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_ranks_prefix_matches_first() {
        let items = vec!["x-foo", "foo-bar", "bar", "foo"];
        let out = filter(items, "foo", |s| s, 10);
        assert_eq!(out, vec!["foo", "foo-bar", "x-foo"]);
    }

    #[test]
    fn filter_truncates() {
        let items: Vec<String> = (0..100).map(|i| format!("item-{i}")).collect();
        assert_eq!(filter(items.clone(), "item", |s| s.as_str(), 40).len(), 40);
        assert_eq!(filter(items, "", |s| s.as_str(), 40).len(), 40);
    }

    #[test]
    fn empty_query_keeps_original_order() {
        let out = filter(vec!["b", "a", "c"], "", |s| s, 2);
        assert_eq!(out, vec!["b", "a"]);
    }
}
