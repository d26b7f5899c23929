//! Generic "first match" / "all matches" helpers used by every stage.
//!
//! When a pattern has a capture group, group 1 is the value; otherwise the
//! whole match is. Values are trimmed of spaces and sentinels and empty
//! values are discarded.

use std::collections::BTreeSet;

use regex::{Captures, Regex};

use super::is_padding;

fn value<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().trim_matches(is_padding))
        .filter(|v| !v.is_empty())
}

/// First non-empty match of `re` in `text`.
pub fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .find_map(|caps| value(&caps).map(str::to_string))
}

/// All non-empty matches, deduplicated.
pub fn all_matches(re: &Regex, text: &str) -> BTreeSet<String> {
    re.captures_iter(text)
        .filter_map(|caps| value(&caps).map(str::to_string))
        .collect()
}

/// All non-empty matches in order of appearance, duplicates kept.
pub fn all_matches_ordered(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| value(&caps).map(str::to_string))
        .collect()
}
