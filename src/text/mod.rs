pub mod extract;
pub mod flatten;
pub mod stopwords;

pub use extract::{all_matches, all_matches_ordered, first_match};
pub use flatten::normalize;
pub use stopwords::Stopwords;

use regex::Regex;

use crate::error::{PipelineError, Result};

/// Reserved separator. Every run of control characters collapses into it and
/// every multi-valued field is joined with it.
///
/// Assumed never to occur in genuine scraped content; nothing upstream
/// guarantees that.
pub const SENTINEL: char = '¤';

/// Characters trimmed from both ends of every extracted token.
pub(crate) fn is_padding(c: char) -> bool {
    c == SENTINEL || c.is_whitespace()
}

/// Join non-empty tokens with the sentinel. `None` when nothing is left.
pub fn join<I, S>(tokens: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for token in tokens {
        let token = token.as_ref().trim_matches(is_padding);
        if token.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(SENTINEL);
        }
        out.push_str(token);
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Split a sentinel-joined string back into trimmed, non-empty tokens.
pub fn split(joined: &str) -> impl Iterator<Item = &str> {
    joined
        .split(SENTINEL)
        .map(|t| t.trim_matches(is_padding))
        .filter(|t| !t.is_empty())
}

/// Longest-first alternation of escaped terms, `None` when there are none.
pub(crate) fn alternation<'a, I>(terms: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut terms: Vec<&String> = terms.into_iter().filter(|t| !t.is_empty()).collect();
    if terms.is_empty() {
        return None;
    }
    terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    Some(
        terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Compile a labelled pattern, mapping failures onto the crate error.
pub(crate) fn compile_pattern(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PipelineError::pattern(name, e))
}
