use crate::text::{self, is_padding, SENTINEL};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Titles {
    pub title: Option<String>,
    pub title_localized: Option<String>,
}

/// Both title fields. A missing localized title falls back to the primary one.
pub fn extract(title_raw: &str, localized_raw: &str) -> Titles {
    let title = clean_title(title_raw);
    let title_localized = clean_title(localized_raw).or_else(|| title.clone());
    Titles {
        title,
        title_localized,
    }
}

/// Boilerplate ("Titre original", breadcrumbs...) arrives concatenated ahead
/// of the real title, so only the last sentinel-delimited run is kept.
fn clean_title(raw: &str) -> Option<String> {
    let flat = text::normalize(raw, false);
    let trimmed = flat.trim_end_matches(is_padding);
    let tail = match trimmed.rfind(SENTINEL) {
        Some(i) => &trimmed[i + SENTINEL.len_utf8()..],
        None => trimmed,
    };
    let tail = tail.trim_matches(is_padding);
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

/// Paragraph nodes are trimmed and re-joined with newlines.
pub fn synopsis(raw: &str) -> Option<String> {
    let flat = text::normalize(raw, false);
    let paragraphs: Vec<&str> = text::split(&flat).collect();
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}
