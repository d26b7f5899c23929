use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::error::Result;
use crate::settings::CreatorMarkers;
use crate::text::{self, compile_pattern};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}[\p{L}\p{M}'’.\- ]*").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Creators {
    pub directors: Vec<String>,
    pub screenwriters: Vec<String>,
}

/// Marker patterns capture everything after the sentinel-delimited token that
/// ends with the marker word ("Réalisé de", "Ecrit par", or a bare "De").
#[derive(Debug, Clone)]
pub struct CreatorPatterns {
    written_by: Regex,
    directed_by: Regex,
}

impl CreatorPatterns {
    pub fn new(markers: &CreatorMarkers) -> Result<Self> {
        Ok(Self {
            written_by: compile_pattern("creators.written_by", &marker(&markers.written_by))?,
            directed_by: compile_pattern("creators.directed_by", &marker(&markers.directed_by))?,
        })
    }
}

fn marker(word: &str) -> String {
    format!(r"(?i)(?:^|¤)[^¤]*?\b{}\s*¤(.*)$", regex::escape(word.trim()))
}

/// The screenwriter segment is cut off first; the director segment is then
/// searched in what precedes it.
pub fn extract(raw: &str, patterns: &CreatorPatterns) -> Creators {
    let flat = text::normalize(raw, true);

    let writers = patterns
        .written_by
        .captures(&flat)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_default();
    let head = patterns.written_by.replace(&flat, "");
    let directors = patterns
        .directed_by
        .captures(&head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_default();

    Creators {
        directors: names(directors),
        screenwriters: names(writers),
    }
}

fn names(segment: &str) -> Vec<String> {
    text::all_matches_ordered(&NAME_RE, segment)
        .into_iter()
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> CreatorPatterns {
        CreatorPatterns::new(&CreatorMarkers::default()).unwrap()
    }

    #[test]
    fn splits_directors_and_writers() {
        let c = extract("Réalisé de¤Jean Dupont¤Ecrit par¤Marie Martin", &patterns());
        assert_eq!(c.directors, vec!["Jean Dupont"]);
        assert_eq!(c.screenwriters, vec!["Marie Martin"]);
    }

    #[test]
    fn several_names_per_role() {
        let raw = "De\n \nAlexandre de La Patellière\n, \nMatthieu Delaporte\n|\nPar\n \nAlexandre de La Patellière, Matthieu Delaporte";
        let c = extract(raw, &patterns());
        assert_eq!(c.directors, vec!["Alexandre de La Patellière", "Matthieu Delaporte"]);
        assert_eq!(c.screenwriters, vec!["Alexandre de La Patellière", "Matthieu Delaporte"]);
    }

    #[test]
    fn directors_only() {
        let c = extract("De¤Jeff Nichols", &patterns());
        assert_eq!(c.directors, vec!["Jeff Nichols"]);
        assert!(c.screenwriters.is_empty());
    }

    #[test]
    fn no_markers() {
        assert_eq!(extract("Jeff Nichols", &patterns()), Creators::default());
        assert_eq!(extract("", &patterns()), Creators::default());
    }
}
