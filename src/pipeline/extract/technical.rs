//! Technical block: a value blob plus a parallel blob listing which headers
//! this movie actually has.
//!
//! For each category the matching header is looked up in the header blob.
//! Every other present header is masked out of the value blob with a boundary
//! marker, and the category's value is whatever sits between its own header
//! and the next marker. Labels are assumed to be distinguishable substrings;
//! overlapping labels can attribute text to the wrong category.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::record::TechnicalData;
use crate::settings::TechnicalKeywords;
use crate::text::{self, compile_pattern};

const BOUNDARY: char = '\u{E000}';

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechCategory {
    Visa,
    FilmType,
    Color,
    Budget,
    Awards,
    Languages,
    Distributors,
    Nationalities,
    ProductionYear,
}

impl TechCategory {
    pub const ALL: [TechCategory; 9] = [
        TechCategory::Visa,
        TechCategory::FilmType,
        TechCategory::Color,
        TechCategory::Budget,
        TechCategory::Awards,
        TechCategory::Languages,
        TechCategory::Distributors,
        TechCategory::Nationalities,
        TechCategory::ProductionYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechCategory::Visa => "visa",
            TechCategory::FilmType => "film_type",
            TechCategory::Color => "color",
            TechCategory::Budget => "budget",
            TechCategory::Awards => "awards",
            TechCategory::Languages => "languages",
            TechCategory::Distributors => "distributors",
            TechCategory::Nationalities => "nationalities",
            TechCategory::ProductionYear => "production_year",
        }
    }

    fn keyword<'a>(&self, keywords: &'a TechnicalKeywords) -> &'a str {
        match self {
            TechCategory::Visa => &keywords.visa,
            TechCategory::FilmType => &keywords.film_type,
            TechCategory::Color => &keywords.color,
            TechCategory::Budget => &keywords.budget,
            TechCategory::Awards => &keywords.awards,
            TechCategory::Languages => &keywords.languages,
            TechCategory::Distributors => &keywords.distributors,
            TechCategory::Nationalities => &keywords.nationalities,
            TechCategory::ProductionYear => &keywords.production_year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TechnicalPatterns {
    headers: Vec<(TechCategory, Regex)>,
}

impl TechnicalPatterns {
    pub fn new(keywords: &TechnicalKeywords) -> Result<Self> {
        let headers = TechCategory::ALL
            .iter()
            .map(|cat| {
                let name = format!("technical.{}", cat.as_str());
                compile_pattern(&name, &format!("(?i){}", cat.keyword(keywords))).map(|re| (*cat, re))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { headers })
    }
}

pub fn extract(data_raw: &str, headers_raw: &str, patterns: &TechnicalPatterns) -> TechnicalData {
    let data = text::normalize(data_raw, true);
    let header_blob = text::normalize(headers_raw, true);
    let present: Vec<&str> = text::split(&header_blob).collect();

    let mut out = TechnicalData::default();
    for (category, re) in &patterns.headers {
        let Some(header) = present.iter().copied().find(|h| re.is_match(h)) else {
            continue;
        };
        let Some(value) = segment(&data, header, &present) else {
            debug!(category = category.as_str(), header, "header present but no value");
            continue;
        };
        match category {
            TechCategory::Visa => out.visa = Some(value),
            TechCategory::FilmType => out.film_type = Some(value),
            TechCategory::Color => out.color = Some(value),
            TechCategory::Budget => out.budget = Some(value),
            TechCategory::Awards => out.awards = Some(value),
            TechCategory::Languages => out.languages = tokens(&value),
            TechCategory::Distributors => out.distributors = tokens(&value),
            TechCategory::Nationalities => out.nationalities = tokens(&value),
            TechCategory::ProductionYear => {
                out.production_year = text::first_match(&YEAR_RE, &value).and_then(|y| y.parse().ok())
            }
        }
    }
    out
}

/// Sentinel-joined tokens between `target` and the next masked header.
fn segment(data: &str, target: &str, present: &[&str]) -> Option<String> {
    let mut others: Vec<&str> = present.iter().copied().filter(|h| *h != target).collect();
    others.sort_by_key(|h| Reverse(h.len()));

    let mut buf = [0u8; 4];
    let boundary: &str = BOUNDARY.encode_utf8(&mut buf);
    let mut masked = data.to_string();
    for other in others {
        masked = masked.replace(other, boundary);
    }

    let start = masked.find(target)? + target.len();
    let rest = &masked[start..];
    let end = rest.find(BOUNDARY).unwrap_or(rest.len());
    text::join(text::split(&rest[..end]))
}

fn tokens(value: &str) -> BTreeSet<String> {
    text::split(value).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> TechnicalPatterns {
        TechnicalPatterns::new(&TechnicalKeywords::default()).unwrap()
    }

    #[test]
    fn absent_header_is_none() {
        let data = "visa\n12345\ncouleur\nNoir & Blanc";
        let t = extract(data, "visa\ncouleur", &patterns());
        assert_eq!(t.visa.as_deref(), Some("12345"));
        assert_eq!(t.color.as_deref(), Some("Noir & Blanc"));
        assert_eq!(t.budget, None);
        assert!(t.languages.is_empty());
    }

    #[test]
    fn full_block() {
        let data = "Nationalités\nU.S.A.\nDistributeur\nUniversal Pictures International France\n\
                    Récompenses\n2 nominations\nAnnée de production\n2023\n\
                    Type de film\nLong-métrage\nLangues\nAnglais, Espagnol\n\
                    N° de Visa\n159 472\nCouleur\nCouleur";
        let headers = "Nationalités\nDistributeur\nRécompenses\nAnnée de production\n\
                       Type de film\nLangues\nN° de Visa\nCouleur";
        let t = extract(data, headers, &patterns());
        assert_eq!(t.nationalities.iter().map(String::as_str).collect::<Vec<_>>(), vec!["U.S.A."]);
        assert!(t.distributors.contains("Universal Pictures International France"));
        assert_eq!(t.awards.as_deref(), Some("2 nominations"));
        assert_eq!(t.production_year, Some(2023));
        assert_eq!(t.film_type.as_deref(), Some("Long-métrage"));
        assert_eq!(
            t.languages.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Anglais", "Espagnol"]
        );
        assert_eq!(t.visa.as_deref(), Some("159 472"));
        assert_eq!(t.color.as_deref(), Some("Couleur"));
        assert_eq!(t.budget, None);
    }

    #[test]
    fn nothing_present() {
        assert_eq!(extract("", "", &patterns()), TechnicalData::default());
        assert_eq!(extract("Budget\n-", "", &patterns()), TechnicalData::default());
    }

    #[test]
    fn invalid_keyword_is_reported() {
        let keywords = TechnicalKeywords {
            budget: "budg(et".into(),
            ..TechnicalKeywords::default()
        };
        assert!(TechnicalPatterns::new(&keywords).is_err());
    }
}
