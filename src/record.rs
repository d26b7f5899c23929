//! Raw records handed over by the crawler and the clean records the pipeline
//! produces from them.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One scraped movie page. Every field is the text the crawler pulled out of
/// the page; multi-node fields arrive sentinel-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub title: String,
    pub title_localized: String,
    pub synopsis: String,
    pub poster_raw: String,
    pub creators: String,
    pub ratings_raw: String,
    pub metadata_raw: String,
    pub tech_data: String,
    pub tech_headers: String,
    pub casting_raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub title: Option<String>,
    pub title_localized: Option<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,

    pub directors: Vec<String>,
    pub screenwriters: Vec<String>,

    pub press_rating: Option<f64>,
    pub public_rating: Option<f64>,

    /// Flattened metadata text as it was before the cascade carved it up.
    pub metadata: Option<String>,
    /// `YYYY/MM/DD`
    pub release_date: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub genres: BTreeSet<String>,
    pub release_places: BTreeSet<String>,

    pub technical: TechnicalData,
    pub casting: Vec<CastMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalData {
    pub visa: Option<String>,
    pub film_type: Option<String>,
    pub color: Option<String>,
    pub budget: Option<String>,
    pub awards: Option<String>,
    pub languages: BTreeSet<String>,
    pub distributors: BTreeSet<String>,
    pub nationalities: BTreeSet<String>,
    pub production_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub role: Option<String>,
}

impl CleanRecord {
    /// Role of an actor, `None` both for unknown actors and actors without a role.
    pub fn role_of(&self, actor: &str) -> Option<&str> {
        self.casting
            .iter()
            .find(|m| m.name == actor)
            .and_then(|m| m.role.as_deref())
    }
}

/// Read a JSON-lines dump of raw records. Blank lines are skipped.
pub fn read_jsonl(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_raw_fields_default_to_empty() {
        let raw: RawRecord = serde_json::from_str(r#"{"title": "Le Comte"}"#).unwrap();
        assert_eq!(raw.title, "Le Comte");
        assert!(raw.casting_raw.is_empty());
    }

    #[test]
    fn reads_fixture_lines() {
        let records = read_jsonl("tests/fixtures/records.jsonl").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].title_localized.contains("Bikeriders"));
    }

    #[test]
    fn role_lookup() {
        let record = CleanRecord {
            casting: vec![
                CastMember { name: "Austin Butler".into(), role: Some("Benny".into()) },
                CastMember { name: "Tom Hardy".into(), role: None },
            ],
            ..Default::default()
        };
        assert_eq!(record.role_of("Austin Butler"), Some("Benny"));
        assert_eq!(record.role_of("Tom Hardy"), None);
        assert_eq!(record.role_of("Nobody"), None);
    }
}
