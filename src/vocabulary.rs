//! Session-scoped genre and country vocabulary.
//!
//! Built once from the listing page's category sidebar, then frozen. Stages
//! that recognise genres or places read it through [`VocabularyRegistry::get`],
//! which fails loudly if the session never built it.

use std::collections::{BTreeSet, HashMap};
use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::text::{self, alternation};

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}[\p{L}\p{M}'’\- ]*").unwrap());

/// Raw sidebar text, supplied once per crawl session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularySource {
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub countries: String,
}

#[derive(Debug)]
pub struct Vocabulary {
    genres: BTreeSet<String>,
    countries: BTreeSet<String>,
    genre_pattern: Option<Regex>,
    country_pattern: Option<Regex>,
    genre_index: HashMap<String, String>,
    country_index: HashMap<String, String>,
}

impl Vocabulary {
    pub fn from_raw(genre_raw: &str, country_raw: &str) -> Self {
        let genres = terms(genre_raw);
        let countries = terms(country_raw);
        let genre_pattern = term_pattern(&genres, "genre");
        let country_pattern = term_pattern(&countries, "country");

        Self {
            genre_index: index(&genres),
            country_index: index(&countries),
            genres,
            countries,
            genre_pattern,
            country_pattern,
        }
    }

    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    /// Case-insensitive alternation of every genre term, longest first.
    /// `None` for an empty vocabulary.
    pub fn genre_pattern(&self) -> Option<&Regex> {
        self.genre_pattern.as_ref()
    }

    /// Same as [`Vocabulary::genre_pattern`] for country terms.
    pub fn country_pattern(&self) -> Option<&Regex> {
        self.country_pattern.as_ref()
    }

    /// Vocabulary spelling of a genre matched case-insensitively.
    pub fn canonical_genre(&self, matched: &str) -> Option<&str> {
        self.genre_index.get(&matched.to_lowercase()).map(String::as_str)
    }

    /// Vocabulary spelling of a country, if `name` is one.
    pub fn canonical_country(&self, name: &str) -> Option<&str> {
        self.country_index.get(&name.to_lowercase()).map(String::as_str)
    }
}

fn terms(raw: &str) -> BTreeSet<String> {
    let flat = text::normalize(raw, true);
    text::all_matches(&TERM_RE, &flat)
        .into_iter()
        .map(|t| t.trim_end_matches(['-', '\'', '’', ' ']).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn term_pattern(terms: &BTreeSet<String>, kind: &str) -> Option<Regex> {
    alternation(terms).and_then(|alt| {
        Regex::new(&format!(r"(?i)\b(?:{alt})\b"))
            .map_err(|e| warn!(error = %e, kind, "vocabulary pattern rejected"))
            .ok()
    })
}

fn index(terms: &BTreeSet<String>) -> HashMap<String, String> {
    terms.iter().map(|t| (t.to_lowercase(), t.clone())).collect()
}

/// Holds the frozen vocabulary for one crawl session.
#[derive(Debug, Default)]
pub struct VocabularyRegistry {
    frozen: OnceLock<Vocabulary>,
}

impl VocabularyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and freeze the vocabulary. Only the first call in a session does
    /// any work; it returns `true`. Concurrent first calls block until the
    /// winner has finished, so nobody observes a partial build.
    pub fn build(&self, genre_raw: &str, country_raw: &str) -> bool {
        let mut built = false;
        self.frozen.get_or_init(|| {
            built = true;
            let vocabulary = Vocabulary::from_raw(genre_raw, country_raw);
            if vocabulary.genres.is_empty() {
                warn!("genre vocabulary is empty; no genre will ever match");
            }
            if vocabulary.countries.is_empty() {
                warn!("country vocabulary is empty");
            }
            info!(
                genres = vocabulary.genres.len(),
                countries = vocabulary.countries.len(),
                "vocabulary frozen"
            );
            vocabulary
        });
        if !built {
            debug!("vocabulary already built, ignoring rebuild");
        }
        built
    }

    pub fn build_from(&self, source: &VocabularySource) -> bool {
        self.build(&source.genres, &source.countries)
    }

    pub fn is_built(&self) -> bool {
        self.frozen.get().is_some()
    }

    pub fn get(&self) -> Result<&Vocabulary> {
        self.frozen.get().ok_or(PipelineError::VocabularyNotBuilt)
    }
}
