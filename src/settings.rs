//! Layered settings: optional TOML file, then `MOVIES_*` environment
//! variables (nested keys use `__`, e.g. `MOVIES_RATINGS__PRESS`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::text::Stopwords;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Stopword corpus, one word per line. Built-in French list when unset.
    pub stopwords_path: Option<PathBuf>,
    /// Domain words stripped from metadata before release places are read.
    pub extra_stopwords: Vec<String>,
    pub ratings: RatingLabels,
    pub creators: CreatorMarkers,
    pub casting: CastingLabels,
    pub technical: TechnicalKeywords,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/movies.sqlite"),
            stopwords_path: None,
            extra_stopwords: [
                "salle", "salles", "sortie", "reprise", "streaming", "vod", "dvd", "cinéma",
                "festival", "min",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ratings: RatingLabels::default(),
            creators: CreatorMarkers::default(),
            casting: CastingLabels::default(),
            technical: TechnicalKeywords::default(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("MOVIES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn stopwords(&self) -> Result<Stopwords> {
        let base = match &self.stopwords_path {
            Some(path) => Stopwords::from_file(path)?,
            None => Stopwords::french(),
        };
        Ok(base.with_extra(&self.extra_stopwords))
    }
}

/// Label words that precede each rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingLabels {
    pub press: String,
    pub public: String,
}

impl Default for RatingLabels {
    fn default() -> Self {
        Self {
            press: "Presse".into(),
            public: "Spectateurs".into(),
        }
    }
}

/// Trailing words of the "directed by" / "written by" labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorMarkers {
    pub directed_by: String,
    pub written_by: String,
}

impl Default for CreatorMarkers {
    fn default() -> Self {
        Self {
            directed_by: "de".into(),
            written_by: "par".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CastingLabels {
    /// Prefix announcing a role, matched case-insensitively.
    pub role_label: String,
    /// Section titles that are never actor names.
    pub headings: Vec<String>,
}

impl Default for CastingLabels {
    fn default() -> Self {
        Self {
            role_label: "Rôle :".into(),
            headings: vec![
                "Acteurs et actrices".into(),
                "Casting complet".into(),
                "Acteurs".into(),
            ],
        }
    }
}

/// Regex fragments (case-insensitive) identifying each technical header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalKeywords {
    pub visa: String,
    pub film_type: String,
    pub color: String,
    pub budget: String,
    pub awards: String,
    pub languages: String,
    pub distributors: String,
    pub nationalities: String,
    pub production_year: String,
}

impl Default for TechnicalKeywords {
    fn default() -> Self {
        Self {
            visa: "visa".into(),
            film_type: "type".into(),
            color: "couleur".into(),
            budget: "budget".into(),
            awards: "r[ée]compense".into(),
            languages: "langue".into(),
            distributors: "distribut".into(),
            nationalities: "nationalit".into(),
            production_year: "ann[ée]e de production".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let s = Settings::load(None).unwrap();
        assert_eq!(s.ratings.press, "Presse");
        assert_eq!(s.creators.written_by, "par");
        assert_eq!(s.technical.color, "couleur");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let s = Settings::load(Some(Path::new("tests/fixtures/does-not-exist.toml"))).unwrap();
        assert_eq!(s.casting.role_label, "Rôle :");
    }

    #[test]
    fn file_overrides_some_fields() {
        let s = Settings::load(Some(Path::new("tests/fixtures/settings.toml"))).unwrap();
        assert_eq!(s.db_path, PathBuf::from("target/test-movies.sqlite"));
        assert_eq!(s.ratings.public, "Public");
        // untouched sections keep their defaults
        assert_eq!(s.ratings.press, "Presse");
        assert_eq!(s.technical.visa, "visa");
    }

    #[test]
    fn stopwords_from_file_skip_comments() {
        let s = Settings {
            stopwords_path: Some(PathBuf::from("tests/fixtures/stopwords.txt")),
            extra_stopwords: vec!["vod".into()],
            ..Settings::default()
        };
        let sw = s.stopwords().unwrap();
        assert_eq!(sw.len(), 4);
        assert!(sw.contains("salle"));
        assert!(sw.contains("vod"));
        assert!(!sw.contains("les"));
        assert!(!sw.contains("# fin"));
        assert_eq!(sw.strip("La salle¤Italie"), " ¤Italie");
    }

    #[test]
    fn missing_stopword_file_is_an_error() {
        let s = Settings {
            stopwords_path: Some(PathBuf::from("tests/fixtures/no-such-corpus.txt")),
            ..Settings::default()
        };
        assert!(matches!(s.stopwords(), Err(crate::error::PipelineError::Io(_))));
    }

    #[test]
    fn stopwords_include_extras() {
        let s = Settings::default();
        let sw = s.stopwords().unwrap();
        assert!(sw.contains("salle"));
        assert!(sw.contains("les"));
    }
}
