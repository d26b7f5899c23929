//! Per-record cleaning: a fixed sequence of extraction stages over one
//! [`RawRecord`], sharing read-only session state.

pub mod extract;
mod working;

pub use working::WorkingText;

use std::sync::Arc;

use tracing::{debug, info};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::Result;
use crate::record::{CleanRecord, RawRecord};
use crate::settings::Settings;
use crate::text::Stopwords;
use crate::vocabulary::{VocabularyRegistry, VocabularySource};
use extract::{casting, creators, metadata, poster, ratings, technical, titles};
use extract::{CastingPatterns, CreatorPatterns, RatingPatterns, TechnicalPatterns};

/// Everything that lives for a whole crawl session: settings, the stopword
/// corpus and the genre/country vocabulary.
#[derive(Debug)]
pub struct SessionContext {
    settings: Settings,
    stopwords: Stopwords,
    vocabulary: VocabularyRegistry,
}

impl SessionContext {
    pub fn new(settings: Settings) -> Result<Self> {
        let stopwords = settings.stopwords()?;
        Ok(Self::with_stopwords(settings, stopwords))
    }

    pub fn with_stopwords(settings: Settings, stopwords: Stopwords) -> Self {
        Self {
            settings,
            stopwords,
            vocabulary: VocabularyRegistry::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    pub fn vocabulary(&self) -> &VocabularyRegistry {
        &self.vocabulary
    }

    /// See [`VocabularyRegistry::build`].
    pub fn build_vocabulary(&self, source: &VocabularySource) -> bool {
        self.vocabulary.build_from(source)
    }
}

/// Compiled stage patterns plus a handle on the session.
#[derive(Debug, Clone)]
pub struct RecordPipeline {
    session: Arc<SessionContext>,
    creators: CreatorPatterns,
    ratings: RatingPatterns,
    technical: TechnicalPatterns,
    casting: CastingPatterns,
}

impl RecordPipeline {
    pub fn new(session: Arc<SessionContext>) -> Result<Self> {
        let settings = session.settings();
        Ok(Self {
            creators: CreatorPatterns::new(&settings.creators)?,
            ratings: RatingPatterns::new(&settings.ratings)?,
            technical: TechnicalPatterns::new(&settings.technical)?,
            casting: CastingPatterns::new(&settings.casting)?,
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Run every stage over one record. Missing data yields empty fields; the
    /// only failure is a session whose vocabulary was never built.
    pub fn process(&self, raw: &RawRecord) -> Result<CleanRecord> {
        let titles = titles::extract(&raw.title, &raw.title_localized);
        let synopsis = titles::synopsis(&raw.synopsis);
        let poster_url = poster::extract(&raw.poster_raw);
        let creators = creators::extract(&raw.creators, &self.creators);
        let (press_rating, public_rating) = ratings::extract(&raw.ratings_raw, &self.ratings);

        let vocabulary = self.session.vocabulary().get()?;
        let metadata = metadata::extract(&raw.metadata_raw, vocabulary, self.session.stopwords());

        let technical = technical::extract(&raw.tech_data, &raw.tech_headers, &self.technical);
        let casting = casting::extract(&raw.casting_raw, &self.casting);

        let record = CleanRecord {
            title: titles.title,
            title_localized: titles.title_localized,
            synopsis,
            poster_url,
            directors: creators.directors,
            screenwriters: creators.screenwriters,
            press_rating,
            public_rating,
            metadata: metadata.flattened,
            release_date: metadata.release_date,
            runtime_minutes: metadata.runtime_minutes,
            genres: metadata.genres,
            release_places: metadata.release_places,
            technical,
            casting,
        };
        debug!(
            title = record.title_localized.as_deref().unwrap_or("?"),
            genres = record.genres.len(),
            actors = record.casting.len(),
            "record cleaned"
        );
        Ok(record)
    }

    #[cfg(feature = "rayon")]
    pub fn process_batch(&self, records: &[RawRecord]) -> Result<Vec<CleanRecord>> {
        info!(records = records.len(), "cleaning batch");
        records.par_iter().map(|raw| self.process(raw)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    pub fn process_batch(&self, records: &[RawRecord]) -> Result<Vec<CleanRecord>> {
        info!(records = records.len(), "cleaning batch");
        records.iter().map(|raw| self.process(raw)).collect()
    }
}
