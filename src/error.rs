//! Error type shared by the pipeline, settings and storage layers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Genre or place extraction ran before the session vocabulary was frozen.
    /// This means the session was assembled in the wrong order, not that a
    /// movie lacks data.
    #[error("vocabulary registry used before it was built")]
    VocabularyNotBuilt,

    /// A configured label or keyword did not compile into a pattern.
    #[error("invalid pattern for {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl PipelineError {
    pub fn pattern(name: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            name: name.into(),
            source,
        }
    }
}
