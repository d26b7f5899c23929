//! Cleaning pipeline for scraped movie pages: flattens noisy multi-node text,
//! carves structured fields out of it and stores the results in SQLite.

pub mod db;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod settings;
pub mod text;
pub mod vocabulary;

pub use error::{PipelineError, Result};
pub use pipeline::{RecordPipeline, SessionContext};
pub use record::{CastMember, CleanRecord, RawRecord, TechnicalData};
pub use settings::Settings;
pub use vocabulary::{Vocabulary, VocabularyRegistry, VocabularySource};

/// Install a `fmt` subscriber driven by `RUST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
