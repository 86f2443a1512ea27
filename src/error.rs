//! Error types for the fallible edges of the engine (file loading, lexicon
//! validation). Text analysis itself is total and never returns an error.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {label}: {source}")]
    Parse {
        label: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid lexicon: {0}")]
    InvalidLexicon(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
