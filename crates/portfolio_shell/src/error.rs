use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse portfolio JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse portfolio JSON: {0}")]
    JsonInline(#[source] serde_json::Error),

    #[error("failed to serialize command context: {0}")]
    ContextSerialize(#[source] serde_json::Error),

    #[error("cat: {name}: No such section")]
    UnknownSection { name: String },
}

impl PortfolioError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.into(),
            source,
        }
    }
}
