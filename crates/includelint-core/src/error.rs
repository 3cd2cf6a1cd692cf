//! Error types for includelint

use std::path::PathBuf;
use thiserror::Error;

/// includelint error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// No compile command candidate carries every flag the build description requires.
    #[error("unable to retrieve compile command for \"{}\"", .0.display())]
    Resolution(PathBuf),

    #[error("Frontend error: {0}")]
    Frontend(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),
}

impl Error {
    /// Wrap a load-time failure with the file it came from
    pub fn config(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Error::Config(format!("{}: {}", path.display(), err))
    }
}

/// Result type alias for includelint
pub type Result<T> = std::result::Result<T, Error>;
