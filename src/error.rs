//! Error types for the content pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading and parsing content files
#[derive(Debug, Error)]
pub enum ContentError {
    /// The file could not be read at all
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The front-matter block is present but malformed (e.g. missing the
    /// closing `---` marker, or invalid YAML)
    #[error("malformed front-matter in {path}: {reason}")]
    MalformedFrontMatter { path: PathBuf, reason: String },

    /// `publishedAt` is missing or does not parse as a date
    #[error("invalid or missing publishedAt in {path}")]
    InvalidDate { path: PathBuf },
}
