//! Error types for the migration engine
//!
//! Filesystem failures always carry the path they happened on so the CLI can
//! surface them verbatim. Skipped migrations are not errors; see
//! [`crate::migration::SkipReason`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while preparing or running migrations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Checking whether a file exists failed (e.g. permission denied)
    #[error("failed to check {}: {source}", path.display())]
    Exists { path: PathBuf, source: io::Error },

    /// Reading a file failed
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// Replacing a file with migrated content failed
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// A target file is not valid UTF-8 and cannot be processed line by line
    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    /// A version string could not be parsed
    #[error("invalid version '{value}': {source}")]
    Version {
        value: String,
        source: semver::Error,
    },

    /// A pattern override is not a valid regular expression
    #[error("invalid pattern for '{key}': {source}")]
    Pattern { key: String, source: regex::Error },

    /// A pattern override names a key the registry does not know
    #[error("unknown pattern '{0}'. Valid patterns: sem_version, trailing_slash, prerender_enabled")]
    UnknownPattern(String),

    /// The project metadata file could not be parsed
    #[error("failed to parse {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The settings file could not be parsed
    #[error("failed to parse {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A completion notification arrived outside a run or more than once
    #[error("unexpected completion notification from migration '{0}'")]
    Completion(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MigrationError>;
