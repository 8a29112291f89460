//! Error types for fastfind.
//!
//! Only failures that abort the whole search are represented here. Problems
//! confined to one subtree (a directory that cannot be listed, an entry whose
//! metadata cannot be read) are logged and counted by the walker instead of
//! being returned, so a single bad directory never costs the caller the rest
//! of the results.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type FindResult<T> = Result<T, FindError>;

/// Errors that abort a search
#[derive(Error, Debug)]
pub enum FindError {
    #[error("Search pattern must not be empty")]
    EmptyPattern,
    #[error("Unable to get current working directory: {0}")]
    NoWorkingDirectory(#[source] io::Error),
    #[error("Search root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to initialize worker pool: {0}")]
    PoolInit(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Prompt error: {0}")]
    Prompt(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl FindError {
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }
}

impl From<config::ConfigError> for FindError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for FindError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::PoolInit(err.to_string())
    }
}
