//! Error types shared by both tools.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the history walker, the GitHub client and the cache.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// Error from git2 library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// No repository at (or above) the given path
    #[error("repository not found: {path}")]
    RepositoryNotFound { path: String },

    /// Branch, tag or revspec that does not resolve to a commit
    #[error("invalid commit reference: {reference}")]
    InvalidReference { reference: String },

    /// HEAD is unborn
    #[error("repository has no commits yet")]
    EmptyRepository,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub returned {status} for {url}: {message}")]
    GithubStatus {
        status: u16,
        url: String,
        message: String,
    },

    #[error("GitHub resource not found: {url}")]
    NotFound { url: String },

    #[error("GitHub rate limit exhausted; resets at {reset}")]
    RateLimited { reset: String },

    #[error("invalid repository '{0}', expected owner/name or a GitHub URL")]
    InvalidRepoSlug(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD, RFC 3339 or <N>d")]
    InvalidDate(String),

    #[error("invalid range: {since} is after {until}")]
    InvalidRange {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },

    #[error("page size must be at least 1")]
    InvalidPageSize,
}

impl ActivityError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ActivityError> = std::result::Result<T, E>;
