//! Error types for the lookup and per-track phases.
//!
//! Lookup errors abort the run with a failure status. Per-track errors are
//! reported and the run still completes.

use std::path::PathBuf;

/// Failure while resolving a track URL against the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not a Spotify track URL: {0}")]
    InvalidUrl(String),

    /// The catalog answered with an error status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Failure of the external extraction engine.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exited {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("I/O error while downloading: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure inside the per-track handler. Never changes the exit status.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("could not create download directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("download finished but {0} was not created")]
    MissingOutput(PathBuf),

    #[error("could not download album art: {0:#}")]
    Artwork(anyhow::Error),

    #[error("could not write tags: {0}")]
    Tag(#[from] id3::Error),
}
