//! Single-track download-and-tag run.
//!
//! Failures before the track handler (bad URL, client setup, catalog lookup)
//! end the run with a failure status. Anything that goes wrong inside the
//! handler is reported and the run still completes successfully.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{Config, SpotifyConfig};
use crate::core::fetcher::{self, AudioFetcher};
use crate::core::{sanitizer, tagger};
use crate::error::{CatalogError, TrackError};
use crate::models::TrackRecord;
use crate::reporter::Reporter;
use crate::sources::spotify;
use crate::sources::CatalogSource;

/// Exit status for a run cancelled with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Reports a Ctrl-C and returns the process exit status for it.
pub fn on_interrupt<W: Write>(reporter: &mut Reporter<W>) -> i32 {
    reporter.cancelled();
    i32::from(INTERRUPTED_EXIT_CODE)
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    HelpShown,
    Skipped(PathBuf),
    Downloaded(PathBuf),
    /// The track handler reported an error; the run itself completed.
    TrackFailed,
    InvalidInput,
    InitFailed,
    ApiError,
    LookupFailed,
    NoData,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::HelpShown
            | Outcome::Skipped(_)
            | Outcome::Downloaded(_)
            | Outcome::TrackFailed => 0,
            Outcome::InvalidInput
            | Outcome::InitFailed
            | Outcome::ApiError
            | Outcome::LookupFailed
            | Outcome::NoData => 1,
        }
    }
}

/// What the track handler did when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Skipped(PathBuf),
    Downloaded(PathBuf),
}

/// Resolves `url`, then downloads and tags the track.
///
/// `connect` builds the catalog client and is only called once the URL has
/// the shape of a track URL.
pub fn run<C, F, W, Connect>(
    url: &str,
    config: &Config,
    connect: Connect,
    fetcher: &F,
    reporter: &mut Reporter<W>,
) -> Outcome
where
    C: CatalogSource,
    F: AudioFetcher,
    W: Write,
    Connect: FnOnce(&SpotifyConfig) -> Result<C>,
{
    let url = url.trim();
    if !spotify::is_track_url(url) {
        reporter.failure(
            "Invalid Input",
            format_args!(
                "expected a Spotify track URL like https://{}<id>",
                spotify::TRACK_URL_MARKER
            ),
        );
        return Outcome::InvalidInput;
    }

    let catalog = match connect(&config.spotify) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::debug!("client setup failed: {e:?}");
            reporter.failure("Initialization Failed", format_args!("{:#}", e));
            return Outcome::InitFailed;
        }
    };

    let track = match catalog.fetch_track(url) {
        Ok(Some(track)) => track,
        Ok(None) => {
            reporter.no_data();
            return Outcome::NoData;
        }
        Err(CatalogError::InvalidUrl(_)) => {
            reporter.failure("Invalid Input", format_args!("no track id in {}", url));
            return Outcome::InvalidInput;
        }
        Err(e @ CatalogError::Api { .. }) => {
            reporter.failure(&format!("{} API Error", catalog.name()), e);
            return Outcome::ApiError;
        }
        Err(CatalogError::Unexpected(e)) => {
            reporter.failure("An unexpected error occurred", format_args!("{:#}", e));
            return Outcome::LookupFailed;
        }
    };

    let download_dir = &config.download.directory;
    let outcome = match process_track(&track, &catalog, fetcher, download_dir, reporter) {
        Ok(TrackOutcome::Skipped(path)) => Outcome::Skipped(path),
        Ok(TrackOutcome::Downloaded(path)) => Outcome::Downloaded(path),
        Err(e) => {
            tracing::debug!("track failed: {e:?}");
            reporter.track_error(&track.summary(), &e);
            Outcome::TrackFailed
        }
    };
    reporter.complete();
    outcome
}

/// Downloads and tags one track into `download_dir`.
pub fn process_track<C, F, W>(
    track: &TrackRecord,
    catalog: &C,
    fetcher: &F,
    download_dir: &Path,
    reporter: &mut Reporter<W>,
) -> Result<TrackOutcome, TrackError>
where
    C: CatalogSource,
    F: AudioFetcher,
    W: Write,
{
    let target = sanitizer::download_target(track);
    let output = target.output_path(download_dir);

    if output.exists() {
        reporter.skipped(&output);
        return Ok(TrackOutcome::Skipped(output));
    }

    reporter.attempt(&track.summary());
    std::fs::create_dir_all(download_dir).map_err(|source| TrackError::CreateDir {
        path: download_dir.to_path_buf(),
        source,
    })?;

    let query = fetcher::build_search_query(track);
    tracing::info!(query = %query, output = %output.display(), "fetching audio");

    let mut progress = reporter.progress(target.stem());
    let fetched = fetcher.fetch(&query, &target.stem_path(download_dir), &mut |event| {
        progress.handle(event)
    });
    progress.finish();
    fetched?;

    if !output.exists() {
        return Err(TrackError::MissingOutput(output));
    }

    let cover = match track.cover_url() {
        Some(url) => Some(catalog.fetch_album_art(url).map_err(TrackError::Artwork)?),
        None => {
            tracing::warn!(track = %track.summary(), "no album art listed, tagging without cover");
            None
        }
    };
    tagger::write_track_tags(&output, track, cover.as_deref())?;

    reporter.success(&output);
    Ok(TrackOutcome::Downloaded(output))
}
