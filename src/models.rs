use std::path::{Path, PathBuf};

/// Extension of the files produced by the fetcher.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Track metadata as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub album_artist: Option<String>,
    pub album_images: Vec<AlbumImage>,
    pub track_number: u32,
    pub disc_number: u32,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumImage {
    pub url: String,
}

impl TrackRecord {
    /// All artist names joined the way they are written into the tag.
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }

    /// The first image the catalog lists for the album.
    pub fn cover_url(&self) -> Option<&str> {
        self.album_images.first().map(|img| img.url.as_str())
    }

    pub fn summary(&self) -> String {
        format!("{} - {}", self.artist_line(), self.title)
    }
}

/// Filesystem-safe name a track is downloaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    stem: String,
}

impl DownloadTarget {
    pub(crate) fn from_stem(stem: String) -> Self {
        Self { stem }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// `{dir}/{stem}` without extension; the fetcher appends its own.
    pub fn stem_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.stem)
    }

    /// `{dir}/{stem}.mp3`
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}", self.stem, AUDIO_EXTENSION))
    }
}

/// Status event emitted by the fetcher while it runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    Downloading {
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
        total_bytes_estimate: Option<u64>,
    },
    Finished,
}

impl ProgressEvent {
    /// Exact total if known, otherwise the estimate.
    pub fn known_total(&self) -> Option<u64> {
        match self {
            ProgressEvent::Downloading {
                total_bytes,
                total_bytes_estimate,
                ..
            } => total_bytes.or(*total_bytes_estimate),
            ProgressEvent::Finished => None,
        }
    }
}

/// Counters surfaced on the progress display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
    pub finished: bool,
}
