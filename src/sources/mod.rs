pub mod spotify;

use anyhow::Result;

use crate::error::CatalogError;
use crate::models::TrackRecord;

/// Metadata catalog a track URL is resolved against.
pub trait CatalogSource {
    fn name(&self) -> &str;
    /// Looks up one track. `Ok(None)` means the catalog answered without data.
    fn fetch_track(&self, url: &str) -> Result<Option<TrackRecord>, CatalogError>;
    /// Downloads an album image by URL.
    fn fetch_album_art(&self, url: &str) -> Result<Vec<u8>>;
}
