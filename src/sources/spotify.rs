use anyhow::{Context, Result};
use base64::Engine;
use serde::Deserialize;

use crate::config::SpotifyConfig;
use crate::error::CatalogError;
use crate::models::{AlbumImage, TrackRecord};
use crate::sources::CatalogSource;

/// Every accepted track URL contains this.
pub const TRACK_URL_MARKER: &str = "open.spotify.com/track/";

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const TRACKS_URL: &str = "https://api.spotify.com/v1/tracks";

pub struct SpotifyClient {
    client: reqwest::blocking::Client,
    access_token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SpotifyTrack {
    id: Option<String>,
    name: String,
    artists: Vec<SpotifyArtist>,
    album: SpotifyAlbum,
    track_number: u32,
    disc_number: u32,
}

#[derive(Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Deserialize)]
struct SpotifyAlbum {
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    release_date: Option<String>,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub fn is_track_url(url: &str) -> bool {
    url.contains(TRACK_URL_MARKER)
}

/// Extracts the track id from `https://open.spotify.com/track/{id}?si=...`.
pub fn track_id_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once(TRACK_URL_MARKER)?;
    let id = rest.split(['?', '#', '/']).next().unwrap_or_default().trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

impl SpotifyClient {
    /// Builds the client and exchanges the configured credentials for an
    /// access token (client-credentials flow).
    pub fn new(config: &SpotifyConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .context(
                "Spotify client_id is not configured (run spdl-setup or set SPOTIFY_CLIENT_ID)",
            )?;
        let client_secret = config
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .context(
                "Spotify client_secret is not configured (run spdl-setup or set SPOTIFY_CLIENT_SECRET)",
            )?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("spdl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        let access_token = Self::authenticate(&client, client_id, client_secret)?;
        tracing::debug!("authenticated against Spotify");

        Ok(Self {
            client,
            access_token,
        })
    }

    fn authenticate(
        client: &reqwest::blocking::Client,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        let credentials = format!("{}:{}", client_id, client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        let resp: TokenResponse = client
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {}", encoded))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .context("could not connect to Spotify")?
            .error_for_status()
            .context("Spotify authentication failed, check client_id and client_secret")?
            .json()
            .context("could not parse Spotify token response")?;

        Ok(resp.access_token)
    }

    fn convert_track(track: SpotifyTrack) -> TrackRecord {
        let album_images = track
            .album
            .images
            .into_iter()
            .map(|img| AlbumImage { url: img.url })
            .collect();

        TrackRecord {
            id: track.id.unwrap_or_default(),
            title: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album: track.album.name,
            album_artist: track.album.artists.into_iter().next().map(|a| a.name),
            album_images,
            track_number: track.track_number,
            disc_number: track.disc_number,
            release_date: track.album.release_date.filter(|d| !d.is_empty()),
        }
    }

    /// Decodes a `/v1/tracks/{id}` body. A JSON `null` yields `None`.
    fn parse_track(body: &str) -> Result<Option<TrackRecord>> {
        let track: Option<SpotifyTrack> =
            serde_json::from_str(body).context("could not parse Spotify track response")?;
        Ok(track.map(Self::convert_track))
    }

    /// Message from a Spotify error body, or the raw body when it is not one.
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(resp) => resp.error.message,
            Err(_) if body.trim().is_empty() => "no response body".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}

impl CatalogSource for SpotifyClient {
    fn name(&self) -> &str {
        "Spotify"
    }

    fn fetch_track(&self, url: &str) -> Result<Option<TrackRecord>, CatalogError> {
        let id = track_id_from_url(url).ok_or_else(|| CatalogError::InvalidUrl(url.to_string()))?;
        tracing::debug!(id, "looking up track");

        let resp = self
            .client
            .get(format!("{}/{}", TRACKS_URL, id))
            .bearer_auth(&self.access_token)
            .send()
            .context("Spotify track request failed")?;

        let status = resp.status();
        let body = resp
            .text()
            .context("could not read Spotify track response")?;

        if !status.is_success() {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: Self::error_message(&body),
            });
        }

        Ok(Self::parse_track(&body)?)
    }

    fn fetch_album_art(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "downloading album art");
        let data = self
            .client
            .get(url)
            .send()
            .context("album art request failed")?
            .error_for_status()?
            .bytes()?
            .to_vec();

        Ok(data)
    }
}
