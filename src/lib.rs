//! Downloads a Spotify track as a tagged MP3.
//!
//! The track URL is resolved against the Spotify Web API, the audio is
//! found on YouTube and transcoded by `yt-dlp`, and the catalog metadata is
//! written into the file as an ID3v2.3 tag.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod reporter;
pub mod setup;
pub mod sources;
