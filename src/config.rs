use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOWNLOAD_DIR: &str = "Spotify Downloads";
pub const DEFAULT_YTDLP: &str = "yt-dlp";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl SpotifyConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.as_ref().is_some_and(|s| !s.is_empty())
            && self.client_secret.as_ref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Relative paths resolve against the working directory.
    pub directory: PathBuf,
    /// yt-dlp executable name or path.
    pub ytdlp: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            ytdlp: PathBuf::from(DEFAULT_YTDLP),
        }
    }
}

impl Config {
    /// Overlays `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPDL_DOWNLOAD_DIR`
    /// and `SPDL_YTDLP` on top of the file values. Empty variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = Some(id);
        }
        if let Some(secret) = get("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = Some(secret);
        }
        if let Some(dir) = get("SPDL_DOWNLOAD_DIR") {
            self.download.directory = PathBuf::from(dir);
        }
        if let Some(bin) = get("SPDL_YTDLP") {
            self.download.ytdlp = PathBuf::from(bin);
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spdl")
        .join("config.toml")
}

/// Reads the config file, falling back to defaults when it is missing or
/// unreadable, then applies environment overrides.
pub fn load_config() -> Config {
    let mut config = load_config_file();
    config.apply_env(|key| std::env::var(key).ok());
    config
}

/// The config file alone, without environment overrides.
pub fn load_config_file() -> Config {
    let path = config_path();
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring malformed config: {e}");
            Config::default()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), "cannot read config: {e}");
            Config::default()
        }
    }
}

pub fn save_config(config: &Config) -> Result<PathBuf> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}
