//! Interactive first-run setup: checks the external tools and stores the
//! Spotify credentials in the config file.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use dialoguer::{Input, Password};

use crate::config::{self, SpotifyConfig};

/// External programs the downloader shells out to.
pub const TOOLS: [(&str, &str); 2] = [
    ("yt-dlp", "search and download audio"),
    ("ffmpeg", "transcode to MP3"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Brew,
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Winget,
    Scoop,
    Choco,
}

impl PackageManager {
    fn candidates(os: &str) -> &'static [PackageManager] {
        use PackageManager::*;
        match os {
            "macos" => &[Brew],
            "linux" => &[Apt, Dnf, Pacman, Zypper, Brew],
            "windows" => &[Winget, Scoop, Choco],
            _ => &[],
        }
    }

    fn program(self) -> &'static str {
        match self {
            PackageManager::Brew => "brew",
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Winget => "winget",
            PackageManager::Scoop => "scoop",
            PackageManager::Choco => "choco",
        }
    }

    /// First package manager for `os` that `is_installed` reports.
    pub fn detect(os: &str, is_installed: impl Fn(&str) -> bool) -> Option<Self> {
        Self::candidates(os)
            .iter()
            .copied()
            .find(|pm| is_installed(pm.program()))
    }

    /// Command line that installs `tool` with this package manager.
    pub fn install_command(self, tool: &str) -> String {
        match self {
            PackageManager::Brew => format!("brew install {}", tool),
            PackageManager::Apt => format!("sudo apt-get install {}", tool),
            PackageManager::Dnf => format!("sudo dnf install {}", tool),
            PackageManager::Pacman => format!("sudo pacman -S {}", tool),
            PackageManager::Zypper => format!("sudo zypper install {}", tool),
            PackageManager::Winget => match tool {
                "yt-dlp" => "winget install yt-dlp.yt-dlp".to_string(),
                "ffmpeg" => "winget install Gyan.FFmpeg".to_string(),
                other => format!("winget install {}", other),
            },
            PackageManager::Scoop => format!("scoop install {}", tool),
            PackageManager::Choco => format!("choco install {}", tool),
        }
    }
}

/// Install hint shown when no package manager was found.
pub fn fallback_hint(tool: &str) -> String {
    match tool {
        "yt-dlp" => "pipx install yt-dlp".to_string(),
        "ffmpeg" => "https://ffmpeg.org/download.html".to_string(),
        other => format!("install {} and put it on PATH", other),
    }
}

fn locate(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

fn print_tool_table(os: &str) -> bool {
    let manager = PackageManager::detect(os, |p| locate(p).is_some());
    let mut table = Table::new();
    table.set_header(vec!["Tool", "Purpose", "Status", "Install"]);

    let mut all_found = true;
    for (tool, purpose) in TOOLS {
        let (status, hint) = match locate(tool) {
            Some(path) => (path.display().to_string(), "-".to_string()),
            None => {
                all_found = false;
                let hint = manager
                    .map(|pm| pm.install_command(tool))
                    .unwrap_or_else(|| fallback_hint(tool));
                ("missing".to_string(), hint)
            }
        };
        table.add_row(vec![
            Cell::new(tool),
            Cell::new(purpose),
            Cell::new(&status),
            Cell::new(&hint),
        ]);
    }

    println!("{table}");
    all_found
}

/// One-line summary of the stored credentials, shown before prompting.
pub fn credential_status(spotify: &SpotifyConfig) -> &'static str {
    if spotify.is_configured() {
        "Credentials are already stored; press Enter to keep them."
    } else {
        "No credentials stored yet."
    }
}

pub fn run_setup() -> Result<()> {
    let os = std::env::consts::OS;
    println!("spdl setup ({})\n", os);

    if !print_tool_table(os) {
        println!("\nInstall the missing tools above before downloading.\n");
    }

    let mut cfg = config::load_config_file();

    println!("Spotify API credentials");
    println!("(create an app at https://developer.spotify.com/dashboard)");
    println!("{}\n", credential_status(&cfg.spotify));

    let current_id = cfg.spotify.client_id.clone().unwrap_or_default();
    let client_id: String = Input::new()
        .with_prompt("Client ID")
        .with_initial_text(current_id)
        .interact_text()?;

    let had_secret = cfg.spotify.client_secret.is_some();
    let prompt = if had_secret {
        "Client Secret (leave empty to keep the current one)"
    } else {
        "Client Secret"
    };
    let entered: String = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(had_secret)
        .interact()?;
    let client_secret = if entered.is_empty() {
        cfg.spotify.client_secret.take()
    } else {
        Some(entered)
    };

    let directory: String = Input::new()
        .with_prompt("Download directory")
        .with_initial_text(cfg.download.directory.display().to_string())
        .interact_text()?;

    cfg.spotify = SpotifyConfig {
        client_id: Some(client_id.trim().to_string()),
        client_secret: client_secret.map(|s| s.trim().to_string()),
    };
    cfg.download.directory = PathBuf::from(directory.trim());

    let path = config::save_config(&cfg)?;
    println!("\nSaved {}", path.display());
    Ok(())
}
