//! User-facing status lines and the download progress bar.
//!
//! Every line starts with a marker for its category. Diagnostics for
//! developers go through `tracing` instead.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::models::{ProgressEvent, ProgressState};

const ATTEMPT: &str = "🎵";
const SKIP: &str = "⏭️ ";
const SUCCESS: &str = "✅";
const ERROR: &str = "❌";
const CANCELLED: &str = "🛑";
const COMPLETE: &str = "🏁";

pub struct Reporter<W: Write> {
    out: W,
    show_progress: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, show_progress: bool) -> Self {
        Self { out, show_progress }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, marker: &str, text: impl Display) {
        // Write errors on the status stream are ignored.
        let _ = writeln!(self.out, "{} {}", marker, text);
        let _ = self.out.flush();
    }

    pub fn usage(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{}", text);
    }

    pub fn attempt(&mut self, name: &str) {
        self.line(ATTEMPT, format_args!("Attempting to download: {}", name));
    }

    pub fn skipped(&mut self, path: &Path) {
        self.line(
            SKIP,
            format_args!("Already downloaded, skipping: {}", path.display()),
        );
    }

    pub fn success(&mut self, path: &Path) {
        self.line(
            SUCCESS,
            format_args!("Downloaded and tagged: {}", path.display()),
        );
    }

    /// A failure before track processing, e.g. `Spotify API Error`.
    pub fn failure(&mut self, kind: &str, detail: impl Display) {
        self.line(ERROR, format_args!("{}: {}", kind, detail));
    }

    pub fn no_data(&mut self) {
        self.line(ERROR, "Could not retrieve track data.");
    }

    pub fn track_error(&mut self, name: &str, err: impl Display) {
        self.line(ERROR, format_args!("Error processing {}: {}", name, err));
    }

    pub fn complete(&mut self) {
        self.line(COMPLETE, "Download complete.");
    }

    pub fn cancelled(&mut self) {
        self.line(CANCELLED, "Download cancelled by user.");
    }

    pub fn progress(&self, name: &str) -> ProgressDisplay {
        let bar = ProgressBar::with_draw_target(None, self.draw_target());
        bar.set_style(download_style());
        bar.set_message(format!("Downloading {}", name));
        bar.enable_steady_tick(Duration::from_millis(120));
        ProgressDisplay {
            bar,
            state: ProgressState::default(),
        }
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        if self.show_progress {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        }
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ")
}

/// Progress bar driven by fetcher events.
pub struct ProgressDisplay {
    bar: ProgressBar,
    state: ProgressState,
}

impl ProgressDisplay {
    pub fn handle(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Downloading {
                downloaded_bytes, ..
            } => {
                // Only sized downloads move the bar.
                if let Some(total) = event.known_total() {
                    self.state.downloaded_bytes = downloaded_bytes;
                    self.state.total_bytes = Some(total);
                    self.bar.set_length(total);
                    self.bar.set_position(downloaded_bytes);
                }
            }
            ProgressEvent::Finished => {
                self.state.finished = true;
                self.bar.set_message("Processing");
            }
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
