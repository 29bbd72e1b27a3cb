use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::FetchError;
use crate::models::{ProgressEvent, TrackRecord, AUDIO_EXTENSION};

/// Bitrate passed to the transcoder.
pub const AUDIO_QUALITY: &str = "192K";

/// Prefix of the progress lines we ask yt-dlp to print.
const PROGRESS_PREFIX: &str = "spdl-progress";

const PROGRESS_TEMPLATE: &str = "download:spdl-progress %(progress.status)s \
%(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s";

const STDERR_TAIL_LINES: usize = 20;

/// Search-and-extract engine that turns a free-text query into an audio file.
pub trait AudioFetcher {
    /// Downloads the best match for `query` to `{output_stem}.mp3`, calling
    /// `on_progress` synchronously as the download advances.
    fn fetch(
        &self,
        query: &str,
        output_stem: &Path,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), FetchError>;
}

/// `"{artists} - {title} audio"`
pub fn build_search_query(record: &TrackRecord) -> String {
    format!("{} - {} audio", record.artist_line(), record.title)
}

/// Parses one line printed through [`PROGRESS_TEMPLATE`].
///
/// yt-dlp prints `NA` for missing fields and may report estimates as floats.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let mut parts = line.split_whitespace();
    if parts.next()? != PROGRESS_PREFIX {
        return None;
    }

    match parts.next()? {
        "downloading" => {
            let downloaded_bytes = parse_bytes(parts.next()?).unwrap_or(0);
            let total_bytes = parts.next().and_then(parse_bytes);
            let total_bytes_estimate = parts.next().and_then(parse_bytes);
            Some(ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                total_bytes_estimate,
            })
        }
        "finished" => Some(ProgressEvent::Finished),
        _ => None,
    }
}

fn parse_bytes(field: &str) -> Option<u64> {
    if let Ok(n) = field.parse::<u64>() {
        return Some(n);
    }
    field
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
}

/// Runs the `yt-dlp` executable against YouTube search.
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Full argument list for one download.
    pub fn build_args(query: &str, output_stem: &Path) -> Vec<OsString> {
        let mut template = output_stem.as_os_str().to_owned();
        template.push(".%(ext)s");

        let mut args: Vec<OsString> = [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            AUDIO_EXTENSION,
            "--audio-quality",
            AUDIO_QUALITY,
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "--progress",
            "--newline",
            "--progress-template",
            PROGRESS_TEMPLATE,
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(template);
        args.push(OsString::from(format!("ytsearch1:{}", query)));
        args
    }
}

impl AudioFetcher for YtDlp {
    fn fetch(
        &self,
        query: &str,
        output_stem: &Path,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), FetchError> {
        let args = Self::build_args(query, output_stem);
        tracing::debug!(program = %self.program.display(), ?args, "starting yt-dlp");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Only the last few stderr lines are kept for the error report.
        let stderr_reader = child.stderr.take().map(|stderr| {
            std::thread::spawn(move || {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    tracing::debug!("yt-dlp stderr: {}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                tail
            })
        });

        let mut finished = false;
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                tracing::trace!("yt-dlp stdout: {}", line);
                if let Some(event) = parse_progress_line(&line) {
                    finished |= event == ProgressEvent::Finished;
                    on_progress(event);
                }
            }
        }

        let status = child.wait()?;
        let stderr_tail = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let stderr = stderr_tail.into_iter().collect::<Vec<_>>().join("\n");
            return Err(FetchError::Exited {
                program: self.program.clone(),
                status: status.to_string(),
                stderr: if stderr.is_empty() {
                    "no diagnostic output".to_string()
                } else {
                    stderr
                },
            });
        }

        if !finished {
            on_progress(ProgressEvent::Finished);
        }
        Ok(())
    }
}
