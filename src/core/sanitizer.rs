use crate::models::{DownloadTarget, TrackRecord};

/// Keeps letters, digits, spaces, `.` and `_`, then strips trailing whitespace.
pub fn sanitize(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|&c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect();
    kept.trim_end().to_string()
}

/// Stem used when neither the names nor the catalog id leave anything.
const FALLBACK_STEM: &str = "track";

/// Builds the `"{artists} - {title}"` stem, each side sanitized on its own.
///
/// A side that sanitizes to nothing is left out together with the separator.
/// With both sides empty the catalog id is used instead.
pub fn download_target(record: &TrackRecord) -> DownloadTarget {
    let parts: Vec<String> = [sanitize(&record.artist_line()), sanitize(&record.title)]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect();

    let stem = if parts.is_empty() {
        let id = sanitize(&record.id);
        if id.trim().is_empty() {
            FALLBACK_STEM.to_string()
        } else {
            id
        }
    } else {
        parts.join(" - ")
    };
    DownloadTarget::from_stem(stem)
}
