use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};

use crate::models::TrackRecord;

/// ID3 revision written to disk. v2.3 is what most players read.
pub const TAG_VERSION: Version = Version::Id3v23;

const COVER_MIME: &str = "image/jpeg";

/// Writes the catalog fields of `record` into the ID3 tag of `path`.
/// Existing frames are kept unless one of these fields overwrites them.
pub fn write_track_tags(
    path: &Path,
    record: &TrackRecord,
    cover: Option<&[u8]>,
) -> id3::Result<()> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => Tag::new(),
        Err(e) => return Err(e),
    };

    if let Some(data) = cover {
        tag.remove_all_pictures();
        tag.add_frame(Picture {
            mime_type: COVER_MIME.to_string(),
            picture_type: PictureType::CoverFront,
            description: "Cover".to_string(),
            data: data.to_vec(),
        });
    }

    tag.set_title(&record.title);
    tag.set_album(&record.album);
    tag.set_artist(record.artist_line());
    if let Some(ref album_artist) = record.album_artist {
        tag.set_album_artist(album_artist);
    }
    // Numbers and the date go in as text, exactly as the catalog gave them.
    tag.set_text("TRCK", record.track_number.to_string());
    tag.set_text("TPOS", record.disc_number.to_string());
    if let Some(ref date) = record.release_date {
        tag.set_text("TDRC", date);
        // v2.3 readers look for the year in TYER.
        if let Some(year) = release_year(date) {
            tag.set_text("TYER", year.to_string());
        }
    }

    tag.write_to_path(path, TAG_VERSION)?;
    tracing::debug!(path = %path.display(), "tags written");
    Ok(())
}

/// Leading year of a `YYYY`, `YYYY-MM` or `YYYY-MM-DD` release date.
fn release_year(date: &str) -> Option<i32> {
    date.split('-').next().and_then(|y| y.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlbumImage;

    /// A few bytes shaped like an MPEG frame header; enough for the tag writer.
    fn fake_mp3(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("song.mp3");
        let mut data = vec![0xFF, 0xFB, 0x90, 0x64];
        data.extend(std::iter::repeat(0u8).take(413));
        std::fs::write(&path, data).unwrap();
        path
    }

    fn record() -> TrackRecord {
        TrackRecord {
            id: "abc123".to_string(),
            title: "Test Song".to_string(),
            artists: vec!["Test Artist".to_string(), "Guest".to_string()],
            album: "Test Album".to_string(),
            album_artist: Some("Test Artist".to_string()),
            album_images: vec![AlbumImage {
                url: "https://i.scdn.co/image/640".to_string(),
            }],
            track_number: 3,
            disc_number: 2,
            release_date: Some("2020-05-01".to_string()),
        }
    }

    #[test]
    fn test_write_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_mp3(dir.path());
        let cover: [u8; 7] = [0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];

        write_track_tags(&path, &record(), Some(&cover[..])).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.version(), Version::Id3v23);
        assert_eq!(tag.title(), Some("Test Song"));
        assert_eq!(tag.artist(), Some("Test Artist, Guest"));
        assert_eq!(tag.album(), Some("Test Album"));
        assert_eq!(tag.album_artist(), Some("Test Artist"));
        assert_eq!(tag.track(), Some(3));
        assert_eq!(tag.disc(), Some(2));

        let date = tag
            .get("TDRC")
            .or_else(|| tag.get("TYER"))
            .and_then(|f| f.content().text())
            .unwrap();
        assert!(date.starts_with("2020"));

        let bytes = std::fs::read(&path).unwrap();
        let has_frame = |id: &[u8]| bytes.windows(id.len()).any(|w| w == id);
        assert!(has_frame(b"TDRC"));
        assert!(has_frame(b"TYER"));

        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].mime_type, "image/jpeg");
        assert_eq!(pictures[0].picture_type, PictureType::CoverFront);
        assert_eq!(pictures[0].data, cover.to_vec());
    }

    #[test]
    fn test_overwrites_existing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_mp3(dir.path());

        let mut old = Tag::new();
        old.set_title("Old Title");
        old.set_genre("Rock");
        old.write_to_path(&path, Version::Id3v24).unwrap();

        write_track_tags(&path, &record(), None).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Test Song"));
        assert_eq!(tag.genre(), Some("Rock"));
        assert_eq!(tag.pictures().count(), 0);
    }

    #[test]
    fn test_release_year() {
        assert_eq!(release_year("2020-05-01"), Some(2020));
        assert_eq!(release_year("1987"), Some(1987));
        assert_eq!(release_year("1987-06"), Some(1987));
        assert_eq!(release_year("unknown"), None);
    }

    #[test]
    fn test_year_only_release_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_mp3(dir.path());
        let mut record = record();
        record.release_date = Some("1987".to_string());

        write_track_tags(&path, &record, None).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        let year = tag.get("TYER").and_then(|f| f.content().text());
        assert_eq!(year, Some("1987"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp3");
        assert!(write_track_tags(&path, &record(), None).is_err());
    }
}
