//! Extension to media-type lookup for `Content-Type`.

use std::path::Path;

/// Media type used when the extension is unknown or missing.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Fixed, process-wide extension table. Keys are lowercase.
static MIME_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("webm", "video/webm"),
    ("ts", "video/mp2t"),
];

/// Guess the media type of a file from its extension (case-insensitive).
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };

    MIME_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|&(_, mime)| mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct(name: &str) -> &'static str {
        content_type_for(Path::new(name))
    }

    #[test]
    fn content_type_guessing() {
        assert_eq!(ct("/m/movie.mp4"), "video/mp4");
        assert_eq!(ct("/m/movie.mkv"), "video/x-matroska");
        assert_eq!(ct("/m/movie.webm"), "video/webm");
    }

    #[test]
    fn content_type_all_variants() {
        assert_eq!(ct("x.avi"), "video/x-msvideo");
        assert_eq!(ct("x.mov"), "video/quicktime");
        assert_eq!(ct("x.wmv"), "video/x-ms-wmv");
        assert_eq!(ct("x.flv"), "video/x-flv");
        assert_eq!(ct("x.m4v"), "video/mp4");
        assert_eq!(ct("x.ts"), "video/mp2t");
    }

    #[test]
    fn extension_case_is_ignored() {
        assert_eq!(ct("HOME_VIDEO.MP4"), "video/mp4");
        assert_eq!(ct("clip.MkV"), "video/x-matroska");
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(ct("file.xyz"), DEFAULT_CONTENT_TYPE);
        assert_eq!(ct("no_extension"), DEFAULT_CONTENT_TYPE);
        assert_eq!(ct(".hidden"), DEFAULT_CONTENT_TYPE);
    }
}
