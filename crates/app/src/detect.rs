//! File category detection by extension.
//!
//! The category gives a first guess at a codec before the content is
//! analyzed. Archives are already compressed and are best left alone.

use codec_lab_core::Algorithm;
use std::path::Path;

const TEXT: &[&str] = &["txt", "md", "py", "js", "html", "css", "json", "xml", "csv", "log", "rs", "toml"];
const IMAGE: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "svg"];
const AUDIO: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "m4a"];
const VIDEO: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"];
const ARCHIVE: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "zst", "clab"];
const BINARY: &[&str] = &["exe", "dll", "so", "dylib", "bin", "dat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Text,
    Image,
    Audio,
    Video,
    Archive,
    Binary,
    Unknown,
}

impl FileCategory {
    /// Categorize by extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileCategory::Unknown;
        };
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();

        if TEXT.contains(&ext) {
            FileCategory::Text
        } else if IMAGE.contains(&ext) {
            FileCategory::Image
        } else if AUDIO.contains(&ext) {
            FileCategory::Audio
        } else if VIDEO.contains(&ext) {
            FileCategory::Video
        } else if ARCHIVE.contains(&ext) {
            FileCategory::Archive
        } else if BINARY.contains(&ext) {
            FileCategory::Binary
        } else {
            FileCategory::Unknown
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileCategory::Text => "text",
            FileCategory::Image => "image",
            FileCategory::Audio => "audio",
            FileCategory::Video => "video",
            FileCategory::Archive => "archive",
            FileCategory::Binary => "binary",
            FileCategory::Unknown => "unknown",
        }
    }

    /// Codec suggested by category alone; `None` means skip compression.
    pub fn suggested(self) -> Option<Algorithm> {
        match self {
            FileCategory::Archive => None,
            FileCategory::Image | FileCategory::Audio | FileCategory::Video => Some(Algorithm::Arithmetic),
            FileCategory::Text | FileCategory::Binary | FileCategory::Unknown => Some(Algorithm::Huffman),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(FileCategory::from_path(Path::new("notes.TXT")), FileCategory::Text);
        assert_eq!(FileCategory::from_path(Path::new("a/b/photo.jpeg")), FileCategory::Image);
        assert_eq!(FileCategory::from_path(Path::new("song.flac")), FileCategory::Audio);
        assert_eq!(FileCategory::from_path(Path::new("clip.mkv")), FileCategory::Video);
        assert_eq!(FileCategory::from_path(Path::new("backup.tar.gz")), FileCategory::Archive);
        assert_eq!(FileCategory::from_path(Path::new("lib.so")), FileCategory::Binary);
        assert_eq!(FileCategory::from_path(Path::new("Makefile")), FileCategory::Unknown);
        assert_eq!(FileCategory::from_path(Path::new("thing.xyz")), FileCategory::Unknown);
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(FileCategory::Archive.suggested(), None);
        assert_eq!(FileCategory::Image.suggested(), Some(Algorithm::Arithmetic));
        assert_eq!(FileCategory::Text.suggested(), Some(Algorithm::Huffman));
    }
}
