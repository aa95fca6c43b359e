use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "aac"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "ppt", "pptx", "xls", "xlsx"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Sidebar category of a file, computed once when the catalog is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl FileCategory {
    /// Category from the extension, falling back to the content type for
    /// names without a known extension.
    pub fn classify(file_name: &str, content_type: &str) -> Self {
        if let Some(ext) = extension(file_name) {
            let ext = ext.as_str();
            if IMAGE_EXTENSIONS.contains(&ext) {
                return FileCategory::Image;
            }
            if VIDEO_EXTENSIONS.contains(&ext) {
                return FileCategory::Video;
            }
            if AUDIO_EXTENSIONS.contains(&ext) {
                return FileCategory::Audio;
            }
            if DOCUMENT_EXTENSIONS.contains(&ext) {
                return FileCategory::Document;
            }
            if ARCHIVE_EXTENSIONS.contains(&ext) {
                return FileCategory::Archive;
            }
        }

        let content_type = content_type.to_ascii_lowercase();
        if content_type.starts_with("image/") {
            FileCategory::Image
        } else if content_type.starts_with("video/") {
            FileCategory::Video
        } else if content_type.starts_with("audio/") {
            FileCategory::Audio
        } else if ["pdf", "msword", "officedocument", "ms-excel", "ms-powerpoint", "text/plain"]
            .iter()
            .any(|marker| content_type.contains(marker))
        {
            FileCategory::Document
        } else if ["zip", "rar", "tar", "7z", "gzip"]
            .iter()
            .any(|marker| content_type.contains(marker))
        {
            FileCategory::Archive
        } else {
            FileCategory::Other
        }
    }

    /// Parses a sidebar filter label. `None` means "all files".
    pub fn parse_filter(value: &str) -> Result<Option<Self>, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "all files" => Ok(None),
            "image" | "images" => Ok(Some(FileCategory::Image)),
            "video" | "videos" => Ok(Some(FileCategory::Video)),
            "audio" => Ok(Some(FileCategory::Audio)),
            "document" | "documents" => Ok(Some(FileCategory::Document)),
            "archive" | "archives" => Ok(Some(FileCategory::Archive)),
            "other" => Ok(Some(FileCategory::Other)),
            other => Err(format!("Unknown file category '{}'", other)),
        }
    }
}

/// How the preview pane renders a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Video,
    Audio,
    Generic,
}

impl PreviewKind {
    pub fn for_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.starts_with("image/") {
            PreviewKind::Image
        } else if content_type.starts_with("video/") {
            PreviewKind::Video
        } else if content_type.starts_with("audio/") {
            PreviewKind::Audio
        } else {
            PreviewKind::Generic
        }
    }
}

/// Lowercased extension, if the name has one.
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Human readable size, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{:.2}", value);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_extension_table() {
        assert_eq!(FileCategory::classify("a.JPG", ""), FileCategory::Image);
        assert_eq!(FileCategory::classify("clip.mkv", ""), FileCategory::Video);
        assert_eq!(FileCategory::classify("song.aac", ""), FileCategory::Audio);
        assert_eq!(FileCategory::classify("report.docx", ""), FileCategory::Document);
        assert_eq!(FileCategory::classify("notes.txt", ""), FileCategory::Document);
        assert_eq!(FileCategory::classify("backup.tar", ""), FileCategory::Archive);
        assert_eq!(FileCategory::classify("main.rs", ""), FileCategory::Other);
    }

    #[test]
    fn category_falls_back_to_content_type() {
        assert_eq!(
            FileCategory::classify("scan", "image/tiff"),
            FileCategory::Image
        );
        assert_eq!(
            FileCategory::classify("README", "application/octet-stream"),
            FileCategory::Other
        );
    }

    #[test]
    fn sidebar_labels_parse() {
        assert_eq!(FileCategory::parse_filter("All Files"), Ok(None));
        assert_eq!(
            FileCategory::parse_filter("Images"),
            Ok(Some(FileCategory::Image))
        );
        assert_eq!(
            FileCategory::parse_filter("archives"),
            Ok(Some(FileCategory::Archive))
        );
        assert!(FileCategory::parse_filter("spreadsheets").is_err());
    }

    #[test]
    fn extension_needs_a_stem() {
        assert_eq!(extension("archive.tar.GZ"), Some("gz".to_string()));
        assert_eq!(extension(".bashrc"), None);
        assert_eq!(extension("Makefile"), None);
    }

    #[test]
    fn sizes_are_formatted_like_the_file_cards() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn preview_kind_by_mime() {
        assert_eq!(PreviewKind::for_content_type("image/png"), PreviewKind::Image);
        assert_eq!(PreviewKind::for_content_type("video/mp4"), PreviewKind::Video);
        assert_eq!(PreviewKind::for_content_type("audio/mpeg"), PreviewKind::Audio);
        assert_eq!(
            PreviewKind::for_content_type("application/pdf"),
            PreviewKind::Generic
        );
    }
}
