//! File-extension to media-type mapping
//!
//! The table is built once on first use and never mutated afterwards.

use std::{collections::HashMap, sync::OnceLock};

use crate::content_type::ContentType;

/// `(extension, type, subtype)`, sorted by extension
static EXTENSIONS: &[(&str, &str, &str)] = &[
    ("7z", "application", "x-7z-compressed"),
    ("aac", "audio", "aac"),
    ("avif", "image", "avif"),
    ("bin", "application", "octet-stream"),
    ("bmp", "image", "bmp"),
    ("css", "text", "css"),
    ("csv", "text", "csv"),
    ("gif", "image", "gif"),
    ("gz", "application", "gzip"),
    ("htm", "text", "html"),
    ("html", "text", "html"),
    ("ico", "image", "x-icon"),
    ("jpeg", "image", "jpeg"),
    ("jpg", "image", "jpeg"),
    ("js", "text", "javascript"),
    ("json", "application", "json"),
    ("md", "text", "markdown"),
    ("mjs", "text", "javascript"),
    ("mp3", "audio", "mpeg"),
    ("mp4", "video", "mp4"),
    ("ogg", "audio", "ogg"),
    ("otf", "font", "otf"),
    ("pdf", "application", "pdf"),
    ("png", "image", "png"),
    ("svg", "image", "svg+xml"),
    ("tar", "application", "x-tar"),
    ("tif", "image", "tiff"),
    ("tiff", "image", "tiff"),
    ("ttf", "font", "ttf"),
    ("txt", "text", "plain"),
    ("wasm", "application", "wasm"),
    ("wav", "audio", "wav"),
    ("webm", "video", "webm"),
    ("webp", "image", "webp"),
    ("woff", "font", "woff"),
    ("woff2", "font", "woff2"),
    ("xhtml", "application", "xhtml+xml"),
    ("xml", "application", "xml"),
    ("zip", "application", "zip"),
];

fn extension_table() -> &'static HashMap<&'static str, Vec<ContentType>> {
    static TABLE: OnceLock<HashMap<&'static str, Vec<ContentType>>> = OnceLock::new();

    TABLE.get_or_init(|| {
        let mut table: HashMap<&'static str, Vec<ContentType>> = HashMap::new();
        for &(extension, content_type, content_subtype) in EXTENSIONS {
            table
                .entry(extension)
                .or_default()
                .push(ContentType::new(content_type, content_subtype));
        }
        table
    })
}

fn normalize_extension(extension: &str) -> String {
    extension
        .trim()
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

impl ContentType {
    /// All media types registered for a file extension. A leading dot and
    /// mixed case are tolerated.
    #[must_use]
    pub fn from_file_extension(extension: &str) -> Vec<ContentType> {
        extension_table()
            .get(normalize_extension(extension).as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Like [ContentType::from_file_extension], picking the first match
    /// and falling back to `application/octet-stream`. Text types without
    /// a charset get `charset=utf-8`.
    #[must_use]
    pub fn default_for_file_extension(extension: &str) -> ContentType {
        let content_type = Self::from_file_extension(extension)
            .into_iter()
            .next()
            .unwrap_or_else(Self::application_octet_stream);

        if content_type.content_type() == "text" && content_type.charset().is_none() {
            content_type.with_charset("utf-8")
        } else {
            content_type
        }
    }

    /// File extensions registered for this media type, ignoring
    /// parameters.
    #[must_use]
    pub fn file_extensions(&self) -> Vec<&'static str> {
        let bare = self.without_parameters();

        EXTENSIONS
            .iter()
            .filter(|&&(_, content_type, content_subtype)| {
                ContentType::new(content_type, content_subtype) == bare
            })
            .map(|&(extension, _, _)| extension)
            .collect()
    }
}
