//! Content-type resolution from file extensions.

use std::collections::HashMap;
use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Types that generic lookups get wrong often enough to pin down first.
const FIXED: &[(&str, &str)] = &[
    ("wasm", "application/wasm"),
    ("mjs", "application/javascript"),
];

const GENERAL: &[(&str, &str)] = &[
    // Text
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("webmanifest", "application/manifest+json"),
    ("xml", "application/xml"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("md", "text/markdown"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    // Audio / video
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    // Other
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
];

/// Maps entry paths to MIME types.
///
/// Lookup order: user overrides, the fixed table, the general table, then
/// `application/octet-stream`. Extensions compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MimeResolver {
    overrides: HashMap<String, String>,
}

impl MimeResolver {
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(ext, mime)| (ext.trim_start_matches('.').to_ascii_lowercase(), mime.clone()))
            .collect();
        Self { overrides }
    }

    pub fn resolve(&self, path: &str) -> &str {
        let Some(ext) = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
        else {
            return OCTET_STREAM;
        };

        if let Some(mime) = self.overrides.get(&ext) {
            return mime;
        }

        lookup(FIXED, &ext)
            .or_else(|| lookup(GENERAL, &ext))
            .unwrap_or(OCTET_STREAM)
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], ext: &str) -> Option<&'static str> {
    table.iter().find(|(e, _)| *e == ext).map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_table() {
        let resolver = MimeResolver::default();
        assert_eq!(resolver.resolve("index.html"), "text/html");
        assert_eq!(resolver.resolve("img/logo.PNG"), "image/png");
        assert_eq!(resolver.resolve("/styles/site.css"), "text/css");
    }

    #[test]
    fn test_fixed_table() {
        let resolver = MimeResolver::default();
        assert_eq!(resolver.resolve("pkg/app_bg.wasm"), "application/wasm");
        assert_eq!(resolver.resolve("main.mjs"), "application/javascript");
    }

    #[test]
    fn test_unknown_defaults_to_octet_stream() {
        let resolver = MimeResolver::default();
        assert_eq!(resolver.resolve("data.bin"), OCTET_STREAM);
        assert_eq!(resolver.resolve("LICENSE"), OCTET_STREAM);
        assert_eq!(resolver.resolve("dir/"), OCTET_STREAM);
    }

    #[test]
    fn test_overrides_win() {
        let mut overrides = HashMap::new();
        overrides.insert(".WASM".to_string(), "application/x-custom".to_string());
        overrides.insert("bin".to_string(), "application/x-firmware".to_string());
        let resolver = MimeResolver::new(&overrides);

        assert_eq!(resolver.resolve("app.wasm"), "application/x-custom");
        assert_eq!(resolver.resolve("fw.bin"), "application/x-firmware");
        assert_eq!(resolver.resolve("index.html"), "text/html");
    }
}
