//! Plain-data settings shared by the responder and the CLI.

use std::collections::HashMap;

/// Default URL scheme requests are addressed with (`app://host/path`).
pub const DEFAULT_SCHEME: &str = "app";

/// Default entry served for an empty request path.
pub const DEFAULT_INDEX: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Scheme stripped from incoming request URLs.
    pub scheme: String,
    /// Entry served for an empty path, if any.
    pub default_index: Option<String>,
    /// Extension (lowercase, no dot) to MIME type; checked before any table.
    pub mime_overrides: HashMap<String, String>,
    /// Check CRC-32 and size of every extracted entry.
    pub verify_checksums: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            default_index: Some(DEFAULT_INDEX.to_string()),
            mime_overrides: HashMap::new(),
            verify_checksums: true,
        }
    }
}

impl ServeConfig {
    pub fn with_mime_override(mut self, extension: &str, mime: impl Into<String>) -> Self {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.mime_overrides.insert(extension, mime.into());
        self
    }
}
