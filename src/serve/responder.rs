use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ServeConfig;
use crate::error::Result;
use crate::io::{LocalFileReader, ReadAt};
use crate::zip::ZipArchive;

use super::mime::MimeResolver;
use super::request::request_path;

/// A response ready to hand back to the requesting engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    fn unavailable(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Answers resource requests from one archive.
pub struct Responder<R: ReadAt> {
    archive: Arc<ZipArchive<R>>,
    mime: MimeResolver,
    scheme: String,
}

impl Responder<LocalFileReader> {
    /// Open and index `path` using the default index and checksum settings from `config`.
    pub fn open(path: impl AsRef<Path>, config: &ServeConfig) -> Result<Self> {
        let mut archive =
            ZipArchive::open(path)?.with_checksum_verification(config.verify_checksums);
        if let Some(index) = &config.default_index {
            archive = archive.with_default_name(index.clone());
        }
        Ok(Self::new(Arc::new(archive), config))
    }
}

impl<R: ReadAt> Responder<R> {
    pub fn new(archive: Arc<ZipArchive<R>>, config: &ServeConfig) -> Self {
        Self {
            archive,
            mime: MimeResolver::new(&config.mime_overrides),
            scheme: config.scheme.clone(),
        }
    }

    pub fn archive(&self) -> &Arc<ZipArchive<R>> {
        &self.archive
    }

    /// Serve one request.
    ///
    /// 200 with the entry bytes on success, 404 when the request maps to no
    /// entry, 500 when the entry exists but could not be extracted.
    pub fn respond(&self, request: &str) -> Response {
        let Some(path) = request_path(&self.scheme, request) else {
            debug!(request, "request is not addressed to this archive");
            return Response::unavailable(404);
        };

        let Some(entry) = self.archive.entry(&path) else {
            debug!(request, path = %path, "resource not found");
            return Response::unavailable(404);
        };

        match self.archive.extract_entry(entry) {
            Ok(body) => {
                let headers = vec![
                    ("Content-Type", self.mime.resolve(&entry.name).to_string()),
                    ("Content-Length", body.len().to_string()),
                    ("Access-Control-Allow-Origin", "*".to_string()),
                    ("Cross-Origin-Opener-Policy", "same-origin".to_string()),
                    ("Cross-Origin-Embedder-Policy", "require-corp".to_string()),
                    ("Cross-Origin-Resource-Policy", "cross-origin".to_string()),
                ];
                Response {
                    status: 200,
                    headers,
                    body,
                }
            }
            Err(e) => {
                warn!(request, entry = %entry.name, error = %e, "failed to extract resource");
                Response::unavailable(500)
            }
        }
    }
}
