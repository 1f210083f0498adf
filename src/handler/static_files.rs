//! Static file serving module
//!
//! The default handler for any path no registered handler claims. Serves
//! bytes from the configured file root with default-file and `.html`
//! fallback; performs no MIME detection (content-type assignment is left
//! to the integrator).

use crate::config::Config;
use crate::handler::contract::{WebHandler, WebRequest};
use crate::http;
use crate::logger;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// File resolution failure, converted to an HTTP status at the handler
/// boundary. Response bodies never carry filesystem detail.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found")]
    NotFound,
    #[error("path escapes the file root")]
    Forbidden,
    #[error("file read failed: {0}")]
    Io(std::io::Error),
}

/// Serves static content from a configured root directory.
///
/// Created once at startup, immutable thereafter, used for every
/// unmatched request for the process lifetime.
pub struct FileServer {
    base_path: String,
    root: PathBuf,
    default_file: String,
}

impl FileServer {
    pub fn new(base_path: &str, root: &str, default_file: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            root: PathBuf::from(root),
            default_file: default_file.to_string(),
        }
    }

    /// Build the file server from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.file_base, &config.wwwroot, &config.default_file)
    }

    /// Resolve a request path to file bytes under the root.
    ///
    /// The remainder after the base path selects the file; an empty
    /// remainder selects the default file. A failed read is retried once
    /// with `.html` appended so extension-less routes like `/about`
    /// resolve to `about.html`.
    pub async fn load(&self, request_path: &str) -> Result<Vec<u8>, FileError> {
        let remainder = request_path
            .strip_prefix(self.base_path.as_str())
            .unwrap_or_else(|| request_path.trim_start_matches('/'));
        let relative = if remainder.is_empty() {
            self.default_file.as_str()
        } else {
            remainder
        };

        if escapes_root(relative) {
            return Err(FileError::Forbidden);
        }
        let candidate = self.root.join(relative);

        let first_err = match self.read_contained(&candidate).await {
            Ok(body) => return Ok(body),
            Err(FileError::Forbidden) => return Err(FileError::Forbidden),
            Err(e) => e,
        };

        let mut with_html = candidate.into_os_string();
        with_html.push(".html");
        match self.read_contained(Path::new(&with_html)).await {
            Ok(body) => Ok(body),
            Err(FileError::Forbidden) => Err(FileError::Forbidden),
            // Prefer the original failure when the retry found nothing
            Err(FileError::NotFound) => Err(first_err),
            Err(retry_err) => Err(retry_err),
        }
    }

    /// Read a file after verifying the resolved path stays under the
    /// canonicalized root. Symlinks pointing outside the root are caught
    /// here even though `..` segments were rejected earlier.
    async fn read_contained(&self, candidate: &Path) -> Result<Vec<u8>, FileError> {
        let root = fs::canonicalize(&self.root).await.map_err(io_error)?;
        let resolved = fs::canonicalize(candidate).await.map_err(io_error)?;
        if !resolved.starts_with(&root) {
            return Err(FileError::Forbidden);
        }

        let meta = fs::metadata(&resolved).await.map_err(io_error)?;
        if !meta.is_file() {
            return Err(FileError::NotFound);
        }
        fs::read(&resolved).await.map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> FileError {
    if e.kind() == ErrorKind::NotFound {
        FileError::NotFound
    } else {
        FileError::Io(e)
    }
}

/// True when a relative path could resolve outside the root: parent-dir
/// segments, absolute paths, and drive prefixes are all rejected.
fn escapes_root(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
}

#[async_trait]
impl WebHandler for FileServer {
    fn name(&self) -> &str {
        "FileServer"
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    async fn handle_get(&self, req: &WebRequest) -> Response<Full<Bytes>> {
        match self.load(&req.path).await {
            Ok(body) => http::build_bytes_response(body),
            Err(FileError::NotFound) => {
                logger::log_warning(&format!("No file for request path {}", req.path));
                http::build_404_response()
            }
            Err(FileError::Forbidden) => {
                logger::log_warning(&format!("Path traversal attempt blocked: {}", req.path));
                http::build_403_response()
            }
            Err(FileError::Io(e)) => {
                logger::log_error(&format!("Failed to read file for '{}': {e}", req.path));
                http::build_500_response()
            }
        }
    }

    async fn handle_post(&self, _req: &WebRequest) -> Response<Full<Bytes>> {
        // Upload support is reserved; recognized but unbuilt.
        http::build_501_response()
    }
}
