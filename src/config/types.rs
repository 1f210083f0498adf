// Configuration types module
// Defines the server configuration data structures

use serde::Deserialize;

/// Server configuration, shared by the app server and file server.
///
/// Loaded once at startup and immutable thereafter. The `apibase` and
/// `filebase` prefixes are normalized to start and end with `/` before
/// they are used for any matching.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Listen port: "80", ":8080", or "host:port"
    pub port: String,
    /// Path to the static file root on the server
    #[serde(alias = "root")]
    pub wwwroot: String,
    /// File served when a request names no file, e.g. index.html
    #[serde(rename = "defaultfile")]
    pub default_file: String,
    /// Base url path prefix for API handlers, e.g. /api/
    #[serde(rename = "apibase")]
    pub api_base: String,
    /// Base url path prefix for static files, e.g. /
    #[serde(rename = "filebase")]
    pub file_base: String,
    /// Tokio worker threads; None uses the runtime default (CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session cookie configuration.
///
/// Threaded through the `SessionManager` constructor; set once at server
/// construction, immutable thereafter.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Cookie name carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie max-age in seconds; 0 means session-scoped (no expiration)
    #[serde(default)]
    pub max_age: i64,
    /// Raw token length in bytes before hex encoding
    #[serde(default = "default_token_len")]
    pub token_len: usize,
}

fn default_cookie_name() -> String {
    "Session".to_string()
}

const fn default_token_len() -> usize {
    16
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age: 0,
            token_len: default_token_len(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log each request and dispatch decision
    #[serde(default = "default_access_log")]
    pub access_log: bool,
}

const fn default_access_log() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: default_access_log(),
        }
    }
}
