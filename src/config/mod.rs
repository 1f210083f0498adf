// Configuration module entry point
// Loads server configuration from a JSON file with layered defaults

mod types;

use crate::logger;
use std::net::SocketAddr;

pub use types::{Config, LoggingConfig, SessionConfig};

impl Config {
    /// Load configuration from the given file path (extension optional).
    ///
    /// Sources, later ones winning: built-in defaults, the config file,
    /// then `WEBBER_`-prefixed environment variables. Prefix fields are
    /// normalized before the config is returned.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("port", "80")?
            .set_default("wwwroot", "wwwroot")?
            .set_default("defaultfile", "index.html")?
            .set_default("apibase", "api")?
            .set_default("filebase", "/")?
            .add_source(config::File::with_name(config_path))
            .add_source(config::Environment::with_prefix("WEBBER"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        Ok(cfg.normalized())
    }

    /// Load configuration, falling back to built-in defaults.
    ///
    /// A missing or malformed config file is logged and never fatal.
    pub fn load_or_default(config_path: &str) -> Self {
        Self::load_from(config_path).unwrap_or_else(|e| {
            logger::log_config_error(config_path, &e);
            Self::default()
        })
    }

    /// Derive the listen address from the configured port string.
    ///
    /// Accepts a bare port ("80"), a colon-prefixed port (":8080"), or a
    /// full "host:port" pair. Bare ports bind all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let port = self.port.trim();
        let candidate = if port.starts_with(':') {
            format!("0.0.0.0{port}")
        } else if port.contains(':') {
            port.to_string()
        } else {
            format!("0.0.0.0:{port}")
        };
        candidate
            .parse()
            .map_err(|e| format!("Invalid listen address '{port}': {e}"))
    }

    fn normalized(mut self) -> Self {
        self.api_base = normalize_prefix(&self.api_base);
        self.file_base = normalize_prefix(&self.file_base);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: "80".to_string(),
            wwwroot: "wwwroot".to_string(),
            default_file: "index.html".to_string(),
            api_base: "/api/".to_string(),
            file_base: "/".to_string(),
            workers: None,
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Normalize a base-path prefix so it starts and ends with `/`.
///
/// Prefix comparisons during routing assume this form; "api" and "/api"
/// both become "/api/", and "/" stays "/".
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
