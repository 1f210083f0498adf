//! Request routing dispatch module
//!
//! The root request entry point: selects between registered handlers and
//! the default file server by longest-prefix match, and exposes handler
//! registration.

use crate::config::Config;
use crate::handler::contract::{dispatch_method, WebHandler, WebRequest};
use crate::handler::static_files::FileServer;
use crate::http;
use crate::logger;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use thiserror::Error;

/// Handler registration failure, surfaced to the caller at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("handler base path '{0}' must start and end with '/'")]
    MalformedBasePath(String),
    #[error("a handler is already registered at '{0}'")]
    DuplicateBasePath(String),
}

/// Routes requests to registered handlers, falling back to the file
/// server for any path no handler claims.
///
/// Handlers are registered before serving starts; the registry is
/// read-only afterwards, so one instance is shared across all connection
/// tasks without locking.
pub struct AppServer {
    /// Registered handlers keyed by base path, longest key first so the
    /// first prefix match is the longest one
    handlers: Vec<(String, Arc<dyn WebHandler>)>,
    file_server: FileServer,
    access_log: bool,
}

impl AppServer {
    pub fn new(config: &Config) -> Self {
        Self {
            handlers: Vec::new(),
            file_server: FileServer::from_config(config),
            access_log: config.logging.access_log,
        }
    }

    /// Add a handler under its reported base path.
    ///
    /// The base path must start and end with `/`; registering a second
    /// handler at an already-claimed key is rejected rather than
    /// replacing the first.
    pub fn register_handler(
        &mut self,
        handler: Arc<dyn WebHandler>,
    ) -> Result<(), RegisterError> {
        let base = handler.base_path().to_string();
        if !base.starts_with('/') || !base.ends_with('/') {
            return Err(RegisterError::MalformedBasePath(base));
        }
        if self.handlers.iter().any(|(key, _)| key == &base) {
            return Err(RegisterError::DuplicateBasePath(base));
        }
        logger::log_registered(handler.name(), &base);
        self.handlers.push((base, handler));
        self.handlers.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Ok(())
    }

    /// The hyper service entry point: collect the request into a
    /// [`WebRequest`] and dispatch it.
    pub async fn handle_request(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();
        if self.access_log {
            logger::log_request(&parts.method, &path);
        }

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                logger::log_error(&format!("Failed to read request body: {e}"));
                return Ok(http::build_500_response());
            }
        };

        let web_req = WebRequest {
            method: parts.method,
            path,
            headers: parts.headers,
            body,
        };
        Ok(self.dispatch(&web_req).await)
    }

    /// Select the owning handler and run method dispatch against it.
    ///
    /// Prefix comparison happens on a trailing-slash-normalized copy of
    /// the path so that `/api/auth` and `/api/auth/` match the same
    /// registration; handlers receive the path as sent.
    pub async fn dispatch(&self, req: &WebRequest) -> Response<Full<Bytes>> {
        let normalized = normalize_request_path(&req.path);
        let handler = self
            .handlers
            .iter()
            .find(|(base, _)| normalized.starts_with(base.as_str()))
            .map(|(_, handler)| handler.as_ref());

        let response = match handler {
            Some(handler) => {
                if self.access_log {
                    logger::log_dispatch(handler.name(), &req.method, &req.path);
                }
                dispatch_method(handler, req).await
            }
            None => {
                if self.access_log {
                    logger::log_dispatch(self.file_server.name(), &req.method, &req.path);
                }
                dispatch_method(&self.file_server, req).await
            }
        };

        if self.access_log {
            logger::log_response(response.status().as_u16());
        }
        response
    }
}

/// Append a trailing slash if absent so prefix comparisons are consistent
/// with how base paths are registered
fn normalize_request_path(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hyper::{HeaderMap, Method};
    use std::fs as std_fs;

    /// Handler answering every request with its own name
    struct Echo {
        name: String,
        base: String,
    }

    impl Echo {
        fn new(name: &str, base: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                base: base.to_string(),
            })
        }
    }

    #[async_trait]
    impl WebHandler for Echo {
        fn name(&self) -> &str {
            &self.name
        }
        fn base_path(&self) -> &str {
            &self.base
        }
        async fn handle_get(&self, _req: &WebRequest) -> Response<Full<Bytes>> {
            http::build_text_response(&self.name)
        }
        async fn handle_post(&self, _req: &WebRequest) -> Response<Full<Bytes>> {
            http::build_text_response(&self.name)
        }
    }

    fn make_request(method: Method, path: &str) -> WebRequest {
        WebRequest {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// App server whose file root holds a single index.html
    fn make_server() -> (tempfile::TempDir, AppServer) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("wwwroot");
        std_fs::create_dir_all(&root).unwrap();
        std_fs::write(root.join("index.html"), "<html>home</html>").unwrap();

        let mut config = Config::default();
        config.wwwroot = root.to_str().unwrap().to_string();
        config.logging.access_log = false;
        (dir, AppServer::new(&config))
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let (_dir, mut server) = make_server();
        server.register_handler(Echo::new("api", "/api/")).unwrap();
        server
            .register_handler(Echo::new("auth", "/api/auth/"))
            .unwrap();

        let resp = server
            .dispatch(&make_request(Method::GET, "/api/auth/check"))
            .await;
        assert_eq!(body_text(resp).await, "auth");

        let resp = server
            .dispatch(&make_request(Method::GET, "/api/other"))
            .await;
        assert_eq!(body_text(resp).await, "api");
    }

    #[tokio::test]
    async fn test_registration_order_does_not_matter() {
        let (_dir, mut server) = make_server();
        server
            .register_handler(Echo::new("auth", "/api/auth/"))
            .unwrap();
        server.register_handler(Echo::new("api", "/api/")).unwrap();

        let resp = server
            .dispatch(&make_request(Method::GET, "/api/auth/check"))
            .await;
        assert_eq!(body_text(resp).await, "auth");
    }

    #[tokio::test]
    async fn test_trailing_slash_normalization() {
        let (_dir, mut server) = make_server();
        server
            .register_handler(Echo::new("auth", "/api/auth/"))
            .unwrap();

        let resp = server
            .dispatch(&make_request(Method::GET, "/api/auth"))
            .await;
        assert_eq!(body_text(resp).await, "auth");
    }

    #[tokio::test]
    async fn test_unmatched_path_falls_through_to_files() {
        let (_dir, mut server) = make_server();
        server.register_handler(Echo::new("api", "/api/")).unwrap();

        let resp = server.dispatch(&make_request(Method::GET, "/")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_text(resp).await, "<html>home</html>");

        let resp = server
            .dispatch(&make_request(Method::GET, "/missing"))
            .await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_unsupported_method_on_registered_handler() {
        let (_dir, mut server) = make_server();
        server.register_handler(Echo::new("api", "/api/")).unwrap();

        let resp = server
            .dispatch(&make_request(Method::DELETE, "/api/thing"))
            .await;
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_base_path() {
        let (_dir, mut server) = make_server();

        let err = server
            .register_handler(Echo::new("bad", "api/"))
            .unwrap_err();
        assert_eq!(err, RegisterError::MalformedBasePath("api/".to_string()));

        let err = server
            .register_handler(Echo::new("bad", "/api"))
            .unwrap_err();
        assert_eq!(err, RegisterError::MalformedBasePath("/api".to_string()));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_base_path() {
        let (_dir, mut server) = make_server();
        server
            .register_handler(Echo::new("first", "/api/"))
            .unwrap();

        let err = server
            .register_handler(Echo::new("second", "/api/"))
            .unwrap_err();
        assert_eq!(err, RegisterError::DuplicateBasePath("/api/".to_string()));

        // The original registration still answers
        let resp = server.dispatch(&make_request(Method::GET, "/api/x")).await;
        assert_eq!(body_text(resp).await, "first");
    }
}
