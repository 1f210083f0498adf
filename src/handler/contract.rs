//! Handler contract module
//!
//! Defines the polymorphic surface every routed endpoint exposes and
//! centralizes HTTP-method dispatch so handlers need not reimplement it.

use crate::http;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Response};

/// The collected per-request view handlers receive.
///
/// The router collects the body up front so handlers and tests work with
/// plain values instead of a live hyper body stream.
#[derive(Debug, Clone)]
pub struct WebRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WebRequest {
    /// The request path with a handler's base path stripped off.
    ///
    /// Base paths end in `/`; a request naming the base itself without
    /// the trailing slash yields an empty remainder.
    pub fn subpath<'a>(&'a self, base: &str) -> &'a str {
        self.path.strip_prefix(base).unwrap_or("")
    }

    /// Look up a field in a urlencoded form body
    pub fn form_value(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(&self.body)
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Base interface for all routed endpoints.
///
/// Only the common methods GET and POST are supported; handlers needing
/// other methods implement [`WebFullHandler`] instead.
#[async_trait]
pub trait WebHandler: Send + Sync {
    /// Diagnostic identity
    fn name(&self) -> &str;
    /// The routing key; must be stable for the handler's lifetime
    fn base_path(&self) -> &str;
    async fn handle_get(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_post(&self, req: &WebRequest) -> Response<Full<Bytes>>;
}

/// Same as [`WebHandler`], but with an entry point for every HTTP method.
/// Use this for handlers that need PUT, PATCH, TRACE, etc.
#[allow(dead_code)]
#[async_trait]
pub trait WebFullHandler: Send + Sync {
    fn name(&self) -> &str;
    fn base_path(&self) -> &str;
    async fn handle_get(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_post(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_put(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_patch(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_head(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_options(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_delete(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_trace(&self, req: &WebRequest) -> Response<Full<Bytes>>;
    async fn handle_connect(&self, req: &WebRequest) -> Response<Full<Bytes>>;
}

/// Dispatch a request to the matching entry point of a basic handler.
///
/// GET and POST reach the handler; every other method is answered with
/// 405 without invoking it.
pub async fn dispatch_method(
    handler: &dyn WebHandler,
    req: &WebRequest,
) -> Response<Full<Bytes>> {
    match &req.method {
        &Method::GET => handler.handle_get(req).await,
        &Method::POST => handler.handle_post(req).await,
        _ => http::build_405_response(),
    }
}

/// Dispatch a request to the matching entry point of a full handler.
///
/// Every method has a defined entry point, so nothing is rejected here.
#[allow(dead_code)]
pub async fn dispatch_full_method(
    handler: &dyn WebFullHandler,
    req: &WebRequest,
) -> Response<Full<Bytes>> {
    match &req.method {
        &Method::GET => handler.handle_get(req).await,
        &Method::POST => handler.handle_post(req).await,
        &Method::PUT => handler.handle_put(req).await,
        &Method::PATCH => handler.handle_patch(req).await,
        &Method::HEAD => handler.handle_head(req).await,
        &Method::OPTIONS => handler.handle_options(req).await,
        &Method::DELETE => handler.handle_delete(req).await,
        &Method::TRACE => handler.handle_trace(req).await,
        _ => handler.handle_connect(req).await,
    }
}
