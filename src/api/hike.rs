//! Trail lookup demonstration handler
//!
//! An informational endpoint with no state: trail facts are derived
//! deterministically from the path variable.

use crate::handler::{WebHandler, WebRequest};
use crate::http;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

pub struct HikeHandler {
    base_path: String,
}

impl HikeHandler {
    /// `api_base` is the normalized API prefix, e.g. "/api/"
    pub fn new(api_base: &str) -> Self {
        Self {
            base_path: format!("{api_base}hike/"),
        }
    }
}

/// Trail length rule: one unit per character of the trail name
fn trail_length(trail: &str) -> usize {
    trail.chars().count()
}

#[async_trait]
impl WebHandler for HikeHandler {
    fn name(&self) -> &str {
        "HikeHandler"
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    async fn handle_get(&self, req: &WebRequest) -> Response<Full<Bytes>> {
        // Expected shape: <trail>/length
        let mut segments = req.subpath(&self.base_path).split('/');
        let trail = segments.next().unwrap_or_default();
        let operation = segments.next().unwrap_or_default();

        if trail.is_empty() || segments.next().is_some() {
            return http::build_404_response();
        }

        match operation {
            "length" => http::json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "trail": trail,
                    "length": trail_length(trail),
                }),
            ),
            _ => http::build_404_response(),
        }
    }

    async fn handle_post(&self, _req: &WebRequest) -> Response<Full<Bytes>> {
        http::build_404_response()
    }
}
