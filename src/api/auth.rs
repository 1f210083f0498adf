//! Auth demonstration handler
//!
//! A simple login endpoint showing how a registered handler consumes the
//! session helper. No server-side session store exists; the issued token
//! is echoed back to the caller.

use crate::handler::{WebHandler, WebRequest};
use crate::http;
use crate::http::cookie::attach_cookie;
use crate::logger;
use crate::session::SessionManager;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;

pub struct AuthHandler {
    base_path: String,
    sessions: Arc<SessionManager>,
}

impl AuthHandler {
    /// `api_base` is the normalized API prefix, e.g. "/api/"
    pub fn new(api_base: &str, sessions: Arc<SessionManager>) -> Self {
        Self {
            base_path: format!("{api_base}auth/"),
            sessions,
        }
    }
}

#[async_trait]
impl WebHandler for AuthHandler {
    fn name(&self) -> &str {
        "AuthHandler"
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    async fn handle_get(&self, req: &WebRequest) -> Response<Full<Bytes>> {
        match req.subpath(&self.base_path) {
            "check" => {
                // With a session store this key would be looked up; here
                // it is written back to the caller.
                let key = self.sessions.read_token(req).unwrap_or_default();
                http::build_html_response(format!(
                    "<html><body>The session key is {key}</body></html>"
                ))
            }
            "logout" => {
                let mut response = http::build_text_response("ok");
                attach_cookie(&mut response, &self.sessions.clear_cookie());
                response
            }
            _ => http::build_404_response(),
        }
    }

    async fn handle_post(&self, req: &WebRequest) -> Response<Full<Bytes>> {
        let username = req.form_value("username").unwrap_or_default();
        let password = req.form_value("password").unwrap_or_default();

        if username == "dog" && password == "bark" {
            match self.sessions.create_token() {
                Ok((_token, cookie)) => {
                    let mut response = http::build_text_response("Success");
                    attach_cookie(&mut response, &cookie);
                    response
                }
                Err(e) => {
                    logger::log_error(&format!("Failed to create session token: {e}"));
                    http::build_500_response()
                }
            }
        } else {
            logger::log_warning("invalid credentials");
            http::build_401_response("Invalid Credentials")
        }
    }
}
