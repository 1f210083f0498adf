//! Session helper module
//!
//! Stateless session-token issuance and read-back via a client-held
//! cookie. No server-side session store exists here; integrators use the
//! returned token as a key into their own store.

use crate::config::SessionConfig;
use crate::handler::WebRequest;
use crate::http::cookie::{parse_cookie_header, Cookie};
use crate::logger;
use chrono::{TimeZone, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, COOKIE};
use hyper::Response;
use rand::TryRngCore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The secure random source could not supply entropy. The request
    /// must fail rather than fall back to a degenerate token.
    #[error("secure random source unavailable: {0}")]
    Entropy(String),
    #[error("invalid session header name: {0}")]
    InvalidHeaderName(String),
}

/// Capability supplying random bytes for token generation.
///
/// Production uses the OS entropy source; tests substitute a
/// deterministic one.
pub trait TokenSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), SessionError>;
}

/// Cryptographically secure token source backed by the operating system
pub struct OsEntropy;

impl TokenSource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), SessionError> {
        rand::rngs::OsRng
            .try_fill_bytes(buf)
            .map_err(|e| SessionError::Entropy(e.to_string()))
    }
}

/// Issues, reads, and clears session tokens.
///
/// Configuration is fixed at construction; one instance is shared across
/// all request tasks.
pub struct SessionManager {
    config: SessionConfig,
    source: Box<dyn TokenSource>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_source(config, Box::new(OsEntropy))
    }

    pub fn with_source(config: SessionConfig, source: Box<dyn TokenSource>) -> Self {
        Self { config, source }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Generate a fresh session token and the cookie carrying it.
    ///
    /// The token is returned so the caller can save it in a session cache
    /// or database. A configured max-age of 0 produces a session-scoped
    /// cookie with no explicit expiration.
    pub fn create_token(&self) -> Result<(String, Cookie), SessionError> {
        let token = self.generate_token()?;
        let cookie = Cookie {
            name: self.config.cookie_name.clone(),
            value: token.clone(),
            path: "/".to_string(),
            http_only: true,
            max_age: (self.config.max_age > 0).then_some(self.config.max_age),
            expires: None,
        };
        Ok((token, cookie))
    }

    /// Read the session token from a request, if one is present.
    ///
    /// Returns None for a missing cookie, an empty (cleared) value, or a
    /// cookie whose echoed expiry metadata lies in the past.
    pub fn read_token(&self, req: &WebRequest) -> Option<String> {
        let header = req.headers.get(COOKIE)?.to_str().ok()?;
        let parsed = parse_cookie_header(header, &self.config.cookie_name)?;
        if let Some(expires) = parsed.expires {
            if expires <= Utc::now() {
                logger::log_warning("expired session");
                return None;
            }
        }
        if parsed.value.is_empty() {
            return None;
        }
        Some(parsed.value)
    }

    /// Build the cookie that clears any session on the client.
    ///
    /// The value is emptied and both `Max-Age=0` and a past `Expires`
    /// date force immediate deletion. Safe to send repeatedly.
    pub fn clear_cookie(&self) -> Cookie {
        Cookie {
            name: self.config.cookie_name.clone(),
            value: String::new(),
            path: "/".to_string(),
            http_only: true,
            max_age: Some(0),
            expires: Utc.timestamp_opt(0, 0).single(),
        }
    }

    /// Secondary header-based helper: set `key: value` on the response,
    /// generating a fresh token for the key when none is supplied.
    /// Returns the key used.
    #[allow(dead_code)]
    pub fn attach_header(
        &self,
        response: &mut Response<Full<Bytes>>,
        key: Option<&str>,
        value: &str,
    ) -> Result<String, SessionError> {
        let key = match key {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => self.generate_token()?,
        };
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| SessionError::InvalidHeaderName(e.to_string()))?;
        let val = HeaderValue::from_str(value)
            .map_err(|e| SessionError::InvalidHeaderName(e.to_string()))?;
        response.headers_mut().append(name, val);
        Ok(key)
    }

    fn generate_token(&self) -> Result<String, SessionError> {
        let mut buf = vec![0u8; self.config.token_len];
        self.source.fill(&mut buf)?;
        Ok(hex::encode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{HeaderMap, Method};

    /// Deterministic source for tests
    struct FixedBytes(u8);

    impl TokenSource for FixedBytes {
        fn fill(&self, buf: &mut [u8]) -> Result<(), SessionError> {
            buf.fill(self.0);
            Ok(())
        }
    }

    /// Source that always fails, simulating entropy exhaustion
    struct NoEntropy;

    impl TokenSource for NoEntropy {
        fn fill(&self, _buf: &mut [u8]) -> Result<(), SessionError> {
            Err(SessionError::Entropy("exhausted".to_string()))
        }
    }

    fn manager() -> SessionManager {
        SessionManager::with_source(SessionConfig::default(), Box::new(FixedBytes(0xab)))
    }

    fn request_with_cookie(header: &str) -> WebRequest {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, header.parse().unwrap());
        WebRequest {
            method: Method::GET,
            path: "/".to_string(),
            headers,
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_create_token_deterministic_source() {
        let (token, cookie) = manager().create_token().unwrap();
        assert_eq!(token, "ab".repeat(16));
        assert_eq!(cookie.name, "Session");
        assert_eq!(cookie.value, token);
        assert_eq!(cookie.path, "/");
        assert!(cookie.http_only);
        // max_age 0 means session-scoped: attribute omitted
        assert!(cookie.max_age.is_none());
    }

    #[test]
    fn test_create_token_uses_configured_max_age() {
        let config = SessionConfig {
            max_age: 3600,
            ..SessionConfig::default()
        };
        let mgr = SessionManager::with_source(config, Box::new(FixedBytes(1)));
        let (_, cookie) = mgr.create_token().unwrap();
        assert_eq!(cookie.max_age, Some(3600));
    }

    #[test]
    fn test_create_then_read_round_trip() {
        let mgr = manager();
        let (token, cookie) = mgr.create_token().unwrap();
        let req = request_with_cookie(&format!("{}={}", cookie.name, cookie.value));
        assert_eq!(mgr.read_token(&req), Some(token));
    }

    #[test]
    fn test_read_token_missing() {
        let mgr = manager();
        let req = request_with_cookie("other=value");
        assert_eq!(mgr.read_token(&req), None);

        let req = WebRequest {
            method: Method::GET,
            path: "/".to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(mgr.read_token(&req), None);
    }

    #[test]
    fn test_read_token_expired() {
        let mgr = manager();
        let req =
            request_with_cookie("Session=abc; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(mgr.read_token(&req), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mgr = manager();
        let first = mgr.clear_cookie();
        let second = mgr.clear_cookie();
        assert_eq!(first, second);
        assert!(first.value.is_empty());
        assert_eq!(first.max_age, Some(0));

        // A cleared cookie echoed back reads as absent
        let req = request_with_cookie(&format!("{}=", first.name));
        assert_eq!(mgr.read_token(&req), None);
    }

    #[test]
    fn test_entropy_failure_surfaces() {
        let mgr = SessionManager::with_source(SessionConfig::default(), Box::new(NoEntropy));
        assert!(matches!(
            mgr.create_token(),
            Err(SessionError::Entropy(_))
        ));
    }

    #[test]
    fn test_attach_header_generates_key() {
        let mgr = manager();
        let mut response = Response::new(Full::new(Bytes::new()));
        let key = mgr.attach_header(&mut response, None, "hello").unwrap();
        assert_eq!(key, "ab".repeat(16));
        assert_eq!(response.headers().get(&key).unwrap(), "hello");
    }

    #[test]
    fn test_attach_header_keeps_existing_key() {
        let mgr = manager();
        let mut response = Response::new(Full::new(Bytes::new()));
        let key = mgr
            .attach_header(&mut response, Some("x-session"), "abc")
            .unwrap();
        assert_eq!(key, "x-session");
        assert_eq!(response.headers().get("x-session").unwrap(), "abc");
    }
}
