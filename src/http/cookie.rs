//! Cookie codec module
//!
//! Builds `Set-Cookie` header values and parses request `Cookie` headers.
//! Only the attributes the session helper needs are supported: `Path`,
//! `HttpOnly`, `Max-Age`, and `Expires`.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::Response;

/// A cookie to be attached to a response via `Set-Cookie`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
    /// Lifetime in seconds; None omits the attribute (session-scoped)
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Serialize into a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(expires) = self.expires {
            out.push_str("; Expires=");
            out.push_str(&format_cookie_date(expires));
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// Attach a cookie to a response via `Set-Cookie`
pub fn attach_cookie(response: &mut Response<Full<Bytes>>, cookie: &Cookie) {
    match HeaderValue::from_str(&cookie.to_header_value()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => {
            crate::logger::log_error(&format!("Failed to encode cookie '{}': {e}", cookie.name));
        }
    }
}

/// A cookie read back from a request `Cookie` header.
///
/// Request headers normally carry name/value pairs only; an `Expires`
/// attribute is captured when a client echoes one so the caller can apply
/// the cookie's own expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookie {
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
}

/// Find the named cookie in a `Cookie` header value
pub fn parse_cookie_header(header: &str, name: &str) -> Option<ParsedCookie> {
    let mut value = None;
    let mut expires = None;

    for pair in header.split(';') {
        let Some((key, val)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();
        if key == name {
            value = Some(val.to_string());
        } else if key.eq_ignore_ascii_case("expires") {
            expires = parse_cookie_date(val);
        }
    }

    value.map(|value| ParsedCookie { value, expires })
}

/// Format a date in the cookie `Expires` form, e.g. "Wed, 21 Oct 2015 07:28:00 GMT"
pub fn format_cookie_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse a cookie `Expires` date
pub fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_header_value_session_scoped() {
        let cookie = Cookie {
            name: "Session".to_string(),
            value: "abc123".to_string(),
            path: "/".to_string(),
            http_only: true,
            max_age: None,
            expires: None,
        };
        assert_eq!(cookie.to_header_value(), "Session=abc123; Path=/; HttpOnly");
    }

    #[test]
    fn test_to_header_value_with_max_age() {
        let cookie = Cookie {
            name: "Session".to_string(),
            value: "abc123".to_string(),
            path: "/".to_string(),
            http_only: true,
            max_age: Some(3600),
            expires: None,
        };
        assert_eq!(
            cookie.to_header_value(),
            "Session=abc123; Path=/; Max-Age=3600; HttpOnly"
        );
    }

    #[test]
    fn test_parse_cookie_header() {
        let parsed = parse_cookie_header("Session=abc123", "Session").unwrap();
        assert_eq!(parsed.value, "abc123");
        assert!(parsed.expires.is_none());

        let parsed = parse_cookie_header("other=x; Session=abc123; more=y", "Session").unwrap();
        assert_eq!(parsed.value, "abc123");

        assert!(parse_cookie_header("other=x", "Session").is_none());
        assert!(parse_cookie_header("", "Session").is_none());
    }

    #[test]
    fn test_parse_cookie_header_with_expires() {
        let header = "Session=abc123; Expires=Wed, 21 Oct 2015 07:28:00 GMT";
        let parsed = parse_cookie_header(header, "Session").unwrap();
        assert_eq!(parsed.value, "abc123");
        let expires = parsed.expires.unwrap();
        assert_eq!(expires, Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap());
    }

    #[test]
    fn test_cookie_date_round_trip() {
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let formatted = format_cookie_date(date);
        assert_eq!(parse_cookie_date(&formatted), Some(date));
    }
}
