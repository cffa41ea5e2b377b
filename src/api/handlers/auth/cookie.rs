//! Session cookie directives for the two principal namespaces.
//!
//! Builders are pure functions over config returning `Set-Cookie` values;
//! handlers apply them to response headers. `auth_token` carries
//! user/organizer/customer sessions, `scan_token` carries agent sessions,
//! and the two never interfere. `Max-Age` matches the token TTL so an
//! expired-but-present cookie is harmless.

use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};

use super::state::AuthConfig;

pub const AUTH_COOKIE_NAME: &str = "auth_token";
pub const SCAN_COOKIE_NAME: &str = "scan_token";

/// Build a secure `HttpOnly` cookie for a user/organizer session token.
pub(crate) fn auth_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    session_cookie(AUTH_COOKIE_NAME, token, config)
}

pub(crate) fn clear_auth_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    clear_cookie(AUTH_COOKIE_NAME, config)
}

/// Build a secure `HttpOnly` cookie for a scan-agent session token.
pub(crate) fn scan_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    session_cookie(SCAN_COOKIE_NAME, token, config)
}

pub(crate) fn clear_scan_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    clear_cookie(SCAN_COOKIE_NAME, config)
}

fn session_cookie(
    name: &str,
    token: &str,
    config: &AuthConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.session_ttl_seconds();
    let mut cookie = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(name: &str, config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Extract a named cookie value from the request headers.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn dev_config() -> AuthConfig {
        AuthConfig::new("tikezone.com".to_string(), false)
    }

    fn prod_config() -> AuthConfig {
        AuthConfig::new("tikezone.com".to_string(), true)
    }

    #[test]
    fn auth_cookie_carries_security_attributes() {
        let cookie = auth_cookie(&dev_config(), "tok").unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("auth_token=tok; "));
        assert!(value.contains("Path=/"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn production_cookie_is_secure() {
        let cookie = auth_cookie(&prod_config(), "tok").unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));

        let cleared = clear_scan_cookie(&prod_config()).unwrap();
        assert!(cleared.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn max_age_matches_session_ttl() {
        let config = dev_config().with_session_ttl_seconds(42);
        let cookie = auth_cookie(&config, "tok").unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=42"));
    }

    #[test]
    fn clear_cookie_empties_value_immediately() {
        let cookie = clear_auth_cookie(&dev_config()).unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("auth_token=; "));
        assert!(value.contains("Max-Age=0"));
    }

    #[test]
    fn namespaces_are_distinct() {
        let auth = auth_cookie(&dev_config(), "a").unwrap();
        let scan = scan_cookie(&dev_config(), "b").unwrap();
        assert!(auth.to_str().unwrap().starts_with("auth_token="));
        assert!(scan.to_str().unwrap().starts_with("scan_token="));
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; auth_token=abc; scan_token=def"),
        );
        assert_eq!(
            cookie_value(&headers, AUTH_COOKIE_NAME).as_deref(),
            Some("abc")
        );
        assert_eq!(
            cookie_value(&headers, SCAN_COOKIE_NAME).as_deref(),
            Some("def")
        );
        assert!(cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn cookie_value_ignores_empty_and_missing_header() {
        let mut headers = HeaderMap::new();
        assert!(cookie_value(&headers, AUTH_COOKIE_NAME).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("auth_token="));
        assert!(cookie_value(&headers, AUTH_COOKIE_NAME).is_none());
    }
}
