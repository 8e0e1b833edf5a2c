//! Admin flag cookie
//!
//! The flag is an opaque claim: a cookie with the configured name whose value
//! is `true`. Nothing else about it is interpreted.

use axum::http::{header::COOKIE, HeaderMap};

const FLAG_VALUE: &str = "true";

/// Value of cookie `name`, searching every `Cookie` header
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}

/// Whether the request carries the admin flag
pub fn has_admin_flag(headers: &HeaderMap, name: &str) -> bool {
    cookie_value(headers, name) == Some(FLAG_VALUE)
}

/// `Set-Cookie` value issued after a successful admin login
pub fn admin_cookie(name: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, FLAG_VALUE, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_finds_flag_among_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; admin_access=true"));
        assert!(has_admin_flag(&headers, "admin_access"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
    }

    #[test]
    fn test_flag_must_be_true() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("admin_access=false"));
        assert!(!has_admin_flag(&headers, "admin_access"));
        assert!(!has_admin_flag(&HeaderMap::new(), "admin_access"));
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("admin_access=true"));
        assert!(has_admin_flag(&headers, "admin_access"));
    }

    #[test]
    fn test_issued_cookie_round_trips() {
        let issued = admin_cookie("admin_access", 60, false);
        assert!(issued.starts_with("admin_access=true;"));
        assert!(issued.contains("HttpOnly"));
        assert!(issued.contains("Max-Age=60"));
        assert!(!issued.contains("Secure"));
    }

    #[test]
    fn test_secure_attribute() {
        let issued = admin_cookie("admin_access", 60, true);
        assert!(issued.ends_with("; Secure"));
    }
}
