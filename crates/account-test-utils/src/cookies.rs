//! Set-Cookie parsing helpers for session flow assertions.
//!
//! The service sets its session cookies with the `Secure` attribute, so
//! HTTP clients will not replay them over the plain-HTTP test listener.
//! Tests read the values out of response headers with these helpers and
//! send them back in explicit `Cookie` headers.

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Full raw `Set-Cookie` line for a named cookie, attributes included.
///
/// Use this to assert on cookie attributes (`HttpOnly`, `Secure`, ...).
pub fn set_cookie_line(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|line| line.starts_with(&prefix))
        .map(|line| line.to_string())
}

/// Value of a named cookie from the `Set-Cookie` headers, if present.
pub fn set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let line = set_cookie_line(headers, name)?;
    let pair = line.split(';').next().unwrap_or(&line);
    let (_, value) = pair.split_once('=')?;
    Some(value.trim().to_string())
}
