use crate::errors::AccountError;
use axum::http::{header, HeaderMap, HeaderValue};

/// Cookie carrying the short-lived access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie carrying the rotating refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Build a Set-Cookie value for a session token.
///
/// Always HttpOnly + Secure + SameSite=Strict, scoped to the whole site.
/// No Max-Age: the JWT inside carries its own expiry.
pub fn session_cookie(name: &str, value: &str) -> Result<HeaderValue, AccountError> {
    let cookie = format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/",
        name, value
    );
    HeaderValue::try_from(cookie)
        .map_err(|e| AccountError::Internal(format!("Invalid cookie header value: {}", e)))
}

/// Build a Set-Cookie value that clears a session cookie.
pub fn expired_cookie(name: &str) -> Result<HeaderValue, AccountError> {
    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Strict; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        name
    );
    HeaderValue::try_from(cookie)
        .map_err(|e| AccountError::Internal(format!("Invalid cookie header value: {}", e)))
}

/// Append Set-Cookie headers for a fresh access/refresh token pair.
pub fn append_session_cookies(
    headers: &mut HeaderMap,
    access_token: &str,
    refresh_token: &str,
) -> Result<(), AccountError> {
    headers.append(
        header::SET_COOKIE,
        session_cookie(ACCESS_TOKEN_COOKIE, access_token)?,
    );
    headers.append(
        header::SET_COOKIE,
        session_cookie(REFRESH_TOKEN_COOKIE, refresh_token)?,
    );
    Ok(())
}

/// Append Set-Cookie headers that clear both session cookies.
pub fn append_expired_session_cookies(headers: &mut HeaderMap) -> Result<(), AccountError> {
    headers.append(header::SET_COOKIE, expired_cookie(ACCESS_TOKEN_COOKIE)?);
    headers.append(header::SET_COOKIE, expired_cookie(REFRESH_TOKEN_COOKIE)?);
    Ok(())
}

/// Read a named cookie from the request Cookie header, if present.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for pair in raw.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }

    None
}
