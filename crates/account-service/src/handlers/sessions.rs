//! Session handlers.
//!
//! Implements session endpoints:
//!
//! - `POST /api/v1/accounts/login` - Log in with username or email (public)
//! - `POST /api/v1/accounts/refresh-token` - Rotate the refresh token (public)
//! - `POST /api/v1/accounts/logout` - Clear the stored refresh token (protected)
//! - `POST /api/v1/accounts/change-password` - Change the password (protected)
//!
//! # Security
//!
//! - Tokens are returned in the body and mirrored into HttpOnly cookies
//! - The refresh endpoint accepts the token from cookie or body; a stored
//!   token only verifies once, replays invalidate the session
//! - Request bodies are deserialized manually so malformed JSON maps to
//!   a 400 in the uniform error envelope

use crate::cookies::{self, REFRESH_TOKEN_COOKIE};
use crate::errors::AccountError;
use crate::middleware::CurrentAccount;
use crate::models::{
    ApiResponse, ChangePasswordRequest, LoginRequest, LoginResponse, PublicAccount,
    RefreshRequest, RefreshResponse,
};
use crate::routes::AppState;
use crate::services::session_service;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/accounts/login
///
/// Authenticates by username or email plus password, stores the new
/// refresh token, and returns the account with both tokens.
///
/// # Response
///
/// - 200 OK: Logged in; Set-Cookie carries both tokens
/// - 400 Bad Request: Missing identifier or password
/// - 401 Unauthorized: Wrong password
/// - 404 Not Found: No account with that identifier
#[instrument(
    skip_all,
    name = "acct.sessions.login",
    fields(method = "POST", endpoint = "/api/v1/accounts/login")
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<LoginResponse>>), AccountError> {
    let request: LoginRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "acct.handlers.sessions", error = %e, "Invalid request body");
        AccountError::Validation("Invalid request body".to_string())
    })?;

    let (account, tokens) = session_service::login(&state.pool, &state.config, &request).await?;

    let mut headers = HeaderMap::new();
    cookies::append_session_cookies(&mut headers, &tokens.access_token, &tokens.refresh_token)?;

    let payload = LoginResponse {
        account: PublicAccount::from(account),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::new(
            200,
            payload,
            "Account logged in successfully",
        )),
    ))
}

/// Handler for POST /api/v1/accounts/refresh-token
///
/// Verifies the presented refresh token against the stored one and
/// rotates it, returning and setting a fresh pair. The token is read
/// from the `refreshToken` cookie first, then the JSON body.
///
/// # Response
///
/// - 200 OK: New token pair returned and set as cookies
/// - 400 Bad Request: Body present but not valid JSON
/// - 401 Unauthorized: Token missing, invalid, expired, or already used
#[instrument(
    skip_all,
    name = "acct.sessions.refresh",
    fields(method = "POST", endpoint = "/api/v1/accounts/refresh-token")
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<RefreshResponse>>), AccountError> {
    let from_body = if body.is_empty() {
        None
    } else {
        let request: RefreshRequest = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(target: "acct.handlers.sessions", error = %e, "Invalid request body");
            AccountError::Validation("Invalid request body".to_string())
        })?;
        request.refresh_token
    };

    let presented = cookies::cookie_value(&headers, REFRESH_TOKEN_COOKIE).or(from_body);

    let tokens =
        session_service::refresh(&state.pool, &state.config, presented.as_deref()).await?;

    let mut response_headers = HeaderMap::new();
    cookies::append_session_cookies(
        &mut response_headers,
        &tokens.access_token,
        &tokens.refresh_token,
    )?;

    let payload = RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((
        StatusCode::OK,
        response_headers,
        Json(ApiResponse::new(200, payload, "Access token refreshed")),
    ))
}

/// Handler for POST /api/v1/accounts/logout
///
/// Clears the stored refresh token and expires both session cookies.
///
/// # Response
///
/// - 200 OK: Logged out
/// - 401 Unauthorized: Invalid or missing access token
#[instrument(
    skip_all,
    name = "acct.sessions.logout",
    fields(method = "POST", endpoint = "/api/v1/accounts/logout")
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<serde_json::Value>>), AccountError> {
    session_service::logout(&state.pool, current.account_id).await?;

    let mut headers = HeaderMap::new();
    cookies::append_expired_session_cookies(&mut headers)?;

    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::new(
            200,
            serde_json::json!({}),
            "Account logged out",
        )),
    ))
}

/// Handler for POST /api/v1/accounts/change-password
///
/// Verifies the old password and stores a hash of the new one.
///
/// # Response
///
/// - 200 OK: Password changed
/// - 400 Bad Request: Missing field or wrong old password
/// - 401 Unauthorized: Invalid or missing access token
#[instrument(
    skip_all,
    name = "acct.sessions.change_password",
    fields(method = "POST", endpoint = "/api/v1/accounts/change-password")
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    body: Bytes,
) -> Result<Json<ApiResponse<serde_json::Value>>, AccountError> {
    let request: ChangePasswordRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "acct.handlers.sessions", error = %e, "Invalid request body");
        AccountError::Validation("Invalid request body".to_string())
    })?;

    session_service::change_password(&state.pool, &state.config, current.account_id, &request)
        .await?;

    Ok(Json(ApiResponse::new(
        200,
        serde_json::json!({}),
        "Password changed successfully",
    )))
}
