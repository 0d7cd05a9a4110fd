//! Authentication middleware for protected routes.
//!
//! Extracts the access token from the `accessToken` cookie or the
//! Authorization header (cookie wins), verifies it against the access
//! secret, and loads the account it names. Handlers downstream read the
//! authenticated account from request extensions.

use crate::config::Config;
use crate::cookies::{self, ACCESS_TOKEN_COOKIE};
use crate::crypto::{self, AccessClaims};
use crate::errors::AccountError;
use crate::models::PublicAccount;
use crate::repositories::accounts;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub pool: PgPool,
    pub config: Config,
}

/// Authenticated account injected into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account_id: Uuid,
    pub account: PublicAccount,
}

/// Extract the access token from the cookie or the Authorization header.
fn extract_access_token(req: &Request) -> Result<String, AccountError> {
    if let Some(token) = cookies::cookie_value(req.headers(), ACCESS_TOKEN_COOKIE) {
        return Ok(token);
    }

    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "acct.middleware.auth", "Request carried no access token");
            AccountError::Unauthorized("Unauthorized request".to_string())
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::debug!(target: "acct.middleware.auth", "Invalid Authorization header format");
            AccountError::Unauthorized("Unauthorized request".to_string())
        })
}

/// Authentication middleware for account endpoints.
///
/// # Response
///
/// - Returns 401 Unauthorized if the token is missing, invalid, or names
///   an account that no longer exists
/// - Continues to the next handler with `CurrentAccount` in extensions
///   if the token is valid
#[instrument(skip_all, name = "acct.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AccountError> {
    let token = extract_access_token(&req)?;

    let claims: AccessClaims = crypto::verify_jwt(
        &token,
        &state.config.access_token_secret,
        state.config.jwt_clock_skew_secs,
    )?;

    let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        tracing::debug!(target: "acct.middleware.auth", "Access token subject is not a UUID");
        AccountError::Unauthorized("invalid access token".to_string())
    })?;

    // Tokens can outlive their account; re-check existence on every request
    let account = accounts::find_by_id(&state.pool, account_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(target: "acct.middleware.auth", "Access token names a missing account");
            AccountError::Unauthorized("invalid access token".to_string())
        })?;

    req.extensions_mut().insert(CurrentAccount {
        account_id,
        account: PublicAccount::from(account),
    });

    Ok(next.run(req).await)
}
