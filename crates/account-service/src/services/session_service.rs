//! Session lifecycle: login, logout, refresh rotation, password changes.
//!
//! Refresh tokens rotate on every use. The rotation is a single conditional
//! UPDATE comparing the presented token against the stored one, so a stale
//! or replayed token can never mutate state.

use crate::config::Config;
use crate::crypto::{self, RefreshClaims};
use crate::errors::AccountError;
use crate::models::{Account, ChangePasswordRequest, LoginRequest, TokenPair};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_session_operation;
use crate::repositories::accounts;
use crate::services::token_service;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Authenticate an account and start a session.
///
/// # Steps
///
/// 1. Resolve the identifier (username or email, trimmed and lowercased)
/// 2. Look up the account by identifier
/// 3. Verify the password against the stored bcrypt hash
/// 4. Issue an access/refresh token pair
/// 5. Persist the refresh token (targeted single-column write)
///
/// Returns the loaded account alongside the tokens; the handler projects it
/// to the public shape and sets both session cookies.
#[instrument(skip_all)]
pub async fn login(
    pool: &PgPool,
    config: &Config,
    request: &LoginRequest,
) -> Result<(Account, TokenPair), AccountError> {
    let identifier = match normalize_identifier(request.username.as_deref())
        .or_else(|| normalize_identifier(request.email.as_deref()))
    {
        Some(identifier) => identifier,
        None => {
            record_session_operation("login", "validation_error");
            return Err(AccountError::Validation(
                "Username or email is required".to_string(),
            ));
        }
    };

    let password = match request.password.as_deref() {
        Some(password) if !password.is_empty() => password,
        _ => {
            record_session_operation("login", "validation_error");
            return Err(AccountError::Validation("Password is required".to_string()));
        }
    };

    let account = match accounts::find_by_login(pool, &identifier).await? {
        Some(account) => account,
        None => {
            tracing::warn!(
                identifier_hash = %hash_for_correlation(&identifier),
                "Login attempt for unknown identifier"
            );
            record_session_operation("login", "not_found");
            return Err(AccountError::NotFound("Account does not exist".to_string()));
        }
    };

    if !crypto::verify_password(password, &account.password_hash)? {
        tracing::warn!(
            identifier_hash = %hash_for_correlation(&identifier),
            "Login attempt with wrong password"
        );
        record_session_operation("login", "invalid_credentials");
        return Err(AccountError::Unauthorized(
            "Invalid account credentials".to_string(),
        ));
    }

    let tokens = token_service::issue_token_pair(config, &account)?;

    accounts::update_refresh_token(pool, account.account_id, &tokens.refresh_token).await?;

    record_session_operation("login", "success");
    tracing::info!(
        identifier_hash = %hash_for_correlation(&identifier),
        "Account logged in"
    );

    Ok((account, tokens))
}

/// End a session by discarding the stored refresh token.
///
/// Both columns go to NULL, so any refresh token issued before the logout
/// can no longer win the rotation compare.
#[instrument(skip_all)]
pub async fn logout(pool: &PgPool, account_id: Uuid) -> Result<(), AccountError> {
    if let Err(e) = accounts::clear_refresh_token(pool, account_id).await {
        record_session_operation("logout", "error");
        return Err(e);
    }

    record_session_operation("logout", "success");
    Ok(())
}

/// Rotate a refresh token into a fresh token pair.
///
/// # Steps
///
/// 1. Require a presented token
/// 2. Verify signature and expiry as refresh claims
/// 3. Load the account from the token subject
/// 4. Issue a new pair
/// 5. Swap the stored token in one conditional UPDATE
///
/// The conditional UPDATE is the anti-replay invariant: only the most
/// recently issued refresh token matches the stored value, so of two
/// concurrent refreshes presenting the same token exactly one can win; the
/// loser sees zero rows affected and no state changes.
#[instrument(skip_all)]
pub async fn refresh(
    pool: &PgPool,
    config: &Config,
    presented: Option<&str>,
) -> Result<TokenPair, AccountError> {
    let presented = match presented {
        Some(token) if !token.is_empty() => token,
        _ => {
            record_session_operation("refresh", "invalid_token");
            return Err(AccountError::Unauthorized(
                "unauthorized request".to_string(),
            ));
        }
    };

    let claims: RefreshClaims = match crypto::verify_jwt(
        presented,
        &config.refresh_token_secret,
        config.jwt_clock_skew_secs,
    ) {
        Ok(claims) => claims,
        Err(e) => {
            record_session_operation("refresh", "invalid_token");
            return Err(e);
        }
    };

    let account_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Refresh token carried a non-UUID subject");
            record_session_operation("refresh", "invalid_token");
            return Err(AccountError::Unauthorized(
                "invalid refresh token".to_string(),
            ));
        }
    };

    let account = match accounts::find_by_id(pool, account_id).await? {
        Some(account) => account,
        None => {
            tracing::warn!(
                account_hash = %hash_for_correlation(&claims.sub),
                "Refresh token for a missing account"
            );
            record_session_operation("refresh", "invalid_token");
            return Err(AccountError::Unauthorized(
                "invalid refresh token".to_string(),
            ));
        }
    };

    let tokens = token_service::issue_token_pair(config, &account)?;

    let rotated =
        accounts::rotate_refresh_token(pool, account.account_id, presented, &tokens.refresh_token)
            .await?;

    if !rotated {
        tracing::warn!(
            account_hash = %hash_for_correlation(&claims.sub),
            "Refresh token reuse detected"
        );
        record_session_operation("refresh", "reuse_detected");
        return Err(AccountError::Unauthorized(
            "refresh token reuse detected".to_string(),
        ));
    }

    record_session_operation("refresh", "success");
    Ok(tokens)
}

/// Change an account's password after verifying the current one.
///
/// The new password is hashed here at the configured cost; persistence is a
/// targeted single-column UPDATE.
#[instrument(skip_all)]
pub async fn change_password(
    pool: &PgPool,
    config: &Config,
    account_id: Uuid,
    request: &ChangePasswordRequest,
) -> Result<(), AccountError> {
    let old_password = match request.old_password.as_deref() {
        Some(password) if !password.is_empty() => password,
        _ => {
            record_session_operation("change_password", "validation_error");
            return Err(AccountError::Validation(
                "Old password is required".to_string(),
            ));
        }
    };

    let new_password = match request.new_password.as_deref() {
        Some(password) if !password.is_empty() => password,
        _ => {
            record_session_operation("change_password", "validation_error");
            return Err(AccountError::Validation(
                "New password is required".to_string(),
            ));
        }
    };

    let account = match accounts::find_by_id(pool, account_id).await? {
        Some(account) => account,
        None => {
            record_session_operation("change_password", "not_found");
            return Err(AccountError::NotFound("Account does not exist".to_string()));
        }
    };

    if !crypto::verify_password(old_password, &account.password_hash)? {
        record_session_operation("change_password", "validation_error");
        return Err(AccountError::Validation("Invalid old password".to_string()));
    }

    let password_hash = crypto::hash_password(new_password, config.bcrypt_cost)?;
    accounts::update_password(pool, account_id, &password_hash).await?;

    record_session_operation("change_password", "success");
    tracing::info!(
        account_hash = %hash_for_correlation(&account_id.to_string()),
        "Password changed"
    );

    Ok(())
}

/// Normalize a login identifier: trim, reject empty, lowercase.
///
/// Username and email columns are stored lowercase, so the identifier is
/// lowercased before the lookup.
fn normalize_identifier(field: Option<&str>) -> Option<String> {
    let trimmed = field?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}
