//! Token pair issuance for the session lifecycle.
//!
//! Signs a short-lived access token and a long-lived refresh token for an
//! account. Both tokens are HS256 JWTs under separate secrets, so one kind
//! can never verify as the other.

use crate::config::Config;
use crate::crypto::{self, AccessClaims, RefreshClaims};
use crate::errors::AccountError;
use crate::models::{Account, TokenPair};

// 16 random bytes rendered as 32 hex chars. The random jti keeps two tokens
// issued within the same second distinct.
const JTI_RANDOM_BYTES: usize = 16;

/// Issue a fresh access/refresh token pair for an account.
///
/// # Steps
///
/// 1. Build access claims (`sub`, `username`, `email`, `iat`, `exp`, `jti`)
/// 2. Build refresh claims (`sub`, `iat`, `exp`, `jti`)
/// 3. Sign each with its own secret
///
/// Signing failures map to `TokenGeneration` with the cause preserved.
pub fn issue_token_pair(config: &Config, account: &Account) -> Result<TokenPair, AccountError> {
    let now = chrono::Utc::now().timestamp();
    let sub = account.account_id.to_string();

    let access_claims = AccessClaims {
        sub: sub.clone(),
        username: account.username.clone(),
        email: account.email.clone(),
        iat: now,
        exp: now + config.access_token_ttl_secs,
        jti: crypto::generate_random_hex(JTI_RANDOM_BYTES)?,
    };

    let refresh_claims = RefreshClaims {
        sub,
        iat: now,
        exp: now + config.refresh_token_ttl_secs,
        jti: crypto::generate_random_hex(JTI_RANDOM_BYTES)?,
    };

    let access_token = crypto::sign_jwt(&access_claims, &config.access_token_secret)
        .map_err(|e| AccountError::TokenGeneration(format!("Failed to sign access token: {}", e)))?;

    let refresh_token = crypto::sign_jwt(&refresh_claims, &config.refresh_token_secret)
        .map_err(|e| {
            AccountError::TokenGeneration(format!("Failed to sign refresh token: {}", e))
        })?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
