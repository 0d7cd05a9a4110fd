use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AccountError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Maximum allowed token size in bytes (4KB).
///
/// Tokens larger than this are rejected before any base64 decoding or
/// signature verification. Typical tokens here are 300-600 bytes; the
/// ceiling stops oversized-token resource exhaustion at the front door.
pub const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Claims carried by a short-lived access token.
///
/// `sub` is the account UUID. The `jti` is random per issuance so two
/// tokens minted in the same second are never byte-identical.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Redacts account identifiers; they must not reach logs via Debug.
impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("sub", &"[REDACTED]")
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

/// Claims carried by a rotating refresh token. Deliberately minimal:
/// everything else is re-read from the account at refresh time.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl fmt::Debug for RefreshClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshClaims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

/// Sign claims as an HS256 JWT.
///
/// Access and refresh tokens use separate secrets, so a token of one kind
/// can never verify as the other.
#[instrument(skip_all)]
pub fn sign_jwt<T: Serialize>(claims: &T, secret: &SecretString) -> Result<String, AccountError> {
    let encoding_key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &encoding_key)
        .map_err(|e| AccountError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an HS256 JWT and extract its claims.
///
/// Validates:
/// - Token size (must be <= MAX_TOKEN_SIZE_BYTES), checked before parsing
/// - Signature
/// - Expiration (`exp` claim) with the configured leeway
///
/// The returned error wraps the verification failure text so callers can
/// surface it (expired vs. malformed vs. bad signature).
#[instrument(skip_all)]
pub fn verify_jwt<T: DeserializeOwned>(
    token: &str,
    secret: &SecretString,
    clock_skew_secs: u64,
) -> Result<T, AccountError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "crypto",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AccountError::Unauthorized(
            "Invalid token: size exceeds maximum allowed".to_string(),
        ));
    }

    let decoding_key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = clock_skew_secs;

    let token_data = decode::<T>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        AccountError::Unauthorized(format!("Invalid token: {}", e))
    })?;

    Ok(token_data.claims)
}

/// Hash a password with bcrypt using a configurable cost factor.
///
/// The cost is validated here as well as at config load, so a direct
/// caller can never produce an insecurely cheap hash by accident.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AccountError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AccountError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AccountError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AccountError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AccountError::Crypto(format!("Password verification failed: {}", e)))
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, AccountError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|e| AccountError::Crypto(format!("Random bytes generation failed: {}", e)))?;
    Ok(bytes)
}

/// Generate a hex string from `len` random bytes (output is `2 * len` chars).
///
/// Used for token `jti` values and staged-upload filenames.
pub fn generate_random_hex(len: usize) -> Result<String, AccountError> {
    let bytes = generate_random_bytes(len)?;
    Ok(hex::encode(bytes))
}
