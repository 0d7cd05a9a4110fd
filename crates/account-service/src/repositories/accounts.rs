//! Account repository module for database operations.
//!
//! Provides database access for account records: creation, lookup by
//! login identifier, credential updates, and refresh token storage.

use crate::errors::AccountError;
use crate::models::Account;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new account.
///
/// Username and email must already be normalized (trimmed, lowercased)
/// by the caller. Returns the created row.
pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    full_name: &str,
    password_hash: &str,
    avatar_url: &str,
    cover_image_url: Option<&str>,
) -> Result<Account, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (username, email, full_name, password_hash, avatar_url, cover_image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(full_name)
    .bind(password_hash)
    .bind(avatar_url)
    .bind(cover_image_url)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        // Check for unique constraint violation (duplicate username or email)
        let text = e.to_string();
        if text.contains("accounts_username_unique") || text.contains("accounts_email_unique") {
            AccountError::Conflict("Account with email or username already exists".to_string())
        } else {
            AccountError::Database(format!("Failed to create account: {}", e))
        }
    })?;

    Ok(account)
}

/// Get an account by login identifier (matches username or email).
pub async fn find_by_login(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<Account>, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        FROM accounts
        WHERE username = $1 OR email = $1
        "#,
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to fetch account by login: {}", e)))?;

    Ok(account)
}

/// Get an account by account_id.
pub async fn find_by_id(pool: &PgPool, account_id: Uuid) -> Result<Option<Account>, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        FROM accounts
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to fetch account by id: {}", e)))?;

    Ok(account)
}

/// Get an account by exact username.
pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Account>, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        FROM accounts
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to fetch account by username: {}", e)))?;

    Ok(account)
}

/// Check whether a username or email is already taken.
///
/// Used as the registration precheck; the unique constraints remain the
/// backstop for concurrent registrations.
pub async fn username_or_email_exists(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<bool, AccountError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM accounts
            WHERE username = $1 OR email = $2
        )
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to check account existence: {}", e)))?;

    Ok(exists.0)
}

/// Store a freshly issued refresh token and stamp its issuance time.
pub async fn update_refresh_token(
    pool: &PgPool,
    account_id: Uuid,
    refresh_token: &str,
) -> Result<(), AccountError> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET refresh_token = $2, refresh_token_issued_at = NOW(), updated_at = NOW()
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .bind(refresh_token)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to store refresh token: {}", e)))?;

    Ok(())
}

/// Atomically replace the stored refresh token, but only if the presented
/// token is still the stored one.
///
/// Returns false when the stored token no longer matches (already rotated,
/// cleared by logout, or never issued). Concurrent refreshes with the same
/// presented token race on this single UPDATE; exactly one wins.
pub async fn rotate_refresh_token(
    pool: &PgPool,
    account_id: Uuid,
    presented: &str,
    replacement: &str,
) -> Result<bool, AccountError> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET refresh_token = $3, refresh_token_issued_at = NOW(), updated_at = NOW()
        WHERE account_id = $1 AND refresh_token = $2
        "#,
    )
    .bind(account_id)
    .bind(presented)
    .bind(replacement)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to rotate refresh token: {}", e)))?;

    Ok(result.rows_affected() == 1)
}

/// Remove the stored refresh token and its issuance timestamp.
pub async fn clear_refresh_token(pool: &PgPool, account_id: Uuid) -> Result<(), AccountError> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET refresh_token = NULL, refresh_token_issued_at = NULL, updated_at = NOW()
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to clear refresh token: {}", e)))?;

    Ok(())
}

/// Replace the stored password hash.
pub async fn update_password(
    pool: &PgPool,
    account_id: Uuid,
    password_hash: &str,
) -> Result<(), AccountError> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET password_hash = $2, updated_at = NOW()
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .bind(password_hash)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to update password: {}", e)))?;

    Ok(())
}

/// Update full name and email, returning the updated row.
pub async fn update_details(
    pool: &PgPool,
    account_id: Uuid,
    full_name: &str,
    email: &str,
) -> Result<Account, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET full_name = $2, email = $3, updated_at = NOW()
        WHERE account_id = $1
        RETURNING
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(full_name)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("accounts_email_unique") {
            AccountError::Conflict("Email already in use".to_string())
        } else {
            AccountError::Database(format!("Failed to update account details: {}", e))
        }
    })?;

    Ok(account)
}

/// Replace the avatar URL, returning the updated row.
pub async fn update_avatar(
    pool: &PgPool,
    account_id: Uuid,
    avatar_url: &str,
) -> Result<Account, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET avatar_url = $2, updated_at = NOW()
        WHERE account_id = $1
        RETURNING
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(avatar_url)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to update avatar: {}", e)))?;

    Ok(account)
}

/// Replace the cover image URL, returning the updated row.
pub async fn update_cover_image(
    pool: &PgPool,
    account_id: Uuid,
    cover_image_url: &str,
) -> Result<Account, AccountError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET cover_image_url = $2, updated_at = NOW()
        WHERE account_id = $1
        RETURNING
            account_id, username, email, full_name, password_hash,
            avatar_url, cover_image_url, refresh_token, refresh_token_issued_at,
            created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(cover_image_url)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to update cover image: {}", e)))?;

    Ok(account)
}
