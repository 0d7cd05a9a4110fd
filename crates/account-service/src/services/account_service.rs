//! Registration and account management.
//!
//! Registration stages multipart files locally, forwards them to the media
//! service, and only then inserts the account row. Staged files are removed
//! by their Drop guards on every exit path, including upload failures.

use crate::config::Config;
use crate::crypto;
use crate::errors::AccountError;
use crate::models::{Account, UpdateDetailsRequest};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_registration;
use crate::repositories::accounts;
use crate::services::media_client::MediaClient;
use crate::uploads::TempMedia;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Registration input assembled by the multipart handler.
///
/// Text fields that were absent from the form arrive as empty strings;
/// validation treats empty and missing the same.
#[derive(Debug)]
pub struct RegistrationInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: Option<TempMedia>,
    pub cover_image: Option<TempMedia>,
}

/// Register a new account.
///
/// # Steps
///
/// 1. Require all four text fields non-empty after trim
/// 2. Require the avatar file
/// 3. Check username/email uniqueness (the unique constraints remain the
///    backstop for concurrent registrations)
/// 4. Upload the avatar, then the optional cover image
/// 5. Hash the password and insert the row
/// 6. Re-read the created account by id
#[instrument(skip_all)]
pub async fn register(
    pool: &PgPool,
    config: &Config,
    media: &MediaClient,
    input: RegistrationInput,
) -> Result<Account, AccountError> {
    let RegistrationInput {
        username,
        email,
        full_name,
        password,
        avatar,
        cover_image,
    } = input;

    if username.trim().is_empty()
        || email.trim().is_empty()
        || full_name.trim().is_empty()
        || password.trim().is_empty()
    {
        record_registration("validation_error");
        return Err(AccountError::Validation(
            "All fields are required".to_string(),
        ));
    }

    let username = username.trim().to_lowercase();
    let email = email.trim().to_lowercase();
    let full_name = full_name.trim().to_string();

    let avatar = match avatar {
        Some(avatar) => avatar,
        None => {
            record_registration("validation_error");
            return Err(AccountError::Validation(
                "Avatar file is required".to_string(),
            ));
        }
    };

    if accounts::username_or_email_exists(pool, &username, &email).await? {
        record_registration("conflict");
        return Err(AccountError::Conflict(
            "Account with email or username already exists".to_string(),
        ));
    }

    let uploaded_avatar = match media.upload(&avatar).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            record_registration("upload_failed");
            return Err(e);
        }
    };

    let uploaded_cover = match &cover_image {
        Some(cover) => match media.upload(cover).await {
            Ok(uploaded) => Some(uploaded),
            Err(e) => {
                record_registration("upload_failed");
                return Err(e);
            }
        },
        None => None,
    };

    let password_hash = crypto::hash_password(&password, config.bcrypt_cost)?;

    let created = match accounts::create(
        pool,
        &username,
        &email,
        &full_name,
        &password_hash,
        &uploaded_avatar.url,
        uploaded_cover.as_ref().map(|c| c.url.as_str()),
    )
    .await
    {
        Ok(account) => account,
        Err(e @ AccountError::Conflict(_)) => {
            record_registration("conflict");
            return Err(e);
        }
        Err(e) => {
            record_registration("error");
            return Err(e);
        }
    };

    // Post-write verification: the created row must be readable
    let account = match accounts::find_by_id(pool, created.account_id).await? {
        Some(account) => account,
        None => {
            tracing::error!("Created account could not be re-read");
            record_registration("error");
            return Err(AccountError::Internal(
                "Something went wrong while registering the account".to_string(),
            ));
        }
    };

    record_registration("success");
    tracing::info!(
        username_hash = %hash_for_correlation(&username),
        "Account registered"
    );

    Ok(account)
}

/// Update an account's full name and email.
///
/// Both fields are required; the email is normalized to lowercase before the
/// targeted UPDATE.
#[instrument(skip_all)]
pub async fn update_details(
    pool: &PgPool,
    account_id: Uuid,
    request: &UpdateDetailsRequest,
) -> Result<Account, AccountError> {
    let full_name = match request.full_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(AccountError::Validation(
                "All fields are required".to_string(),
            ));
        }
    };

    let email = match request.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email.to_lowercase(),
        _ => {
            return Err(AccountError::Validation(
                "All fields are required".to_string(),
            ));
        }
    };

    accounts::update_details(pool, account_id, full_name, &email).await
}

/// Replace an account's avatar with a newly staged file.
#[instrument(skip_all)]
pub async fn update_avatar(
    pool: &PgPool,
    media: &MediaClient,
    account_id: Uuid,
    staged: Option<TempMedia>,
) -> Result<Account, AccountError> {
    let staged = match staged {
        Some(staged) => staged,
        None => {
            return Err(AccountError::Validation(
                "Avatar file is required".to_string(),
            ));
        }
    };

    let uploaded = media.upload(&staged).await?;
    accounts::update_avatar(pool, account_id, &uploaded.url).await
}

/// Replace an account's cover image with a newly staged file.
#[instrument(skip_all)]
pub async fn update_cover_image(
    pool: &PgPool,
    media: &MediaClient,
    account_id: Uuid,
    staged: Option<TempMedia>,
) -> Result<Account, AccountError> {
    let staged = match staged {
        Some(staged) => staged,
        None => {
            return Err(AccountError::Validation(
                "Cover image file is required".to_string(),
            ));
        }
    };

    let uploaded = media.upload(&staged).await?;
    accounts::update_cover_image(pool, account_id, &uploaded.url).await
}
