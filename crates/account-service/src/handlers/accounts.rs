//! Account handlers.
//!
//! Implements account endpoints:
//!
//! - `POST /api/v1/accounts/register` - Register with avatar upload (public)
//! - `GET /api/v1/accounts/current` - Current account (protected)
//! - `PATCH /api/v1/accounts/details` - Update name and email (protected)
//! - `PATCH /api/v1/accounts/avatar` - Replace the avatar (protected)
//! - `PATCH /api/v1/accounts/cover-image` - Replace the cover image (protected)
//!
//! # Uploads
//!
//! Multipart file fields are staged in the media temp directory and
//! forwarded to the media service by the service layer. Staged files
//! remove themselves when dropped, so every exit path cleans up.

use crate::config::Config;
use crate::errors::AccountError;
use crate::middleware::CurrentAccount;
use crate::models::{ApiResponse, PublicAccount, UpdateDetailsRequest};
use crate::routes::AppState;
use crate::services::account_service::{self, RegistrationInput};
use crate::uploads::{self, TempMedia};
use axum::{
    body::Bytes,
    extract::multipart::Field,
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/accounts/register
///
/// Accepts a multipart form with `username`, `email`, `fullName`,
/// `password`, a required `avatar` file, and an optional `coverImage`
/// file.
///
/// # Response
///
/// - 201 Created: Account created; body carries the public projection
/// - 400 Bad Request: Missing field or avatar
/// - 409 Conflict: Username or email already taken
/// - 502 Bad Gateway: Media service rejected the upload
#[instrument(
    skip_all,
    name = "acct.accounts.register",
    fields(method = "POST", endpoint = "/api/v1/accounts/register")
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PublicAccount>>), AccountError> {
    let input = read_registration_form(&state.config, multipart).await?;

    let account =
        account_service::register(&state.pool, &state.config, &state.media, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            201,
            PublicAccount::from(account),
            "Account registered successfully",
        )),
    ))
}

/// Handler for GET /api/v1/accounts/current
///
/// Returns the authenticated account. The auth middleware already
/// loaded the row, so no second read happens here.
///
/// # Response
///
/// - 200 OK: Public projection of the current account
/// - 401 Unauthorized: Invalid or missing access token
#[instrument(
    skip_all,
    name = "acct.accounts.current",
    fields(method = "GET", endpoint = "/api/v1/accounts/current")
)]
pub async fn current_account(
    Extension(current): Extension<CurrentAccount>,
) -> Json<ApiResponse<PublicAccount>> {
    Json(ApiResponse::new(
        200,
        current.account,
        "Current account fetched successfully",
    ))
}

/// Handler for PATCH /api/v1/accounts/details
///
/// Updates the full name and email. Both fields are required.
///
/// # Response
///
/// - 200 OK: Updated public projection
/// - 400 Bad Request: Missing field
/// - 401 Unauthorized: Invalid or missing access token
/// - 409 Conflict: Email already in use
#[instrument(
    skip_all,
    name = "acct.accounts.update_details",
    fields(method = "PATCH", endpoint = "/api/v1/accounts/details")
)]
pub async fn update_details(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    body: Bytes,
) -> Result<Json<ApiResponse<PublicAccount>>, AccountError> {
    let request: UpdateDetailsRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "acct.handlers.accounts", error = %e, "Invalid request body");
        AccountError::Validation("Invalid request body".to_string())
    })?;

    let account = account_service::update_details(&state.pool, current.account_id, &request).await?;

    Ok(Json(ApiResponse::new(
        200,
        PublicAccount::from(account),
        "Account details updated successfully",
    )))
}

/// Handler for PATCH /api/v1/accounts/avatar
///
/// Accepts a multipart form with an `avatar` file field and replaces
/// the stored avatar.
///
/// # Response
///
/// - 200 OK: Updated public projection
/// - 400 Bad Request: No avatar file in the form
/// - 401 Unauthorized: Invalid or missing access token
/// - 502 Bad Gateway: Media service rejected the upload
#[instrument(
    skip_all,
    name = "acct.accounts.update_avatar",
    fields(method = "PATCH", endpoint = "/api/v1/accounts/avatar")
)]
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PublicAccount>>, AccountError> {
    let staged = read_single_file(&state.config, multipart, "avatar").await?;

    let account =
        account_service::update_avatar(&state.pool, &state.media, current.account_id, staged)
            .await?;

    Ok(Json(ApiResponse::new(
        200,
        PublicAccount::from(account),
        "Avatar updated successfully",
    )))
}

/// Handler for PATCH /api/v1/accounts/cover-image
///
/// Accepts a multipart form with a `coverImage` file field and replaces
/// the stored cover image.
///
/// # Response
///
/// - 200 OK: Updated public projection
/// - 400 Bad Request: No cover image file in the form
/// - 401 Unauthorized: Invalid or missing access token
/// - 502 Bad Gateway: Media service rejected the upload
#[instrument(
    skip_all,
    name = "acct.accounts.update_cover_image",
    fields(method = "PATCH", endpoint = "/api/v1/accounts/cover-image")
)]
pub async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PublicAccount>>, AccountError> {
    let staged = read_single_file(&state.config, multipart, "coverImage").await?;

    let account =
        account_service::update_cover_image(&state.pool, &state.media, current.account_id, staged)
            .await?;

    Ok(Json(ApiResponse::new(
        200,
        PublicAccount::from(account),
        "Cover image updated successfully",
    )))
}

// ============================================================================
// Multipart Helpers
// ============================================================================

/// Collect the registration form fields.
///
/// Text fields absent from the form stay empty and fail validation in
/// the service layer. Unknown fields are skipped.
async fn read_registration_form(
    config: &Config,
    mut multipart: Multipart,
) -> Result<RegistrationInput, AccountError> {
    let mut input = RegistrationInput {
        username: String::new(),
        email: String::new(),
        full_name: String::new(),
        password: String::new(),
        avatar: None,
        cover_image: None,
    };

    while let Some(field) = next_field(&mut multipart).await? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        match name.as_str() {
            "username" => input.username = read_text_field(field).await?,
            "email" => input.email = read_text_field(field).await?,
            "fullName" => input.full_name = read_text_field(field).await?,
            "password" => input.password = read_text_field(field).await?,
            "avatar" => input.avatar = read_file_field(config, field).await?,
            "coverImage" => input.cover_image = read_file_field(config, field).await?,
            _ => {}
        }
    }

    Ok(input)
}

/// Pull one named file field out of a multipart form, skipping the rest.
async fn read_single_file(
    config: &Config,
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Option<TempMedia>, AccountError> {
    let mut staged = None;

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some(field_name) {
            staged = read_file_field(config, field).await?;
        }
    }

    Ok(staged)
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, AccountError> {
    multipart.next_field().await.map_err(|e| {
        tracing::debug!(target: "acct.handlers.accounts", error = %e, "Invalid multipart body");
        AccountError::Validation("Invalid multipart body".to_string())
    })
}

async fn read_text_field(field: Field<'_>) -> Result<String, AccountError> {
    field.text().await.map_err(|e| {
        tracing::debug!(target: "acct.handlers.accounts", error = %e, "Invalid multipart field");
        AccountError::Validation("Invalid multipart body".to_string())
    })
}

/// Stage a file field in the media temp directory.
///
/// Browsers submit empty file inputs as fields with no filename and no
/// bytes; those are treated as absent rather than staged.
async fn read_file_field(
    config: &Config,
    field: Field<'_>,
) -> Result<Option<TempMedia>, AccountError> {
    let original_name = match field.file_name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Ok(None),
    };

    let data = field.bytes().await.map_err(|e| {
        tracing::debug!(target: "acct.handlers.accounts", error = %e, "Invalid multipart field");
        AccountError::Validation("Invalid multipart body".to_string())
    })?;

    if data.is_empty() {
        return Ok(None);
    }

    let staged = uploads::stage_upload(&config.media_temp_dir, &original_name, &data).await?;
    Ok(Some(staged))
}
