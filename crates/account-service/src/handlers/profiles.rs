//! Channel profile and watch history handlers.
//!
//! Implements profile endpoints:
//!
//! - `GET /api/v1/channels/{username}` - Channel page with subscription
//!   counters (protected)
//! - `GET /api/v1/accounts/watch-history` - Viewer's watch history
//!   (protected)

use crate::errors::AccountError;
use crate::middleware::CurrentAccount;
use crate::models::{ApiResponse, ChannelProfile, WatchHistoryEntry};
use crate::routes::AppState;
use crate::services::profile_service;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/v1/channels/{username}
///
/// Returns the channel's public fields plus subscriber counts and
/// whether the viewing account subscribes to it.
///
/// # Response
///
/// - 200 OK: Channel profile
/// - 400 Bad Request: Blank username parameter
/// - 401 Unauthorized: Invalid or missing access token
/// - 404 Not Found: No channel with that username
#[instrument(
    skip_all,
    name = "acct.profiles.channel",
    fields(method = "GET", endpoint = "/api/v1/channels/{username}")
)]
pub async fn channel_profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<ChannelProfile>>, AccountError> {
    let profile =
        profile_service::channel_profile(&state.pool, &username, current.account_id).await?;

    Ok(Json(ApiResponse::new(
        200,
        profile,
        "Channel profile fetched successfully",
    )))
}

/// Handler for GET /api/v1/accounts/watch-history
///
/// Returns the authenticated account's watch history in watch order,
/// each entry carrying the video owner's public fields.
///
/// # Response
///
/// - 200 OK: Watch history entries (empty array when nothing watched)
/// - 401 Unauthorized: Invalid or missing access token
#[instrument(
    skip_all,
    name = "acct.profiles.watch_history",
    fields(method = "GET", endpoint = "/api/v1/accounts/watch-history")
)]
pub async fn watch_history(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<Vec<WatchHistoryEntry>>>, AccountError> {
    let entries = profile_service::watch_history(&state.pool, current.account_id).await?;

    Ok(Json(ApiResponse::new(
        200,
        entries,
        "Watch history fetched successfully",
    )))
}
