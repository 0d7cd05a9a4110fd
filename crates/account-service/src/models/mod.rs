use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Account model (maps to accounts table)
#[derive(Clone, FromRow)]
pub struct Account {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_token_issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Redacts credential material; rows must be safe to log via Debug.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("email", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("password_hash", &"[REDACTED]")
            .field("avatar_url", &self.avatar_url)
            .field("cover_image_url", &self.cover_image_url)
            .field("refresh_token", &"[REDACTED]")
            .field("refresh_token_issued_at", &self.refresh_token_issued_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Client-facing account projection. Never carries the password hash or
/// the stored refresh token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            avatar_url: account.avatar_url,
            cover_image_url: account.cover_image_url,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Channel page projection: public profile plus subscription counters
/// relative to the viewing account. Wire keys follow the channel-page
/// contract (`avatar`/`coverImage`, `subscribersCount`), which predates
/// the column naming.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    pub is_subscribed: bool,
}

/// Flat watch history row as read from the videos/accounts join
#[derive(Debug, Clone, FromRow)]
pub struct WatchHistoryRow {
    pub video_id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub watched_at: DateTime<Utc>,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_url: String,
}

/// Owner sub-document embedded in each watch history entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryOwner {
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

/// Watch history entry as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub video_id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub watched_at: DateTime<Utc>,
    pub owner: WatchHistoryOwner,
}

impl From<WatchHistoryRow> for WatchHistoryEntry {
    fn from(row: WatchHistoryRow) -> Self {
        Self {
            video_id: row.video_id,
            video_file: row.video_file,
            thumbnail: row.thumbnail,
            title: row.title,
            description: row.description,
            duration_seconds: row.duration_seconds,
            views: row.views,
            watched_at: row.watched_at,
            owner: WatchHistoryOwner {
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar: row.owner_avatar_url,
            },
        }
    }
}

/// Readiness probe response body. Ops-facing, not wrapped in the
/// client envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Uniform success envelope. `success` is derived from the status code,
/// never set independently.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }
}

/// Login request body. Field presence is validated in the service layer
/// so that missing fields surface as validation errors, not parse errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Refresh request body. The token may arrive here or in a cookie.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Change-password request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Details-update request body; both fields are required
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Freshly minted access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login response payload: the authenticated account plus both tokens,
/// mirrored into cookies by the handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub account: PublicAccount,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh response payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}
