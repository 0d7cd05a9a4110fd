//! Channel pages and watch history.
//!
//! Both operations are reads on behalf of an authenticated viewer. The
//! channel profile augments the public account fields with subscription
//! counters computed relative to that viewer.

use crate::errors::AccountError;
use crate::models::{ChannelProfile, WatchHistoryEntry};
use crate::repositories::{accounts, subscriptions, watch_history};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Fetch a channel's profile as seen by the viewing account.
///
/// The username is matched case-insensitively (stored lowercase).
/// `is_subscribed` reports whether the viewer follows this channel;
/// viewing your own channel reports your own counters.
#[instrument(skip_all)]
pub async fn channel_profile(
    pool: &PgPool,
    username_param: &str,
    viewer_id: Uuid,
) -> Result<ChannelProfile, AccountError> {
    let username = username_param.trim().to_lowercase();
    if username.is_empty() {
        return Err(AccountError::Validation("Username is missing".to_string()));
    }

    let channel = match accounts::find_by_username(pool, &username).await? {
        Some(account) => account,
        None => {
            return Err(AccountError::NotFound("Channel does not exist".to_string()));
        }
    };

    let subscribers_count =
        subscriptions::count_channel_subscribers(pool, channel.account_id).await?;
    let channels_subscribed_to_count =
        subscriptions::count_subscribed_channels(pool, channel.account_id).await?;
    let is_subscribed = subscriptions::is_subscribed(pool, viewer_id, channel.account_id).await?;

    Ok(ChannelProfile {
        account_id: channel.account_id,
        username: channel.username,
        email: channel.email,
        full_name: channel.full_name,
        avatar: channel.avatar_url,
        cover_image: channel.cover_image_url,
        subscribers_count,
        channels_subscribed_to_count,
        is_subscribed,
    })
}

/// List the viewer's watch history in the order the videos were watched.
#[instrument(skip_all)]
pub async fn watch_history(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<WatchHistoryEntry>, AccountError> {
    let rows = watch_history::list_for_account(pool, account_id).await?;
    Ok(rows.into_iter().map(WatchHistoryEntry::from).collect())
}
