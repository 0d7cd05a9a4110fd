//! Subscription repository module for database operations.
//!
//! This service only reads subscription edges (counts and membership
//! checks for channel pages). Edge creation and removal belong to the
//! subscription feature.

use crate::errors::AccountError;
use sqlx::PgPool;
use uuid::Uuid;

/// Count accounts subscribed to a channel.
pub async fn count_channel_subscribers(
    pool: &PgPool,
    channel_id: Uuid,
) -> Result<i64, AccountError> {
    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM subscriptions
        WHERE channel_id = $1
        "#,
    )
    .bind(channel_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to count channel subscribers: {}", e)))?;

    Ok(count.0)
}

/// Count channels an account is subscribed to.
pub async fn count_subscribed_channels(
    pool: &PgPool,
    subscriber_id: Uuid,
) -> Result<i64, AccountError> {
    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM subscriptions
        WHERE subscriber_id = $1
        "#,
    )
    .bind(subscriber_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to count subscribed channels: {}", e)))?;

    Ok(count.0)
}

/// Check whether a subscriber -> channel edge exists.
pub async fn is_subscribed(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, AccountError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM subscriptions
            WHERE subscriber_id = $1 AND channel_id = $2
        )
        "#,
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to check subscription: {}", e)))?;

    Ok(exists.0)
}
