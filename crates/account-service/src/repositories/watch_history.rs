//! Watch history repository module for database operations.
//!
//! History is append-only: one row per playback, duplicates included.
//! Reads join through videos to the owning channel so clients get the
//! owner sub-document without extra queries.

use crate::errors::AccountError;
use crate::models::WatchHistoryRow;
use sqlx::PgPool;
use uuid::Uuid;

/// Append a playback entry to an account's watch history.
///
/// Rewatching appends another row; entries are never deduplicated.
pub async fn add_entry(
    pool: &PgPool,
    account_id: Uuid,
    video_id: Uuid,
) -> Result<(), AccountError> {
    sqlx::query(
        r#"
        INSERT INTO watch_history (account_id, video_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(account_id)
    .bind(video_id)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to append watch history entry: {}", e)))?;

    Ok(())
}

/// List an account's watch history in append order, each entry joined
/// with its video and the video owner's public fields.
pub async fn list_for_account(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<WatchHistoryRow>, AccountError> {
    let rows = sqlx::query_as::<_, WatchHistoryRow>(
        r#"
        SELECT
            v.video_id, v.video_file, v.thumbnail, v.title, v.description,
            v.duration_seconds, v.views, wh.watched_at,
            a.username AS owner_username,
            a.full_name AS owner_full_name,
            a.avatar_url AS owner_avatar_url
        FROM watch_history wh
        JOIN videos v ON v.video_id = wh.video_id
        JOIN accounts a ON a.account_id = v.owner_id
        WHERE wh.account_id = $1
        ORDER BY wh.entry_id
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AccountError::Database(format!("Failed to fetch watch history: {}", e)))?;

    Ok(rows)
}
