//! Database fixtures for account service tests.
//!
//! Fixtures write through the production repository layer where one exists;
//! subscription edges and videos are seeded directly because their lifecycle
//! belongs to other features and the account service only reads them.

use account_service::config::MIN_BCRYPT_COST;
use account_service::crypto;
use account_service::models::Account;
use account_service::repositories::{accounts, watch_history};
use sqlx::PgPool;
use uuid::Uuid;

/// Avatar URL stored on seeded accounts.
pub const SEED_AVATAR_URL: &str = "http://media.test/files/seed-avatar.png";

/// Create an account with a real bcrypt hash.
///
/// Uses the minimum bcrypt cost so seeding stays fast; the hash still
/// verifies through the production login path. Email and full name derive
/// from the username, keeping seeded accounts unique under the schema
/// constraints. The username is lowercased the way registration stores it.
pub async fn create_account(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Account, anyhow::Error> {
    let username = username.to_lowercase();
    let email = format!("{}@example.com", username);
    let full_name = format!("{} Tester", username);
    let password_hash = crypto::hash_password(password, MIN_BCRYPT_COST)?;

    let account = accounts::create(
        pool,
        &username,
        &email,
        &full_name,
        &password_hash,
        SEED_AVATAR_URL,
        None,
    )
    .await?;

    Ok(account)
}

/// Seed a subscription edge: `subscriber_id` subscribes to `channel_id`.
pub async fn subscribe(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<(), anyhow::Error> {
    sqlx::query("INSERT INTO subscriptions (subscriber_id, channel_id) VALUES ($1, $2)")
        .bind(subscriber_id)
        .bind(channel_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Seed a published video owned by `owner_id`, returning its id.
pub async fn create_video(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
) -> Result<Uuid, anyhow::Error> {
    let (video_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO videos (owner_id, video_file, thumbnail, title, description, duration_seconds, views)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING video_id
        "#,
    )
    .bind(owner_id)
    .bind(format!("http://media.test/files/{}.mp4", title))
    .bind(format!("http://media.test/files/{}.jpg", title))
    .bind(title)
    .bind(format!("Description of {}", title))
    .bind(120.5_f64)
    .bind(42_i64)
    .fetch_one(pool)
    .await?;

    Ok(video_id)
}

/// Append a watch history entry through the production repository.
pub async fn add_watch_entry(
    pool: &PgPool,
    account_id: Uuid,
    video_id: Uuid,
) -> Result<(), anyhow::Error> {
    watch_history::add_entry(pool, account_id, video_id).await?;
    Ok(())
}
