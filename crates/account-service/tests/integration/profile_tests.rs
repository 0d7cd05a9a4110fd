//! E2E tests for channel profiles and watch history.
//!
//! Seeds accounts, subscription edges, videos, and playback entries
//! through the test fixtures, then reads them back through the API as
//! an authenticated viewer.

use account_test_utils::fixtures::{self, SEED_AVATAR_URL};
use account_test_utils::server_harness::TestAccountServer;
use reqwest::StatusCode;
use sqlx::PgPool;

// ============================================================================
// Channel Profile Tests
// ============================================================================

/// Test that a channel profile reports counters relative to the viewer.
#[sqlx::test(migrations = "../../migrations")]
async fn test_channel_profile_reports_counts(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange: alice and bob follow creator, creator follows alice
    let server = TestAccountServer::spawn(pool).await?;
    let creator = server.create_account("creator", "password123").await?;
    let alice = server.create_account("alice", "password123").await?;
    let bob = server.create_account("bob", "password123").await?;

    fixtures::subscribe(server.pool(), alice.account_id, creator.account_id).await?;
    fixtures::subscribe(server.pool(), bob.account_id, creator.account_id).await?;
    fixtures::subscribe(server.pool(), creator.account_id, alice.account_id).await?;

    let token = server.issue_access_token(&alice)?;

    // Act
    let response = server
        .client()
        .get(format!("{}/api/v1/channels/creator", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"].as_str(),
        Some("Channel profile fetched successfully")
    );

    let data = &body["data"];
    assert_eq!(
        data["accountId"].as_str(),
        Some(creator.account_id.to_string().as_str())
    );
    assert_eq!(data["username"].as_str(), Some("creator"));
    assert_eq!(data["fullName"].as_str(), Some("creator Tester"));
    assert_eq!(data["avatar"].as_str(), Some(SEED_AVATAR_URL));
    assert!(data["coverImage"].is_null());
    assert_eq!(data["subscribersCount"].as_i64(), Some(2));
    assert_eq!(data["channelsSubscribedToCount"].as_i64(), Some(1));
    assert_eq!(data["isSubscribed"].as_bool(), Some(true));

    Ok(())
}

/// Test that a viewer without a subscription sees `isSubscribed: false`.
#[sqlx::test(migrations = "../../migrations")]
async fn test_channel_profile_viewer_not_subscribed(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let creator = server.create_account("creator", "password123").await?;
    let alice = server.create_account("alice", "password123").await?;
    let bob = server.create_account("bob", "password123").await?;

    fixtures::subscribe(server.pool(), alice.account_id, creator.account_id).await?;

    let token = server.issue_access_token(&bob)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/channels/creator", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["data"]["subscribersCount"].as_i64(), Some(1));
    assert_eq!(body["data"]["isSubscribed"].as_bool(), Some(false));

    Ok(())
}

/// Test that the username path parameter matches case-insensitively.
#[sqlx::test(migrations = "../../migrations")]
async fn test_channel_profile_username_case_insensitive(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let creator = server.create_account("creator", "password123").await?;
    let viewer = server.create_account("viewer", "password123").await?;
    let token = server.issue_access_token(&viewer)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/channels/CREATOR", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["data"]["accountId"].as_str(),
        Some(creator.account_id.to_string().as_str())
    );

    Ok(())
}

/// Test that an unknown channel returns 404.
#[sqlx::test(migrations = "../../migrations")]
async fn test_channel_profile_unknown_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let viewer = server.create_account("viewer", "password123").await?;
    let token = server.issue_access_token(&viewer)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/channels/ghost", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Channel does not exist"));

    Ok(())
}

/// Test that a whitespace-only username parameter returns 400.
#[sqlx::test(migrations = "../../migrations")]
async fn test_channel_profile_blank_username_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let viewer = server.create_account("viewer", "password123").await?;
    let token = server.issue_access_token(&viewer)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/channels/%20%20", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Username is missing"));

    Ok(())
}

/// Test that channel profiles require authentication.
#[sqlx::test(migrations = "../../migrations")]
async fn test_channel_profile_requires_auth(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    server.create_account("creator", "password123").await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/channels/creator", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Unauthorized request"));

    Ok(())
}

// ============================================================================
// Watch History Tests
// ============================================================================

/// Test that watch history lists playbacks in order with the owner's
/// public fields, duplicates included.
#[sqlx::test(migrations = "../../migrations")]
async fn test_watch_history_returns_entries_in_order(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange: viewer watches first, second, then first again
    let server = TestAccountServer::spawn(pool).await?;
    let creator = server.create_account("creator", "password123").await?;
    let viewer = server.create_account("viewer", "password123").await?;

    let first = fixtures::create_video(server.pool(), creator.account_id, "first").await?;
    let second = fixtures::create_video(server.pool(), creator.account_id, "second").await?;

    fixtures::add_watch_entry(server.pool(), viewer.account_id, first).await?;
    fixtures::add_watch_entry(server.pool(), viewer.account_id, second).await?;
    fixtures::add_watch_entry(server.pool(), viewer.account_id, first).await?;

    let token = server.issue_access_token(&viewer)?;

    // Act
    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/watch-history", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"].as_str(),
        Some("Watch history fetched successfully")
    );

    let entries = body["data"].as_array().expect("data should be an array");
    assert_eq!(entries.len(), 3);

    let sequence: Vec<&str> = entries
        .iter()
        .map(|entry| entry["videoId"].as_str().unwrap_or(""))
        .collect();
    assert_eq!(
        sequence,
        vec![
            first.to_string().as_str(),
            second.to_string().as_str(),
            first.to_string().as_str()
        ]
    );

    let head = &entries[0];
    assert_eq!(head["title"].as_str(), Some("first"));
    assert!(head["videoFile"].as_str().is_some());
    assert!(head["thumbnail"].as_str().is_some());
    assert!(head["durationSeconds"].as_f64().is_some());
    assert!(head["views"].as_i64().is_some());
    assert!(head["watchedAt"].as_str().is_some());
    assert_eq!(head["owner"]["username"].as_str(), Some("creator"));
    assert_eq!(head["owner"]["fullName"].as_str(), Some("creator Tester"));
    assert_eq!(head["owner"]["avatar"].as_str(), Some(SEED_AVATAR_URL));

    Ok(())
}

/// Test that an account with no playbacks gets an empty array.
#[sqlx::test(migrations = "../../migrations")]
async fn test_watch_history_empty(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let viewer = server.create_account("viewer", "password123").await?;
    let token = server.issue_access_token(&viewer)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/watch-history", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    Ok(())
}

/// Test that watch history requires authentication.
#[sqlx::test(migrations = "../../migrations")]
async fn test_watch_history_requires_auth(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/watch-history", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
