//! E2E tests for authenticated account management: the current-account
//! projection, detail updates, and avatar/cover replacement through the
//! mock media service.

use account_test_utils::fixtures::SEED_AVATAR_URL;
use account_test_utils::mock_media::{minted_url, MockMediaService};
use account_test_utils::server_harness::TestAccountServer;
use reqwest::header::COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nfake image bytes";

/// Stored avatar URL for an account, straight from the database.
async fn stored_avatar_url(pool: &PgPool, account_id: Uuid) -> Result<String, anyhow::Error> {
    let (url,): (String,) = sqlx::query_as("SELECT avatar_url FROM accounts WHERE account_id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await?;
    Ok(url)
}

// ============================================================================
// Current Account Tests
// ============================================================================

/// Test that the current-account endpoint returns the public projection
/// without any credential material.
#[sqlx::test(migrations = "../../migrations")]
async fn test_current_account_returns_projection(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("alice", "password123").await?;
    let token = server.issue_access_token(&account)?;

    // Act
    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/current", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"].as_str(),
        Some("Current account fetched successfully")
    );

    let data = &body["data"];
    assert_eq!(
        data["accountId"].as_str(),
        Some(account.account_id.to_string().as_str())
    );
    assert_eq!(data["username"].as_str(), Some("alice"));
    assert_eq!(data["email"].as_str(), Some("alice@example.com"));
    assert_eq!(data["avatarUrl"].as_str(), Some(SEED_AVATAR_URL));
    assert!(data.get("password").is_none());
    assert!(data.get("passwordHash").is_none());
    assert!(data.get("refreshToken").is_none());

    Ok(())
}

/// Test that the endpoint rejects requests without credentials.
#[sqlx::test(migrations = "../../migrations")]
async fn test_current_account_requires_auth(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/current", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Unauthorized request"));
    assert_eq!(body["success"].as_bool(), Some(false));

    Ok(())
}

/// Test that an expired access token is rejected.
#[sqlx::test(migrations = "../../migrations")]
async fn test_current_account_expired_token_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("bob", "password123").await?;

    // Expired well past the clock skew tolerance
    let token = server.issue_expired_access_token(&account, 3600)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/current", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    let message = body["message"].as_str().unwrap_or("");
    assert!(
        message.contains("Invalid token"),
        "Expected a verification failure message, got: {}",
        message
    );

    Ok(())
}

/// Test that the access token is also accepted from the session cookie.
#[sqlx::test(migrations = "../../migrations")]
async fn test_current_account_accepts_cookie_auth(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("carol", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let response = server
        .client()
        .get(format!("{}/api/v1/accounts/current", server.url()))
        .header(COOKIE, format!("accessToken={}", token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["data"]["username"].as_str(), Some("carol"));

    Ok(())
}

// ============================================================================
// Details Update Tests
// ============================================================================

/// Test that updating details changes the name and lowercases the email.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_details_changes_name_and_email(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("dave", "password123").await?;
    let token = server.issue_access_token(&account)?;

    // Act
    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/details", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "fullName": "Dave Renamed", "email": "Dave.New@Example.COM" }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"].as_str(),
        Some("Account details updated successfully")
    );
    assert_eq!(body["data"]["fullName"].as_str(), Some("Dave Renamed"));
    assert_eq!(
        body["data"]["email"].as_str(),
        Some("dave.new@example.com"),
        "Email should be stored lowercase"
    );

    Ok(())
}

/// Test that a missing field fails validation.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_details_missing_field_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("erin", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/details", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "fullName": "Erin Only" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("All fields are required"));

    Ok(())
}

/// Test that taking another account's email returns 409.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_details_email_conflict_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("frank", "password123").await?;
    server.create_account("grace", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/details", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "fullName": "Frank Tester", "email": "grace@example.com" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Email already in use"));

    Ok(())
}

// ============================================================================
// Media Update Tests
// ============================================================================

/// Test that an avatar upload replaces the stored URL.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_avatar_replaces_url(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("heidi", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let form = Form::new().part(
        "avatar",
        Part::bytes(FAKE_IMAGE.to_vec()).file_name("new-avatar.png"),
    );

    // Act
    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/avatar", server.url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Avatar updated successfully"));
    assert_eq!(
        body["data"]["avatarUrl"].as_str(),
        Some(minted_url(0).as_str())
    );

    let stored = stored_avatar_url(server.pool(), account.account_id).await?;
    assert_eq!(stored, minted_url(0));
    assert_eq!(server.media().upload_count().await, 1);

    Ok(())
}

/// Test that a form without the avatar file fails validation before
/// any upload happens.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_avatar_missing_file_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("ivan", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let form = Form::new().text("caption", "no file here");

    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/avatar", server.url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Avatar file is required"));
    assert_eq!(server.media().upload_count().await, 0);

    Ok(())
}

/// Test that a cover image upload replaces the stored URL.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_cover_image_replaces_url(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;
    let account = server.create_account("judy", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let form = Form::new().part(
        "coverImage",
        Part::bytes(FAKE_IMAGE.to_vec()).file_name("new-cover.png"),
    );

    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/cover-image", server.url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"].as_str(),
        Some("Cover image updated successfully")
    );
    assert_eq!(
        body["data"]["coverImageUrl"].as_str(),
        Some(minted_url(0).as_str())
    );

    Ok(())
}

/// Test that a rejected upload surfaces 502 and leaves the account
/// untouched.
#[sqlx::test(migrations = "../../migrations")]
async fn test_update_avatar_upload_failure_preserves_account(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    // Arrange
    let media = MockMediaService::rejecting().await;
    let server = TestAccountServer::spawn_with_media(pool, media).await?;
    let account = server.create_account("karl", "password123").await?;
    let token = server.issue_access_token(&account)?;

    let form = Form::new().part(
        "avatar",
        Part::bytes(FAKE_IMAGE.to_vec()).file_name("new-avatar.png"),
    );

    // Act
    let response = server
        .client()
        .patch(format!("{}/api/v1/accounts/avatar", server.url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Media upload failed"));

    // The stored avatar survives the failed replacement
    let stored = stored_avatar_url(server.pool(), account.account_id).await?;
    assert_eq!(stored, SEED_AVATAR_URL);

    Ok(())
}
