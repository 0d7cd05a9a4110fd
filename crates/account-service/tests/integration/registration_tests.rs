//! E2E tests for account registration.
//!
//! Registration is a multipart endpoint: text fields plus an avatar file
//! (required) and a cover image (optional). Files are forwarded to the
//! media service, so these tests drive the full staging/upload/cleanup
//! path against a mock media service, covering validation failures,
//! duplicate identifiers, and upstream rejections along the way.

use account_test_utils::mock_media::{minted_url, MockMediaService};
use account_test_utils::server_harness::TestAccountServer;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;

/// Bytes standing in for an image file; the service never inspects them.
const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nfake image bytes";

/// Complete registration form for `username`, avatar attached.
fn registration_form(username: &str) -> Form {
    Form::new()
        .text("username", username.to_string())
        .text("email", format!("{}@example.com", username))
        .text("fullName", format!("{} Tester", username))
        .text("password", "initial-pass-123".to_string())
        .part(
            "avatar",
            Part::bytes(FAKE_IMAGE.to_vec()).file_name("avatar.png"),
        )
}

async fn account_count(pool: &PgPool) -> Result<i64, anyhow::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ============================================================================
// Happy Path Tests
// ============================================================================

/// Test that a complete registration returns 201 with the public projection.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_happy_path(pool: PgPool) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAccountServer::spawn(pool).await?;
    let form = registration_form("alice").part(
        "coverImage",
        Part::bytes(FAKE_IMAGE.to_vec()).file_name("cover.jpg"),
    );

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["statusCode"].as_u64(), Some(201));
    assert_eq!(body["success"].as_bool(), Some(true));
    assert_eq!(
        body["message"].as_str(),
        Some("Account registered successfully")
    );

    let data = &body["data"];
    assert_eq!(data["username"].as_str(), Some("alice"));
    assert_eq!(data["email"].as_str(), Some("alice@example.com"));
    assert_eq!(data["fullName"].as_str(), Some("alice Tester"));
    // Avatar uploads first, cover second
    assert_eq!(data["avatarUrl"].as_str(), Some(minted_url(0).as_str()));
    assert_eq!(data["coverImageUrl"].as_str(), Some(minted_url(1).as_str()));
    assert!(data.get("accountId").is_some(), "Should include accountId");

    assert_eq!(server.media().upload_count().await, 2);

    Ok(())
}

/// Test that the response never carries credential material.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_response_excludes_credentials(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(registration_form("bob"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    let data = &body["data"];

    assert!(data.get("password").is_none(), "No password field");
    assert!(data.get("passwordHash").is_none(), "No passwordHash field");
    assert!(data.get("refreshToken").is_none(), "No refreshToken field");

    Ok(())
}

/// Test that registration without a cover image succeeds with a null
/// coverImageUrl and a single upload.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_without_cover_image(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(registration_form("carol"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert!(body["data"]["coverImageUrl"].is_null());

    assert_eq!(server.media().upload_count().await, 1);

    Ok(())
}

/// Test that mixed-case identifiers are stored lowercase.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_lowercases_identifiers(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let form = Form::new()
        .text("username", "MixedCase")
        .text("email", "Mixed.Case@Example.COM")
        .text("fullName", "Mixed Case")
        .text("password", "initial-pass-123")
        .part(
            "avatar",
            Part::bytes(FAKE_IMAGE.to_vec()).file_name("avatar.png"),
        );

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["data"]["username"].as_str(), Some("mixedcase"));
    assert_eq!(
        body["data"]["email"].as_str(),
        Some("mixed.case@example.com")
    );

    Ok(())
}

/// Test that a freshly registered account can log in with its password.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_then_login(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(registration_form("dave"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/login", server.url()))
        .json(&json!({
            "username": "dave",
            "password": "initial-pass-123"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Validation Tests
// ============================================================================

/// Test that a missing text field returns 400 in the error envelope.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_missing_password(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let form = Form::new()
        .text("username", "erin")
        .text("email", "erin@example.com")
        .text("fullName", "Erin Tester")
        .part(
            "avatar",
            Part::bytes(FAKE_IMAGE.to_vec()).file_name("avatar.png"),
        );

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["statusCode"].as_u64(), Some(400));
    assert_eq!(body["success"].as_bool(), Some(false));
    assert_eq!(body["message"].as_str(), Some("All fields are required"));

    // Nothing was uploaded and nothing was stored
    assert_eq!(server.media().upload_count().await, 0);
    assert_eq!(account_count(server.pool()).await?, 0);

    Ok(())
}

/// Test that whitespace-only fields count as missing.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_blank_fields_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let form = Form::new()
        .text("username", "   ")
        .text("email", "blank@example.com")
        .text("fullName", "Blank Tester")
        .text("password", "initial-pass-123")
        .part(
            "avatar",
            Part::bytes(FAKE_IMAGE.to_vec()).file_name("avatar.png"),
        );

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("All fields are required"));

    Ok(())
}

/// Test that a registration without an avatar file returns 400.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_missing_avatar(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let form = Form::new()
        .text("username", "frank")
        .text("email", "frank@example.com")
        .text("fullName", "Frank Tester")
        .text("password", "initial-pass-123");

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"].as_str(), Some("Avatar file is required"));

    Ok(())
}

// ============================================================================
// Conflict Tests
// ============================================================================

/// Test that a duplicate username returns 409 before anything uploads.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_username(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(registration_form("grace"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same username, different email
    let form = Form::new()
        .text("username", "grace")
        .text("email", "grace.other@example.com")
        .text("fullName", "Other Grace")
        .text("password", "other-pass-456")
        .part(
            "avatar",
            Part::bytes(FAKE_IMAGE.to_vec()).file_name("avatar.png"),
        );

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"].as_str(),
        Some("Account with email or username already exists")
    );

    // The conflict is detected before the upload step
    assert_eq!(server.media().upload_count().await, 1);
    assert_eq!(account_count(server.pool()).await?, 1);

    Ok(())
}

/// Test that a duplicate email under a fresh username returns 409, and
/// that the comparison is case-insensitive.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_email(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(registration_form("heidi"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let form = Form::new()
        .text("username", "heidi2")
        .text("email", "HEIDI@example.com")
        .text("fullName", "Second Heidi")
        .text("password", "other-pass-456")
        .part(
            "avatar",
            Part::bytes(FAKE_IMAGE.to_vec()).file_name("avatar.png"),
        );

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(account_count(server.pool()).await?, 1);

    Ok(())
}

// ============================================================================
// Upstream Failure Tests
// ============================================================================

/// Test that a rejected avatar upload surfaces as 502 and stores nothing.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_upload_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let media = MockMediaService::rejecting().await;
    let server = TestAccountServer::spawn_with_media(pool, media).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(registration_form("ivan"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["statusCode"].as_u64(), Some(502));
    assert_eq!(body["success"].as_bool(), Some(false));
    assert_eq!(body["message"].as_str(), Some("Media upload failed"));

    assert_eq!(account_count(server.pool()).await?, 0);

    Ok(())
}

/// Test that a cover image failure after a successful avatar upload still
/// rolls the whole registration back to nothing stored.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_cover_upload_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let media = MockMediaService::failing_after(1).await;
    let server = TestAccountServer::spawn_with_media(pool, media).await?;

    let form = registration_form("judy").part(
        "coverImage",
        Part::bytes(FAKE_IMAGE.to_vec()).file_name("cover.jpg"),
    );

    let response = server
        .client()
        .post(format!("{}/api/v1/accounts/register", server.url()))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // Avatar upload succeeded, cover failed, no account row either way
    assert_eq!(server.media().upload_count().await, 2);
    assert_eq!(account_count(server.pool()).await?, 0);

    Ok(())
}
