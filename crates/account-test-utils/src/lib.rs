//! Test support for the account service: database fixtures (accounts
//! with real bcrypt hashes, subscriptions, videos, watch history), a
//! mock media upload service, Set-Cookie parsing helpers, and the
//! [`TestAccountServer`] harness that runs the full router for E2E
//! tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use account_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_current_account_round_trip(pool: PgPool) -> anyhow::Result<()> {
//!     let server = TestAccountServer::spawn(pool).await?;
//!     let account = server.create_account("alice", "hunter42xyz").await?;
//!     let token = server.issue_access_token(&account)?;
//!
//!     let response = server
//!         .client()
//!         .get(format!("{}/api/v1/accounts/current", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert!(response.status().is_success());
//!     Ok(())
//! }
//! ```

pub mod cookies;
pub mod fixtures;
pub mod mock_media;
pub mod server_harness;

// Flat re-exports so tests can `use account_test_utils::*`
pub use cookies::*;
pub use fixtures::*;
pub use mock_media::*;
pub use server_harness::*;
