//! Test server harness for E2E testing.
//!
//! `TestAccountServer` runs the real service (real router, real
//! middleware, real handlers) on a random local port, wired to a mock
//! media upload service, against the per-test database pool.

use crate::fixtures;
use crate::mock_media::MockMediaService;
use account_service::config::{Config, MIN_BCRYPT_COST};
use account_service::crypto::{self, AccessClaims};
use account_service::models::Account;
use account_service::routes::{self, AppState};
use account_service::services::{token_service, MediaClient};
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running account service instance for E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_login_sets_session_cookies(pool: PgPool) -> anyhow::Result<()> {
///     let server = TestAccountServer::spawn(pool).await?;
///     server.create_account("viewer", "hunter42xyz").await?;
///
///     let response = server
///         .client()
///         .post(format!("{}/api/v1/accounts/login", server.url()))
///         .json(&serde_json::json!({
///             "email": "viewer@example.com",
///             "password": "hunter42xyz",
///         }))
///         .send()
///         .await?;
///
///     assert!(response.headers().contains_key("set-cookie"));
///     Ok(())
/// }
/// ```
pub struct TestAccountServer {
    addr: SocketAddr,
    pool: PgPool,
    config: Config,
    media: MockMediaService,
    _handle: JoinHandle<()>,
}

impl TestAccountServer {
    /// Spawn a test server backed by a media service that accepts every
    /// upload.
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        Self::spawn_with_media(pool, MockMediaService::accepting().await).await
    }

    /// Spawn a test server against a preconfigured mock media service.
    ///
    /// Use this to exercise upload failure handling:
    ///
    /// ```rust,ignore
    /// let media = MockMediaService::rejecting().await;
    /// let server = TestAccountServer::spawn_with_media(pool, media).await?;
    /// ```
    pub async fn spawn_with_media(
        pool: PgPool,
        media: MockMediaService,
    ) -> Result<Self, anyhow::Error> {
        // Same env-shaped config the binary loads, pointed at the mock
        // media service. Minimum bcrypt cost keeps register and login
        // fast under test.
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            (
                "ACCESS_TOKEN_SECRET".to_string(),
                "test-access-secret-do-not-use-in-production".to_string(),
            ),
            (
                "REFRESH_TOKEN_SECRET".to_string(),
                "test-refresh-secret-do-not-use-in-production".to_string(),
            ),
            ("MEDIA_UPLOAD_URL".to_string(), media.url()),
            (
                "MEDIA_TEMP_DIR".to_string(),
                std::env::temp_dir()
                    .join("account-service-tests")
                    .display()
                    .to_string(),
            ),
            ("BCRYPT_COST".to_string(), MIN_BCRYPT_COST.to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let media_client = MediaClient::new(config.media_upload_url.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build media client: {}", e))?;

        let state = Arc::new(AppState {
            pool: pool.clone(),
            config: config.clone(),
            media: media_client,
        });

        // Only the first install in a test process succeeds; later
        // servers fall back to a standalone recorder so /metrics still
        // renders for them.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Harness serve task failed: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            media,
            _handle: handle,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Base URL of the running server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The mock media service this server uploads to.
    pub fn media(&self) -> &MockMediaService {
        &self.media
    }

    /// HTTP client for talking to the test server.
    ///
    /// No automatic cookie jar: the session cookies carry `Secure`, which
    /// clients refuse to replay over the plain-HTTP test listener. Tests
    /// read Set-Cookie values with [`crate::cookies::set_cookie_value`] and
    /// send them back explicitly.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    /// Insert an account directly, bypassing the register endpoint.
    ///
    /// The stored hash verifies against `password` through the production
    /// login path.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, anyhow::Error> {
        fixtures::create_account(&self.pool, username, password).await
    }

    /// Issue a valid access token for an account.
    ///
    /// Signed with the same secret the server verifies against, so the
    /// token passes protected routes without going through login. No
    /// refresh token is persisted.
    pub fn issue_access_token(&self, account: &Account) -> Result<String, anyhow::Error> {
        let tokens = token_service::issue_token_pair(&self.config, account)?;
        Ok(tokens.access_token)
    }

    /// Issue an access token that expired in the past.
    ///
    /// `expired_secs_ago` should exceed the configured clock skew
    /// tolerance, otherwise validation still accepts the token.
    pub fn issue_expired_access_token(
        &self,
        account: &Account,
        expired_secs_ago: i64,
    ) -> Result<String, anyhow::Error> {
        let exp = Utc::now().timestamp() - expired_secs_ago;
        let claims = AccessClaims {
            sub: account.account_id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            iat: exp - 3600,
            exp,
            jti: crypto::generate_random_hex(16)?,
        };

        let token = crypto::sign_jwt(&claims, &self.config.access_token_secret)?;
        Ok(token)
    }
}

impl Drop for TestAccountServer {
    fn drop(&mut self) {
        // The serve task holds the listener; abort it so the port frees
        // as soon as the test finishes
        self._handle.abort();
    }
}
