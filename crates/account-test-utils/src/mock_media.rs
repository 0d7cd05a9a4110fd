//! Mock media upload service.
//!
//! The account service forwards every uploaded file to the media service as
//! `POST {base}/upload` and expects `{"url": "..."}` back. This wraps a
//! wiremock server speaking that contract, configurable to accept uploads,
//! reject them, or fail after a fixed number of successes.
//!
//! # Example
//!
//! ```rust,ignore
//! let media = MockMediaService::accepting().await;
//! let server = TestAccountServer::spawn_with_media(pool, media).await?;
//! // ... register an account ...
//! assert_eq!(server.media().upload_count().await, 2);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Mints a distinct hosted URL per upload, in request order.
#[derive(Default)]
struct MintUploadUrl {
    counter: AtomicUsize,
}

impl Respond for MintUploadUrl {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": minted_url(n),
        }))
    }
}

/// The URL the mock returns for the nth successful upload (zero-based).
pub fn minted_url(n: usize) -> String {
    format!("http://media.test/files/upload-{}.png", n)
}

/// Mock media upload service for account service tests.
pub struct MockMediaService {
    server: MockServer,
}

impl MockMediaService {
    /// Mock that accepts every upload and returns sequential hosted URLs.
    pub async fn accepting() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(MintUploadUrl::default())
            .mount(&server)
            .await;

        Self { server }
    }

    /// Mock that rejects every upload with a 500.
    pub async fn rejecting() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Mock that accepts the first `successes` uploads, then rejects with
    /// a 500. Useful for failing the second file of a two-file request.
    pub async fn failing_after(successes: u64) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(MintUploadUrl::default())
            .up_to_n_times(successes)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Base URL for MEDIA_UPLOAD_URL configuration.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Number of upload requests received so far, successful or not.
    pub async fn upload_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
