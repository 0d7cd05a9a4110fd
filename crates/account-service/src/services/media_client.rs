//! Media upload service HTTP client.
//!
//! Forwards staged media files to the media upload service and returns the
//! hosted URL. The staged temp file is never deleted here; its owner's Drop
//! guard removes it after the attempt regardless of outcome.

use crate::errors::AccountError;
use crate::observability::metrics::record_media_upload;
use crate::uploads::TempMedia;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Default timeout for media upload requests in seconds.
const UPLOAD_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Response from the media service for a completed upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    /// Hosted URL of the uploaded file.
    pub url: String,
}

/// HTTP client for the media upload service.
#[derive(Clone)]
pub struct MediaClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Base URL of the media upload service.
    base_url: String,
}

impl MediaClient {
    /// Create a new media client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the media upload service
    ///   (e.g., "http://localhost:9010")
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, AccountError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(UPLOAD_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "acct.services.media_client", error = %e, "Failed to build HTTP client");
                AccountError::Internal(format!("Failed to build media HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    /// Upload a staged file to the media service.
    ///
    /// # Errors
    ///
    /// `AccountError::UpstreamFailure` for transport errors, non-2xx
    /// statuses, and unparseable responses.
    #[instrument(skip_all, fields(file_name = %staged.file_name()))]
    pub async fn upload(&self, staged: &TempMedia) -> Result<UploadedMedia, AccountError> {
        let start = Instant::now();

        let result = self.upload_inner(staged).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        record_media_upload(outcome, start.elapsed());

        result
    }

    async fn upload_inner(&self, staged: &TempMedia) -> Result<UploadedMedia, AccountError> {
        let bytes = tokio::fs::read(staged.path()).await.map_err(|e| {
            error!(target: "acct.services.media_client", error = %e, "Failed to read staged file");
            AccountError::Internal(format!("Failed to read staged file: {}", e))
        })?;

        let part = Part::bytes(bytes).file_name(staged.file_name().to_string());
        let form = Form::new().part("file", part);

        let url = format!("{}/upload", self.base_url);

        let response = self.client.post(&url).multipart(form).send().await.map_err(|e| {
            warn!(target: "acct.services.media_client", error = %e, "Media upload request failed");
            AccountError::UpstreamFailure(format!("Media upload request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "acct.services.media_client", status = %status, "Media service rejected upload");
            return Err(AccountError::UpstreamFailure(format!(
                "Media service returned status {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!(target: "acct.services.media_client", error = %e, "Invalid media service response");
            AccountError::UpstreamFailure(format!("Invalid media service response: {}", e))
        })
    }
}
