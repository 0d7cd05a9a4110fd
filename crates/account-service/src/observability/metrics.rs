//! Prometheus metric definitions.
//!
//! Every metric carries the `acct_` prefix, counters end in `_total`,
//! and duration histograms end in `_seconds`. Label sets stay small
//! and closed so series counts remain bounded: operations and outcomes
//! come from fixed vocabularies in the service layer, and request
//! paths are collapsed to a known list before they become labels.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle the
/// `/metrics` route renders from.
///
/// Must be called before any metrics are recorded. Configures histogram
/// buckets for the duration metrics this service emits.
///
/// # Errors
///
/// Returns error if the Prometheus recorder fails to install (e.g., already
/// installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // HTTP request buckets; bcrypt at production cost dominates the
        // register/login/change-password paths, so the range extends past 1s
        .set_buckets_for_metric(
            Matcher::Prefix("acct_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Media upload buckets cover the full file transfer to the media service
        .set_buckets_for_metric(
            Matcher::Prefix("acct_media_upload".to_string()),
            &[
                0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set media upload buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Session Metrics
// ============================================================================

/// Record a session operation outcome.
///
/// Metric: `acct_session_operations_total`
/// Labels: `operation`, `outcome`
///
/// Operations: "login", "logout", "refresh", "change_password"
/// Outcomes: "success", "validation_error", "not_found", "invalid_credentials",
///           "invalid_token", "reuse_detected", "error"
pub fn record_session_operation(operation: &str, outcome: &str) {
    counter!("acct_session_operations_total", "operation" => operation.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

// ============================================================================
// Registration Metrics
// ============================================================================

/// Record a registration attempt outcome.
///
/// Metric: `acct_registrations_total`
/// Labels: `outcome`
///
/// Outcomes: "success", "validation_error", "conflict", "upload_failed", "error"
pub fn record_registration(outcome: &str) {
    counter!("acct_registrations_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Media Upload Metrics
// ============================================================================

/// Record a media upload duration and outcome.
///
/// Metric: `acct_media_uploads_total`, `acct_media_upload_duration_seconds`
/// Labels: `outcome`
///
/// Outcomes: "success", "error"
pub fn record_media_upload(outcome: &str, duration: Duration) {
    histogram!("acct_media_upload_duration_seconds").record(duration.as_secs_f64());

    counter!("acct_media_uploads_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record one completed HTTP exchange.
///
/// Metric: `acct_http_requests_total`, `acct_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Runs in middleware after the response is built, so rejections the
/// framework produces on its own (404, 405, 415, oversized multipart
/// bodies) are counted alongside handler responses.
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    // Collapse the path before it becomes a label value
    let normalized_path = normalize_path(path);

    histogram!("acct_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("acct_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Collapse a request path to one of a fixed set of label values.
fn normalize_path(path: &str) -> String {
    match path {
        "/" => "/".to_string(),
        "/health" => "/health".to_string(),
        "/ready" => "/ready".to_string(),
        "/metrics" => "/metrics".to_string(),
        "/api/v1/accounts/register" => "/api/v1/accounts/register".to_string(),
        "/api/v1/accounts/login" => "/api/v1/accounts/login".to_string(),
        "/api/v1/accounts/refresh-token" => "/api/v1/accounts/refresh-token".to_string(),
        "/api/v1/accounts/logout" => "/api/v1/accounts/logout".to_string(),
        "/api/v1/accounts/current" => "/api/v1/accounts/current".to_string(),
        "/api/v1/accounts/change-password" => "/api/v1/accounts/change-password".to_string(),
        "/api/v1/accounts/details" => "/api/v1/accounts/details".to_string(),
        "/api/v1/accounts/avatar" => "/api/v1/accounts/avatar".to_string(),
        "/api/v1/accounts/cover-image" => "/api/v1/accounts/cover-image".to_string(),
        "/api/v1/accounts/watch-history" => "/api/v1/accounts/watch-history".to_string(),
        // Anything else either embeds a channel username or is noise
        _ => normalize_dynamic_path(path),
    }
}

/// Collapse paths that embed a channel username.
///
/// `/api/v1/channels/somecreator` becomes `/api/v1/channels/{username}`;
/// everything unrecognized lands in the shared `/other` bucket.
fn normalize_dynamic_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/api/v1/channels/") {
        // Exactly one non-empty segment after the prefix is a username
        if !rest.is_empty() && !rest.contains('/') {
            return "/api/v1/channels/{username}".to_string();
        }
    }

    "/other".to_string()
}
