//! Prometheus scrape endpoint.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Serve GET /metrics.
///
/// Renders the recorder's current state in the Prometheus text format.
/// Unauthenticated so the scraper can reach it; the metrics carry only
/// operational data (operation names, outcomes, normalized paths), never
/// identifiers or token material.
#[tracing::instrument(skip_all, name = "acct.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
