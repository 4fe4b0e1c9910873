//! Prometheus exporter
//!
//! The recorder is process-global, so it is installed once and every router
//! built afterwards shares its handle.

use axum::{extract::State, http::header, response::IntoResponse};
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{debug, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder on first use.
pub fn install_recorder() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            match metrics::set_global_recorder(recorder) {
                Ok(()) => {
                    describe_metrics();
                    debug!("Prometheus recorder installed");
                }
                Err(e) => warn!(error = %e, "Another metrics recorder is already installed"),
            }
            handle
        })
        .clone()
}

fn describe_metrics() {
    describe_counter!(
        "pawconnect_http_requests_total",
        "HTTP requests by method and status"
    );
    describe_histogram!(
        "pawconnect_http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request latency"
    );
    describe_counter!(
        "pawconnect_filter_evaluations_total",
        "Shelters evaluated by the filter engine"
    );
    describe_counter!(
        "pawconnect_filter_passes_total",
        "Shelters that passed every filter rule"
    );
    describe_counter!(
        "pawconnect_applications_submitted_total",
        "Shelter applications received"
    );
    describe_counter!(
        "pawconnect_reviews_total",
        "Application review decisions by outcome"
    );
    describe_counter!("pawconnect_accounts_created_total", "Accounts created by role");
    describe_counter!("pawconnect_logins_total", "Login attempts by outcome");
    describe_counter!(
        "pawconnect_rate_limited_total",
        "Requests rejected by the rate limiter"
    );
}

/// GET /metrics
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}
