//! Prometheus recorder and metric definitions

use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Authorization outcomes, as recorded by route guards.
pub const AUTHZ_OUTCOMES: [&str; 5] = ["guest", "unauthenticated", "allowed", "forbidden", "error"];

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets(&buckets)?
        .install_recorder()?;
    Ok(handle)
}

/// Register descriptions, and zero the authorization counters so every
/// outcome shows up in the first scrape.
pub fn describe_metrics() {
    describe_counter!("folio_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "folio_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "folio_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );
    describe_counter!(
        "folio_authz_decisions_total",
        "Route authorization decisions by outcome"
    );

    for outcome in AUTHZ_OUTCOMES {
        counter!("folio_authz_decisions_total", "outcome" => outcome).absolute(0);
    }
}
