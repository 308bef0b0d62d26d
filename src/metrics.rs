use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder as the global metrics recorder
///
/// Fails if a recorder is already installed (e.g., a second call in tests).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "logvault_ingest_total",
        "Log ingestion attempts by outcome"
    );
    describe_counter!(
        "logvault_queries_total",
        "Log retrieval attempts by outcome"
    );
    describe_counter!(
        "logvault_cache_lookups_total",
        "Query cache lookups by result"
    );
    describe_histogram!(
        "logvault_store_query_duration_seconds",
        "Time spent executing log queries against the store"
    );
    describe_gauge!(
        "logvault_info",
        "Service version information"
    );

    gauge!("logvault_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record the outcome of a `POST /api/logs`
pub fn record_ingest(outcome: &'static str) {
    counter!("logvault_ingest_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a `GET /api/logs`
pub fn record_query(outcome: &'static str) {
    counter!("logvault_queries_total", "outcome" => outcome).increment(1);
}

/// Record a cache lookup result: `hit`, `miss` or `error`
pub fn record_cache_lookup(result: &'static str) {
    counter!("logvault_cache_lookups_total", "result" => result).increment(1);
}

/// Record time spent in the store for one query
pub fn record_store_duration(duration: Duration) {
    histogram!("logvault_store_query_duration_seconds").record(duration.as_secs_f64());
}
