pub mod health;
pub mod logs;
pub mod metrics_handler;

use crate::logs::LogService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub logs: LogService,
    /// `None` when metrics are disabled
    pub metrics: Option<Arc<PrometheusHandle>>,
}
