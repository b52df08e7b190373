//! HTTP ingestion endpoint.
//!
//! The request path is the metric name: `GET /cpu.load` records `cpu.load`.
//! Any method is accepted. An empty name is rejected before the sink is
//! called; nothing else is validated.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::app_state::AppState;

/// Write side of a metric store, as seen by the endpoint.
pub trait MetricSink: Send + Sync {
    fn add_metric(&self, name: &str);
}

/// `/*metric`: record the decoded path (without its leading `/`).
pub async fn ingest(State(app): State<AppState>, Path(metric): Path<String>) -> StatusCode {
    if metric.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    app.sink().add_metric(&metric);
    StatusCode::OK
}

/// `/`: no metric name.
pub async fn reject_empty() -> StatusCode {
    StatusCode::BAD_REQUEST
}
