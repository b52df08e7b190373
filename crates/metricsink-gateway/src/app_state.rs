//! Shared application state for the ingestion endpoint.

use std::sync::Arc;

use crate::transport::http::MetricSink;

#[derive(Clone)]
pub struct AppState {
    sink: Arc<dyn MetricSink>,
}

impl AppState {
    pub fn new(sink: Arc<dyn MetricSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &dyn MetricSink {
        self.sink.as_ref()
    }
}
