//! Axum router wiring (HTTP -> metric sink).

use axum::{routing::any, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(transport::http::reject_empty))
        .route("/*metric", any(transport::http::ingest))
        .with_state(state)
}
