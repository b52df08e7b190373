//! metricsink gateway library entry.
//!
//! This crate wires the buffered store, the HTTP ingestion endpoint, and the
//! YAML configuration into a runnable service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod router;
pub mod server;
pub mod store;
pub mod transport;
