//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use metricsink_core::error::{MetricSinkError, Result};

pub use schema::{ServerSection, SinkConfig, StoreSection};

pub fn load_from_file(path: &str) -> Result<SinkConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricSinkError::Configuration(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<SinkConfig> {
    let cfg: SinkConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricSinkError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
