use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use metricsink_core::capacity_hint;
use metricsink_core::error::{MetricSinkError, Result};

use crate::store::StoreConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            store: StoreSection::default(),
        }
    }
}

impl SinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricSinkError::Configuration(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.store.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.shutdown_timeout_ms == 0 {
            return Err(MetricSinkError::Configuration(
                "server.shutdown_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MetricSinkError::Configuration(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    #[serde(default = "default_expected_rps")]
    pub expected_rps: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_path(),
            flush_interval_ms: default_flush_interval_ms(),
            expected_rps: default_expected_rps(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(MetricSinkError::Configuration(
                "store.path must not be empty".into(),
            ));
        }
        capacity_hint(self.flush_interval(), self.expected_rps)?;
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.path, self.flush_interval(), self.expected_rps)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_shutdown_timeout_ms() -> u64 {
    10_000
}
fn default_path() -> String {
    "store.txt".into()
}
fn default_flush_interval_ms() -> u64 {
    5_000
}
fn default_expected_rps() -> u64 {
    50_000
}
