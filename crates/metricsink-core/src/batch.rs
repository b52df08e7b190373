//! In-memory metric batch and buffer sizing.

use std::time::Duration;

use crate::error::{MetricSinkError, Result};

/// Headroom applied on top of `interval × rps` when pre-sizing a batch.
const CAPACITY_HEADROOM: f64 = 1.2;

/// Compute the initial batch capacity for a flush interval and an expected
/// request rate: `1.2 × interval_secs × expected_rps`, truncated.
///
/// The result only pre-sizes storage; batches grow past it freely.
pub fn capacity_hint(flush_interval: Duration, expected_rps: u64) -> Result<usize> {
    if flush_interval.is_zero() {
        return Err(MetricSinkError::Configuration(
            "flush interval must be greater than zero".into(),
        ));
    }

    let cap = CAPACITY_HEADROOM * flush_interval.as_secs_f64() * expected_rps as f64;
    if cap < 1.0 {
        return Err(MetricSinkError::Configuration(format!(
            "computed batch capacity {cap} is less than one \
             (flush_interval={flush_interval:?}, expected_rps={expected_rps})"
        )));
    }

    Ok(cap as usize)
}

/// Ordered run of metric names accumulated between two flush cycles.
#[derive(Debug, Default)]
pub struct MetricBatch {
    names: Vec<String>,
}

impl MetricBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.names.capacity()
    }

    /// Names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl<S: Into<String>> FromIterator<S> for MetricBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn capacity_for_default_deployment() {
        let cap = capacity_hint(Duration::from_secs(5), 50_000).unwrap();
        assert_eq!(cap, 300_000);
    }

    #[test]
    fn zero_rps_is_a_configuration_error() {
        let err = capacity_hint(Duration::from_secs(1), 0).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIGURATION");
    }

    #[test]
    fn zero_interval_is_a_configuration_error() {
        let err = capacity_hint(Duration::ZERO, 50_000).unwrap_err();
        assert!(matches!(err, MetricSinkError::Configuration(_)));
    }

    #[test]
    fn tiny_product_below_one_is_rejected() {
        // 1.2 * 0.1 * 8 = 0.96
        assert!(capacity_hint(Duration::from_millis(100), 8).is_err());
        // 1.2 * 0.1 * 9 = 1.08
        assert_eq!(capacity_hint(Duration::from_millis(100), 9).unwrap(), 1);
    }

    #[test]
    fn batch_preserves_insertion_order() {
        let mut batch = MetricBatch::with_capacity(4);
        batch.push("a");
        batch.push(String::from("b"));
        batch.push("c");

        assert_eq!(batch.len(), 3);
        assert!(batch.capacity() >= 4);
        assert_eq!(batch.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
