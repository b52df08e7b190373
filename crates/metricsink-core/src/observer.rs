//! Flush outcome reporting.
//!
//! The store never returns flush errors to producers. Every outcome of a
//! flush cycle, and the store's own shutdown, is handed to a
//! `FlushObserver` instead. `TracingObserver` is the default sink.

use std::fmt;
use std::time::Duration;

use crate::error::MetricSinkError;

/// Step of the file append a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStage {
    Open,
    Write,
    Sync,
}

impl FlushStage {
    pub fn as_str(self) -> &'static str {
        match self {
            FlushStage::Open => "open",
            FlushStage::Write => "write",
            FlushStage::Sync => "sync",
        }
    }
}

impl fmt::Display for FlushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured store events.
#[derive(Debug)]
pub enum StoreEvent {
    /// A sealed batch was persisted.
    Flushed { batch_len: usize, elapsed: Duration },
    /// The writer failed; the sealed batch is dropped.
    FlushFailed {
        batch_len: usize,
        error: MetricSinkError,
    },
    /// The flush cycle panicked; the cycle is skipped and the loop keeps
    /// running. `batch_len` is 0 when the panic came before the seal.
    FlushPanicked {
        batch_len: usize,
        message: String,
        location: Option<String>,
        backtrace: String,
    },
    /// The background flush task has exited.
    Stopped,
}

impl StoreEvent {
    /// Short event name for logs and assertions.
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::Flushed { .. } => "flushed",
            StoreEvent::FlushFailed { .. } => "flush_failed",
            StoreEvent::FlushPanicked { .. } => "flush_panic",
            StoreEvent::Stopped => "stopped",
        }
    }
}

/// Receives store events. Called from the flush cycle on the blocking pool.
///
/// A panicking observer does not stop the store; the panic is logged and
/// the event is lost.
pub trait FlushObserver: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

/// Logs store events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FlushObserver for TracingObserver {
    fn on_event(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Flushed { batch_len, elapsed } => {
                tracing::debug!(
                    subsystem = "file_store",
                    batch_len,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "flushed"
                );
            }
            StoreEvent::FlushFailed { batch_len, error } => {
                tracing::error!(
                    subsystem = "file_store",
                    batch_len,
                    code = error.code().as_str(),
                    error = %error,
                    "flush failed, batch dropped"
                );
            }
            StoreEvent::FlushPanicked {
                batch_len,
                message,
                location,
                backtrace,
            } => {
                tracing::error!(
                    subsystem = "file_store",
                    batch_len,
                    panic = %message,
                    location = location.as_deref().unwrap_or("unknown"),
                    stack = %backtrace,
                    "panic occurred during flush"
                );
            }
            StoreEvent::Stopped => {
                tracing::info!(subsystem = "file_store", "stopped");
            }
        }
    }
}
