//! metricsink core: runtime-free building blocks for the buffered metric store.
//!
//! This crate defines the error surface, the in-memory batch, and the two
//! seams the store flushes through: `BatchWriter` (where sealed batches go)
//! and `FlushObserver` (where flush outcomes are reported). It carries no
//! async runtime so the pieces can be tested and reused on their own.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `MetricSinkError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod batch;
pub mod error;
pub mod fault;
pub mod observer;
pub mod writer;

/// Shared result type.
pub use error::{MetricSinkError, Result};

pub use batch::{capacity_hint, MetricBatch};
pub use fault::PanicReport;
pub use observer::{FlushObserver, FlushStage, StoreEvent, TracingObserver};
pub use writer::{BatchWriter, FileAppender};
