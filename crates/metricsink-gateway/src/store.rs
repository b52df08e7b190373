//! Buffered metric store.
//!
//! Producers append metric names to an in-memory batch under a short lock.
//! One background task wakes on a fixed interval and runs a flush cycle on
//! the blocking pool: seal the live batch by swapping in an empty one, hand
//! the sealed batch to a `BatchWriter`, report the outcome. The lock is never
//! held across file I/O. The whole cycle runs inside a panic boundary, so a
//! faulty writer or observer costs one cycle, never the loop.
//!
//! Durability is best-effort:
//! - a batch whose write fails is dropped, not requeued;
//! - `stop` lets an in-flight flush finish but does not flush the tail, so
//!   metrics added after the last completed flush are lost on shutdown.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use metricsink_core::error::{MetricSinkError, Result};
use metricsink_core::fault;
use metricsink_core::{
    capacity_hint, BatchWriter, FileAppender, FlushObserver, MetricBatch, StoreEvent,
    TracingObserver,
};

use crate::transport::http::MetricSink;

/// Store construction parameters.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Target file (newline-delimited, append-only).
    pub path: PathBuf,
    /// Period of the flush timer. Must be non-zero.
    pub flush_interval: Duration,
    /// Expected requests per second; only sizes the batch.
    pub expected_rps: u64,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>, flush_interval: Duration, expected_rps: u64) -> Self {
        Self {
            path: path.into(),
            flush_interval,
            expected_rps,
        }
    }
}

/// Observable lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Running,
    Stopped,
}

enum TaskState {
    NotStarted,
    Running {
        stop_tx: oneshot::Sender<()>,
        task: JoinHandle<()>,
    },
    Stopped,
}

struct StoreInner {
    live: Mutex<MetricBatch>,
    capacity: usize,
    flush_interval: Duration,
    writer: Arc<dyn BatchWriter>,
    observer: Arc<dyn FlushObserver>,
}

/// In-memory accumulator flushed to disk on a timer.
pub struct BufferedStore {
    inner: Arc<StoreInner>,
    task: Mutex<TaskState>,
}

impl BufferedStore {
    /// Build a store appending to `config.path` and logging through `tracing`.
    ///
    /// Fails with `MetricSinkError::Configuration` when the flush interval is
    /// zero or `1.2 × interval_secs × expected_rps` is below one.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let capacity = capacity_hint(config.flush_interval, config.expected_rps)?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                live: Mutex::new(MetricBatch::with_capacity(capacity)),
                capacity,
                flush_interval: config.flush_interval,
                writer: Arc::new(FileAppender::new(config.path)),
                observer: Arc::new(TracingObserver),
            }),
            task: Mutex::new(TaskState::NotStarted),
        })
    }

    /// Replace the batch writer. Only valid before `start`.
    pub fn with_writer(self, writer: Arc<dyn BatchWriter>) -> Result<Self> {
        self.rebuild(|inner| inner.writer = writer)
    }

    /// Replace the event observer. Only valid before `start`.
    pub fn with_observer(self, observer: Arc<dyn FlushObserver>) -> Result<Self> {
        self.rebuild(|inner| inner.observer = observer)
    }

    fn rebuild(self, apply: impl FnOnce(&mut StoreInner)) -> Result<Self> {
        let mut inner = Arc::try_unwrap(self.inner).map_err(|_| {
            MetricSinkError::Lifecycle("store parts cannot change after start".into())
        })?;
        apply(&mut inner);
        Ok(Self {
            inner: Arc::new(inner),
            task: self.task,
        })
    }

    /// Initial capacity of every fresh batch.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn flush_interval(&self) -> Duration {
        self.inner.flush_interval
    }

    /// Number of metrics waiting in the live batch.
    pub fn pending(&self) -> usize {
        self.inner.lock_live().len()
    }

    pub fn state(&self) -> Lifecycle {
        match &*self.lock_task() {
            TaskState::NotStarted => Lifecycle::NotStarted,
            TaskState::Running { .. } => Lifecycle::Running,
            TaskState::Stopped => Lifecycle::Stopped,
        }
    }

    /// Append a metric to the live batch. Never touches the disk.
    pub fn add_metric(&self, name: impl Into<String>) {
        self.inner.lock_live().push(name);
    }

    /// Spawn the flush loop on the current tokio runtime.
    ///
    /// Returns immediately. A store can be started once, and only from
    /// within a runtime.
    pub fn start(&self) -> Result<()> {
        let mut state = self.lock_task();
        if !matches!(*state, TaskState::NotStarted) {
            return Err(MetricSinkError::Lifecycle("store already started".into()));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            MetricSinkError::Lifecycle(format!("store must start inside a tokio runtime: {e}"))
        })?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = runtime.spawn(Arc::clone(&self.inner).run(stop_rx));
        *state = TaskState::Running { stop_tx, task };

        tracing::info!(
            subsystem = "file_store",
            capacity = self.inner.capacity,
            flush_interval_ms = self.inner.flush_interval.as_millis() as u64,
            "started"
        );
        Ok(())
    }

    /// Signal the flush loop and wait for it to exit.
    ///
    /// A flush already in progress completes first. Metrics still in the live
    /// batch are not flushed.
    pub async fn stop(&self) -> Result<()> {
        let prev = std::mem::replace(&mut *self.lock_task(), TaskState::Stopped);
        let (stop_tx, task) = match prev {
            TaskState::Running { stop_tx, task } => (stop_tx, task),
            TaskState::NotStarted => {
                *self.lock_task() = TaskState::NotStarted;
                return Err(MetricSinkError::Lifecycle("store not started".into()));
            }
            TaskState::Stopped => {
                return Err(MetricSinkError::Lifecycle("store already stopped".into()));
            }
        };

        // The loop may already be gone if its runtime shut down.
        let _ = stop_tx.send(());
        task.await
            .map_err(|e| MetricSinkError::Internal(format!("flush task failed: {e}")))?;

        self.inner.report(&StoreEvent::Stopped);
        Ok(())
    }

    fn lock_task(&self) -> MutexGuard<'_, TaskState> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricSink for BufferedStore {
    fn add_metric(&self, name: &str) {
        BufferedStore::add_metric(self, name);
    }
}

impl StoreInner {
    // A panic elsewhere never leaves the batch half-updated: push and swap are
    // single operations, so a poisoned lock is still safe to use.
    fn lock_live(&self) -> MutexGuard<'_, MetricBatch> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, mut stop_rx: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            // Stop wins over a tick that came due during a slow flush.
            tokio::select! {
                biased;
                // Also fires if the store was dropped without `stop`.
                _ = &mut stop_rx => break,
                _ = ticker.tick() => Arc::clone(&self).flush().await,
            }
        }
    }

    /// Swap the live batch for an empty one. `None` when there is nothing to flush.
    fn seal(&self) -> Option<MetricBatch> {
        let mut live = self.lock_live();
        if live.is_empty() {
            return None;
        }
        Some(std::mem::replace(
            &mut *live,
            MetricBatch::with_capacity(self.capacity),
        ))
    }

    /// Run one flush cycle on the blocking pool and wait for it.
    async fn flush(self: Arc<Self>) {
        let cycle = Arc::clone(&self);
        let joined = tokio::task::spawn_blocking(move || cycle.flush_cycle()).await;

        // The cycle catches its own panics; a join error means the job was
        // cancelled before it ran, so nothing was sealed.
        if let Err(join_err) = joined {
            let event = if join_err.is_panic() {
                StoreEvent::FlushPanicked {
                    batch_len: 0,
                    message: fault::panic_message(&*join_err.into_panic()),
                    location: None,
                    backtrace: String::new(),
                }
            } else {
                let error =
                    MetricSinkError::Internal(format!("flush cycle did not run: {join_err}"));
                StoreEvent::FlushFailed {
                    batch_len: 0,
                    error,
                }
            };
            self.report(&event);
        }
    }

    /// Seal, write, report. Never fails: every outcome goes to the observer.
    fn flush_cycle(&self) {
        let mut batch_len = 0;
        let event = match fault::catch(|| self.write_sealed(&mut batch_len)) {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(report) => StoreEvent::FlushPanicked {
                batch_len,
                message: report.message,
                location: report.location,
                backtrace: report.backtrace,
            },
        };
        self.report(&event);
    }

    /// `None` when the live batch was empty and no file was touched.
    fn write_sealed(&self, batch_len: &mut usize) -> Option<StoreEvent> {
        let sealed = self.seal()?;
        *batch_len = sealed.len();

        let started = Instant::now();
        let event = match self.writer.write_batch(&sealed) {
            Ok(()) => StoreEvent::Flushed {
                batch_len: *batch_len,
                elapsed: started.elapsed(),
            },
            Err(error) => StoreEvent::FlushFailed {
                batch_len: *batch_len,
                error,
            },
        };
        Some(event)
    }

    fn report(&self, event: &StoreEvent) {
        if let Err(report) = fault::catch(|| self.observer.on_event(event)) {
            tracing::error!(
                subsystem = "file_store",
                event = event.name(),
                panic = %report.message,
                location = report.location.as_deref().unwrap_or("unknown"),
                stack = %report.backtrace,
                "observer panicked, event dropped"
            );
        }
    }
}
