//! Sealed-batch persistence.
//!
//! `FileAppender` appends one line per metric to a newline-delimited UTF-8
//! file and forces the data to storage before returning. The file is
//! assumed to have a single writer; no file locking is done.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::batch::MetricBatch;
use crate::error::{MetricSinkError, Result};
use crate::observer::FlushStage;

/// Destination for sealed batches. Called from the blocking pool, never
/// while the live batch is locked.
pub trait BatchWriter: Send + Sync {
    fn write_batch(&self, batch: &MetricBatch) -> Result<()>;
}

/// Append-only, fsync'd line file.
#[derive(Debug, Clone)]
pub struct FileAppender {
    path: PathBuf,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> std::io::Result<File> {
        let mut opts = OpenOptions::new();
        opts.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o666);
        }
        opts.open(&self.path)
    }
}

impl BatchWriter for FileAppender {
    fn write_batch(&self, batch: &MetricBatch) -> Result<()> {
        let file = self.open().map_err(|e| MetricSinkError::io(FlushStage::Open, e))?;

        let mut out = BufWriter::new(file);
        for name in batch.iter() {
            writeln!(out, "{name}").map_err(|e| MetricSinkError::io(FlushStage::Write, e))?;
        }
        let file = out
            .into_inner()
            .map_err(|e| MetricSinkError::io(FlushStage::Write, e.into_error()))?;

        file.sync_all()
            .map_err(|e| MetricSinkError::io(FlushStage::Sync, e))?;

        // Close errors are not reported by std on drop.
        drop(file);
        Ok(())
    }
}
