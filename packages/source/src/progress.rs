//! Progress reporting for file loading and pipeline stages.
//!
//! Library code reports through [`ProgressCallback`] and never draws
//! anything itself. The `delitos` binary renders it with terminal bars;
//! tests pass [`null_progress()`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sink for progress updates from a long-running step.
pub trait ProgressCallback: Send + Sync {
    /// Units of work expected (files to read, stages to run).
    fn set_total(&self, total: u64);

    /// `delta` more units are done.
    fn inc(&self, delta: u64);

    /// Describes what is happening now.
    fn set_message(&self, msg: String);

    /// The step is over.
    fn finish(&self, msg: String);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// A shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Writes progress to the log at debug level, for runs without a
/// terminal.
#[derive(Debug, Default)]
pub struct LogProgress {
    done: AtomicU64,
    total: AtomicU64,
}

impl LogProgress {
    /// Units reported done so far.
    #[must_use]
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn inc(&self, delta: u64) {
        let done = self.done.fetch_add(delta, Ordering::Relaxed) + delta;
        log::debug!("Progress {done}/{}", self.total.load(Ordering::Relaxed));
    }

    fn set_message(&self, msg: String) {
        log::debug!("{msg}");
    }

    fn finish(&self, msg: String) {
        log::info!("{msg}");
    }
}
