//! Result aggregation for a compile batch.
//!
//! The aggregator is the only mutable state shared between workers.
//! Artifacts and failures are each appended under their own mutex in
//! completion order. The failure queue is preallocated for every task, so
//! recording a failure never reallocates while the lock is held.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};

/// Outcome of one compile task: the artifact path, or the task's error.
pub type TaskResult = Result<PathBuf>;

/// Collects task results from concurrent workers.
pub struct ResultAggregator {
    total: usize,
    artifacts: Mutex<Vec<PathBuf>>,
    failures: Mutex<Vec<Error>>,
}

impl ResultAggregator {
    /// Create an aggregator for a batch of `total` tasks.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            artifacts: Mutex::new(Vec::with_capacity(total)),
            failures: Mutex::new(Vec::with_capacity(total)),
        }
    }

    /// Number of tasks in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Record the result of one task. Safe to call from any worker.
    pub fn record(&self, result: TaskResult) {
        match result {
            // A push cannot leave the Vec torn, so a poisoned guard is still usable.
            Ok(artifact) => self
                .artifacts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(artifact),
            Err(error) => self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(error),
        }
    }

    /// Close the batch and produce its outcome.
    ///
    /// Failures are drained in the order they were recorded; if there are any
    /// the batch fails with all of them, the first drained being the
    /// representative error. Otherwise every artifact is returned in
    /// completion order.
    pub fn finish(self) -> Result<Vec<PathBuf>> {
        let failures = self
            .failures
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if !failures.is_empty() {
            let total = self.total;
            return Err(Error::Batch { failures, total });
        }

        Ok(self
            .artifacts
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner))
    }
}
