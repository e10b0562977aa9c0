//! Progress callbacks for a build.

use std::path::Path;

use super::task::CompileTask;
use crate::error::Error;

/// Callback trait for build progress reporting.
///
/// Task callbacks fire from worker threads, in no particular order.
pub trait BuildCallback: Send + Sync {
    /// Called once after discovery with the number of source files found.
    fn on_sources_discovered(&self, _count: usize) {}

    /// Called when a task has been planned and its compiler is about to start.
    fn on_task_started(&self, task: &CompileTask, program: &str);

    /// Called when a task produced its artifact.
    fn on_task_completed(&self, task: &CompileTask);

    /// Called when a task failed, before or during compilation.
    fn on_task_failed(&self, source: &Path, error: &Error);

    /// Called right before the linker runs.
    fn on_link_started(&self, _binary: &Path, _command: &str) {}

    /// Called after the linker succeeded.
    fn on_link_completed(&self, _binary: &Path) {}
}

/// Callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

impl BuildCallback for NoopCallback {
    fn on_task_started(&self, _: &CompileTask, _: &str) {}
    fn on_task_completed(&self, _: &CompileTask) {}
    fn on_task_failed(&self, _: &Path, _: &Error) {}
}
