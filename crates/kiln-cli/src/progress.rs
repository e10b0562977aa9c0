//! Terminal progress reporting.

use std::path::Path;

use kiln_core::{BuildCallback, CompileTask, Error};

use crate::colors;

/// Progress callback that prints build status to the terminal.
///
/// Task events arrive from worker threads; each event is written with a
/// single `println!` so lines from different tasks never interleave.
pub struct ProgressCallback {
    /// Whether to show per-task commands.
    verbose: bool,
}

impl ProgressCallback {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl BuildCallback for ProgressCallback {
    fn on_sources_discovered(&self, count: usize) {
        if self.verbose && count > 0 {
            println!("Found {} C files to compile", count);
        }
    }

    fn on_task_started(&self, task: &CompileTask, program: &str) {
        if self.verbose {
            println!(
                "{}  ▶ Compiling{} {} -> {}\n{}    Command: {}{}",
                colors::CYAN,
                colors::RESET,
                task.source.display(),
                task.object.display(),
                colors::DIM,
                task.command_line(program),
                colors::RESET
            );
        }
    }

    fn on_task_completed(&self, task: &CompileTask) {
        if self.verbose {
            println!(
                "{}  ✓{} {}",
                colors::GREEN,
                colors::RESET,
                task.source.display()
            );
        }
    }

    fn on_task_failed(&self, source: &Path, _error: &Error) {
        eprintln!(
            "{}  ✗ Failed{} {}",
            colors::RED,
            colors::RESET,
            source.display()
        );
    }

    fn on_link_started(&self, binary: &Path, command: &str) {
        if self.verbose {
            println!(
                "{}  ◆ Linking object files to{} {}\n{}    Command: {}{}",
                colors::CYAN,
                colors::RESET,
                binary.display(),
                colors::DIM,
                command,
                colors::RESET
            );
        }
    }
}
