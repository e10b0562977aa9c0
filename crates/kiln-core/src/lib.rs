//! Core engine for the kiln parallel C build driver.
//!
//! This crate provides:
//! - Source discovery over a directory tree
//! - Compile task planning (object paths mirror the source tree)
//! - A bounded worker pool that compiles every file concurrently
//! - Result aggregation and the compile-then-link contract
//! - A narrow process-runner seam so the pipeline can run against fakes

pub mod builder;
pub mod compile;
pub mod config;
pub mod discover;
pub mod error;
pub mod process;

pub use builder::{BuildSummary, Builder};
pub use compile::{
    BuildCallback, CompileTask, Linker, NoopCallback, ResultAggregator, TaskPlanner, TaskResult,
    WorkerPool,
};
pub use config::BuildConfig;
pub use error::{Error, ProcessError, Result};
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
