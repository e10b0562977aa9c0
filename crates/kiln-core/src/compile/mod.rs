//! Compilation pipeline.
//!
//! This module provides:
//! - Task planning (source file → object path + compiler arguments)
//! - The bounded worker pool that runs a compile batch
//! - Result aggregation across concurrent tasks
//! - The linker stage
//!
//! # Architecture
//!
//! ```text
//! sources ──► TaskPlanner ──► WorkerPool (≤ jobs compilers at once)
//!                                  │
//!                                  └── ResultAggregator ──► artifacts
//!                                                              │
//!                                                              └── Linker ──► binary
//! ```

mod aggregate;
mod context;
mod link;
mod pool;
mod task;

pub use aggregate::{ResultAggregator, TaskResult};
pub use context::{BuildCallback, NoopCallback};
pub use link::Linker;
pub use pool::WorkerPool;
pub use task::{CompileTask, TaskPlanner, object_path};
