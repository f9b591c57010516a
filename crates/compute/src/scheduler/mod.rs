//! Dependency-driven task scheduler for the per-step image pipeline.
//!
//! A run is a DAG of [`Task`]s, one per (stage, step), unfolded on the fly:
//! the driver seeds `Simulate(0)` and every finished task enqueues the tasks
//! it unblocks (see [`graph::successors`]). Workers drain a
//! [`BoundedTaskQueue`], a [`CompletionTracker`] detects when every task has
//! run, and the driver then stops the pool with one `Shutdown` task per
//! worker.

pub mod executor;
pub mod graph;
pub mod metrics;
pub mod queue;
pub mod runner;
pub mod store;
pub mod task;
pub mod tracker;
pub mod types;
pub mod window;

pub use executor::{PipelineContext, StageExecutor};
pub use graph::{successors, unfold};
pub use metrics::{RunReport, StageReport, StageTimings};
pub use queue::BoundedTaskQueue;
pub use runner::{SchedulerDriver, WorkerPool};
pub use store::{PipelineStore, StepRecord, StepSnapshot};
pub use task::{ComputeError, Slot, Stage, Task};
pub use tracker::CompletionTracker;
pub use types::{RunPlan, SchedulerConfig, MIN_QUEUE_CAPACITY};
pub use window::StepWindow;
