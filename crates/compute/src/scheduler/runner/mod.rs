//! Dependency-driven runner -- worker pool plus the driver that seeds,
//! waits on and shuts down a run.
//!
//! Split into focused submodules:
//! - `pool`: worker threads and the per-worker task loop
//! - `driver`: run setup, completion wait, shutdown and reporting

mod driver;
mod pool;
#[cfg(test)]
mod tests;

pub use self::driver::SchedulerDriver;
pub use self::pool::WorkerPool;
