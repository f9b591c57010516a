use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::scheduler::executor::{PipelineContext, StageExecutor};
use crate::scheduler::metrics::StageTimings;
use crate::scheduler::queue::BoundedTaskQueue;
use crate::scheduler::task::{ComputeError, Task};
use crate::scheduler::tracker::CompletionTracker;
use crate::scheduler::window::StepWindow;

/// State shared by the driver and every worker for the length of one run.
#[derive(Debug)]
pub(super) struct RunShared {
    pub ctx: PipelineContext,
    pub queue: BoundedTaskQueue,
    pub tracker: CompletionTracker,
    pub window: StepWindow,
}

/// Fixed set of worker threads draining one [`BoundedTaskQueue`].
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<StageTimings>>,
}

impl WorkerPool {
    /// Start `workers` threads. If a spawn fails, the threads already
    /// started are shut down and joined before the error is returned.
    pub(super) fn spawn(workers: usize, shared: &Arc<RunShared>) -> Result<Self, ComputeError> {
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let worker_shared = Arc::clone(shared);
            let spawned = thread::Builder::new()
                .name(format!("orbit-worker-{id}"))
                .spawn(move || worker_loop(id, &worker_shared));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(worker = id, error = %e, "failed to spawn worker");
                    for _ in 0..handles.len() {
                        shared.queue.enqueue(Task::shutdown());
                    }
                    let _ = Self { handles }.join();
                    return Err(ComputeError::Spawn(e));
                }
            }
        }
        info!(workers, "worker pool started");
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit and merge their stage timings.
    pub fn join(self) -> Result<StageTimings, ComputeError> {
        let mut total = StageTimings::default();
        let mut failure = None;
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            match handle.join() {
                Ok(timings) => total.merge(&timings),
                Err(_) => {
                    error!(worker = %name, "worker panicked");
                    failure.get_or_insert(ComputeError::Join(name));
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }
}

fn worker_loop(id: usize, shared: &RunShared) -> StageTimings {
    let executor = StageExecutor::new(&shared.ctx);
    let mut timings = StageTimings::default();

    loop {
        let task = shared.queue.dequeue();
        if task.is_shutdown() {
            debug!(worker = id, "shutdown received");
            break;
        }

        if let Err(e) = guard_panics(task, || executor.execute(task, &mut timings)) {
            error!(worker = id, task = %task, error = %e, "fatal task failure, aborting");
            std::process::abort();
        }

        let next = executor.successors(task);
        if next.is_empty() {
            if let Some(released) = shared.window.terminal_done(task.step) {
                shared.queue.enqueue(released);
            }
        }
        for successor in next {
            if let Some(admitted) = shared.window.admit(successor) {
                shared.queue.enqueue(admitted);
            }
        }

        shared.tracker.mark_done();
    }

    timings
}

/// Run `f` for `task`, reporting a panic as [`ComputeError::Panicked`].
///
/// A worker that unwinds would never mark its task done and the driver
/// would wait forever, so panics are caught and treated like any other
/// fatal error.
pub(super) fn guard_panics<F>(task: Task, f: F) -> Result<(), ComputeError>
where
    F: FnOnce() -> Result<(), ComputeError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(ComputeError::Panicked {
            task,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
