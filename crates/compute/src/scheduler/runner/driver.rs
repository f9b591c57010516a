use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use orbit_core::OutputConfig;
use tracing::{info, warn};

use crate::scheduler::executor::PipelineContext;
use crate::scheduler::metrics::RunReport;
use crate::scheduler::queue::BoundedTaskQueue;
use crate::scheduler::task::{ComputeError, Stage, Task};
use crate::scheduler::tracker::CompletionTracker;
use crate::scheduler::types::{RunPlan, SchedulerConfig};
use crate::scheduler::window::StepWindow;
use crate::strategies::{RunOutcome, Strategy};

use super::pool::{RunShared, WorkerPool};

/// Dependency-driven strategy: a worker pool fed from a bounded queue, with
/// each finished task enqueueing the tasks it unblocks.
#[derive(Debug, Clone, Default)]
pub struct SchedulerDriver {
    config: SchedulerConfig,
}

impl SchedulerDriver {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl Strategy for SchedulerDriver {
    fn name(&self) -> &'static str {
        "scheduler"
    }

    fn run(&self, plan: RunPlan, output: &OutputConfig) -> Result<RunOutcome, ComputeError> {
        self.config.validate()?;
        let workers = self.config.resolved_worker_threads();
        let ctx = PipelineContext::prepare(plan, output.clone())?;

        let window = StepWindow::new(&plan, self.config.queue_capacity);
        info!(
            workers,
            queue_capacity = self.config.queue_capacity,
            step_window = window.limit(),
            expected_tasks = plan.expected_tasks(),
            "starting scheduler run"
        );

        let shared = Arc::new(RunShared {
            ctx,
            queue: BoundedTaskQueue::new(self.config.queue_capacity),
            tracker: CompletionTracker::new(plan.expected_tasks()),
            window,
        });

        let pool = WorkerPool::spawn(workers, &shared)?;
        let started_at = Utc::now();
        let start = Instant::now();

        if let Some(seed) = shared.window.admit(Task::new(Stage::Simulate, 0)) {
            shared.queue.enqueue(seed);
        }
        shared.tracker.wait_until_complete();
        let total = start.elapsed();

        for _ in 0..pool.len() {
            shared.queue.enqueue(Task::shutdown());
        }
        let timings = pool.join()?;

        let tasks_executed = shared.tracker.count();
        if !shared.queue.is_empty() {
            warn!(left = shared.queue.len(), "task queue not drained after shutdown");
        }
        info!(
            tasks_executed,
            queue_high_water = shared.queue.high_water(),
            elapsed_ms = total.as_millis() as u64,
            "scheduler run complete"
        );

        let shared = Arc::try_unwrap(shared)
            .map_err(|_| ComputeError::Join("run state still shared after join".into()))?;
        let mut report = RunReport::new(self.name(), workers, started_at, total, &timings);
        report.tasks_executed = tasks_executed as u64;

        Ok(RunOutcome {
            report,
            store: shared.ctx.into_store(),
        })
    }
}
