use std::time::Instant;

use chrono::Utc;
use orbit_core::OutputConfig;
use tracing::info;

use crate::scheduler::executor::{PipelineContext, StageExecutor};
use crate::scheduler::metrics::{RunReport, StageTimings};
use crate::scheduler::task::{ComputeError, Task};
use crate::scheduler::types::RunPlan;

use super::{RunOutcome, Strategy};

/// Runs every stage of every step in order on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialStrategy;

impl Strategy for SerialStrategy {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn run(&self, plan: RunPlan, output: &OutputConfig) -> Result<RunOutcome, ComputeError> {
        let ctx = PipelineContext::prepare(plan, output.clone())?;
        let executor = StageExecutor::new(&ctx);
        let mut timings = StageTimings::default();

        let started_at = Utc::now();
        let start = Instant::now();
        for step in 0..plan.nb_steps {
            for stage in plan.pipeline_stages() {
                executor.execute(Task::new(stage, step), &mut timings)?;
            }
        }
        let total = start.elapsed();

        info!(
            tasks_executed = timings.total_executed(),
            elapsed_ms = total.as_millis() as u64,
            "serial run complete"
        );
        Ok(RunOutcome {
            report: RunReport::new(self.name(), 1, started_at, total, &timings),
            store: ctx.into_store(),
        })
    }
}
