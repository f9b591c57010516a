use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;

use chrono::Utc;
use orbit_core::OutputConfig;
use tracing::{debug, info};

use crate::scheduler::executor::{PipelineContext, StageExecutor};
use crate::scheduler::metrics::{RunReport, StageTimings};
use crate::scheduler::task::{ComputeError, Stage, Task};
use crate::scheduler::types::RunPlan;

use super::{RunOutcome, Strategy};

type StageHandle<'scope> = ScopedJoinHandle<'scope, (Result<(), ComputeError>, StageTimings)>;

/// One thread per stage kind, each covering every step, joined before the
/// next stage starts. The only overlap is SaveImage, which runs beside
/// Grayscale, Stats and SaveStats and is joined last.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedBarrierStrategy;

impl Strategy for StagedBarrierStrategy {
    fn name(&self) -> &'static str {
        "staged"
    }

    fn run(&self, plan: RunPlan, output: &OutputConfig) -> Result<RunOutcome, ComputeError> {
        let ctx = PipelineContext::prepare(plan, output.clone())?;
        let executor = StageExecutor::new(&ctx);

        let started_at = Utc::now();
        let start = Instant::now();
        let timings = thread::scope(|scope| run_stages(scope, executor, &plan))?;
        let total = start.elapsed();

        let workers = if plan.save_images { 2 } else { 1 };
        info!(
            tasks_executed = timings.total_executed(),
            elapsed_ms = total.as_millis() as u64,
            "staged run complete"
        );
        Ok(RunOutcome {
            report: RunReport::new(self.name(), workers, started_at, total, &timings),
            store: ctx.into_store(),
        })
    }
}

fn run_stages<'scope>(
    scope: &'scope Scope<'scope, '_>,
    executor: StageExecutor<'scope>,
    plan: &RunPlan,
) -> Result<StageTimings, ComputeError> {
    let nb_steps = plan.nb_steps;
    let mut timings = StageTimings::default();

    for stage in [Stage::Simulate, Stage::Render, Stage::Blur] {
        let handle = spawn_stage(scope, executor, stage, nb_steps)?;
        timings.merge(&join_stage(handle, stage)?);
    }

    let saver = if plan.save_images {
        Some(spawn_stage(scope, executor, Stage::SaveImage, nb_steps)?)
    } else {
        None
    };

    for stage in [Stage::Grayscale, Stage::Stats, Stage::SaveStats] {
        let handle = spawn_stage(scope, executor, stage, nb_steps)?;
        timings.merge(&join_stage(handle, stage)?);
    }

    if let Some(handle) = saver {
        timings.merge(&join_stage(handle, Stage::SaveImage)?);
    }
    Ok(timings)
}

/// Start a thread running `stage` for every step in order. It stops at the
/// first fatal error.
fn spawn_stage<'scope>(
    scope: &'scope Scope<'scope, '_>,
    executor: StageExecutor<'scope>,
    stage: Stage,
    nb_steps: usize,
) -> Result<StageHandle<'scope>, ComputeError> {
    thread::Builder::new()
        .name(format!("orbit-{}", stage.label()))
        .spawn_scoped(scope, move || {
            let mut timings = StageTimings::default();
            let result = (0..nb_steps).try_for_each(|step| executor.execute(Task::new(stage, step), &mut timings));
            (result, timings)
        })
        .map_err(ComputeError::Spawn)
}

fn join_stage(handle: StageHandle<'_>, stage: Stage) -> Result<StageTimings, ComputeError> {
    let (result, timings) = handle
        .join()
        .map_err(|_| ComputeError::Join(format!("{stage} stage thread")))?;
    result?;
    debug!(stage = %stage, "stage joined");
    Ok(timings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = StagedBarrierStrategy
            .run(RunPlan::new(3, 30, 20, true), &output)
            .unwrap();

        assert_eq!(outcome.report.tasks_executed, 21);
        assert_eq!(outcome.report.strategy, "staged");
        for step in 0..3 {
            assert!(output.image_path(step).exists());
        }
    }

    #[test]
    fn without_images_runs_six_stages_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = StagedBarrierStrategy
            .run(RunPlan::new(2, 10, 10, false), &output)
            .unwrap();

        assert_eq!(outcome.report.tasks_executed, 12);
        assert_eq!(outcome.report.workers, 1);
        assert!(!output.image_path(0).exists());
    }
}
