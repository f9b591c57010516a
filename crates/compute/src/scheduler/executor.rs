use std::time::Instant;

use orbit_core::{
    compute_stats, gaussian_blur, grayscale, initial_bodies, render, save_png, simulate, OutputConfig,
    StatsWriter, DT,
};
use tracing::{debug, info, warn};

use super::graph::successors;
use super::metrics::StageTimings;
use super::store::PipelineStore;
use super::task::{ComputeError, Stage, Task};
use super::types::RunPlan;

/// Everything a task needs: the plan, the per-step store and the output sinks.
#[derive(Debug)]
pub struct PipelineContext {
    pub plan: RunPlan,
    pub store: PipelineStore,
    pub output: OutputConfig,
    stats_writer: StatsWriter,
}

impl PipelineContext {
    /// Validate the plan, clear outputs from a previous run, allocate the
    /// store and install the initial bodies in step 0.
    pub fn prepare(plan: RunPlan, output: OutputConfig) -> Result<Self, ComputeError> {
        plan.validate()?;
        output.clean(plan.nb_steps, plan.save_images)?;

        let store = PipelineStore::allocate(plan.nb_steps, plan.width, plan.height)?;
        store.seed_bodies(initial_bodies())?;
        info!(
            nb_steps = plan.nb_steps,
            width = plan.width,
            height = plan.height,
            save_images = plan.save_images,
            "pipeline store allocated"
        );

        let stats_writer = StatsWriter::new(output.stats_path());
        Ok(Self {
            plan,
            store,
            output,
            stats_writer,
        })
    }

    pub fn into_store(self) -> PipelineStore {
        self.store
    }
}

/// Runs the collaborator bound to a task's stage against the task's step,
/// and names the tasks that become runnable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct StageExecutor<'a> {
    ctx: &'a PipelineContext,
}

impl<'a> StageExecutor<'a> {
    pub fn new(ctx: &'a PipelineContext) -> Self {
        Self { ctx }
    }

    pub fn successors(&self, task: Task) -> Vec<Task> {
        successors(task, &self.ctx.plan)
    }

    /// Execute `task`, adding the collaborator time to `timings`.
    ///
    /// Failed output side effects are logged and swallowed so the task still
    /// counts as done. Any other error is fatal to the run.
    pub fn execute(&self, task: Task, timings: &mut StageTimings) -> Result<(), ComputeError> {
        let start = Instant::now();
        let result = self.run_stage(task);
        timings.record(task.stage, start.elapsed());

        match result {
            Ok(()) => {
                debug!(task = %task, "task done");
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                warn!(task = %task, error = %e, "output side effect skipped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn run_stage(&self, task: Task) -> Result<(), ComputeError> {
        let step = task.step;
        let record = self.ctx.store.get(step)?;

        match task.stage {
            Stage::Simulate => {
                let mut bodies = record.bodies_mut()?;
                if step > 0 {
                    *bodies = *self.ctx.store.get(step - 1)?.bodies()?;
                }
                simulate(&mut *bodies, DT);
            }
            Stage::Render => {
                let bodies = record.bodies()?;
                let mut raw = record.raw_mut()?;
                render(&*bodies, &mut *raw);
            }
            Stage::Blur => {
                let raw = record.raw()?;
                let mut blurred = record.blurred_mut()?;
                gaussian_blur(&*raw, &mut *blurred);
            }
            Stage::SaveImage => {
                let path = self.ctx.output.image_path(step);
                let blurred = record.blurred()?;
                save_png(&*blurred, &path).map_err(|source| ComputeError::Output {
                    stage: task.stage,
                    step,
                    source,
                })?;
            }
            Stage::Grayscale => {
                let blurred = record.blurred()?;
                let mut raw = record.raw_mut()?;
                grayscale(&*blurred, &mut *raw);
            }
            Stage::Stats => {
                let raw = record.raw()?;
                let stats = compute_stats(&*raw);
                *record.stats_mut()? = stats;
            }
            Stage::SaveStats => {
                let stats = *record.stats()?;
                self.ctx
                    .stats_writer
                    .append(step, &stats)
                    .map_err(|source| ComputeError::Output {
                        stage: task.stage,
                        step,
                        source,
                    })?;
            }
            Stage::Shutdown => return Err(ComputeError::UnexpectedStage(task.stage)),
        }
        Ok(())
    }
}
