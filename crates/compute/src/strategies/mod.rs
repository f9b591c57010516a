//! Interchangeable ways of running the same pipeline.
//!
//! Every strategy executes the identical per-step stage sequence and must
//! leave identical step records and stats rows behind; they differ only in
//! how work is spread over threads.

mod serial;
mod staged;

use orbit_core::OutputConfig;

use crate::scheduler::metrics::RunReport;
use crate::scheduler::store::PipelineStore;
use crate::scheduler::task::ComputeError;
use crate::scheduler::types::RunPlan;

pub use self::serial::SerialStrategy;
pub use self::staged::StagedBarrierStrategy;

/// What a finished run hands back: timings and the final store contents.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub store: PipelineStore,
}

pub trait Strategy {
    /// Short name used in reports and on the command line.
    fn name(&self) -> &'static str;

    /// Execute `plan` from scratch, writing files under `output`.
    fn run(&self, plan: RunPlan, output: &OutputConfig) -> Result<RunOutcome, ComputeError>;
}
