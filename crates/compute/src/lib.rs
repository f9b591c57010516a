pub mod scheduler;
pub mod strategies;

pub use scheduler::{
    BoundedTaskQueue, CompletionTracker, ComputeError, PipelineStore, RunPlan, RunReport,
    SchedulerConfig, SchedulerDriver, Stage, StepSnapshot, Task,
};
pub use strategies::{RunOutcome, SerialStrategy, StagedBarrierStrategy, Strategy};
