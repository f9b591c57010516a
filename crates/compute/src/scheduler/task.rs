use std::fmt;

use orbit_core::OrbitError;
use serde::Serialize;

/// Error type for pipeline scheduling and stage execution.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Resource error: {0}")]
    Resource(#[from] OrbitError),
    #[error("Step {step} out of range (nb_steps = {nb_steps})")]
    StepOutOfRange { step: usize, nb_steps: usize },
    #[error("Step {step}: {slot} slot already borrowed by another task")]
    SlotContended { step: usize, slot: Slot },
    #[error("Step {step}: {slot} slot poisoned by a panicked task")]
    SlotPoisoned { step: usize, slot: Slot },
    #[error("Stage {0} cannot be executed")]
    UnexpectedStage(Stage),
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Worker thread panicked: {0}")]
    Join(String),
    #[error("Task {task} panicked: {message}")]
    Panicked { task: Task, message: String },
    #[error("{stage}({step}) output skipped: {source}")]
    Output {
        stage: Stage,
        step: usize,
        #[source]
        source: OrbitError,
    },
}

impl ComputeError {
    /// Output side-effect failures are logged and skipped; everything else
    /// stops the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ComputeError::Output { .. })
    }
}

/// Per-step storage slot, used to report which buffer a task collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Bodies,
    Raw,
    Blurred,
    Stats,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::Bodies => "bodies",
            Slot::Raw => "raw image",
            Slot::Blurred => "blurred image",
            Slot::Stats => "stats",
        })
    }
}

/// Kind of work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Simulate,
    Render,
    Blur,
    SaveImage,
    Grayscale,
    Stats,
    SaveStats,
    /// Poison pill: tells a worker to exit its loop.
    Shutdown,
}

impl Stage {
    /// Number of stages that do real work (everything but `Shutdown`).
    pub const WORK_COUNT: usize = 7;

    /// Working stages in pipeline order.
    pub const WORK: [Stage; Stage::WORK_COUNT] = [
        Stage::Simulate,
        Stage::Render,
        Stage::Blur,
        Stage::SaveImage,
        Stage::Grayscale,
        Stage::Stats,
        Stage::SaveStats,
    ];

    /// Dense index into per-stage tables. `None` for `Shutdown`.
    pub fn index(self) -> Option<usize> {
        match self {
            Stage::Shutdown => None,
            other => Some(other as usize),
        }
    }

    /// Name used in timing reports.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Simulate => "nbodies_simulation",
            Stage::Render => "image_generation",
            Stage::Blur => "image_gaussian_blur",
            Stage::SaveImage => "image_save_fs",
            Stage::Grayscale => "image_grayscale",
            Stage::Stats => "image_stats",
            Stage::SaveStats => "stats_save_fs",
            Stage::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The schedulable unit: one stage applied to one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Task {
    pub stage: Stage,
    pub step: usize,
}

impl Task {
    pub const fn new(stage: Stage, step: usize) -> Self {
        Self { stage, step }
    }

    pub const fn shutdown() -> Self {
        Self::new(Stage::Shutdown, 0)
    }

    pub fn is_shutdown(&self) -> bool {
        self.stage == Stage::Shutdown
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.stage, self.step)
    }
}
