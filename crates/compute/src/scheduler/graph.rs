//! The pipeline's dependency table.
//!
//! The graph is never materialized: finishing a task yields its successors,
//! so the DAG unfolds one step at a time as work completes.
//!
//! ```text
//! Simulate(0) ──► Simulate(1) ──► Simulate(2) ──► …
//!     │               │
//!     ▼               ▼
//!  Render(0)       Render(1)
//!     │               ⋮
//!   Blur(0) ──► SaveImage(0)        (only when saving images)
//!     │
//! Grayscale(0) ──► Stats(0) ──► SaveStats(0)
//! ```

use super::task::{Stage, Task};
use super::types::RunPlan;

/// Tasks that become runnable once `task` has finished.
///
/// `Shutdown` and the terminal stages have no successors.
pub fn successors(task: Task, plan: &RunPlan) -> Vec<Task> {
    let step = task.step;
    match task.stage {
        Stage::Simulate => {
            let mut next = Vec::with_capacity(2);
            if step + 1 < plan.nb_steps {
                next.push(Task::new(Stage::Simulate, step + 1));
            }
            next.push(Task::new(Stage::Render, step));
            next
        }
        Stage::Render => vec![Task::new(Stage::Blur, step)],
        Stage::Blur => {
            let mut next = Vec::with_capacity(2);
            if plan.save_images {
                next.push(Task::new(Stage::SaveImage, step));
            }
            next.push(Task::new(Stage::Grayscale, step));
            next
        }
        Stage::Grayscale => vec![Task::new(Stage::Stats, step)],
        Stage::Stats => vec![Task::new(Stage::SaveStats, step)],
        Stage::SaveImage | Stage::SaveStats | Stage::Shutdown => Vec::new(),
    }
}

/// Every task of a run, obtained by unfolding the graph from `Simulate(0)`.
pub fn unfold(plan: &RunPlan) -> Vec<Task> {
    let mut all = Vec::with_capacity(plan.expected_tasks());
    let mut frontier = vec![Task::new(Stage::Simulate, 0)];
    while let Some(task) = frontier.pop() {
        frontier.extend(successors(task, plan));
        all.push(task);
    }
    all
}
