//! Admission control for new steps.
//!
//! Simulate(i) spawns Simulate(i+1) as soon as it finishes, so without a
//! limit the simulation chain runs arbitrarily far ahead and floods the
//! queue with Render tasks. Once every worker is blocked in `enqueue` on a
//! full queue nobody is left to dequeue and the run deadlocks.
//!
//! A step holds at most two queued tasks at once (SaveImage and Grayscale
//! after Blur; one otherwise). Keeping at most `capacity / 2` steps in flight
//! therefore bounds the queue length by its capacity, so `enqueue` never
//! waits during a run. A Simulate task that would exceed the window is
//! parked and released when an earlier step finishes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::task::{Stage, Task};
use super::types::RunPlan;

#[derive(Debug)]
struct WindowState {
    in_flight: usize,
    /// At most one: the simulation chain is linear.
    parked: Option<Task>,
}

#[derive(Debug)]
pub struct StepWindow {
    limit: usize,
    state: Mutex<WindowState>,
    /// Terminal tasks still outstanding, per step.
    remaining: Vec<AtomicUsize>,
}

impl StepWindow {
    pub fn new(plan: &RunPlan, queue_capacity: usize) -> Self {
        let terminals = plan.terminal_tasks_per_step();
        Self {
            limit: (queue_capacity / 2).max(1),
            state: Mutex::new(WindowState {
                in_flight: 0,
                parked: None,
            }),
            remaining: (0..plan.nb_steps).map(|_| AtomicUsize::new(terminals)).collect(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Pass a task through the window. Non-Simulate tasks always pass; a
    /// Simulate task opens a new step and is parked when the window is full.
    pub fn admit(&self, task: Task) -> Option<Task> {
        if task.stage != Stage::Simulate {
            return Some(task);
        }
        let mut state = self.lock();
        if state.in_flight < self.limit {
            state.in_flight += 1;
            Some(task)
        } else {
            debug!(step = task.step, in_flight = state.in_flight, "step window full, parking");
            debug_assert!(state.parked.is_none());
            state.parked = Some(task);
            None
        }
    }

    /// Record that a terminal task of `step` finished. When that was the
    /// step's last one, the step leaves the window and any parked Simulate
    /// task is returned for enqueueing.
    pub fn terminal_done(&self, step: usize) -> Option<Task> {
        let slot = self.remaining.get(step)?;
        if slot.fetch_sub(1, Ordering::AcqRel) != 1 {
            return None;
        }

        let mut state = self.lock();
        state.in_flight -= 1;
        let released = state.parked.take();
        if released.is_some() {
            state.in_flight += 1;
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(step: usize) -> Task {
        Task::new(Stage::Simulate, step)
    }

    #[test]
    fn limit_is_half_capacity() {
        let plan = RunPlan::new(10, 1, 1, false);
        assert_eq!(StepWindow::new(&plan, 100).limit(), 50);
        assert_eq!(StepWindow::new(&plan, 3).limit(), 1);
    }

    #[test]
    fn non_simulate_passes_through() {
        let plan = RunPlan::new(2, 1, 1, false);
        let window = StepWindow::new(&plan, 2);
        let render = Task::new(Stage::Render, 0);
        assert_eq!(window.admit(render), Some(render));
        assert_eq!(window.in_flight(), 0);
    }

    #[test]
    fn parks_and_releases_on_step_completion() {
        let plan = RunPlan::new(3, 1, 1, false);
        let window = StepWindow::new(&plan, 2);

        assert_eq!(window.admit(sim(0)), Some(sim(0)));
        assert_eq!(window.admit(sim(1)), None);
        assert_eq!(window.in_flight(), 1);

        assert_eq!(window.terminal_done(0), Some(sim(1)));
        assert_eq!(window.in_flight(), 1);
        assert_eq!(window.terminal_done(1), None);
        assert_eq!(window.in_flight(), 0);
    }

    #[test]
    fn step_retires_after_all_terminals() {
        let plan = RunPlan::new(2, 1, 1, true);
        let window = StepWindow::new(&plan, 2);
        window.admit(sim(0));
        assert_eq!(window.admit(sim(1)), None);

        // SaveImage(0) alone does not retire step 0.
        assert_eq!(window.terminal_done(0), None);
        assert_eq!(window.terminal_done(0), Some(sim(1)));
    }
}
