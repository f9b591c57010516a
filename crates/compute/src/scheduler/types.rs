use serde::{Deserialize, Serialize};

use super::task::{ComputeError, Stage};

/// Shape of one run: how many steps, the frame size, and whether each
/// blurred frame is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub nb_steps: usize,
    pub width: usize,
    pub height: usize,
    pub save_images: bool,
}

impl RunPlan {
    pub fn new(nb_steps: usize, width: usize, height: usize, save_images: bool) -> Self {
        Self {
            nb_steps,
            width,
            height,
            save_images,
        }
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.nb_steps == 0 {
            return Err(ComputeError::Config("nb_steps must be at least 1".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ComputeError::Config(format!(
                "image dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Tasks executed per step: six, plus one when images are saved.
    pub fn tasks_per_step(&self) -> usize {
        if self.save_images {
            7
        } else {
            6
        }
    }

    /// Total number of tasks a complete run executes.
    pub fn expected_tasks(&self) -> usize {
        self.nb_steps * self.tasks_per_step()
    }

    /// Tasks per step with no successors. A step is finished once all of
    /// them have run.
    pub fn terminal_tasks_per_step(&self) -> usize {
        if self.save_images {
            2
        } else {
            1
        }
    }

    /// Stages run for every step, in pipeline order.
    pub fn pipeline_stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::WORK
            .into_iter()
            .filter(move |s| *s != Stage::SaveImage || self.save_images)
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of worker threads. 0 = available parallelism.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Capacity of the shared task queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_worker_threads() -> usize { 4 }
fn default_queue_capacity() -> usize { 100 }

/// Smallest queue that can hold both successors of a Blur task.
pub const MIN_QUEUE_CAPACITY: usize = 2;

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SchedulerConfig {
    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.queue_capacity < MIN_QUEUE_CAPACITY {
            return Err(ComputeError::Config(format!(
                "queue capacity must be at least {}, got {}",
                MIN_QUEUE_CAPACITY, self.queue_capacity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_task_totals() {
        assert_eq!(RunPlan::new(5, 10, 10, false).expected_tasks(), 30);
        assert_eq!(RunPlan::new(5, 10, 10, true).expected_tasks(), 35);
    }

    #[test]
    fn pipeline_stage_order() {
        let plan = RunPlan::new(1, 1, 1, false);
        let stages: Vec<Stage> = plan.pipeline_stages().collect();
        assert_eq!(
            stages,
            vec![
                Stage::Simulate,
                Stage::Render,
                Stage::Blur,
                Stage::Grayscale,
                Stage::Stats,
                Stage::SaveStats
            ]
        );

        let saving = RunPlan::new(1, 1, 1, true);
        assert_eq!(saving.pipeline_stages().count(), saving.tasks_per_step());
        assert_eq!(saving.pipeline_stages().nth(3), Some(Stage::SaveImage));
    }

    #[test]
    fn plan_validation() {
        assert!(RunPlan::new(0, 10, 10, false).validate().is_err());
        assert!(RunPlan::new(1, 0, 10, false).validate().is_err());
        assert!(RunPlan::new(1, 10, 10, false).validate().is_ok());
    }

    #[test]
    fn scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.queue_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolved_worker_threads() {
        let mut config = SchedulerConfig::default();
        config.worker_threads = 0;
        assert!(config.resolved_worker_threads() > 0);

        config.worker_threads = 8;
        assert_eq!(config.resolved_worker_threads(), 8);
    }

    #[test]
    fn tiny_queue_rejected() {
        let config = SchedulerConfig {
            worker_threads: 1,
            queue_capacity: 1,
        };
        assert!(matches!(config.validate(), Err(ComputeError::Config(_))));
    }

    #[test]
    fn config_from_partial_json() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"worker_threads":2}"#).unwrap();
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.queue_capacity, 100);
    }
}
