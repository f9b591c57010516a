#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use orbit_core::{simulate, OutputConfig, DT};

    use crate::scheduler::executor::PipelineContext;
    use crate::scheduler::queue::BoundedTaskQueue;
    use crate::scheduler::runner::pool::{guard_panics, RunShared, WorkerPool};
    use crate::scheduler::runner::SchedulerDriver;
    use crate::scheduler::task::{ComputeError, Stage, Task};
    use crate::scheduler::tracker::CompletionTracker;
    use crate::scheduler::types::{RunPlan, SchedulerConfig};
    use crate::scheduler::window::StepWindow;
    use crate::strategies::Strategy;

    fn driver(workers: usize, capacity: usize) -> SchedulerDriver {
        SchedulerDriver::new(SchedulerConfig {
            worker_threads: workers,
            queue_capacity: capacity,
        })
    }

    fn stats_steps(output: &OutputConfig) -> BTreeSet<usize> {
        std::fs::read_to_string(output.stats_path())
            .unwrap()
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap().trim().parse().unwrap())
            .collect()
    }

    #[test]
    fn runs_six_tasks_per_step_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = driver(3, 100).run(RunPlan::new(5, 60, 30, false), &output).unwrap();

        assert_eq!(outcome.report.tasks_executed, 30);
        assert_eq!(outcome.report.strategy, "scheduler");
        assert_eq!(outcome.report.workers, 3);
        for stage in [Stage::Simulate, Stage::Render, Stage::Blur, Stage::Grayscale, Stage::Stats, Stage::SaveStats] {
            let line = outcome.report.stages.iter().find(|s| s.stage == stage).unwrap();
            assert_eq!(line.tasks, 5, "{stage}");
        }
        assert_eq!(stats_steps(&output), (0..5).collect());
        assert!(!output.image_path(0).exists());
    }

    #[test]
    fn runs_seven_tasks_per_step_with_images() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = driver(4, 100).run(RunPlan::new(4, 40, 20, true), &output).unwrap();

        assert_eq!(outcome.report.tasks_executed, 28);
        for step in 0..4 {
            assert!(output.image_path(step).exists(), "missing image for step {step}");
        }
        assert_eq!(stats_steps(&output).len(), 4);
    }

    #[test]
    fn smallest_queue_with_one_worker_completes() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = driver(1, 2).run(RunPlan::new(6, 20, 10, true), &output).unwrap();
        assert_eq!(outcome.report.tasks_executed, 42);
    }

    #[test]
    fn small_queue_with_many_workers_completes() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = driver(8, 3).run(RunPlan::new(10, 20, 10, true), &output).unwrap();
        assert_eq!(outcome.report.tasks_executed, 70);
    }

    #[test]
    fn more_workers_than_steps() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = driver(16, 100).run(RunPlan::new(1, 10, 10, false), &output).unwrap();
        assert_eq!(outcome.report.tasks_executed, 6);
        assert_eq!(outcome.report.workers, 16);
    }

    #[test]
    fn body_chain_follows_integrator() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path());
        let outcome = driver(4, 100).run(RunPlan::new(6, 30, 15, false), &output).unwrap();

        let snaps = outcome.store.snapshots().unwrap();
        for pair in snaps.windows(2) {
            let mut expected = pair[0].bodies;
            simulate(&mut expected, DT);
            assert_eq!(pair[1].bodies, expected, "step {}", pair[1].step);
        }
    }

    #[test]
    fn rejects_tiny_queue() {
        let dir = tempfile::tempdir().unwrap();
        let err = driver(2, 1)
            .run(RunPlan::new(1, 10, 10, false), &OutputConfig::in_dir(dir.path()))
            .unwrap_err();
        assert!(matches!(err, ComputeError::Config(_)));
    }

    #[test]
    fn rejects_zero_steps() {
        let dir = tempfile::tempdir().unwrap();
        let err = driver(2, 10)
            .run(RunPlan::new(0, 10, 10, false), &OutputConfig::in_dir(dir.path()))
            .unwrap_err();
        assert!(matches!(err, ComputeError::Config(_)));
    }

    #[test]
    fn output_failures_are_counted_and_run_completes() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::in_dir(dir.path().join("missing"));
        let outcome = driver(3, 4).run(RunPlan::new(4, 20, 10, true), &output).unwrap();

        assert_eq!(outcome.report.tasks_executed, 28);
        let save_images = outcome.report.stages.iter().find(|s| s.stage == Stage::SaveImage).unwrap();
        assert_eq!(save_images.tasks, 4);
        assert!(!output.stats_path().exists());
    }

    #[test]
    fn panicking_task_becomes_fatal_error() {
        let task = Task::new(Stage::Blur, 3);
        let err = guard_panics(task, || panic!("kernel out of bounds")).unwrap_err();

        assert!(err.is_fatal());
        match err {
            ComputeError::Panicked { task: t, message } => {
                assert_eq!(t, task);
                assert_eq!(message, "kernel out of bounds");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn guarded_task_passes_results_through() {
        let task = Task::new(Stage::Render, 0);
        assert!(guard_panics(task, || Ok(())).is_ok());
        let err = guard_panics(task, || Err(ComputeError::UnexpectedStage(Stage::Shutdown))).unwrap_err();
        assert!(matches!(err, ComputeError::UnexpectedStage(Stage::Shutdown)));

        let formatted = format!("step {}", 7);
        let err = guard_panics(task, move || panic!("{formatted}")).unwrap_err();
        assert!(matches!(err, ComputeError::Panicked { message, .. } if message == "step 7"));
    }

    #[test]
    fn shutdown_stops_every_worker_and_drains_queue() {
        let dir = tempfile::tempdir().unwrap();
        let plan = RunPlan::new(1, 4, 4, false);
        let shared = Arc::new(RunShared {
            ctx: PipelineContext::prepare(plan, OutputConfig::in_dir(dir.path())).unwrap(),
            queue: BoundedTaskQueue::new(2),
            tracker: CompletionTracker::new(plan.expected_tasks()),
            window: StepWindow::new(&plan, 2),
        });

        let pool = WorkerPool::spawn(5, &shared).unwrap();
        assert_eq!(pool.len(), 5);
        for _ in 0..5 {
            shared.queue.enqueue(Task::shutdown());
        }
        let timings = pool.join().unwrap();

        assert!(shared.queue.is_empty());
        assert_eq!(timings.total_executed(), 0);
        assert_eq!(shared.tracker.count(), 0);
    }
}
