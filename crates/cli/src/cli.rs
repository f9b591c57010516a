use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Orbital simulation image pipeline.
///
/// Simulates a small n-body system for `nb_steps` steps and, for every
/// step, renders a frame, blurs it, converts it to grayscale and appends
/// its statistics to `img-stats.csv`.
#[derive(Parser, Debug)]
#[command(name = "orbit", about = "Parallel orbital simulation image pipeline")]
pub struct CliArgs {
    /// Number of simulation steps (at least 1)
    pub nb_steps: usize,

    /// Frame width in pixels
    pub width: usize,

    /// Frame height in pixels
    pub height: usize,

    /// Write each blurred frame as a PNG: 0 or 1
    #[arg(value_parser = parse_save_images, action = clap::ArgAction::Set)]
    pub save_images: bool,

    /// Worker threads for the scheduler strategy (0 = available parallelism)
    #[arg(long, env = "ORBIT_WORKERS", default_value = "4")]
    pub workers: usize,

    /// Capacity of the scheduler's task queue
    #[arg(long, env = "ORBIT_QUEUE_CAPACITY", default_value = "100")]
    pub queue_capacity: usize,

    /// Execution strategy
    #[arg(long, env = "ORBIT_STRATEGY", value_enum, default_value = "scheduler")]
    pub strategy: StrategyKind,

    /// Directory for the stats file and images
    #[arg(long, env = "ORBIT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write the run report as JSON to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Worker pool driven by the task dependency graph
    Scheduler,
    /// One thread per stage with a join after each
    Staged,
    /// Everything on the main thread
    Serial,
}

fn parse_save_images(s: &str) -> Result<bool, String> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("expected 0 or 1, got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn save_flag_is_a_positional_value() {
        let off = CliArgs::try_parse_from(["orbit", "2", "20", "10", "0"]).unwrap();
        assert!(!off.save_images);
        let on = CliArgs::try_parse_from(["orbit", "2", "20", "10", "1"]).unwrap();
        assert!(on.save_images);
    }

    #[test]
    fn positional_arguments() {
        let args = CliArgs::try_parse_from(["orbit", "10", "640", "480", "1"]).unwrap();
        assert_eq!(args.nb_steps, 10);
        assert_eq!((args.width, args.height), (640, 480));
        assert!(args.save_images);
        assert_eq!(args.strategy, StrategyKind::Scheduler);
        assert!(args.report_json.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::try_parse_from([
            "orbit", "3", "10", "10", "0", "--strategy", "staged", "--workers", "2",
            "--queue-capacity", "8", "--output-dir", "/tmp/orbit",
        ])
        .unwrap();
        assert!(!args.save_images);
        assert_eq!(args.strategy, StrategyKind::Staged);
        assert_eq!(args.workers, 2);
        assert_eq!(args.queue_capacity, 8);
        assert_eq!(args.output_dir, PathBuf::from("/tmp/orbit"));
    }

    #[test]
    fn rejects_bad_save_flag() {
        assert!(CliArgs::try_parse_from(["orbit", "1", "10", "10", "yes"]).is_err());
        assert!(CliArgs::try_parse_from(["orbit", "1", "10", "10", "2"]).is_err());
    }

    #[test]
    fn rejects_missing_and_non_numeric_arguments() {
        assert!(CliArgs::try_parse_from(["orbit", "1", "10", "10"]).is_err());
        assert!(CliArgs::try_parse_from(["orbit", "x", "10", "10", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["orbit", "1", "-3", "10", "0"]).is_err());
    }
}
