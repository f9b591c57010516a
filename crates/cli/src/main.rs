mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};

use orbit_compute::{
    RunPlan, SchedulerConfig, SchedulerDriver, SerialStrategy, StagedBarrierStrategy, Strategy,
};
use orbit_core::{load_dotenv, OutputConfig};

use crate::cli::{CliArgs, StrategyKind};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let plan = RunPlan::new(args.nb_steps, args.width, args.height, args.save_images);

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("failed to create output directory '{}'", args.output_dir.display())
    })?;
    let output = OutputConfig::in_dir(&args.output_dir);

    let strategy: Box<dyn Strategy> = match args.strategy {
        StrategyKind::Scheduler => Box::new(SchedulerDriver::new(SchedulerConfig {
            worker_threads: args.workers,
            queue_capacity: args.queue_capacity,
        })),
        StrategyKind::Staged => Box::new(StagedBarrierStrategy),
        StrategyKind::Serial => Box::new(SerialStrategy),
    };
    info!(strategy = strategy.name(), ?plan, "starting run");

    let outcome = strategy
        .run(plan, &output)
        .with_context(|| format!("{} run failed", strategy.name()))?;

    println!("ok");
    print!("{}", outcome.report.render());

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&outcome.report).context("failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to '{}'", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    Ok(())
}
