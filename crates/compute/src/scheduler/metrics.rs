use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::task::Stage;

/// Time spent inside each stage's collaborator, plus how many tasks of each
/// stage ran.
///
/// Each worker owns one and the driver merges them after join, so the hot
/// path never touches shared counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    elapsed: [Duration; Stage::WORK_COUNT],
    executed: [u64; Stage::WORK_COUNT],
}

impl StageTimings {
    /// Record one execution of `stage`. `Shutdown` is not timed.
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        if let Some(i) = stage.index() {
            self.elapsed[i] += elapsed;
            self.executed[i] += 1;
        }
    }

    pub fn merge(&mut self, other: &StageTimings) {
        for i in 0..Stage::WORK_COUNT {
            self.elapsed[i] += other.elapsed[i];
            self.executed[i] += other.executed[i];
        }
    }

    pub fn elapsed(&self, stage: Stage) -> Duration {
        stage.index().map_or(Duration::ZERO, |i| self.elapsed[i])
    }

    pub fn executed(&self, stage: Stage) -> u64 {
        stage.index().map_or(0, |i| self.executed[i])
    }

    pub fn total_executed(&self) -> u64 {
        self.executed.iter().sum()
    }
}

/// One stage's line in a [`RunReport`].
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub label: &'static str,
    pub tasks: u64,
    pub nanos: u128,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub strategy: String,
    pub workers: usize,
    pub started_at: DateTime<Utc>,
    pub tasks_executed: u64,
    pub total_nanos: u128,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn new(
        strategy: &str,
        workers: usize,
        started_at: DateTime<Utc>,
        total: Duration,
        timings: &StageTimings,
    ) -> Self {
        Self {
            strategy: strategy.to_string(),
            workers,
            started_at,
            tasks_executed: timings.total_executed(),
            total_nanos: total.as_nanos(),
            stages: Stage::WORK
                .iter()
                .map(|&stage| StageReport {
                    stage,
                    label: stage.label(),
                    tasks: timings.executed(stage),
                    nanos: timings.elapsed(stage).as_nanos(),
                })
                .collect(),
        }
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_nanos as u64)
    }

    /// Human-readable elapsed-time report: the total, then each stage with
    /// its share of the total.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format_duration("total", self.total_nanos, self.total_nanos));
        out.push_str("\nper stage\n");
        for stage in &self.stages {
            out.push_str(&format_duration(stage.label, stage.nanos, self.total_nanos));
        }
        out
    }
}

fn format_duration(label: &str, nanos: u128, total_nanos: u128) -> String {
    let proportion = if total_nanos == 0 {
        0.0
    } else {
        100.0 * nanos as f64 / total_nanos as f64
    };
    let seconds = nanos / 1_000_000_000;
    let millis = (nanos % 1_000_000_000) / 1_000_000;
    let ns = nanos % 1_000_000;

    let mut line = String::new();
    let _ = if seconds > 0 {
        write!(line, "  {label:>19}: {seconds:>3} s, {millis:>3} ms, {ns:>6} ns")
    } else if millis > 0 {
        write!(line, "  {label:>19}:        {millis:>3} ms, {ns:>6} ns")
    } else {
        write!(line, "  {label:>19}:                {ns:>6} ns")
    };
    let _ = writeln!(line, " ({proportion:>6.2} % of total)");
    line
}
