use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use stride_db::Database;
use stride_streaks::{Clock, StaleStreakSweeper};

/// A periodic maintenance pass. Implementations are registered with
/// `run_maintenance_loop` and share one schedule.
#[async_trait]
pub trait MaintenanceJob: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<JobSummary>;
}

/// What a job did on one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobSummary {
    pub touched: usize,
    pub failed: usize,
}

/// Background task driving every registered job on a fixed interval.
///
/// A failing job is logged and retried on the next tick; it never takes the
/// loop down.
pub async fn run_maintenance_loop(
    jobs: Vec<Arc<dyn MaintenanceJob>>,
    clock: Arc<dyn Clock>,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;
        let now = clock.now();

        for job in &jobs {
            match job.run(now).await {
                Ok(summary) => {
                    if summary.touched > 0 || summary.failed > 0 {
                        info!(
                            job = job.name(),
                            touched = summary.touched,
                            failed = summary.failed,
                            "maintenance pass complete"
                        );
                    }
                }
                Err(e) => {
                    warn!(job = job.name(), error = %e, "maintenance pass failed");
                }
            }
        }
    }
}

/// Zeroes streaks whose last activity day has fallen more than one calendar
/// day behind.
pub struct StreakSweepJob {
    db: Arc<Database>,
}

impl StreakSweepJob {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MaintenanceJob for StreakSweepJob {
    fn name(&self) -> &str {
        "stale-streak-sweep"
    }

    async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<JobSummary> {
        let db = self.db.clone();
        let report = tokio::task::spawn_blocking(move || {
            StaleStreakSweeper::new(db.as_ref()).reset_stale_streaks(now)
        })
        .await??;

        Ok(JobSummary {
            touched: report.reset,
            failed: report.failed,
        })
    }
}
