//! Periodic sync loop.

use std::time::Duration;

use tracing::{error, info, warn};

use catalog_sync_pipeline::{Orchestrator, SyncTask, TaskReport};

/// Summary of one pass over all tasks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub documents: usize,
}

impl PassSummary {
    fn from_reports(reports: &[TaskReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            if report.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            summary.documents += report.documents;
            summary
        })
    }
}

/// Run every task once and log the outcome of each.
pub async fn run_pass(orchestrator: &Orchestrator, tasks: &[SyncTask]) -> PassSummary {
    let reports = orchestrator.run_all(tasks).await;

    for report in &reports {
        match &report.error {
            None => info!(
                task = %report.task,
                batches = report.batches,
                documents = report.documents,
                checkpoint = report.checkpoint.as_deref().unwrap_or("-"),
                "Task finished"
            ),
            Some(e) => error!(
                task = %report.task,
                batches = report.batches,
                documents = report.documents,
                checkpoint = report.checkpoint.as_deref().unwrap_or("-"),
                state = ?report.final_state,
                error = %e,
                "Task failed"
            ),
        }
    }

    PassSummary::from_reports(&reports)
}

/// Run passes until shutdown, pausing `interval` between them.
///
/// With no interval a single pass runs. Returns the number of passes.
pub async fn run_periodic(orchestrator: &Orchestrator, tasks: &[SyncTask], interval: Option<Duration>) -> usize {
    let mut shutdown = orchestrator.subscribe_shutdown();
    let mut passes = 0;

    loop {
        if orchestrator.is_shutdown_requested() {
            break;
        }

        let summary = run_pass(orchestrator, tasks).await;
        passes += 1;
        info!(
            pass = passes,
            succeeded = summary.succeeded,
            failed = summary.failed,
            documents = summary.documents,
            "Sync pass complete"
        );

        let Some(interval) = interval else { break };
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    warn!("Shutdown signal dropped");
                }
                break;
            }
        }
    }

    info!(passes, "Sync loop stopped");
    passes
}
