//! Report job tracker facade used by the HTTP layer.

use std::path::PathBuf;
use std::sync::Arc;

use libris_core::ReportDate;
use tokio::sync::Semaphore;

use super::registry::{JobError, JobRegistry, TaskRecord, TaskStatus};
use super::worker::ReportWorker;
use crate::config::ReportsConfig;
use crate::metrics;

/// Accepts report requests and hands them to background workers.
///
/// `initiate` returns as soon as the task is registered; the job runs on its
/// own tokio task once one of `max_concurrent_jobs` permits is free. A
/// saturated pool leaves tasks `Pending` until a permit frees up.
#[derive(Debug, Clone)]
pub struct ReportService {
    registry: Arc<JobRegistry>,
    worker: ReportWorker,
    permits: Arc<Semaphore>,
    config: Arc<ReportsConfig>,
}

impl ReportService {
    pub fn new(config: ReportsConfig) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(JobRegistry::new());
        Self {
            worker: ReportWorker::new(Arc::clone(&registry), Arc::clone(&config)),
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
            registry,
            config,
        }
    }

    /// Registers a task for `date` and schedules its generation.
    pub async fn initiate(&self, date: ReportDate) -> String {
        if let Err(e) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            tracing::warn!(
                dir = %self.config.output_dir.display(),
                error = %e,
                "Could not create directory for generated reports"
            );
        }

        let task_id = self.registry.register();
        metrics::record_report_submitted();
        tracing::info!(task_id = %task_id, date = %date, "Log report task accepted");

        let worker = self.worker.clone();
        let permits = Arc::clone(&self.permits);
        let registry = Arc::clone(&self.registry);
        let id = task_id.clone();
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(task_id = %id, error = %e, "Report worker pool closed");
                    let _ = registry
                        .transition(&id, |r| r.with_status(TaskStatus::InProgress))
                        .and_then(|_| {
                            registry.transition(&id, |r| {
                                r.with_status(TaskStatus::Failed)
                                    .with_error_message(format!("Report worker pool closed: {e}"))
                            })
                        });
                    return;
                }
            };
            worker.run(&id, date).await;
        });

        task_id
    }

    pub fn status(&self, task_id: &str) -> Result<TaskRecord, JobError> {
        self.registry.get(task_id)
    }

    pub fn artifact_path(&self, task_id: &str) -> Result<Option<PathBuf>, JobError> {
        self.registry.resolve_artifact_path(task_id)
    }

    /// Location of the raw daily log served by `GET /logs`.
    pub fn source_log_path(&self, date: ReportDate) -> PathBuf {
        self.config.source_path(date)
    }

    pub fn source_file_name(&self, date: ReportDate) -> String {
        self.config.source_file_name(date)
    }
}
