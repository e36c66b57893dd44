//! The asynchronous unit of report generation.
//!
//! One run per registered task: mark `InProgress`, locate the daily source
//! log, copy it into the output directory and finish `Completed` with the
//! artifact path or `Failed` with a message. Errors never escape `run`;
//! they end up in the task record.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libris_core::ReportDate;

use super::registry::{JobRegistry, TaskRecord, TaskStatus};
use crate::config::ReportsConfig;
use crate::metrics;

#[derive(Debug, Clone)]
pub struct ReportWorker {
    registry: Arc<JobRegistry>,
    config: Arc<ReportsConfig>,
}

impl ReportWorker {
    pub fn new(registry: Arc<JobRegistry>, config: Arc<ReportsConfig>) -> Self {
        Self { registry, config }
    }

    /// Drives `task_id` to a terminal state.
    pub async fn run(&self, task_id: &str, date: ReportDate) {
        tracing::info!(task_id = %task_id, date = %date, "Starting log report generation");

        if let Err(e) = self
            .registry
            .transition(task_id, |r| r.with_status(TaskStatus::InProgress))
        {
            tracing::error!(task_id = %task_id, error = %e, "Failed to mark report task as in progress");
            return;
        }

        match self.generate(task_id, date).await {
            Ok(path) => {
                tracing::info!(task_id = %task_id, path = %path.display(), "Log report generated");
                self.finish(task_id, TaskStatus::Completed, |r| r.with_file_path(path));
            }
            Err(message) => {
                tracing::warn!(task_id = %task_id, error = %message, "Log report generation failed");
                self.finish(task_id, TaskStatus::Failed, |r| {
                    r.with_error_message(message)
                });
            }
        }
    }

    async fn generate(&self, task_id: &str, date: ReportDate) -> Result<PathBuf, String> {
        let source = self.config.source_path(date);
        if !matches!(tokio::fs::try_exists(&source).await, Ok(true)) {
            return Err(format!(
                "Source log file not found for date: {date} at path {}",
                absolute(&source).display()
            ));
        }

        let target = self.config.output_path(task_id, date);
        match self.copy_into_output(&source, &target).await {
            Ok(bytes) => {
                tracing::debug!(task_id = %task_id, bytes, "copied source log");
                Ok(target)
            }
            Err(e) => Err(format!("Error generating log file for task {task_id}: {e}")),
        }
    }

    async fn copy_into_output(&self, source: &Path, target: &Path) -> std::io::Result<u64> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        tokio::fs::copy(source, target).await
    }

    fn finish(
        &self,
        task_id: &str,
        status: TaskStatus,
        apply: impl FnOnce(TaskRecord) -> TaskRecord,
    ) {
        match self
            .registry
            .transition(task_id, |r| apply(r.with_status(status)))
        {
            Ok(_) => metrics::record_report_finished(match status {
                TaskStatus::Completed => "completed",
                _ => "failed",
            }),
            Err(e) => {
                tracing::error!(task_id = %task_id, status = %status, error = %e, "Failed to record report outcome");
            }
        }
    }
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn worker_in(dir: &TempDir) -> (ReportWorker, Arc<JobRegistry>) {
        let config = ReportsConfig {
            source_dir: dir.path().join("logs"),
            source_prefix: "library".into(),
            output_dir: dir.path().join("logs/generated_reports"),
            max_concurrent_jobs: 1,
        };
        let registry = Arc::new(JobRegistry::new());
        (
            ReportWorker::new(Arc::clone(&registry), Arc::new(config)),
            registry,
        )
    }

    #[tokio::test]
    async fn missing_source_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let (worker, registry) = worker_in(&dir);
        let id = registry.register();
        let date: ReportDate = "2024-01-01".parse().unwrap();

        worker.run(&id, date).await;

        let record = registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        let message = record.error_message.unwrap();
        assert!(message.contains("2024-01-01"));
        assert!(message.contains("library-2024-01-01.log"));
        assert_eq!(registry.resolve_artifact_path(&id).unwrap(), None);
    }

    #[tokio::test]
    async fn copies_source_into_output_dir() {
        let dir = TempDir::new().unwrap();
        let (worker, registry) = worker_in(&dir);
        std::fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::fs::write(
            dir.path().join("logs/library-2024-03-05.log"),
            "INFO started\n",
        )
        .unwrap();

        let id = registry.register();
        worker.run(&id, "2024-03-05".parse().unwrap()).await;

        let record = registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        let path = record.file_path.unwrap();
        assert_eq!(
            path,
            dir.path()
                .join(format!("logs/generated_reports/{id}_2024-03-05.log"))
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "INFO started\n");
    }

    #[tokio::test]
    async fn unknown_task_is_ignored() {
        let dir = TempDir::new().unwrap();
        let (worker, registry) = worker_in(&dir);
        worker.run("missing", ReportDate::today()).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn finished_task_is_not_rerun() {
        let dir = TempDir::new().unwrap();
        let (worker, registry) = worker_in(&dir);
        let id = registry.register();
        let date: ReportDate = "2024-01-01".parse().unwrap();

        worker.run(&id, date).await;
        worker.run(&id, date).await;

        assert_eq!(registry.get(&id).unwrap().status, TaskStatus::Failed);
    }
}
