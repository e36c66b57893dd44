//! In-process registry of report generation tasks.
//!
//! Every task moves `Pending -> InProgress -> {Completed | Failed}`. The
//! registry applies each update as one read-modify-write on the task's map
//! shard, rejecting updates that would move a task backwards, skip a step or
//! leave a terminal state. Callers always receive clones.

use std::fmt;
use std::path::PathBuf;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during report task operations
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Log generation task not found with ID: {0}")]
    NotFound(String),

    #[error("Invalid task status transition from {from} to {to}")]
    InvalidStatusTransition { from: TaskStatus, to: TaskStatus },

    #[error("Task {0} cannot complete without a generated file")]
    MissingArtifact(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// `Pending -> InProgress -> {Completed | Failed}`; terminal records are
    /// frozen and no step may be skipped.
    pub fn can_become(self, next: TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => matches!(next, TaskStatus::Pending | TaskStatus::InProgress),
            TaskStatus::InProgress => next != TaskStatus::Pending,
            TaskStatus::Completed | TaskStatus::Failed => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: String,
    pub status: TaskStatus,
    pub file_path: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl TaskRecord {
    pub fn pending(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            file_path: None,
            error_message: None,
        }
    }

    pub fn with_status(self, status: TaskStatus) -> Self {
        Self { status, ..self }
    }

    pub fn with_file_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..self
        }
    }

    pub fn with_error_message(self, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..self
        }
    }
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    tasks: DashMap<String, TaskRecord>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `Pending` task under a fresh UUID v4 and returns the id.
    pub fn register(&self) -> String {
        let task_id = Uuid::new_v4().to_string();
        self.tasks.insert(task_id.clone(), TaskRecord::pending(&task_id));
        tracing::debug!(task_id = %task_id, "report task registered");
        task_id
    }

    /// Replaces the record for `task_id` with `f(current)`.
    ///
    /// The registry is unchanged when the task is unknown or when the new
    /// status is not reachable from the current one.
    pub fn transition(
        &self,
        task_id: &str,
        f: impl FnOnce(TaskRecord) -> TaskRecord,
    ) -> Result<TaskRecord, JobError> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| JobError::NotFound(task_id.to_string()))?;

        let current = entry.value().clone();
        let from = current.status;
        let mut next = f(current);
        next.task_id = task_id.to_string();

        if !from.can_become(next.status) {
            tracing::warn!(
                task_id = %task_id,
                from = %from,
                to = %next.status,
                "rejected report task transition"
            );
            return Err(JobError::InvalidStatusTransition {
                from,
                to: next.status,
            });
        }
        if next.status == TaskStatus::Completed && next.file_path.is_none() {
            tracing::warn!(task_id = %task_id, "rejected completion without a file path");
            return Err(JobError::MissingArtifact(task_id.to_string()));
        }

        *entry.value_mut() = next.clone();
        tracing::debug!(task_id = %task_id, status = %next.status, "report task updated");
        Ok(next)
    }

    pub fn get(&self, task_id: &str) -> Result<TaskRecord, JobError> {
        self.tasks
            .get(task_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| JobError::NotFound(task_id.to_string()))
    }

    /// The artifact path of a completed task. Unfinished and failed tasks
    /// yield `Ok(None)`.
    pub fn resolve_artifact_path(&self, task_id: &str) -> Result<Option<PathBuf>, JobError> {
        let record = self.get(task_id)?;
        Ok(match record.status {
            TaskStatus::Completed => record.file_path,
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_creates_pending_record() {
        let registry = JobRegistry::new();
        let id = registry.register();
        let record = registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Pending);
        assert!(record.file_path.is_none());
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_task_is_not_found() {
        let registry = JobRegistry::new();
        assert!(matches!(registry.get("nope"), Err(JobError::NotFound(_))));
        assert!(matches!(
            registry.resolve_artifact_path("nope"),
            Err(JobError::NotFound(_))
        ));
        let err = registry
            .transition("nope", |r| r.with_status(TaskStatus::InProgress))
            .unwrap_err();
        assert_eq!(err.to_string(), "Log generation task not found with ID: nope");
        assert!(registry.is_empty());
    }

    #[test]
    fn happy_path_lifecycle() {
        let registry = JobRegistry::new();
        let id = registry.register();

        registry
            .transition(&id, |r| r.with_status(TaskStatus::InProgress))
            .unwrap();
        assert_eq!(registry.resolve_artifact_path(&id).unwrap(), None);

        registry
            .transition(&id, |r| {
                r.with_status(TaskStatus::Completed)
                    .with_file_path("/tmp/out.log")
            })
            .unwrap();
        assert_eq!(
            registry.resolve_artifact_path(&id).unwrap(),
            Some(PathBuf::from("/tmp/out.log"))
        );
    }

    #[test]
    fn terminal_states_are_frozen() {
        let registry = JobRegistry::new();
        let id = registry.register();
        registry
            .transition(&id, |r| r.with_status(TaskStatus::InProgress))
            .unwrap();
        registry
            .transition(&id, |r| {
                r.with_status(TaskStatus::Failed).with_error_message("boom")
            })
            .unwrap();

        let err = registry
            .transition(&id, |r| r.with_status(TaskStatus::InProgress))
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::InvalidStatusTransition {
                from: TaskStatus::Failed,
                to: TaskStatus::InProgress
            }
        ));
        assert!(
            registry
                .transition(&id, |r| r.with_status(TaskStatus::Completed))
                .is_err()
        );

        let record = registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("boom"));
        assert_eq!(registry.resolve_artifact_path(&id).unwrap(), None);
    }

    #[test]
    fn backwards_transition_is_rejected() {
        let registry = JobRegistry::new();
        let id = registry.register();
        registry
            .transition(&id, |r| r.with_status(TaskStatus::InProgress))
            .unwrap();
        assert!(
            registry
                .transition(&id, |r| r.with_status(TaskStatus::Pending))
                .is_err()
        );
        assert_eq!(registry.get(&id).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn transition_cannot_rename_task() {
        let registry = JobRegistry::new();
        let id = registry.register();
        let record = registry
            .transition(&id, |r| TaskRecord {
                task_id: "other".into(),
                ..r.with_status(TaskStatus::InProgress)
            })
            .unwrap();
        assert_eq!(record.task_id, id);
    }

    #[test]
    fn record_serializes_like_status_api() {
        let record = TaskRecord::pending("t-1").with_status(TaskStatus::InProgress);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["taskId"], "t-1");
        assert_eq!(json["status"], "IN_PROGRESS");
        assert!(json["filePath"].is_null());
    }

    #[test]
    fn pending_cannot_skip_in_progress() {
        let registry = JobRegistry::new();
        let id = registry.register();
        for status in [TaskStatus::Completed, TaskStatus::Failed] {
            let err = registry
                .transition(&id, |r| r.with_status(status).with_file_path("/tmp/x.log"))
                .unwrap_err();
            assert!(matches!(
                err,
                JobError::InvalidStatusTransition {
                    from: TaskStatus::Pending,
                    ..
                }
            ));
        }
        assert_eq!(registry.get(&id).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn completion_requires_file_path() {
        let registry = JobRegistry::new();
        let id = registry.register();
        registry
            .transition(&id, |r| r.with_status(TaskStatus::InProgress))
            .unwrap();

        let err = registry
            .transition(&id, |r| r.with_status(TaskStatus::Completed))
            .unwrap_err();
        assert!(matches!(err, JobError::MissingArtifact(ref t) if *t == id));
        assert_eq!(registry.get(&id).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn allowed_moves() {
        use TaskStatus::*;
        assert!(Pending.can_become(InProgress));
        assert!(!Pending.can_become(Completed));
        assert!(!Pending.can_become(Failed));
        assert!(InProgress.can_become(Completed));
        assert!(InProgress.can_become(Failed));
        assert!(!InProgress.can_become(Pending));
        assert!(!Completed.can_become(Failed));
        assert!(!Failed.can_become(InProgress));
    }
}
