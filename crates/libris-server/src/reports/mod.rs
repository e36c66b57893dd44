//! Asynchronous log report generation.
//!
//! ## Flow
//!
//! - `POST /logs/reports?date=` → [`ReportService::initiate`] registers a
//!   `Pending` task and spawns the job; the caller gets the task id at once
//! - the job waits for a worker permit, then [`ReportWorker::run`] copies the
//!   daily log into the output directory
//! - `GET /logs/reports/{id}/status` and `/download` read the registry
//!
//! Failed tasks are never retried; clients start a new task instead.

pub mod registry;
pub mod service;
pub mod worker;

pub use registry::{JobError, JobRegistry, TaskRecord, TaskStatus};
pub use service::ReportService;
pub use worker::ReportWorker;

impl From<JobError> for libris_api::ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) => libris_api::ApiError::not_found(err.to_string()),
            JobError::InvalidStatusTransition { .. } | JobError::MissingArtifact(_) => {
                libris_api::ApiError::internal(err.to_string())
            }
        }
    }
}
