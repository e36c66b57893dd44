//! Daily log download and asynchronous report jobs.

use std::path::Path as FsPath;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use libris_api::{ApiError, ApiResponse, TaskAccepted};
use tokio_util::io::ReaderStream;

use super::DateQuery;
use crate::reports::{TaskRecord, TaskStatus};
use crate::reports::worker::absolute;
use crate::server::AppState;

/// `GET /logs?date=`: streams the raw daily log.
pub async fn download_source(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Response, ApiError> {
    let date = query.parse()?;
    let path = state.reports.source_log_path(date);
    let not_found = || {
        ApiError::not_found(format!(
            "Log file was not found with date: {date} at path {}",
            absolute(&path).display()
        ))
    };
    if !matches!(tokio::fs::try_exists(&path).await, Ok(true)) {
        return Err(not_found());
    }
    tracing::info!(date = %date, path = %path.display(), "Serving daily log file");
    stream_file(&path, &state.reports.source_file_name(date))
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => not_found(),
            _ => ApiError::internal(format!("Failed to read log file: {e}")),
        })
}

/// `POST /logs/reports?date=`: accepts a report job and answers 202.
pub async fn create_report(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<ApiResponse<TaskAccepted>, ApiError> {
    let date = query.parse()?;
    let task_id = state.reports.initiate(date).await;
    let location = HeaderValue::from_str(&format!("/logs/reports/{task_id}/status"))
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(ApiResponse::accepted(TaskAccepted { task_id }).with_header(header::LOCATION, location))
}

pub async fn report_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<ApiResponse<TaskRecord>, ApiError> {
    Ok(ApiResponse::ok(state.reports.status(&task_id)?))
}

/// `GET /logs/reports/{task_id}/download`.
///
/// 200 with the file once `COMPLETED`, 202 while pending or running,
/// 500 for a failed task and 404 when the task or its file is unknown.
pub async fn download_report(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state.reports.status(&task_id)?;
    match record.status {
        TaskStatus::Completed => {
            let missing = || {
                ApiError::not_found(format!(
                    "Generated log file not found for task ID: {task_id}"
                ))
            };
            let path = record.file_path.ok_or_else(missing)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(missing)?;
            stream_file(&path, &file_name).await.map_err(|e| {
                tracing::warn!(task_id = %task_id, error = %e, "Generated report unreadable");
                missing()
            })
        }
        TaskStatus::Pending | TaskStatus::InProgress => Ok((
            StatusCode::ACCEPTED,
            format!(
                "Log report generation is {} for task ID: {task_id}",
                record.status.to_string().replace('_', " ")
            ),
        )
            .into_response()),
        TaskStatus::Failed => Err(ApiError::internal(format!(
            "Log report generation failed for task ID: {task_id}. Error: {}",
            record.error_message.unwrap_or_default()
        ))),
    }
}

async fn stream_file(path: &FsPath, file_name: &str) -> std::io::Result<Response> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let body = Body::from_stream(ReaderStream::new(file));

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
        ],
        body,
    )
        .into_response())
}
