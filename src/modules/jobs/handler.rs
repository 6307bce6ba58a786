use super::dto::{JobDefinition, JobReport, TranscriptionResponse};
use super::error::JobError;
use super::model::{JobKind, JobRequest};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::common::upload::{stream_to_disk, UploadError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

const AUDIO_FIELD: &str = "audio";

/// Transcribe an audio file already on disk
#[utoipa::path(
    post,
    path = "/transcribe/{encoded_path}/{options}",
    params(
        ("encoded_path" = String, Path, description = "Input path ending in '-audio.wav', with '/' written as '+'"),
        ("options" = String, Path, description = "'-'-separated key=value options, e.g. 'language=en'")
    ),
    responses(
        (status = 200, description = "Transcript written next to the input", body = ApiResponse<JobReport>),
        (status = 400, description = "Invalid path or options"),
        (status = 500, description = "External tool or filesystem failure")
    ),
    tag = "Jobs"
)]
pub async fn transcribe_path(
    State(state): State<AppState>,
    Path((encoded_path, options)): Path<(String, String)>,
) -> impl IntoResponse {
    run_path_job(state, JobRequest::new(JobKind::Transcribe, encoded_path, options)).await
}

/// Create a slow motion copy of a video
#[utoipa::path(
    post,
    path = "/slowmo/{encoded_path}/{options}",
    params(
        ("encoded_path" = String, Path, description = "Input path ending in '.mp4', with '/' written as '+'"),
        ("options" = String, Path, description = "'-'-separated key=value options, e.g. 'speed=0.25'")
    ),
    responses(
        (status = 200, description = "Slow motion video written next to the input", body = ApiResponse<JobReport>),
        (status = 400, description = "Invalid path or options"),
        (status = 500, description = "External tool or filesystem failure")
    ),
    tag = "Jobs"
)]
pub async fn slowmo(
    State(state): State<AppState>,
    Path((encoded_path, options)): Path<(String, String)>,
) -> impl IntoResponse {
    run_path_job(state, JobRequest::new(JobKind::SlowMo, encoded_path, options)).await
}

/// Multiply the frame rate of a video
#[utoipa::path(
    post,
    path = "/fpsboost/{encoded_path}/{options}",
    params(
        ("encoded_path" = String, Path, description = "Input path ending in '.mp4', with '/' written as '+'"),
        ("options" = String, Path, description = "'-'-separated key=value options, e.g. 'factor=4'")
    ),
    responses(
        (status = 200, description = "Boosted video written next to the input", body = ApiResponse<JobReport>),
        (status = 400, description = "Invalid path or options"),
        (status = 500, description = "External tool or filesystem failure")
    ),
    tag = "Jobs"
)]
pub async fn fpsboost(
    State(state): State<AppState>,
    Path((encoded_path, options)): Path<(String, String)>,
) -> impl IntoResponse {
    run_path_job(state, JobRequest::new(JobKind::FpsBoost, encoded_path, options)).await
}

async fn run_path_job(state: AppState, request: JobRequest) -> Response {
    let kind = request.kind;
    match state.dispatcher.dispatch(&request).await {
        Ok(report) => ApiSuccess(
            ApiResponse::success(report, kind.completion_message()),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => {
            warn!(job = %kind, path = %request.raw_path, error = %e, "job rejected");
            ApiError::from(e).into_response()
        }
    }
}

/// Upload an audio file and transcribe it
/// The transcript is returned in the response instead of written to disk.
#[utoipa::path(
    post,
    path = "/transcribe",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcript text", body = ApiResponse<TranscriptionResponse>),
        (status = 400, description = "Missing or invalid audio field, or invalid options"),
        (status = 500, description = "External tool or filesystem failure")
    ),
    tag = "Jobs"
)]
pub async fn transcribe_upload(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    match receive_and_transcribe(&state, multipart).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, JobKind::Transcribe.completion_message()),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => {
            warn!(error = %e, "upload transcription rejected");
            ApiError::from(e).into_response()
        }
    }
}

async fn receive_and_transcribe(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<TranscriptionResponse, JobError> {
    let mut stored: Option<std::path::PathBuf> = None;
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JobError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == AUDIO_FIELD {
            if let Some(previous) = stored.take() {
                discard_upload(&previous).await;
                return Err(JobError::Validation(
                    "Only one audio file may be provided".to_string(),
                ));
            }
            let path = stream_to_disk(&state.config.upload_dir, field)
                .await
                .map_err(upload_failure)?;
            stored = Some(path);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| JobError::Validation(format!("Unreadable field '{name}': {e}")))?;
            fields.push((name, value));
        }
    }

    let stored = stored.ok_or_else(|| JobError::Validation("No audio file provided".to_string()))?;
    state
        .dispatcher
        .transcribe_upload(&stored.to_string_lossy(), &fields)
        .await
}

async fn discard_upload(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "failed to remove rejected upload");
    }
}

fn upload_failure(err: UploadError) -> JobError {
    match err {
        UploadError::Io { path, source } => JobError::io(format!("storing upload {path}"), source),
        other => JobError::Validation(other.to_string()),
    }
}

/// List the available jobs and their options
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    responses(
        (status = 200, description = "Job catalogue", body = ApiResponse<Vec<JobDefinition>>)
    ),
    tag = "Jobs"
)]
pub async fn list_jobs() -> impl IntoResponse {
    ApiSuccess(
        ApiResponse::success(JobDefinition::catalog(), "Jobs retrieved successfully"),
        StatusCode::OK,
    )
}
