use crate::common::response::ApiError;
use crate::infrastructure::process::RunnerError;
use axum::http::StatusCode;

const UNEXPECTED_MESSAGE: &str = "Unexpected error while processing job";

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Bad request input, raised before any external process runs.
    #[error("{0}")]
    Validation(String),

    #[error("{program} failed ({}): {stderr}", describe_exit(.exit_code))]
    ExternalProcess {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Unexpected(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

impl JobError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        JobError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Validation(_) => "validation",
            JobError::ExternalProcess { .. } => "external_process",
            JobError::Io { .. } => "io",
            JobError::Unexpected(_) => "unexpected",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            JobError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RunnerError> for JobError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Spawn { program, source } => JobError::ExternalProcess {
                program,
                exit_code: None,
                stderr: source.to_string(),
            },
            RunnerError::TimedOut { program, timeout } => JobError::ExternalProcess {
                program,
                exit_code: None,
                stderr: format!("did not finish within {}s", timeout.as_secs()),
            },
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        let message = match &err {
            JobError::Unexpected(_) => UNEXPECTED_MESSAGE.to_string(),
            other => other.to_string(),
        };
        ApiError::new(message, err.status_code()).with_kind(err.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn validation_maps_to_bad_request() {
        let api: ApiError = JobError::Validation("invalid value 'abc' for option 'speed'".into()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.kind, Some("validation"));
        assert!(api.message.contains("speed"));
    }

    #[test]
    fn external_process_keeps_stderr_in_message() {
        let err = JobError::ExternalProcess {
            program: "whisper-cli".into(),
            exit_code: Some(2),
            stderr: "error: failed to open model".into(),
        };
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "whisper-cli failed (exit code 2): error: failed to open model");
    }

    #[test]
    fn unexpected_hides_detail() {
        let api: ApiError = JobError::Unexpected("task panicked".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, UNEXPECTED_MESSAGE);
        assert_eq!(api.kind, Some("unexpected"));
    }

    #[test]
    fn io_is_a_server_error_with_os_detail() {
        let err = JobError::io(
            "writing /data/clip-transcript.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.message.ends_with("permission denied"));
    }

    #[test]
    fn runner_failures_become_external_process_errors() {
        let spawn = RunnerError::Spawn {
            program: "ffprobe".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        match JobError::from(spawn) {
            JobError::ExternalProcess { program, exit_code, stderr } => {
                assert_eq!(program, "ffprobe");
                assert_eq!(exit_code, None);
                assert!(stderr.contains("No such file"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let timeout = RunnerError::TimedOut {
            program: "ffmpeg".into(),
            timeout: Duration::from_secs(30),
        };
        assert!(JobError::from(timeout).to_string().contains("within 30s"));
    }
}
