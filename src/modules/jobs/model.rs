use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_SLOWMO_SPEED: f64 = 0.5;
pub const DEFAULT_FPSBOOST_FACTOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Transcribe,
    SlowMo,
    FpsBoost,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Transcribe, JobKind::SlowMo, JobKind::FpsBoost];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Transcribe => "transcribe",
            JobKind::SlowMo => "slowmo",
            JobKind::FpsBoost => "fpsboost",
        }
    }

    pub fn completion_message(self) -> &'static str {
        match self {
            JobKind::Transcribe => "Transcription completed",
            JobKind::SlowMo => "Slow motion completed",
            JobKind::FpsBoost => "Frame rate boost completed",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single inbound job call, exactly as it arrived on the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub kind: JobKind,
    /// Sentinel-encoded input path (`/` written as `+`).
    pub raw_path: String,
    pub raw_options: String,
}

impl JobRequest {
    pub fn new(kind: JobKind, raw_path: impl Into<String>, raw_options: impl Into<String>) -> Self {
        Self {
            kind,
            raw_path: raw_path.into(),
            raw_options: raw_options.into(),
        }
    }
}

/// Filesystem locations a job touches. `output_path` always sits in the
/// same directory as `input_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub input_path: String,
    pub output_path: String,
    /// Interpolated `.mkv` written before the final transcode; video jobs only.
    pub intermediate_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TranscribeOptions {
    #[validate(length(min = 2, max = 8, message = "language must be 2 to 8 characters"))]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SlowMoOptions {
    #[validate(range(min = 0.1, max = 0.5, message = "speed must be between 0.1 and 0.5"))]
    pub speed: f64,
}

impl Default for SlowMoOptions {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SLOWMO_SPEED,
        }
    }
}

impl SlowMoOptions {
    /// Frames synthesised per original frame: `1 / speed`, truncated.
    pub fn stretch_factor(&self) -> u32 {
        (1.0 / self.speed) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct FpsBoostOptions {
    #[validate(range(min = 2, max = 16, message = "factor must be between 2 and 16"))]
    pub factor: u32,
}

impl Default for FpsBoostOptions {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FPSBOOST_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOptions {
    Transcribe(TranscribeOptions),
    SlowMo(SlowMoOptions),
    FpsBoost(FpsBoostOptions),
}
