use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    WhisperBin,
    WhisperModel,
    FfprobeBin,
    FfmpegBin,
    InterpolateBin,
    InterpolateCheckpoint,
    InterpolateBatchSize,
    UploadDir,
    MaxUploadMb,
    JobTimeoutSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::WhisperBin => "WHISPER_BIN",
            EnvKey::WhisperModel => "WHISPER_MODEL",
            EnvKey::FfprobeBin => "FFPROBE_BIN",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::InterpolateBin => "INTERPOLATE_BIN",
            EnvKey::InterpolateCheckpoint => "INTERPOLATE_CHECKPOINT",
            EnvKey::InterpolateBatchSize => "INTERPOLATE_BATCH_SIZE",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::MaxUploadMb => "MAX_UPLOAD_MB",
            EnvKey::JobTimeoutSecs => "JOB_TIMEOUT_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Like [`get_parsed`] but with no fallback: unset or unparseable is `None`.
pub fn get_optional<T: FromStr>(key: EnvKey) -> Option<T> {
    get(key).ok().and_then(|val| val.parse::<T>().ok())
}
