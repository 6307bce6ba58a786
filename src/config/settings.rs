use std::path::PathBuf;
use std::time::Duration;
use crate::config::env::{self, EnvKey};

const MIB: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub whisper_bin: String,
    pub whisper_model: String,
    pub ffprobe_bin: String,
    pub ffmpeg_bin: String,
    pub interpolate_bin: String,
    pub interpolate_checkpoint: String,
    pub interpolate_batch_size: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub job_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 5001),
            whisper_bin: env::get_or(EnvKey::WhisperBin, "/app/whisper.cpp/build/bin/whisper-cli"),
            whisper_model: env::get_or(EnvKey::WhisperModel, "/app/models/ggml-base.en.bin"),
            ffprobe_bin: env::get_or(EnvKey::FfprobeBin, "ffprobe"),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            interpolate_bin: env::get_or(EnvKey::InterpolateBin, "/app/rife/interpolate"),
            interpolate_checkpoint: env::get_or(EnvKey::InterpolateCheckpoint, "/app/rife/train_log"),
            interpolate_batch_size: env::get_parsed(EnvKey::InterpolateBatchSize, 1),
            upload_dir: PathBuf::from(env::get_or(EnvKey::UploadDir, "/app/uploads")),
            max_upload_bytes: upload_limit_bytes(env::get_parsed(EnvKey::MaxUploadMb, 512)),
            job_timeout_secs: env::get_optional(EnvKey::JobTimeoutSecs),
        }
    }

    /// `None` means external tools may run for as long as they like.
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn upload_limit_bytes(mb: usize) -> usize {
    mb.saturating_mul(MIB)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
