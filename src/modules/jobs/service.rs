use std::io::ErrorKind;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dto::{JobReport, TranscriptionResponse};
use super::error::JobError;
use super::model::{JobKind, JobOptions, JobRequest, ResolvedPaths, TranscribeOptions};
use super::options::{parse_option_pairs, parse_options};
use super::paths::{decode_path, resolve_paths};
use crate::config::settings::AppConfig;
use crate::infrastructure::process::{CommandOutput, CommandRunner, Invocation};

/// Turns job requests into external tool pipelines.
///
/// Each pipeline runs its commands one after another and stops at the first
/// non-zero exit. Nothing here serialises access to output paths: two jobs
/// writing the same file race and the last writer wins.
#[derive(Clone)]
pub struct JobDispatcher {
    config: Arc<AppConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl JobDispatcher {
    pub fn new(config: Arc<AppConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Runs a path-embedded job. Options and paths are validated before any
    /// process is started.
    pub async fn dispatch(&self, request: &JobRequest) -> Result<JobReport, JobError> {
        let input_path = decode_path(&request.raw_path);
        let options = parse_options(&request.raw_options, request.kind)?;
        let paths = resolve_paths(request.kind, &input_path)?;

        let job_id = Uuid::new_v4();
        info!(%job_id, job = %request.kind, input = %paths.input_path, "job started");

        if let Err(e) = self.run_pipeline(&options, &paths).await {
            error!(%job_id, job = %request.kind, error = %e, "job failed");
            return Err(e);
        }

        info!(%job_id, job = %request.kind, output = %paths.output_path, "job completed");
        Ok(JobReport {
            job_id,
            job: request.kind,
            input_path: paths.input_path,
            output_path: paths.output_path,
            completed_at: OffsetDateTime::now_utc(),
        })
    }

    /// Transcribes an already stored upload and hands the text back instead
    /// of writing a transcript file.
    pub async fn transcribe_upload(
        &self,
        stored_path: &str,
        fields: &[(String, String)],
    ) -> Result<TranscriptionResponse, JobError> {
        let pairs = fields.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let JobOptions::Transcribe(options) = parse_option_pairs(pairs, JobKind::Transcribe)? else {
            return Err(JobError::Unexpected("transcribe options expected".into()));
        };

        let job_id = Uuid::new_v4();
        info!(%job_id, job = %JobKind::Transcribe, input = stored_path, "upload job started");

        let transcription = self.transcribe(stored_path, &options).await.inspect_err(|e| {
            error!(%job_id, error = %e, "upload job failed");
        })?;

        info!(%job_id, chars = transcription.len(), "upload job completed");
        Ok(TranscriptionResponse { job_id, transcription })
    }

    async fn run_pipeline(&self, options: &JobOptions, paths: &ResolvedPaths) -> Result<(), JobError> {
        match options {
            JobOptions::Transcribe(opts) => {
                let transcript = self.transcribe(&paths.input_path, opts).await?;
                tokio::fs::write(&paths.output_path, transcript)
                    .await
                    .map_err(|e| JobError::io(format!("writing {}", paths.output_path), e))
            }
            JobOptions::SlowMo(opts) => {
                let fps = self.probe_frame_rate(&paths.input_path).await?;
                self.interpolate(paths, opts.stretch_factor(), fps).await
            }
            JobOptions::FpsBoost(opts) => {
                let fps = self.probe_frame_rate(&paths.input_path).await?;
                self.interpolate(paths, opts.factor, fps.saturating_mul(opts.factor)).await
            }
        }
    }

    /// Returns the recogniser's stdout with surrounding whitespace removed.
    pub async fn transcribe(&self, input_path: &str, options: &TranscribeOptions) -> Result<String, JobError> {
        let mut args = vec![
            "-m".to_string(),
            self.config.whisper_model.clone(),
            "-f".to_string(),
            input_path.to_string(),
        ];
        if let Some(language) = &options.language {
            args.extend(["-l".to_string(), language.clone()]);
        }

        let output = self
            .run_checked(Invocation::new(self.config.whisper_bin.as_str(), args))
            .await?;
        Ok(output.stdout.trim().to_string())
    }

    pub async fn probe_frame_rate(&self, input_path: &str) -> Result<u32, JobError> {
        let invocation = Invocation::new(
            self.config.ffprobe_bin.as_str(),
            [
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=r_frame_rate",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                input_path,
            ],
        );
        let output = self.run_checked(invocation).await?;

        parse_frame_rate(&output.stdout).ok_or_else(|| JobError::ExternalProcess {
            program: self.config.ffprobe_bin.clone(),
            exit_code: output.exit_code,
            stderr: format!("unusable frame rate '{}'", output.stdout.trim()),
        })
    }

    /// Interpolate into the intermediate `.mkv`, transcode it to the final
    /// `.mp4`, then drop the intermediate. A failed step leaves whatever the
    /// earlier steps wrote on disk.
    async fn interpolate(&self, paths: &ResolvedPaths, stretch: u32, target_fps: u32) -> Result<(), JobError> {
        let intermediate = paths
            .intermediate_path
            .as_deref()
            .ok_or_else(|| JobError::Unexpected("video job without an intermediate path".into()))?;

        info!(input = %paths.input_path, stretch, target_fps, "🎥 interpolating frames");
        self.run_checked(Invocation::new(
            self.config.interpolate_bin.as_str(),
            [
                "--video".to_string(),
                paths.input_path.clone(),
                "--multi".to_string(),
                stretch.to_string(),
                "--model".to_string(),
                self.config.interpolate_checkpoint.clone(),
                "--fps".to_string(),
                target_fps.to_string(),
                "--batch-size".to_string(),
                self.config.interpolate_batch_size.to_string(),
                "--output".to_string(),
                intermediate.to_string(),
            ],
        ))
        .await?;

        info!(output = %paths.output_path, "🎞️ transcoding to mp4");
        self.run_checked(Invocation::new(
            self.config.ffmpeg_bin.as_str(),
            [
                "-y",
                "-i",
                intermediate,
                "-c:v",
                "libx264",
                "-preset",
                "fast",
                "-c:a",
                "aac",
                paths.output_path.as_str(),
            ],
        ))
        .await?;

        match tokio::fs::remove_file(intermediate).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = intermediate, "intermediate file already gone");
                Ok(())
            }
            Err(e) => Err(JobError::io(format!("removing {intermediate}"), e)),
        }
    }

    async fn run_checked(&self, invocation: Invocation) -> Result<CommandOutput, JobError> {
        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            return Err(JobError::ExternalProcess {
                program: invocation.program,
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Parses ffprobe's `N/D` rate (or a plain number) into whole frames per
/// second. The quotient is truncated, so `30000/1001` gives 29.
pub fn parse_frame_rate(raw: &str) -> Option<u32> {
    let line = raw.trim().lines().next()?.trim();

    let fps = match line.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => line.parse::<f64>().ok()?,
    };

    if !fps.is_finite() || fps < 1.0 {
        return None;
    }
    Some(fps as u32)
}
