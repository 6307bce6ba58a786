#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use media_jobs::app::create_app;
use media_jobs::config::settings::AppConfig;
use media_jobs::infrastructure::process::{CommandOutput, CommandRunner, Invocation, RunnerError};
use media_jobs::modules::jobs::service::JobDispatcher;
use media_jobs::state::AppState;

pub const WHISPER: &str = "whisper-cli";
pub const FFPROBE: &str = "ffprobe";
pub const FFMPEG: &str = "ffmpeg";
pub const INTERPOLATE: &str = "rife";
pub const MODEL: &str = "/models/ggml-base.en.bin";
pub const CHECKPOINT: &str = "/models/rife";

pub fn test_config(upload_dir: &Path) -> AppConfig {
    AppConfig {
        server_port: 0,
        whisper_bin: WHISPER.to_string(),
        whisper_model: MODEL.to_string(),
        ffprobe_bin: FFPROBE.to_string(),
        ffmpeg_bin: FFMPEG.to_string(),
        interpolate_bin: INTERPOLATE.to_string(),
        interpolate_checkpoint: CHECKPOINT.to_string(),
        interpolate_batch_size: 1,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 4 * 1024 * 1024,
        job_timeout_secs: None,
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Records every invocation and answers from per-program scripts.
///
/// Successful interpolation and transcode calls create their output file,
/// the way the real tools would, so cleanup of intermediates can be checked.
#[derive(Default)]
pub struct FakeRunner {
    scripts: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `program`. The last queued response repeats.
    pub fn respond(&self, program: &str, output: CommandOutput) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }

    fn next_output(&self, program: &str) -> CommandOutput {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(program) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| ok("")),
            None => ok(""),
        }
    }
}

fn produced_file(invocation: &Invocation) -> Option<&str> {
    match invocation.program.as_str() {
        INTERPOLATE => invocation
            .args
            .iter()
            .position(|a| a == "--output")
            .and_then(|i| invocation.args.get(i + 1))
            .map(String::as_str),
        FFMPEG => invocation.args.last().map(String::as_str),
        _ => None,
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.calls.lock().unwrap().push(invocation.clone());
        // Give concurrent jobs a chance to interleave.
        tokio::task::yield_now().await;

        let output = self.next_output(&invocation.program);
        if output.success() {
            if let Some(path) = produced_file(invocation) {
                std::fs::write(path, format!("{} output", invocation.program)).unwrap();
            }
        }
        Ok(output)
    }
}

pub fn dispatcher(runner: Arc<FakeRunner>, upload_dir: &Path) -> JobDispatcher {
    JobDispatcher::new(Arc::new(test_config(upload_dir)), runner)
}

pub fn build_test_app(runner: Arc<FakeRunner>, upload_dir: &Path) -> Router {
    create_app(AppState::new(test_config(upload_dir), runner))
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
