use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::{JobKind, DEFAULT_FPSBOOST_FACTOR, DEFAULT_SLOWMO_SPEED};

#[derive(Debug, Serialize, ToSchema)]
pub struct JobReport {
    pub job_id: Uuid,
    pub job: JobKind,
    pub input_path: String,
    pub output_path: String,
    #[serde(with = "time::serde::iso8601")]
    pub completed_at: OffsetDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptionResponse {
    pub job_id: Uuid,
    pub transcription: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: String,
    #[schema(value_type = Object)]
    pub default: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobDefinition {
    pub name: JobKind,
    pub description: String,
    pub route: String,
    pub options: Vec<OptionDefinition>,
}

impl JobDefinition {
    pub fn catalog() -> Vec<JobDefinition> {
        JobKind::ALL.into_iter().map(JobDefinition::for_kind).collect()
    }

    fn for_kind(kind: JobKind) -> Self {
        match kind {
            JobKind::Transcribe => Self {
                name: kind,
                description: "Transcribe speech in a WAV file to text".into(),
                route: "/transcribe/{encoded_path}/{options}".into(),
                options: vec![OptionDefinition {
                    name: "language".into(),
                    description: "Spoken language code passed to the recogniser (model default when omitted)".into(),
                    value_type: "string".into(),
                    default: Value::Null,
                }],
            },
            JobKind::SlowMo => Self {
                name: kind,
                description: "Create a slow motion version of a video".into(),
                route: "/slowmo/{encoded_path}/{options}".into(),
                options: vec![OptionDefinition {
                    name: "speed".into(),
                    description: "Speed factor (0.1 to 0.5, where 0.5 is half speed)".into(),
                    value_type: "number".into(),
                    default: json!(DEFAULT_SLOWMO_SPEED),
                }],
            },
            JobKind::FpsBoost => Self {
                name: kind,
                description: "Increase the frame rate of a video".into(),
                route: "/fpsboost/{encoded_path}/{options}".into(),
                options: vec![OptionDefinition {
                    name: "factor".into(),
                    description: "Frame rate increase factor (2 for double the fps)".into(),
                    value_type: "number".into(),
                    default: json!(DEFAULT_FPSBOOST_FACTOR),
                }],
            },
        }
    }
}
