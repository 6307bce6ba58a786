use utoipa::OpenApi;
use crate::modules::jobs::dto::*;
use crate::modules::jobs::model::JobKind;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::transcribe_path,
        crate::modules::jobs::handler::slowmo,
        crate::modules::jobs::handler::fpsboost,
        crate::modules::jobs::handler::transcribe_upload,
        crate::modules::jobs::handler::list_jobs,
    ),
    components(
        schemas(
            JobKind, JobReport, TranscriptionResponse, JobDefinition, OptionDefinition,
        )
    ),
    tags(
        (name = "Jobs", description = "Transcription and frame interpolation jobs")
    )
)]
pub struct ApiDoc;
