use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod options;
pub mod paths;
pub mod service;

/// Job routes, mounted at the root so existing callers can keep posting to
/// `/{job}/{encoded_path}/{options}`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/transcribe", post(handler::transcribe_upload))
        .route("/transcribe/{encoded_path}/{options}", post(handler::transcribe_path))
        .route("/slowmo/{encoded_path}/{options}", post(handler::slowmo))
        .route("/fpsboost/{encoded_path}/{options}", post(handler::fpsboost))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub fn catalog_router() -> Router<AppState> {
    Router::new().route("/jobs", get(handler::list_jobs))
}
