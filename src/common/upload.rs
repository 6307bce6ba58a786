use axum::extract::multipart::{Field, MultipartError};
use axum::body::Bytes;
use futures_util::{Stream, StreamExt};
use mime::Mime;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "wav";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid content type '{0}': only audio/* allowed")]
    InvalidContentType(String),
    #[error("Upload stream interrupted: {0}")]
    Stream(#[from] MultipartError),
    #[error("Failed to store upload at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Keeps only the final component of a client-supplied filename. Falls back
/// to a random name with an extension guessed from the content type.
pub fn upload_file_name(client_name: Option<&str>, content_type: Option<&Mime>) -> String {
    if let Some(name) = client_name
        .and_then(|n| Path::new(n).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
    {
        return name.to_string();
    }

    let extension = content_type
        .and_then(|mime| mime_guess::get_mime_extensions(mime))
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or(FALLBACK_EXTENSION);
    format!("{}.{}", Uuid::new_v4(), extension)
}

fn check_content_type(raw: Option<&str>) -> Result<Option<Mime>, UploadError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mime: Mime = raw
        .parse()
        .map_err(|_| UploadError::InvalidContentType(raw.to_string()))?;

    if mime.type_() == mime::AUDIO || mime.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str() {
        Ok(Some(mime))
    } else {
        Err(UploadError::InvalidContentType(raw.to_string()))
    }
}

/// Streams a multipart file field into `dir`, returning the stored path.
/// An existing file with the same name is overwritten.
pub async fn stream_to_disk(dir: &Path, field: Field<'_>) -> Result<PathBuf, UploadError> {
    let mime = check_content_type(field.content_type())?;
    let path = dir.join(upload_file_name(field.file_name(), mime.as_ref()));

    tokio::fs::create_dir_all(dir).await.map_err(|source| UploadError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let written = write_chunks(&path, field.map(|chunk| chunk.map_err(UploadError::from))).await?;
    info!(path = %path.display(), bytes = written, "stored upload");
    Ok(path)
}

/// Writes every chunk to `path`. On any failure the partial file is removed.
async fn write_chunks<S>(path: &Path, mut chunks: S) -> Result<usize, UploadError>
where
    S: Stream<Item = Result<Bytes, UploadError>> + Unpin,
{
    let result = copy_into(path, &mut chunks).await;
    if let Err(e) = &result {
        error!(path = %path.display(), error = %e, "upload failed, discarding partial file");
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn copy_into<S>(path: &Path, chunks: &mut S) -> Result<usize, UploadError>
where
    S: Stream<Item = Result<Bytes, UploadError>> + Unpin,
{
    let io_err = |source: std::io::Error| UploadError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::create(path).await.map_err(io_err)?;
    let mut written = 0usize;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len();
    }
    file.flush().await.map_err(io_err)?;
    Ok(written)
}
