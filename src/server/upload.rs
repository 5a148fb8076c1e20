//! Streaming multipart file upload.
//!
//! The body is consumed in chunks and written straight to disk; the byte
//! counter is checked against the cap after every chunk, so an oversized
//! stream is rejected with `413` as soon as it crosses the limit and the
//! partial file is deleted. The stored name is a random UUID plus the
//! lower-cased original extension — nothing else from the client-supplied
//! filename reaches the filesystem.

use std::path::{Path, PathBuf};

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use super::AppState;

/// Upload destination and size cap.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: u64,
}

impl UploadConfig {
    /// Default cap: 100 MiB.
    pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: Self::DEFAULT_MAX_BYTES,
        }
    }

    /// Override the cap (tests use a small one to exercise the boundary).
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Body budget for the framework-level limit: the cap plus headroom for
    /// multipart framing, so the handler's own counter fires first.
    pub(crate) fn body_budget(&self) -> usize {
        usize::try_from(self.max_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(64 * 1024)
    }
}

enum UploadError {
    TooLarge { max_bytes: u64 },
    MissingFile,
    Multipart(MultipartError),
    Io(std::io::Error),
}

pub(crate) async fn handle(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    match save_upload(&state.uploads, &mut multipart).await {
        Ok(name) => {
            info!(%name, "upload stored");
            (StatusCode::OK, Json(json!({"url": format!("/uploads/{name}")}))).into_response()
        }
        Err(UploadError::TooLarge { max_bytes }) => {
            warn!(max_bytes, "upload rejected: over size limit");
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({"detail": format!("file exceeds the {max_bytes}-byte upload limit")})),
            )
                .into_response()
        }
        Err(UploadError::MissingFile) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "multipart body contains no file field"})),
        )
            .into_response(),
        Err(UploadError::Multipart(e)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": format!("malformed multipart body: {e}")})),
        )
            .into_response(),
        Err(UploadError::Io(e)) => {
            warn!(error = %e, "upload failed: io error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "failed to store upload"})),
            )
                .into_response()
        }
    }
}

/// Stream the first file field to disk, enforcing the cap per chunk.
async fn save_upload(
    config: &UploadConfig,
    multipart: &mut Multipart,
) -> Result<String, UploadError> {
    tokio::fs::create_dir_all(&config.dir)
        .await
        .map_err(UploadError::Io)?;

    while let Some(mut field) = multipart.next_field().await.map_err(UploadError::Multipart)? {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let name = generated_name(&original_name);
        let path = config.dir.join(&name);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(UploadError::Io)?;
        let mut written: u64 = 0;

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    remove_partial(&path).await;
                    return Err(UploadError::Multipart(e));
                }
            };

            written += chunk.len() as u64;
            if written > config.max_bytes {
                drop(file);
                remove_partial(&path).await;
                return Err(UploadError::TooLarge {
                    max_bytes: config.max_bytes,
                });
            }

            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                remove_partial(&path).await;
                return Err(UploadError::Io(e));
            }
        }

        file.flush().await.map_err(UploadError::Io)?;
        return Ok(name);
    }

    Err(UploadError::MissingFile)
}

/// Random identifier plus the sanitized, lower-cased original extension.
fn generated_name(original: &str) -> String {
    match sanitized_extension(original) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

/// Extract an extension safe to place on the filesystem: lower-cased,
/// ASCII-alphanumeric, at most 16 chars. Everything else is discarded.
fn sanitized_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 16 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "failed to remove partial upload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lowercased() {
        assert_eq!(sanitized_extension("Photo.JPG"), Some("jpg".to_string()));
    }

    #[test]
    fn extension_absent() {
        assert_eq!(sanitized_extension("README"), None);
    }

    #[test]
    fn extension_traversal_rejected() {
        // A hostile "extension" containing path separators is discarded.
        assert_eq!(sanitized_extension("x.../../etc/passwd"), None);
        assert_eq!(sanitized_extension("x.a/b"), None);
    }

    #[test]
    fn extension_overlong_rejected() {
        assert_eq!(sanitized_extension(&format!("f.{}", "a".repeat(17))), None);
    }

    #[test]
    fn generated_name_is_not_original() {
        let name = generated_name("secret-report.PDF");
        assert!(!name.contains("secret-report"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn generated_name_without_extension() {
        let name = generated_name("blob");
        assert!(!name.contains('.'));
        // UUID format
        assert_eq!(name.len(), 36);
    }
}
