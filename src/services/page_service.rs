use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::fs;

use crate::errors::BoardError;

/// Serve an HTML document from disk with `status`.
///
/// If the file cannot be read the response is a bare 404.
pub async fn html_document(path: &Path, status: StatusCode) -> Response {
    match fs::read(path).await {
        Ok(body) => {
            tracing::info!("Served {} with status {}", path.display(), status.as_u16());
            (status, [(header::CONTENT_TYPE, "text/html")], body).into_response()
        }
        Err(_) => file_not_found(),
    }
}

/// Serve a static asset, guessing the content type from its extension.
pub async fn static_file(path: &Path) -> Response {
    match fs::read(path).await {
        Ok(body) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            tracing::info!("Served static file: {}", path.display());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                body,
            )
                .into_response()
        }
        Err(_) => file_not_found(),
    }
}

fn file_not_found() -> Response {
    (StatusCode::NOT_FOUND, "File Not Found").into_response()
}

/// Map a request path onto a regular file inside `root`.
///
/// Returns `Ok(None)` when nothing servable exists there, and
/// `Err(OutsideRoot)` when the resolved path leaves `root` (`..` segments,
/// absolute paths, symlinks pointing elsewhere).
pub async fn resolve_static(root: &Path, request_path: &str) -> Result<Option<PathBuf>, BoardError> {
    let relative = request_path.strip_prefix('/').unwrap_or(request_path);
    if relative.is_empty() {
        return Ok(None);
    }

    let root = fs::canonicalize(root).await?;
    let candidate = match fs::canonicalize(root.join(relative)).await {
        Ok(p) => p,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if !candidate.starts_with(&root) {
        return Err(BoardError::OutsideRoot(PathBuf::from(relative)));
    }

    if !fs::metadata(&candidate).await?.is_file() {
        return Ok(None);
    }

    Ok(Some(candidate))
}
