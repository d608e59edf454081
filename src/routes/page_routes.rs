use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Router,
};

use crate::errors::AppError;
use crate::services::page_service;
use crate::state::{AppState, Message};

/// Build the board routes.
///
/// Anything not matched here is either a static asset or the error page.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route(
            "/message",
            get(message_form).post(submit_message).fallback(not_found),
        )
        .fallback(fallback)
        .with_state(state)
}

/// GET /
async fn index(State(state): State<AppState>) -> Response {
    page_service::html_document(&state.config.index_document(), StatusCode::OK).await
}

/// GET /message
async fn message_form(State(state): State<AppState>) -> Response {
    page_service::html_document(&state.config.message_document(), StatusCode::OK).await
}

//
// ─────────────────────────────────────────────────────────────
// POST /message
// Relay the submitted form over the datagram channel, then show the index
// ─────────────────────────────────────────────────────────────
//
async fn submit_message(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let message = Message::from_form(&fields)?;

    state.sender.send(&message).await?;

    Ok(page_service::html_document(&state.config.index_document(), StatusCode::OK).await)
}

async fn not_found(State(state): State<AppState>) -> Response {
    page_service::html_document(&state.config.error_document(), StatusCode::NOT_FOUND).await
}

/// Static assets for GET, error page for everything else.
async fn fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return not_found(State(state)).await;
    }

    match page_service::resolve_static(&state.config.document_root, uri.path()).await {
        Ok(Some(path)) => page_service::static_file(&path).await,
        Ok(None) => not_found(State(state)).await,
        Err(e) => {
            tracing::warn!("Refused static path {}: {}", uri.path(), e);
            not_found(State(state)).await
        }
    }
}
