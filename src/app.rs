use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes::page_routes;
use crate::state::AppState;

/// Build the complete Axum application:
/// - `/`         (index page)
/// - `/message`  (form page, form submission)
/// - everything else: static assets under the document root, or 404
pub fn build_app(state: AppState) -> Router {
    page_routes::routes(state)
        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
