//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the public site at `/` and the admin back-office
//! under `/admin`. Every admin route sits behind the session guard; the
//! public routes are open. All pages are rendered on the server.

pub mod admin;
pub mod auth;
pub mod public;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use tera::Context;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::AppState;
use crate::views::Notice;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(public::home))
        .route("/reviews", post(public::submit_review))
        .route("/healthz", get(healthz))
        .route("/storage/v1/object/public/{bucket}/{*path}", get(public::local_object))
        .merge(admin::routes(state.clone()))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn fallback(State(state): State<AppState>) -> Response {
    not_found(&state, "The page you are looking for does not exist.")
}

/// Render `name` with `context`, answering 500 if the template fails.
pub(crate) fn render(state: &AppState, status: StatusCode, name: &str, context: &Context) -> Response {
    match state.views.render(name, context) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!(error = %e, template = name, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

pub(crate) fn not_found(state: &AppState, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("notice", &Option::<Notice>::None);
    context.insert("message", message);
    render(state, StatusCode::NOT_FOUND, "not_found.html", &context)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
