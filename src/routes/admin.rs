//! Admin routes: session guard, dashboard and the generic CRUD screens.
//!
//! ARCHITECTURE
//! ============
//! Every route here is wrapped by `guard`, which resolves the session cookie
//! once per request and either redirects or stores the `Session` in the
//! request extensions. Handlers read it back with the `AdminSession`
//! extractor. The CRUD screens are one set of handlers parameterised by the
//! `{resource}` path segment.

use std::collections::BTreeMap;

use axum::Router;
use axum::extract::{FromRequestParts, Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tera::Context;
use tracing::{error, warn};

use super::auth::{self, cookie_token};
use super::{not_found, render};
use crate::pagination::Pagination;
use crate::resources::{self, FieldKind, ResourceSchema};
use crate::services::crud::{self, CrudError, FormInput};
use crate::services::dashboard;
use crate::services::session::{DASHBOARD_PATH, GuardDecision, LOGIN_PATH, guard_decision};
use crate::services::upload::{ImageFile, UploadError, guess_content_type};
use crate::state::AppState;
use crate::store::types::{column_text, record_id};
use crate::store::{Record, Session};
use crate::views::{Notice, star_string};

/// Every `/admin` route, guarded.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/login", get(auth::login_page).post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/{resource}", get(list))
        .route("/admin/{resource}/create", get(create_form).post(create_submit))
        .route("/admin/{resource}/{id}/edit", get(edit_form).post(edit_submit))
        .route("/admin/{resource}/{id}/delete", post(delete))
        .route_layer(middleware::from_fn_with_state(state, guard))
}

// =============================================================================
// GUARD
// =============================================================================

/// Resolve the session for this request and apply the redirect rules.
/// Any failure to resolve a session reads as "no session".
pub async fn guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let session = match cookie_token(&jar) {
        Some(token) => match state.auth.get_session(&token).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "session lookup failed");
                None
            }
        },
        None => None,
    };

    match guard_decision(session.as_ref(), request.uri().path()) {
        GuardDecision::Redirect(to) => Redirect::to(to).into_response(),
        GuardDecision::Render => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
    }
}

/// The signed-in admin, as resolved by `guard`.
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

#[derive(Serialize)]
struct NavItem {
    slug: &'static str,
    label: &'static str,
}

fn admin_context(session: &Session, active: &str) -> Context {
    let nav: Vec<NavItem> = resources::RESOURCES
        .iter()
        .map(|r| NavItem { slug: r.slug, label: r.label })
        .collect();

    let mut context = Context::new();
    context.insert("admin_email", session.email.as_deref().unwrap_or(&session.user_id));
    context.insert("active", active);
    context.insert("nav", &nav);
    context.insert("notice", &Option::<Notice>::None);
    context
}

fn resource_view(schema: &ResourceSchema) -> Value {
    json!({
        "slug": schema.slug,
        "title": schema.title,
        "singular": schema.singular,
        "can_create": schema.can_create,
        "can_edit": schema.can_edit,
        "has_image": schema.image.is_some(),
    })
}

fn image_src(state: &AppState, schema: &ResourceSchema, record: &Record) -> Option<String> {
    let path = column_text(record, schema.image?.column);
    (!path.is_empty()).then(|| state.objects.public_url(&path))
}

/// Status and notice for a failed submit.
fn failure(e: &CrudError) -> (StatusCode, Notice) {
    match e {
        CrudError::Validation(_) | CrudError::Upload(UploadError::TooLarge { .. } | UploadError::UnsupportedType(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Notice::warning(e.to_string()))
        }
        CrudError::NotFound { .. } | CrudError::UnknownResource(_) => (StatusCode::NOT_FOUND, Notice::error(e.to_string())),
        CrudError::Upload(UploadError::Store(_)) | CrudError::Write { .. } | CrudError::Fetch { .. } => {
            (StatusCode::BAD_GATEWAY, Notice::error(e.to_string()))
        }
    }
}

fn parse_page(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|p| p.trim().parse().ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// `GET /admin`: send admins to the dashboard.
pub async fn index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

/// `GET /admin/dashboard`: service and review totals with the average rating.
pub async fn dashboard(State(state): State<AppState>, AdminSession(session): AdminSession) -> Response {
    let stats = dashboard::load_stats(state.records.as_ref()).await;
    let mut context = admin_context(&session, "dashboard");
    context.insert("stats", &stats);
    context.insert("average", &stats.average_label());
    render(&state, StatusCode::OK, "admin/dashboard.html", &context)
}

// =============================================================================
// LIST
// =============================================================================

/// `GET /admin/{resource}?page=N`
pub async fn list(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(schema) = resources::find(&slug) else {
        return not_found(&state, &CrudError::UnknownResource(slug).to_string());
    };
    let page = parse_page(query.page.as_deref());
    render_list(&state, &session, schema, page, StatusCode::OK, None).await
}

async fn render_list(
    state: &AppState,
    session: &Session,
    schema: &ResourceSchema,
    page: Option<u64>,
    status: StatusCode,
    notice: Option<Notice>,
) -> Response {
    let mut context = admin_context(session, schema.slug);
    let mut status = status;
    let mut notice = notice;

    let (rows, links, total) = match crud::list_page(state.records.as_ref(), schema, page).await {
        Ok(list) => (list.rows, list.links, list.total),
        Err(e) => {
            error!(error = %e, resource = schema.slug, "list fetch failed");
            status = StatusCode::BAD_GATEWAY;
            notice = Some(Notice::error(e.to_string()));
            (Vec::new(), Pagination::new(page, schema.page_size).links(0), 0)
        }
    };

    let rows: Vec<Value> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = schema
                .fields
                .iter()
                .map(|field| match field.kind {
                    FieldKind::Rating => star_string(row.get(field.column).and_then(Value::as_i64).unwrap_or(0)),
                    FieldKind::Text | FieldKind::TextArea => column_text(row, field.column),
                })
                .collect();
            json!({
                "id": record_id(row).unwrap_or_default(),
                "cells": cells,
                "image_src": image_src(state, schema, row),
            })
        })
        .collect();

    context.insert("notice", &notice);
    context.insert("resource", &resource_view(schema));
    context.insert("columns", &schema.fields);
    context.insert("colspan", &(schema.fields.len() + 1 + usize::from(schema.image.is_some())));
    context.insert("rows", &rows);
    context.insert("links", &links);
    context.insert("total", &total);
    render(state, status, "admin/list.html", &context)
}

// =============================================================================
// FORMS
// =============================================================================

enum FormMode<'a> {
    Create,
    Edit(&'a str),
}

struct FormView<'a> {
    values: &'a BTreeMap<String, String>,
    image_src: Option<String>,
    notice: Option<Notice>,
}

fn render_form(
    state: &AppState,
    session: &Session,
    schema: &ResourceSchema,
    mode: &FormMode<'_>,
    status: StatusCode,
    view: FormView<'_>,
) -> Response {
    let (heading, action, submit_label) = match mode {
        FormMode::Create => (format!("Add {}", schema.singular), format!("/admin/{}/create", schema.slug), "Create"),
        FormMode::Edit(id) => (format!("Edit {}", schema.singular), format!("/admin/{}/{id}/edit", schema.slug), "Update"),
    };
    let fields: Vec<Value> = schema
        .fields
        .iter()
        .map(|field| {
            json!({
                "column": field.column,
                "label": field.label,
                "kind": field.kind,
                "value": view.values.get(field.column).cloned().unwrap_or_default(),
            })
        })
        .collect();

    let mut context = admin_context(session, schema.slug);
    context.insert("notice", &view.notice);
    context.insert("resource", &resource_view(schema));
    context.insert("heading", &heading);
    context.insert("action", &action);
    context.insert("submit_label", submit_label);
    context.insert("fields", &fields);
    context.insert("image_src", &view.image_src);
    render(state, status, "admin/form.html", &context)
}

fn record_values(schema: &ResourceSchema, record: &Record) -> BTreeMap<String, String> {
    schema
        .fields
        .iter()
        .map(|field| (field.column.to_owned(), column_text(record, field.column)))
        .collect()
}

/// Read a multipart admin form. An empty file input means "no new image".
async fn read_form(schema: &ResourceSchema, mut multipart: Multipart) -> Result<FormInput, CrudError> {
    let invalid = |e: axum::extract::multipart::MultipartError| CrudError::Validation(format!("Invalid form data: {e}"));
    let mut input = FormInput::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let declared = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await.map_err(invalid)?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            let content_type = declared
                .filter(|ct| ct != "application/octet-stream")
                .or_else(|| guess_content_type(&file_name).map(str::to_owned))
                .unwrap_or_else(|| "application/octet-stream".to_owned());
            input.image = Some(ImageFile { file_name, content_type, bytes: bytes.to_vec() });
        } else if schema.fields.iter().any(|f| f.column == name) {
            let text = field.text().await.map_err(invalid)?;
            input.fields.insert(name, text);
        }
    }
    Ok(input)
}

/// `GET /admin/{resource}/create`
pub async fn create_form(State(state): State<AppState>, AdminSession(session): AdminSession, Path(slug): Path<String>) -> Response {
    let Some(schema) = resources::find(&slug).filter(|s| s.can_create) else {
        return not_found(&state, &CrudError::UnknownResource(slug).to_string());
    };
    let view = FormView { values: &BTreeMap::new(), image_src: None, notice: None };
    render_form(&state, &session, schema, &FormMode::Create, StatusCode::OK, view)
}

/// `POST /admin/{resource}/create`: validate, upload, insert.
pub async fn create_submit(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Response {
    let Some(schema) = resources::find(&slug).filter(|s| s.can_create) else {
        return not_found(&state, &CrudError::UnknownResource(slug).to_string());
    };

    let input = match read_form(schema, multipart).await {
        Ok(input) => input,
        Err(e) => {
            let (status, notice) = failure(&e);
            let view = FormView { values: &BTreeMap::new(), image_src: None, notice: Some(notice) };
            return render_form(&state, &session, schema, &FormMode::Create, status, view);
        }
    };
    let submitted = input.fields.clone();

    match crud::create(state.records.as_ref(), state.objects.as_ref(), schema, input).await {
        Ok(_) => {
            let notice = Notice::success(format!("{} created successfully", schema.singular));
            let view = FormView { values: &BTreeMap::new(), image_src: None, notice: Some(notice) };
            render_form(&state, &session, schema, &FormMode::Create, StatusCode::OK, view)
        }
        Err(e) => {
            let (status, notice) = failure(&e);
            let view = FormView { values: &submitted, image_src: None, notice: Some(notice) };
            render_form(&state, &session, schema, &FormMode::Create, status, view)
        }
    }
}

/// `GET /admin/{resource}/{id}/edit`
pub async fn edit_form(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path((slug, id)): Path<(String, String)>,
) -> Response {
    let Some(schema) = resources::find(&slug).filter(|s| s.can_edit) else {
        return not_found(&state, &CrudError::UnknownResource(slug).to_string());
    };

    match crud::fetch_one(state.records.as_ref(), schema, &id).await {
        Ok(record) => {
            let values = record_values(schema, &record);
            let view = FormView { values: &values, image_src: image_src(&state, schema, &record), notice: None };
            render_form(&state, &session, schema, &FormMode::Edit(&id), StatusCode::OK, view)
        }
        Err(e @ CrudError::NotFound { .. }) => not_found(&state, &e.to_string()),
        Err(e) => {
            let (status, notice) = failure(&e);
            let view = FormView { values: &BTreeMap::new(), image_src: None, notice: Some(notice) };
            render_form(&state, &session, schema, &FormMode::Edit(&id), status, view)
        }
    }
}

/// `POST /admin/{resource}/{id}/edit`: validate, optionally upload, update.
pub async fn edit_submit(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path((slug, id)): Path<(String, String)>,
    multipart: Multipart,
) -> Response {
    let Some(schema) = resources::find(&slug).filter(|s| s.can_edit) else {
        return not_found(&state, &CrudError::UnknownResource(slug).to_string());
    };
    let mode = FormMode::Edit(&id);

    // The hosted store accepts an update that matches no row.
    match crud::fetch_one(state.records.as_ref(), schema, &id).await {
        Ok(_) => {}
        Err(e @ CrudError::NotFound { .. }) => return not_found(&state, &e.to_string()),
        Err(e) => {
            let (status, notice) = failure(&e);
            let view = FormView { values: &BTreeMap::new(), image_src: None, notice: Some(notice) };
            return render_form(&state, &session, schema, &mode, status, view);
        }
    }

    let outcome = match read_form(schema, multipart).await {
        Ok(input) => {
            let submitted = input.fields.clone();
            crud::update(state.records.as_ref(), state.objects.as_ref(), schema, &id, input)
                .await
                .map_err(|e| (e, submitted))
        }
        Err(e) => Err((e, BTreeMap::new())),
    };

    // Re-read the row so the form shows what is stored, image included.
    let current = crud::fetch_one(state.records.as_ref(), schema, &id).await.ok();
    let current_image = current.as_ref().and_then(|r| image_src(&state, schema, r));

    match outcome {
        Ok(()) => {
            let values = current.as_ref().map(|r| record_values(schema, r)).unwrap_or_default();
            let notice = Notice::success(format!("{} updated successfully", schema.singular));
            let view = FormView { values: &values, image_src: current_image, notice: Some(notice) };
            render_form(&state, &session, schema, &mode, StatusCode::OK, view)
        }
        Err((e, submitted)) => {
            let (status, notice) = failure(&e);
            let view = FormView { values: &submitted, image_src: current_image, notice: Some(notice) };
            render_form(&state, &session, schema, &mode, status, view)
        }
    }
}

// =============================================================================
// DELETE
// =============================================================================

/// `POST /admin/{resource}/{id}/delete?page=N`: delete, then back to the list.
pub async fn delete(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path((slug, id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(schema) = resources::find(&slug) else {
        return not_found(&state, &CrudError::UnknownResource(slug).to_string());
    };
    let page = parse_page(query.page.as_deref());

    match crud::delete(state.records.as_ref(), schema, &id).await {
        Ok(()) => Redirect::to(&format!("/admin/{}?page={}", schema.slug, page.unwrap_or(1))).into_response(),
        Err(e) => {
            let (status, notice) = failure(&e);
            render_list(&state, &session, schema, page, status, Some(notice)).await
        }
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
