//! Public routes: the marketing home page and review submission.

use axum::Form;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tera::Context;

use super::{not_found, render};
use crate::services::reviews::{self, ReviewSubmission};
use crate::services::site::{self, HomeData};
use crate::state::AppState;
use crate::views::Notice;

/// Review form fields as posted. Rating arrives as text and reads as 0
/// when missing or unparseable.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

impl ReviewForm {
    fn into_submission(self) -> ReviewSubmission {
        ReviewSubmission {
            rating: self.rating.trim().parse().unwrap_or(0),
            name: self.name,
            comment: self.comment,
        }
    }
}

/// `GET /`: render every section of the home page.
pub async fn home(State(state): State<AppState>) -> Response {
    render_home(&state, StatusCode::OK, None, &ReviewSubmission::default()).await
}

/// `POST /reviews`: validate and store a visitor's review.
pub async fn submit_review(State(state): State<AppState>, Form(form): Form<ReviewForm>) -> Response {
    let submission = form.into_submission();
    match reviews::submit_review(state.records.as_ref(), &submission).await {
        Ok(_) => {
            let notice = Notice::success("Your review has been submitted successfully!");
            render_home(&state, StatusCode::OK, Some(notice), &ReviewSubmission::default()).await
        }
        Err(e) if e.is_input_error() => {
            render_home(&state, StatusCode::UNPROCESSABLE_ENTITY, Some(Notice::warning(e.to_string())), &submission).await
        }
        Err(e) => render_home(&state, StatusCode::BAD_GATEWAY, Some(Notice::error(e.to_string())), &submission).await,
    }
}

/// `GET /storage/v1/object/public/{bucket}/{*path}`: serve uploads held by
/// the in-memory store. The hosted backend serves its own bucket.
pub async fn local_object(State(state): State<AppState>, Path((bucket, path)): Path<(String, String)>) -> Response {
    let Some(store) = state.local_objects.as_ref().filter(|s| s.bucket() == bucket) else {
        return not_found(&state, "No such image.");
    };
    match store.object(&path).await {
        Some(object) => ([(header::CONTENT_TYPE, object.content_type)], object.bytes).into_response(),
        None => not_found(&state, "No such image."),
    }
}

async fn render_home(state: &AppState, status: StatusCode, notice: Option<Notice>, form: &ReviewSubmission) -> Response {
    let data = site::load_home(state.records.as_ref()).await;
    let context = home_context(state, &data, notice, form);
    render(state, status, "home.html", &context)
}

fn image_src(state: &AppState, path: &str) -> String {
    if path.is_empty() { String::new() } else { state.objects.public_url(path) }
}

/// `tel:` URI with display spacing and punctuation dropped.
fn tel_href(phone: &str) -> String {
    let number: String = phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    format!("tel:{number}")
}

fn home_context(state: &AppState, data: &HomeData, notice: Option<Notice>, form: &ReviewSubmission) -> Context {
    let banner = data.banner.as_ref().map(|b| {
        json!({
            "title": b.title,
            "subtitle": b.subtitle,
            "image_src": image_src(state, &b.image_url),
        })
    });
    let prices: Vec<Value> = data
        .prices
        .iter()
        .map(|p| {
            json!({
                "service": p.service,
                "price": p.price,
                "description": p.description,
                "image_src": image_src(state, &p.imageurl),
            })
        })
        .collect();
    let gallery: Vec<Value> = data
        .gallery
        .iter()
        .map(|g| json!({ "title": g.title, "image_src": image_src(state, &g.image) }))
        .collect();

    let mut context = Context::new();
    context.insert("notice", &notice);
    context.insert("banner", &banner);
    context.insert("prices", &prices);
    context.insert("gallery", &gallery);
    context.insert("reviews", &data.reviews);
    context.insert(
        "contact",
        &json!({
            "phone_href": state.contact.phone.as_deref().map(tel_href),
            "email_href": state.contact.email.as_deref().map(|email| format!("mailto:{email}")),
        }),
    );
    context.insert(
        "form",
        &json!({ "name": form.name, "rating": form.rating, "comment": form.comment }),
    );
    context
}

#[cfg(test)]
#[path = "public_test.rs"]
mod tests;
