//! Auth routes: admin login and logout against the hosted auth service.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tera::Context;
use time::Duration;
use tracing::{error, info, warn};

use super::render;
use crate::services::session::{SessionEvent, route_after};
use crate::state::AppState;
use crate::store::StoreError;
use crate::views::Notice;

pub const COOKIE_NAME: &str = "sb_access_token";

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Access token from the session cookie, if present and non-empty.
pub(crate) fn cookie_token(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn login_page_response(state: &AppState, status: StatusCode, email: &str, notice: Option<Notice>) -> Response {
    let mut context = Context::new();
    context.insert("notice", &notice);
    context.insert("email", email);
    render(state, status, "admin/login.html", &context)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /admin/login`: email/password form.
pub async fn login_page(State(state): State<AppState>) -> Response {
    login_page_response(&state, StatusCode::OK, "", None)
}

/// `POST /admin/login`: sign in, set the session cookie, go to the dashboard.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        let notice = Notice::warning("Please enter your email and password");
        return login_page_response(&state, StatusCode::UNPROCESSABLE_ENTITY, email, Some(notice));
    }

    match state.auth.sign_in(email, &form.password).await {
        Ok(session) => {
            info!(user_id = %session.user_id, "admin signed in");
            let jar = jar.add(session_cookie(session.access_token, state.cookie_secure));
            (jar, Redirect::to(route_after(SessionEvent::SignedIn))).into_response()
        }
        Err(StoreError::Unauthorized) => {
            warn!("admin sign-in rejected");
            let notice = Notice::error("Invalid email or password");
            login_page_response(&state, StatusCode::UNAUTHORIZED, email, Some(notice))
        }
        Err(e) => {
            error!(error = %e, "admin sign-in failed");
            let notice = Notice::error("Sign-in is unavailable right now. Please try again.");
            login_page_response(&state, StatusCode::BAD_GATEWAY, email, Some(notice))
        }
    }
}

/// `POST /admin/logout`: revoke the session, clear the cookie, go to login.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = cookie_token(&jar) {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!(error = %e, "admin sign-out failed");
        }
    }
    let jar = jar.add(cleared_cookie(state.cookie_secure));
    (jar, Redirect::to(route_after(SessionEvent::SignedOut))).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
