//! Admin session state and route guarding.
//!
//! ARCHITECTURE
//! ============
//! The auth service owns identities and tokens; this module owns what the
//! site does with them. Redirects are a pure function of the current session
//! and the requested path, and sign-in/sign-out notifications map to a fixed
//! destination, so no handler ever decides navigation on its own.

use std::fmt::Write;

use rand::Rng;

use crate::store::Session;

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// GUARD
// =============================================================================

/// What the guard does with a request under `/admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(&'static str),
}

/// Decide whether `path` may render for the given session.
///
/// Visitors without a session only ever see the login page; signed-in
/// admins are sent past it to the dashboard.
#[must_use]
pub fn guard_decision(session: Option<&Session>, path: &str) -> GuardDecision {
    let on_login = path.trim_end_matches('/') == LOGIN_PATH;
    match (session, on_login) {
        (None, false) => GuardDecision::Redirect(LOGIN_PATH),
        (Some(_), true) => GuardDecision::Redirect(DASHBOARD_PATH),
        _ => GuardDecision::Render,
    }
}

// =============================================================================
// SESSION EVENTS
// =============================================================================

/// Session-change notifications from the auth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

/// Where the admin lands after a session change.
#[must_use]
pub fn route_after(event: SessionEvent) -> &'static str {
    match event {
        SessionEvent::SignedIn => DASHBOARD_PATH,
        SessionEvent::SignedOut => LOGIN_PATH,
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
