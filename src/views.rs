//! Views: server-rendered HTML templates.
//!
//! Templates are compiled into the binary and registered once at startup.
//! `.html` templates are autoescaped.

use std::collections::HashMap;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::services::reviews::{initials, rating_label};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
    ("admin/base.html", include_str!("../templates/admin/base.html")),
    ("admin/login.html", include_str!("../templates/admin/login.html")),
    ("admin/dashboard.html", include_str!("../templates/admin/dashboard.html")),
    ("admin/list.html", include_str!("../templates/admin/list.html")),
    ("admin/form.html", include_str!("../templates/admin/form.html")),
];

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

pub struct Views {
    tera: Tera,
}

impl Views {
    /// Compile every embedded template and register the display filters.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Template`] if a template fails to parse.
    pub fn new() -> Result<Self, ViewError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tera.register_filter("stars", stars_filter);
        tera.register_filter("initials", initials_filter);
        tera.register_filter("rating_label", rating_label_filter);
        Ok(Self { tera })
    }

    /// Render template `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Template`] if rendering fails.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, ViewError> {
        Ok(self.tera.render(name, context)?)
    }
}

// =============================================================================
// NOTICES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// A one-shot message shown above a form after a submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, title: "Success!", message: message.into() }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, title: "Check your input", message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, title: "Error!", message: message.into() }
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Five-star display, e.g. `4` becomes `★★★★☆`.
#[must_use]
pub fn star_string(rating: i64) -> String {
    let filled = usize::try_from(rating.clamp(0, 5)).unwrap_or(0);
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn stars_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(star_string(value.as_i64().unwrap_or(0))))
}

fn initials_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(initials(value.as_str().unwrap_or_default())))
}

fn rating_label_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(rating_label(value.as_i64().unwrap_or(0))))
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
