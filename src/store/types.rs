//! Store types: provider-neutral records, queries, sessions and errors.
//!
//! Shared by the Supabase client and the in-memory backend. Services only
//! ever see these types and the traits in `store`.

use serde::{Deserialize, Serialize};

/// A flat row as returned by the record store.
pub type Record = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request to the backend failed before a response arrived.
    #[error("store request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("store response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("store response parse failed: {0}")]
    Parse(String),

    /// Credentials were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// QUERY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Zero-based row window. `limit` is the maximum row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: u64,
    pub limit: u64,
}

impl Range {
    /// Inclusive index of the last row in the window.
    #[must_use]
    pub fn last_index(&self) -> u64 {
        self.offset.saturating_add(self.limit).saturating_sub(1)
    }
}

/// A select request: optional column list, equality filter, order and range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub columns: Option<String>,
    pub filter: Option<(String, String)>,
    pub order: Option<Order>,
    pub range: Option<Range>,
    /// Ask the store for an exact total row count alongside the rows.
    pub count: bool,
}

impl Query {
    /// Select every column of every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_owned());
        self
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filter = Some((column.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order { column: column.to_owned(), ascending });
        self
    }

    #[must_use]
    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some(Range { offset, limit });
        self
    }

    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

/// Rows returned by a select. `total` is set only when a count was requested.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub rows: Vec<Record>,
    pub total: Option<u64>,
}

// =============================================================================
// SESSION
// =============================================================================

/// An authenticated admin session issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: Option<String>,
}

// =============================================================================
// HELPERS
// =============================================================================

/// Render a record id as a string. Stores hand back integer or UUID ids.
#[must_use]
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a column as display text. Null and missing columns read as `""`.
#[must_use]
pub fn column_text(record: &Record, column: &str) -> String {
    match record.get(column) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
