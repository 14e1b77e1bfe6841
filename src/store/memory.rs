//! In-memory backend: records, objects and sessions held in process.
//!
//! DESIGN
//! ======
//! Mirrors the hosted backend closely enough to run the whole site without
//! network access: generated integer ids, a `created_at` stamp on insert,
//! exact counts, duplicate-path rejection on upload, and opaque session
//! tokens. Everything is lost on restart.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde_json::Value;
use tokio::sync::RwLock;

use super::types::{Page, Query, Record, Session, StoreError, column_text, record_id};
use super::{AuthService, ObjectStore, RecordStore};
use crate::services::session::generate_token;

/// A stored upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    objects: RwLock<HashMap<String, StoredObject>>,
    sessions: RwLock<HashMap<String, Session>>,
    /// email -> password
    accounts: HashMap<String, String>,
    bucket: String,
    next_id: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new(bucket: &str) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            objects: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            accounts: HashMap::new(),
            bucket: bucket.to_owned(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register an admin account that `sign_in` will accept.
    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts
            .insert(email.trim().to_ascii_lowercase(), password.to_owned());
        self
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Look up an uploaded object by bucket-relative path.
    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    #[cfg(test)]
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

fn now_stamp() -> String {
    let format = time::macros::format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]+00:00"
    );
    time::OffsetDateTime::now_utc()
        .format(format)
        .unwrap_or_default()
}

/// Order two rows by `column`, numbers numerically and everything else as
/// text. Missing values sort first.
fn compare_column(a: &Record, b: &Record, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => column_text(a, column).cmp(&column_text(b, column)),
    }
}

fn project(record: &Record, columns: Option<&str>) -> Record {
    match columns {
        None | Some("*") => record.clone(),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter_map(|c| record.get(c).map(|v| (c.to_owned(), v.clone())))
            .collect(),
    }
}

// =============================================================================
// RECORDS
// =============================================================================

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Page, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Record> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filter
                            .as_ref()
                            .is_none_or(|(column, value)| column_text(row, column) == *value)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let primary = compare_column(a, b, &order.column).then_with(|| compare_column(a, b, "id"));
                if order.ascending { primary } else { primary.reverse() }
            });
        }

        let total = rows.len() as u64;
        let window: Vec<Record> = match query.range {
            Some(range) => rows
                .into_iter()
                .skip(usize::try_from(range.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(range.limit).unwrap_or(usize::MAX))
                .collect(),
            None => rows,
        };

        let rows = window
            .iter()
            .map(|row| project(row, query.columns.as_deref()))
            .collect();
        Ok(Page { rows, total: query.count.then_some(total) })
    }

    async fn insert(&self, table: &str, mut record: Record) -> Result<Record, StoreError> {
        if record_id(&record).is_none() {
            let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
            record.insert("id".into(), Value::from(id));
        }
        if !record.contains_key("created_at") {
            record.insert("created_at".into(), Value::from(now_stamp()));
        }

        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_owned())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, changes: Record) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| record_id(row).as_deref() == Some(id)))
        else {
            // A filter that matches nothing is not an error for the hosted store either.
            return Ok(());
        };
        for (column, value) in changes {
            if column != "id" {
                row.insert(column, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| record_id(row).as_deref() != Some(id));
        }
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<u64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).map_or(0, |rows| rows.len() as u64))
    }
}

// =============================================================================
// OBJECTS
// =============================================================================

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(path) {
            return Err(StoreError::Response { status: 409, body: format!("duplicate object: {path}") });
        }
        objects.insert(path.to_owned(), StoredObject { bytes, content_type: content_type.to_owned() });
        Ok(path.to_owned())
    }

    fn public_url(&self, path: &str) -> String {
        format!("/storage/v1/object/public/{}/{}", self.bucket, path.trim_start_matches('/'))
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[async_trait::async_trait]
impl AuthService for MemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let email = email.trim().to_ascii_lowercase();
        if self.accounts.get(&email).is_none_or(|expected| expected != password) {
            return Err(StoreError::Unauthorized);
        }

        let session = Session { access_token: generate_token(), user_id: email.clone(), email: Some(email) };
        self.sessions
            .write()
            .await
            .insert(session.access_token.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(access_token).cloned())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        self.sessions.write().await.remove(access_token);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
