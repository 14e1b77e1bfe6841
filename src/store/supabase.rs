//! Supabase client over the PostgREST, storage and GoTrue APIs.
//!
//! Thin HTTP wrapper over the three hosted APIs. Request shaping and
//! response parsing live in pure functions for testability.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;

use super::types::{Page, Query, Range, Record, Session, StoreError};
use super::{AuthService, ObjectStore, RecordStore};
use crate::config::SupabaseConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// Bearer for record writes and uploads: the service key when configured.
    write_key: String,
    bucket: String,
}

impl SupabaseClient {
    /// Build a client for one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            write_key: config
                .service_key
                .clone()
                .unwrap_or_else(|| config.anon_key.clone()),
            bucket: config.bucket.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.base_url)
    }

    fn with_keys(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
        builder.header("apikey", &self.anon_key).bearer_auth(bearer)
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, StoreError> {
    builder
        .send()
        .await
        .map_err(|e| StoreError::Request(e.to_string()))
}

/// Read the body, turning any non-2xx status into `StoreError::Response`.
async fn success_text(response: Response) -> Result<String, StoreError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| StoreError::Request(e.to_string()))?;
    if !(200..300).contains(&status) {
        return Err(StoreError::Response { status, body: text });
    }
    Ok(text)
}

// =============================================================================
// RECORDS
// =============================================================================

#[async_trait::async_trait]
impl RecordStore for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Page, StoreError> {
        let mut builder = self
            .http
            .get(self.rest_url(table))
            .query(&select_params(query));
        builder = self.with_keys(builder, &self.anon_key);
        if let Some(range) = query.range {
            builder = builder
                .header("Range-Unit", "items")
                .header("Range", range_header(range));
        }
        if query.count {
            builder = builder.header("Prefer", "count=exact");
        }

        let response = send(builder).await?;
        let total = content_range_total(&response);

        // An offset past the last row is reported as 416; treat it as an empty page.
        if response.status().as_u16() == 416 {
            return Ok(Page { rows: Vec::new(), total: if query.count { total } else { None } });
        }

        let text = success_text(response).await?;
        let rows = parse_rows(&text)?;
        Ok(Page { rows, total: if query.count { total } else { None } })
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError> {
        let builder = self
            .http
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&record);
        let response = send(self.with_keys(builder, &self.write_key)).await?;
        let text = success_text(response).await?;
        parse_rows(&text)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Parse("insert returned no rows".into()))
    }

    async fn update(&self, table: &str, id: &str, changes: Record) -> Result<(), StoreError> {
        let builder = self
            .http
            .patch(self.rest_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&changes);
        let response = send(self.with_keys(builder, &self.write_key)).await?;
        success_text(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let builder = self
            .http
            .delete(self.rest_url(table))
            .query(&[("id", format!("eq.{id}"))]);
        let response = send(self.with_keys(builder, &self.write_key)).await?;
        success_text(response).await?;
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<u64, StoreError> {
        let builder = self
            .http
            .head(self.rest_url(table))
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = send(self.with_keys(builder, &self.anon_key)).await?;
        let total = content_range_total(&response);
        success_text(response).await?;
        total.ok_or_else(|| StoreError::Parse("missing Content-Range total".into()))
    }
}

// =============================================================================
// STORAGE
// =============================================================================

#[async_trait::async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError> {
        let url = format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket);
        let builder = self
            .http
            .post(url)
            .header("Content-Type", content_type)
            .body(bytes);
        let response = send(self.with_keys(builder, &self.write_key)).await?;
        let text = success_text(response).await?;
        Ok(stored_path(&self.bucket, &text, path))
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.base_url, &self.bucket, path)
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[async_trait::async_trait]
impl AuthService for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let builder = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response = send(builder).await?;
        if matches!(response.status().as_u16(), 400 | 401 | 403) {
            return Err(StoreError::Unauthorized);
        }
        let text = success_text(response).await?;
        parse_token_response(&text)
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, StoreError> {
        let builder = self.with_keys(self.http.get(self.auth_url("user")), access_token);
        let response = send(builder).await?;
        if matches!(response.status().as_u16(), 401 | 403) {
            return Ok(None);
        }
        let text = success_text(response).await?;
        parse_user_response(&text, access_token).map(Some)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        let builder = self.with_keys(self.http.post(self.auth_url("logout")), access_token);
        let response = send(builder).await?;
        // An already-expired token has nothing left to revoke.
        if matches!(response.status().as_u16(), 401 | 403) {
            return Ok(());
        }
        success_text(response).await?;
        Ok(())
    }
}

// =============================================================================
// REQUEST SHAPING
// =============================================================================

/// PostgREST query string for a select.
fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), query.columns.clone().unwrap_or_else(|| "*".to_owned()))];
    if let Some((column, value)) = &query.filter {
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
    }
    params
}

/// Inclusive `Range` header value, e.g. `0-4` for the first five rows.
fn range_header(range: Range) -> String {
    format!("{}-{}", range.offset, range.last_index())
}

fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{base_url}/storage/v1/object/public/{bucket}/{}", path.trim_start_matches('/'))
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

/// Total from a `Content-Range` header: `0-4/23`, `*/0`. `*` totals are unknown.
fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

fn parse_rows(json: &str) -> Result<Vec<Record>, StoreError> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    rows.into_iter()
        .map(|row| match row {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(StoreError::Parse(format!("expected row object, got {other}"))),
        })
        .collect()
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: String,
}

/// Bucket-relative path from an upload response. The API echoes the key
/// prefixed with the bucket name; fall back to the requested path.
fn stored_path(bucket: &str, body: &str, requested: &str) -> String {
    serde_json::from_str::<UploadResponse>(body)
        .ok()
        .map(|r| {
            r.key
                .strip_prefix(&format!("{bucket}/"))
                .map_or(r.key.clone(), str::to_owned)
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| requested.to_owned())
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

fn parse_token_response(json: &str) -> Result<Session, StoreError> {
    let token: TokenResponse = serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(Session { access_token: token.access_token, user_id: token.user.id, email: token.user.email })
}

fn parse_user_response(json: &str, access_token: &str) -> Result<Session, StoreError> {
    let user: AuthUser = serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(Session { access_token: access_token.to_owned(), user_id: user.id, email: user.email })
}

#[cfg(test)]
#[path = "supabase_test.rs"]
mod tests;
