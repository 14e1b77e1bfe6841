//! Store: the hosted backend behind three narrow traits.
//!
//! DESIGN
//! ======
//! The site owns no persistence. Records live in a hosted relational store,
//! images in an object-storage bucket, and admin identities in a hosted auth
//! service. Each concern is an async trait so handlers and services can be
//! driven by the Supabase HTTP client in production and by the in-memory
//! backend in local runs and tests.

pub mod memory;
pub mod supabase;
pub mod types;

pub use types::{Page, Query, Record, Session, StoreError};

// =============================================================================
// RECORD STORE
// =============================================================================

/// Table-level CRUD against the hosted record store.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the body is malformed.
    async fn select(&self, table: &str, query: &Query) -> Result<Page, StoreError>;

    /// Insert one row and return it as stored (with generated columns).
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write is rejected.
    async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError>;

    /// Overwrite the given columns of the row with `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write is rejected.
    async fn update(&self, table: &str, id: &str, changes: Record) -> Result<(), StoreError>;

    /// Delete the row with `id`. Deleting a missing row is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails.
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;

    /// Exact row count of `table`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails.
    async fn count(&self, table: &str) -> Result<u64, StoreError>;
}

// =============================================================================
// OBJECT STORE
// =============================================================================

/// Upload and addressing for the image bucket.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` inside the bucket, returning the stored path.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the upload is rejected.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError>;

    /// Public read URL for a stored path.
    fn public_url(&self, path: &str) -> String;
}

// =============================================================================
// AUTH SERVICE
// =============================================================================

/// Session-based admin authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthorized`] for bad credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;

    /// Resolve an access token to its live session, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the auth service cannot be reached.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, StoreError>;

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the auth service cannot be reached.
    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError>;
}
