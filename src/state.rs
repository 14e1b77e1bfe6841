//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the three backend seams (records, objects, auth) as trait
//! objects plus the compiled templates. The same state runs against the
//! hosted backend in production and the in-memory store in local runs.

use std::sync::Arc;

use crate::config::{ContactDetails, DEFAULT_MAX_UPLOAD_BYTES};
use crate::store::memory::MemoryStore;
use crate::store::{AuthService, ObjectStore, RecordStore};
use crate::views::Views;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub auth: Arc<dyn AuthService>,
    pub views: Arc<Views>,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
    /// Request body limit for admin uploads.
    pub max_upload_bytes: usize,
    /// Set when uploads live in process and must be served by this server.
    pub local_objects: Option<Arc<MemoryStore>>,
    pub contact: Arc<ContactDetails>,
}

impl AppState {
    #[must_use]
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        auth: Arc<dyn AuthService>,
        views: Arc<Views>,
    ) -> Self {
        Self {
            records,
            objects,
            auth,
            views,
            cookie_secure: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            local_objects: None,
            contact: Arc::default(),
        }
    }

    /// Run every seam against one in-memory store.
    #[must_use]
    pub fn in_memory(store: Arc<MemoryStore>, views: Arc<Views>) -> Self {
        let mut state = Self::new(store.clone(), store.clone(), store.clone(), views);
        state.local_objects = Some(store);
        state
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = Arc::new(contact);
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::{Page, Query, Record, StoreError};

    pub const ADMIN_EMAIL: &str = "admin@example.com";
    pub const ADMIN_PASSWORD: &str = "hunter22";

    #[must_use]
    pub fn test_views() -> Arc<Views> {
        Arc::new(Views::new().expect("templates should compile"))
    }

    /// Memory store with one admin account.
    #[must_use]
    pub fn memory_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new("images").with_account(ADMIN_EMAIL, ADMIN_PASSWORD))
    }

    /// Create a test `AppState` over a fresh memory store and return both.
    #[must_use]
    pub fn test_app_state() -> (AppState, Arc<MemoryStore>) {
        let store = memory_store();
        (AppState::in_memory(store.clone(), test_views()), store)
    }

    /// Create a test `AppState` with custom record and object stores. Auth
    /// still runs against a memory store with the test admin account.
    #[must_use]
    pub fn test_app_state_with(records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> (AppState, Arc<MemoryStore>) {
        let auth = memory_store();
        (AppState::new(records, objects, auth.clone(), test_views()), auth)
    }

    /// Sign the test admin in and return the access token.
    pub async fn admin_token(auth: &MemoryStore) -> String {
        auth.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("test admin should sign in")
            .access_token
    }

    // =========================================================================
    // REQUESTS
    // =========================================================================

    pub const BOUNDARY: &str = "shoecare-test-boundary";

    /// Collect a response body as UTF-8 text.
    pub async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Location header of a redirect.
    pub fn location(response: &axum::response::Response) -> Option<String> {
        response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }

    /// Encode text fields and an optional `image` file as multipart/form-data.
    #[must_use]
    pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }
        if let Some((file_name, content_type, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    // =========================================================================
    // COUNTING STORE
    // =========================================================================

    /// Memory-backed store that counts every record and object call.
    pub struct CountingStore {
        pub inner: MemoryStore,
        record_calls: AtomicUsize,
        uploads: AtomicUsize,
    }

    impl CountingStore {
        #[must_use]
        pub fn new() -> Self {
            Self { inner: MemoryStore::new("images"), record_calls: AtomicUsize::new(0), uploads: AtomicUsize::new(0) }
        }

        pub fn record_calls(&self) -> usize {
            self.record_calls.load(Ordering::SeqCst)
        }

        pub fn uploads(&self) -> usize {
            self.uploads.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.record_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Default for CountingStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait::async_trait]
    impl RecordStore for CountingStore {
        async fn select(&self, table: &str, query: &Query) -> Result<Page, StoreError> {
            self.hit();
            self.inner.select(table, query).await
        }

        async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError> {
            self.hit();
            self.inner.insert(table, record).await
        }

        async fn update(&self, table: &str, id: &str, changes: Record) -> Result<(), StoreError> {
            self.hit();
            self.inner.update(table, id, changes).await
        }

        async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
            self.hit();
            self.inner.delete(table, id).await
        }

        async fn count(&self, table: &str) -> Result<u64, StoreError> {
            self.hit();
            self.inner.count(table).await
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for CountingStore {
        async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.inner.upload(path, bytes, content_type).await
        }

        fn public_url(&self, path: &str) -> String {
            self.inner.public_url(path)
        }
    }

    // =========================================================================
    // FAILING STORE
    // =========================================================================

    /// Store whose every call fails as if the backend were unreachable.
    pub struct FailingStore;

    fn unavailable() -> StoreError {
        StoreError::Request("backend unavailable".into())
    }

    #[async_trait::async_trait]
    impl RecordStore for FailingStore {
        async fn select(&self, _table: &str, _query: &Query) -> Result<Page, StoreError> {
            Err(unavailable())
        }

        async fn insert(&self, _table: &str, _record: Record) -> Result<Record, StoreError> {
            Err(unavailable())
        }

        async fn update(&self, _table: &str, _id: &str, _changes: Record) -> Result<(), StoreError> {
            Err(unavailable())
        }

        async fn delete(&self, _table: &str, _id: &str) -> Result<(), StoreError> {
            Err(unavailable())
        }

        async fn count(&self, _table: &str) -> Result<u64, StoreError> {
            Err(unavailable())
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for FailingStore {
        async fn upload(&self, _path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, StoreError> {
            Err(unavailable())
        }

        fn public_url(&self, path: &str) -> String {
            format!("/unavailable/{path}")
        }
    }
}
