mod config;
mod pagination;
mod resources;
mod routes;
mod services;
mod state;
mod store;
mod views;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::services::upload::MAX_IMAGE_BYTES;
use crate::store::memory::MemoryStore;
use crate::store::supabase::SupabaseClient;

/// Headroom above the image limit so oversized files reach validation
/// instead of failing mid-stream.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::SiteConfig::from_env().expect("invalid configuration");
    let views = Arc::new(views::Views::new().expect("template compile failed"));

    // Hosted backend when configured; otherwise everything runs in memory.
    let state = match &config.supabase {
        Some(supabase) => {
            let client = Arc::new(SupabaseClient::new(supabase).expect("store client init failed"));
            tracing::info!(url = %supabase.url, bucket = %supabase.bucket, "hosted store configured");
            state::AppState::new(client.clone(), client.clone(), client, views)
        }
        None => {
            tracing::warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set, using in-memory store");
            let mut store = MemoryStore::new(&config.bucket);
            match &config.admin_seed {
                Some(seed) => store = store.with_account(&seed.email, &seed.password),
                None => tracing::warn!("ADMIN_EMAIL or ADMIN_PASSWORD not set, admin login disabled"),
            }
            state::AppState::in_memory(Arc::new(store), views)
        }
    };

    let min_body = MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES;
    if config.max_upload_bytes < min_body {
        tracing::warn!(configured = config.max_upload_bytes, using = min_body, "MAX_UPLOAD_BYTES below image limit");
    }
    let state = state
        .with_cookie_secure(config.cookie_secure)
        .with_max_upload_bytes(config.max_upload_bytes.max(min_body))
        .with_contact(config.contact.clone());

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "shoecare listening");
    axum::serve(listener, app).await.expect("server failed");
}
