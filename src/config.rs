//! Site configuration parsed from environment variables.
//!
//! Missing backend credentials are not fatal: the server falls back to the
//! in-memory store so the site can be run locally without a hosted project.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORAGE_BUCKET: &str = "images";
pub const DEFAULT_STORE_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STORE_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Request body ceiling. Kept above the 2 MiB image policy so oversized
/// files reach validation instead of failing in the extractor.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Credentials for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project base URL without trailing slash, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public anon key. Sent as `apikey` on every request.
    pub anon_key: String,
    /// Optional service-role key used as the bearer for record writes.
    pub service_key: Option<String>,
    pub bucket: String,
    pub timeouts: StoreTimeouts,
}

/// Seed account for the in-memory auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// Public contact channels shown on the home page. Unset channels render
/// as plain buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub port: u16,
    /// `None` runs the in-memory backend.
    pub supabase: Option<SupabaseConfig>,
    pub bucket: String,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
    pub admin_seed: Option<AdminSeed>,
    pub contact: ContactDetails,
}

impl SiteConfig {
    /// Build config from process environment variables.
    ///
    /// - `PORT`: listen port (default 3000)
    /// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: hosted backend; both required to enable it
    /// - `SUPABASE_SERVICE_ROLE_KEY`: optional bearer for record writes
    /// - `STORAGE_BUCKET`: object storage bucket (default `images`)
    /// - `COOKIE_SECURE`: force the `Secure` cookie flag; inferred from `SITE_URL` otherwise
    /// - `STORE_REQUEST_TIMEOUT_SECS`, `STORE_CONNECT_TIMEOUT_SECS`
    /// - `MAX_UPLOAD_BYTES`: request body limit for admin forms
    /// - `ADMIN_EMAIL`, `ADMIN_PASSWORD`: in-memory login account
    /// - `CONTACT_PHONE`, `CONTACT_EMAIL`: targets for the home page contact buttons
    ///
    /// # Errors
    ///
    /// Returns an error if a present value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a present value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let bucket = lookup("STORAGE_BUCKET")
            .map(|b| b.trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_owned());
        let timeouts = StoreTimeouts {
            request_secs: parse_or(
                "STORE_REQUEST_TIMEOUT_SECS",
                lookup("STORE_REQUEST_TIMEOUT_SECS"),
                DEFAULT_STORE_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_or(
                "STORE_CONNECT_TIMEOUT_SECS",
                lookup("STORE_CONNECT_TIMEOUT_SECS"),
                DEFAULT_STORE_CONNECT_TIMEOUT_SECS,
            )?,
        };
        let max_upload_bytes = parse_or("MAX_UPLOAD_BYTES", lookup("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)?;

        let supabase = match (non_empty(lookup("SUPABASE_URL")), non_empty(lookup("SUPABASE_ANON_KEY"))) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_owned(),
                anon_key,
                service_key: non_empty(lookup("SUPABASE_SERVICE_ROLE_KEY")),
                bucket: bucket.clone(),
                timeouts,
            }),
            _ => None,
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            None => lookup("SITE_URL").is_some_and(|url| url.starts_with("https://")),
        };

        let admin_seed = match (non_empty(lookup("ADMIN_EMAIL")), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !password.is_empty() => Some(AdminSeed { email, password }),
            _ => None,
        };

        let contact = ContactDetails {
            phone: non_empty(lookup("CONTACT_PHONE")),
            email: non_empty(lookup("CONTACT_EMAIL")),
        };

        Ok(Self { port, supabase, bucket, cookie_secure, max_upload_bytes, admin_seed, contact })
    }
}

/// Parse a boolean flag: `1/true/yes/on` or `0/false/no/off`, case-insensitive.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
