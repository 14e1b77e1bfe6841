use super::*;
use std::collections::HashMap;

fn config_from(pairs: &[(&str, &str)]) -> Result<SiteConfig, ConfigError> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    SiteConfig::from_lookup(|key| map.get(key).cloned())
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On", "  true  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False", "NO"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

// =============================================================================
// SiteConfig::from_lookup
// =============================================================================

#[test]
fn empty_environment_uses_defaults_and_memory_backend() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert!(config.supabase.is_none());
    assert_eq!(config.bucket, "images");
    assert!(!config.cookie_secure);
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    assert!(config.admin_seed.is_none());
}

#[test]
fn supabase_requires_url_and_anon_key() {
    let config = config_from(&[("SUPABASE_URL", "https://proj.supabase.co")]).unwrap();
    assert!(config.supabase.is_none());

    let config = config_from(&[("SUPABASE_ANON_KEY", "anon")]).unwrap();
    assert!(config.supabase.is_none());
}

#[test]
fn supabase_config_trims_trailing_slash() {
    let config = config_from(&[
        ("SUPABASE_URL", "https://proj.supabase.co/"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("STORAGE_BUCKET", "shoes"),
    ])
    .unwrap();
    let supabase = config.supabase.unwrap();
    assert_eq!(supabase.url, "https://proj.supabase.co");
    assert_eq!(supabase.anon_key, "anon");
    assert_eq!(supabase.service_key, None);
    assert_eq!(supabase.bucket, "shoes");
    assert_eq!(supabase.timeouts.request_secs, DEFAULT_STORE_REQUEST_TIMEOUT_SECS);
    assert_eq!(supabase.timeouts.connect_secs, DEFAULT_STORE_CONNECT_TIMEOUT_SECS);
}

#[test]
fn service_key_is_optional() {
    let config = config_from(&[
        ("SUPABASE_URL", "https://proj.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service"),
    ])
    .unwrap();
    assert_eq!(config.supabase.unwrap().service_key.as_deref(), Some("service"));
}

#[test]
fn invalid_port_is_an_error() {
    let err = config_from(&[("PORT", "eighty")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
}

#[test]
fn invalid_timeout_is_an_error() {
    let err = config_from(&[("STORE_REQUEST_TIMEOUT_SECS", "-1")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "STORE_REQUEST_TIMEOUT_SECS", .. }));
}

#[test]
fn cookie_secure_explicit_overrides_inference() {
    let config = config_from(&[("COOKIE_SECURE", "false"), ("SITE_URL", "https://shoes.example")]).unwrap();
    assert!(!config.cookie_secure);
}

#[test]
fn cookie_secure_inferred_from_https_site_url() {
    assert!(config_from(&[("SITE_URL", "https://shoes.example")]).unwrap().cookie_secure);
    assert!(!config_from(&[("SITE_URL", "http://localhost:3000")]).unwrap().cookie_secure);
}

#[test]
fn cookie_secure_invalid_is_an_error() {
    let err = config_from(&[("COOKIE_SECURE", "sometimes")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "COOKIE_SECURE", .. }));
}

#[test]
fn admin_seed_requires_both_values() {
    assert!(config_from(&[("ADMIN_EMAIL", "owner@shop.test")]).unwrap().admin_seed.is_none());

    let seed = config_from(&[("ADMIN_EMAIL", "owner@shop.test"), ("ADMIN_PASSWORD", "hunter2")])
        .unwrap()
        .admin_seed
        .unwrap();
    assert_eq!(seed.email, "owner@shop.test");
    assert_eq!(seed.password, "hunter2");
}

#[test]
fn contact_details_are_optional() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.contact, ContactDetails::default());

    let config = config_from(&[("CONTACT_PHONE", " +1 555 0100 "), ("CONTACT_EMAIL", "")]).unwrap();
    assert_eq!(config.contact.phone.as_deref(), Some("+1 555 0100"));
    assert_eq!(config.contact.email, None);
}
