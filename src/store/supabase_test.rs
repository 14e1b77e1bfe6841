use super::*;
use crate::config::StoreTimeouts;

fn test_config() -> SupabaseConfig {
    SupabaseConfig {
        url: "https://proj.supabase.co".into(),
        anon_key: "anon".into(),
        service_key: None,
        bucket: "images".into(),
        timeouts: StoreTimeouts { request_secs: 5, connect_secs: 1 },
    }
}

// =============================================================================
// select_params / range_header
// =============================================================================

#[test]
fn select_params_default_selects_all_columns() {
    assert_eq!(select_params(&Query::all()), vec![("select".to_owned(), "*".to_owned())]);
}

#[test]
fn select_params_include_filter_and_order() {
    let query = Query::all()
        .columns("rating")
        .eq("id", "12")
        .order_by("created_at", false);
    let params = select_params(&query);
    assert_eq!(
        params,
        vec![
            ("select".to_owned(), "rating".to_owned()),
            ("id".to_owned(), "eq.12".to_owned()),
            ("order".to_owned(), "created_at.desc".to_owned()),
        ]
    );
}

#[test]
fn select_params_ascending_order() {
    let params = select_params(&Query::all().order_by("service", true));
    assert_eq!(params[1], ("order".to_owned(), "service.asc".to_owned()));
}

#[test]
fn range_header_is_inclusive() {
    assert_eq!(range_header(Range { offset: 0, limit: 5 }), "0-4");
    assert_eq!(range_header(Range { offset: 10, limit: 10 }), "10-19");
}

// =============================================================================
// parse_content_range
// =============================================================================

#[test]
fn content_range_with_window() {
    assert_eq!(parse_content_range("0-4/23"), Some(23));
}

#[test]
fn content_range_empty_table() {
    assert_eq!(parse_content_range("*/0"), Some(0));
}

#[test]
fn content_range_unknown_total() {
    assert_eq!(parse_content_range("0-4/*"), None);
    assert_eq!(parse_content_range("garbage"), None);
}

// =============================================================================
// parse_rows
// =============================================================================

#[test]
fn parse_rows_reads_objects() {
    let rows = parse_rows(r#"[{"id":1,"title":"Spring"},{"id":2,"title":"Summer"}]"#).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("title").and_then(|v| v.as_str()), Some("Summer"));
}

#[test]
fn parse_rows_rejects_non_objects() {
    assert!(matches!(parse_rows("[1,2]"), Err(StoreError::Parse(_))));
}

#[test]
fn parse_rows_rejects_invalid_json() {
    assert!(matches!(parse_rows("not json"), Err(StoreError::Parse(_))));
}

// =============================================================================
// storage
// =============================================================================

#[test]
fn stored_path_strips_bucket_prefix() {
    let body = r#"{"Key":"images/price/abc.jpg"}"#;
    assert_eq!(stored_path("images", body, "price/abc.jpg"), "price/abc.jpg");
}

#[test]
fn stored_path_falls_back_to_requested() {
    assert_eq!(stored_path("images", "{}", "gallery/x.png"), "gallery/x.png");
    assert_eq!(stored_path("images", "", "gallery/x.png"), "gallery/x.png");
}

#[test]
fn public_url_follows_storage_pattern() {
    let client = SupabaseClient::new(&test_config()).unwrap();
    assert_eq!(
        client.public_url("banner/1.jpg"),
        "https://proj.supabase.co/storage/v1/object/public/images/banner/1.jpg"
    );
}

#[test]
fn public_url_tolerates_leading_slash() {
    assert_eq!(
        public_object_url("http://localhost", "images", "/price/a.png"),
        "http://localhost/storage/v1/object/public/images/price/a.png"
    );
}

// =============================================================================
// auth
// =============================================================================

#[test]
fn parse_token_response_builds_session() {
    let json = r#"{"access_token":"tok","token_type":"bearer","user":{"id":"u-1","email":"owner@shop.test"}}"#;
    let session = parse_token_response(json).unwrap();
    assert_eq!(session.access_token, "tok");
    assert_eq!(session.user_id, "u-1");
    assert_eq!(session.email.as_deref(), Some("owner@shop.test"));
}

#[test]
fn parse_token_response_missing_token_fails() {
    assert!(matches!(parse_token_response(r#"{"user":{"id":"u"}}"#), Err(StoreError::Parse(_))));
}

#[test]
fn parse_user_response_keeps_token() {
    let session = parse_user_response(r#"{"id":"u-2","email":null}"#, "tok-2").unwrap();
    assert_eq!(session.access_token, "tok-2");
    assert_eq!(session.user_id, "u-2");
    assert!(session.email.is_none());
}

#[test]
fn service_key_becomes_write_bearer() {
    let mut config = test_config();
    config.service_key = Some("service".into());
    let client = SupabaseClient::new(&config).unwrap();
    assert_eq!(client.write_key, "service");
    assert_eq!(client.anon_key, "anon");
}
