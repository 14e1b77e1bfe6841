use super::*;
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[test]
fn find_known_slugs() {
    assert_eq!(find("banner").map(|r| r.table), Some("banner"));
    assert_eq!(find("price-list").map(|r| r.table), Some("price_list"));
    assert_eq!(find("gallery").map(|r| r.table), Some("gallery"));
    assert_eq!(find("reviews").map(|r| r.table), Some("reviews"));
}

#[test]
fn find_unknown_slug_is_none() {
    assert!(find("users").is_none());
    assert!(find("price_list").is_none());
}

#[test]
fn image_prefixes_match_storage_layout() {
    assert_eq!(BANNER.image.map(|i| i.prefix), Some("banner"));
    assert_eq!(PRICE_LIST.image.map(|i| i.prefix), Some("price"));
    assert_eq!(GALLERY.image.map(|i| i.prefix), Some("gallery"));
    assert!(REVIEWS.image.is_none());
}

#[test]
fn screen_capabilities() {
    assert!(BANNER.can_create && BANNER.can_edit);
    assert!(PRICE_LIST.can_create && PRICE_LIST.can_edit);
    assert!(GALLERY.can_create && !GALLERY.can_edit);
    assert!(!REVIEWS.can_create && !REVIEWS.can_edit);
}

#[test]
fn page_sizes() {
    assert_eq!(BANNER.page_size, 5);
    assert_eq!(PRICE_LIST.page_size, 5);
    assert_eq!(GALLERY.page_size, 5);
    assert_eq!(REVIEWS.page_size, 10);
}

#[test]
fn price_item_from_record_with_integer_id() {
    let item: PriceItem = from_record(record(json!({
        "id": 3,
        "service": "Deep Clean",
        "price": "50000",
        "description": "Full wash",
        "imageurl": "price/0.42.jpg"
    })))
    .unwrap();
    assert_eq!(item.id, "3");
    assert_eq!(item.service, "Deep Clean");
    assert_eq!(item.imageurl, "price/0.42.jpg");
}

#[test]
fn banner_null_columns_read_as_empty() {
    let banner: Banner = from_record(record(json!({"id": "b-1", "title": "Fresh kicks", "subtitle": null}))).unwrap();
    assert_eq!(banner.subtitle, "");
    assert_eq!(banner.image_url, "");
}

#[test]
fn review_rating_defaults_to_zero() {
    let review: Review = from_record(record(json!({"id": 1, "name": "Ana", "comment": "great"}))).unwrap();
    assert_eq!(review.rating, 0);
    assert!(review.created_at.is_none());
}

#[test]
fn record_without_id_is_rejected() {
    let result: Result<GalleryImage, _> = from_record(record(json!({"title": "x"})));
    assert!(result.is_err());
}

#[test]
fn record_with_object_id_is_rejected() {
    let result: Result<GalleryImage, _> = from_record(record(json!({"id": {"nested": true}})));
    assert!(result.is_err());
}
