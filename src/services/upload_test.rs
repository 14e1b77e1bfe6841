use super::*;
use crate::store::memory::MemoryStore;

fn jpeg(size: usize) -> ImageFile {
    ImageFile {
        file_name: "shoe.JPG".into(),
        content_type: "image/jpeg".into(),
        bytes: vec![0xFF; size],
    }
}

#[test]
fn validate_accepts_limit_exactly() {
    assert!(validate_image(&jpeg(MAX_IMAGE_BYTES)).is_ok());
}

#[test]
fn validate_rejects_one_byte_over() {
    let err = validate_image(&jpeg(MAX_IMAGE_BYTES + 1)).unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { size, max } if size == MAX_IMAGE_BYTES + 1 && max == MAX_IMAGE_BYTES));
}

#[test]
fn validate_rejects_disallowed_type() {
    let file = ImageFile { file_name: "shoe.webp".into(), content_type: "image/webp".into(), bytes: vec![1; 10] };
    assert!(matches!(validate_image(&file), Err(UploadError::UnsupportedType(t)) if t == "image/webp"));
}

#[test]
fn validate_accepts_png_and_gif() {
    for ct in ["image/png", "image/gif"] {
        let file = ImageFile { file_name: "x".into(), content_type: ct.into(), bytes: vec![1; 10] };
        assert!(validate_image(&file).is_ok(), "{ct}");
    }
}

#[test]
fn guess_content_type_by_extension() {
    assert_eq!(guess_content_type("a.jpeg"), Some("image/jpeg"));
    assert_eq!(guess_content_type("a.JPG"), Some("image/jpeg"));
    assert_eq!(guess_content_type("a.png"), Some("image/png"));
    assert_eq!(guess_content_type("a.gif"), Some("image/gif"));
    assert_eq!(guess_content_type("a.bmp"), None);
    assert_eq!(guess_content_type("noext"), None);
    assert_eq!(guess_content_type(".hidden"), None);
}

#[test]
fn object_path_keeps_prefix_and_lowercases_extension() {
    let path = object_path("price", &jpeg(1));
    let (prefix, name) = path.split_once('/').unwrap();
    assert_eq!(prefix, "price");
    let (stem, ext) = name.rsplit_once('.').unwrap();
    assert_eq!(ext, "jpg");
    assert_eq!(stem.len(), 32);
}

#[test]
fn object_path_falls_back_to_content_type() {
    let file = ImageFile { file_name: "blob".into(), content_type: "image/png".into(), bytes: vec![] };
    assert!(object_path("gallery", &file).ends_with(".png"));
}

#[test]
fn object_paths_are_unique() {
    assert_ne!(object_path("banner", &jpeg(1)), object_path("banner", &jpeg(1)));
}

#[tokio::test]
async fn store_image_uploads_valid_file() {
    let store = MemoryStore::new("images");
    let path = store_image(&store, "banner", jpeg(1024)).await.unwrap();
    assert!(path.starts_with("banner/"));
    let object = store.object(&path).await.unwrap();
    assert_eq!(object.bytes.len(), 1024);
    assert_eq!(object.content_type, "image/jpeg");
}

#[tokio::test]
async fn store_image_rejects_oversized_without_upload() {
    let store = MemoryStore::new("images");
    let err = store_image(&store, "banner", jpeg(MAX_IMAGE_BYTES + 1)).await.unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { .. }));
    assert_eq!(store.object_count().await, 0);
}
