//! Upload service: image validation and storage paths.
//!
//! Every image goes through `validate_image` before any store call, so a
//! rejected file never reaches the bucket and never produces a record.

use tracing::info;

use crate::store::{ObjectStore, StoreError};

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file is too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported file type: {0} (JPEG, PNG or GIF only)")]
    UnsupportedType(String),
    #[error("upload failed: {0}")]
    Store(#[from] StoreError),
}

/// An image file taken from a submitted form.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Check size and MIME type against the image policy.
///
/// # Errors
///
/// Returns [`UploadError::TooLarge`] or [`UploadError::UnsupportedType`].
pub fn validate_image(file: &ImageFile) -> Result<(), UploadError> {
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge { size: file.bytes.len(), max: MAX_IMAGE_BYTES });
    }
    if !ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
        return Err(UploadError::UnsupportedType(file.content_type.clone()));
    }
    Ok(())
}

/// Guess a MIME type from a file name when the browser sent none.
#[must_use]
pub fn guess_content_type(file_name: &str) -> Option<&'static str> {
    match file_extension(file_name)?.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

/// Build a fresh bucket path: `<prefix>/<random>.<ext>`.
///
/// The extension comes from the original file name, falling back to the
/// content type.
#[must_use]
pub fn object_path(prefix: &str, file: &ImageFile) -> String {
    let ext = file_extension(&file.file_name).unwrap_or_else(|| extension_for(&file.content_type).to_owned());
    format!("{prefix}/{}.{ext}", uuid::Uuid::new_v4().simple())
}

/// Validate `file` and upload it under `prefix`, returning the stored path.
///
/// # Errors
///
/// Returns a validation error before any store call, or
/// [`UploadError::Store`] if the bucket rejects the upload.
pub async fn store_image(objects: &dyn ObjectStore, prefix: &str, file: ImageFile) -> Result<String, UploadError> {
    validate_image(&file)?;
    let path = object_path(prefix, &file);
    let size = file.bytes.len();
    let stored = objects.upload(&path, file.bytes, &file.content_type).await?;
    info!(path = %stored, size, "image uploaded");
    Ok(stored)
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
