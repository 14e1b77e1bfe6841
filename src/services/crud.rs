//! CRUD service: one list/create/edit/delete flow for every admin resource.
//!
//! DESIGN
//! ======
//! The flow is driven entirely by a `ResourceSchema`. A submit collects the
//! schema's fields, validates them, validates and uploads the image (when
//! one was chosen), and only then writes the record. Nothing is rolled
//! back: an upload followed by a failed write leaves the file in the bucket.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{error, info, warn};

use super::upload::{self, ImageFile, UploadError};
use crate::pagination::{PageLinks, Pagination};
use crate::resources::{FieldKind, ResourceSchema};
use crate::store::{ObjectStore, Query, Record, RecordStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CrudError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("failed to save {resource}: {source}")]
    Write { resource: &'static str, source: StoreError },
    #[error("failed to load {resource}: {source}")]
    Fetch { resource: &'static str, source: StoreError },
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

/// A submitted admin form: text fields by column plus an optional new image.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub fields: BTreeMap<String, String>,
    pub image: Option<ImageFile>,
}

/// One page of an admin list.
#[derive(Debug, Clone)]
pub struct ListPage {
    pub rows: Vec<Record>,
    pub total: u64,
    pub links: PageLinks,
}

// =============================================================================
// READ
// =============================================================================

/// Fetch one page of `schema`'s table with its exact total row count. A
/// page past the end (say, after deleting the last row on it) is served as
/// the last page so the rows and the links agree.
///
/// # Errors
///
/// Returns [`CrudError::Fetch`] if the store call fails.
pub async fn list_page(records: &dyn RecordStore, schema: &ResourceSchema, page: Option<u64>) -> Result<ListPage, CrudError> {
    let requested = Pagination::new(page, schema.page_size);
    let (rows, total) = fetch_window(records, schema, requested).await?;

    let (rows, total, pagination) = match requested.clamped(total) {
        Some(last) if rows.is_empty() => {
            let (rows, total) = fetch_window(records, schema, last).await?;
            (rows, total, last)
        }
        _ => (rows, total, requested),
    };
    Ok(ListPage { rows, total, links: pagination.links(total) })
}

async fn fetch_window(
    records: &dyn RecordStore,
    schema: &ResourceSchema,
    pagination: Pagination,
) -> Result<(Vec<Record>, u64), CrudError> {
    let (column, ascending) = schema.order.unwrap_or(("id", true));
    let query = Query::all()
        .order_by(column, ascending)
        .range(pagination.offset(), pagination.per_page)
        .with_count();

    let result = records
        .select(schema.table, &query)
        .await
        .map_err(|source| CrudError::Fetch { resource: schema.singular, source })?;

    let total = result
        .total
        .unwrap_or_else(|| pagination.offset().saturating_add(result.rows.len() as u64));
    Ok((result.rows, total))
}

/// Fetch the row with `id`.
///
/// # Errors
///
/// Returns [`CrudError::NotFound`] if no row matches, or
/// [`CrudError::Fetch`] if the store call fails.
pub async fn fetch_one(records: &dyn RecordStore, schema: &ResourceSchema, id: &str) -> Result<Record, CrudError> {
    let page = records
        .select(schema.table, &Query::all().eq("id", id))
        .await
        .map_err(|source| CrudError::Fetch { resource: schema.singular, source })?;
    page.rows
        .into_iter()
        .next()
        .ok_or_else(|| CrudError::NotFound { resource: schema.singular, id: id.to_owned() })
}

// =============================================================================
// WRITE
// =============================================================================

/// Turn submitted fields into a record, checking every schema field.
///
/// # Errors
///
/// Returns [`CrudError::Validation`] naming the first missing or invalid field.
pub fn build_record(schema: &ResourceSchema, fields: &BTreeMap<String, String>) -> Result<Record, CrudError> {
    let mut record = Record::new();
    for field in schema.fields {
        let raw = fields.get(field.column).map_or("", |v| v.trim());
        if raw.is_empty() {
            return Err(CrudError::Validation(format!("{} is required", field.label)));
        }
        let value = match field.kind {
            FieldKind::Text | FieldKind::TextArea => Value::from(raw),
            FieldKind::Rating => match raw.parse::<i64>() {
                Ok(rating) if (1..=5).contains(&rating) => Value::from(rating),
                _ => return Err(CrudError::Validation(format!("{} must be between 1 and 5", field.label))),
            },
        };
        record.insert(field.column.to_owned(), value);
    }
    Ok(record)
}

/// Validate, upload the image (required when the resource has one) and
/// insert the new row.
///
/// # Errors
///
/// Returns a validation or upload error before anything is written, or
/// [`CrudError::Write`] if the insert fails.
pub async fn create(
    records: &dyn RecordStore,
    objects: &dyn ObjectStore,
    schema: &ResourceSchema,
    input: FormInput,
) -> Result<Record, CrudError> {
    let mut record = build_record(schema, &input.fields)?;

    let uploaded = match (schema.image, input.image) {
        (Some(image), Some(file)) => {
            let path = upload::store_image(objects, image.prefix, file).await?;
            record.insert(image.column.to_owned(), Value::from(path.clone()));
            Some(path)
        }
        (Some(_), None) => return Err(CrudError::Validation("Please select an image".into())),
        (None, _) => None,
    };

    match records.insert(schema.table, record).await {
        Ok(stored) => {
            info!(table = schema.table, "record created");
            Ok(stored)
        }
        Err(source) => {
            if let Some(path) = uploaded {
                warn!(%path, table = schema.table, "uploaded image orphaned by failed insert");
            }
            error!(error = %source, table = schema.table, "insert failed");
            Err(CrudError::Write { resource: schema.singular, source })
        }
    }
}

/// Validate and overwrite the row with `id`. Without a new image the stored
/// image path is left untouched.
///
/// # Errors
///
/// Returns a validation or upload error before anything is written, or
/// [`CrudError::Write`] if the update fails.
pub async fn update(
    records: &dyn RecordStore,
    objects: &dyn ObjectStore,
    schema: &ResourceSchema,
    id: &str,
    input: FormInput,
) -> Result<(), CrudError> {
    let mut changes = build_record(schema, &input.fields)?;

    let uploaded = match (schema.image, input.image) {
        (Some(image), Some(file)) => {
            let path = upload::store_image(objects, image.prefix, file).await?;
            changes.insert(image.column.to_owned(), Value::from(path.clone()));
            Some(path)
        }
        _ => None,
    };

    if let Err(source) = records.update(schema.table, id, changes).await {
        if let Some(path) = uploaded {
            warn!(%path, table = schema.table, %id, "uploaded image orphaned by failed update");
        }
        error!(error = %source, table = schema.table, %id, "update failed");
        return Err(CrudError::Write { resource: schema.singular, source });
    }
    info!(table = schema.table, %id, "record updated");
    Ok(())
}

/// Delete the row with `id`.
///
/// # Errors
///
/// Returns [`CrudError::Write`] if the store call fails.
pub async fn delete(records: &dyn RecordStore, schema: &ResourceSchema, id: &str) -> Result<(), CrudError> {
    records.delete(schema.table, id).await.map_err(|source| {
        error!(error = %source, table = schema.table, %id, "delete failed");
        CrudError::Write { resource: schema.singular, source }
    })?;
    info!(table = schema.table, %id, "record deleted");
    Ok(())
}

#[cfg(test)]
#[path = "crud_test.rs"]
mod tests;
