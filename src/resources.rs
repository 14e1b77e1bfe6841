//! Site resources: typed rows and the schema that drives the admin screens.
//!
//! DESIGN
//! ======
//! Every admin resource is described by one `ResourceSchema`: its table,
//! editable columns, optional image column with its storage prefix, page
//! size and list order. The generic CRUD service and templates read the
//! schema; there is no per-resource handler code.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::store::Record;

// =============================================================================
// SCHEMA
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    /// Integer star rating, 1 through 5.
    Rating,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// The image column of a resource and where its uploads go in the bucket.
#[derive(Debug, Clone, Copy)]
pub struct ImageSpec {
    pub column: &'static str,
    pub prefix: &'static str,
}

#[derive(Debug)]
pub struct ResourceSchema {
    /// URL segment under `/admin/`.
    pub slug: &'static str,
    pub table: &'static str,
    pub title: &'static str,
    /// Sidebar label.
    pub label: &'static str,
    pub singular: &'static str,
    pub fields: &'static [FieldSpec],
    pub image: Option<ImageSpec>,
    pub page_size: u64,
    /// `(column, ascending)`
    pub order: Option<(&'static str, bool)>,
    pub can_create: bool,
    pub can_edit: bool,
}

pub static BANNER: ResourceSchema = ResourceSchema {
    slug: "banner",
    table: "banner",
    title: "Banner Management",
    label: "Banner",
    singular: "Banner",
    fields: &[
        FieldSpec { column: "title", label: "Title", kind: FieldKind::Text },
        FieldSpec { column: "subtitle", label: "Subtitle", kind: FieldKind::Text },
    ],
    image: Some(ImageSpec { column: "image_url", prefix: "banner" }),
    page_size: 5,
    order: None,
    can_create: true,
    can_edit: true,
};

pub static PRICE_LIST: ResourceSchema = ResourceSchema {
    slug: "price-list",
    table: "price_list",
    title: "Price List Management",
    label: "Price List",
    singular: "Price Item",
    fields: &[
        FieldSpec { column: "service", label: "Service Name", kind: FieldKind::Text },
        FieldSpec { column: "price", label: "Price", kind: FieldKind::Text },
        FieldSpec { column: "description", label: "Description", kind: FieldKind::TextArea },
    ],
    image: Some(ImageSpec { column: "imageurl", prefix: "price" }),
    page_size: 5,
    order: None,
    can_create: true,
    can_edit: true,
};

pub static GALLERY: ResourceSchema = ResourceSchema {
    slug: "gallery",
    table: "gallery",
    title: "Gallery Management",
    label: "Gallery",
    singular: "Gallery Item",
    fields: &[FieldSpec { column: "title", label: "Title", kind: FieldKind::Text }],
    image: Some(ImageSpec { column: "image", prefix: "gallery" }),
    page_size: 5,
    order: Some(("created_at", false)),
    can_create: true,
    can_edit: false,
};

pub static REVIEWS: ResourceSchema = ResourceSchema {
    slug: "reviews",
    table: "reviews",
    title: "Review Management",
    label: "Reviews",
    singular: "Review",
    fields: &[
        FieldSpec { column: "name", label: "Name", kind: FieldKind::Text },
        FieldSpec { column: "rating", label: "Rating", kind: FieldKind::Rating },
        FieldSpec { column: "comment", label: "Comment", kind: FieldKind::TextArea },
    ],
    image: None,
    page_size: 10,
    order: Some(("created_at", false)),
    can_create: false,
    can_edit: false,
};

/// All admin resources in sidebar order.
pub static RESOURCES: [&ResourceSchema; 4] = [&BANNER, &PRICE_LIST, &REVIEWS, &GALLERY];

/// Look up a resource by its URL segment.
#[must_use]
pub fn find(slug: &str) -> Option<&'static ResourceSchema> {
    RESOURCES.iter().copied().find(|r| r.slug == slug)
}

// =============================================================================
// TYPED ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Banner {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, deserialize_with = "de_text")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "de_text")]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PriceItem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub service: String,
    #[serde(default, deserialize_with = "de_text")]
    pub price: String,
    #[serde(default, deserialize_with = "de_text")]
    pub description: String,
    #[serde(default, deserialize_with = "de_text")]
    pub imageurl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalleryImage {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, deserialize_with = "de_text")]
    pub image: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Review {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default)]
    pub rating: i64,
    #[serde(default, deserialize_with = "de_text")]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Decode a store row into a typed resource.
///
/// # Errors
///
/// Returns an error if a required column is missing or mistyped.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::Object(record))
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("unsupported id value: {other}"))),
    }
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[path = "resources_test.rs"]
mod tests;
