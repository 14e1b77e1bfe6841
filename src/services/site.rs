//! Site service: loads every section of the public home page.
//!
//! Sections are fetched concurrently and independently. A failed section
//! logs and renders empty; the page itself always renders.

use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::resources::{self, Banner, GalleryImage, PriceItem, Review};
use crate::store::{Query, RecordStore};

#[derive(Debug, Clone, Default)]
pub struct HomeData {
    /// First banner row, if any.
    pub banner: Option<Banner>,
    pub prices: Vec<PriceItem>,
    /// Newest first.
    pub gallery: Vec<GalleryImage>,
    /// Newest first.
    pub reviews: Vec<Review>,
}

async fn fetch_section<T: DeserializeOwned>(records: &dyn RecordStore, table: &str, query: Query) -> Vec<T> {
    let page = match records.select(table, &query).await {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, table, "section fetch failed");
            return Vec::new();
        }
    };
    page.rows
        .into_iter()
        .filter_map(|row| match resources::from_record(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, table, "skipping malformed row");
                None
            }
        })
        .collect()
}

/// Load all home page sections.
pub async fn load_home(records: &dyn RecordStore) -> HomeData {
    let (banners, prices, gallery, reviews) = tokio::join!(
        fetch_section::<Banner>(records, resources::BANNER.table, Query::all().order_by("id", true).range(0, 1)),
        fetch_section::<PriceItem>(records, resources::PRICE_LIST.table, Query::all().order_by("id", true)),
        fetch_section::<GalleryImage>(records, resources::GALLERY.table, Query::all().order_by("created_at", false)),
        fetch_section::<Review>(records, resources::REVIEWS.table, Query::all().order_by("created_at", false)),
    );

    HomeData { banner: banners.into_iter().next(), prices, gallery, reviews }
}

#[cfg(test)]
#[path = "site_test.rs"]
mod tests;
