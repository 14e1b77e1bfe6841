//! Dashboard service: headline numbers for the admin landing page.

use serde::Serialize;
use tracing::error;

use super::reviews::REVIEWS_TABLE;
use crate::store::{Query, RecordStore};

const PRICE_LIST_TABLE: &str = "price_list";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_services: u64,
    pub total_reviews: u64,
    pub average_rating: f64,
}

impl DashboardStats {
    /// Average rating to one decimal place.
    #[must_use]
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average_rating)
    }
}

/// Mean of `ratings`, or 0 when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
}

/// Load dashboard numbers. A failed lookup logs and reads as zero.
pub async fn load_stats(records: &dyn RecordStore) -> DashboardStats {
    let rating_query = Query::all().columns("rating");
    let (services, reviews) = tokio::join!(
        records.count(PRICE_LIST_TABLE),
        records.select(REVIEWS_TABLE, &rating_query),
    );

    let total_services = services.unwrap_or_else(|e| {
        error!(error = %e, "price list count failed");
        0
    });

    let ratings: Vec<i64> = match reviews {
        Ok(page) => page
            .rows
            .iter()
            .filter_map(|row| row.get("rating").and_then(serde_json::Value::as_i64))
            .collect(),
        Err(e) => {
            error!(error = %e, "review ratings fetch failed");
            Vec::new()
        }
    };

    DashboardStats {
        total_services,
        total_reviews: ratings.len() as u64,
        average_rating: average_rating(&ratings),
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
