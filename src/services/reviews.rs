//! Reviews service: public review submission and display helpers.

use serde_json::Value;
use tracing::{error, info};

use crate::store::{Record, RecordStore, StoreError};

pub const REVIEWS_TABLE: &str = "reviews";

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Please select a rating before submitting")]
    MissingRating,
    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),
    #[error("Please enter your name")]
    MissingName,
    #[error("Please write a comment")]
    MissingComment,
    #[error("There was a problem submitting your review. Please try again.")]
    Store(#[from] StoreError),
}

impl ReviewError {
    /// Whether the visitor can fix this by correcting the form.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// A review as submitted by a visitor. Rating 0 means "not chosen".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub name: String,
    pub rating: i64,
    pub comment: String,
}

/// Check a submission and build the record to insert.
///
/// # Errors
///
/// Returns the first input problem found. Rating is checked first.
pub fn validate(submission: &ReviewSubmission) -> Result<Record, ReviewError> {
    match submission.rating {
        0 => return Err(ReviewError::MissingRating),
        r if !(1..=5).contains(&r) => return Err(ReviewError::RatingOutOfRange(r)),
        _ => {}
    }
    let name = submission.name.trim();
    if name.is_empty() {
        return Err(ReviewError::MissingName);
    }
    let comment = submission.comment.trim();
    if comment.is_empty() {
        return Err(ReviewError::MissingComment);
    }

    let mut record = Record::new();
    record.insert("name".into(), Value::from(name));
    record.insert("rating".into(), Value::from(submission.rating));
    record.insert("comment".into(), Value::from(comment));
    Ok(record)
}

/// Validate and insert a review. Invalid input never reaches the store.
///
/// # Errors
///
/// Returns a validation error, or [`ReviewError::Store`] if the insert fails.
pub async fn submit_review(records: &dyn RecordStore, submission: &ReviewSubmission) -> Result<Record, ReviewError> {
    let record = validate(submission)?;
    match records.insert(REVIEWS_TABLE, record).await {
        Ok(stored) => {
            info!(rating = submission.rating, "review submitted");
            Ok(stored)
        }
        Err(e) => {
            error!(error = %e, "review insert failed");
            Err(ReviewError::Store(e))
        }
    }
}

/// Word label for a star rating; empty outside 1 through 5.
#[must_use]
pub fn rating_label(rating: i64) -> &'static str {
    match rating {
        1 => "Poor",
        2 => "Fair",
        3 => "Good",
        4 => "Very Good",
        5 => "Excellent",
        _ => "",
    }
}

/// Uppercase first letter of each word of a reviewer's name.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
