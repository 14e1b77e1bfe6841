use serde_json::Value;

use super::*;
use crate::state::test_helpers::FailingStore;
use crate::store::Record;
use crate::store::memory::MemoryStore;

fn row(pairs: &[(&str, Value)]) -> Record {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

#[test]
fn average_of_no_ratings_is_zero() {
    assert!(average_rating(&[]).abs() < f64::EPSILON);
}

#[test]
fn average_of_ratings() {
    assert!((average_rating(&[5, 4, 4]) - 13.0 / 3.0).abs() < 1e-9);
}

#[test]
fn average_label_has_one_decimal() {
    let stats = DashboardStats { total_services: 0, total_reviews: 3, average_rating: 13.0 / 3.0 };
    assert_eq!(stats.average_label(), "4.3");
    assert_eq!(DashboardStats::default().average_label(), "0.0");
}

#[tokio::test]
async fn load_stats_counts_services_and_reviews() {
    let store = MemoryStore::new("images");
    for service in ["Deep Clean", "Unyellowing"] {
        store.insert(PRICE_LIST_TABLE, row(&[("service", Value::from(service))])).await.unwrap();
    }
    for rating in [5, 3] {
        store.insert(REVIEWS_TABLE, row(&[("name", Value::from("x")), ("rating", Value::from(rating))])).await.unwrap();
    }

    let stats = load_stats(&store).await;
    assert_eq!(stats.total_services, 2);
    assert_eq!(stats.total_reviews, 2);
    assert!((stats.average_rating - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn load_stats_failure_reads_as_zero() {
    assert_eq!(load_stats(&FailingStore).await, DashboardStats::default());
}
