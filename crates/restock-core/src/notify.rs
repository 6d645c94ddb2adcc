use async_trait::async_trait;
use chrono::Duration;

use crate::product::Product;

/// Contract for the external notification channel.
///
/// Implementations own delivery entirely: a failed call is logged inside the
/// implementation and surfaces as `None`, never as an error. In particular a
/// failed [`create_thread`](Notifier::create_thread) leaves the product's
/// stored thread id unset, and delivery problems never abort a store batch.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announces a product becoming available; returns the id of the opened
    /// thread when delivery succeeded.
    async fn create_thread(&self, product: &Product, shop_name: &str) -> Option<i64>;

    /// Closes the availability thread, reporting how long the product stayed
    /// in stock. May return a new thread id (unused by the store).
    async fn close_thread(&self, thread_id: i64, open_duration: Duration) -> Option<i64>;
}
