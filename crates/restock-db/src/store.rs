//! Record store: shop and product rows, and the upsert pipeline that runs
//! change detection against persisted state.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use restock_core::{decide, Decision, Notifier, PersistedProduct, Product, ThreadAction};

use crate::DbError;

/// A row from the `shops` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShopRow {
    pub id: i64,
    pub name: String,
}

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub shop_id: i64,
    pub name: String,
    pub url: String,
    pub price: f64,
    /// ISO 4217 code; parsed into `Currency` when handed to the detector.
    pub currency: String,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
    pub thread_id: Option<i64>,
}

impl ProductRow {
    fn state(&self) -> Result<PersistedProduct, DbError> {
        Ok(PersistedProduct {
            name: self.name.clone(),
            url: self.url.clone(),
            price: self.price,
            currency: self
                .currency
                .parse()
                .map_err(|e| DbError::CorruptRow(format!("product {}: {e}", self.id)))?,
            available: self.available,
            updated_at: self.updated_at,
            thread_id: self.thread_id,
        })
    }
}

/// Counts of what one [`upsert_products`] batch did.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpsertSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Lists all known shops.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_shops(pool: &SqlitePool) -> Result<Vec<ShopRow>, DbError> {
    let shops = sqlx::query_as::<_, ShopRow>("SELECT id, name FROM shops ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(shops)
}

/// Inserts any shop names not yet present.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if an insert fails.
pub async fn upsert_shops(pool: &SqlitePool, names: &[String]) -> Result<(), DbError> {
    for name in names {
        let result = sqlx::query("INSERT INTO shops (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
        if result.rows_affected() > 0 {
            tracing::info!(shop = %name, "shop added");
        }
    }
    Ok(())
}

/// Fetches the persisted product keyed by `(shop, name)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(
    pool: &SqlitePool,
    shop_id: i64,
    name: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, shop_id, name, url, price, currency, available, updated_at, thread_id \
         FROM products WHERE shop_id = ? AND name = ?",
    )
    .bind(shop_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Applies one shop's freshly extracted records to the store, invoking the
/// notifier for availability transitions.
///
/// Each record commits on its own: a database failure aborts the remainder
/// of the batch while earlier commits stand. Notification failures never
/// abort anything — a failed thread opening simply leaves the stored thread
/// id unset.
///
/// # Errors
///
/// Returns [`DbError`] on the first failed read or write; records already
/// committed in this batch remain committed.
pub async fn upsert_products(
    pool: &SqlitePool,
    shop: &ShopRow,
    products: &[Product],
    notifier: Option<&dyn Notifier>,
) -> Result<UpsertSummary, DbError> {
    let mut summary = UpsertSummary::default();

    for product in products {
        let existing = get_product(pool, shop.id, &product.name).await?;
        let now = Utc::now();

        match &existing {
            None => {
                if let Decision::Create { action } = decide(None, product, now) {
                    let thread_id = match (notifier, action) {
                        (Some(notifier), Some(ThreadAction::Open)) => {
                            notifier.create_thread(product, &shop.name).await
                        }
                        _ => None,
                    };
                    insert_product(pool, shop.id, product, now, thread_id).await?;
                    tracing::info!(name = %product.name, shop = %shop.name, "product added");
                    summary.created += 1;
                }
            }
            Some(row) => {
                let state = row.state()?;
                match decide(Some(&state), product, now) {
                    Decision::Noop => summary.unchanged += 1,
                    Decision::Update { action, .. } => {
                        let thread_id = match (notifier, action) {
                            (Some(notifier), Some(ThreadAction::Open)) => {
                                notifier.create_thread(product, &shop.name).await
                            }
                            (
                                Some(notifier),
                                Some(ThreadAction::Close {
                                    thread_id,
                                    open_duration,
                                }),
                            ) => {
                                notifier.close_thread(thread_id, open_duration).await;
                                None
                            }
                            _ => None,
                        };
                        update_product(pool, row.id, product, now, thread_id).await?;
                        tracing::info!(name = %product.name, shop = %shop.name, "product updated");
                        summary.updated += 1;
                    }
                    // decide() never creates when a persisted row exists.
                    Decision::Create { .. } => {}
                }
            }
        }
    }

    Ok(summary)
}

async fn insert_product(
    pool: &SqlitePool,
    shop_id: i64,
    product: &Product,
    now: DateTime<Utc>,
    thread_id: Option<i64>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO products (shop_id, name, url, price, currency, available, updated_at, thread_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(shop_id)
    .bind(&product.name)
    .bind(&product.url)
    .bind(product.price)
    .bind(product.currency.code())
    .bind(product.available)
    .bind(now)
    .bind(thread_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn update_product(
    pool: &SqlitePool,
    id: i64,
    product: &Product,
    now: DateTime<Utc>,
    thread_id: Option<i64>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE products SET price = ?, currency = ?, available = ?, url = ?, \
         updated_at = ?, thread_id = ? WHERE id = ?",
    )
    .bind(product.price)
    .bind(product.currency.code())
    .bind(product.available)
    .bind(&product.url)
    .bind(now)
    .bind(thread_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
