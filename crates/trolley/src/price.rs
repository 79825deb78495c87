//! Store prices: ingest, history, lookup.
//!
//! Crawler feeds call [`apply_price_feed`] with full captures. Each capture
//! lands in `store_price` through a single atomic statement that also writes
//! `price_history` when (and only when) the price actually moved. There is no
//! read-then-write window: concurrent feeds serialize on the row lock and
//! every committed transition is logged exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio_postgres::{Client, Row};

use crate::matching::like_pattern;
use crate::pool::ConnectionProvider;
use crate::Result;

/// A store's price row for one product.
#[derive(Debug, Clone)]
pub struct StorePrice {
    pub product_id: String,
    pub store_name: String,
    pub current_price: Decimal,
    /// Price before the most recent change. `None` until the first change.
    pub previous_price: Option<Decimal>,
    pub offer_text: Option<String>,
    pub availability: bool,
    pub last_updated: DateTime<Utc>,
}

/// One captured price from a store feed.
///
/// The product must already exist in the catalog
/// (see [`catalog::upsert_product`](crate::catalog::upsert_product)).
#[derive(Debug, Clone)]
pub struct PriceUpdate {
    pub product_id: String,
    pub store_name: String,
    pub price: Decimal,
    pub offer_text: Option<String>,
    pub availability: bool,
}

/// Outcome of applying one price update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceChange {
    /// First price seen for this (product, store). No history row.
    Inserted,
    /// Price moved; exactly one history row was written.
    Changed { old: Decimal, new: Decimal },
    /// Stored price already matches; the row was left untouched.
    Unchanged,
}

/// Counts from a batch of feed updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub inserted: usize,
    pub changed: usize,
    pub unchanged: usize,
}

// The update path shifts a NOT NULL current_price into previous_price, so in
// the RETURNING row previous_price IS NULL exactly when the row was freshly
// inserted. An unchanged price fails the DO UPDATE guard and returns no row
// at all; offer text and availability are then left as they were, matching
// the crawler contract that every capture carries the full row.
const APPLY_PRICE_SQL: &str = r#"
WITH up AS (
    INSERT INTO store_price (product_id, store_name, current_price, offer_text, availability)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (product_id, store_name) DO UPDATE
       SET previous_price = store_price.current_price,
           current_price  = EXCLUDED.current_price,
           offer_text     = EXCLUDED.offer_text,
           availability   = EXCLUDED.availability,
           last_updated   = now()
     WHERE store_price.current_price <> EXCLUDED.current_price
    RETURNING previous_price
),
hist AS (
    INSERT INTO price_history (product_id, store_name, old_price, new_price)
    SELECT $1, $2, up.previous_price, $3
      FROM up
     WHERE up.previous_price IS NOT NULL
)
SELECT previous_price FROM up
"#;

/// Apply one price capture atomically.
pub async fn apply_price_update<P: ConnectionProvider>(
    provider: &P,
    update: &PriceUpdate,
) -> Result<PriceChange> {
    let conn = provider.get().await?;
    apply_on(&conn, update).await
}

async fn apply_on(client: &Client, update: &PriceUpdate) -> Result<PriceChange> {
    let row = client
        .query_opt(
            APPLY_PRICE_SQL,
            &[
                &update.product_id,
                &update.store_name,
                &update.price,
                &update.offer_text,
                &update.availability,
            ],
        )
        .await?;

    let change = match row {
        None => PriceChange::Unchanged,
        Some(row) => match row.get::<_, Option<Decimal>>(0) {
            None => PriceChange::Inserted,
            Some(old) => PriceChange::Changed {
                old,
                new: update.price,
            },
        },
    };

    if let PriceChange::Changed { old, new } = change {
        tracing::debug!(
            product_id = %update.product_id,
            store = %update.store_name,
            %old,
            %new,
            "price changed"
        );
    }

    Ok(change)
}

/// Apply a whole feed batch, returning tallies.
pub async fn apply_price_feed<P: ConnectionProvider>(
    provider: &P,
    updates: &[PriceUpdate],
) -> Result<FeedSummary> {
    let conn = provider.get().await?;
    let mut summary = FeedSummary::default();
    for update in updates {
        match apply_on(&conn, update).await? {
            PriceChange::Inserted => summary.inserted += 1,
            PriceChange::Changed { .. } => summary.changed += 1,
            PriceChange::Unchanged => summary.unchanged += 1,
        }
    }
    tracing::info!(
        updates = updates.len(),
        inserted = summary.inserted,
        changed = summary.changed,
        unchanged = summary.unchanged,
        "applied price feed"
    );
    Ok(summary)
}

/// All store rows for one product, by store name.
pub async fn store_prices<P: ConnectionProvider>(
    provider: &P,
    product_id: &str,
) -> Result<Vec<StorePrice>> {
    let conn = provider.get().await?;
    let rows = conn
        .query(
            "SELECT product_id, store_name, current_price, previous_price,
                    offer_text, availability, last_updated
               FROM store_price WHERE product_id = $1 ORDER BY store_name",
            &[&product_id],
        )
        .await?;
    Ok(rows.iter().map(store_price_from_row).collect())
}

/// One logged price transition.
#[derive(Debug, Clone)]
pub struct PricePoint {
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub changed_at: DateTime<Utc>,
}

/// Price trend for one (product, store), newest change first.
pub async fn price_trend<P: ConnectionProvider>(
    provider: &P,
    product_id: &str,
    store_name: &str,
    limit: i64,
) -> Result<Vec<PricePoint>> {
    let conn = provider.get().await?;
    let rows = conn
        .query(
            "SELECT old_price, new_price, changed_at
               FROM price_history
              WHERE product_id = $1 AND store_name = $2
              ORDER BY changed_at DESC, id DESC
              LIMIT $3",
            &[&product_id, &store_name, &limit],
        )
        .await?;
    Ok(rows
        .iter()
        .map(|row| PricePoint {
            old_price: row.get(0),
            new_price: row.get(1),
            changed_at: row.get(2),
        })
        .collect())
}

/// One (product, store) row from a catalog-wide price search.
#[derive(Debug, Clone)]
pub struct ProductPriceRow {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub store_name: String,
    pub current_price: Decimal,
    pub previous_price: Option<Decimal>,
    pub offer_text: Option<String>,
    pub availability: bool,
}

/// Search the catalog by name containment and list every store's price,
/// cheapest first. Unavailable rows are included and flagged.
pub async fn compare_product_prices<P: ConnectionProvider>(
    provider: &P,
    query: &str,
    limit: i64,
) -> Result<Vec<ProductPriceRow>> {
    let pattern = like_pattern(query);
    let conn = provider.get().await?;
    let rows = conn
        .query(
            r#"
SELECT p.product_id, p.name, p.brand, sp.store_name,
       sp.current_price, sp.previous_price, sp.offer_text, sp.availability
  FROM product p
  JOIN store_price sp USING (product_id)
 WHERE p.name ILIKE $1
 ORDER BY sp.current_price, p.product_id, sp.store_name
 LIMIT $2
"#,
            &[&pattern, &limit],
        )
        .await?;
    Ok(rows
        .iter()
        .map(|row| ProductPriceRow {
            product_id: row.get(0),
            name: row.get(1),
            brand: row.get(2),
            store_name: row.get(3),
            current_price: row.get(4),
            previous_price: row.get(5),
            offer_text: row.get(6),
            availability: row.get(7),
        })
        .collect())
}

fn store_price_from_row(row: &Row) -> StorePrice {
    StorePrice {
        product_id: row.get(0),
        store_name: row.get(1),
        current_price: row.get(2),
        previous_price: row.get(3),
        offer_text: row.get(4),
        availability: row.get(5),
        last_updated: row.get(6),
    }
}
