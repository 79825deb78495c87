//! Store promotions.

use chrono::{DateTime, Utc};

use crate::pool::ConnectionProvider;
use crate::Result;

/// A store-wide promotional banner, unrelated to per-product offers.
#[derive(Debug, Clone)]
pub struct StorePromotion {
    pub id: i64,
    pub store_name: String,
    pub promotion_type: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub target_url: Option<String>,
    pub display_priority: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Promotions currently running, most prominent first.
///
/// A promotion counts as running when it is active, has started, and has
/// not ended; `ends_at IS NULL` means open-ended.
pub async fn active_promotions<P: ConnectionProvider>(
    provider: &P,
    promotion_type: Option<&str>,
    limit: i64,
) -> Result<Vec<StorePromotion>> {
    let conn = provider.get().await?;
    let rows = conn
        .query(
            "SELECT id, store_name, promotion_type, title, description,
                    image_url, target_url, display_priority, starts_at, ends_at
               FROM store_promotion
              WHERE is_active
                AND starts_at <= now()
                AND (ends_at IS NULL OR ends_at > now())
                AND ($1::text IS NULL OR promotion_type = $1)
              ORDER BY display_priority DESC, id
              LIMIT $2",
            &[&promotion_type, &limit],
        )
        .await?;
    Ok(rows
        .iter()
        .map(|row| StorePromotion {
            id: row.get(0),
            store_name: row.get(1),
            promotion_type: row.get(2),
            title: row.get(3),
            description: row.get(4),
            image_url: row.get(5),
            target_url: row.get(6),
            display_priority: row.get(7),
            starts_at: row.get(8),
            ends_at: row.get(9),
        })
        .collect())
}
