//! Migration: create-signals
//! Created: 2026-08-14 11:45:00 BST

use crate::{MigrationContext, Result};

crate::migration!("2026_08_14_114500-create_signals", migrate);

pub async fn migrate(ctx: &mut MigrationContext<'_>) -> Result<()> {
    // Table: crawl_priority
    //
    // Aggregated interest signals for the crawler fleet. store_name NULL
    // means "any store". NULLS NOT DISTINCT so the NULL-store row upserts
    // like any other (requires Postgres 15+).
    ctx.execute(
        r#"
CREATE TABLE crawl_priority (
    id BIGSERIAL PRIMARY KEY,
    product_search TEXT NOT NULL,
    store_name TEXT,
    source TEXT NOT NULL,
    request_count INTEGER NOT NULL DEFAULT 1,
    first_requested TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_requested TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_crawled TIMESTAMPTZ,
    UNIQUE NULLS NOT DISTINCT (product_search, store_name)
)
"#,
    )
    .await?;
    ctx.execute(
        "CREATE INDEX idx_crawl_priority_pending ON crawl_priority (request_count DESC, last_requested DESC) WHERE last_crawled IS NULL",
    )
    .await?;

    // Table: store_promotion
    ctx.execute(
        r#"
CREATE TABLE store_promotion (
    id BIGSERIAL PRIMARY KEY,
    store_name TEXT NOT NULL,
    promotion_type TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    image_url TEXT,
    target_url TEXT,
    display_priority INTEGER NOT NULL DEFAULT 0,
    starts_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    ends_at TIMESTAMPTZ,
    is_active BOOLEAN NOT NULL DEFAULT true
)
"#,
    )
    .await?;
    ctx.execute(
        "CREATE INDEX idx_store_promotion_active ON store_promotion (promotion_type, display_priority DESC) WHERE is_active",
    )
    .await?;

    Ok(())
}
