//! Migration: create-catalog
//! Created: 2026-08-10 09:00:00 BST

use crate::{MigrationContext, Result};

crate::migration!("2026_08_10_090000-create_catalog", migrate);

pub async fn migrate(ctx: &mut MigrationContext<'_>) -> Result<()> {
    // Table: product
    //
    // product_id is derived from normalized name + brand (see
    // catalog::canonical_product_id), so the same physical product gets the
    // same row no matter which store feed it first arrived from.
    ctx.execute(
        r#"
CREATE TABLE product (
    product_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    brand TEXT NOT NULL,
    category TEXT NOT NULL,
    reference_price NUMERIC(10,2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#,
    )
    .await?;

    // Item fragments match against product.name with ILIKE containment
    ctx.execute("CREATE EXTENSION IF NOT EXISTS pg_trgm").await?;
    ctx.execute("CREATE INDEX idx_product_name_trgm ON product USING gin (name gin_trgm_ops)")
        .await?;

    // Table: store_price
    //
    // One row per (product, store). Price changes shift current_price into
    // previous_price; the upsert in price::apply_price_update is the only
    // writer.
    ctx.execute(
        r#"
CREATE TABLE store_price (
    product_id TEXT NOT NULL REFERENCES product(product_id) ON DELETE CASCADE,
    store_name TEXT NOT NULL,
    current_price NUMERIC(10,2) NOT NULL,
    previous_price NUMERIC(10,2),
    offer_text TEXT,
    availability BOOLEAN NOT NULL DEFAULT true,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (product_id, store_name)
)
"#,
    )
    .await?;
    ctx.execute("CREATE INDEX idx_store_price_store ON store_price (store_name)")
        .await?;

    // Table: price_history
    //
    // Append-only. No FK to product: history outlives catalog rows.
    ctx.execute(
        r#"
CREATE TABLE price_history (
    id BIGSERIAL PRIMARY KEY,
    product_id TEXT NOT NULL,
    store_name TEXT NOT NULL,
    old_price NUMERIC(10,2) NOT NULL,
    new_price NUMERIC(10,2) NOT NULL,
    changed_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#,
    )
    .await?;
    ctx.execute(
        "CREATE INDEX idx_price_history_product ON price_history (product_id, store_name, changed_at)",
    )
    .await?;

    Ok(())
}
