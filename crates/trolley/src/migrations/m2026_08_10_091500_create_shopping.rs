//! Migration: create-shopping
//! Created: 2026-08-10 09:15:00 BST

use crate::{MigrationContext, Result};

crate::migration!("2026_08_10_091500-create_shopping", migrate);

pub async fn migrate(ctx: &mut MigrationContext<'_>) -> Result<()> {
    // Table: shopper
    ctx.execute(
        r#"
CREATE TABLE shopper (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#,
    )
    .await?;

    // Table: shopping_list
    //
    // Deleting a shopper cascades through lists to items.
    ctx.execute(
        r#"
CREATE TABLE shopping_list (
    id BIGSERIAL PRIMARY KEY,
    owner_id BIGINT NOT NULL REFERENCES shopper(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    is_shared BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#,
    )
    .await?;
    ctx.execute("CREATE INDEX idx_shopping_list_owner ON shopping_list (owner_id)")
        .await?;

    // Table: shopping_list_item
    //
    // product_name is free text typed by the shopper, matched against the
    // catalog at analysis time. position keeps the list ordered.
    ctx.execute(
        r#"
CREATE TABLE shopping_list_item (
    id BIGSERIAL PRIMARY KEY,
    list_id BIGINT NOT NULL REFERENCES shopping_list(id) ON DELETE CASCADE,
    product_name TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 1,
    preferred_stores TEXT[] NOT NULL DEFAULT '{}',
    is_completed BOOLEAN NOT NULL DEFAULT false,
    position INTEGER NOT NULL,
    added_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#,
    )
    .await?;
    ctx.execute("CREATE INDEX idx_shopping_list_item_list ON shopping_list_item (list_id)")
        .await?;

    Ok(())
}
