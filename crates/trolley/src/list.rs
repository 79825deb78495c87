//! Shoppers and shopping lists.
//!
//! [`ListStore`] owns every list mutation. When wired with a
//! [`SignalSender`], adding an item also emits a crawl-priority signal for
//! the item's product name; the emission is best-effort and never affects
//! whether the item is persisted.

use chrono::{DateTime, Utc};
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

use crate::pool::ConnectionProvider;
use crate::signal::{PrioritySignal, SignalSender, SignalSource};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct ShoppingList {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    /// Shared lists are visible to other shoppers. Persisted verbatim;
    /// enforcement belongs to the caller.
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
}

/// A list row joined with its item count, for overview screens.
#[derive(Debug, Clone)]
pub struct ListSummary {
    pub id: i64,
    pub name: String,
    pub is_shared: bool,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ShoppingListItem {
    pub id: i64,
    pub list_id: i64,
    /// Free text as the shopper typed it, not a catalog reference.
    pub product_name: String,
    pub quantity: i32,
    /// Stores the shopper wants this item priced at; empty means any.
    pub preferred_stores: Vec<String>,
    pub is_completed: bool,
    pub position: i32,
    pub added_at: DateTime<Utc>,
}

/// Register a shopper, returning the new id.
pub async fn create_shopper<P: ConnectionProvider>(
    provider: &P,
    email: &str,
    display_name: &str,
) -> Result<i64> {
    let conn = provider.get().await?;
    let row = conn
        .query_one(
            "INSERT INTO shopper (email, display_name) VALUES ($1, $2) RETURNING id",
            &[&email, &display_name],
        )
        .await?;
    Ok(row.get(0))
}

/// Delete a shopper and, via cascade, their lists and items.
pub async fn delete_shopper<P: ConnectionProvider>(provider: &P, shopper_id: i64) -> Result<bool> {
    let conn = provider.get().await?;
    let n = conn
        .execute("DELETE FROM shopper WHERE id = $1", &[&shopper_id])
        .await?;
    Ok(n > 0)
}

/// Store for shopping lists and their items.
pub struct ListStore<P> {
    provider: P,
    signals: Option<SignalSender>,
}

impl<P: ConnectionProvider> ListStore<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            signals: None,
        }
    }

    /// Emit a crawl-priority signal whenever an item is added.
    pub fn with_signals(mut self, signals: SignalSender) -> Self {
        self.signals = Some(signals);
        self
    }

    pub async fn create_list(&self, owner_id: i64, name: &str, is_shared: bool) -> Result<i64> {
        let conn = self.provider.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO shopping_list (owner_id, name, is_shared)
                 VALUES ($1, $2, $3) RETURNING id",
                &[&owner_id, &name, &is_shared],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn get_list(&self, list_id: i64) -> Result<Option<ShoppingList>> {
        let conn = self.provider.get().await?;
        let row = conn
            .query_opt(
                "SELECT id, owner_id, name, is_shared, created_at
                   FROM shopping_list WHERE id = $1",
                &[&list_id],
            )
            .await?;
        Ok(row.map(|row| ShoppingList {
            id: row.get(0),
            owner_id: row.get(1),
            name: row.get(2),
            is_shared: row.get(3),
            created_at: row.get(4),
        }))
    }

    /// Delete a list the shopper owns. Items cascade. Returns whether a
    /// row matched; someone else's list id matches nothing.
    pub async fn delete_list(&self, owner_id: i64, list_id: i64) -> Result<bool> {
        let conn = self.provider.get().await?;
        let n = conn
            .execute(
                "DELETE FROM shopping_list WHERE id = $1 AND owner_id = $2",
                &[&list_id, &owner_id],
            )
            .await?;
        Ok(n > 0)
    }

    /// All of a shopper's lists, newest first, with item counts.
    pub async fn lists_for(&self, owner_id: i64) -> Result<Vec<ListSummary>> {
        let conn = self.provider.get().await?;
        let rows = conn
            .query(
                "SELECT l.id, l.name, l.is_shared, count(i.id), l.created_at
                   FROM shopping_list l
                   LEFT JOIN shopping_list_item i ON i.list_id = l.id
                  WHERE l.owner_id = $1
                  GROUP BY l.id
                  ORDER BY l.created_at DESC, l.id DESC",
                &[&owner_id],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| ListSummary {
                id: row.get(0),
                name: row.get(1),
                is_shared: row.get(2),
                item_count: row.get(3),
                created_at: row.get(4),
            })
            .collect())
    }

    /// Append an item to a list, returning the new item id.
    ///
    /// The item lands after every existing position. Unknown lists surface
    /// as [`Error::ListNotFound`] rather than a raw constraint violation.
    pub async fn add_item(
        &self,
        list_id: i64,
        product_name: &str,
        quantity: i32,
        preferred_stores: &[String],
    ) -> Result<i64> {
        let conn = self.provider.get().await?;
        let result = conn
            .query_one(
                "INSERT INTO shopping_list_item
                        (list_id, product_name, quantity, preferred_stores, position)
                 SELECT $1, $2, $3, $4, coalesce(max(position) + 1, 0)
                   FROM shopping_list_item WHERE list_id = $1
                 RETURNING id",
                &[&list_id, &product_name, &quantity, &preferred_stores],
            )
            .await;
        let row = match result {
            Ok(row) => row,
            Err(e) if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) => {
                return Err(Error::ListNotFound { list_id });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(signals) = &self.signals {
            signals.emit(PrioritySignal {
                product_search: product_name.to_string(),
                stores: preferred_stores.to_vec(),
                source: SignalSource::List,
            });
        }
        Ok(row.get(0))
    }

    /// A list's items in shopper order.
    pub async fn items(&self, list_id: i64) -> Result<Vec<ShoppingListItem>> {
        let conn = self.provider.get().await?;
        let rows = conn
            .query(
                "SELECT id, list_id, product_name, quantity, preferred_stores,
                        is_completed, position, added_at
                   FROM shopping_list_item
                  WHERE list_id = $1
                  ORDER BY position, id",
                &[&list_id],
            )
            .await?;
        Ok(rows.iter().map(item_from_row).collect())
    }

    /// Tick or untick an item. Returns whether a row matched.
    pub async fn set_completed(&self, item_id: i64, is_completed: bool) -> Result<bool> {
        let conn = self.provider.get().await?;
        let n = conn
            .execute(
                "UPDATE shopping_list_item SET is_completed = $2 WHERE id = $1",
                &[&item_id, &is_completed],
            )
            .await?;
        Ok(n > 0)
    }

    pub async fn remove_item(&self, item_id: i64) -> Result<bool> {
        let conn = self.provider.get().await?;
        let n = conn
            .execute(
                "DELETE FROM shopping_list_item WHERE id = $1",
                &[&item_id],
            )
            .await?;
        Ok(n > 0)
    }
}

fn item_from_row(row: &Row) -> ShoppingListItem {
    ShoppingListItem {
        id: row.get(0),
        list_id: row.get(1),
        product_name: row.get(2),
        quantity: row.get(3),
        preferred_stores: row.get(4),
        is_completed: row.get(5),
        position: row.get(6),
        added_at: row.get(7),
    }
}
