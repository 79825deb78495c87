#![allow(clippy::result_large_err)]

//! Price comparison and savings analysis over Postgres.
//!
//! This crate is the storage and analysis core behind a grocery
//! price-comparison service. It provides:
//!
//! - A catalog of branded products with per-store prices and an append-only
//!   price history
//! - A savings analyzer: where would this basket of items be cheapest?
//! - A store-switch recommender: should this shopping list move to another
//!   store, weighing availability against cost?
//! - Shopping lists whose items feed a crawl-priority queue, so crawlers
//!   refresh the prices people actually care about
//! - Database migrations as Rust functions
//!
//! # Naming Convention
//!
//! **Table names use singular form** (e.g., `product`, `store_price`,
//! `shopping_list`).
//!
//! This convention treats each table as a definition of what a single record
//! represents, rather than a container of multiple records. It reads more
//! naturally in code: "a store_price row" is one store's price for one
//! product, and foreign keys like `product_id` reference "the product table".
//!
//! Junction-style tables use singular forms joined by underscore:
//! `shopping_list_item`, `store_promotion`.
//!
//! # Migrations
//!
//! Migrations are async Rust functions registered with the [`migration!`]
//! macro. The version prefix keeps them sortable:
//!
//! ```ignore
//! async fn migrate(ctx: &mut MigrationContext<'_>) -> Result<()> {
//!     ctx.execute("CREATE TABLE product (...)").await?;
//!     Ok(())
//! }
//!
//! trolley::migration!("2026_08_10_090000-create_catalog", migrate);
//! ```
//!
//! Run them with [`MigrationRunner`]:
//!
//! ```ignore
//! let mut runner = MigrationRunner::new(&mut client);
//! runner.migrate().await?;
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod catalog;
mod error;
pub mod list;
pub mod matching;
mod migrate;
mod migrations;
pub mod pool;
pub mod price;
pub mod promo;
pub mod savings;
pub mod signal;
pub mod switch;

pub use catalog::Product;
pub use error::Error;
pub use list::{ListStore, ShoppingList, ShoppingListItem};
pub use matching::{ProductMatcher, SubstringMatcher};
pub use migrate::{Migration, MigrationContext, MigrationRunner, MigrationStatus};
pub use pool::{ConnectionProvider, connect};
pub use price::{PriceChange, PriceUpdate, StorePrice};
pub use savings::{StoreSavings, analyze_savings};
pub use signal::{PrioritySignal, SignalRecorder, SignalSender, signal_channel};
pub use switch::{StoreSwitch, recommend_store_switch};

// Re-export inventory for the migration! macro
pub use inventory;

/// Result type for trolley operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Type alias for migration functions.
///
/// Migration functions are async functions that take a mutable reference to a
/// [`MigrationContext`] and return `Result<()>`. The [`migration!`] macro
/// wraps them into this boxed form for the registry.
pub type MigrationFn = for<'a> fn(
    &'a mut MigrationContext<'a>,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

// Register Migration with inventory
inventory::collect!(Migration);
