//! Store-switch recommender: should this list move to another store?
//!
//! Scores every candidate store for a shopping list, weighing how much of
//! the list it can fulfil against what the fulfilled part costs. Availability
//! dominates the blend because a missing item forces a second trip.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::matching::ProductMatcher;
use crate::pool::ConnectionProvider;
use crate::savings::{cheapest_picks, CheapestPick};
use crate::{Error, Result};

const AVAILABILITY_WEIGHT: f64 = 0.6;
const COST_WEIGHT: f64 = 0.4;

/// One candidate store for a list switch.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSwitch {
    pub target_store: String,
    /// List items this store can fulfil.
    pub switchable_items: usize,
    pub unavailable_items: usize,
    /// Quantity-weighted cost of the fulfillable part of the list.
    pub total_cost: Decimal,
    /// Cheapest candidate's total minus this store's total. 0 for the
    /// cheapest candidate, negative for costlier ones.
    pub estimated_savings: Decimal,
    /// Fraction of list items available here, in [0, 1].
    pub availability_score: f64,
    /// Weighted blend of availability and relative cost, in [0, 1].
    pub recommendation_score: f64,
}

/// Rank candidate stores for a shopping list, best first.
///
/// Fails with [`Error::ListNotFound`] when the list does not exist and
/// [`Error::EmptyList`] when it has no items; a recommendation over nothing
/// is meaningless and a silent empty answer would hide caller bugs. Stores
/// matching zero items are excluded.
pub async fn recommend_store_switch<P, M>(
    provider: &P,
    matcher: &M,
    list_id: i64,
    store_scope: Option<&str>,
) -> Result<Vec<StoreSwitch>>
where
    P: ConnectionProvider,
    M: ProductMatcher,
{
    let conn = provider.get().await?;
    let client = &*conn;

    let list = client
        .query_opt("SELECT id FROM shopping_list WHERE id = $1", &[&list_id])
        .await?;
    if list.is_none() {
        return Err(Error::ListNotFound { list_id });
    }

    let rows = client
        .query(
            "SELECT product_name, quantity FROM shopping_list_item
              WHERE list_id = $1 ORDER BY position",
            &[&list_id],
        )
        .await?;
    if rows.is_empty() {
        return Err(Error::EmptyList { list_id });
    }

    let mut fragments = Vec::with_capacity(rows.len());
    let mut quantities = Vec::with_capacity(rows.len());
    for row in &rows {
        fragments.push(row.get::<_, String>(0));
        quantities.push(row.get::<_, i32>(1));
    }

    let matches = matcher.resolve(client, &fragments).await?;
    let picks = cheapest_picks(client, &matches, store_scope).await?;
    Ok(fold_switch(&quantities, picks))
}

fn fold_switch(quantities: &[i32], picks: Vec<CheapestPick>) -> Vec<StoreSwitch> {
    struct Acc {
        total: Decimal,
        matched: usize,
    }

    let n_items = quantities.len();
    let mut stores: BTreeMap<String, Acc> = BTreeMap::new();
    for pick in picks {
        let qty = Decimal::from(quantities[pick.item]);
        let acc = stores.entry(pick.store).or_insert(Acc {
            total: Decimal::ZERO,
            matched: 0,
        });
        acc.total += pick.price * qty;
        acc.matched += 1;
    }

    let (min_total, max_total) = match (
        stores.values().map(|acc| acc.total).min(),
        stores.values().map(|acc| acc.total).max(),
    ) {
        (Some(min), Some(max)) => (min, max),
        _ => return Vec::new(),
    };

    let mut out: Vec<StoreSwitch> = stores
        .into_iter()
        .map(|(target_store, acc)| {
            let availability_score = acc.matched as f64 / n_items as f64;
            let cost_term = if max_total > Decimal::ZERO {
                1.0 - (acc.total / max_total).to_f64().unwrap_or(1.0)
            } else {
                // all totals are zero, cost differentiates nothing
                0.0
            };
            StoreSwitch {
                switchable_items: acc.matched,
                unavailable_items: n_items - acc.matched,
                total_cost: acc.total,
                estimated_savings: min_total - acc.total,
                availability_score,
                recommendation_score: AVAILABILITY_WEIGHT * availability_score
                    + COST_WEIGHT * cost_term,
                target_store,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.recommendation_score
            .partial_cmp(&a.recommendation_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.target_store.cmp(&b.target_store))
    });
    out
}
