//! Savings analyzer: where would this basket be cheapest?
//!
//! Takes free-text item names, matches them against the catalog, and totals
//! the cheapest available variant of each item per store. The database does
//! variant selection in one query; the totalling fold is pure Rust so its
//! edge cases stay unit-testable.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tokio_postgres::Client;

use crate::matching::ProductMatcher;
use crate::pool::ConnectionProvider;
use crate::Result;

/// One store's result for a basket of items.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSavings {
    pub store_name: String,
    /// Sum of the cheapest available matching variant per matched item.
    pub total_cost: Decimal,
    /// Amount above the cheapest store's total. 0 for the cheapest store.
    pub potential_savings: Decimal,
    /// Items with no available match at this store.
    pub unavailable_items: usize,
    /// Offer texts attached to the chosen variants, deduplicated.
    pub best_offers: Vec<String>,
}

/// Cheapest available variant of one basket item at one store.
#[derive(Debug)]
pub(crate) struct CheapestPick {
    /// 0-based index into the basket.
    pub item: usize,
    pub store: String,
    pub price: Decimal,
    pub offer: Option<String>,
}

/// Analyze a basket across stores.
///
/// Results are sorted by total cost ascending (ties by store name). Stores
/// matching none of the items do not appear; an empty basket or a basket
/// matching nothing anywhere yields an empty vec, not an error.
/// `store_scope` restricts candidates by case-insensitive name equality.
pub async fn analyze_savings<P, M>(
    provider: &P,
    matcher: &M,
    items: &[String],
    store_scope: Option<&str>,
) -> Result<Vec<StoreSavings>>
where
    P: ConnectionProvider,
    M: ProductMatcher,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let conn = provider.get().await?;
    let client = &*conn;
    let matches = matcher.resolve(client, items).await?;
    let picks = cheapest_picks(client, &matches, store_scope).await?;
    Ok(fold_savings(items.len(), picks))
}

/// Pick the cheapest available variant per (item, store) in one query.
///
/// `matches[i]` holds the candidate product ids for item `i`; the pairs are
/// flattened into parallel arrays so the whole selection is a single round
/// trip regardless of basket size.
pub(crate) async fn cheapest_picks(
    client: &Client,
    matches: &[Vec<String>],
    store_scope: Option<&str>,
) -> Result<Vec<CheapestPick>> {
    let mut ords: Vec<i32> = Vec::new();
    let mut ids: Vec<&str> = Vec::new();
    for (i, set) in matches.iter().enumerate() {
        for id in set {
            ords.push(i as i32 + 1);
            ids.push(id.as_str());
        }
    }
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = client
        .query(
            r#"
SELECT DISTINCT ON (m.ord, sp.store_name)
       m.ord, sp.store_name, sp.current_price, sp.offer_text
  FROM unnest($1::int4[], $2::text[]) AS m(ord, product_id)
  JOIN store_price sp ON sp.product_id = m.product_id
 WHERE sp.availability
   AND ($3::text IS NULL OR lower(sp.store_name) = lower($3))
 ORDER BY m.ord, sp.store_name, sp.current_price, sp.product_id
"#,
            &[&ords, &ids, &store_scope],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| CheapestPick {
            item: row.get::<_, i32>(0) as usize - 1,
            store: row.get(1),
            price: row.get(2),
            offer: row.get(3),
        })
        .collect())
}

fn fold_savings(n_items: usize, picks: Vec<CheapestPick>) -> Vec<StoreSavings> {
    struct Acc {
        total: Decimal,
        matched: usize,
        offers: Vec<String>,
    }

    let mut stores: BTreeMap<String, Acc> = BTreeMap::new();
    for pick in picks {
        let acc = stores.entry(pick.store).or_insert(Acc {
            total: Decimal::ZERO,
            matched: 0,
            offers: Vec::new(),
        });
        acc.total += pick.price;
        acc.matched += 1;
        if let Some(offer) = pick.offer {
            if !offer.is_empty() && !acc.offers.contains(&offer) {
                acc.offers.push(offer);
            }
        }
    }

    let min_total = match stores.values().map(|acc| acc.total).min() {
        Some(min) => min,
        None => return Vec::new(),
    };

    let mut out: Vec<StoreSavings> = stores
        .into_iter()
        .map(|(store_name, acc)| StoreSavings {
            store_name,
            total_cost: acc.total,
            potential_savings: acc.total - min_total,
            unavailable_items: n_items - acc.matched,
            best_offers: acc.offers,
        })
        .collect();
    out.sort_by(|a, b| {
        a.total_cost
            .cmp(&b.total_cost)
            .then_with(|| a.store_name.cmp(&b.store_name))
    });
    out
}
