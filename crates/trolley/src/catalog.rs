//! Product catalog.
//!
//! Products are canonical: the same physical item ("Hovis Soft White 800g")
//! gets one row regardless of which store feed it arrived from. Identity is
//! derived from normalized name + brand, so feeds never need to coordinate
//! ids.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio_postgres::Row;

use crate::matching::like_pattern;
use crate::pool::ConnectionProvider;
use crate::Result;

/// A canonical product in the catalog.
#[derive(Debug, Clone)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    /// First price ever seen for this product. Written once, never revised;
    /// per-store truth lives in `store_price`.
    pub reference_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-product price spread across every store that carries it.
#[derive(Debug, Clone)]
pub struct PriceSpread {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub store_count: i64,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Average over carrying stores, rounded to 2 decimals in SQL.
    pub avg_price: Decimal,
}

/// Derive the canonical product id from name and brand.
///
/// Lowercases, collapses runs of non-alphanumerics, hashes with blake3 and
/// keeps 12 hex chars. "Hovis Soft White 800g" and "hovis  soft white 800G"
/// map to the same id; a different brand always gets a different id.
pub fn canonical_product_id(name: &str, brand: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(normalize(name).as_bytes());
    hasher.update(b"\0");
    hasher.update(normalize(brand).as_bytes());
    let hex = hasher.finalize().to_hex();
    hex[..12].to_string()
}

fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lc in c.to_lowercase() {
                out.push(lc);
            }
        } else {
            pending_space = true;
        }
    }
    out
}

/// Insert or refresh a catalog product, returning its canonical id.
///
/// Name, brand and category are refreshed on conflict; `reference_price` is
/// written on first insert only.
pub async fn upsert_product<P: ConnectionProvider>(
    provider: &P,
    name: &str,
    brand: &str,
    category: &str,
    reference_price: Option<Decimal>,
) -> Result<String> {
    let product_id = canonical_product_id(name, brand);
    let conn = provider.get().await?;
    conn.execute(
        r#"
INSERT INTO product (product_id, name, brand, category, reference_price)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (product_id) DO UPDATE
   SET name = EXCLUDED.name,
       brand = EXCLUDED.brand,
       category = EXCLUDED.category,
       updated_at = now()
"#,
        &[&product_id, &name, &brand, &category, &reference_price],
    )
    .await?;
    Ok(product_id)
}

/// Fetch a product by canonical id.
pub async fn get_product<P: ConnectionProvider>(
    provider: &P,
    product_id: &str,
) -> Result<Option<Product>> {
    let conn = provider.get().await?;
    let row = conn
        .query_opt(
            "SELECT product_id, name, brand, category, reference_price, created_at, updated_at
               FROM product WHERE product_id = $1",
            &[&product_id],
        )
        .await?;
    Ok(row.as_ref().map(product_from_row))
}

/// National price comparison: per-product min/max/average across stores.
///
/// Only available prices count. `brand` and `category` filter by
/// case-insensitive containment. Cheapest products first.
pub async fn price_comparison<P: ConnectionProvider>(
    provider: &P,
    brand: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<PriceSpread>> {
    let brand_pattern = brand.map(like_pattern);
    let category_pattern = category.map(like_pattern);
    let conn = provider.get().await?;
    let rows = conn
        .query(
            r#"
SELECT p.product_id, p.name, p.brand, p.category,
       count(*) AS store_count,
       min(sp.current_price) AS min_price,
       max(sp.current_price) AS max_price,
       round(avg(sp.current_price), 2) AS avg_price
  FROM product p
  JOIN store_price sp USING (product_id)
 WHERE sp.availability
   AND ($1::text IS NULL OR p.brand ILIKE $1)
   AND ($2::text IS NULL OR p.category ILIKE $2)
 GROUP BY p.product_id, p.name, p.brand, p.category
 ORDER BY min_price, p.product_id
"#,
            &[&brand_pattern, &category_pattern],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| PriceSpread {
            product_id: row.get(0),
            name: row.get(1),
            brand: row.get(2),
            category: row.get(3),
            store_count: row.get(4),
            min_price: row.get(5),
            max_price: row.get(6),
            avg_price: row.get(7),
        })
        .collect())
}

fn product_from_row(row: &Row) -> Product {
    Product {
        product_id: row.get(0),
        name: row.get(1),
        brand: row.get(2),
        category: row.get(3),
        reference_price: row.get(4),
        created_at: row.get(5),
        updated_at: row.get(6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_ignores_case_and_spacing() {
        let a = canonical_product_id("Hovis Soft White 800g", "Hovis");
        let b = canonical_product_id("hovis  soft white 800G", "HOVIS");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn canonical_id_separates_brands() {
        let a = canonical_product_id("Soft White 800g", "Hovis");
        let b = canonical_product_id("Soft White 800g", "Warburtons");
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_id_keeps_name_and_brand_apart() {
        // "ab" + "c" must not collide with "a" + "bc"
        let a = canonical_product_id("ab", "c");
        let b = canonical_product_id("a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn normalize_collapses_punctuation() {
        assert_eq!(normalize("Coca-Cola  330ml (can)"), "coca cola 330ml can");
        assert_eq!(normalize("  Pepsi "), "pepsi");
        assert_eq!(normalize(""), "");
    }
}
