//! Plain-text tables for terminal output.
//!
//! Everything here is pure string building, so the layouts can be pinned by
//! snapshot tests without a database.

use rust_decimal::Decimal;
use trolley::price::ProductPriceRow;
use trolley::signal::PendingPriority;
use trolley::{MigrationStatus, StoreSavings, StoreSwitch};

/// Stores ranked by basket total. EXTRA is the amount paid above the
/// cheapest store's total.
pub fn render_savings(rows: &[StoreSavings]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.store_name.clone(),
                money(r.total_cost),
                r.unavailable_items.to_string(),
                money(r.potential_savings),
                r.best_offers.join("; "),
            ]
        })
        .collect();
    table(&["STORE", "TOTAL", "MISSING", "EXTRA", "OFFERS"], &cells)
}

/// Candidate stores for a list switch, best first.
pub fn render_switches(rows: &[StoreSwitch]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.target_store.clone(),
                format!("{:.2}", r.recommendation_score),
                format!(
                    "{}/{}",
                    r.switchable_items,
                    r.switchable_items + r.unavailable_items
                ),
                money(r.total_cost),
                money(r.estimated_savings),
            ]
        })
        .collect();
    table(&["STORE", "SCORE", "ITEMS", "TOTAL", "SAVINGS"], &cells)
}

pub fn render_prices(rows: &[ProductPriceRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.brand.clone(),
                r.store_name.clone(),
                money(r.current_price),
                r.previous_price.map(money).unwrap_or_default(),
                if r.availability { "✓" } else { "✗" }.to_string(),
                r.offer_text.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["PRODUCT", "BRAND", "STORE", "PRICE", "WAS", "STOCK", "OFFER"],
        &cells,
    )
}

pub fn render_priorities(rows: &[PendingPriority]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.request_count.to_string(),
                r.product_search.clone(),
                r.store_name.clone().unwrap_or_else(|| "any".to_string()),
                r.source.clone(),
            ]
        })
        .collect();
    table(&["REQUESTS", "SEARCH", "STORE", "SOURCE"], &cells)
}

pub fn render_status(rows: &[MigrationStatus]) -> String {
    let mut out = String::new();
    for row in rows {
        if row.applied {
            out.push_str(&format!("✓ {}\n", row.version));
        } else {
            out.push_str(&format!("· {}  (pending)\n", row.version));
        }
    }
    out
}

fn money(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("-£{}", -value)
    } else {
        format!("£{}", value)
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(width(cell));
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        if i + 1 < cells.len() {
            for _ in width(cell)..widths[i] {
                line.push(' ');
            }
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

// Terminal cell width; output is ASCII plus single-width glyphs.
fn width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn savings_table_lines_up() {
        let rows = vec![
            StoreSavings {
                store_name: "Tesco".to_string(),
                total_cost: dec!(1.10),
                potential_savings: dec!(0.00),
                unavailable_items: 1,
                best_offers: vec![],
            },
            StoreSavings {
                store_name: "ASDA".to_string(),
                total_cost: dec!(1.85),
                potential_savings: dec!(0.75),
                unavailable_items: 0,
                best_offers: vec!["2 for £1.50".to_string()],
            },
        ];
        insta::assert_snapshot!(render_savings(&rows), @r"
        STORE  TOTAL  MISSING  EXTRA  OFFERS
        Tesco  £1.10  1        £0.00
        ASDA   £1.85  0        £0.75  2 for £1.50
        ");
    }

    #[test]
    fn switch_table_shows_negative_savings() {
        let rows = vec![
            StoreSwitch {
                target_store: "full_shop".to_string(),
                switchable_items: 3,
                unavailable_items: 0,
                total_cost: dec!(3.60),
                estimated_savings: dec!(-1.60),
                availability_score: 1.0,
                recommendation_score: 0.6,
            },
            StoreSwitch {
                target_store: "budget_mart".to_string(),
                switchable_items: 2,
                unavailable_items: 1,
                total_cost: dec!(2.00),
                estimated_savings: dec!(0.00),
                availability_score: 2.0 / 3.0,
                recommendation_score: 0.577_777_777_777_777_7,
            },
        ];
        insta::assert_snapshot!(render_switches(&rows), @r"
        STORE        SCORE  ITEMS  TOTAL  SAVINGS
        full_shop    0.60   3/3    £3.60  -£1.60
        budget_mart  0.58   2/3    £2.00  £0.00
        ");
    }

    #[test]
    fn price_table_flags_stock_and_previous_price() {
        let rows = vec![
            ProductPriceRow {
                product_id: "abc123".to_string(),
                name: "Tiger Bread".to_string(),
                brand: "Hovis".to_string(),
                store_name: "Morrisons".to_string(),
                current_price: dec!(1.15),
                previous_price: None,
                offer_text: None,
                availability: false,
            },
            ProductPriceRow {
                product_id: "abc123".to_string(),
                name: "Tiger Bread".to_string(),
                brand: "Hovis".to_string(),
                store_name: "ASDA".to_string(),
                current_price: dec!(1.25),
                previous_price: Some(dec!(1.40)),
                offer_text: Some("Rollback".to_string()),
                availability: true,
            },
        ];
        insta::assert_snapshot!(render_prices(&rows), @r"
        PRODUCT      BRAND  STORE      PRICE  WAS    STOCK  OFFER
        Tiger Bread  Hovis  Morrisons  £1.15         ✗
        Tiger Bread  Hovis  ASDA       £1.25  £1.40  ✓      Rollback
        ");
    }

    #[test]
    fn priority_table_spells_out_the_any_store() {
        let rows = vec![
            PendingPriority {
                product_search: "hovis bread".to_string(),
                store_name: None,
                source: "list".to_string(),
                request_count: 4,
                last_requested: Utc::now(),
            },
            PendingPriority {
                product_search: "pepsi".to_string(),
                store_name: Some("Tesco".to_string()),
                source: "search".to_string(),
                request_count: 1,
                last_requested: Utc::now(),
            },
        ];
        insta::assert_snapshot!(render_priorities(&rows), @r"
        REQUESTS  SEARCH       STORE  SOURCE
        4         hovis bread  any    list
        1         pepsi        Tesco  search
        ");
    }

    #[test]
    fn status_marks_pending_migrations() {
        let rows = vec![
            MigrationStatus {
                version: "2026_08_10_090000-create_catalog",
                name: "migrate",
                applied: true,
            },
            MigrationStatus {
                version: "2026_08_14_114500-create_signals",
                name: "migrate",
                applied: false,
            },
        ];
        insta::assert_snapshot!(render_status(&rows), @r"
        ✓ 2026_08_10_090000-create_catalog
        · 2026_08_14_114500-create_signals  (pending)
        ");
    }
}
