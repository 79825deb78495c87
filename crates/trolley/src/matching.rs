//! Product matching strategies.
//!
//! Shopping-list items are free text ("bread", "pepsi 330ml"); analyzers
//! resolve them to catalog products through a [`ProductMatcher`]. The default
//! [`SubstringMatcher`] does case-insensitive containment against product
//! names. The trait is the seam where a real search index could be swapped in
//! without touching analyzer logic.

use std::future::Future;

use tokio_postgres::Client;

use crate::Result;

/// Resolves free-text item fragments to canonical product ids.
pub trait ProductMatcher: Send + Sync {
    /// Resolve each fragment to the product ids it matches.
    ///
    /// The outer vec mirrors `fragments`: `out[i]` holds the matches for
    /// `fragments[i]`, empty when nothing matched. Implementations should
    /// batch; analyzers call this once per analysis.
    fn resolve(
        &self,
        client: &Client,
        fragments: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<String>>>> + Send;
}

/// Case-insensitive substring matching against `product.name`.
///
/// "bread" matches "Hovis Soft White Bread 800g". All fragments resolve in
/// a single round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl ProductMatcher for SubstringMatcher {
    async fn resolve(&self, client: &Client, fragments: &[String]) -> Result<Vec<Vec<String>>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }
        let patterns: Vec<String> = fragments.iter().map(|f| like_pattern(f)).collect();
        let rows = client
            .query(
                r#"
SELECT f.ord, p.product_id
  FROM unnest($1::text[]) WITH ORDINALITY AS f(pattern, ord)
  JOIN product p ON p.name ILIKE f.pattern
 ORDER BY f.ord, p.product_id
"#,
                &[&patterns],
            )
            .await?;

        // ord is 1-based
        let mut out = vec![Vec::new(); fragments.len()];
        for row in &rows {
            let ord: i64 = row.get(0);
            out[ord as usize - 1].push(row.get(1));
        }
        Ok(out)
    }
}

/// Build an ILIKE containment pattern from user text.
///
/// `%`, `_` and `\` in the input are escaped so they match literally.
pub fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_with_wildcards() {
        assert_eq!(like_pattern("bread"), "%bread%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn pattern_escapes_like_metacharacters() {
        assert_eq!(like_pattern("100% juice"), "%100\\% juice%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }
}
