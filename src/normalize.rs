//! Intent parameter normalization
//!
//! Maps raw tokens extracted by the intent service onto the canonical values
//! the market API understands.

use crate::tables::{LookupTables, SortField};

/// Alias looked up when no supplied sort token matches
pub const DEFAULT_SORT_ALIAS: &str = "price";

/// Resolve currency names and tickers to canonical symbols.
///
/// Matching is case-insensitive. Unknown tokens are dropped without error,
/// duplicates collapse to their first occurrence and order is preserved.
///
/// # Examples
///
/// ```
/// use currency_info_bot::normalize::normalize_currencies;
/// use currency_info_bot::tables::LookupTables;
/// use std::collections::HashMap;
///
/// let currencies = HashMap::from([("btc".to_string(), "BTC".to_string())]);
/// let tables = LookupTables::from_maps(currencies, HashMap::new()).unwrap();
/// assert_eq!(normalize_currencies(&tables, &["Btc", "doge"]), vec!["BTC"]);
/// ```
#[must_use]
pub fn normalize_currencies<S: AsRef<str>>(tables: &LookupTables, raw: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(raw.len());
    for token in raw {
        let alias = token.as_ref().trim().to_lowercase();
        if let Some(symbol) = tables.currency(&alias) {
            if !normalized.iter().any(|seen| seen == symbol) {
                normalized.push(symbol.to_string());
            }
        }
    }
    normalized
}

/// Resolve the first recognised sort token, falling back to price.
///
/// Every token is tried in turn; the default applies only when none of them
/// is in the table.
#[must_use]
pub fn normalize_sort_field<S: AsRef<str>>(tables: &LookupTables, raw: &[S]) -> SortField {
    raw.iter()
        .find_map(|token| tables.sort_field(&token.as_ref().trim().to_lowercase()))
        .or_else(|| tables.sort_field(DEFAULT_SORT_ALIAS))
        .unwrap_or_default()
}
