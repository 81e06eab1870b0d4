use currency_info_bot::market::{ListingRequest, MAX_LISTING_LIMIT, MIN_LISTING_LIMIT};
use currency_info_bot::normalize::{normalize_currencies, normalize_sort_field};
use currency_info_bot::tables::{LookupTables, SortField};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn tables() -> LookupTables {
    let currencies = HashMap::from([
        ("btc".to_string(), "BTC".to_string()),
        ("bitcoin".to_string(), "BTC".to_string()),
        ("eth".to_string(), "ETH".to_string()),
        ("ether".to_string(), "ETH".to_string()),
        ("xrp".to_string(), "XRP".to_string()),
    ]);
    let sorts = HashMap::from([
        ("price".to_string(), "price".to_string()),
        ("cap".to_string(), "market_cap".to_string()),
        ("volume".to_string(), "volume_24h".to_string()),
    ]);
    LookupTables::from_maps(currencies, sorts).expect("valid tables")
}

proptest! {
    /// Every output symbol is a table value, and none repeats.
    #[test]
    fn currencies_are_known_and_unique(
        raw in prop::collection::vec("(btc|BTC|bitcoin|eth|Ether|xrp|doge|[a-z]{1,6})", 0..12)
    ) {
        let tables = tables();
        let known: HashSet<&str> = ["BTC", "ETH", "XRP"].into_iter().collect();

        let symbols = normalize_currencies(&tables, &raw);

        prop_assert!(symbols.iter().all(|s| known.contains(s.as_str())), "{:?}", symbols);
        let unique: HashSet<&String> = symbols.iter().collect();
        prop_assert_eq!(unique.len(), symbols.len());
    }

    /// Output follows the order in which each symbol was first mentioned.
    #[test]
    fn currencies_keep_first_mention_order(
        raw in prop::collection::vec("(btc|bitcoin|eth|ether|xrp|nope)", 0..12)
    ) {
        let tables = tables();

        let mut expected: Vec<String> = Vec::new();
        for token in &raw {
            if let Some(symbol) = tables.currency(token) {
                if !expected.iter().any(|s| s == symbol) {
                    expected.push(symbol.to_string());
                }
            }
        }

        prop_assert_eq!(normalize_currencies(&tables, &raw), expected);
    }

    /// Without any known alias the sort field is always price.
    #[test]
    fn unknown_sort_tokens_fall_back_to_price(raw in prop::collection::vec("[0-9]{1,4}", 0..6)) {
        prop_assert_eq!(normalize_sort_field(&tables(), &raw), SortField::Price);
    }

    /// The first known alias wins, wherever it appears.
    #[test]
    fn first_known_sort_alias_wins(
        before in prop::collection::vec("[0-9]{1,4}", 0..4),
        alias in "(cap|volume)",
        after in prop::collection::vec("(cap|volume|price)", 0..4)
    ) {
        let expected = if alias == "cap" { SortField::MarketCap } else { SortField::Volume24h };
        let raw: Vec<String> = before.into_iter().chain(std::iter::once(alias)).chain(after).collect();

        prop_assert_eq!(normalize_sort_field(&tables(), &raw), expected);
    }

    /// Any requested count ends up inside the accepted listing range.
    #[test]
    fn listing_limit_is_clamped(count in any::<i64>()) {
        let request = ListingRequest::new(count, SortField::Price);
        prop_assert!((MIN_LISTING_LIMIT..=MAX_LISTING_LIMIT).contains(&request.limit));
    }
}
