//! Response formatting
//!
//! Renders market data as Telegram HTML. Coin names and symbols come from
//! a third party and are always escaped.

use crate::intent::{LISTING_INTENT, QUOTES_INTENT};
use crate::market::CoinQuote;
use crate::tables::SortField;
use html_escape::encode_text;
use std::fmt::Write;

/// Reply for an intent with no known rendering
pub const UNKNOWN_FORMAT: &str = "Unknown format!";
/// Reply when the market API returned nothing
pub const NO_DATA: &str = "No data found.";

const MISSING: &str = "n/a";

/// Render `coins` for the intent that requested them.
///
/// `sort` only matters for listings and defaults to price.
#[must_use]
pub fn format_response(coins: &[CoinQuote], intent_name: &str, sort: Option<SortField>) -> String {
    match intent_name {
        QUOTES_INTENT => format_quotes(coins),
        LISTING_INTENT => format_listing(coins, sort.unwrap_or_default()),
        _ => UNKNOWN_FORMAT.to_string(),
    }
}

/// One line per coin and target currency, plus the freshest update time
#[must_use]
pub fn format_quotes(coins: &[CoinQuote]) -> String {
    if coins.is_empty() {
        return NO_DATA.to_string();
    }

    let mut lines = Vec::new();
    for coin in coins {
        for (currency, value) in &coin.quote {
            let price = value.price.map_or_else(|| MISSING.to_string(), format_amount);
            let mut line = format!(
                "<b>{}</b> ({}): {price} {}",
                encode_text(&coin.symbol),
                encode_text(&coin.name),
                encode_text(currency)
            );
            if let Some(change) = value.percent_change_24h {
                let _ = write!(line, " ({change:+.2}% 24h)");
            }
            lines.push(line);
        }
    }

    let updated = coins
        .iter()
        .flat_map(|coin| coin.quote.values())
        .filter_map(|value| value.last_updated)
        .max();
    if let Some(updated) = updated {
        lines.push(format!("<i>Updated {}</i>", updated.format("%Y-%m-%d %H:%M UTC")));
    }

    lines.join("\n")
}

/// Ranked table in the order the API returned, showing the sort column
#[must_use]
pub fn format_listing(coins: &[CoinQuote], sort: SortField) -> String {
    if coins.is_empty() {
        return NO_DATA.to_string();
    }

    let mut out = format!("<b>Top {} by {}:</b>", coins.len(), sort.label());
    for (index, coin) in coins.iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {} ({}): {}",
            index + 1,
            encode_text(&coin.name),
            encode_text(&coin.symbol),
            sort_value(coin, sort)
        );
    }
    out
}

fn sort_value(coin: &CoinQuote, sort: SortField) -> String {
    let Some((currency, quote)) = coin.quote.iter().next() else {
        return MISSING.to_string();
    };

    let money = |value: Option<f64>| {
        value.map_or_else(
            || MISSING.to_string(),
            |v| format!("{} {}", format_amount(v), encode_text(currency)),
        )
    };
    let percent =
        |value: Option<f64>| value.map_or_else(|| MISSING.to_string(), |v| format!("{v:+.2}%"));
    let plain = |value: Option<f64>| value.map_or_else(|| MISSING.to_string(), format_amount);

    match sort {
        SortField::MarketCap => money(quote.market_cap),
        SortField::Volume24h => money(quote.volume_24h),
        SortField::PercentChange1h => percent(quote.percent_change_1h),
        SortField::PercentChange24h => percent(quote.percent_change_24h),
        SortField::PercentChange7d => percent(quote.percent_change_7d),
        SortField::CirculatingSupply => plain(coin.circulating_supply),
        SortField::TotalSupply => plain(coin.total_supply),
        SortField::MaxSupply => plain(coin.max_supply),
        SortField::NumMarketPairs => coin
            .num_market_pairs
            .map_or_else(|| MISSING.to_string(), |n| n.to_string()),
        SortField::DateAdded => coin.date_added.map_or_else(
            || MISSING.to_string(),
            |date| date.format("%Y-%m-%d").to_string(),
        ),
        SortField::Price | SortField::Name | SortField::Symbol => money(quote.price),
    }
}

/// Human friendly amount.
///
/// Values of at least one get thousands separators and two decimals;
/// smaller values keep up to six decimals so fractions of a cent survive.
///
/// # Examples
///
/// ```
/// use currency_info_bot::format::format_amount;
///
/// assert_eq!(format_amount(64123.5), "64,123.50");
/// assert_eq!(format_amount(0.5), "0.5");
/// ```
#[must_use]
pub fn format_amount(value: f64) -> String {
    if value.abs() < 1.0 {
        let fixed = format!("{value:.6}");
        return fixed.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
