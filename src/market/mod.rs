//! Price and listing data
//!
//! Typed requests built by the dispatcher, the response model shared with
//! the formatter, and the [`PriceService`] seam over the market API.

mod coinmarketcap;

pub use coinmarketcap::CoinMarketCapClient;

use crate::http_utils::TransportError;
use crate::tables::SortField;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Target currency used for every listing
pub const LISTING_TARGET: &str = "USD";
/// Smallest listing the bot will request
pub const MIN_LISTING_LIMIT: u32 = 1;
/// Largest listing the bot will request
pub const MAX_LISTING_LIMIT: u32 = 1000;
/// Listing size when the user did not give one
pub const DEFAULT_LISTING_LIMIT: u32 = 10;

/// Currency or currencies a quote is converted into
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    /// Let the market API pick its default (USD)
    #[default]
    Default,
    /// One currency, upper-cased
    Single(String),
    /// Several currencies, as supplied
    Many(Vec<String>),
}

impl Target {
    /// Value of the `convert` query parameter, if any
    #[must_use]
    pub fn as_query(&self) -> Option<String> {
        match self {
            Self::Default => None,
            Self::Single(code) => Some(code.clone()),
            Self::Many(codes) => Some(codes.join(",")),
        }
    }
}

/// Price lookup for a set of symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Canonical symbols, deduplicated
    pub symbols: Vec<String>,
    /// Conversion target
    pub target: Target,
}

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Ranked listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// Number of rows, within `MIN_LISTING_LIMIT..=MAX_LISTING_LIMIT`
    pub limit: u32,
    /// Conversion target
    pub target: String,
    /// Column to order by
    pub sort: SortField,
    /// Order direction
    pub direction: SortDirection,
}

impl ListingRequest {
    /// Listing in USD, largest first, with the limit clamped into range
    #[must_use]
    pub fn new(limit: i64, sort: SortField) -> Self {
        let limit = limit.clamp(i64::from(MIN_LISTING_LIMIT), i64::from(MAX_LISTING_LIMIT));
        Self {
            limit: u32::try_from(limit).unwrap_or(DEFAULT_LISTING_LIMIT),
            target: LISTING_TARGET.to_string(),
            sort,
            direction: SortDirection::Desc,
        }
    }
}

/// Market figures of one coin in one currency
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuoteValue {
    /// Latest price
    #[serde(default)]
    pub price: Option<f64>,
    /// 24h traded volume
    #[serde(default)]
    pub volume_24h: Option<f64>,
    /// Market capitalization
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Price change over one hour, in percent
    #[serde(default)]
    pub percent_change_1h: Option<f64>,
    /// Price change over 24 hours, in percent
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
    /// Price change over seven days, in percent
    #[serde(default)]
    pub percent_change_7d: Option<f64>,
    /// Time the figures were computed
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// One coin as returned by the quote and listing endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoinQuote {
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Number of market pairs
    #[serde(default)]
    pub num_market_pairs: Option<u64>,
    /// Date the coin was listed
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    /// Circulating supply
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    /// Total supply
    #[serde(default)]
    pub total_supply: Option<f64>,
    /// Maximum supply
    #[serde(default)]
    pub max_supply: Option<f64>,
    /// Figures keyed by target currency
    #[serde(default)]
    pub quote: BTreeMap<String, QuoteValue>,
}

/// Interface to the price/listing service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PriceService: Send + Sync {
    /// Latest quotes, in the order the symbols were requested
    async fn get_prices(&self, request: &QuoteRequest) -> Result<Vec<CoinQuote>, TransportError>;

    /// Ranked listing, ordered by the service
    async fn get_listing(
        &self,
        request: &ListingRequest,
    ) -> Result<Vec<CoinQuote>, TransportError>;
}
