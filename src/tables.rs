//! Static lookup tables
//!
//! Alias dictionaries for currency names and listing sort fields. Both are
//! loaded once at startup from JSON files and shared read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading the lookup tables
#[derive(Debug, Error)]
pub enum TableError {
    /// The table file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the table file
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The table file is not a JSON object of strings
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path of the table file
        path: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },
    /// A sort alias points to a field the listing API does not know
    #[error("Alias `{alias}` maps to unknown sort field `{value}`")]
    UnknownSortField {
        /// Alias as written in the table
        alias: String,
        /// Canonical value that failed to parse
        value: String,
    },
}

/// Error returned when a string is not a known sort field
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort field: {0}")]
pub struct ParseSortFieldError(pub String);

/// Columns the listing endpoint can order by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    /// Market capitalization
    MarketCap,
    /// Coin name
    Name,
    /// Ticker symbol
    Symbol,
    /// Date the coin was listed
    DateAdded,
    /// Latest price
    #[default]
    Price,
    /// Circulating supply
    CirculatingSupply,
    /// Total supply
    TotalSupply,
    /// Maximum supply
    MaxSupply,
    /// Number of market pairs
    NumMarketPairs,
    /// Traded volume over 24 hours
    Volume24h,
    /// Price change over one hour
    PercentChange1h,
    /// Price change over 24 hours
    PercentChange24h,
    /// Price change over seven days
    PercentChange7d,
}

impl SortField {
    /// Every sort field, in the order the listing API documents them
    pub const ALL: [Self; 13] = [
        Self::MarketCap,
        Self::Name,
        Self::Symbol,
        Self::DateAdded,
        Self::Price,
        Self::CirculatingSupply,
        Self::TotalSupply,
        Self::MaxSupply,
        Self::NumMarketPairs,
        Self::Volume24h,
        Self::PercentChange1h,
        Self::PercentChange24h,
        Self::PercentChange7d,
    ];

    /// Wire value understood by the listing API
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketCap => "market_cap",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::DateAdded => "date_added",
            Self::Price => "price",
            Self::CirculatingSupply => "circulating_supply",
            Self::TotalSupply => "total_supply",
            Self::MaxSupply => "max_supply",
            Self::NumMarketPairs => "num_market_pairs",
            Self::Volume24h => "volume_24h",
            Self::PercentChange1h => "percent_change_1h",
            Self::PercentChange24h => "percent_change_24h",
            Self::PercentChange7d => "percent_change_7d",
        }
    }

    /// Human readable column label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MarketCap => "market cap",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::DateAdded => "date added",
            Self::Price => "price",
            Self::CirculatingSupply => "circulating supply",
            Self::TotalSupply => "total supply",
            Self::MaxSupply => "max supply",
            Self::NumMarketPairs => "market pairs",
            Self::Volume24h => "24h volume",
            Self::PercentChange1h => "1h change",
            Self::PercentChange24h => "24h change",
            Self::PercentChange7d => "7d change",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseSortFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| ParseSortFieldError(s.to_string()))
    }
}

/// Immutable alias tables used by the intent normalizer
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    currencies: HashMap<String, String>,
    sort_fields: HashMap<String, SortField>,
}

impl LookupTables {
    /// Build tables from raw alias maps.
    ///
    /// Keys are lower-cased; currency values are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns `TableError::UnknownSortField` if a sort alias maps to a value
    /// that is not a [`SortField`].
    pub fn from_maps(
        currencies: HashMap<String, String>,
        sort_fields: HashMap<String, String>,
    ) -> Result<Self, TableError> {
        let currencies = currencies
            .into_iter()
            .map(|(alias, symbol)| (alias.trim().to_lowercase(), symbol))
            .collect();

        let sort_fields = sort_fields
            .into_iter()
            .map(|(alias, value)| match value.parse::<SortField>() {
                Ok(field) => Ok((alias.trim().to_lowercase(), field)),
                Err(_) => Err(TableError::UnknownSortField { alias, value }),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            currencies,
            sort_fields,
        })
    }

    /// Load both tables from JSON files mapping alias to canonical value.
    ///
    /// # Errors
    ///
    /// Returns a `TableError` if a file cannot be read or parsed, or if the
    /// sort table names an unknown field.
    pub fn load(currencies_path: &Path, sort_fields_path: &Path) -> Result<Self, TableError> {
        let tables = Self::from_maps(read_map(currencies_path)?, read_map(sort_fields_path)?)?;
        info!(
            currencies = tables.currencies.len(),
            sort_fields = tables.sort_fields.len(),
            "Lookup tables loaded"
        );
        Ok(tables)
    }

    /// Canonical symbol for a lower-cased currency alias
    #[must_use]
    pub fn currency(&self, alias: &str) -> Option<&str> {
        self.currencies.get(alias).map(String::as_str)
    }

    /// Sort field for a lower-cased alias
    #[must_use]
    pub fn sort_field(&self, alias: &str) -> Option<SortField> {
        self.sort_fields.get(alias).copied()
    }

    /// Number of currency aliases
    #[must_use]
    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    /// Number of sort aliases
    #[must_use]
    pub fn sort_field_count(&self) -> usize {
        self.sort_fields.len()
    }
}

fn read_map(path: &Path) -> Result<HashMap<String, String>, TableError> {
    let raw = fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| TableError::Parse {
        path: path.display().to_string(),
        source,
    })
}
