//! Intent classification
//!
//! The [`IntentService`] trait abstracts the external NLU service; the
//! payload it returns is turned into a typed [`IntentResult`] keyed by the
//! intent name.

mod dialogflow;

pub use dialogflow::DialogflowClient;

use crate::http_utils::TransportError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Intent asking for the price of one or more currencies
pub const QUOTES_INTENT: &str = "quotes";
/// Intent asking for a ranked list of currencies
pub const LISTING_INTENT: &str = "listing";

/// Parameter holding the requested cryptocurrencies
pub const CRYPTOCURRENCY: &str = "cryptocurrency";
/// Parameter holding the target fiat currency
pub const FIAT_CURRENCY: &str = "fiat_currency";
/// Parameter holding the number of listing rows
pub const COUNT: &str = "count";
/// Parameter holding the requested sort keys
pub const SORTING_PARAMETERS: &str = "sorting_parameters";

/// Intent as returned by the classification service, before typing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawIntent {
    /// Intent display name
    pub name: String,
    /// Extracted parameters
    pub parameters: Map<String, Value>,
    /// Ready-made reply configured on the intent
    pub fulfillment_text: String,
}

/// Interface to the intent classification service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IntentService: Send + Sync {
    /// Classify `text` within the conversation identified by `session_id`
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
        language_code: &str,
    ) -> Result<RawIntent, TransportError>;
}

/// A parameter the service may deliver either as a scalar or as a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// Single value
    One(String),
    /// List of values
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flatten into a list
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Numeric parameter; the service sends numbers as floats or strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    /// Numeric value
    Number(f64),
    /// Textual value, possibly empty when the user gave none
    Text(String),
}

impl Count {
    /// Integer value, `None` if absent or not a number
    #[must_use]
    pub fn value(&self) -> Option<i64> {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.is_finite() => Some(n.round() as i64),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().and_then(|n| Self::Number(n).value()),
        }
    }
}

/// Parameters of the quotes intent
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuotesParams {
    /// Requested cryptocurrencies, as typed by the user
    pub cryptocurrency: OneOrMany,
    /// Target fiat currency or currencies
    #[serde(default)]
    pub fiat_currency: Option<OneOrMany>,
}

/// Parameters of the listing intent
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingParams {
    /// Number of rows requested
    #[serde(default)]
    pub count: Option<Count>,
    /// Sort keys, as typed by the user
    #[serde(default)]
    pub sorting_parameters: Option<OneOrMany>,
}

/// Typed classification result, one payload shape per recognised intent
#[derive(Debug, Clone, PartialEq)]
pub enum IntentResult {
    /// Price lookup
    Quotes(QuotesParams),
    /// Ranked listing
    Listing(ListingParams),
    /// Any other intent; the service supplied the reply text
    Text(String),
}

impl IntentResult {
    /// Type the raw payload according to the intent name.
    ///
    /// # Errors
    ///
    /// Returns a JSON error when a recognised intent carries parameters of
    /// the wrong shape.
    pub fn from_raw(raw: RawIntent) -> Result<Self, serde_json::Error> {
        match raw.name.as_str() {
            QUOTES_INTENT => serde_json::from_value(Value::Object(raw.parameters)).map(Self::Quotes),
            LISTING_INTENT => {
                serde_json::from_value(Value::Object(raw.parameters)).map(Self::Listing)
            }
            _ => Ok(Self::Text(raw.fulfillment_text)),
        }
    }
}
