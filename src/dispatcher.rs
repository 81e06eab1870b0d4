//! Intent dispatcher
//!
//! Classifies user text through the chat's agent and turns the typed
//! intent into a market request or a ready reply.

use crate::agent::AgentRegistry;
use crate::intent::{IntentResult, ListingParams, OneOrMany, QuotesParams};
use crate::market::{ListingRequest, QuoteRequest, Target, DEFAULT_LISTING_LIMIT};
use crate::normalize::{normalize_currencies, normalize_sort_field};
use crate::tables::LookupTables;
use std::sync::Arc;
use tracing::{info, warn};

/// Reply used when the intent service cannot be reached
pub const CLASSIFICATION_FAILED: &str = "Sorry, I can't understand you right now. Please try again later.";
/// Reply used when the intent service matched an intent with no reply text
pub const EMPTY_FULFILLMENT: &str = "Sorry, I didn't get that. Try asking for a price or a top list.";

/// What to do with a classified message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Look up prices
    Quote(QuoteRequest),
    /// Fetch a ranked listing
    Listing(ListingRequest),
    /// Reply with the given text
    Text(String),
    /// A recognised intent arrived with unusable parameters
    Malformed,
}

/// Result of dispatching one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Intent name reported by the service; empty if classification failed
    pub intent_name: String,
    /// Action derived from the intent
    pub outcome: Outcome,
}

/// Maps classified intents onto requests using the lookup tables
pub struct IntentDispatcher {
    tables: Arc<LookupTables>,
}

impl IntentDispatcher {
    /// Create a dispatcher over loaded tables
    #[must_use]
    pub const fn new(tables: Arc<LookupTables>) -> Self {
        Self { tables }
    }

    /// Classify `text` for `chat_id` and derive the outcome.
    ///
    /// Creates the chat's agent on first use. Never fails: service errors
    /// become a `Text` outcome.
    pub async fn dispatch(&self, registry: &AgentRegistry, text: &str, chat_id: i64) -> Dispatch {
        let agent = registry.get(chat_id).await;

        let raw = match agent.detect_intent(text).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(chat_id, "Intent detection failed: {e}");
                return Dispatch {
                    intent_name: String::new(),
                    outcome: Outcome::Text(CLASSIFICATION_FAILED.to_string()),
                };
            }
        };

        info!(chat_id, "Detected intent: {}", raw.name);
        let intent_name = raw.name.clone();

        let outcome = match IntentResult::from_raw(raw) {
            Ok(IntentResult::Quotes(params)) => Outcome::Quote(self.quote_request(params)),
            Ok(IntentResult::Listing(params)) => Outcome::Listing(self.listing_request(params)),
            Ok(IntentResult::Text(reply)) if reply.trim().is_empty() => {
                Outcome::Text(EMPTY_FULFILLMENT.to_string())
            }
            Ok(IntentResult::Text(reply)) => Outcome::Text(reply),
            Err(e) => {
                warn!(chat_id, intent = %intent_name, "Malformed intent parameters: {e}");
                Outcome::Malformed
            }
        };

        Dispatch {
            intent_name,
            outcome,
        }
    }

    /// Build a quote request: normalized symbols, single fiat upper-cased,
    /// a fiat list passed through as is.
    #[must_use]
    pub fn quote_request(&self, params: QuotesParams) -> QuoteRequest {
        let symbols = normalize_currencies(&self.tables, &params.cryptocurrency.into_vec());

        let target = match params.fiat_currency {
            Some(OneOrMany::One(code)) if !code.trim().is_empty() => {
                Target::Single(code.trim().to_uppercase())
            }
            Some(OneOrMany::Many(codes)) if !codes.is_empty() => Target::Many(codes),
            _ => Target::Default,
        };

        QuoteRequest { symbols, target }
    }

    /// Build a listing request: USD, descending, sort resolved via the table.
    #[must_use]
    pub fn listing_request(&self, params: ListingParams) -> ListingRequest {
        let limit = params
            .count
            .and_then(|c| c.value())
            .unwrap_or(i64::from(DEFAULT_LISTING_LIMIT));
        let sort_tokens = params
            .sorting_parameters
            .map(OneOrMany::into_vec)
            .unwrap_or_default();

        ListingRequest::new(limit, normalize_sort_field(&self.tables, &sort_tokens))
    }
}
