//! Reply service
//!
//! Ties the dispatcher to the price service: executes the request derived
//! from a message and renders the reply. Price service failures end here
//! and become a user-visible message.

use crate::agent::AgentRegistry;
use crate::dispatcher::{Dispatch, IntentDispatcher, Outcome};
use crate::format::format_response;
use crate::market::PriceService;
use html_escape::encode_text;
use std::sync::Arc;
use tracing::warn;

/// Generic apology, also used by the transport's last-resort handler
pub const GENERIC_ERROR: &str = "Oops, something went wrong...";
/// Reply when none of the requested currencies is known
pub const UNKNOWN_CURRENCIES: &str = "I don't know any of these currencies.";

/// Turns incoming text into a reply
pub struct CurrencyInfoService {
    dispatcher: IntentDispatcher,
    registry: AgentRegistry,
    prices: Arc<dyn PriceService>,
}

impl CurrencyInfoService {
    /// Assemble the service
    #[must_use]
    pub fn new(
        dispatcher: IntentDispatcher,
        registry: AgentRegistry,
        prices: Arc<dyn PriceService>,
    ) -> Self {
        Self {
            dispatcher,
            registry,
            prices,
        }
    }

    /// Per-chat agents created so far
    #[must_use]
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Produce the HTML reply for `text` sent in `chat_id`.
    ///
    /// Never fails; errors from the price service are reported in the reply.
    pub async fn reply(&self, text: &str, chat_id: i64) -> String {
        let Dispatch {
            intent_name,
            outcome,
        } = self.dispatcher.dispatch(&self.registry, text, chat_id).await;

        match outcome {
            Outcome::Quote(request) => {
                if request.symbols.is_empty() {
                    return UNKNOWN_CURRENCIES.to_string();
                }
                match self.prices.get_prices(&request).await {
                    Ok(quotes) => format_response(&quotes, &intent_name, None),
                    Err(e) => {
                        warn!(chat_id, "Unable to receive prices: {e}");
                        format!(
                            "Unable to collect currencies information: {}",
                            encode_text(&e.to_string())
                        )
                    }
                }
            }
            Outcome::Listing(request) => match self.prices.get_listing(&request).await {
                Ok(listing) => format_response(&listing, &intent_name, Some(request.sort)),
                Err(e) => {
                    warn!(chat_id, "Unable to receive currencies list: {e}");
                    format!(
                        "Unable to collect currencies list: {}",
                        encode_text(&e.to_string())
                    )
                }
            },
            Outcome::Text(reply) => encode_text(&reply).into_owned(),
            Outcome::Malformed => GENERIC_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::http_utils::TransportError;
    use crate::intent::{MockIntentService, RawIntent, LISTING_INTENT, QUOTES_INTENT};
    use crate::market::{CoinQuote, MockPriceService, QuoteValue, Target};
    use crate::tables::{LookupTables, SortField};
    use serde_json::{json, Value};
    use std::collections::{BTreeMap, HashMap};

    fn service(intent: &'static str, parameters: Value, prices: MockPriceService) -> CurrencyInfoService {
        let mut intents = MockIntentService::new();
        intents.expect_detect_intent().returning(move |_, _, _| {
            let Value::Object(parameters) = parameters.clone() else {
                panic!("parameters must be an object");
            };
            Ok(RawIntent {
                name: intent.to_string(),
                parameters,
                fulfillment_text: "Hi <there>".to_string(),
            })
        });

        let tables = LookupTables::from_maps(
            HashMap::from([("btc".to_string(), "BTC".to_string())]),
            HashMap::from([("cap".to_string(), "market_cap".to_string())]),
        )
        .expect("valid tables");

        CurrencyInfoService::new(
            IntentDispatcher::new(Arc::new(tables)),
            AgentRegistry::new(
                AgentConfig {
                    language_code: "en".to_string(),
                },
                Arc::new(intents),
            ),
            Arc::new(prices),
        )
    }

    fn bitcoin() -> CoinQuote {
        CoinQuote {
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            quote: BTreeMap::from([(
                "USD".to_string(),
                QuoteValue {
                    price: Some(100.0),
                    market_cap: Some(2000.0),
                    ..QuoteValue::default()
                },
            )]),
            ..CoinQuote::default()
        }
    }

    #[tokio::test]
    async fn test_quote_reply() {
        let mut prices = MockPriceService::new();
        prices
            .expect_get_prices()
            .withf(|request| {
                request.symbols == vec!["BTC".to_string()]
                    && request.target == Target::Single("USD".to_string())
            })
            .times(1)
            .returning(|_| Ok(vec![bitcoin()]));

        let service = service(
            QUOTES_INTENT,
            json!({ "cryptocurrency": ["btc"], "fiat_currency": "usd" }),
            prices,
        );

        let reply = service.reply("btc price", 3).await;
        assert_eq!(reply, "<b>BTC</b> (Bitcoin): 100.00 USD");
        assert!(service.registry().contains(3).await);
    }

    #[tokio::test]
    async fn test_price_transport_error_becomes_reply() {
        let mut prices = MockPriceService::new();
        prices.expect_get_prices().returning(|_| {
            Err(TransportError::ApiError(
                "401 Unauthorized - API key missing".to_string(),
            ))
        });

        let service = service(
            QUOTES_INTENT,
            json!({ "cryptocurrency": ["btc"], "fiat_currency": "usd" }),
            prices,
        );

        let reply = service.reply("btc price", 3).await;
        assert_eq!(
            reply,
            "Unable to collect currencies information: API error: 401 Unauthorized - API key missing"
        );
    }

    #[tokio::test]
    async fn test_listing_reply_uses_resolved_sort() {
        let mut prices = MockPriceService::new();
        prices
            .expect_get_listing()
            .withf(|request| request.limit == 1 && request.sort == SortField::MarketCap)
            .times(1)
            .returning(|_| Ok(vec![bitcoin()]));

        let service = service(
            LISTING_INTENT,
            json!({ "count": 1, "sorting_parameters": ["cap"] }),
            prices,
        );

        let reply = service.reply("top 1 by cap", 3).await;
        assert_eq!(reply, "<b>Top 1 by market cap:</b>\n1. Bitcoin (BTC): 2,000.00 USD");
    }

    #[tokio::test]
    async fn test_listing_transport_error_becomes_reply() {
        let mut prices = MockPriceService::new();
        prices
            .expect_get_listing()
            .returning(|_| Err(TransportError::NetworkError("connection reset".to_string())));

        let service = service(LISTING_INTENT, json!({ "count": 5 }), prices);

        let reply = service.reply("top 5", 3).await;
        assert_eq!(
            reply,
            "Unable to collect currencies list: Network error: connection reset"
        );
    }

    #[tokio::test]
    async fn test_unknown_currencies_skip_price_service() {
        let mut prices = MockPriceService::new();
        prices.expect_get_prices().times(0);

        let service = service(
            QUOTES_INTENT,
            json!({ "cryptocurrency": ["dogecoin"], "fiat_currency": "usd" }),
            prices,
        );

        assert_eq!(service.reply("doge?", 3).await, UNKNOWN_CURRENCIES);
    }

    #[tokio::test]
    async fn test_fulfillment_text_is_escaped() {
        let service = service("Default Welcome Intent", json!({}), MockPriceService::new());
        assert_eq!(service.reply("hello", 3).await, "Hi &lt;there&gt;");
    }

    #[tokio::test]
    async fn test_malformed_intent_reply() {
        let service = service(QUOTES_INTENT, json!({}), MockPriceService::new());
        assert_eq!(service.reply("??", 3).await, GENERIC_ERROR);
    }
}
