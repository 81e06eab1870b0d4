use currency_info_bot::agent::{AgentConfig, AgentRegistry};
use currency_info_bot::dispatcher::IntentDispatcher;
use currency_info_bot::http_utils::TransportError;
use currency_info_bot::intent::{IntentService, RawIntent, LISTING_INTENT, QUOTES_INTENT};
use currency_info_bot::market::{
    CoinQuote, ListingRequest, PriceService, QuoteRequest, QuoteValue, Target,
};
use currency_info_bot::service::{CurrencyInfoService, GENERIC_ERROR, UNKNOWN_CURRENCIES};
use currency_info_bot::tables::{LookupTables, SortField};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Answers by keyword and records the sessions it saw
#[derive(Default)]
struct KeywordIntents {
    sessions: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl IntentService for KeywordIntents {
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
        _language_code: &str,
    ) -> Result<RawIntent, TransportError> {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(session_id.to_string());
        }

        let (name, parameters) = if text.starts_with("top") {
            (
                LISTING_INTENT,
                json!({ "count": "2", "sorting_parameters": ["most traded", "volume"] }),
            )
        } else if text.starts_with("price") {
            let coins: Vec<&str> = text.split_whitespace().skip(1).collect();
            (
                QUOTES_INTENT,
                json!({ "cryptocurrency": coins, "fiat_currency": "eur" }),
            )
        } else if text == "broken" {
            (QUOTES_INTENT, json!({ "cryptocurrency": 42 }))
        } else {
            return Ok(RawIntent {
                name: "Default Welcome Intent".to_string(),
                fulfillment_text: "Hello! Ask me about <coins>.".to_string(),
                ..RawIntent::default()
            });
        };

        let Value::Object(parameters) = parameters else {
            return Err(TransportError::JsonError("parameters are not an object".to_string()));
        };
        Ok(RawIntent {
            name: name.to_string(),
            parameters,
            fulfillment_text: String::new(),
        })
    }
}

/// Serves fixed figures and records what was asked
#[derive(Default)]
struct FixedPrices {
    quote_requests: Mutex<Vec<QuoteRequest>>,
    listing_requests: Mutex<Vec<ListingRequest>>,
    fail: bool,
}

fn coin(name: &str, symbol: &str, currency: &str, price: f64, volume: f64) -> CoinQuote {
    CoinQuote {
        name: name.to_string(),
        symbol: symbol.to_string(),
        quote: BTreeMap::from([(
            currency.to_string(),
            QuoteValue {
                price: Some(price),
                volume_24h: Some(volume),
                ..QuoteValue::default()
            },
        )]),
        ..CoinQuote::default()
    }
}

#[async_trait::async_trait]
impl PriceService for FixedPrices {
    async fn get_prices(&self, request: &QuoteRequest) -> Result<Vec<CoinQuote>, TransportError> {
        if let Ok(mut seen) = self.quote_requests.lock() {
            seen.push(request.clone());
        }
        if self.fail {
            return Err(TransportError::ApiError("429 Too Many Requests".to_string()));
        }
        Ok(request
            .symbols
            .iter()
            .map(|symbol| coin(symbol, symbol, "EUR", 1500.0, 10.0))
            .collect())
    }

    async fn get_listing(
        &self,
        request: &ListingRequest,
    ) -> Result<Vec<CoinQuote>, TransportError> {
        if let Ok(mut seen) = self.listing_requests.lock() {
            seen.push(request.clone());
        }
        Ok(vec![
            coin("Tether", "USDT", "USD", 1.0, 50_000_000_000.0),
            coin("Bitcoin", "BTC", "USD", 64_000.0, 30_000_000_000.0),
        ])
    }
}

fn bundled_tables() -> Arc<LookupTables> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    Arc::new(
        LookupTables::load(
            &root.join("data/currencies.json"),
            &root.join("data/sort_fields.json"),
        )
        .expect("bundled tables load"),
    )
}

fn service(intents: Arc<KeywordIntents>, prices: Arc<FixedPrices>) -> CurrencyInfoService {
    CurrencyInfoService::new(
        IntentDispatcher::new(bundled_tables()),
        AgentRegistry::new(
            AgentConfig {
                language_code: "en".to_string(),
            },
            intents,
        ),
        prices,
    )
}

#[tokio::test]
async fn test_price_question_end_to_end() {
    let prices = Arc::new(FixedPrices::default());
    let service = service(Arc::new(KeywordIntents::default()), prices.clone());

    let reply = service.reply("price Bitcoin eth btc", 10).await;

    assert_eq!(
        reply,
        "<b>BTC</b> (BTC): 1,500.00 EUR\n<b>ETH</b> (ETH): 1,500.00 EUR"
    );
    let seen = prices.quote_requests.lock().expect("lock").clone();
    assert_eq!(
        seen,
        vec![QuoteRequest {
            symbols: vec!["BTC".to_string(), "ETH".to_string()],
            target: Target::Single("EUR".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_listing_question_end_to_end() {
    let prices = Arc::new(FixedPrices::default());
    let service = service(Arc::new(KeywordIntents::default()), prices.clone());

    let reply = service.reply("top coins", 10).await;

    assert_eq!(
        reply,
        "<b>Top 2 by 24h volume:</b>\n\
         1. Tether (USDT): 50,000,000,000.00 USD\n\
         2. Bitcoin (BTC): 30,000,000,000.00 USD"
    );
    let seen = prices.listing_requests.lock().expect("lock").clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].limit, 2);
    assert_eq!(seen[0].sort, SortField::Volume24h);
    assert_eq!(seen[0].target, "USD");
}

#[tokio::test]
async fn test_price_service_failure_is_reported() {
    let prices = Arc::new(FixedPrices {
        fail: true,
        ..FixedPrices::default()
    });
    let service = service(Arc::new(KeywordIntents::default()), prices);

    let reply = service.reply("price btc", 10).await;

    assert!(reply.starts_with("Unable to collect currencies information: "));
    assert!(reply.contains("429 Too Many Requests"));
}

#[tokio::test]
async fn test_unknown_coins_and_broken_parameters() {
    let prices = Arc::new(FixedPrices::default());
    let service = service(Arc::new(KeywordIntents::default()), prices.clone());

    assert_eq!(service.reply("price sneakers", 10).await, UNKNOWN_CURRENCIES);
    assert_eq!(service.reply("broken", 10).await, GENERIC_ERROR);
    assert!(prices.quote_requests.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn test_small_talk_is_escaped() {
    let service = service(
        Arc::new(KeywordIntents::default()),
        Arc::new(FixedPrices::default()),
    );

    assert_eq!(
        service.reply("hello", 10).await,
        "Hello! Ask me about &lt;coins&gt;."
    );
}

#[tokio::test]
async fn test_each_chat_keeps_its_own_session() {
    let intents = Arc::new(KeywordIntents::default());
    let service = service(intents.clone(), Arc::new(FixedPrices::default()));

    service.reply("hello", 1).await;
    service.reply("hello again", 1).await;
    service.reply("hello", 2).await;

    let sessions = intents.sessions.lock().expect("lock").clone();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0], sessions[1]);
    assert_ne!(sessions[0], sessions[2]);
    assert_eq!(sessions.iter().collect::<HashSet<_>>().len(), 2);
    assert_eq!(service.registry().len().await, 2);
}
