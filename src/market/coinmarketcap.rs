//! CoinMarketCap Pro API client

use super::{CoinQuote, ListingRequest, PriceService, QuoteRequest};
use crate::config::Settings;
use crate::http_utils::{create_http_client, get_json, TransportError};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";
const LISTING_PATH: &str = "/v1/cryptocurrency/listings/latest";

/// Price service backed by CoinMarketCap
pub struct CoinMarketCapClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, CoinQuote>,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    data: Vec<CoinQuote>,
}

impl CoinMarketCapClient {
    /// Create a client from settings
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: create_http_client(settings.http_timeout_secs),
            base_url: settings.cmc_base_url.trim_end_matches('/').to_string(),
            api_key: settings.cmc_api_key.clone(),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let url = format!("{}{path}", self.base_url);
        let body = get_json(&self.http, &url, query, &[(API_KEY_HEADER, self.api_key.as_str())]).await?;
        serde_json::from_value(body).map_err(|e| TransportError::JsonError(e.to_string()))
    }
}

fn quotes_query(request: &QuoteRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![("symbol", request.symbols.join(","))];
    if let Some(convert) = request.target.as_query() {
        query.push(("convert", convert));
    }
    query
}

fn listing_query(request: &ListingRequest) -> Vec<(&'static str, String)> {
    vec![
        ("limit", request.limit.to_string()),
        ("convert", request.target.clone()),
        ("sort", request.sort.as_str().to_string()),
        ("sort_dir", request.direction.as_str().to_string()),
    ]
}

/// Put quotes back in request order; the API answers with an unordered map.
fn order_quotes(symbols: &[String], mut data: HashMap<String, CoinQuote>) -> Vec<CoinQuote> {
    let mut ordered: Vec<CoinQuote> = symbols
        .iter()
        .filter_map(|symbol| {
            data.remove(symbol)
                .or_else(|| data.remove(&symbol.to_uppercase()))
        })
        .collect();

    let mut rest: Vec<(String, CoinQuote)> = data.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    ordered.extend(rest.into_iter().map(|(_, coin)| coin));
    ordered
}

#[async_trait::async_trait]
impl PriceService for CoinMarketCapClient {
    async fn get_prices(&self, request: &QuoteRequest) -> Result<Vec<CoinQuote>, TransportError> {
        debug!(symbols = ?request.symbols, target = ?request.target, "Requesting quotes");
        let response: QuotesResponse = self.fetch(QUOTES_PATH, &quotes_query(request)).await?;
        Ok(order_quotes(&request.symbols, response.data))
    }

    async fn get_listing(
        &self,
        request: &ListingRequest,
    ) -> Result<Vec<CoinQuote>, TransportError> {
        debug!(
            limit = request.limit,
            sort = %request.sort,
            direction = request.direction.as_str(),
            "Requesting listing"
        );
        let response: ListingResponse = self.fetch(LISTING_PATH, &listing_query(request)).await?;
        Ok(response.data)
    }
}
