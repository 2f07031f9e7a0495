//! # HTTP Quote Provider - Aggregator API Adapter
//!
//! ## Purpose
//!
//! [`QuoteProvider`] implementation that asks a swap aggregator for quotes over
//! HTTP/JSON. One POST per fetch, no retries: the refresh engine decides when
//! to ask again.
//!
//! ## Wire Format
//!
//! `POST {base_url}/v1/swap/networks/{chain_id}/quotes`
//!
//! ```json
//! { "sellToken": "0x...", "buyToken": "0x...", "sellAmount": "2500000",
//!   "sortQuotesBy": "most-profit", "slippagePercentage": "0.5", "gasSpeed": "fast" }
//! ```
//!
//! Exactly one of `sellAmount` / `buyAmount` is present, always as a decimal
//! string of base units. The response is `{ "quotes": [QuoteCandidate, ...] }`.
//!
//! ## Performance Profile
//!
//! - **Connection Reuse**: pooled keep-alive client shared by every fetch
//! - **Timeout**: per-request, from [`HttpProviderConfig::timeout`]

use anyhow::{Context, Result};
use async_trait::async_trait;
use quote_config::service::provider::{POOL_IDLE_TIMEOUT_SECS, POOL_MAX_IDLE_PER_HOST, QUOTES_PATH};
use quote_types::{Decimal, NetworkId, QuoteCandidate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::HttpProviderConfig;
use crate::error::ProviderError;
use crate::provider::{OrderAmount, QuoteProvider, QuoteRequest};

const API_KEY_HEADER: &str = "x-api-key";

/// Request body sent to the aggregator
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotesRequestBody<'a> {
    sell_token: &'a str,
    buy_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sell_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    buy_amount: Option<String>,
    sort_quotes_by: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slippage_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_speed: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    taker_address: Option<&'a str>,
}

impl<'a> From<&'a QuoteRequest> for QuotesRequestBody<'a> {
    fn from(request: &'a QuoteRequest) -> Self {
        let (sell_amount, buy_amount) = match request.amount {
            OrderAmount::Sell(units) => (Some(units.to_string()), None),
            OrderAmount::Buy(units) => (None, Some(units.to_string())),
        };

        Self {
            sell_token: &request.sell_asset.address,
            buy_token: &request.buy_asset.address,
            sell_amount,
            buy_amount,
            sort_quotes_by: request.ranking_hint.as_str(),
            recipient: request.recipient.as_deref(),
            slippage_percentage: request.slippage_tolerance,
            gas_speed: request.speed_preference.map(|speed| speed.as_str()),
            taker_address: request.account.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponseBody {
    #[serde(default)]
    quotes: Vec<QuoteCandidate>,
}

/// Aggregator client
#[derive(Debug, Clone)]
pub struct HttpQuoteProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpQuoteProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .timeout(config.timeout)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client for quote provider")?;

        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    /// Quotes endpoint for `network`, keeping any path prefix on the base URL
    pub fn quotes_url(&self, network: NetworkId) -> std::result::Result<Url, ProviderError> {
        let path = QUOTES_PATH.replace("{chain_id}", &network.chain_id().to_string());
        let endpoint = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);

        Url::parse(&endpoint)
            .map_err(|e| ProviderError::Rejected(format!("invalid quotes URL '{}': {}", endpoint, e)))
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn quote(&self, request: QuoteRequest) -> std::result::Result<Vec<QuoteCandidate>, ProviderError> {
        let url = self.quotes_url(request.network_id)?;
        let body = QuotesRequestBody::from(&request);

        let mut call = self.client.post(url.clone()).json(&body);
        if let Some(key) = &self.api_key {
            call = call.header(API_KEY_HEADER, key);
        }

        let response = call.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let decoded: QuotesResponseBody = serde_json::from_str(&text)?;
        debug!("{} returned {} quotes", url, decoded.quotes.len());

        Ok(decoded.quotes)
    }
}
