//! Testing utilities for the refresh engine
//!
//! [`ScriptedProvider`] answers from a queue of canned responses, each with an
//! optional artificial latency, and records every request it receives. Under
//! `tokio::time::pause` the latencies are deterministic, which is what the
//! supersession tests rely on.

use async_trait::async_trait;
use parking_lot::Mutex;
use quote_types::{GasCost, QuoteCandidate, RouteSource, TokenAmount};
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::ProviderError;
use crate::provider::{OrderAmount, QuoteProvider, QuoteRequest};

/// What a scripted call resolves to
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Quotes(Vec<QuoteCandidate>),
    /// Fails with [`ProviderError::Rejected`]
    Fail(String),
    /// Made-up routes priced off the request, for demos
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub delay: Duration,
    pub outcome: ScriptedOutcome,
}

/// Mock quote provider for testing
pub struct ScriptedProvider {
    name: String,
    responses: Mutex<VecDeque<ScriptedResponse>>,
    fallback: ScriptedResponse,
    requests: Mutex<Vec<QuoteRequest>>,
}

impl ScriptedProvider {
    /// Empty script; unscripted calls return no quotes
    pub fn new() -> Self {
        Self {
            name: "scripted".to_string(),
            responses: Mutex::new(VecDeque::new()),
            fallback: ScriptedResponse {
                delay: Duration::ZERO,
                outcome: ScriptedOutcome::Quotes(Vec::new()),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider that prices every request with synthetic routes
    pub fn demo(latency: Duration) -> Self {
        let mut provider = Self::new().with_fallback(latency, ScriptedOutcome::Synthetic);
        provider.name = "demo".to_string();
        provider
    }

    pub fn with_fallback(mut self, delay: Duration, outcome: ScriptedOutcome) -> Self {
        self.fallback = ScriptedResponse { delay, outcome };
        self
    }

    pub fn push(&self, delay: Duration, outcome: ScriptedOutcome) {
        self.responses
            .lock()
            .push_back(ScriptedResponse { delay, outcome });
    }

    pub fn push_quotes(&self, quotes: Vec<QuoteCandidate>) {
        self.push(Duration::ZERO, ScriptedOutcome::Quotes(quotes));
    }

    pub fn push_quotes_after(&self, delay: Duration, quotes: Vec<QuoteCandidate>) {
        self.push(delay, ScriptedOutcome::Quotes(quotes));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.push(Duration::ZERO, ScriptedOutcome::Fail(reason.into()));
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn quote(&self, request: QuoteRequest) -> Result<Vec<QuoteCandidate>, ProviderError> {
        self.requests.lock().push(request.clone());
        let response = self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        match response.outcome {
            ScriptedOutcome::Quotes(quotes) => Ok(quotes),
            ScriptedOutcome::Fail(reason) => Err(ProviderError::Rejected(reason)),
            ScriptedOutcome::Synthetic => Ok(synthetic_quotes(&request)),
        }
    }
}

/// Candidate with the given amounts and gas cost, 18-decimal assets
pub fn candidate(id: &str, sell: u128, buy: u128, gas_cost: u128) -> QuoteCandidate {
    QuoteCandidate {
        source: RouteSource {
            id: id.to_string(),
            name: id.to_string(),
        },
        sell_amount: TokenAmount::new(sell, 18),
        buy_amount: TokenAmount::new(buy, 18),
        max_sell_amount: None,
        min_buy_amount: None,
        gas: GasCost::new(150_000, gas_cost),
    }
}

// (route, rate in basis points, estimated gas units)
const SYNTHETIC_ROUTES: [(&str, u128, u64); 3] = [
    ("uniswap-v3", 9_970, 180_000),
    ("sushiswap", 9_985, 240_000),
    ("balancer", 9_950, 120_000),
];

const SYNTHETIC_GAS_PRICE: u128 = 30_000_000_000;

fn synthetic_quotes(request: &QuoteRequest) -> Vec<QuoteCandidate> {
    let sell_decimals = request.sell_asset.decimals;
    let buy_decimals = request.buy_asset.decimals;

    SYNTHETIC_ROUTES
        .iter()
        .map(|&(id, rate_bps, gas)| {
            let (sell, buy) = match request.amount {
                OrderAmount::Sell(units) => {
                    let out = rescale(units, sell_decimals, buy_decimals).saturating_mul(rate_bps) / 10_000;
                    (units, out)
                }
                OrderAmount::Buy(units) => {
                    let input = rescale(units, buy_decimals, sell_decimals).saturating_mul(10_000) / rate_bps;
                    (input, units)
                }
            };

            QuoteCandidate {
                source: RouteSource {
                    id: id.to_string(),
                    name: id.to_string(),
                },
                sell_amount: TokenAmount::new(sell, sell_decimals),
                buy_amount: TokenAmount::new(buy, buy_decimals),
                max_sell_amount: None,
                min_buy_amount: None,
                gas: GasCost::new(gas, u128::from(gas).saturating_mul(SYNTHETIC_GAS_PRICE)),
            }
        })
        .collect()
}

fn rescale(units: u128, from: u8, to: u8) -> u128 {
    if to >= from {
        units.saturating_mul(10u128.saturating_pow(u32::from(to - from)))
    } else {
        10u128
            .checked_pow(u32::from(from - to))
            .map_or(0, |divisor| units / divisor)
    }
}
