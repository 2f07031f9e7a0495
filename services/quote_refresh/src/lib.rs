//! # Quote Refresh Engine
//!
//! Keeps a list of aggregated swap quotes in step with a user's changing
//! request inputs without flooding the quote provider and without ever
//! showing a result that belongs to older inputs.
//!
//! ## Architecture
//!
//! - **Snapshot**: [`RequestSnapshot`], an immutable, comparable copy of every input
//! - **State machine**: [`RefreshState`], the pure debounce / fetch / settle core
//! - **Engine**: [`RefreshEngine`], a tokio task driving the state machine,
//!   its quiescence timer and provider calls
//! - **Provider seam**: [`QuoteProvider`] with [`HttpQuoteProvider`] for
//!   aggregator APIs and [`testing::ScriptedProvider`] for tests and demos
//! - **Ranking**: [`rank`], pure ordering applied on read
//!
//! ## Behaviour
//!
//! 1. Each `notify` with changed, actionable inputs restarts a quiet period
//!    (750 ms by default); a burst of changes produces one fetch with the
//!    final inputs.
//! 2. Every committed fetch gets a new generation; outcomes of any earlier
//!    generation are dropped on arrival.
//! 3. A failure or an empty quote list sets an error tag but keeps the last
//!    good candidates visible.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_refresh::{testing::ScriptedProvider, EngineConfig, RankingPolicy, RefreshEngine, RequestSnapshot};
//! use quote_types::Asset;
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn run() -> quote_refresh::Result<()> {
//! let engine = RefreshEngine::spawn(
//!     Arc::new(ScriptedProvider::demo(Duration::from_millis(100))),
//!     EngineConfig::default(),
//! );
//!
//! engine.notify(
//!     RequestSnapshot::builder()
//!         .from_asset(Asset::new("0xusdc", "USDC", 6))
//!         .to_asset(Asset::new("0xweth", "WETH", 18))
//!         .amount("100")
//!         .build(),
//! )?;
//!
//! let view = engine.wait_for(|view| view.has_candidates()).await?;
//! let best = view.best(RankingPolicy::LeastGas, false);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod http_provider;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod ranking;
pub mod snapshot;
pub mod state;
pub mod testing;

pub use config::{EngineConfig, HttpProviderConfig};
pub use engine::RefreshEngine;
pub use error::{EngineError, ProviderError, RefreshError, Result};
pub use http_provider::HttpQuoteProvider;
pub use metrics::{RefreshMetrics, RefreshMetricsSnapshot};
pub use provider::{OrderAmount, QuoteProvider, QuoteRequest};
pub use ranking::{rank, RankingPolicy};
pub use snapshot::{RequestSnapshot, SnapshotBuilder};
pub use state::{Phase, QuoteView, RefreshState};
