//! # Refresh Engine - Debounced Quote Fetch Driver
//!
//! ## Purpose
//!
//! Runs one [`RefreshState`] inside a dedicated tokio task and performs the side
//! effects its transitions ask for: (re)arming the quiescence timer, calling
//! the [`QuoteProvider`], and publishing a fresh [`QuoteView`] after every
//! event. Callers talk to it through a [`RefreshEngine`] handle.
//!
//! ## Integration Points
//!
//! - **Input Sources**: [`RefreshEngine::notify`] / [`RefreshEngine::refresh`]
//!   from the request form, provider settlements from spawned fetch tasks
//! - **Output Destinations**: `watch` channel of [`QuoteView`] for the presentation layer
//! - **Provider**: any [`QuoteProvider`]; calls run in their own tasks and are
//!   never cancelled, only ignored once superseded
//!
//! ## Architecture Role
//!
//! ```text
//! notify / refresh ──► [command mailbox] ─┐
//!                                          │
//! quiescence timer ───────────────────────►├─► engine task ──► RefreshState ──► watch<QuoteView>
//!                                          │        │
//! provider settlements ─► [settled mailbox]┘        └──► tokio::spawn(provider.quote(request))
//! ```
//!
//! The engine task is the single execution context: commands, timer expiry
//! and settlements are handled one at a time by one `select!` loop, so the
//! state needs no locking. Ordering between concurrent fetches comes only
//! from the generation check in [`RefreshState::settle`].

use quote_types::QuoteCandidate;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{EngineError, ProviderError, Result};
use crate::metrics::{RefreshMetrics, RefreshMetricsSnapshot};
use crate::provider::{OrderAmount, QuoteProvider};
use crate::snapshot::RequestSnapshot;
use crate::state::{
    DebounceOutcome, NotifyOutcome, PendingFetch, Phase, QuoteView, RefreshState, SettleOutcome,
};
use crate::{log_debounce, log_fetch, log_skip, log_success, log_warning};

#[derive(Debug)]
enum EngineCommand {
    Notify(RequestSnapshot),
    Refresh,
}

/// Outcome of one provider call, tagged with the generation that issued it
struct Settlement {
    generation: u64,
    outcome: std::result::Result<Vec<QuoteCandidate>, ProviderError>,
}

/// Handle to a running refresh engine.
///
/// One per caller session. Dropping the handle (or calling
/// [`RefreshEngine::shutdown`]) stops the engine task; fetches already in
/// flight finish on their own and their results are dropped.
pub struct RefreshEngine {
    commands: mpsc::UnboundedSender<EngineCommand>,
    view: watch::Receiver<QuoteView>,
    metrics: Arc<RefreshMetrics>,
    task: JoinHandle<()>,
}

impl RefreshEngine {
    /// Start an engine task on the current tokio runtime
    pub fn spawn(provider: Arc<dyn QuoteProvider>, config: EngineConfig) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let state = RefreshState::new();
        let (view_tx, view_rx) = watch::channel(state.view());
        let metrics = Arc::new(RefreshMetrics::new());

        info!(
            "Starting quote refresh engine (provider: {}, debounce: {:?})",
            provider.name(),
            config.debounce
        );

        let task = EngineTask {
            state,
            provider,
            config,
            commands: commands_rx,
            settled_tx,
            settled_rx,
            view_tx,
            metrics: Arc::clone(&metrics),
        };

        Self {
            commands: commands_tx,
            view: view_rx,
            metrics,
            task: tokio::spawn(task.run()),
        }
    }

    /// The caller's inputs may have changed
    pub fn notify(&self, snapshot: RequestSnapshot) -> Result<()> {
        self.commands
            .send(EngineCommand::Notify(snapshot))
            .map_err(|_| EngineError::Stopped)
    }

    /// Re-fetch the latest inputs even though they did not change
    pub fn refresh(&self) -> Result<()> {
        self.commands
            .send(EngineCommand::Refresh)
            .map_err(|_| EngineError::Stopped)
    }

    /// Latest published view. Commands are applied asynchronously, so a view
    /// read right after `notify` may not reflect it yet.
    pub fn current_view(&self) -> QuoteView {
        self.view.borrow().clone()
    }

    /// Receiver that wakes on every view change
    pub fn subscribe(&self) -> watch::Receiver<QuoteView> {
        self.view.clone()
    }

    /// Wait until a published view satisfies `predicate`
    pub async fn wait_for<F>(&self, predicate: F) -> Result<QuoteView>
    where
        F: Fn(&QuoteView) -> bool,
    {
        let mut view = self.view.clone();
        loop {
            {
                let current = view.borrow_and_update();
                if predicate(&current) {
                    return Ok(current.clone());
                }
            }
            view.changed().await.map_err(|_| EngineError::Stopped)?;
        }
    }

    pub fn metrics(&self) -> RefreshMetricsSnapshot {
        self.metrics.get_metrics()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Close the mailbox and wait for the engine task to exit
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            log_warning!("Refresh engine task ended abnormally: {}", e);
        }
    }
}

struct EngineTask {
    state: RefreshState,
    provider: Arc<dyn QuoteProvider>,
    config: EngineConfig,
    commands: mpsc::UnboundedReceiver<EngineCommand>,
    settled_tx: mpsc::UnboundedSender<Settlement>,
    settled_rx: mpsc::UnboundedReceiver<Settlement>,
    view_tx: watch::Sender<QuoteView>,
    metrics: Arc<RefreshMetrics>,
}

impl EngineTask {
    async fn run(mut self) {
        let timer = tokio::time::sleep(self.config.debounce);
        tokio::pin!(timer);
        let mut armed = false;

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if self.handle_command(command) == NotifyOutcome::Debounce {
                        timer.as_mut().reset(Instant::now() + self.config.debounce);
                    }
                    armed = self.state.phase() == Phase::Debouncing;
                }
                Some(settlement) = self.settled_rx.recv() => {
                    self.handle_settlement(settlement);
                }
                () = &mut timer, if armed => {
                    armed = false;
                    self.handle_debounce_elapsed();
                }
            }

            self.publish();
        }

        info!("Quote refresh engine stopped");
    }

    fn handle_command(&mut self, command: EngineCommand) -> NotifyOutcome {
        let outcome = match command {
            EngineCommand::Notify(snapshot) => {
                self.metrics.increment_notifications();
                self.state.notify(snapshot)
            }
            EngineCommand::Refresh => {
                info!("Manual quote refresh requested");
                self.state.refresh()
            }
        };

        match outcome {
            NotifyOutcome::Unchanged => self.metrics.increment_unchanged(),
            NotifyOutcome::Suppressed => {
                self.metrics.increment_suppressed();
                log_debounce!("Inputs not actionable, no fetch scheduled");
            }
            NotifyOutcome::Debounce => {
                self.metrics.increment_debounces();
                log_debounce!("Inputs changed, fetching after {:?} of quiet", self.config.debounce);
            }
        }

        outcome
    }

    fn handle_debounce_elapsed(&mut self) {
        match self.state.debounce_elapsed() {
            DebounceOutcome::Fetch(fetch) => self.issue(fetch),
            DebounceOutcome::Rejected => {
                self.metrics.increment_rejected();
                log_warning!("Amount does not convert to a positive token amount, fetch skipped");
            }
            DebounceOutcome::Idle => {}
        }
    }

    fn issue(&self, fetch: PendingFetch) {
        self.metrics.increment_fetches();

        let request = &fetch.request;
        let (side, units) = match request.amount {
            OrderAmount::Sell(units) => ("sell", units),
            OrderAmount::Buy(units) => ("buy", units),
        };
        log_fetch!(
            "Requesting quotes from {} (generation {}): {} -> {}, {} {} base units, network {}",
            self.provider.name(),
            fetch.generation,
            request.sell_asset.symbol,
            request.buy_asset.symbol,
            side,
            units,
            request.network_id
        );

        let provider = Arc::clone(&self.provider);
        let settled = self.settled_tx.clone();
        let PendingFetch {
            generation,
            request,
        } = fetch;

        tokio::spawn(async move {
            let outcome = provider.quote(request).await;
            // Engine gone means nobody is waiting for this result
            let _ = settled.send(Settlement {
                generation,
                outcome,
            });
        });
    }

    fn handle_settlement(&mut self, settlement: Settlement) {
        let Settlement {
            generation,
            outcome,
        } = settlement;
        let received = outcome.as_ref().map(|quotes| quotes.len()).ok();

        match self.state.settle(generation, outcome) {
            SettleOutcome::Applied => {
                self.metrics.increment_applied();
                match self.state.error() {
                    None => log_success!(
                        "Received {} quotes (generation {})",
                        received.unwrap_or_default(),
                        generation
                    ),
                    Some(err) => {
                        self.metrics.increment_failures();
                        log_warning!(
                            "Quote fetch generation {} failed: {} (keeping {} previous quotes)",
                            generation,
                            err,
                            self.state.candidates().len()
                        );
                    }
                }
            }
            SettleOutcome::Superseded => {
                self.metrics.increment_superseded();
                log_skip!(
                    "Discarding result of generation {}, current generation is {}",
                    generation,
                    self.state.generation()
                );
            }
        }
    }

    fn publish(&self) {
        let next = self.state.view();
        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
