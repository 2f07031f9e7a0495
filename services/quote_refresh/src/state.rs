//! # Refresh State - Debounce / Fetch / Settle State Machine
//!
//! ## Purpose
//!
//! Pure, synchronous core of the refresh engine. Decides whether an input
//! change warrants a new quote, when a settled burst turns into a provider
//! request, and whether a provider outcome may touch the visible result.
//! Owns no timers and performs no I/O; [`crate::engine`] drives it and runs
//! the side effects each transition asks for.
//!
//! ## Transitions
//!
//! ```text
//!            notify(actionable, changed)              debounce_elapsed
//!   Idle ───────────────────────────────► Debouncing ─────────────────► Fetching
//!    ▲  ◄── notify(not actionable) ──────────┘  ▲ │ (amount rejected:        │
//!    │                                          │ │  back to resume phase)   │ settle(current gen)
//!    │                                          │ ▼                          ▼
//!    └──────────────── notify(not actionable) ── Settled ◄───────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - `generation` only grows; it is assigned when a burst is committed to a fetch
//! - an outcome whose generation is not the current one never changes state
//! - `candidates` is only replaced by a successful, non-empty, current outcome;
//!   errors leave the last good list in place next to the error tag

use quote_types::QuoteCandidate;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ProviderError, RefreshError};
use crate::provider::QuoteRequest;
use crate::ranking::{rank, RankingPolicy};
use crate::snapshot::RequestSnapshot;

/// Ordering hint always sent to the provider
pub const PROVIDER_RANKING_HINT: RankingPolicy = RankingPolicy::MostProfit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    Fetching,
    Settled,
}

/// What a `notify` / `refresh` asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Same inputs as the reference snapshot; nothing to do
    Unchanged,
    /// Inputs not actionable; any pending burst was cancelled
    Suppressed,
    /// (Re)start the quiescence timer
    Debounce,
}

/// A fetch committed at the end of a burst
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub generation: u64,
    pub request: QuoteRequest,
}

/// Result of the quiescence timer firing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceOutcome {
    /// Issue this request to the provider
    Fetch(PendingFetch),
    /// Amount did not convert to a positive number of base units
    Rejected,
    /// Nothing was pending (timer outlived its burst)
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Applied,
    Superseded,
}

/// Read-only picture for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteView {
    /// Last good result in provider order
    pub candidates: Arc<Vec<QuoteCandidate>>,
    pub is_fetching: bool,
    pub error: Option<RefreshError>,
}

impl QuoteView {
    /// Candidates ordered under `policy`
    pub fn ranked(&self, policy: RankingPolicy, is_buy_order: bool) -> Vec<QuoteCandidate> {
        rank(&self.candidates, policy, is_buy_order)
    }

    /// Top candidate under `policy`
    pub fn best(&self, policy: RankingPolicy, is_buy_order: bool) -> Option<QuoteCandidate> {
        self.ranked(policy, is_buy_order).into_iter().next()
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// Mutable refresh state. Exactly one owner per engine.
#[derive(Debug)]
pub struct RefreshState {
    phase: Phase,
    /// Id of the most recently committed fetch; 0 before the first one
    generation: u64,
    /// Snapshot the current generation was built from
    last_snapshot: Option<RequestSnapshot>,
    /// Snapshot waiting for the quiescence timer
    pending: Option<RequestSnapshot>,
    /// Most recently observed snapshot, for manual refresh
    latest: Option<RequestSnapshot>,
    /// Phase to return to if the pending burst is rejected
    resume_phase: Phase,
    candidates: Arc<Vec<QuoteCandidate>>,
    error: Option<RefreshError>,
}

impl RefreshState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            last_snapshot: None,
            pending: None,
            latest: None,
            resume_phase: Phase::Idle,
            candidates: Arc::new(Vec::new()),
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_snapshot(&self) -> Option<&RequestSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn pending_snapshot(&self) -> Option<&RequestSnapshot> {
        self.pending.as_ref()
    }

    pub fn candidates(&self) -> &[QuoteCandidate] {
        &self.candidates
    }

    pub fn error(&self) -> Option<&RefreshError> {
        self.error.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, Phase::Debouncing | Phase::Fetching)
    }

    /// Inputs may have changed.
    ///
    /// Compared against the burst in progress if there is one, else against
    /// the snapshot of the current generation. Before the first fetch every
    /// call proceeds.
    pub fn notify(&mut self, snapshot: RequestSnapshot) -> NotifyOutcome {
        let never_fetched = self.last_snapshot.is_none();
        let unchanged = self.reference() == Some(&snapshot);
        self.latest = Some(snapshot.clone());

        if unchanged && !never_fetched {
            trace!("Snapshot unchanged, ignoring");
            return NotifyOutcome::Unchanged;
        }

        self.arm(snapshot)
    }

    /// Manual re-fetch of the latest observed inputs, bypassing change detection.
    ///
    /// Does nothing unless those inputs are actionable.
    pub fn refresh(&mut self) -> NotifyOutcome {
        match self.latest.clone() {
            Some(snapshot) if snapshot.is_actionable() => self.arm(snapshot),
            _ => NotifyOutcome::Suppressed,
        }
    }

    /// Quiescence timer elapsed without interruption.
    pub fn debounce_elapsed(&mut self) -> DebounceOutcome {
        if self.phase != Phase::Debouncing {
            return DebounceOutcome::Idle;
        }
        let Some(snapshot) = self.pending.take() else {
            self.phase = self.resume_phase;
            return DebounceOutcome::Idle;
        };

        let Some(request) = snapshot.to_quote_request(PROVIDER_RANKING_HINT) else {
            debug!(
                "Rejecting amount '{}': not a positive base-unit amount",
                snapshot.amount
            );
            self.phase = self.resume_phase;
            return DebounceOutcome::Rejected;
        };

        self.generation += 1;
        self.last_snapshot = Some(snapshot);
        self.phase = Phase::Fetching;

        DebounceOutcome::Fetch(PendingFetch {
            generation: self.generation,
            request,
        })
    }

    /// A previously issued fetch settled.
    pub fn settle(
        &mut self,
        generation: u64,
        outcome: Result<Vec<QuoteCandidate>, ProviderError>,
    ) -> SettleOutcome {
        if generation == 0 || generation != self.generation {
            return SettleOutcome::Superseded;
        }

        match outcome {
            Ok(candidates) if !candidates.is_empty() => {
                self.candidates = Arc::new(candidates);
                self.error = None;
            }
            Ok(_) => {
                self.error = Some(RefreshError::AllRoutesFailed);
            }
            Err(err) => {
                self.error = Some(RefreshError::from(&err));
            }
        }

        // A newer burst is already waiting on its timer; it still owes a fetch
        if self.phase == Phase::Debouncing {
            self.resume_phase = Phase::Settled;
        } else {
            self.phase = Phase::Settled;
        }

        SettleOutcome::Applied
    }

    pub fn view(&self) -> QuoteView {
        QuoteView {
            candidates: Arc::clone(&self.candidates),
            is_fetching: self.is_fetching(),
            error: self.error.clone(),
        }
    }

    fn reference(&self) -> Option<&RequestSnapshot> {
        if self.phase == Phase::Debouncing {
            self.pending.as_ref()
        } else {
            self.last_snapshot.as_ref()
        }
    }

    fn arm(&mut self, snapshot: RequestSnapshot) -> NotifyOutcome {
        if !snapshot.is_actionable() {
            self.pending = None;
            self.phase = Phase::Idle;
            return NotifyOutcome::Suppressed;
        }

        if self.phase != Phase::Debouncing {
            self.resume_phase = self.phase;
        }
        self.phase = Phase::Debouncing;
        self.pending = Some(snapshot);
        NotifyOutcome::Debounce
    }
}

impl Default for RefreshState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OrderAmount;
    use quote_types::{Asset, GasCost, NetworkId, RouteSource, TokenAmount};

    fn snapshot(amount: &str) -> RequestSnapshot {
        RequestSnapshot::builder()
            .from_asset(Asset::new("0xusdc", "USDC", 6))
            .to_asset(Asset::new("0xweth", "WETH", 18))
            .amount(amount)
            .network_id(NetworkId::ETHEREUM)
            .build()
    }

    fn quote(id: &str) -> QuoteCandidate {
        QuoteCandidate {
            source: RouteSource {
                id: id.to_string(),
                name: id.to_string(),
            },
            sell_amount: TokenAmount::new(1_000_000, 6),
            buy_amount: TokenAmount::new(1, 18),
            max_sell_amount: None,
            min_buy_amount: None,
            gas: GasCost::new(21_000, 1),
        }
    }

    fn commit(state: &mut RefreshState, amount: &str) -> PendingFetch {
        assert_eq!(state.notify(snapshot(amount)), NotifyOutcome::Debounce);
        match state.debounce_elapsed() {
            DebounceOutcome::Fetch(fetch) => fetch,
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_first_actionable_notify_debounces() {
        let mut state = RefreshState::new();

        assert_eq!(state.notify(snapshot("10")), NotifyOutcome::Debounce);
        assert_eq!(state.phase(), Phase::Debouncing);
        assert!(state.view().is_fetching);
    }

    #[test]
    fn test_non_actionable_is_suppressed() {
        let mut state = RefreshState::new();

        assert_eq!(state.notify(snapshot("")), NotifyOutcome::Suppressed);
        assert_eq!(state.notify(snapshot("0")), NotifyOutcome::Suppressed);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.debounce_elapsed(), DebounceOutcome::Idle);
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn test_commit_assigns_generation_and_request() {
        let mut state = RefreshState::new();

        let fetch = commit(&mut state, "2.5");

        assert_eq!(fetch.generation, 1);
        assert_eq!(fetch.request.amount, OrderAmount::Sell(2_500_000));
        assert_eq!(fetch.request.ranking_hint, RankingPolicy::MostProfit);
        assert_eq!(state.phase(), Phase::Fetching);
        assert_eq!(state.last_snapshot(), Some(&snapshot("2.5")));
    }

    #[test]
    fn test_unchanged_snapshot_after_fetch_is_noop() {
        let mut state = RefreshState::new();
        commit(&mut state, "5");

        assert_eq!(state.notify(snapshot("5")), NotifyOutcome::Unchanged);
        assert_eq!(state.phase(), Phase::Fetching);
    }

    #[test]
    fn test_burst_compares_against_pending_snapshot() {
        let mut state = RefreshState::new();
        commit(&mut state, "5");

        // 5 -> 50 -> 5 within one burst: the final 5 must win
        assert_eq!(state.notify(snapshot("50")), NotifyOutcome::Debounce);
        assert_eq!(state.notify(snapshot("5")), NotifyOutcome::Debounce);
        assert_eq!(state.notify(snapshot("5")), NotifyOutcome::Unchanged);

        match state.debounce_elapsed() {
            DebounceOutcome::Fetch(fetch) => {
                assert_eq!(fetch.generation, 2);
                assert_eq!(fetch.request.amount, OrderAmount::Sell(5_000_000));
            }
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_rejected_amount_changes_nothing() {
        let mut state = RefreshState::new();
        let fetch = commit(&mut state, "1");
        state.settle(fetch.generation, Ok(vec![quote("a")]));

        // positive decimal, finer than USDC's 6 decimals
        assert_eq!(state.notify(snapshot("0.0000001")), NotifyOutcome::Debounce);
        assert_eq!(state.debounce_elapsed(), DebounceOutcome::Rejected);

        assert_eq!(state.phase(), Phase::Settled);
        assert_eq!(state.generation(), 1);
        assert_eq!(state.last_snapshot(), Some(&snapshot("1")));
        assert_eq!(state.candidates().len(), 1);
        assert!(!state.view().is_fetching);
    }

    #[test]
    fn test_success_replaces_candidates_and_clears_error() {
        let mut state = RefreshState::new();
        let first = commit(&mut state, "1");
        state.settle(first.generation, Err(ProviderError::Rejected("boom".into())));
        assert!(state.error().is_some());

        let second = commit(&mut state, "2");
        assert_eq!(
            state.settle(second.generation, Ok(vec![quote("a"), quote("b")])),
            SettleOutcome::Applied
        );

        let view = state.view();
        assert_eq!(view.candidates.len(), 2);
        assert_eq!(view.error, None);
        assert!(!view.is_fetching);
    }

    #[test]
    fn test_errors_retain_last_good_candidates() {
        let mut state = RefreshState::new();
        let first = commit(&mut state, "1");
        state.settle(first.generation, Ok(vec![quote("q1"), quote("q2")]));

        let second = commit(&mut state, "2");
        state.settle(second.generation, Ok(vec![]));
        assert_eq!(state.error(), Some(&RefreshError::AllRoutesFailed));
        assert_eq!(state.candidates().len(), 2);

        let third = commit(&mut state, "3");
        state.settle(third.generation, Err(ProviderError::Rejected("down".into())));
        assert_eq!(
            state.error(),
            Some(&RefreshError::ProviderFailure(
                "provider rejected request: down".to_string()
            ))
        );
        assert_eq!(state.candidates()[0].source.id, "q1");
        assert_eq!(state.phase(), Phase::Settled);
    }

    #[test]
    fn test_superseded_outcome_is_discarded() {
        let mut state = RefreshState::new();
        let a = commit(&mut state, "1");
        let b = commit(&mut state, "2");

        assert_eq!(state.settle(b.generation, Ok(vec![quote("b")])), SettleOutcome::Applied);
        assert_eq!(state.settle(a.generation, Ok(vec![quote("a")])), SettleOutcome::Superseded);
        assert_eq!(
            state.settle(a.generation, Err(ProviderError::Rejected("late".into()))),
            SettleOutcome::Superseded
        );

        assert_eq!(state.candidates()[0].source.id, "b");
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_settle_without_fetch_is_ignored() {
        let mut state = RefreshState::new();
        assert_eq!(state.settle(0, Ok(vec![quote("x")])), SettleOutcome::Superseded);
        assert!(state.candidates().is_empty());
    }

    #[test]
    fn test_settle_during_newer_burst_keeps_debouncing() {
        let mut state = RefreshState::new();
        let a = commit(&mut state, "1");
        assert_eq!(state.notify(snapshot("2")), NotifyOutcome::Debounce);

        state.settle(a.generation, Ok(vec![quote("a")]));

        assert_eq!(state.phase(), Phase::Debouncing);
        assert!(state.view().is_fetching);
        assert_eq!(state.candidates().len(), 1);
        assert!(matches!(state.debounce_elapsed(), DebounceOutcome::Fetch(_)));
    }

    #[test]
    fn test_non_actionable_keeps_visible_result() {
        let mut state = RefreshState::new();
        let a = commit(&mut state, "1");
        state.settle(a.generation, Ok(vec![quote("a")]));

        assert_eq!(state.notify(snapshot("")), NotifyOutcome::Suppressed);

        let view = state.view();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(view.candidates.len(), 1);
        assert!(!view.is_fetching);

        // back to the inputs of the visible result: nothing to refetch
        assert_eq!(state.notify(snapshot("1")), NotifyOutcome::Unchanged);
    }

    #[test]
    fn test_non_actionable_cancels_pending_burst() {
        let mut state = RefreshState::new();
        assert_eq!(state.notify(snapshot("3")), NotifyOutcome::Debounce);
        assert_eq!(state.notify(snapshot("")), NotifyOutcome::Suppressed);

        assert_eq!(state.debounce_elapsed(), DebounceOutcome::Idle);
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn test_non_actionable_during_fetch_still_settles() {
        let mut state = RefreshState::new();
        let fetch = commit(&mut state, "1");

        assert_eq!(state.notify(snapshot("")), NotifyOutcome::Suppressed);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.view().is_fetching);

        assert_eq!(
            state.settle(fetch.generation, Ok(vec![quote("a")])),
            SettleOutcome::Applied
        );
        assert_eq!(state.phase(), Phase::Settled);
        assert_eq!(state.candidates().len(), 1);
        assert!(state.error().is_none());
        assert_eq!(state.notify(snapshot("1")), NotifyOutcome::Unchanged);
    }

    #[test]
    fn test_refresh_rearms_latest_inputs() {
        let mut state = RefreshState::new();
        let a = commit(&mut state, "1");
        state.settle(a.generation, Ok(vec![quote("a")]));
        assert_eq!(state.notify(snapshot("1")), NotifyOutcome::Unchanged);

        assert_eq!(state.refresh(), NotifyOutcome::Debounce);
        match state.debounce_elapsed() {
            DebounceOutcome::Fetch(fetch) => assert_eq!(fetch.generation, 2),
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_without_actionable_inputs_does_nothing() {
        let mut state = RefreshState::new();
        assert_eq!(state.refresh(), NotifyOutcome::Suppressed);

        state.notify(snapshot("abc"));
        assert_eq!(state.refresh(), NotifyOutcome::Suppressed);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_view_ranks_on_read_without_reordering_state() {
        let mut state = RefreshState::new();
        let a = commit(&mut state, "1");
        let mut cheap = quote("cheap");
        cheap.gas = GasCost::new(21_000, 1);
        let mut pricey = quote("pricey");
        pricey.gas = GasCost::new(21_000, 9);
        state.settle(a.generation, Ok(vec![pricey, cheap]));

        let view = state.view();
        assert_eq!(
            view.best(RankingPolicy::LeastGas, false).unwrap().source.id,
            "cheap"
        );
        assert_eq!(state.candidates()[0].source.id, "pricey");
    }
}
