//! Ranking Property Tests
//!
//! For any candidate list: ranking is a stable permutation, keys end up in
//! policy order, and the input is never reordered.

use proptest::prelude::*;
use quote_refresh::testing::candidate;
use quote_refresh::{rank, RankingPolicy};
use quote_types::QuoteCandidate;

/// Candidates with small value ranges so ties are common; id = input index
fn candidates() -> impl Strategy<Value = Vec<QuoteCandidate>> {
    prop::collection::vec((0u128..5, 0u128..5, 0u128..5), 0..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (sell, buy, gas))| candidate(&i.to_string(), sell, buy, gas))
            .collect()
    })
}

fn index(candidate: &QuoteCandidate) -> usize {
    candidate.source.id.parse().unwrap()
}

fn policies() -> impl Strategy<Value = RankingPolicy> {
    prop_oneof![
        Just(RankingPolicy::MostProfit),
        Just(RankingPolicy::MostReturn),
        Just(RankingPolicy::LeastGas),
    ]
}

/// Sort key under `policy`; lower ranks first
fn key(candidate: &QuoteCandidate, policy: RankingPolicy, is_buy_order: bool) -> i128 {
    match policy {
        RankingPolicy::MostProfit => 0,
        RankingPolicy::LeastGas => candidate.estimated_gas_cost() as i128,
        RankingPolicy::MostReturn if is_buy_order => candidate.sell_amount.amount as i128,
        RankingPolicy::MostReturn => -(candidate.buy_amount.amount as i128),
    }
}

proptest! {
    #[test]
    fn ranking_is_a_permutation_and_leaves_input_alone(
        input in candidates(),
        policy in policies(),
        is_buy_order in any::<bool>(),
    ) {
        let before = input.clone();
        let ranked = rank(&input, policy, is_buy_order);

        prop_assert_eq!(&input, &before);

        let mut seen: Vec<usize> = ranked.iter().map(index).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
    }

    #[test]
    fn ranking_orders_by_key_and_keeps_ties_stable(
        input in candidates(),
        policy in policies(),
        is_buy_order in any::<bool>(),
    ) {
        let ranked = rank(&input, policy, is_buy_order);

        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let (ka, kb) = (key(a, policy, is_buy_order), key(b, policy, is_buy_order));
            prop_assert!(ka <= kb);
            if ka == kb {
                prop_assert!(index(a) < index(b));
            }
        }
    }

    #[test]
    fn ranking_is_deterministic(input in candidates(), policy in policies(), is_buy_order in any::<bool>()) {
        prop_assert_eq!(
            rank(&input, policy, is_buy_order),
            rank(&input, policy, is_buy_order)
        );
    }
}
