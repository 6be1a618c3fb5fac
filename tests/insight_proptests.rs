//! Property-based tests for the insight engine.
//!
//! These verify the aggregation contract that every analysis relies on:
//! the zero-denominator ratio convention, pick-count conservation, corpus
//! merge additivity, and host-scoped blacklist idempotence.

use std::collections::HashMap;

use proptest::prelude::*;

use run_insights::corpus::RunCorpus;
use run_insights::insights::{
    make_deviation, make_ratio, packs, percent, PickCounter,
};
use run_insights::models::Run;

// ============================================================================
//  Strategies
// ============================================================================

/// Strategy for a comma-joined pack set drawn from a small alphabet.
fn pack_set() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "D"]), 0..4)
        .prop_map(|packs| packs.join(","))
}

/// Strategy for one run with packs, an optional host, and an outcome.
fn run() -> impl Strategy<Value = Run> {
    (
        pack_set(),
        pack_set(),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::sample::select(vec!["H1", "H2", "H3"])),
    )
        .prop_map(|(current, filtered, victory, host)| Run {
            current_packs: Some(current),
            filtered_packs: Some(filtered),
            victory,
            host: host.map(String::from),
            ..Default::default()
        })
}

fn run_batch() -> impl Strategy<Value = Vec<Run>> {
    prop::collection::vec(run(), 0..24)
}

/// Parse the Wins/Runs columns of a win-rate table back into counts.
fn win_counts(table: &run_insights::models::InsightTable) -> HashMap<String, (u64, u64)> {
    table
        .rows
        .iter()
        .map(|row| {
            (
                row[0].clone(),
                (row[1].parse().unwrap(), row[2].parse().unwrap()),
            )
        })
        .collect()
}

// ============================================================================
//  Ratio Properties
// ============================================================================

proptest! {
    /// A zero denominator always yields the zero rate, for any numerator.
    #[test]
    fn ratio_zero_denominator_is_zero(positive in 0u64..10_000) {
        prop_assert_eq!(percent(positive, 0), 0.0);
        prop_assert_eq!(make_ratio(positive, 0), "0.00%");
    }

    /// For a fixed positive denominator the rate is monotonically
    /// non-decreasing in the numerator.
    #[test]
    fn ratio_monotonic_in_positive(total in 1u64..10_000, a in 0u64..10_000, b in 0u64..10_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(percent(lo, total) <= percent(hi, total));
    }

    /// A group deviating from its own rate deviates by exactly zero.
    #[test]
    fn deviation_of_self_is_zero(rate in 0.0f64..100.0) {
        prop_assert_eq!(make_deviation(rate, rate), "+0.00%");
    }
}

// ============================================================================
//  Conservation
// ============================================================================

proptest! {
    /// Every observed event lands in exactly one counter: the sum of picked
    /// and not-picked tallies equals the number of observations.
    #[test]
    fn pick_counts_are_conserved(
        events in prop::collection::vec(
            (prop::sample::select(vec!["x", "y", "z"]), any::<bool>()),
            0..64,
        )
    ) {
        let mut counter = PickCounter::new();
        for (item, picked) in &events {
            if *picked {
                counter.observe_pick(item);
            } else {
                counter.observe_pass(item);
            }
        }

        let tallies = counter.into_tallies();
        let total: u64 = tallies.iter().map(|t| t.total()).sum();
        prop_assert_eq!(total, events.len() as u64);

        let picked: u64 = tallies.iter().map(|t| t.picked).sum();
        prop_assert_eq!(picked, events.iter().filter(|(_, p)| *p).count() as u64);
    }
}

// ============================================================================
//  Merge Additivity
// ============================================================================

proptest! {
    /// Aggregating the merge of two disjoint date-bucketed batches equals
    /// aggregating each separately and adding the counts per group.
    #[test]
    fn merged_corpus_counts_are_additive(left in run_batch(), right in run_batch()) {
        let left_counts = win_counts(&packs::pack_win_rate(&left, "")["Pack Win Rate"]);
        let right_counts = win_counts(&packs::pack_win_rate(&right, "")["Pack Win Rate"]);

        let mut corpus = RunCorpus::new();
        corpus.insert_batch("2024/01/a.log", left.clone());
        let mut other = RunCorpus::new();
        other.insert_batch("2024/02/b.log", right.clone());
        corpus.merge(other);

        let merged_runs = corpus.into_runs();
        let merged_counts =
            win_counts(&packs::pack_win_rate(&merged_runs, "")["Pack Win Rate"]);

        let mut expected: HashMap<String, (u64, u64)> = left_counts;
        for (pack, (wins, total)) in right_counts {
            let entry = expected.entry(pack).or_insert((0, 0));
            entry.0 += wins;
            entry.1 += total;
        }

        prop_assert_eq!(merged_counts, expected);
    }

    /// Bucketing never drops or duplicates records, at any level.
    #[test]
    fn bucketing_is_total(batch in run_batch(), level in 0usize..5) {
        let mut corpus = RunCorpus::new();
        corpus.insert_batch("2024/05/12.log", batch.clone());
        corpus.insert_batch("2024/06/03.log", batch.clone());
        corpus.insert_batch("2023/11/30.log", batch);

        prop_assert_eq!(corpus.bucket(level).total_runs(), corpus.total_runs());
    }
}

// ============================================================================
//  Blacklist Idempotence
// ============================================================================

proptest! {
    /// Repeating the identical blacklist string from the same host any
    /// number of times counts each pack exactly once.
    #[test]
    fn blacklist_counting_is_idempotent(filtered in pack_set(), repeats in 1usize..6) {
        let make = |n: usize| -> Vec<Run> {
            (0..n)
                .map(|_| Run {
                    host: Some("H".to_string()),
                    filtered_packs: Some(filtered.clone()),
                    ..Default::default()
                })
                .collect()
        };

        let once = packs::filtered_packs(&make(1), "");
        let many = packs::filtered_packs(&make(repeats), "");

        prop_assert_eq!(&once["Pack Blacklists"].rows, &many["Pack Blacklists"].rows);
    }
}
