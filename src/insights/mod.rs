//! Insight engine: shared aggregation primitives and the analysis catalog.
//!
//! Every analysis is a pure function of its inputs with the signature
//! `(runs, ...lookups...) -> InsightMap`, callable on any subsequence of the
//! corpus. The primitives here carry the conventions every analysis shares:
//! zero-denominator rates are 0, deviations are signed percent points with
//! an explicit `+`, medians of empty samples do not exist, and result rows
//! are sorted by one numeric column before the table is assembled.

pub mod ascension;
pub mod cards;
pub mod encounters;
pub mod gems;
pub mod packs;
pub mod players;
pub mod synergy;
pub mod upgrades;

use std::collections::HashMap;

use crate::config::ContentConfig;
use crate::models::{merge_insights, CardIndex, InsightMap, Run};

// ── Ratio / deviation / median ──────────────────────────────────

/// Percentage of `positive` over `total`. Zero denominator yields 0.0.
pub fn percent(positive: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (positive as f64 / total as f64) * 100.0
    }
}

/// Two-decimal percentage string, e.g. `"33.33%"`. Never divides by zero.
pub fn make_ratio(positive: u64, total: u64) -> String {
    format!("{:.2}%", percent(positive, total))
}

/// Signed percent-point difference of a rate from a reference, with an
/// explicit `+` for positive values, e.g. `"+4.20%"`.
pub fn make_deviation(rate: f64, reference: f64) -> String {
    format!("{:+.2}%", rate - reference)
}

/// Statistical median; mean of the two middle values for even-sized samples.
/// `None` for an empty sample — callers must omit the group, never emit a
/// placeholder.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Stable descending sort by a numeric key; ties keep their relative order.
pub fn sort_desc_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

// ── Counted-set splitting ───────────────────────────────────────

/// Tally for one offered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickTally {
    pub item: String,
    pub picked: u64,
    pub not_picked: u64,
}

impl PickTally {
    pub fn total(&self) -> u64 {
        self.picked + self.not_picked
    }

    pub fn rate(&self) -> f64 {
        percent(self.picked, self.total())
    }
}

/// Accumulates picked / not-picked counts for offer events. Each event
/// contributes exactly one increment to the picked counter of its picked
/// item and one to the not-picked counter of every passed-over item.
#[derive(Debug, Default)]
pub struct PickCounter {
    picked: HashMap<String, u64>,
    not_picked: HashMap<String, u64>,
}

impl PickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_pick(&mut self, item: &str) {
        *self.picked.entry(item.to_string()).or_default() += 1;
    }

    pub fn observe_pass(&mut self, item: &str) {
        *self.not_picked.entry(item.to_string()).or_default() += 1;
    }

    /// Drain into per-item tallies. Items only ever passed over are included
    /// with zero picks.
    pub fn into_tallies(mut self) -> Vec<PickTally> {
        let mut items: Vec<String> = self.picked.keys().cloned().collect();
        items.extend(self.not_picked.keys().cloned());
        items.sort_unstable();
        items.dedup();

        items
            .into_iter()
            .map(|item| {
                let picked = self.picked.remove(&item).unwrap_or(0);
                let not_picked = self.not_picked.remove(&item).unwrap_or(0);
                PickTally {
                    item,
                    picked,
                    not_picked,
                }
            })
            .collect()
    }
}

// ── Win counting ────────────────────────────────────────────────

/// Wins/runs tally for one group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinTally {
    pub key: String,
    pub wins: u64,
    pub runs: u64,
}

impl WinTally {
    pub fn rate(&self) -> f64 {
        percent(self.wins, self.runs)
    }
}

/// Per-key wins/runs accumulator used by every win-rate table.
#[derive(Debug, Default)]
pub struct WinCounter {
    tallies: HashMap<String, (u64, u64)>,
}

impl WinCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: &str, victory: bool) {
        let entry = self.tallies.entry(key.to_string()).or_default();
        entry.0 += u64::from(victory);
        entry.1 += 1;
    }

    pub fn get(&self, key: &str) -> Option<(u64, u64)> {
        self.tallies.get(key).copied()
    }

    /// Drain into per-key tallies, sorted by key for determinism; callers
    /// re-sort by their numeric column.
    pub fn into_tallies(self) -> Vec<WinTally> {
        let mut tallies: Vec<WinTally> = self
            .tallies
            .into_iter()
            .map(|(key, (wins, runs))| WinTally { key, wins, runs })
            .collect();
        tallies.sort_by(|a, b| a.key.cmp(&b.key));
        tallies
    }
}

// ── Catalog registry ────────────────────────────────────────────

/// Run the full analysis catalog over one run corpus and merge the results.
pub fn compute_all(runs: &[Run], index: &CardIndex, content: &ContentConfig) -> InsightMap {
    let ns = content.namespace_prefix.as_str();

    merge_insights([
        packs::filtered_packs(runs, ns),
        packs::expansions_enabled(runs),
        packs::expansions_enabled_per_host(runs),
        packs::pack_pick_rate(runs, ns),
        packs::pack_win_rate(runs, ns),
        cards::card_pick_rate(runs, index, ns),
        cards::card_pick_rate_upgrades(runs, index, ns),
        cards::card_win_rate(runs, index, ns),
        cards::card_pick_deviation(runs, index, ns),
        ascension::ascension_win_rate(runs),
        ascension::median_deck_size(runs),
        ascension::rest_hp_ratio(runs),
        ascension::smith_rest_ratio(runs),
        ascension::pack_win_rate_by_ascension(runs, ns),
        ascension::pack_ascension_deviation(runs, ns),
        ascension::pack_low_high_deviation(runs, ns),
        ascension::pack_global_deviation(runs, ns),
        upgrades::upgrade_frequency(runs, ns),
        upgrades::upgrade_win_rate(runs, ns),
        gems::gem_win_rate(runs, &content.gem_marker),
        gems::gem_count_win_rate(runs, &content.gem_marker),
        synergy::card_synergies(runs, ns, &content.starter_cards),
        players::frequent_hosts(runs),
        players::picked_hats(runs, ns),
        encounters::encounter_turns(runs),
    ])
}
