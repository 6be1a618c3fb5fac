//! Campfire upgrade analyses.

use std::collections::{HashMap, HashSet};

use super::{make_deviation, make_ratio, percent, sort_desc_by, WinCounter};
use crate::models::{base_card, display_card, InsightMap, InsightTable, Run, CAMPFIRE_SMITH};

/// Minimum upgrade events before a card appears in the upgrade tables.
pub const MIN_UPGRADES: u64 = 350;

fn smith_targets(run: &Run) -> impl Iterator<Item = &str> {
    run.campfire_choices
        .iter()
        .filter(|c| c.key.as_deref() == Some(CAMPFIRE_SMITH))
        .filter_map(|c| c.data.as_deref())
        .filter(|card| !card.is_empty())
        .map(base_card)
}

/// How often each card is chosen for a campfire upgrade.
pub fn upgrade_frequency(runs: &[Run], namespace: &str) -> InsightMap {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for run in runs {
        for card in smith_targets(run) {
            *counts.entry(card.to_string()).or_default() += 1;
        }
    }

    let mut entries: Vec<(String, u64)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_UPGRADES)
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    sort_desc_by(&mut entries, |(_, count)| *count as f64);

    let mut table = InsightTable::new(
        "Upgrade Frequency",
        "How often a card is chosen for a campfire upgrade",
        &["Card", "Upgrades"],
    );
    for (card, count) in entries {
        table.push_row(vec![display_card(&card, namespace), count.to_string()]);
    }
    table.into_map()
}

/// Win rate of runs that campfire-upgraded a card, against the card's
/// general win rate (runs ending with the base card in the master deck).
/// The base-card baseline applies even when the card was upgraded more than
/// once in a run.
pub fn upgrade_win_rate(runs: &[Run], namespace: &str) -> InsightMap {
    let mut event_counts: HashMap<String, u64> = HashMap::new();
    let mut upgraded = WinCounter::new();
    let mut baseline = WinCounter::new();

    for run in runs {
        let victory = run.is_victory();

        let mut upgraded_cards: HashSet<&str> = HashSet::new();
        for card in smith_targets(run) {
            *event_counts.entry(card.to_string()).or_default() += 1;
            upgraded_cards.insert(card);
        }
        for card in upgraded_cards {
            upgraded.observe(card, victory);
        }

        let deck_cards: HashSet<&str> = run.master_deck.iter().map(|c| base_card(c)).collect();
        for card in deck_cards {
            baseline.observe(card, victory);
        }
    }

    let mut tallies = upgraded.into_tallies();
    tallies.retain(|t| event_counts.get(&t.key).copied().unwrap_or(0) >= MIN_UPGRADES);

    let mut entries: Vec<(String, u64, u64, f64, f64)> = tallies
        .into_iter()
        .map(|t| {
            let reference = baseline
                .get(&t.key)
                .map(|(w, r)| percent(w, r))
                .unwrap_or(0.0);
            (t.key.clone(), t.wins, t.runs, t.rate(), reference)
        })
        .collect();
    sort_desc_by(&mut entries, |(_, _, _, rate, reference)| rate - reference);

    let mut table = InsightTable::new(
        "Upgrade Win Rate",
        "Win rate of runs that upgraded a card at a campfire, vs the card's general win rate",
        &["Card", "Upgraded Wins", "Upgraded Runs", "Win Rate", "Baseline", "Deviation"],
    );
    for (card, wins, total, rate, reference) in entries {
        table.push_row(vec![
            display_card(&card, namespace),
            wins.to_string(),
            total.to_string(),
            make_ratio(wins, total),
            format!("{:.2}%", reference),
            make_deviation(rate, reference),
        ]);
    }
    table.into_map()
}
