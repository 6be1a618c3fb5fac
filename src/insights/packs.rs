//! Pack-level analyses: blacklists, expansion toggles, pick and win rates.

use std::collections::{HashMap, HashSet};

use super::{make_ratio, sort_desc_by, PickCounter, WinCounter};
use crate::models::{display_card, InsightMap, InsightTable, Run};

/// How often each pack is blacklisted, counted once per host per pack no
/// matter how many runs repeat the same blacklist string.
pub fn filtered_packs(runs: &[Run], namespace: &str) -> InsightMap {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut seen_per_host: HashMap<String, HashSet<String>> = HashMap::new();

    for run in runs {
        let Some(host) = run.host.as_deref() else {
            continue;
        };
        if host.is_empty() {
            continue;
        }
        let seen = seen_per_host.entry(host.to_string()).or_default();

        for pack in run.filtered_pack_list() {
            if seen.insert(pack.to_string()) {
                *counts.entry(pack.to_string()).or_default() += 1;
            }
        }
    }

    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    sort_desc_by(&mut entries, |(_, count)| *count as f64);

    let mut table = InsightTable::new(
        "Pack Blacklists",
        "Hosts that ever blacklisted a pack, one count per host per pack",
        &["Pack", "Hosts"],
    );
    for (pack, count) in entries {
        table.push_row(vec![display_card(&pack, namespace), count.to_string()]);
    }
    table.into_map()
}

/// Share of runs played with expansion packs enabled.
pub fn expansions_enabled(runs: &[Run]) -> InsightMap {
    let total = runs.len() as u64;
    let enabled = runs
        .iter()
        .filter(|r| r.enabled_expansion_packs == Some(true))
        .count() as u64;

    let mut table = InsightTable::new(
        "Expansions Enabled",
        "Runs played with expansion packs enabled",
        &["Enabled", "Total", "Rate"],
    );
    table.push_row(vec![
        enabled.to_string(),
        total.to_string(),
        make_ratio(enabled, total),
    ]);
    table.into_map()
}

/// Share of hosts that enabled expansion packs in any of their runs.
pub fn expansions_enabled_per_host(runs: &[Run]) -> InsightMap {
    let mut per_host: HashMap<String, bool> = HashMap::new();

    for run in runs {
        let (Some(host), Some(enabled)) = (run.host.as_deref(), run.enabled_expansion_packs)
        else {
            continue;
        };
        let entry = per_host.entry(host.to_string()).or_insert(false);
        *entry = *entry || enabled;
    }

    let total = per_host.len() as u64;
    let enabled = per_host.values().filter(|e| **e).count() as u64;

    let mut table = InsightTable::new(
        "Expansions Enabled Per Host",
        "Hosts that enabled expansion packs in at least one run",
        &["Hosts Enabled", "Hosts", "Rate"],
    );
    table.push_row(vec![
        enabled.to_string(),
        total.to_string(),
        make_ratio(enabled, total),
    ]);
    table.into_map()
}

/// Pick rate per pack across all pack offers.
pub fn pack_pick_rate(runs: &[Run], namespace: &str) -> InsightMap {
    let mut counter = PickCounter::new();

    for run in runs {
        for choice in &run.pack_choices {
            if let Some(picked) = choice.picked.as_deref().filter(|p| !p.is_empty()) {
                counter.observe_pick(picked);
            }
            for passed in &choice.not_picked {
                if !passed.is_empty() {
                    counter.observe_pass(passed);
                }
            }
        }
    }

    let mut tallies = counter.into_tallies();
    sort_desc_by(&mut tallies, |t| t.rate());

    let mut table = InsightTable::new(
        "Pack Pick Rate",
        "How often a pack is taken when offered",
        &["Pack", "Picked", "Offered", "Pick Rate"],
    );
    for tally in tallies {
        table.push_row(vec![
            display_card(&tally.item, namespace),
            tally.picked.to_string(),
            tally.total().to_string(),
            make_ratio(tally.picked, tally.total()),
        ]);
    }
    table.into_map()
}

/// Win rate per pack; the denominator is runs containing the pack.
pub fn pack_win_rate(runs: &[Run], namespace: &str) -> InsightMap {
    let mut counter = WinCounter::new();

    for run in runs {
        let victory = run.is_victory();
        for pack in run.current_pack_list() {
            counter.observe(pack, victory);
        }
    }

    let mut tallies = counter.into_tallies();
    sort_desc_by(&mut tallies, |t| t.rate());

    let mut table = InsightTable::new(
        "Pack Win Rate",
        "Win rate of runs that had a pack active",
        &["Pack", "Wins", "Runs", "Win Rate"],
    );
    for tally in tallies {
        table.push_row(vec![
            display_card(&tally.key, namespace),
            tally.wins.to_string(),
            tally.runs.to_string(),
            make_ratio(tally.wins, tally.runs),
        ]);
    }
    table.into_map()
}
