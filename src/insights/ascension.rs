//! Ascension-bucketed analyses: win rates, deck sizes, rest-site behavior,
//! and the pack-by-ascension win-rate cross with its deviation variants.

use std::collections::HashMap;

use super::{make_deviation, make_ratio, median, percent, sort_desc_by};
use crate::models::{display_card, InsightMap, InsightTable, Run, CAMPFIRE_REST, CAMPFIRE_SMITH};

/// Minimum runs in an ascension bucket before it gets its own row.
pub const MIN_BUCKET_RUNS: u64 = 100;

/// Win rate per ascension level. Buckets under the sample threshold are
/// dropped; the `Overall` row always covers every run.
pub fn ascension_win_rate(runs: &[Run]) -> InsightMap {
    let mut buckets: HashMap<i64, (u64, u64)> = HashMap::new();
    let mut overall = (0u64, 0u64);

    for run in runs {
        let victory = u64::from(run.is_victory());
        overall.0 += victory;
        overall.1 += 1;

        if let Some(level) = run.bucketed_ascension() {
            let entry = buckets.entry(level).or_default();
            entry.0 += victory;
            entry.1 += 1;
        }
    }

    let mut levels: Vec<i64> = buckets.keys().copied().collect();
    levels.sort_unstable();

    let mut table = InsightTable::new(
        "Ascension Win Rate",
        "Win rate per ascension level; small buckets folded into Overall only",
        &["Ascension", "Wins", "Runs", "Win Rate"],
    );
    for level in levels {
        let (wins, total) = buckets[&level];
        if total < MIN_BUCKET_RUNS {
            continue;
        }
        table.push_row(vec![
            level.to_string(),
            wins.to_string(),
            total.to_string(),
            make_ratio(wins, total),
        ]);
    }
    table.push_row(vec![
        "Overall".to_string(),
        overall.0.to_string(),
        overall.1.to_string(),
        make_ratio(overall.0, overall.1),
    ]);
    table.into_map()
}

/// Median master-deck size per ascension level, victorious runs only.
pub fn median_deck_size(runs: &[Run]) -> InsightMap {
    let mut samples: HashMap<i64, Vec<f64>> = HashMap::new();

    for run in runs {
        if !run.is_victory() {
            continue;
        }
        if let Some(level) = run.bucketed_ascension() {
            samples
                .entry(level)
                .or_default()
                .push(run.master_deck.len() as f64);
        }
    }

    let mut levels: Vec<i64> = samples.keys().copied().collect();
    levels.sort_unstable();

    let mut table = InsightTable::new(
        "Median Deck Size",
        "Median final deck size of victorious runs per ascension",
        &["Ascension", "Victories", "Median Deck Size"],
    );
    for level in levels {
        let values = samples.get_mut(&level).unwrap();
        let count = values.len();
        if let Some(mid) = median(values) {
            table.push_row(vec![level.to_string(), count.to_string(), format!("{:.1}", mid)]);
        }
    }
    table.into_map()
}

/// Median current/max HP ratio at the floor of each REST decision, per
/// ascension. Decisions whose floor falls outside the recorded HP arrays
/// are skipped.
pub fn rest_hp_ratio(runs: &[Run]) -> InsightMap {
    let mut samples: HashMap<i64, Vec<f64>> = HashMap::new();

    for run in runs {
        let Some(level) = run.bucketed_ascension() else {
            continue;
        };
        for choice in &run.campfire_choices {
            if choice.key.as_deref() != Some(CAMPFIRE_REST) {
                continue;
            }
            let Some(floor) = choice.floor else {
                continue;
            };
            if let Some(ratio) = run.hp_ratio_at_floor(floor) {
                samples.entry(level).or_default().push(ratio * 100.0);
            }
        }
    }

    let mut levels: Vec<i64> = samples.keys().copied().collect();
    levels.sort_unstable();

    let mut table = InsightTable::new(
        "Health Before Rest",
        "Median health percentage at the moment of a rest decision, per ascension",
        &["Ascension", "Rests", "Median HP"],
    );
    for level in levels {
        let values = samples.get_mut(&level).unwrap();
        let count = values.len();
        if let Some(mid) = median(values) {
            table.push_row(vec![
                level.to_string(),
                count.to_string(),
                format!("{:.2}%", mid),
            ]);
        }
    }
    table.into_map()
}

/// How often a rest site is spent upgrading rather than resting, per
/// ascension.
pub fn smith_rest_ratio(runs: &[Run]) -> InsightMap {
    let mut counts: HashMap<i64, (u64, u64)> = HashMap::new();

    for run in runs {
        let Some(level) = run.bucketed_ascension() else {
            continue;
        };
        for choice in &run.campfire_choices {
            match choice.key.as_deref() {
                Some(CAMPFIRE_SMITH) => counts.entry(level).or_default().0 += 1,
                Some(CAMPFIRE_REST) => counts.entry(level).or_default().1 += 1,
                _ => {}
            }
        }
    }

    let mut levels: Vec<i64> = counts.keys().copied().collect();
    levels.sort_unstable();

    let mut table = InsightTable::new(
        "Upgrade vs Rest",
        "Share of rest-site decisions spent upgrading, per ascension",
        &["Ascension", "Upgrades", "Rests", "Upgrade Rate"],
    );
    for level in levels {
        let (smiths, rests) = counts[&level];
        table.push_row(vec![
            level.to_string(),
            smiths.to_string(),
            rests.to_string(),
            make_ratio(smiths, smiths + rests),
        ]);
    }
    table.into_map()
}

// ── Pack x ascension cross ──────────────────────────────────────

struct PackAscensionTally {
    cells: HashMap<(String, i64), (u64, u64)>,
    pack_totals: HashMap<String, (u64, u64)>,
    level_totals: HashMap<i64, (u64, u64)>,
}

fn tally_pack_ascension(runs: &[Run]) -> PackAscensionTally {
    let mut cells: HashMap<(String, i64), (u64, u64)> = HashMap::new();
    let mut pack_totals: HashMap<String, (u64, u64)> = HashMap::new();
    let mut level_totals: HashMap<i64, (u64, u64)> = HashMap::new();

    for run in runs {
        let Some(level) = run.bucketed_ascension() else {
            continue;
        };
        let victory = u64::from(run.is_victory());

        let lt = level_totals.entry(level).or_default();
        lt.0 += victory;
        lt.1 += 1;

        for pack in run.current_pack_list() {
            let cell = cells.entry((pack.to_string(), level)).or_default();
            cell.0 += victory;
            cell.1 += 1;

            let pt = pack_totals.entry(pack.to_string()).or_default();
            pt.0 += victory;
            pt.1 += 1;
        }
    }

    PackAscensionTally {
        cells,
        pack_totals,
        level_totals,
    }
}

fn sorted_cells(tally: &PackAscensionTally) -> Vec<(&(String, i64), &(u64, u64))> {
    let mut cells: Vec<_> = tally.cells.iter().collect();
    cells.sort_by(|a, b| a.0.cmp(b.0));
    cells
}

/// Win rate per pack at each ascension level.
pub fn pack_win_rate_by_ascension(runs: &[Run], namespace: &str) -> InsightMap {
    let tally = tally_pack_ascension(runs);

    let mut table = InsightTable::new(
        "Pack Win Rate By Ascension",
        "Win rate of runs with a pack active, split by ascension level",
        &["Pack", "Ascension", "Wins", "Runs", "Win Rate"],
    );
    for ((pack, level), (wins, total)) in sorted_cells(&tally) {
        table.push_row(vec![
            display_card(pack, namespace),
            level.to_string(),
            wins.to_string(),
            total.to_string(),
            make_ratio(*wins, *total),
        ]);
    }
    table.into_map()
}

/// Each pack-ascension cell against the pack's own overall win rate.
pub fn pack_ascension_deviation(runs: &[Run], namespace: &str) -> InsightMap {
    let tally = tally_pack_ascension(runs);

    let mut table = InsightTable::new(
        "Pack Ascension Deviation",
        "Pack win rate at an ascension level minus the pack's overall win rate",
        &["Pack", "Ascension", "Win Rate", "Pack Overall", "Deviation"],
    );
    for ((pack, level), (wins, total)) in sorted_cells(&tally) {
        let (pack_wins, pack_runs) = tally.pack_totals[pack.as_str()];
        let reference = percent(pack_wins, pack_runs);
        table.push_row(vec![
            display_card(pack, namespace),
            level.to_string(),
            make_ratio(*wins, *total),
            format!("{:.2}%", reference),
            make_deviation(percent(*wins, *total), reference),
        ]);
    }
    table.into_map()
}

/// How each pack's win rate shifts between ascension 0 and ascension 20.
/// Only packs observed at both extremes are listed.
pub fn pack_low_high_deviation(runs: &[Run], namespace: &str) -> InsightMap {
    let tally = tally_pack_ascension(runs);

    let mut packs: Vec<&String> = tally.pack_totals.keys().collect();
    packs.sort_unstable();

    let mut entries: Vec<(String, f64, f64)> = Vec::new();
    for pack in packs {
        let low = tally.cells.get(&(pack.clone(), 0));
        let high = tally.cells.get(&(pack.clone(), 20));
        if let (Some((lw, lt)), Some((hw, ht))) = (low, high) {
            entries.push((pack.clone(), percent(*lw, *lt), percent(*hw, *ht)));
        }
    }
    sort_desc_by(&mut entries, |(_, low, high)| high - low);

    let mut table = InsightTable::new(
        "Pack A0 vs A20",
        "Pack win rate shift from ascension 0 to ascension 20",
        &["Pack", "A0 Win Rate", "A20 Win Rate", "Deviation"],
    );
    for (pack, low, high) in entries {
        table.push_row(vec![
            display_card(&pack, namespace),
            format!("{:.2}%", low),
            format!("{:.2}%", high),
            make_deviation(high, low),
        ]);
    }
    table.into_map()
}

/// Each pack-ascension cell against the global win rate at that ascension.
pub fn pack_global_deviation(runs: &[Run], namespace: &str) -> InsightMap {
    let tally = tally_pack_ascension(runs);

    let mut table = InsightTable::new(
        "Pack vs Global By Ascension",
        "Pack win rate at an ascension level minus the global win rate there",
        &["Pack", "Ascension", "Win Rate", "Global", "Deviation"],
    );
    for ((pack, level), (wins, total)) in sorted_cells(&tally) {
        let (gw, gt) = tally.level_totals[level];
        let reference = percent(gw, gt);
        table.push_row(vec![
            display_card(pack, namespace),
            level.to_string(),
            make_ratio(*wins, *total),
            format!("{:.2}%", reference),
            make_deviation(percent(*wins, *total), reference),
        ]);
    }
    table.into_map()
}
