//! Gem-socket analyses (content-pack specific).
//!
//! A deck-slot modifier is counted as a gem only when its string contains
//! the configured marker substring; the marker is an artifact of one content
//! pack's naming, so it is injected rather than baked in.

use std::collections::HashSet;

use super::{make_ratio, sort_desc_by, WinCounter};
use crate::models::{InsightMap, InsightTable, Run};

fn gems_of(run: &Run, marker: &str) -> Vec<String> {
    run.card_modifiers
        .iter()
        .flatten()
        .flatten()
        .filter(|m| m.contains(marker))
        .cloned()
        .collect()
}

/// Win rate of runs per socketed gem kind.
pub fn gem_win_rate(runs: &[Run], marker: &str) -> InsightMap {
    let mut counter = WinCounter::new();

    for run in runs {
        let victory = run.is_victory();
        let distinct: HashSet<String> = gems_of(run, marker).into_iter().collect();
        for gem in distinct {
            counter.observe(&gem, victory);
        }
    }

    let mut tallies = counter.into_tallies();
    sort_desc_by(&mut tallies, |t| t.rate());

    let mut table = InsightTable::new(
        "Gem Win Rate",
        "Win rate of runs that socketed a gem kind at least once",
        &["Gem", "Wins", "Runs", "Win Rate"],
    );
    for tally in tallies {
        table.push_row(vec![
            tally.key.clone(),
            tally.wins.to_string(),
            tally.runs.to_string(),
            make_ratio(tally.wins, tally.runs),
        ]);
    }
    table.into_map()
}

/// Win rate grouped by how many gems a run socketed in total. Only runs
/// where the modifier mechanic is present (any modifier slot recorded)
/// participate.
pub fn gem_count_win_rate(runs: &[Run], marker: &str) -> InsightMap {
    let mut counter = WinCounter::new();

    for run in runs {
        if run.card_modifiers.is_empty() {
            continue;
        }
        let count = gems_of(run, marker).len();
        counter.observe(&count.to_string(), run.is_victory());
    }

    let mut tallies = counter.into_tallies();
    tallies.sort_by_key(|t| t.key.parse::<u64>().unwrap_or(u64::MAX));

    let mut table = InsightTable::new(
        "Win Rate By Gem Count",
        "Win rate by total gems socketed over the run",
        &["Gems Socketed", "Wins", "Runs", "Win Rate"],
    );
    for tally in tallies {
        table.push_row(vec![
            tally.key.clone(),
            tally.wins.to_string(),
            tally.runs.to_string(),
            make_ratio(tally.wins, tally.runs),
        ]);
    }
    table.into_map()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn modded_run(mods: Vec<Option<Vec<&str>>>, victory: bool) -> Run {
        Run {
            victory: Some(victory),
            card_modifiers: mods
                .into_iter()
                .map(|slot| slot.map(|mods| mods.into_iter().map(String::from).collect()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gem_win_rate_matches_marker_only() {
        let runs = vec![modded_run(
            vec![
                Some(vec!["champ:GemRed", "champ:Sharpened"]),
                None,
                Some(vec!["champ:GemBlue"]),
            ],
            true,
        )];

        let map = gem_win_rate(&runs, "Gem");
        let table = &map["Gem Win Rate"];

        let gems: Vec<&String> = table.rows.iter().map(|r| &r[0]).collect();
        assert_eq!(gems.len(), 2);
        assert!(gems.iter().all(|g| g.contains("Gem")));
    }

    #[test]
    fn test_gem_win_rate_dedups_within_run() {
        let runs = vec![modded_run(
            vec![Some(vec!["champ:GemRed"]), Some(vec!["champ:GemRed"])],
            true,
        )];

        let map = gem_win_rate(&runs, "Gem");
        assert_eq!(map["Gem Win Rate"].rows[0][2], "1");
    }

    #[test]
    fn test_gem_count_groups_and_orders() {
        let runs = vec![
            modded_run(vec![Some(vec!["champ:GemRed", "champ:GemBlue"])], true),
            modded_run(vec![Some(vec!["champ:GemRed"])], false),
            modded_run(vec![None], false),
        ];

        let map = gem_count_win_rate(&runs, "Gem");
        let table = &map["Win Rate By Gem Count"];

        assert_eq!(
            table.rows,
            vec![
                vec!["0".to_string(), "0".to_string(), "1".to_string(), "0.00%".to_string()],
                vec!["1".to_string(), "0".to_string(), "1".to_string(), "0.00%".to_string()],
                vec!["2".to_string(), "1".to_string(), "1".to_string(), "100.00%".to_string()],
            ]
        );
    }

    #[test]
    fn test_gem_count_skips_runs_without_mechanic() {
        let runs = vec![Run {
            victory: Some(true),
            ..Default::default()
        }];

        let map = gem_count_win_rate(&runs, "Gem");
        assert!(map["Win Rate By Gem Count"].rows.is_empty());
    }
}
