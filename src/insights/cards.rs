//! Card-level analyses: pick rates, win rates, pack-mean deviation.

use std::collections::{HashMap, HashSet};

use super::{make_deviation, make_ratio, sort_desc_by, PickCounter, PickTally, WinCounter};
use crate::models::{base_card, display_card, CardIndex, InsightMap, InsightTable, Run};

/// Minimum observed offers before a card appears in a pick-rate table.
pub const MIN_OFFERS: u64 = 200;

/// Minimum runs with a card in the master deck before it appears in the
/// win-rate table.
pub const MIN_DECK_RUNS: u64 = 50;

fn pick_tallies(runs: &[Run], index: &CardIndex, keep_upgrades: bool) -> Vec<PickTally> {
    let mut counter = PickCounter::new();

    for run in runs {
        for choice in &run.card_choices {
            if let Some(picked) = choice.picked.as_deref().filter(|c| !c.is_empty()) {
                if !index.is_excluded(picked) {
                    let key = if keep_upgrades { picked } else { base_card(picked) };
                    counter.observe_pick(key);
                }
            }
            for passed in &choice.not_picked {
                if passed.is_empty() || index.is_excluded(passed) {
                    continue;
                }
                let key = if keep_upgrades { passed } else { base_card(passed) };
                counter.observe_pass(key);
            }
        }
    }

    counter.into_tallies()
}

fn pick_rate_table(
    name: &str,
    description: &str,
    mut tallies: Vec<PickTally>,
    namespace: &str,
) -> InsightMap {
    tallies.retain(|t| t.total() >= MIN_OFFERS);
    sort_desc_by(&mut tallies, |t| t.rate());

    let mut table = InsightTable::new(name, description, &["Card", "Picked", "Offered", "Pick Rate"]);
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

/// Pick rate per card, upgrade suffixes collapsed to base identity.
pub fn card_pick_rate(runs: &[Run], index: &CardIndex, namespace: &str) -> InsightMap {
    pick_rate_table(
        "Card Pick Rate",
        "How often a card is taken when offered, upgrades collapsed",
        pick_tallies(runs, index, false),
        namespace,
    )
}

/// Pick rate per card with upgraded forms kept distinct.
pub fn card_pick_rate_upgrades(runs: &[Run], index: &CardIndex, namespace: &str) -> InsightMap {
    pick_rate_table(
        "Card Pick Rate (Upgrades)",
        "How often a card is taken when offered, upgraded forms distinct",
        pick_tallies(runs, index, true),
        namespace,
    )
}

/// Win rate of runs holding a card at run end. A card in the master deck
/// counts as one observation per run regardless of copies.
pub fn card_win_rate(runs: &[Run], index: &CardIndex, namespace: &str) -> InsightMap {
    let mut counter = WinCounter::new();

    for run in runs {
        let victory = run.is_victory();
        let cards: HashSet<&str> = run
            .master_deck
            .iter()
            .map(|c| base_card(c))
            .filter(|c| !c.is_empty() && !index.is_excluded(c))
            .collect();
        for card in cards {
            counter.observe(card, victory);
        }
    }

    let mut tallies = counter.into_tallies();
    tallies.retain(|t| t.runs >= MIN_DECK_RUNS);
    sort_desc_by(&mut tallies, |t| t.rate());

    let mut table = InsightTable::new(
        "Card Win Rate",
        "Win rate of runs that ended holding a card",
        &["Card", "Wins", "Runs", "Win Rate"],
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

/// Card pick rate relative to the mean pick rate of the cards of its pack.
/// Cards whose pack is unknown are excluded; so are cards under the offer
/// threshold (their noise would distort the pack means).
pub fn card_pick_deviation(runs: &[Run], index: &CardIndex, namespace: &str) -> InsightMap {
    let mut tallies = pick_tallies(runs, index, false);
    tallies.retain(|t| t.total() >= MIN_OFFERS);

    // Pack mean = unweighted mean of its cards' pick rates.
    let mut pack_rates: HashMap<String, Vec<f64>> = HashMap::new();
    for tally in &tallies {
        if let Some(pack) = index.pack_of(&tally.item) {
            pack_rates.entry(pack.to_string()).or_default().push(tally.rate());
        }
    }
    let pack_means: HashMap<String, f64> = pack_rates
        .into_iter()
        .map(|(pack, rates)| {
            let mean = rates.iter().sum::<f64>() / rates.len() as f64;
            (pack, mean)
        })
        .collect();

    let mut entries: Vec<(PickTally, String, f64)> = tallies
        .into_iter()
        .filter_map(|t| {
            let pack = index.pack_of(&t.item)?.to_string();
            let mean = *pack_means.get(&pack)?;
            Some((t, pack, mean))
        })
        .collect();
    sort_desc_by(&mut entries, |(t, _, mean)| t.rate() - mean);

    let mut table = InsightTable::new(
        "Card Pick Deviation",
        "Card pick rate minus the mean pick rate of its pack",
        &["Card", "Pack", "Pick Rate", "Pack Mean", "Deviation"],
    );
    for (tally, pack, mean) in entries {
        table.push_row(vec![
            display_card(&tally.item, namespace),
            display_card(&pack, namespace),
            make_ratio(tally.picked, tally.total()),
            format!("{:.2}%", mean),
            make_deviation(tally.rate(), mean),
        ]);
    }
    table.into_map()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OfferChoice;
    use pretty_assertions::assert_eq;

    fn index() -> CardIndex {
        let mut packs = HashMap::new();
        packs.insert("ns:Slam".to_string(), "ns:Warrior".to_string());
        packs.insert("ns:Guard".to_string(), "ns:Warrior".to_string());

        let mut rarities = HashMap::new();
        rarities.insert("ns:Strike".to_string(), "BASIC".to_string());
        rarities.insert("ns:Slam".to_string(), "COMMON".to_string());

        CardIndex::new(packs, rarities)
    }

    fn offer(picked: &str, passed: &[&str]) -> OfferChoice {
        OfferChoice {
            picked: Some(picked.to_string()),
            not_picked: passed.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn runs_with_offers(n: usize, choice: OfferChoice) -> Vec<Run> {
        (0..n)
            .map(|_| Run {
                card_choices: vec![choice.clone()],
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_pick_tallies_collapse_upgrades() {
        let runs = vec![Run {
            card_choices: vec![offer("ns:Slam+1", &["ns:Slam"])],
            ..Default::default()
        }];

        let tallies = pick_tallies(&runs, &index(), false);
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies[0].item, "ns:Slam");
        assert_eq!(tallies[0].picked, 1);
        assert_eq!(tallies[0].not_picked, 1);
    }

    #[test]
    fn test_pick_tallies_keep_upgrades_distinct() {
        let runs = vec![Run {
            card_choices: vec![offer("ns:Slam+1", &["ns:Slam"])],
            ..Default::default()
        }];

        let tallies = pick_tallies(&runs, &index(), true);
        assert_eq!(tallies.len(), 2);
    }

    #[test]
    fn test_basic_rarity_excluded() {
        let runs = vec![Run {
            card_choices: vec![offer("ns:Strike", &["ns:Slam"])],
            ..Default::default()
        }];

        let tallies = pick_tallies(&runs, &index(), false);
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies[0].item, "ns:Slam");
    }

    #[test]
    fn test_pick_rate_threshold_applied() {
        // 199 offers stays out, 200 gets in.
        let under = runs_with_offers(199, offer("ns:Slam", &[]));
        let map = card_pick_rate(&under, &index(), "ns:");
        assert!(map["Card Pick Rate"].rows.is_empty());

        let at = runs_with_offers(200, offer("ns:Slam", &[]));
        let map = card_pick_rate(&at, &index(), "ns:");
        assert_eq!(map["Card Pick Rate"].rows.len(), 1);
        assert_eq!(map["Card Pick Rate"].rows[0][0], "Slam");
    }

    #[test]
    fn test_card_win_rate_dedups_copies() {
        let mut runs = Vec::new();
        for i in 0..MIN_DECK_RUNS {
            runs.push(Run {
                victory: Some(i % 2 == 0),
                master_deck: vec!["ns:Slam".to_string(), "ns:Slam+1".to_string()],
                ..Default::default()
            });
        }

        let map = card_win_rate(&runs, &index(), "ns:");
        let table = &map["Card Win Rate"];
        assert_eq!(table.rows.len(), 1);
        // 50 runs, not 100: the two copies collapse to one observation.
        assert_eq!(table.rows[0][2], "50");
        assert_eq!(table.rows[0][3], "50.00%");
    }

    #[test]
    fn test_card_win_rate_threshold() {
        let runs: Vec<Run> = (0..MIN_DECK_RUNS - 1)
            .map(|_| Run {
                victory: Some(true),
                master_deck: vec!["ns:Slam".to_string()],
                ..Default::default()
            })
            .collect();

        let map = card_win_rate(&runs, &index(), "ns:");
        assert!(map["Card Win Rate"].rows.is_empty());
    }

    #[test]
    fn test_pick_deviation_against_pack_mean() {
        // Slam picked always, Guard never; pack mean 50%, deviations +-50.
        let mut runs = Vec::new();
        runs.extend(runs_with_offers(200, offer("ns:Slam", &["ns:Guard"])));

        let map = card_pick_deviation(&runs, &index(), "ns:");
        let table = &map["Card Pick Deviation"];

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Slam");
        assert_eq!(table.rows[0][4], "+50.00%");
        assert_eq!(table.rows[1][0], "Guard");
        assert_eq!(table.rows[1][4], "-50.00%");
    }

    #[test]
    fn test_pick_deviation_skips_unknown_pack() {
        let runs = runs_with_offers(200, offer("ns:Mystery", &[]));
        let map = card_pick_deviation(&runs, &index(), "ns:");
        assert!(map["Card Pick Deviation"].rows.is_empty());
    }
}
