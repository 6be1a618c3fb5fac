//! Card-pair co-occurrence ("synergy") analysis.

use std::collections::{BTreeSet, HashMap};

use super::{make_ratio, sort_desc_by};
use crate::models::{base_card, display_card, InsightMap, InsightTable, Run};

/// Minimum runs containing a pair before it appears in the table.
pub const MIN_PAIR_RUNS: u64 = 800;

fn is_starter(card: &str, namespace: &str, starters: &[String]) -> bool {
    let name = display_card(card, namespace);
    starters
        .iter()
        .any(|s| name == *s || name.starts_with(&format!("{}_", s)))
}

/// Unordered pairs of distinct deck cards, counted once per run.
fn deck_pairs(run: &Run, namespace: &str, starters: &[String]) -> Vec<(String, String)> {
    let cards: BTreeSet<&str> = run
        .master_deck
        .iter()
        .map(|c| base_card(c))
        .filter(|c| !c.is_empty() && !is_starter(c, namespace, starters))
        .collect();

    let cards: Vec<&str> = cards.into_iter().collect();
    let mut pairs = Vec::new();
    for (i, a) in cards.iter().enumerate() {
        for b in &cards[i + 1..] {
            pairs.push((a.to_string(), b.to_string()));
        }
    }
    pairs
}

/// Pairs of cards that finish runs together: how often the pair shows up in
/// victorious decks, with the pair's win rate over all runs containing it.
/// Ubiquitous starter cards are excluded so they do not dominate every row.
pub fn card_synergies(runs: &[Run], namespace: &str, starters: &[String]) -> InsightMap {
    let mut tallies: HashMap<(String, String), (u64, u64)> = HashMap::new();

    for run in runs {
        let victory = u64::from(run.is_victory());
        for pair in deck_pairs(run, namespace, starters) {
            let entry = tallies.entry(pair).or_default();
            entry.0 += victory;
            entry.1 += 1;
        }
    }

    let mut entries: Vec<((String, String), (u64, u64))> = tallies
        .into_iter()
        .filter(|(_, (_, total))| *total >= MIN_PAIR_RUNS)
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    sort_desc_by(&mut entries, |(_, (wins, _))| *wins as f64);

    let mut table = InsightTable::new(
        "Card Synergies",
        "Card pairs finishing victorious runs together, with the pair's overall win rate",
        &["Card A", "Card B", "Victories", "Runs", "Win Rate"],
    );
    for ((a, b), (wins, total)) in entries {
        table.push_row(vec![
            display_card(&a, namespace),
            display_card(&b, namespace),
            wins.to_string(),
            total.to_string(),
            make_ratio(wins, total),
        ]);
    }
    table.into_map()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deck_run(cards: &[&str], victory: bool) -> Run {
        Run {
            victory: Some(victory),
            master_deck: cards.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn starters() -> Vec<String> {
        vec!["Strike".to_string(), "Defend".to_string()]
    }

    #[test]
    fn test_pairs_counted_once_per_run() {
        // Duplicate copies and upgrade suffixes collapse before pairing.
        let run = deck_run(&["ns:A", "ns:A+1", "ns:B", "ns:B"], true);
        let pairs = deck_pairs(&run, "ns:", &starters());
        assert_eq!(pairs, vec![("ns:A".to_string(), "ns:B".to_string())]);
    }

    #[test]
    fn test_starter_cards_excluded() {
        let run = deck_run(&["ns:Strike", "ns:Strike_R", "ns:Defend_G", "ns:A", "ns:B"], true);
        let pairs = deck_pairs(&run, "ns:", &starters());
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_starter_prefix_does_not_overmatch() {
        // "Defender" is a real card, not the "Defend" starter.
        let run = deck_run(&["ns:Defender", "ns:A"], true);
        let pairs = deck_pairs(&run, "ns:", &starters());
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_synergy_threshold_and_rates() {
        let mut runs = Vec::new();
        for _ in 0..600 {
            runs.push(deck_run(&["ns:A", "ns:B"], true));
        }
        for _ in 0..200 {
            runs.push(deck_run(&["ns:A", "ns:B"], false));
        }
        // A+C appears under the threshold.
        for _ in 0..799 {
            runs.push(deck_run(&["ns:A", "ns:C"], true));
        }

        let map = card_synergies(&runs, "ns:", &starters());
        let table = &map["Card Synergies"];

        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.rows[0],
            vec![
                "A".to_string(),
                "B".to_string(),
                "600".to_string(),
                "800".to_string(),
                "75.00%".to_string(),
            ]
        );
    }

    #[test]
    fn test_pair_order_is_canonical() {
        let mut runs = Vec::new();
        for _ in 0..MIN_PAIR_RUNS {
            // Deck order varies; the pair key must not.
            runs.push(deck_run(&["ns:B", "ns:A"], true));
        }

        let map = card_synergies(&runs, "ns:", &starters());
        let row = &map["Card Synergies"].rows[0];
        assert_eq!(row[0], "A");
        assert_eq!(row[1], "B");
    }
}
