//! Host/cosmetic popularity analyses.

use std::collections::HashMap;

use super::sort_desc_by;
use crate::models::{display_card, InsightMap, InsightTable, Run};

/// Minimum runs before a host appears in the frequent-players table.
pub const MIN_HOST_RUNS: u64 = 20;

fn count_by<'a>(runs: &'a [Run], key: impl Fn(&'a Run) -> Option<&'a str>) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for run in runs {
        if let Some(value) = key(run).filter(|v| !v.is_empty()) {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }

    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    sort_desc_by(&mut entries, |(_, count)| *count as f64);
    entries
}

/// Hosts with at least [`MIN_HOST_RUNS`] recorded runs.
pub fn frequent_hosts(runs: &[Run]) -> InsightMap {
    let mut table = InsightTable::new(
        "Frequent Players",
        "Hosts with at least 20 recorded runs",
        &["Host", "Runs"],
    );
    for (host, count) in count_by(runs, |r| r.host.as_deref()) {
        if count >= MIN_HOST_RUNS {
            table.push_row(vec![host, count.to_string()]);
        }
    }
    table.into_map()
}

/// Popularity of the cosmetic picked for the run.
pub fn picked_hats(runs: &[Run], namespace: &str) -> InsightMap {
    let mut table = InsightTable::new(
        "Picked Hats",
        "How often each cosmetic was picked for a run",
        &["Hat", "Runs"],
    );
    for (hat, count) in count_by(runs, |r| r.picked_hat.as_deref()) {
        table.push_row(vec![display_card(&hat, namespace), count.to_string()]);
    }
    table.into_map()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frequent_hosts_threshold() {
        let mut runs = Vec::new();
        for _ in 0..MIN_HOST_RUNS {
            runs.push(Run {
                host: Some("regular".to_string()),
                ..Default::default()
            });
        }
        runs.push(Run {
            host: Some("drive-by".to_string()),
            ..Default::default()
        });

        let map = frequent_hosts(&runs);
        let table = &map["Frequent Players"];

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], vec!["regular".to_string(), "20".to_string()]);
    }

    #[test]
    fn test_picked_hats_sorted_by_count() {
        let mut runs = Vec::new();
        for _ in 0..3 {
            runs.push(Run {
                picked_hat: Some("ns:Crown".to_string()),
                ..Default::default()
            });
        }
        runs.push(Run {
            picked_hat: Some("ns:Cap".to_string()),
            ..Default::default()
        });
        runs.push(Run::default());

        let map = picked_hats(&runs, "ns:");
        let table = &map["Picked Hats"];

        assert_eq!(
            table.rows,
            vec![
                vec!["Crown".to_string(), "3".to_string()],
                vec!["Cap".to_string(), "1".to_string()],
            ]
        );
    }
}
