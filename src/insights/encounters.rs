//! Combat encounter analysis.

use std::collections::HashMap;

use super::{median, sort_desc_by};
use crate::models::{InsightMap, InsightTable, Run};

/// Minimum recorded fights before an enemy group gets a row.
pub const MIN_FIGHTS: usize = 100;

/// Median fight length in turns per distinct enemy group.
pub fn encounter_turns(runs: &[Run]) -> InsightMap {
    let mut samples: HashMap<String, Vec<f64>> = HashMap::new();

    for run in runs {
        for encounter in &run.damage_taken {
            let (Some(enemies), Some(turns)) = (encounter.enemies.as_deref(), encounter.turns)
            else {
                continue;
            };
            if enemies.is_empty() {
                continue;
            }
            samples
                .entry(enemies.to_string())
                .or_default()
                .push(turns as f64);
        }
    }

    let mut entries: Vec<(String, usize, f64)> = samples
        .into_iter()
        .filter(|(_, turns)| turns.len() >= MIN_FIGHTS)
        .filter_map(|(enemies, mut turns)| {
            let count = turns.len();
            median(&mut turns).map(|mid| (enemies, count, mid))
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    sort_desc_by(&mut entries, |(_, _, mid)| *mid);

    let mut table = InsightTable::new(
        "Encounter Length",
        "Median fight length in turns per enemy group",
        &["Enemies", "Fights", "Median Turns"],
    );
    for (enemies, count, mid) in entries {
        table.push_row(vec![enemies, count.to_string(), format!("{:.1}", mid)]);
    }
    table.into_map()
}
