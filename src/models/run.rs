//! Run record model.
//!
//! One line of a log file is an envelope (`LogLine`) wrapping one completed
//! game session (`Run`). Every attribute of a run is optional; absence is a
//! valid state, never an error, and analyses simply skip the run for the
//! groups it cannot contribute to.

use serde::{Deserialize, Serialize};

/// The per-line ingestion envelope: `{"event": {...}, "host": ..., "time": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub event: Run,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub time: Option<String>,
}

impl LogLine {
    /// Fold the envelope fields into the run record.
    pub fn into_run(self) -> Run {
        let mut run = self.event;
        if run.host.is_none() {
            run.host = self.host;
        }
        if run.time.is_none() {
            run.time = self.time;
        }
        run
    }
}

/// One pack or card offer: the item taken and the items passed over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferChoice {
    pub picked: Option<String>,
    pub not_picked: Vec<String>,
}

/// One rest-site decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampfireChoice {
    /// Decision category, e.g. `SMITH` (upgrade a card) or `REST`.
    pub key: Option<String>,

    /// 1-based floor the decision happened on.
    pub floor: Option<i64>,

    /// Decision payload; for `SMITH` the card that was upgraded.
    pub data: Option<String>,
}

/// One combat encounter entry from `damageTaken`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncounterDamage {
    /// Enemy group faced, e.g. `"Gremlin Nob"`.
    pub enemies: Option<String>,

    pub turns: Option<i64>,

    pub damage: Option<f64>,

    pub floor: Option<i64>,
}

/// Campfire decision key for upgrading a card.
pub const CAMPFIRE_SMITH: &str = "SMITH";

/// Campfire decision key for resting.
pub const CAMPFIRE_REST: &str = "REST";

/// Ascension levels outside this range are tolerated on ingest but excluded
/// from ascension-bucketed tables.
pub const MAX_ASCENSION: i64 = 20;

/// One completed game session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Run {
    /// Origin identifier, injected from the envelope.
    pub host: Option<String>,

    /// Envelope timestamp.
    pub time: Option<String>,

    /// Difficulty tier, 0-20 in practice.
    pub ascension_level: Option<i64>,

    /// Outcome; `None` means unknown, NOT a loss.
    pub victory: Option<bool>,

    /// Comma-joined set of active content packs.
    pub current_packs: Option<String>,

    /// Comma-joined set of packs the host blacklisted before the run.
    pub filtered_packs: Option<String>,

    pub enabled_expansion_packs: Option<bool>,

    pub pack_choices: Vec<OfferChoice>,

    pub card_choices: Vec<OfferChoice>,

    /// Cards held at run end, possibly upgrade-suffixed.
    pub master_deck: Vec<String>,

    pub picked_hat: Option<String>,

    pub campfire_choices: Vec<CampfireChoice>,

    /// Parallel HP samples indexed by floor (floor N at element N-1).
    pub current_hp_per_floor: Vec<f64>,

    pub max_hp_per_floor: Vec<f64>,

    pub damage_taken: Vec<EncounterDamage>,

    /// Per-deck-slot socketed modifier lists; slots without sockets are null.
    pub card_modifiers: Vec<Option<Vec<String>>>,
}

impl Run {
    /// Active packs as non-empty items of the comma-joined string.
    pub fn current_pack_list(&self) -> Vec<&str> {
        split_pack_list(self.current_packs.as_deref())
    }

    /// Blacklisted packs as non-empty items of the comma-joined string.
    pub fn filtered_pack_list(&self) -> Vec<&str> {
        split_pack_list(self.filtered_packs.as_deref())
    }

    /// Ascension level if present and within the bucketed 0-20 range.
    pub fn bucketed_ascension(&self) -> Option<i64> {
        self.ascension_level
            .filter(|a| (0..=MAX_ASCENSION).contains(a))
    }

    /// `true` only for an explicit recorded victory.
    pub fn is_victory(&self) -> bool {
        self.victory == Some(true)
    }

    /// Current/max HP ratio at a 1-based floor, when both arrays cover it.
    pub fn hp_ratio_at_floor(&self, floor: i64) -> Option<f64> {
        if floor < 1 {
            return None;
        }
        let idx = (floor - 1) as usize;
        let current = self.current_hp_per_floor.get(idx)?;
        let max = self.max_hp_per_floor.get(idx)?;
        if *max <= 0.0 {
            return None;
        }
        Some(current / max)
    }
}

fn split_pack_list(joined: Option<&str>) -> Vec<&str> {
    joined
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
