//! Static card reference tables and identifier normalization.
//!
//! Two JSON documents are loaded once at startup and stay immutable:
//! a pack -> card-list mapping (inverted here into card -> pack) and a flat
//! card -> rarity mapping. A lookup miss is not an error; the item is simply
//! excluded from whatever rate is being computed.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Rarity reserved for basic/default cards, excluded from rate calculations.
pub const EXCLUDED_RARITY: &str = "BASIC";

/// Errors raised while loading the reference tables.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to read lookup file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse lookup file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Base identity of a card: the identifier with any `+N` upgrade suffix removed.
pub fn base_card(card: &str) -> &str {
    card.split('+').next().unwrap_or(card)
}

/// Display form of a card: namespace prefix stripped, upgrade suffix kept.
pub fn display_card(card: &str, namespace: &str) -> String {
    card.replacen(namespace, "", 1)
}

/// Immutable card reference tables.
#[derive(Debug, Clone, Default)]
pub struct CardIndex {
    card_to_pack: HashMap<String, String>,
    card_to_rarity: HashMap<String, String>,
}

#[derive(Deserialize)]
struct PackCardsDoc(HashMap<String, Vec<String>>);

#[derive(Deserialize)]
struct RaritiesDoc(HashMap<String, String>);

impl CardIndex {
    /// Build an index from already-inverted maps. Used by tests and callers
    /// that assemble the tables themselves.
    pub fn new(card_to_pack: HashMap<String, String>, card_to_rarity: HashMap<String, String>) -> Self {
        Self {
            card_to_pack,
            card_to_rarity,
        }
    }

    /// Load both reference documents from disk.
    ///
    /// `pack_cards_path` holds `{pack: [card, ...]}` and is inverted into a
    /// card -> pack map; `rarities_path` holds `{card: rarity}` directly.
    pub fn from_files(pack_cards_path: &Path, rarities_path: &Path) -> Result<Self, LookupError> {
        let pack_doc: PackCardsDoc =
            serde_json::from_str(&std::fs::read_to_string(pack_cards_path)?)?;
        let rarity_doc: RaritiesDoc =
            serde_json::from_str(&std::fs::read_to_string(rarities_path)?)?;

        let mut card_to_pack = HashMap::new();
        for (pack, cards) in pack_doc.0 {
            for card in cards {
                card_to_pack.insert(card, pack.clone());
            }
        }

        Ok(Self {
            card_to_pack,
            card_to_rarity: rarity_doc.0,
        })
    }

    /// Pack that introduced a card. Upgrade suffixes are stripped before the
    /// lookup; namespace prefixes are part of the stored identity.
    pub fn pack_of(&self, card: &str) -> Option<&str> {
        self.card_to_pack.get(base_card(card)).map(String::as_str)
    }

    /// Rarity category of a card (upgrade-insensitive).
    pub fn rarity_of(&self, card: &str) -> Option<&str> {
        self.card_to_rarity.get(base_card(card)).map(String::as_str)
    }

    /// Whether a card carries the reserved rarity excluded from rates.
    pub fn is_excluded(&self, card: &str) -> bool {
        self.rarity_of(card) == Some(EXCLUDED_RARITY)
    }

    /// All known cards of a pack.
    pub fn cards_of_pack<'a>(&'a self, pack: &'a str) -> impl Iterator<Item = &'a str> {
        self.card_to_pack
            .iter()
            .filter(move |(_, p)| p.as_str() == pack)
            .map(|(c, _)| c.as_str())
    }
}
