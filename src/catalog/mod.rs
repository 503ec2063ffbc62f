//! The static card catalog shown in the storefront.
//!
//! Cards are loaded from a TOML file when one exists and fall back to the
//! built-in demo inventory otherwise. Nothing here touches audio data; a
//! card's waveform is synthesized from its seed at paint time.

pub mod filter;

pub use filter::CardFilter;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Identifier of one preview card.
///
/// Cards are addressed by id everywhere (playback state, surface lookup,
/// cart flashes); nothing ever derives positional information from the
/// string's shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        CardId(id.into())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One audio-preview card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioCard {
    pub id: CardId,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Nominal preview length shown in the card meta line.
    pub duration_secs: u32,
    pub price_usd: f32,
    /// Waveform seed. Cards without one get their catalog position as seed.
    #[serde(default)]
    seed: Option<f32>,
}

impl AudioCard {
    pub fn seed(&self) -> f32 {
        self.seed.unwrap_or(0.0)
    }

    /// `m:ss` rendering of the nominal duration.
    pub fn duration_label(&self) -> String {
        format!("{}:{:02}", self.duration_secs / 60, self.duration_secs % 60)
    }
}

/// The full storefront inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub cards: Vec<AudioCard>,
}

impl Catalog {
    /// Loads the catalog from `path`, or the demo inventory when no custom
    /// catalog exists.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No catalog path configured, using demo inventory");
                Ok(Self::demo())
            }
        }
    }

    /// Loads and validates a catalog file.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    /// - If two cards share an id
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read catalog file {}: {e}", path.display()))?;
        let mut catalog: Catalog = toml::from_str(&content)
            .map_err(|e| anyhow!("Malformed catalog file {}: {e}", path.display()))?;
        catalog.assign_missing_seeds();
        catalog.check_unique_ids()?;
        tracing::info!(
            "Catalog loaded from {}: {} cards",
            path.display(),
            catalog.cards.len()
        );
        Ok(catalog)
    }

    /// Built-in demo inventory, used when no catalog file is configured.
    pub fn demo() -> Self {
        let card = |id: &str, title: &str, category: &str, tags: &[&str], secs, price, seed| {
            AudioCard {
                id: CardId::new(id),
                title: title.to_string(),
                category: category.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                duration_secs: secs,
                price_usd: price,
                seed: Some(seed),
            }
        };

        Catalog {
            cards: vec![
                card(
                    "midnight-drive",
                    "Midnight Drive",
                    "Electronic",
                    &["synthwave", "retro", "driving"],
                    214,
                    12.0,
                    0.0,
                ),
                card(
                    "golden-hour",
                    "Golden Hour",
                    "Ambient",
                    &["calm", "warm", "cinematic"],
                    187,
                    9.5,
                    1.0,
                ),
                card(
                    "back-alley-funk",
                    "Back Alley Funk",
                    "Funk",
                    &["groove", "bass", "upbeat"],
                    156,
                    14.0,
                    2.0,
                ),
                card(
                    "glass-rain",
                    "Glass Rain",
                    "Ambient",
                    &["texture", "rain", "meditative"],
                    243,
                    8.0,
                    3.0,
                ),
                card(
                    "neon-district",
                    "Neon District",
                    "Electronic",
                    &["dark", "pulsing", "urban"],
                    198,
                    12.5,
                    4.0,
                ),
                card(
                    "paper-boats",
                    "Paper Boats",
                    "Acoustic",
                    &["guitar", "gentle", "folk"],
                    172,
                    10.0,
                    5.0,
                ),
                card(
                    "brass-parade",
                    "Brass Parade",
                    "Jazz",
                    &["horns", "lively", "street"],
                    145,
                    13.0,
                    6.0,
                ),
                card(
                    "low-orbit",
                    "Low Orbit",
                    "Electronic",
                    &["space", "slow", "deep"],
                    266,
                    11.0,
                    7.0,
                ),
            ],
        }
    }

    pub fn get(&self, id: &CardId) -> Option<&AudioCard> {
        self.cards.iter().find(|card| &card.id == id)
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for card in &self.cards {
            if !seen.contains(&card.category) {
                seen.push(card.category.clone());
            }
        }
        seen
    }

    fn assign_missing_seeds(&mut self) {
        for (index, card) in self.cards.iter_mut().enumerate() {
            if card.seed.is_none() {
                card.seed = Some(index as f32);
            }
        }
    }

    fn check_unique_ids(&self) -> anyhow::Result<()> {
        for (index, card) in self.cards.iter().enumerate() {
            if self.cards[..index].iter().any(|other| other.id == card.id) {
                return Err(anyhow!("Duplicate card id in catalog: {}", card.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_demo_catalog_has_unique_ids_and_seeds() {
        let catalog = Catalog::demo();
        assert!(catalog.check_unique_ids().is_ok());

        let mut seeds: Vec<f32> = catalog.cards.iter().map(|c| c.seed()).collect();
        seeds.sort_by(f32::total_cmp);
        seeds.dedup();
        assert_eq!(seeds.len(), catalog.cards.len());
    }

    #[test]
    fn test_load_assigns_positional_seeds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[cards]]
id = "one"
title = "One"
category = "Test"
duration_secs = 60
price_usd = 1.0

[[cards]]
id = "two"
title = "Two"
category = "Test"
duration_secs = 90
price_usd = 2.0
seed = 9.5
"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.cards[0].seed(), 0.0);
        assert_eq!(catalog.cards[1].seed(), 9.5);
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[cards]]
id = "dup"
title = "A"
category = "Test"
duration_secs = 60
price_usd = 1.0

[[cards]]
id = "dup"
title = "B"
category = "Test"
duration_secs = 60
price_usd = 1.0
"#
        )
        .unwrap();

        assert!(Catalog::load(file.path()).is_err());
    }

    #[test]
    fn test_categories_in_first_appearance_order() {
        let catalog = Catalog::demo();
        let categories = catalog.categories();
        assert_eq!(categories[0], "Electronic");
        assert_eq!(categories[1], "Ambient");
        assert!(!categories.is_empty());
        let mut deduped = categories.clone();
        deduped.dedup();
        assert_eq!(categories, deduped);
    }

    #[test]
    fn test_duration_label() {
        let catalog = Catalog::demo();
        let card = catalog.get(&CardId::new("midnight-drive")).unwrap();
        assert_eq!(card.duration_label(), "3:34");
    }
}
