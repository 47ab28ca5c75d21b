//! The card summary written to `cards_summary.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{AtlasError, Result};
use crate::grid::CardSize;

/// File name of the summary inside the output directory.
pub const SUMMARY_FILE: &str = "cards_summary.json";

/// One region of one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub region_index: usize,
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Position in the atlas. Wider than `x`/`y` so any card offset fits.
    pub x_abs: u64,
    pub y_abs: u64,
    /// OCR text with detected glyphs merged in.
    pub text: String,
}

/// All regions of one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    pub card_index: usize,
    pub col: u32,
    pub row: u32,
    pub regions: Vec<RegionEntry>,
}

/// Per-atlas summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardsSummary {
    pub atlas: String,
    pub atlas_size: [u32; 2],
    pub card_size: CardSize,
    pub cols: u32,
    pub rows: u32,
    pub cards: Vec<CardEntry>,
}

impl CardsSummary {
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AtlasError::json("card summary", e))
    }

    /// Write `cards_summary.json` into `out_dir`, creating it if needed.
    pub fn write_to_dir(&self, out_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let out_dir = out_dir.as_ref();
        std::fs::create_dir_all(out_dir).map_err(|e| AtlasError::io(out_dir, e))?;
        let path = out_dir.join(SUMMARY_FILE);
        std::fs::write(&path, self.to_json_string()?).map_err(|e| AtlasError::io(&path, e))?;
        Ok(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AtlasError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| AtlasError::json("card summary", e))
    }

    pub fn card(&self, index: usize) -> Option<&CardEntry> {
        self.cards.iter().find(|c| c.card_index == index)
    }

    /// How often each of `glyphs` occurs in each card's region text.
    pub fn glyph_counts<'a>(&self, glyphs: &[&'a str]) -> Vec<BTreeMap<&'a str, usize>> {
        self.cards
            .iter()
            .map(|card| {
                let mut counts = BTreeMap::new();
                for region in &card.regions {
                    for glyph in glyphs.iter().filter(|g| !g.is_empty()) {
                        let n = region.text.matches(glyph).count();
                        if n > 0 {
                            *counts.entry(*glyph).or_insert(0) += n;
                        }
                    }
                }
                counts
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn summary() -> CardsSummary {
        CardsSummary {
            atlas: "assets/light_cards.png".to_string(),
            atlas_size: [1070, 752],
            card_size: CardSize::new(535, 752),
            cols: 2,
            rows: 1,
            cards: vec![
                CardEntry {
                    card_index: 0,
                    col: 0,
                    row: 0,
                    regions: vec![RegionEntry {
                        region_index: 0,
                        name: "text".to_string(),
                        x: 10,
                        y: 20,
                        w: 30,
                        h: 40,
                        x_abs: 10,
                        y_abs: 20,
                        text: "Strike ⚔ ⚔".to_string(),
                    }],
                },
                CardEntry {
                    card_index: 1,
                    col: 1,
                    row: 0,
                    regions: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_summary_json_keys() {
        let value: Value = serde_json::from_str(&summary().to_json_string().unwrap()).unwrap();
        assert_eq!(value["card_size"], json!([535, 752]));
        assert_eq!(value["atlas_size"], json!([1070, 752]));
        let region = &value["cards"][0]["regions"][0];
        for key in ["region_index", "name", "x", "y", "w", "h", "x_abs", "y_abs", "text"] {
            assert!(region.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_glyphs_written_unescaped() {
        let json = summary().to_json_string().unwrap();
        assert!(json.contains("Strike ⚔ ⚔"));
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = summary().write_to_dir(dir.path().join("out")).unwrap();
        assert!(path.ends_with(SUMMARY_FILE));
        assert_eq!(CardsSummary::load(&path).unwrap(), summary());
    }

    #[test]
    fn test_glyph_counts_per_card() {
        let counts = summary().glyph_counts(&["⚔", "👁", ""]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].get("⚔"), Some(&2));
        assert_eq!(counts[0].get("👁"), None);
        assert!(counts[1].is_empty());
    }
}
