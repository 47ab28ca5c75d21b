//! Atlas geometry: card sizes, presets and the card grid.
//!
//! An atlas is a single image holding equally sized cards laid out row-major.
//! Trailing partial cells on the right or bottom edge are ignored.

use image::{GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AtlasError, Result};

/// Size of one card cell in pixels. Serialized as `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CardSize {
    pub width: u32,
    pub height: u32,
}

impl CardSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CardSize {
    fn default() -> Self {
        DEFAULT_CARD_SIZE
    }
}

impl From<[u32; 2]> for CardSize {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<CardSize> for [u32; 2] {
    fn from(size: CardSize) -> Self {
        [size.width, size.height]
    }
}

impl fmt::Display for CardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A named card format preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardFormat {
    pub label: &'static str,
    pub size: CardSize,
}

/// Player card size, the default for new region sets.
pub const DEFAULT_CARD_SIZE: CardSize = CardSize::new(535, 752);

/// Built-in card formats.
pub const CARD_FORMATS: &[CardFormat] = &[
    CardFormat {
        label: "Player cards (535×752)",
        size: DEFAULT_CARD_SIZE,
    },
    CardFormat {
        label: "Fortress (1380x912)",
        size: CardSize::new(1380, 912),
    },
    CardFormat {
        label: "Path (1380x912)",
        size: CardSize::new(1380, 912),
    },
];

/// Pick the card size for a processing run.
///
/// A size stored in the regions file wins over explicit dimensions.
pub fn resolve_card_size(
    from_file: Option<CardSize>,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<CardSize> {
    match (from_file, width, height) {
        (Some(size), _, _) => Ok(size),
        (None, Some(w), Some(h)) if w > 0 && h > 0 => Ok(CardSize::new(w, h)),
        _ => Err(AtlasError::MissingCardSize),
    }
}

/// The grid of cards inside an atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasGrid {
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub card: CardSize,
    pub cols: u32,
    pub rows: u32,
}

impl AtlasGrid {
    /// Tile an atlas of the given size into cards.
    pub fn new(atlas_width: u32, atlas_height: u32, card: CardSize) -> Result<Self> {
        let too_large = || AtlasError::CardLargerThanAtlas {
            card_w: card.width,
            card_h: card.height,
            atlas_w: atlas_width,
            atlas_h: atlas_height,
        };

        if card.width == 0 || card.height == 0 {
            return Err(too_large());
        }

        let cols = atlas_width / card.width;
        let rows = atlas_height / card.height;
        if cols == 0 || rows == 0 {
            return Err(too_large());
        }

        Ok(Self {
            atlas_width,
            atlas_height,
            card,
            cols,
            rows,
        })
    }

    /// Tile an already decoded atlas image.
    pub fn for_image<I: GenericImageView>(atlas: &I, card: CardSize) -> Result<Self> {
        let (w, h) = atlas.dimensions();
        Self::new(w, h, card)
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Always false: a grid holds at least one card.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest valid card index.
    pub fn max_index(&self) -> usize {
        self.len() - 1
    }

    /// `(col, row)` of a card.
    pub fn position(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.len() {
            return None;
        }
        let cols = self.cols as usize;
        Some(((index % cols) as u32, (index / cols) as u32))
    }

    /// Top-left pixel of a card in atlas coordinates.
    pub fn origin(&self, index: usize) -> Option<(u32, u32)> {
        self.position(index)
            .map(|(col, row)| (col * self.card.width, row * self.card.height))
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.max_index())
    }

    pub fn next(&self, index: usize) -> usize {
        self.clamp_index(index.saturating_add(1))
    }

    pub fn prev(&self, index: usize) -> usize {
        self.clamp_index(index.saturating_sub(1))
    }

    fn check_index(&self, index: usize) -> Result<(u32, u32)> {
        self.origin(index).ok_or(AtlasError::CardIndexOutOfRange {
            index,
            len: self.len(),
        })
    }
}

/// Copy one card out of the atlas.
pub fn extract_card(atlas: &RgbaImage, grid: &AtlasGrid, index: usize) -> Result<RgbaImage> {
    let (x, y) = grid.check_index(index)?;
    Ok(atlas
        .view(x, y, grid.card.width, grid.card.height)
        .to_image())
}
