//! Card atlas toolkit.
//!
//! Tiles a card atlas image into equally sized cards, applies a shared set of
//! named regions to every card, optionally recognises text and detects symbol
//! templates in each region, and writes the result to `cards_summary.json`.
//!
//! ```no_run
//! use std::path::Path;
//! use wotr_atlas::{AtlasProcessor, ProcessOptions, RegionsFile};
//!
//! let regions = RegionsFile::load("assets/card2.json")?;
//! let processor = AtlasProcessor::new(ProcessOptions::default());
//! let (summary, path) = processor.run(Path::new("assets/light_cards.png"), &regions)?;
//! println!("{} cards -> {}", summary.cards.len(), path.display());
//! # Ok::<(), wotr_atlas::AtlasError>(())
//! ```

pub mod detect;
pub mod error;
pub mod grid;
pub mod imaging;
pub mod ocr;
pub mod process;
pub mod region;
pub mod summary;
pub mod symbols;
pub mod text;

pub use detect::{DetectorOptions, SymbolDetector, SymbolMatch};
pub use error::{AtlasError, Result};
pub use grid::{extract_card, resolve_card_size, AtlasGrid, CardFormat, CardSize, CARD_FORMATS};
pub use ocr::{TesseractCli, TextRecognizer};
pub use process::{AtlasProcessor, ProcessOptions};
pub use region::{DragRect, Region, RegionSet, RegionsFile};
pub use summary::{CardEntry, CardsSummary, RegionEntry, SUMMARY_FILE};
pub use symbols::{load_templates, SymbolMap, SymbolMeta, Template};
pub use text::merge_region_text;
