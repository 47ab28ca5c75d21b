//! Process command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use serde::Serialize;
use tracing::{info, warn};

use wotr_atlas::{
    load_templates, AtlasProcessor, CardSize, CardsSummary, DetectorOptions, ProcessOptions,
    RegionsFile, SymbolDetector, SymbolMap, TesseractCli, TextRecognizer,
};
use wotr_common_config::WotrConfig;

use super::CardSizeArgs;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Process every card of an atlas with one regions file
#[derive(Debug, Parser)]
pub struct ProcessCommand {
    /// Atlas image
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub atlas: PathBuf,

    /// Regions JSON saved by the region editor
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Output directory [default: from config, `out`]
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub size: CardSizeArgs,

    /// Run OCR on every region
    #[arg(long)]
    pub ocr: bool,

    /// Save every region crop and its text
    #[arg(long)]
    pub save_crops: bool,

    /// Detect symbols using the configured template directory and map
    #[arg(long)]
    pub detect: bool,

    /// Symbol template directory (enables detection)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub symbols_dir: Option<PathBuf>,

    /// Symbol map JSON (enables detection)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub symbols_map: Option<PathBuf>,

    /// Intensity match threshold
    #[arg(long, value_name = "SCORE")]
    pub symbol_threshold: Option<f32>,

    /// Edge match threshold
    #[arg(long, value_name = "SCORE")]
    pub symbol_edge_threshold: Option<f32>,
}

impl ProcessCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let regions = RegionsFile::load(&self.regions)?;
        if regions.regions.is_empty() {
            warn!(path = %self.regions.display(), "regions file has no regions");
        }

        let fallback = self.size.fallback(&ctx.config.atlas)?;
        let options = ProcessOptions {
            out_dir: self.out.clone().unwrap_or_else(|| ctx.config.output.dir.clone()),
            save_crops: self.save_crops || ctx.config.output.save_crops,
            card_width: Some(fallback.width),
            card_height: Some(fallback.height),
        };

        let mut processor = AtlasProcessor::new(options);
        if let Some(ocr) = self.recognizer(&ctx.config) {
            processor = processor.with_ocr(ocr);
        }

        let mut glyphs = Vec::new();
        if let Some(detector) = self.detector(&ctx.config)? {
            glyphs = detector
                .templates()
                .iter()
                .map(|t| t.meta.glyph.clone())
                .filter(|g| !g.is_empty())
                .collect();
            processor = processor.with_detector(detector);
        }

        let atlas = self.atlas.clone();
        let (summary, path) =
            tokio::task::spawn_blocking(move || processor.run(&atlas, &regions)).await??;

        print_output(ctx, &ProcessReport::new(&summary, path, &glyphs))
    }

    fn recognizer(&self, config: &WotrConfig) -> Option<Box<dyn TextRecognizer>> {
        if !(self.ocr || config.ocr.enabled) {
            return None;
        }
        let tesseract = TesseractCli::new(config.ocr.binary.clone(), config.ocr.psm);
        match tesseract.probe() {
            Some(version) => {
                info!(%version, "using tesseract");
                Some(Box::new(tesseract))
            }
            None => {
                warn!(binary = %config.ocr.binary, "tesseract not available; OCR disabled");
                None
            }
        }
    }

    fn detector(&self, config: &WotrConfig) -> Result<Option<SymbolDetector>, CliError> {
        if !(self.detect || self.symbols_dir.is_some() || self.symbols_map.is_some()) {
            return Ok(None);
        }

        let dir = self.symbols_dir.as_ref().unwrap_or(&config.symbols.dir);
        let map_path = self.symbols_map.as_ref().unwrap_or(&config.symbols.map);
        if !dir.is_dir() {
            return Err(CliError::user_with_hint(
                format!("symbol directory not found: {}", dir.display()),
                "pass --symbols-dir or set symbols.dir in the config",
            ));
        }

        let map = match SymbolMap::load(map_path) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    path = %map_path.display(),
                    error = %e,
                    "symbol map unusable; detection disabled"
                );
                return Ok(None);
            }
        };
        let templates = load_templates(dir, &map);
        if templates.is_empty() {
            warn!(dir = %dir.display(), "no symbol templates loaded; detection disabled");
            return Ok(None);
        }

        let options = DetectorOptions {
            threshold: self.symbol_threshold.unwrap_or(config.symbols.threshold),
            edge_threshold: self
                .symbol_edge_threshold
                .unwrap_or(config.symbols.edge_threshold),
            scales: config.symbols.scales.clone(),
        };
        Ok(Some(SymbolDetector::new(templates, options)))
    }
}

/// Result of a processing run.
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    pub atlas: String,
    pub summary: PathBuf,
    pub card_size: CardSize,
    pub cols: u32,
    pub rows: u32,
    pub cards: usize,
    pub regions_per_card: usize,
    /// Regions across all cards with non-empty text.
    pub regions_with_text: usize,
    pub glyphs: BTreeMap<String, usize>,
}

impl ProcessReport {
    pub fn new(summary: &CardsSummary, path: PathBuf, glyphs: &[String]) -> Self {
        let glyph_refs: Vec<&str> = glyphs.iter().map(String::as_str).collect();
        let mut totals = BTreeMap::new();
        for counts in summary.glyph_counts(&glyph_refs) {
            for (glyph, n) in counts {
                *totals.entry(glyph.to_string()).or_insert(0) += n;
            }
        }

        Self {
            atlas: summary.atlas.clone(),
            summary: path,
            card_size: summary.card_size,
            cols: summary.cols,
            rows: summary.rows,
            cards: summary.cards.len(),
            regions_per_card: summary.cards.first().map_or(0, |c| c.regions.len()),
            regions_with_text: summary
                .cards
                .iter()
                .flat_map(|c| &c.regions)
                .filter(|r| !r.text.trim().is_empty())
                .count(),
            glyphs: totals,
        }
    }
}

impl FormattedOutput for ProcessReport {
    fn format_text(&self) -> String {
        let mut out = format!(
            "✓ Processed {} cards ({}x{} grid, card {}) from {}\n",
            self.cards, self.cols, self.rows, self.card_size, self.atlas
        );
        out.push_str(&format!(
            "  regions per card: {}, with text: {}\n",
            self.regions_per_card, self.regions_with_text
        ));
        if !self.glyphs.is_empty() {
            let glyphs: Vec<String> = self
                .glyphs
                .iter()
                .map(|(g, n)| format!("{g} x{n}"))
                .collect();
            out.push_str(&format!("  symbols: {}\n", glyphs.join(", ")));
        }
        out.push_str(&format!("  summary: {}", self.summary.display()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wotr_atlas::{CardEntry, RegionEntry};

    fn entry(text: &str) -> RegionEntry {
        RegionEntry {
            region_index: 0,
            name: "cost".to_string(),
            x: 0,
            y: 0,
            w: 10,
            h: 10,
            x_abs: 0,
            y_abs: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_report_counts_glyphs_and_text() {
        let summary = CardsSummary {
            atlas: "atlas.png".to_string(),
            atlas_size: [20, 10],
            card_size: CardSize::new(10, 10),
            cols: 2,
            rows: 1,
            cards: vec![
                CardEntry {
                    card_index: 0,
                    col: 0,
                    row: 0,
                    regions: vec![entry("⚔ ⚔")],
                },
                CardEntry {
                    card_index: 1,
                    col: 1,
                    row: 0,
                    regions: vec![entry("  ")],
                },
            ],
        };

        let report = ProcessReport::new(
            &summary,
            PathBuf::from("out/cards_summary.json"),
            &["⚔".to_string()],
        );
        assert_eq!(report.cards, 2);
        assert_eq!(report.regions_with_text, 1);
        assert_eq!(report.glyphs.get("⚔"), Some(&2));
        assert!(report.format_text().contains("symbols: ⚔ x2"));
    }
}
