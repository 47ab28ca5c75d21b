//! Summary command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueHint};
use serde::Serialize;
use tracing::debug;

use wotr_atlas::{AtlasError, CardEntry, CardsSummary, SymbolMap, SUMMARY_FILE};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Inspect a card summary
#[derive(Debug, Subcommand)]
pub enum SummaryCommand {
    /// Print the text of each card region with symbol counts
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Summary file [default: <output dir>/cards_summary.json]
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Only show this card
    #[arg(long)]
    pub card: Option<usize>,

    /// Symbol map used for glyph counts [default: from config]
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub map: Option<PathBuf>,
}

impl SummaryCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        match self {
            Self::Show(args) => args.execute(ctx),
        }
    }
}

impl ShowArgs {
    fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let path = self
            .file
            .clone()
            .unwrap_or_else(|| ctx.config.output.dir.join(SUMMARY_FILE));
        let summary = CardsSummary::load(&path)?;

        let map_path = self.map.as_ref().unwrap_or(&ctx.config.symbols.map);
        let glyphs: Vec<String> = match SymbolMap::load(map_path) {
            Ok(map) => map
                .iter()
                .map(|(_, meta)| meta.glyph.clone())
                .filter(|g| !g.is_empty())
                .collect(),
            // Counting is optional; only an explicitly requested map must load.
            Err(e) if self.map.is_none() => {
                debug!(error = %e, "no symbol map for glyph counts");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let cards: Vec<&CardEntry> = match self.card {
            Some(index) => vec![summary.card(index).ok_or(AtlasError::CardIndexOutOfRange {
                index,
                len: summary.cards.len(),
            })?],
            None => summary.cards.iter().collect(),
        };

        let glyph_refs: Vec<&str> = glyphs.iter().map(String::as_str).collect();
        let counts = summary.glyph_counts(&glyph_refs);

        let view = SummaryView {
            atlas: summary.atlas.clone(),
            card_size: summary.card_size.to_string(),
            cards: cards
                .into_iter()
                .map(|card| CardView {
                    card_index: card.card_index,
                    col: card.col,
                    row: card.row,
                    regions: card
                        .regions
                        .iter()
                        .map(|r| (r.name.clone(), r.text.trim().to_string()))
                        .collect(),
                    glyphs: summary
                        .cards
                        .iter()
                        .position(|c| c.card_index == card.card_index)
                        .and_then(|i| counts.get(i))
                        .map(|m| m.iter().map(|(g, n)| (g.to_string(), *n)).collect())
                        .unwrap_or_default(),
                })
                .collect(),
        };
        print_output(ctx, &view)
    }
}

#[derive(Debug, Serialize)]
pub struct CardView {
    pub card_index: usize,
    pub col: u32,
    pub row: u32,
    /// `(region name, text)` pairs in region order.
    pub regions: Vec<(String, String)>,
    pub glyphs: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub atlas: String,
    pub card_size: String,
    pub cards: Vec<CardView>,
}

impl FormattedOutput for SummaryView {
    fn format_text(&self) -> String {
        let mut out = format!(
            "{} ({} cards of {})\n",
            self.atlas,
            self.cards.len(),
            self.card_size
        );
        for card in &self.cards {
            out.push_str(&format!(
                "\ncard {} (col {}, row {})",
                card.card_index, card.col, card.row
            ));
            if !card.glyphs.is_empty() {
                let glyphs: Vec<String> =
                    card.glyphs.iter().map(|(g, n)| format!("{g}x{n}")).collect();
                out.push_str(&format!("  [{}]", glyphs.join(" ")));
            }
            out.push('\n');
            for (name, text) in &card.regions {
                let text = if text.is_empty() {
                    "-".to_string()
                } else {
                    text.replace('\n', " / ")
                };
                out.push_str(&format!("  {name:<16} {text}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_view_text() {
        let view = SummaryView {
            atlas: "atlas.png".to_string(),
            card_size: "40x40".to_string(),
            cards: vec![CardView {
                card_index: 1,
                col: 1,
                row: 0,
                regions: vec![
                    ("cost".to_string(), "⚔".to_string()),
                    ("title".to_string(), "Line one\nLine two".to_string()),
                    ("flavour".to_string(), String::new()),
                ],
                glyphs: BTreeMap::from([("⚔".to_string(), 1)]),
            }],
        };
        let text = view.format_text();
        assert!(text.contains("card 1 (col 1, row 0)  [⚔x1]"));
        assert!(text.contains("Line one / Line two"));
        assert!(text.contains("flavour          -"));
    }
}
