//! Grid and presets commands.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueHint};
use serde::Serialize;

use wotr_atlas::{AtlasError, AtlasGrid, CardFormat, CardSize, RegionsFile, CARD_FORMATS};
use wotr_common_config::AtlasConfig;

use super::CardSizeArgs;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Show how an atlas tiles into cards
#[derive(Debug, Parser)]
pub struct GridCommand {
    /// Atlas image
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub atlas: PathBuf,

    /// Take the card size from this regions file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub regions: Option<PathBuf>,

    #[command(flatten)]
    pub size: CardSizeArgs,
}

/// Build the grid for an atlas file without decoding its pixels.
pub fn atlas_grid(
    atlas: &Path,
    regions: Option<&Path>,
    size: &CardSizeArgs,
    config: &AtlasConfig,
) -> Result<AtlasGrid, CliError> {
    let from_file = match regions {
        Some(path) => RegionsFile::load(path)?.image_size,
        None => None,
    };
    let card = size.resolve(from_file, config)?;
    let (width, height) =
        image::image_dimensions(atlas).map_err(|e| AtlasError::image(atlas, e))?;
    Ok(AtlasGrid::new(width, height, card)?)
}

impl GridCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let grid = atlas_grid(
            &self.atlas,
            self.regions.as_deref(),
            &self.size,
            &ctx.config.atlas,
        )?;
        print_output(ctx, &GridReport::new(&self.atlas, &grid))
    }
}

/// One card cell of the grid.
#[derive(Debug, Serialize)]
pub struct GridCell {
    pub index: usize,
    pub col: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Serialize)]
pub struct GridReport {
    pub atlas: String,
    pub atlas_size: [u32; 2],
    pub card_size: CardSize,
    pub cols: u32,
    pub rows: u32,
    pub cards: usize,
    pub cells: Vec<GridCell>,
}

impl GridReport {
    pub fn new(atlas: &Path, grid: &AtlasGrid) -> Self {
        let cells = (0..grid.len())
            .filter_map(|index| {
                let (col, row) = grid.position(index)?;
                let (x, y) = grid.origin(index)?;
                Some(GridCell {
                    index,
                    col,
                    row,
                    x,
                    y,
                })
            })
            .collect();

        Self {
            atlas: atlas.display().to_string(),
            atlas_size: [grid.atlas_width, grid.atlas_height],
            card_size: grid.card,
            cols: grid.cols,
            rows: grid.rows,
            cards: grid.len(),
            cells,
        }
    }
}

impl FormattedOutput for GridReport {
    fn format_text(&self) -> String {
        let mut out = format!(
            "{}: {}x{} px\n  card: {}\n  grid: {} cols x {} rows = {} cards\n",
            self.atlas,
            self.atlas_size[0],
            self.atlas_size[1],
            self.card_size,
            self.cols,
            self.rows,
            self.cards
        );
        let unused_x = self.atlas_size[0] - self.cols * self.card_size.width;
        let unused_y = self.atlas_size[1] - self.rows * self.card_size.height;
        if unused_x > 0 || unused_y > 0 {
            out.push_str(&format!("  unused margin: {unused_x} px right, {unused_y} px bottom\n"));
        }
        out
    }
}

/// List the built-in card formats
#[derive(Debug, Parser)]
pub struct PresetsCommand {}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct PresetList(pub &'static [CardFormat]);

impl FormattedOutput for PresetList {
    fn format_text(&self) -> String {
        self.0
            .iter()
            .map(|f| format!("{:<24} {}", f.label, f.size))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PresetsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        print_output(ctx, &PresetList(CARD_FORMATS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_report_cells() {
        let grid = AtlasGrid::new(1100, 760, CardSize::new(535, 752)).unwrap();
        let report = GridReport::new(Path::new("atlas.png"), &grid);
        assert_eq!(report.cards, 2);
        assert_eq!(report.cells[1].x, 535);
        assert_eq!(report.cells[1].col, 1);

        let text = report.format_text();
        assert!(text.contains("2 cols x 1 rows = 2 cards"));
        assert!(text.contains("unused margin: 30 px right, 8 px bottom"));
    }

    #[test]
    fn test_preset_list_text() {
        let text = PresetList(CARD_FORMATS).format_text();
        assert_eq!(text.lines().count(), CARD_FORMATS.len());
        assert!(text.contains("1380x912"));
    }
}
