//! Card command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use tracing::debug;

use wotr_atlas::{extract_card, AtlasError, AtlasGrid, CardSize, Region, RegionsFile};

use super::CardSizeArgs;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

const OUTLINE: Rgba<u8> = Rgba([255, 200, 0, 255]);

/// Extract a single card from an atlas as an image file
#[derive(Debug, Parser)]
pub struct CardCommand {
    /// Atlas image
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub atlas: PathBuf,

    /// Card index, row-major from the top-left card
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Output image (format from the extension)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub out: PathBuf,

    /// Regions file; also supplies the card size
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub regions: Option<PathBuf>,

    /// Draw the region outlines onto the card
    #[arg(long, requires = "regions")]
    pub outline: bool,

    #[command(flatten)]
    pub size: CardSizeArgs,
}

impl CardCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let regions = match &self.regions {
            Some(path) => Some(RegionsFile::load(path)?),
            None => None,
        };
        let card_size = self
            .size
            .resolve(regions.as_ref().and_then(|r| r.image_size), &ctx.config.atlas)?;

        let atlas = image::open(&self.atlas)
            .map_err(|e| AtlasError::image(&self.atlas, e))?
            .to_rgba8();
        let grid = AtlasGrid::for_image(&atlas, card_size)?;
        let mut card = extract_card(&atlas, &grid, self.index)?;

        if self.outline {
            for region in regions.iter().flat_map(|r| &r.regions) {
                draw_outline(&mut card, region);
            }
        }

        if let Some(parent) = self.out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| {
                    CliError::io_with_path("failed to create output directory", e, parent)
                })?;
        }
        card.save(&self.out)
            .map_err(|e| AtlasError::image(&self.out, e))?;
        debug!(path = %self.out.display(), index = self.index, "saved card");

        let (col, row) = grid.position(self.index).unwrap_or_default();
        print_output(
            ctx,
            &CardReport {
                index: self.index,
                col,
                row,
                card_size,
                out: self.out.clone(),
            },
        )
    }
}

/// One-pixel outline of a region, clipped to the card.
fn draw_outline(card: &mut RgbaImage, region: &Region) {
    let Some(r) = region.clamped_to(CardSize::new(card.width(), card.height())) else {
        return;
    };
    let (x1, y1) = (r.x + r.width - 1, r.y + r.height - 1);
    for x in r.x..=x1 {
        card.put_pixel(x, r.y, OUTLINE);
        card.put_pixel(x, y1, OUTLINE);
    }
    for y in r.y..=y1 {
        card.put_pixel(r.x, y, OUTLINE);
        card.put_pixel(x1, y, OUTLINE);
    }
}

#[derive(Debug, Serialize)]
pub struct CardReport {
    pub index: usize,
    pub col: u32,
    pub row: u32,
    pub card_size: CardSize,
    pub out: PathBuf,
}

impl FormattedOutput for CardReport {
    fn format_text(&self) -> String {
        format!(
            "✓ Card {} (col {}, row {}, {}) saved to {}",
            self.index,
            self.col,
            self.row,
            self.card_size,
            self.out.display()
        )
    }
}
