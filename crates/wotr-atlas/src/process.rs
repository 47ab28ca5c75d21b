//! Whole-atlas processing: tile, crop, recognise, detect, summarise.

use image::{GenericImageView, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use wotr_common_log::spans;

use crate::detect::SymbolDetector;
use crate::error::{AtlasError, Result};
use crate::grid::{resolve_card_size, AtlasGrid};
use crate::ocr::TextRecognizer;
use crate::region::{Region, RegionsFile};
use crate::summary::{CardEntry, CardsSummary, RegionEntry};
use crate::text::merge_region_text;

/// Where and how to write processing output.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub out_dir: PathBuf,
    /// Save every crop as PNG plus a `.txt` with its text.
    pub save_crops: bool,
    /// Card size used when the regions file has none.
    pub card_width: Option<u32>,
    pub card_height: Option<u32>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            save_crops: false,
            card_width: None,
            card_height: None,
        }
    }
}

/// Processes every card of an atlas with the same set of regions.
pub struct AtlasProcessor {
    options: ProcessOptions,
    ocr: Option<Box<dyn TextRecognizer>>,
    detector: Option<SymbolDetector>,
}

/// File stem used for saved crops: spaces become underscores.
pub fn crop_file_stem(name: &str, card_index: usize, region_index: usize) -> String {
    format!("{}_card{card_index}_reg{region_index}", name.replace(' ', "_"))
}

impl AtlasProcessor {
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            ocr: None,
            detector: None,
        }
    }

    pub fn with_ocr(mut self, ocr: Box<dyn TextRecognizer>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Enable symbol detection. A detector without templates is ignored.
    pub fn with_detector(mut self, detector: SymbolDetector) -> Self {
        if !detector.is_empty() {
            self.detector = Some(detector);
        }
        self
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Open the atlas at `atlas_path` and process it.
    pub fn process_file(&self, atlas_path: &Path, regions: &RegionsFile) -> Result<CardsSummary> {
        let atlas = image::open(atlas_path)
            .map_err(|e| AtlasError::image(atlas_path, e))?
            .to_rgba8();
        self.process_image(&atlas, &atlas_path.display().to_string(), regions)
    }

    /// Process an already decoded atlas. `label` is recorded as the summary's `atlas`.
    pub fn process_image(
        &self,
        atlas: &RgbaImage,
        label: &str,
        regions: &RegionsFile,
    ) -> Result<CardsSummary> {
        let span = spans::atlas_span(label);
        let _guard = span.enter();

        let card = resolve_card_size(
            regions.image_size,
            self.options.card_width,
            self.options.card_height,
        )?;
        let grid = AtlasGrid::for_image(atlas, card)?;

        if self.options.save_crops {
            std::fs::create_dir_all(&self.options.out_dir)
                .map_err(|e| AtlasError::io(&self.options.out_dir, e))?;
        }

        info!(
            atlas_width = grid.atlas_width,
            atlas_height = grid.atlas_height,
            card = %card,
            cols = grid.cols,
            rows = grid.rows,
            total = grid.len(),
            "processing atlas"
        );

        let timer = spans::Timer::start("process_atlas");
        let mut cards = Vec::with_capacity(grid.len());
        for card_index in 0..grid.len() {
            cards.push(self.process_card(atlas, &grid, card_index, &regions.regions));
        }
        timer.finish();

        Ok(CardsSummary {
            atlas: label.to_string(),
            atlas_size: [grid.atlas_width, grid.atlas_height],
            card_size: card,
            cols: grid.cols,
            rows: grid.rows,
            cards,
        })
    }

    /// Process, then write `cards_summary.json` into the output directory.
    pub fn run(&self, atlas_path: &Path, regions: &RegionsFile) -> Result<(CardsSummary, PathBuf)> {
        let summary = self.process_file(atlas_path, regions)?;
        let path = summary.write_to_dir(&self.options.out_dir)?;
        info!(path = %path.display(), "wrote summary");
        Ok((summary, path))
    }

    fn process_card(
        &self,
        atlas: &RgbaImage,
        grid: &AtlasGrid,
        card_index: usize,
        regions: &[Region],
    ) -> CardEntry {
        let (col, row) = grid.position(card_index).unwrap_or_default();
        let (offset_x, offset_y) = (col * grid.card.width, row * grid.card.height);

        let span = spans::card_span(card_index, col, row);
        let _guard = span.enter();

        let regions = regions
            .iter()
            .enumerate()
            .map(|(i, region)| {
                let name = region.display_name(i);
                let x_abs = u64::from(offset_x) + u64::from(region.x);
                let y_abs = u64::from(offset_y) + u64::from(region.y);
                let text = self.region_text(atlas, card_index, i, &name, region, x_abs, y_abs);
                RegionEntry {
                    region_index: i,
                    name,
                    x: region.x,
                    y: region.y,
                    w: region.width,
                    h: region.height,
                    x_abs,
                    y_abs,
                    text,
                }
            })
            .collect();

        CardEntry {
            card_index,
            col,
            row,
            regions,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn region_text(
        &self,
        atlas: &RgbaImage,
        card_index: usize,
        region_index: usize,
        name: &str,
        region: &Region,
        x_abs: u64,
        y_abs: u64,
    ) -> String {
        let span = spans::region_span(region_index, name);
        let _guard = span.enter();

        let Some(crop) = crop_clipped(atlas, x_abs, y_abs, region.width, region.height) else {
            warn!(x_abs, y_abs, "region lies outside the atlas; leaving text empty");
            return String::new();
        };

        let needs_gray = self.ocr.is_some() || self.detector.is_some();
        let gray = needs_gray.then(|| image::DynamicImage::ImageRgba8(crop.clone()).to_luma8());

        let ocr_text = match (&self.ocr, &gray) {
            (Some(ocr), Some(gray)) => match ocr.recognize(gray) {
                Ok(text) => Some(text),
                Err(e) => {
                    spans::record_error(&e);
                    warn!(card = card_index, region = region_index, error = %e, "OCR failed");
                    None
                }
            },
            _ => None,
        };

        let matches = match (&self.detector, &gray) {
            (Some(detector), Some(gray)) => {
                wotr_common_log::timed!("detect_symbols", detector.detect(gray))
            }
            _ => Vec::new(),
        };

        let text = merge_region_text(ocr_text.as_deref(), &matches);

        if self.options.save_crops {
            self.save_crop(&crop, &text, name, card_index, region_index);
        }

        text
    }

    fn save_crop(
        &self,
        crop: &RgbaImage,
        text: &str,
        name: &str,
        card_index: usize,
        region_index: usize,
    ) {
        let stem = crop_file_stem(name, card_index, region_index);
        let png = self.options.out_dir.join(format!("{stem}.png"));
        match crop.save(&png) {
            Ok(()) => tracing::debug!(path = %png.display(), "saved crop"),
            Err(e) => warn!(path = %png.display(), error = %e, "failed to save crop"),
        }
        if !text.is_empty() {
            let txt = self.options.out_dir.join(format!("{stem}.txt"));
            if let Err(e) = std::fs::write(&txt, text) {
                warn!(path = %txt.display(), error = %e, "failed to save crop text");
            }
        }
    }
}

/// Crop a rectangle, clipped to the image. `None` when nothing is left.
fn crop_clipped(image: &RgbaImage, x: u64, y: u64, width: u32, height: u32) -> Option<RgbaImage> {
    let (w, h) = image.dimensions();
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return None;
    };
    if x >= w || y >= h {
        return None;
    }
    let width = width.min(w - x);
    let height = height.min(h - y);
    if width == 0 || height == 0 {
        return None;
    }
    Some(image.view(x, y, width, height).to_image())
}
