//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WotrConfig {
    /// Atlas layout configuration.
    pub atlas: AtlasConfig,
    /// Symbol detection configuration.
    pub symbols: SymbolsConfig,
    /// Text recognition configuration.
    pub ocr: OcrConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Atlas layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Card width in pixels, used when a regions file has no image size.
    pub card_width: u32,
    /// Card height in pixels, used when a regions file has no image size.
    pub card_height: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            card_width: 535,
            card_height: 752,
        }
    }
}

/// Symbol template matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Directory holding one PNG template per symbol.
    pub dir: PathBuf,
    /// Symbol map JSON file.
    pub map: PathBuf,
    /// Intensity match threshold (0.0-1.0).
    pub threshold: f32,
    /// Edge match threshold (0.0-1.0).
    pub edge_threshold: f32,
    /// Template scales tried per region.
    pub scales: Vec<f64>,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/symbols"),
            map: PathBuf::from("assets/symbols_map.json"),
            threshold: 0.6,
            edge_threshold: 0.2,
            scales: vec![0.8, 0.9, 1.0, 1.1, 1.2],
        }
    }
}

/// Text recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR on every region by default.
    pub enabled: bool,
    /// Tesseract executable.
    pub binary: String,
    /// Tesseract page segmentation mode.
    pub psm: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            binary: "tesseract".to_string(),
            psm: 6,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for the summary and crops.
    pub dir: PathBuf,
    /// Save every region crop and its text next to the summary.
    pub save_crops: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            save_crops: false,
        }
    }
}
