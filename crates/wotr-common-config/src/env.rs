//! Environment variable handling.

use std::env;
use std::path::PathBuf;

use crate::types::WotrConfig;

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const WOTR_CONFIG: &str = "WOTR_CONFIG";
    pub const WOTR_SYMBOLS_DIR: &str = "WOTR_SYMBOLS_DIR";
    pub const WOTR_SYMBOLS_MAP: &str = "WOTR_SYMBOLS_MAP";
    pub const WOTR_OUT_DIR: &str = "WOTR_OUT_DIR";
    pub const WOTR_TESSERACT: &str = "WOTR_TESSERACT";
    pub const WOTR_OCR: &str = "WOTR_OCR";
    pub const WOTR_SAVE_CROPS: &str = "WOTR_SAVE_CROPS";

    // Logging
    pub const WOTR_LOG_LEVEL: &str = "WOTR_LOG_LEVEL";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Self {
        // later files override earlier ones
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        Self { _guard: () }
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Apply `WOTR_*` overrides to a loaded configuration.
    pub fn apply_overrides(config: &mut WotrConfig) {
        if let Some(dir) = Self::get(vars::WOTR_SYMBOLS_DIR) {
            config.symbols.dir = PathBuf::from(dir);
        }
        if let Some(map) = Self::get(vars::WOTR_SYMBOLS_MAP) {
            config.symbols.map = PathBuf::from(map);
        }
        if let Some(out) = Self::get(vars::WOTR_OUT_DIR) {
            config.output.dir = PathBuf::from(out);
        }
        if let Some(binary) = Self::get(vars::WOTR_TESSERACT) {
            config.ocr.binary = binary;
        }
        if let Some(enabled) = Self::get_bool(vars::WOTR_OCR) {
            config.ocr.enabled = enabled;
        }
        if let Some(save) = Self::get_bool(vars::WOTR_SAVE_CROPS) {
            config.output.save_crops = save;
        }
    }
}
