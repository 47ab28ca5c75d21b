//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use tempfile::{tempdir, TempDir};

/// Test context with temporary directory
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.yaml");

        Self {
            temp_dir,
            config_path,
        }
    }

    /// Create a config file
    pub fn with_config(self, config: &str) -> Self {
        std::fs::write(&self.config_path, config).expect("Failed to write config");
        self
    }

    /// Config pointing at the fixture symbols and the temp output directory
    pub fn with_default_config(self) -> Self {
        let config = r#"
symbols:
  dir: symbols
  map: symbols_map.json
ocr:
  binary: wotr-no-such-tesseract
output:
  dir: out
"#;
        self.with_config(config)
    }

    /// Two 40x40 cards side by side with a swords symbol on the second one,
    /// a regions file, a template directory and a symbol map.
    pub fn with_atlas_fixture(self) -> Self {
        let dir = self.path();
        let mut atlas = RgbaImage::from_pixel(80, 40, Rgba([0, 0, 0, 255]));
        for (x, y, p) in swords().enumerate_pixels() {
            let v = p.0[0];
            atlas.put_pixel(40 + 12 + x, 8 + y, Rgba([v, v, v, 255]));
        }
        atlas.save(dir.join("atlas.png")).expect("Failed to write atlas");

        self.write(
            "regions.json",
            r#"{"image_size": [40, 40], "regions": [{"name": "cost", "x": 5, "y": 2, "width": 30, "height": 28}]}"#,
        );

        std::fs::create_dir_all(dir.join("symbols")).expect("Failed to create symbols dir");
        swords()
            .save(dir.join("symbols").join("swords.png"))
            .expect("Failed to write template");
        self.write(
            "symbols_map.json",
            r#"{"swords.png": {"name": "Swords", "glyph": "⚔", "token": "SWORDS", "description": "Combat icon"}}"#,
        );
        self
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.path().join(name), contents).expect("Failed to write file");
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read file")
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("wotr").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("WOTR_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env_remove("WOTR_SYMBOLS_DIR")
            .env_remove("WOTR_SYMBOLS_MAP")
            .env_remove("WOTR_OUT_DIR")
            .env_remove("WOTR_TESSERACT")
            .env_remove("WOTR_OCR")
            .env_remove("WOTR_SAVE_CROPS")
            .env("NO_COLOR", "1");
        if self.config_path.exists() {
            cmd.env("WOTR_CONFIG", &self.config_path);
        } else {
            cmd.env_remove("WOTR_CONFIG");
        }
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A 14x14 diagonal cross.
pub fn swords() -> GrayImage {
    GrayImage::from_fn(14, 14, |x, y| {
        if x == y || x + y == 13 || x.abs_diff(y) == 1 || (x + y).abs_diff(13) == 1 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// JSON output helpers
pub mod json {
    use serde_json::Value;

    pub fn parse_output(output: &[u8]) -> Value {
        serde_json::from_slice(output).expect("Failed to parse JSON output")
    }

    pub fn assert_error(output: &[u8], code: &str) {
        let json = parse_output(output);
        assert_eq!(
            json.get("error")
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_str()),
            Some(code),
            "Expected error code: {code}"
        );
    }
}
