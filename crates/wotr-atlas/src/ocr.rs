//! Text recognition backends.

use image::GrayImage;
use std::process::{Command, Stdio};

use crate::error::{AtlasError, Result};

/// Recognises text in a grayscale region crop.
pub trait TextRecognizer: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, crop: &GrayImage) -> Result<String>;
}

/// Runs the `tesseract` command line tool on each crop.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
    psm: u8,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract", 6)
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, psm: u8) -> Self {
        Self {
            binary: binary.into(),
            psm,
        }
    }

    /// Version banner of the binary, or `None` if it cannot be run.
    pub fn probe(&self) -> Option<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        // older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .map(|l| l.trim().to_string())
    }
}

impl TextRecognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, crop: &GrayImage) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("wotr-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| AtlasError::Ocr(format!("failed to create temp file: {e}")))?;

        crop.save_with_format(file.path(), image::ImageFormat::Png)
            .map_err(|e| AtlasError::image(file.path(), e))?;

        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .arg("--psm")
            .arg(self.psm.to_string())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AtlasError::Ocr(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(AtlasError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Returns the same text for every crop.
    pub struct FixedText(pub &'static str);

    impl TextRecognizer for FixedText {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _crop: &GrayImage) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Fails on every crop.
    pub struct Failing;

    impl TextRecognizer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _crop: &GrayImage) -> Result<String> {
            Err(AtlasError::Ocr("engine unavailable".to_string()))
        }
    }
}
