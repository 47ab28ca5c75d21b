//! Symbol detection by multi-scale template matching.
//!
//! A template is accepted for a region when both its intensity correlation
//! and its edge-map correlation clear their thresholds. The edge check keeps
//! JPEG noise and flat colour blocks from producing matches.

use image::GrayImage;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::imaging::{self, CANNY_HIGH, CANNY_LOW};
use crate::symbols::Template;

/// Smallest template side tried after scaling.
const MIN_TEMPLATE_SIDE: u32 = 3;

/// Side length of a template scaled by `scale`, halves rounded to even.
fn scaled_side(len: u32, scale: f64) -> u32 {
    (f64::from(len) * scale).round_ties_even() as u32
}

/// Detection thresholds and scales.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    pub threshold: f32,
    pub edge_threshold: f32,
    pub scales: Vec<f64>,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            edge_threshold: 0.2,
            scales: vec![0.8, 0.9, 1.0, 1.1, 1.2],
        }
    }
}

/// One detected symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolMatch {
    pub name: String,
    pub glyph: String,
    pub token: String,
    pub score: f32,
    pub edge_score: f32,
}

fn first_non_empty<'a>(candidates: [&'a str; 3]) -> &'a str {
    candidates.into_iter().find(|s| !s.is_empty()).unwrap_or("")
}

impl SymbolMatch {
    /// Text written into a region for this symbol.
    pub fn label(&self) -> &str {
        first_non_empty([&self.glyph, &self.token, &self.name])
    }

    /// Identity used when deduplicating matches.
    pub fn key(&self) -> &str {
        first_non_empty([&self.name, &self.token, &self.glyph])
    }
}

/// Best intensity and edge scores of one template over all scales.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemplateScores {
    pub color: f32,
    pub edge: f32,
}

/// Matches loaded templates against region crops.
pub struct SymbolDetector {
    templates: Vec<Template>,
    options: DetectorOptions,
}

impl SymbolDetector {
    pub fn new(templates: Vec<Template>, options: DetectorOptions) -> Self {
        Self { templates, options }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Score one template against a crop and its precomputed edge map.
    pub fn score(
        &self,
        crop: &GrayImage,
        crop_edges: &GrayImage,
        template: &GrayImage,
    ) -> TemplateScores {
        let mut best = TemplateScores::default();
        let (tw, th) = template.dimensions();

        for &scale in &self.options.scales {
            let (new_w, new_h) = (scaled_side(tw, scale), scaled_side(th, scale));
            if new_w < MIN_TEMPLATE_SIDE || new_h < MIN_TEMPLATE_SIDE {
                continue;
            }
            if new_w > crop.width() || new_h > crop.height() {
                continue;
            }

            let resized = imaging::resize_linear(template, new_w, new_h);
            let Some(color) = imaging::match_template_max(crop, &resized) else {
                continue;
            };

            let resized_edges = imaging::canny(&resized, CANNY_LOW, CANNY_HIGH);
            let edge = if imaging::is_blank(&resized_edges) {
                0.0
            } else {
                imaging::match_template_max(crop_edges, &resized_edges).unwrap_or(0.0)
            };

            best.color = best.color.max(color);
            best.edge = best.edge.max(edge);
        }

        best
    }

    /// Detect symbols in a grayscale crop, best score first, one entry per symbol.
    pub fn detect(&self, crop: &GrayImage) -> Vec<SymbolMatch> {
        if self.templates.is_empty() {
            return Vec::new();
        }

        let crop_edges = imaging::canny(crop, CANNY_LOW, CANNY_HIGH);
        let mut accepted = Vec::new();

        for template in &self.templates {
            let scores = self.score(crop, &crop_edges, &template.image);
            let color_ok = scores.color >= self.options.threshold;
            let edge_ok = scores.edge >= self.options.edge_threshold;

            if color_ok && edge_ok {
                info!(
                    symbol = %template.meta.name,
                    score = scores.color,
                    edge = scores.edge,
                    "detected symbol"
                );
                accepted.push(SymbolMatch {
                    name: template.meta.name.clone(),
                    glyph: template.meta.glyph.clone(),
                    token: template.meta.token.clone(),
                    score: scores.color,
                    edge_score: scores.edge,
                });
            } else if color_ok {
                debug!(
                    symbol = %template.meta.name,
                    score = scores.color,
                    edge = scores.edge,
                    edge_threshold = self.options.edge_threshold,
                    "rejected symbol below edge threshold"
                );
            }
        }

        dedupe_matches(accepted)
    }
}

/// Keep the best-scoring match per symbol, sorted by score descending.
pub fn dedupe_matches(matches: Vec<SymbolMatch>) -> Vec<SymbolMatch> {
    let mut best: HashMap<String, SymbolMatch> = HashMap::new();
    for m in matches {
        let key = m.key().to_string();
        if best.get(&key).map_or(true, |existing| m.score > existing.score) {
            best.insert(key, m);
        }
    }
    let mut out: Vec<SymbolMatch> = best.into_values().collect();
    out.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key().cmp(b.key())));
    out
}
