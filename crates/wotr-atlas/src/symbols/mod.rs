//! Symbol templates and the symbol map.
//!
//! A symbol directory holds one PNG template per symbol; the symbol
//! map associates each filename with its name, glyph, token and description.

mod map;
mod naming;

pub use map::{SymbolIssue, SymbolMap, SymbolMeta};
pub use naming::{check_template_name, NamingViolation};

use image::GrayImage;
use std::path::Path;
use tracing::{info, warn};

/// A loaded template image with its metadata.
#[derive(Debug, Clone)]
pub struct Template {
    pub filename: String,
    pub meta: SymbolMeta,
    pub image: GrayImage,
}

/// Load every template named in `map` from `dir`.
///
/// Missing or undecodable templates are skipped with a warning.
pub fn load_templates(dir: impl AsRef<Path>, map: &SymbolMap) -> Vec<Template> {
    let dir = dir.as_ref();
    let mut templates = Vec::with_capacity(map.len());

    for (filename, meta) in map.iter() {
        let path = dir.join(filename);
        if !path.exists() {
            warn!(path = %path.display(), "template not found; skipping");
            continue;
        }
        match image::open(&path) {
            Ok(img) => templates.push(Template {
                filename: filename.to_string(),
                meta: meta.clone(),
                image: img.to_luma8(),
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read template; skipping")
            }
        }
    }

    info!(count = templates.len(), dir = %dir.display(), "loaded symbol templates");
    templates
}
