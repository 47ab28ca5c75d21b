//! Merging detected symbol glyphs into recognised region text.

use crate::detect::SymbolMatch;

/// Combine OCR output with the glyphs of detected symbols.
///
/// Control characters are stripped from the OCR text. When the text is too
/// short or garbled to carry meaning (fewer than two ASCII alphanumerics and at
/// most three characters) only the glyphs are kept.
pub fn merge_region_text(ocr: Option<&str>, matches: &[SymbolMatch]) -> String {
    let base = ocr.map(str::trim).unwrap_or("");
    if matches.is_empty() {
        return base.to_string();
    }

    let mut glyphs: Vec<&str> = Vec::with_capacity(matches.len());
    for label in matches.iter().map(SymbolMatch::label) {
        if !label.is_empty() && !glyphs.contains(&label) {
            glyphs.push(label);
        }
    }
    let glyphs = glyphs.join(" ");

    let cleaned: String = base
        .chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1F | 0x7F))
        .collect();
    let alnum = cleaned.chars().filter(char::is_ascii_alphanumeric).count();

    if alnum < 2 && (cleaned.trim().is_empty() || cleaned.chars().count() <= 3) {
        glyphs
    } else if glyphs.is_empty() {
        cleaned
    } else {
        format!("{cleaned} {glyphs}").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(g: &str) -> SymbolMatch {
        SymbolMatch {
            name: format!("name-{g}"),
            glyph: g.to_string(),
            token: String::new(),
            score: 0.9,
            edge_score: 0.5,
        }
    }

    #[test]
    fn test_no_matches_returns_trimmed_text() {
        assert_eq!(merge_region_text(Some("  Gandalf \n"), &[]), "Gandalf");
        assert_eq!(merge_region_text(None, &[]), "");
    }

    #[test]
    fn test_glyphs_appended_to_text() {
        let text =
            merge_region_text(Some("Play on a Fellowship\n"), &[glyph("⚔"), glyph("👁")]);
        assert_eq!(text, "Play on a Fellowship ⚔ 👁");
    }

    #[test]
    fn test_garbage_text_replaced_by_glyphs() {
        assert_eq!(merge_region_text(Some("~|"), &[glyph("⚔")]), "⚔");
        assert_eq!(merge_region_text(None, &[glyph("⚔")]), "⚔");
    }

    #[test]
    fn test_control_characters_removed() {
        let text = merge_region_text(Some("Ring\x0cbearer"), &[glyph("💍")]);
        assert_eq!(text, "Ringbearer 💍");
    }

    #[test]
    fn test_duplicate_glyphs_collapsed_in_order() {
        let text = merge_region_text(Some("ok go"), &[glyph("⚔"), glyph("👁"), glyph("⚔")]);
        assert_eq!(text, "ok go ⚔ 👁");
    }

    #[test]
    fn test_long_non_alnum_text_kept() {
        let text = merge_region_text(Some("—— ——"), &[glyph("⚔")]);
        assert_eq!(text, "—— —— ⚔");
    }
}
