use image::{GrayImage, Luma, Rgba, RgbaImage};
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

use wotr_atlas::{
    load_templates, AtlasProcessor, DetectorOptions, ProcessOptions, RegionsFile, SymbolDetector,
    SymbolMap, SUMMARY_FILE,
};

fn swords() -> GrayImage {
    GrayImage::from_fn(14, 14, |x, y| {
        if x == y || x + y == 13 || x.abs_diff(y) == 1 || (x + y).abs_diff(13) == 1 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Two 40x40 cards side by side; the symbol is drawn only on the second card.
fn write_fixture(dir: &Path) {
    let mut atlas = RgbaImage::from_pixel(80, 40, Rgba([0, 0, 0, 255]));
    for (x, y, p) in swords().enumerate_pixels() {
        let v = p.0[0];
        atlas.put_pixel(40 + 12 + x, 8 + y, Rgba([v, v, v, 255]));
    }
    atlas.save(dir.join("atlas.png")).unwrap();

    std::fs::write(
        dir.join("regions.json"),
        r#"{"image_size": [40, 40], "regions": [{"name": "cost", "x": 5, "y": 2, "width": 30, "height": 28}]}"#,
    )
    .unwrap();

    let symbols = dir.join("symbols");
    std::fs::create_dir_all(&symbols).unwrap();
    swords().save(symbols.join("swords.png")).unwrap();
    std::fs::write(
        dir.join("symbols_map.json"),
        r#"{"swords.png": {"name": "Swords", "glyph": "⚔", "token": "SWORDS", "description": "Combat icon"}}"#,
    )
    .unwrap();
}

#[test]
fn test_atlas_to_summary_with_symbols() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let map = SymbolMap::load(dir.path().join("symbols_map.json")).unwrap();
    let templates = load_templates(dir.path().join("symbols"), &map);
    assert_eq!(templates.len(), 1);

    let out_dir = dir.path().join("out");
    let processor = AtlasProcessor::new(ProcessOptions {
        out_dir: out_dir.clone(),
        ..ProcessOptions::default()
    })
    .with_detector(SymbolDetector::new(templates, DetectorOptions::default()));

    let regions = RegionsFile::load(dir.path().join("regions.json")).unwrap();
    let (summary, path) = processor.run(&dir.path().join("atlas.png"), &regions).unwrap();

    assert_eq!(path, out_dir.join(SUMMARY_FILE));
    assert_eq!(summary.cards.len(), 2);
    assert_eq!(summary.cards[0].regions[0].text, "");
    assert_eq!(summary.cards[1].regions[0].text, "⚔");
    assert_eq!(summary.cards[1].regions[0].x_abs, 45);

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["cols"], 2);
    assert_eq!(raw["rows"], 1);
    assert_eq!(raw["cards"][1]["regions"][0]["text"], "⚔");
}

#[test]
fn test_card_larger_than_atlas_fails() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let regions =
        RegionsFile::from_json_str(r#"{"image_size": [100, 100], "regions": []}"#).unwrap();
    let processor = AtlasProcessor::new(ProcessOptions::default());
    let err = processor
        .process_file(&dir.path().join("atlas.png"), &regions)
        .unwrap_err();
    assert!(err.to_string().contains("larger than atlas"));
}

#[test]
fn test_missing_atlas_is_image_error() {
    let dir = tempdir().unwrap();
    let processor = AtlasProcessor::new(ProcessOptions::default());
    let err = processor
        .process_file(&dir.path().join("nope.png"), &RegionsFile::default())
        .unwrap_err();
    assert!(matches!(err, wotr_atlas::AtlasError::Image { .. }));
}
