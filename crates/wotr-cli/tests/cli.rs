mod common;

use common::{json, TestContext};
use predicates::prelude::*;

#[test]
fn test_presets_text() {
    let ctx = TestContext::new();
    ctx.command()
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fortress (1380x912)"))
        .stdout(predicate::str::contains("535x752"));
}

#[test]
fn test_presets_json() {
    let ctx = TestContext::new();
    let output = ctx
        .command()
        .args(["presets", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = json::parse_output(&output.stdout);
    assert_eq!(value.as_array().unwrap().len(), 3);
    assert_eq!(value[1]["size"], serde_json::json!([1380, 912]));
}

#[test]
fn test_grid_uses_regions_card_size() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["grid", "--atlas", "atlas.png", "--regions", "regions.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 cols x 1 rows = 2 cards"));
}

#[test]
fn test_grid_card_larger_than_atlas() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["grid", "--atlas", "atlas.png", "--card-width", "100", "--card-height", "100"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("larger than atlas 80x40"))
        .stderr(predicate::str::contains("wotr presets"));
}

#[test]
fn test_grid_unknown_preset_suggests_names() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["grid", "--atlas", "atlas.png", "--preset", "tower"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("card format not found: tower"))
        .stderr(predicate::str::contains("- fortress"));
}

#[test]
fn test_process_detects_symbols() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args([
            "process",
            "--atlas",
            "atlas.png",
            "--regions",
            "regions.json",
            "--out",
            "result",
            "--symbols-dir",
            "symbols",
            "--symbols-map",
            "symbols_map.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 cards"))
        .stdout(predicate::str::contains("symbols: ⚔ x1"));

    let summary: serde_json::Value =
        serde_json::from_str(&ctx.read("result/cards_summary.json")).unwrap();
    assert_eq!(summary["cards"][0]["regions"][0]["text"], "");
    assert_eq!(summary["cards"][1]["regions"][0]["text"], "⚔");
    assert_eq!(summary["card_size"], serde_json::json!([40, 40]));
}

#[test]
fn test_process_detect_uses_config_paths() {
    let ctx = TestContext::new()
        .with_atlas_fixture()
        .with_default_config();
    let output = ctx
        .command()
        .args([
            "process",
            "--atlas",
            "atlas.png",
            "--regions",
            "regions.json",
            "--detect",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = json::parse_output(&output.stdout);
    assert_eq!(report["cards"], 2);
    assert_eq!(report["glyphs"]["⚔"], 1);
    assert!(ctx.path().join("out").join("cards_summary.json").exists());
}

#[test]
fn test_process_without_detection_leaves_text_empty() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["process", "--atlas", "atlas.png", "--regions", "regions.json", "--save-crops"])
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_str(&ctx.read("out/cards_summary.json")).unwrap();
    assert_eq!(summary["cards"][1]["regions"][0]["text"], "");
    assert!(ctx.path().join("out").join("cost_card1_reg0.png").exists());
}

#[test]
fn test_process_invalid_symbol_map_disables_detection() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.write("broken_map.json", "{not json");
    ctx.command()
        .args([
            "process",
            "--atlas",
            "atlas.png",
            "--regions",
            "regions.json",
            "--symbols-dir",
            "symbols",
            "--symbols-map",
            "broken_map.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 cards"));

    let summary: serde_json::Value =
        serde_json::from_str(&ctx.read("out/cards_summary.json")).unwrap();
    assert_eq!(summary["cards"][1]["regions"][0]["text"], "");
}

#[test]
fn test_process_missing_regions_file() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["process", "--atlas", "atlas.png", "--regions", "nope.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_missing_atlas_json_error() {
    let ctx = TestContext::new().with_atlas_fixture();
    let output = ctx
        .command()
        .args(["--format", "json", "grid", "--atlas", "missing.png", "--regions", "regions.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    json::assert_error(&output.stderr, "E011");
}

#[test]
fn test_card_extracts_one_card() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args([
            "card",
            "--atlas",
            "atlas.png",
            "--regions",
            "regions.json",
            "--index",
            "1",
            "--out",
            "cards/card1.png",
            "--outline",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Card 1 (col 1, row 0, 40x40)"));

    let card = image::open(ctx.path().join("cards/card1.png")).unwrap().to_rgba8();
    assert_eq!(card.dimensions(), (40, 40));
    // top-left corner of the cost region outline
    assert_eq!(card.get_pixel(5, 2).0, [255, 200, 0, 255]);
}

#[test]
fn test_card_index_out_of_range() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args([
            "card",
            "--atlas",
            "atlas.png",
            "--regions",
            "regions.json",
            "--index",
            "5",
            "--out",
            "c.png",
        ])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("card index 5 out of range (atlas has 2 cards)"));
}

#[test]
fn test_regions_edit_cycle() {
    let ctx = TestContext::new();

    ctx.command()
        .args([
            "regions", "add", "--file", "r.json", "--preset", "player", "--name", "title", "--rect",
            "10", "20", "100", "30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("title"));

    ctx.command()
        .args([
            "regions", "add", "--file", "r.json", "--drag", "200", "200", "150", "260", "--scale",
            "0.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("region2"));

    let saved: serde_json::Value = serde_json::from_str(&ctx.read("r.json")).unwrap();
    assert_eq!(saved["image_size"], serde_json::json!([535, 752]));
    assert_eq!(saved["regions"][1]["x"], 300);
    assert_eq!(saved["regions"][1]["width"], 100);
    assert_eq!(saved["regions"][1]["height"], 120);

    ctx.command()
        .args(["regions", "hit", "--file", "r.json", "--x", "50", "--y", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title"));

    ctx.command()
        .args(["regions", "remove", "--file", "r.json", "--name", "title"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed title"));

    ctx.command()
        .args(["regions", "list", "--file", "r.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("card size: 535x752"))
        .stdout(predicate::str::contains("regions: 1"));

    ctx.command()
        .args(["regions", "clear", "--file", "r.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 regions"));
}

#[test]
fn test_regions_remove_unknown_name() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["regions", "remove", "--file", "regions.json", "--name", "costt"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("region not found: costt"))
        .stderr(predicate::str::contains("- cost"));
}

#[test]
fn test_regions_legacy_list_file() {
    let ctx = TestContext::new();
    ctx.write("old.json", r#"[{"name": "a", "x": 0, "y": 0, "width": 5, "height": 5}]"#);
    ctx.command()
        .args(["regions", "list", "--file", "old.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("card size: not set"));
}

#[test]
fn test_symbols_check_clean() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.command()
        .args(["symbols", "check", "--dir", "symbols", "--map", "symbols_map.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no problems found"));
}

#[test]
fn test_symbols_check_reports_bad_names() {
    let ctx = TestContext::new().with_atlas_fixture();
    ctx.write(
        "bad_map.json",
        r#"{"Dark Tower.png": {"name": "Dark Tower", "glyph": "🗼", "token": "TOWER"}}"#,
    );
    ctx.command()
        .args(["symbols", "check", "--dir", "symbols", "--map", "bad_map.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Dark Tower.png: invalid character"))
        .stdout(predicate::str::contains("swords.png: template has no symbol map entry"));
}

#[test]
fn test_symbols_detect_on_crop() {
    let ctx = TestContext::new().with_atlas_fixture();
    let mut crop = image::GrayImage::new(30, 30);
    for (x, y, p) in common::swords().enumerate_pixels() {
        crop.put_pixel(8 + x, 8 + y, *p);
    }
    crop.save(ctx.path().join("crop.png")).unwrap();

    ctx.command()
        .args([
            "symbols",
            "detect",
            "--dir",
            "symbols",
            "--map",
            "symbols_map.json",
            "--image",
            "crop.png",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 symbol(s)"))
        .stdout(predicate::str::contains("Swords"));
}

#[test]
fn test_summary_show_after_process() {
    let ctx = TestContext::new()
        .with_atlas_fixture()
        .with_default_config();
    ctx.command()
        .args(["process", "--atlas", "atlas.png", "--regions", "regions.json", "--detect"])
        .assert()
        .success();

    ctx.command()
        .args(["summary", "show", "--card", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("card 1 (col 1, row 0)  [⚔x1]"))
        .stdout(predicate::str::contains("cost"));
}

#[test]
fn test_doctor_with_fixture_config() {
    let ctx = TestContext::new()
        .with_atlas_fixture()
        .with_default_config();
    ctx.command()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 symbols in symbols_map.json, 0 problem(s)"))
        .stdout(predicate::str::contains("wotr-no-such-tesseract"));
}

#[test]
fn test_invalid_config_is_config_error() {
    let ctx = TestContext::new().with_config("symbols:\n  threshold: 7.5\n");
    ctx.command()
        .arg("presets")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[E001]"));
}

#[test]
fn test_completions() {
    let ctx = TestContext::new();
    ctx.command()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wotr"));
}
