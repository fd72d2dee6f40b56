use serde_json::json;

use super::*;
use crate::filestore::LocalFileStore;
use crate::postprocess::test_support::Packaged;

const RED: Color = Color::rgb(200, 0, 0);

const TABLE: &str = "\
snes:
  rom01: Hello
  Rom 03: Three
nes:
  rom02: World
gb: ~
";

fn write_table(p: &Packaged, name: &str, body: &str) {
    let dir = p.resources();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), body).unwrap();
}

#[test]
fn caption_box_depends_on_position() {
    let o = TranslationOptions::from_map(&Map::new()).unwrap();
    assert_eq!(o.caption_box(), (320, 80));
    assert_eq!(o.background_opacity, 90.0);
    let map = json!({"position": "top-right"});
    let o = TranslationOptions::from_map(map.as_object().unwrap()).unwrap();
    assert_eq!(o.caption_box(), (240, 120));
}

#[test]
fn tables_merge_across_platforms() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.yml");
    std::fs::write(&path, "a:\n  x: one\n  y: two\nb:\n  x: three\n").unwrap();
    let c = load_translations(&LocalFileStore, &path).unwrap();
    assert_eq!(c.len(), 2);
    assert_eq!(c.lookup("x"), Some("three"));
    assert_eq!(c.lookup("y"), Some("two"));
}

#[test]
fn missing_table_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_translations(&LocalFileStore, &dir.path().join("none.yml")).is_err());
}

#[test]
fn exact_and_approximate_keys_match() {
    let p = Packaged::snes(3, |_| RED);
    write_table(&p, "rom_translations.yml", TABLE);
    let strategy = TranslationStrategy::new(p.context());
    strategy.process(&p.command(NAME, json!({}))).unwrap();

    let mut drawn = p.canvas.drawn_texts();
    drawn.sort();
    assert_eq!(drawn, vec!["Hello", "Three", "World"]);
}

#[test]
fn unmatched_items_are_left_alone() {
    let p = Packaged::snes(1, |_| RED);
    write_table(&p, "rom_translations.yml", "snes:\n  Unrelated Title: Nope\n");
    let strategy = TranslationStrategy::new(p.context());
    strategy.process(&p.command(NAME, json!({}))).unwrap();

    assert!(p.canvas.drawn_texts().is_empty());
    assert_eq!(p.read_box(0).pixel(320, 420).unwrap(), [200, 0, 0, 255]);
}

#[test]
fn caption_background_is_blended_at_the_configured_opacity() {
    let p = Packaged::snes(1, |_| RED);
    write_table(&p, "rom_translations.yml", TABLE);
    let strategy = TranslationStrategy::new(p.context());
    strategy.process(&p.command(NAME, json!({}))).unwrap();

    let img = p.read_box(0);
    // black backdrop at 90% over red
    assert_eq!(img.pixel(280, 400).unwrap(), [20, 0, 0, 255]);
    assert_eq!(img.pixel(320, 100).unwrap(), [200, 0, 0, 255]);
}

#[test]
fn custom_mapping_file_name() {
    let p = Packaged::snes(1, |_| RED);
    write_table(&p, "custom.yml", "snes:\n  rom01: Custom\n");
    let strategy = TranslationStrategy::new(p.context());
    strategy
        .process(&p.command(NAME, json!({"mapping": "custom.yml"})))
        .unwrap();
    assert_eq!(p.canvas.drawn_texts(), vec!["Custom"]);
}
