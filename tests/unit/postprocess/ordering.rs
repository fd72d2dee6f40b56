use std::collections::BTreeMap;

use super::*;

fn names(pairs: &[(&str, &str)]) -> NamesProvider {
    NamesProvider::from_map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn set(items: &[&str]) -> WorkingSet {
    items
        .iter()
        .map(|p| {
            let path = PathBuf::from(p);
            let key = path.file_name().unwrap().to_string_lossy().into_owned();
            (key, path)
        })
        .collect()
}

#[test]
fn natural_order_is_case_insensitive_and_numeric() {
    let mut v = vec!["game10", "Game2", "game1", "alpha"];
    v.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(v, vec!["alpha", "game1", "Game2", "game10"]);
}

#[test]
fn without_display_names_order_is_natural() {
    let s = set(&["/c/box/b10.png", "/c/box/B2.png", "/c/box/a.png"]);
    let sorted = sort_artwork(&s, &names(&[]));
    assert_eq!(
        sorted,
        vec![
            PathBuf::from("/c/box/a.png"),
            PathBuf::from("/c/box/B2.png"),
            PathBuf::from("/c/box/b10.png"),
        ]
    );
}

#[test]
fn display_names_drive_order_with_folders_first_and_unknown_last() {
    let s = set(&[
        "/p/catalogue/SNES/box/zelda.png",
        "/p/catalogue/SNES/box/mario.png",
        "/p/catalogue/SNES/box/homebrew.png",
        "/p/catalogue/Folder/box/RPG.png",
    ]);
    let n = names(&[
        ("zelda", "A Link to the Past"),
        ("mario", "Super Mario World"),
    ]);
    let sorted = sort_artwork(&s, &n);
    assert_eq!(
        sorted,
        vec![
            PathBuf::from("/p/catalogue/Folder/box/RPG.png"),
            PathBuf::from("/p/catalogue/SNES/box/zelda.png"),
            PathBuf::from("/p/catalogue/SNES/box/mario.png"),
            PathBuf::from("/p/catalogue/SNES/box/homebrew.png"),
        ]
    );
}

#[test]
fn unnamed_roms_follow_named_ones_in_natural_order() {
    let s = set(&[
        "/p/catalogue/SNES/box/z10.png",
        "/p/catalogue/SNES/box/kirby.png",
        "/p/catalogue/SNES/box/z2.png",
        "/p/catalogue/SNES/box/a1.png",
    ]);
    let n = names(&[("kirby", "Kirby Super Star")]);
    let sorted = sort_artwork(&s, &n);
    assert_eq!(
        sorted,
        vec![
            PathBuf::from("/p/catalogue/SNES/box/kirby.png"),
            PathBuf::from("/p/catalogue/SNES/box/a1.png"),
            PathBuf::from("/p/catalogue/SNES/box/z2.png"),
            PathBuf::from("/p/catalogue/SNES/box/z10.png"),
        ]
    );
}

#[test]
fn large_sets_sort_by_display_name() {
    let files: Vec<String> = (0..2000)
        .map(|i| format!("/p/catalogue/SNES/box/rom{i:04}.png"))
        .collect();
    let s = set(&files.iter().map(String::as_str).collect::<Vec<_>>());
    let table: Vec<(String, String)> = (0..2000)
        .map(|i| (format!("rom{i:04}"), format!("Title {:04}", 1999 - i)))
        .collect();
    let n = NamesProvider::from_map(table.into_iter().collect());
    let sorted = sort_artwork(&s, &n);
    assert_eq!(sorted.len(), 2000);
    assert_eq!(sorted[0], PathBuf::from("/p/catalogue/SNES/box/rom1999.png"));
    assert_eq!(sorted[1999], PathBuf::from("/p/catalogue/SNES/box/rom0000.png"));
}
