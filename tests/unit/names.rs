use super::*;

#[test]
fn base_file_wins_over_extra() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("name.json");
    let extra = dir.path().join("name_extra.json");
    std::fs::write(&base, r#"{"sf2": "Street Fighter II"}"#).unwrap();
    std::fs::write(&extra, r#"{"sf2": "SF2 custom", "mslug": "Metal Slug"}"#).unwrap();

    let names = NamesProvider::new(&base, &extra);
    assert_eq!(names.entry("sf2"), Some("Street Fighter II"));
    assert_eq!(names.entry("mslug"), Some("Metal Slug"));
    assert!(names.has_extra_entries());
}

#[test]
fn missing_files_give_empty_tables() {
    let names = NamesProvider::new("/nope/name.json", "/nope/extra.json");
    assert!(names.names().is_empty());
    assert!(!names.has_extra_entries());
}

#[test]
fn ordered_list_sorts_by_display_name_and_drops_unknown() {
    let names = NamesProvider::from_map(BTreeMap::from([
        ("sf2".to_string(), "Street Fighter II".to_string()),
        ("aof".to_string(), "Art of Fighting".to_string()),
        ("mslug".to_string(), "Metal Slug".to_string()),
    ]));
    let ordered = names.ordered_list(["sf2", "mslug", "aof", "unknown"]);
    assert_eq!(ordered, vec!["aof", "mslug", "sf2"]);
}
