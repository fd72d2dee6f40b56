use super::*;

fn layout() -> PathLayout {
    PathLayout::new("/work", "full")
}

#[test]
fn package_and_zip_paths_carry_romset() {
    let l = layout();
    assert_eq!(l.package_root("dark"), PathBuf::from("/work/package/dark-full"));
    assert_eq!(l.zip_path("dark"), PathBuf::from("/work/zipped/dark-full.zip"));
    assert_eq!(
        l.catalogue("dark"),
        PathBuf::from("/work/package/dark-full/MUOS/info/catalogue")
    );
    assert_eq!(
        l.skipped_report(),
        PathBuf::from("/work/skipped/full/missing.json")
    );
}

#[test]
fn staging_and_logs() {
    let l = layout();
    assert_eq!(
        l.staging("counter", "abc"),
        PathBuf::from("/work/temp/post-process/counter/abc")
    );
    assert_eq!(
        l.log_path("skyscraper", "2024-01-02"),
        PathBuf::from("/work/var/log/skyscraper-2024-01-02.log")
    );
}

#[test]
fn namespace_output_folders() {
    let l = layout();
    let rom = Path::new("/roms/Nintendo/NES/Mario.zip");
    assert_eq!(
        l.generated_artwork_for_namespace(rom, Path::new("/roms"), CommandNamespace::Artwork),
        PathBuf::from("/work/temp/output/generated_artwork/Nintendo/NES")
    );
    assert_eq!(
        l.generated_artwork_for_namespace(rom, Path::new("/roms"), CommandNamespace::Folder),
        PathBuf::from("/work/temp/output/generated_artwork/Folder")
    );
    assert_eq!(
        l.generated_artwork_for_namespace(rom, Path::new("/roms"), CommandNamespace::Portmaster),
        PathBuf::from("/work/temp/output/generated_artwork/Ports")
    );
}

#[test]
fn font_table_defaults_and_errors() {
    let l = layout();
    assert_eq!(
        l.font("roboto", Some("bold")).unwrap(),
        PathBuf::from("/work/resources/font/roboto/Roboto-Bold.ttf")
    );
    assert_eq!(
        l.font("roboto", Some("nope")).unwrap(),
        PathBuf::from("/work/resources/font/roboto/Roboto-Regular.ttf")
    );
    assert_eq!(
        l.font("pixel", None).unwrap(),
        PathBuf::from("/work/resources/font/pixel/scribble1.ttf")
    );
    assert_eq!(
        l.font("vag_rounded", Some("bold")).unwrap(),
        PathBuf::from("/work/resources/font/vag-rounded/VAG-Rounded-Bold.ttf")
    );
    assert!(l.font("comic", Some("bold")).unwrap_err().is_config());
}

#[test]
fn relative_to_joins_with_slashes() {
    assert_eq!(
        relative_to(Path::new("/roms/a/b"), Path::new("/roms")),
        "a/b"
    );
    assert_eq!(relative_to(Path::new("/roms"), Path::new("/roms")), "");
}
