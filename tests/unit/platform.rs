use super::*;

fn resolver(roms: &Path) -> PlatformResolver {
    let mut cfg = AppConfig {
        rom_folder: roms.to_path_buf(),
        ..AppConfig::default()
    };
    cfg.folders.insert("Nintendo/NES".into(), "nes".into());
    PlatformResolver::new(&cfg, "/work/temp/output/generated_artwork")
}

#[test]
fn rom_files_resolve_via_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nes = dir.path().join("Nintendo/NES");
    std::fs::create_dir_all(&nes).unwrap();
    std::fs::write(nes.join("Mario.zip"), b"").unwrap();

    let r = resolver(dir.path());
    assert_eq!(r.platform(&nes).unwrap(), "nes");
    assert_eq!(r.platform(&nes.join("Mario.zip")).unwrap(), "nes");
}

#[test]
fn generated_artwork_paths_resolve_too() {
    let r = resolver(Path::new("/roms-that-do-not-exist"));
    assert_eq!(
        r.platform_or_none(Path::new(
            "/work/temp/output/generated_artwork/Nintendo/NES/covers"
        )),
        Some("nes".to_string())
    );
}

#[test]
fn folder_is_special_and_unknown_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("Folder");
    let other = dir.path().join("Amiga");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::create_dir_all(&other).unwrap();

    let r = resolver(dir.path());
    assert_eq!(r.platform(&folder).unwrap(), "folder");
    let err = r.platform(&other).unwrap_err();
    assert!(err.to_string().contains("Cannot find platform for folder"));
}

#[test]
fn generated_ports_folder_is_the_ports_platform() {
    let dir = tempfile::tempdir().unwrap();
    let generated = dir.path().join("generated_artwork");
    std::fs::create_dir_all(generated.join("Ports")).unwrap();
    let cfg = AppConfig {
        rom_folder: dir.path().join("roms"),
        ..AppConfig::default()
    };
    let r = PlatformResolver::new(&cfg, &generated);
    assert_eq!(r.platform(&generated.join("Ports")).unwrap(), "ports");
}
