use super::*;
use crate::filestore::LocalFileStore;

fn touch(p: &Path) {
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(p, b"").unwrap();
}

struct Fixture {
    dir: tempfile::TempDir,
    factory: CommandFactory,
}

impl Fixture {
    fn roms(&self) -> PathBuf {
        self.dir.path().join("roms")
    }
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let roms = dir.path().join("roms");
    touch(&roms.join("SNES/Zelda.sfc"));
    touch(&roms.join("SNES/readme.txt"));
    touch(&roms.join("SNES/RPG/Chrono.sfc"));
    touch(&roms.join("SNES/images/Zelda.png"));
    touch(&roms.join(".hidden/x.sfc"));
    touch(&roms.join("Unknown/a.bin"));
    touch(&roms.join("GBA/Advance.gba"));

    let mut cfg = AppConfig {
        rom_folder: roms.clone(),
        romset_name: "full".into(),
        ..AppConfig::default()
    };
    cfg.folders.insert("SNES".into(), "snes".into());
    cfg.folders.insert("SNES/RPG".into(), "snes".into());
    cfg.folders.insert("GBA".into(), "gba".into());
    cfg.folders.insert("PORTS".into(), "ports".into());
    cfg.rom_extensions.insert("snes".into(), vec!["*.sfc".into()]);
    cfg.portmaster_alternates.insert(
        "doom".into(),
        crate::config::PortmasterAlternate {
            platform: "pc".into(),
        },
    );

    let factory = CommandFactory::new(
        cfg,
        PathLayout::new(dir.path(), "full"),
        Arc::new(LocalFileStore),
    );
    Fixture { dir, factory }
}

#[test]
fn scan_lists_roms_before_subfolders_and_skips_excluded() {
    let f = fixture();
    let snes = f.roms().join("SNES");
    let platform_of = |p: &Path| {
        p.ends_with("SNES")
            .then(|| "snes".to_string())
            .or_else(|| p.ends_with("RPG").then(|| "snes".to_string()))
    };
    let rom_matches = |_: &str, name: &str| name.ends_with(".sfc");

    let items = scan_folder(&LocalFileStore, &snes, &platform_of, &rom_matches, true).unwrap();
    let got: Vec<(PathBuf, ScannedKind)> = items
        .iter()
        .map(|i| (i.path.strip_prefix(&snes).unwrap().to_path_buf(), i.kind))
        .collect();
    assert_eq!(
        got,
        vec![
            (PathBuf::from("Zelda.sfc"), ScannedKind::Rom),
            (PathBuf::from("RPG"), ScannedKind::Folder),
            (PathBuf::from("RPG/Chrono.sfc"), ScannedKind::Rom),
        ]
    );

    let flat = scan_folder(&LocalFileStore, &snes, &platform_of, &rom_matches, false).unwrap();
    assert_eq!(flat.len(), 2);
}

#[test]
fn artwork_commands_cover_roms_and_platform_folders() {
    let f = fixture();
    let rom = ArtworkSource::new("dark", "box.xml");
    let folder = ArtworkSource::new("dark", "folder.xml");
    let cmds = f
        .factory
        .artwork_commands(Some(&rom), Some(&folder), &BTreeMap::new())
        .unwrap();
    let targets: Vec<String> = cmds
        .into_iter()
        .map(|c| crate::build::command::Command::from(c).target())
        .collect();
    assert_eq!(
        targets,
        vec!["GBA", "Advance.gba", "SNES", "Zelda.sfc", "RPG", "Chrono.sfc"]
    );

    let roms_only = f
        .factory
        .artwork_commands(Some(&rom), None, &BTreeMap::new())
        .unwrap();
    assert_eq!(roms_only.len(), 3);
}

#[test]
fn empty_images_skip_unknown_platforms() {
    let f = fixture();
    let cmds = f.factory.empty_image_commands().unwrap();
    assert!(cmds.iter().all(|c| c.platform.is_some()));
    assert!(!cmds.iter().any(|c| c.absolute_path.ends_with("Unknown")));
    assert_eq!(cmds.iter().filter(|c| c.is_dir()).count(), 3);
}

#[test]
fn post_process_adds_root_and_platform_subfolders() {
    let f = fixture();
    let cmds = f
        .factory
        .post_process_commands("dark", "counter", &serde_json::Map::new(), true, false)
        .unwrap();
    let sources: Vec<PathBuf> = cmds.iter().map(|c| c.source.clone()).collect();
    assert_eq!(
        sources,
        vec![
            f.roms(),
            f.roms().join("GBA"),
            f.roms().join("SNES"),
            f.roms().join("SNES/RPG"),
        ]
    );
}

#[test]
fn portmaster_commands_use_alternates() {
    let f = fixture();
    let ports = f.dir.path().join("temp/portmaster/roms");
    touch(&ports.join("doom.sh"));
    touch(&ports.join("quake.sh"));
    let cmds = f
        .factory
        .portmaster_artwork_commands(&ArtworkSource::new("dark", "box.xml"), &BTreeMap::new())
        .unwrap();
    let platforms: Vec<Option<String>> = cmds
        .into_iter()
        .map(|c| match c {
            ArtworkCommand::GenerateRomArtwork(r) => {
                assert!(r.force_portmaster);
                r.platform
            }
            ArtworkCommand::GenerateFolderArtwork(_) => None,
        })
        .collect();
    assert_eq!(platforms, vec![Some("pc".into()), Some("ports".into())]);
}

#[test]
fn prime_cache_skips_ports() {
    let f = fixture();
    let cmds = f.factory.prime_cache_commands(true);
    assert_eq!(cmds.len(), 3);
    assert!(cmds.iter().all(|c| c.only_missing));
    assert!(!cmds.iter().any(|c| c.folder_absolute_path.ends_with("PORTS")));
}
