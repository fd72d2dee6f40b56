use super::*;

#[test]
fn targets_match_progress_labels() {
    let rom = Command::GenerateRomArtwork(GenerateRomArtworkCommand {
        artwork_package: "dark".into(),
        artwork: "box.xml".into(),
        tokens: BTreeMap::new(),
        rom_absolute_path: "/roms/SNES/Zelda.sfc".into(),
        generate_descriptions: false,
        platform: None,
        force_portmaster: false,
    });
    assert_eq!(rom.target(), "Zelda.sfc");

    let pp = Command::PostProcess(PostProcessCommand {
        source: "/roms/SNES".into(),
        package: "dark".into(),
        strategy: "counter".into(),
        options: serde_json::Map::new(),
        files: true,
        folders: false,
    });
    assert_eq!(pp.target(), "counter: `/roms/SNES`");
    assert_eq!(pp.name(), "post-process");

    let preview = Command::Preview(PreviewCommand {
        target: "dark".into(),
        preview_name: "dark".into(),
        preview_type: PreviewType::Static,
    });
    assert_eq!(preview.target(), "animated");
}

#[test]
fn empty_image_dir_detection() {
    let dir = GenerateEmptyImageCommand {
        absolute_path: "/roms/SNES/RPG".into(),
        platform: None,
    };
    let file = GenerateEmptyImageCommand {
        absolute_path: "/roms/SNES/Zelda.sfc".into(),
        platform: Some("snes".into()),
    };
    assert!(dir.is_dir());
    assert!(!file.is_dir());
}

#[test]
fn commands_deserialize_from_tagged_yaml() {
    let yaml = r#"
type: post-process
source: /roms/SNES
package: dark
strategy: counter
options:
  position: top-right
"#;
    let cmd: Command = serde_yaml::from_str(yaml).unwrap();
    let Command::PostProcess(pp) = cmd else {
        panic!("expected post-process");
    };
    assert!(pp.files);
    assert!(!pp.folders);
    assert_eq!(pp.options["position"], serde_json::json!("top-right"));
}

#[test]
fn preview_type_flags() {
    assert!(PreviewType::Both.wants_static() && PreviewType::Both.wants_animated());
    assert!(!PreviewType::Animated.wants_static());
    assert_eq!(PreviewType::parse("static"), Some(PreviewType::Static));
    assert_eq!(PreviewType::parse("x"), None);
}
