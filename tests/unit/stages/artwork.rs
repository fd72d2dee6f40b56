use std::collections::BTreeMap;

use super::*;
use crate::config::PortmasterAlternate;
use crate::stages::test_support::{RecordingSubprocess, Workspace};

const GAMELIST: &str = r#"<?xml version="1.0"?>
<gameList>
  <game id="1">
    <path>./rom01.sfc</path>
    <name>Rom One</name>
    <desc>Save the princess &amp; the kingdom.</desc>
  </game>
  <game id="2">
    <path>./rom02.sfc</path>
    <name>Rom Two</name>
  </game>
</gameList>
"#;

fn rom_command(ws: &Workspace, rom: &str) -> GenerateRomArtworkCommand {
    GenerateRomArtworkCommand {
        artwork_package: "dark".into(),
        artwork: "box.xml".into(),
        tokens: BTreeMap::new(),
        rom_absolute_path: ws.rom(rom),
        generate_descriptions: false,
        platform: None,
        force_portmaster: false,
    }
}

#[test]
fn descriptions_come_from_the_matching_game() {
    assert_eq!(
        description_for(GAMELIST, "rom01.sfc").as_deref(),
        Some("Save the princess & the kingdom.")
    );
    assert_eq!(
        description_for(GAMELIST, "rom02.sfc").as_deref(),
        Some("No Description")
    );
    assert_eq!(description_for(GAMELIST, "rom03.sfc"), None);
}

#[test]
fn self_closing_games_have_no_body() {
    let list = r#"<gameList>
  <game id="0" />
  <game id="1"><path>./rom01.sfc</path><desc>First</desc></game>
  <game/>
  <game><path>./rom02.sfc</path><desc>Second</desc></game>
</gameList>"#;
    assert_eq!(description_for(list, "rom01.sfc").as_deref(), Some("First"));
    assert_eq!(description_for(list, "rom02.sfc").as_deref(), Some("Second"));
}

#[test]
fn portmaster_scripts_use_their_alternate_platform() {
    let mut ws = Workspace::new();
    ws.config.portmaster_alternates.insert(
        "Doom".into(),
        PortmasterAlternate {
            platform: "pc".into(),
        },
    );
    let stage = ArtworkStage::new(ws.env());
    let mut cmd = rom_command(&ws, "rom01.sfc");
    cmd.platform = Some("ports".into());
    cmd.rom_absolute_path = "/ports/Doom.sh".into();
    assert_eq!(stage.rom_platform(&cmd).unwrap(), "pc");

    cmd.rom_absolute_path = "/ports/Quake.sh".into();
    assert_eq!(stage.rom_platform(&cmd).unwrap(), "ports");
    cmd.rom_absolute_path = "/ports/Doom.zip".into();
    assert_eq!(stage.rom_platform(&cmd).unwrap(), "ports");
}

#[test]
fn rom_artwork_runs_the_scraper_renderer() {
    let ws = Workspace::new();
    let xml = ws.touch("template/dark/box.xml", "<artwork/>");
    let stage = ArtworkStage::new(ws.env());
    stage
        .generate_rom_artwork(&rom_command(&ws, "rom01.sfc"))
        .unwrap();

    let argv = &ws.subprocess.argvs()[0];
    assert_eq!(argv[0], "Skyscraper");
    assert_eq!(argv[1], "rom01.sfc");
    let value = |flag: &str| {
        let i = argv.iter().position(|a| a == flag).unwrap();
        argv[i + 1].clone()
    };
    assert_eq!(value("-a"), xml.to_string_lossy());
    assert_eq!(value("-p"), "snes");
    assert_eq!(
        value("-o"),
        ws.paths().generated_artwork().join("SNES").to_string_lossy()
    );
    let timeout = ws.subprocess.requests.lock().unwrap()[0].timeout;
    assert_eq!(timeout, Some(GENERATE_TIMEOUT));
}

#[test]
fn portmaster_commands_render_into_ports() {
    let ws = Workspace::new();
    ws.touch("template/dark/box.xml", "<artwork/>");
    let stage = ArtworkStage::new(ws.env());
    let mut cmd = rom_command(&ws, "rom01.sfc");
    cmd.force_portmaster = true;
    cmd.platform = Some("ports".into());
    stage.generate_rom_artwork(&cmd).unwrap();
    let argv = &ws.subprocess.argvs()[0];
    let i = argv.iter().position(|a| a == "-o").unwrap();
    assert!(argv[i + 1].ends_with("generated_artwork/Ports"));
}

#[test]
fn missing_artwork_xml_is_a_config_error() {
    let ws = Workspace::new();
    let stage = ArtworkStage::new(ws.env());
    let err = stage
        .generate_rom_artwork(&rom_command(&ws, "rom01.sfc"))
        .unwrap_err();
    assert!(err.is_config());
    assert!(ws.subprocess.argvs().is_empty());
}

#[test]
fn scraper_failure_names_the_log_file() {
    let ws = Workspace::new().with_subprocess(RecordingSubprocess::failing());
    ws.touch("template/dark/box.xml", "<artwork/>");
    let stage = ArtworkStage::new(ws.env());
    let err = stage
        .generate_rom_artwork(&rom_command(&ws, "rom01.sfc"))
        .unwrap_err()
        .to_string();
    assert!(err.contains("The scraping process failed"));
    assert!(err.contains("skyscraper-"));
}

#[test]
fn descriptions_are_written_next_to_the_covers() {
    let ws = Workspace::new();
    ws.touch("template/dark/box.xml", "<artwork/>");
    ws.touch("temp/output/gamelist/SNES/gamelist.xml", GAMELIST);
    let stage = ArtworkStage::new(ws.env());
    let mut cmd = rom_command(&ws, "rom01.sfc");
    cmd.generate_descriptions = true;
    stage.generate_rom_artwork(&cmd).unwrap();
    assert_eq!(
        ws.read("temp/output/generated_artwork/SNES/txt/rom01.txt"),
        "Save the princess & the kingdom."
    );
}

#[test]
fn folder_artwork_is_renamed_after_the_folder() {
    let ws = Workspace::new();
    let covers = ws.paths().generated_artwork().join("Folder/covers");
    let ws = ws.with_subprocess(RecordingSubprocess::with_effect(move |_| {
        std::fs::create_dir_all(&covers).unwrap();
        std::fs::write(covers.join("rom01.png"), b"png").unwrap();
    }));
    ws.touch("template/dark/folder.xml", "<artwork/>");
    let stage = ArtworkStage::new(ws.env());
    stage
        .generate_folder_artwork(&GenerateFolderArtworkCommand {
            artwork_package: "dark".into(),
            artwork: "folder.xml".into(),
            tokens: BTreeMap::new(),
            folder_absolute_path: ws.config.rom_folder.join("SNES"),
        })
        .unwrap();

    assert_eq!(ws.subprocess.argvs()[0][1], "rom01.sfc");
    assert!(ws.exists("temp/output/generated_artwork/Folder/covers/SNES.png"));
    assert!(!ws.exists("temp/output/generated_artwork/Folder/covers/rom01.png"));
}

#[test]
fn configured_folder_rom_wins() {
    let mut ws = Workspace::new();
    ws.config
        .folder_roms
        .insert("SNES".into(), "rom02.sfc".into());
    let stage = ArtworkStage::new(ws.env());
    let folder = ws.config.rom_folder.join("SNES");
    assert_eq!(stage.folder_rom(&folder).unwrap(), Some(ws.rom("rom02.sfc")));

    ws.config.folder_roms.clear();
    let stage = ArtworkStage::new(ws.env());
    assert_eq!(stage.folder_rom(&folder).unwrap(), Some(ws.rom("rom01.sfc")));
}

#[test]
fn empty_images_copy_the_null_cover() {
    let ws = Workspace::new();
    ws.touch("resources/null.png", "null");
    let stage = ArtworkStage::new(ws.env());
    stage
        .generate_empty_image(&GenerateEmptyImageCommand {
            absolute_path: ws.rom("rom01.sfc"),
            platform: Some("snes".into()),
        })
        .unwrap();
    stage
        .generate_empty_image(&GenerateEmptyImageCommand {
            absolute_path: ws.config.rom_folder.join("SNES"),
            platform: Some("snes".into()),
        })
        .unwrap();
    assert_eq!(
        ws.read("temp/output/generated_artwork/SNES/covers/rom01.png"),
        "null"
    );
    assert_eq!(
        ws.read("temp/output/generated_artwork/Folder/covers/SNES.png"),
        "null"
    );
}

#[test]
fn prime_cache_scrapes_with_the_long_timeout() {
    let ws = Workspace::new();
    let stage = ArtworkStage::new(ws.env());
    stage
        .prime_cache(&PrimeCacheCommand {
            folder_absolute_path: ws.config.rom_folder.join("SNES"),
            only_missing: true,
        })
        .unwrap();
    let request = ws.subprocess.requests.lock().unwrap()[0].clone();
    assert_eq!(request.timeout, Some(SCRAPE_TIMEOUT));
    assert!(request.argv.iter().any(|a| a.contains("onlymissing")));
}
