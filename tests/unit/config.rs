use super::*;

const SAMPLE: &str = r#"
rom_folder: /roms
romset_name: full
screenscraper_user: alice
screenscraper_pass: secret
skyscraper_config_folder_path: /home/a/.skyscraper
folders:
  NES: nes
  SNES: snes
package:
  nes: Nintendo NES-Famicom
  snes: Nintendo SNES-SFC
folder_roms:
  NES: Tetris.zip
portmaster_alternates:
  Doom:
    platform: pc
optimize:
  enabled: true
  convert_to_jpg: true
  jpg_quality: 80
preview:
  type: animated
  animation_format: webp
sftp:
  ip: 10.0.0.2
  user: root
  pass: root
  port: "22"
threading:
  parallel: true
  threads: 2
"#;

#[test]
fn parses_full_config() {
    let cfg = AppConfig::from_yaml(SAMPLE).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.screenscraper_credentials(), "alice:secret");
    assert_eq!(cfg.scrape_threads, 1);
    assert_eq!(cfg.platform_for_folder("SNES"), Some("snes"));
    assert_eq!(cfg.single_rom_for_folder("NES"), Some("Tetris.zip"));
    assert_eq!(cfg.portmaster_alternate_platform("Doom"), Some("pc"));
    assert_eq!(cfg.optimize.jpg_quality, 80);
    assert_eq!(cfg.preview.kind, "animated");
    assert_eq!(cfg.preview.grid_size, 4);
    assert_eq!(
        cfg.sftp.as_ref().and_then(SftpConfig::complete),
        Some(("10.0.0.2", "root", "root", "22"))
    );
    assert_eq!(cfg.threading.threads, Some(2));
}

#[test]
fn package_folder_special_cases_and_errors() {
    let cfg = AppConfig::from_yaml(SAMPLE).unwrap();
    assert_eq!(cfg.package_folder_for_platform("Folder").unwrap(), "Folder");
    assert_eq!(
        cfg.package_folder_for_platform("ports").unwrap(),
        "External - Ports"
    );
    assert_eq!(
        cfg.package_folder_for_platform("nes").unwrap(),
        "Nintendo NES-Famicom"
    );
    let err = cfg.package_folder_for_platform("amiga").unwrap_err();
    assert_eq!(
        err.to_string(),
        "configuration error: Platform \"amiga\" does not exist in the package mapping."
    );
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = AppConfig::from_yaml(SAMPLE).unwrap();
    cfg.optimize.jpg_quality = 101;
    assert!(cfg.validate().unwrap_err().is_config());

    let mut cfg = AppConfig::from_yaml(SAMPLE).unwrap();
    cfg.threading.threads = Some(0);
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::from_yaml(SAMPLE).unwrap();
    cfg.romset_name.clear();
    assert!(cfg.validate().is_err());
}

#[test]
fn incomplete_sftp_is_not_usable() {
    let sftp = SftpConfig {
        ip: Some("1.2.3.4".into()),
        user: Some("u".into()),
        pass: None,
        port: Some("22".into()),
    };
    assert!(sftp.complete().is_none());
}

#[test]
fn rom_extensions_fall_back_and_special_case_ports() {
    let mut cfg = AppConfig::default();
    cfg.rom_extensions
        .insert("nes".into(), vec!["*.nes".into(), "*.zip".into()]);
    let exts = RomExtensions::new(&cfg);
    assert!(exts.matches("nes", "Mario.NES"));
    assert!(!exts.matches("nes", "Mario.sfc"));
    assert!(exts.matches("snes", "Zelda.sfc"));
    assert_eq!(exts.for_platform("ports"), vec!["*.sh", "*.7z", "*.zip"]);
    assert!(exts.matches("ports", "Doom.sh"));
}
