use super::*;

#[test]
fn package_is_required() {
    let err = BuildCommandCollection::default().validate().unwrap_err();
    assert!(err.is_config());
    assert_eq!(
        err.to_string(),
        "configuration error: package command is required"
    );
    assert!(BuildCommandCollection::with_package("dark").validate().is_ok());
}

#[test]
fn plan_loads_from_yaml() {
    let raw = r#"
id: nightly
package:
  package_name: dark
optimize:
  package_name: dark
  convert_to_jpg: true
generate_artwork:
  - type: generate-folder-artwork
    artwork_package: dark
    artwork: folder.xml
    folder_absolute_path: /roms/SNES
post_process:
  - source: /roms/SNES
    package: dark
    strategy: counter
"#;
    let plan = BuildCommandCollection::from_yaml(raw).unwrap();
    assert_eq!(plan.id, "nightly");
    assert_eq!(plan.optimize.as_ref().unwrap().jpg_quality, 90);
    assert_eq!(plan.generate_artwork.len(), 1);
    let cmd: Command = plan.generate_artwork[0].clone().into();
    assert_eq!(cmd.target(), "SNES");
    assert_eq!(plan.post_process.len(), 1);
}

#[test]
fn plan_without_package_is_rejected() {
    let err = BuildCommandCollection::from_yaml("id: x\n").unwrap_err();
    assert!(err.is_config());
}
