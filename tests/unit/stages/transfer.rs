use super::*;
use crate::config::SftpConfig;
use crate::stages::test_support::{RecordingSubprocess, Workspace};

fn with_sftp(mut ws: Workspace) -> Workspace {
    ws.config.sftp = Some(SftpConfig {
        ip: Some("10.0.0.2".into()),
        user: Some("root".into()),
        pass: Some("secret".into()),
        port: Some("2022".into()),
    });
    ws
}

fn command(zipped: bool) -> TransferCommand {
    TransferCommand {
        package_name: "dark".into(),
        zipped,
    }
}

#[test]
fn scp_argv_carries_port_and_destination() {
    let remote = Remote {
        ip: "10.0.0.2",
        user: "root",
        pass: "secret",
        port: "22",
    };
    let argv = scp_argv(&remote, &[PathBuf::from("/z/a.zip")], "/mnt/mmc/ARCHIVE/");
    assert_eq!(&argv[..3], ["sshpass", "-p", "secret"]);
    let port = argv.iter().position(|a| a == "-P").unwrap();
    assert_eq!(argv[port + 1], "22");
    assert_eq!(argv[argv.len() - 2], "/z/a.zip");
    assert_eq!(argv.last().unwrap(), "root@10.0.0.2:/mnt/mmc/ARCHIVE/");
}

#[test]
fn zipped_transfer_sends_the_archive() {
    let ws = with_sftp(Workspace::new());
    let zip = ws.touch("zipped/dark-full.zip", "zip");
    transfer(&ws.env(), &command(true)).unwrap();

    let argv = ws.subprocess.argvs()[0].clone();
    assert!(argv.contains(&zip.to_string_lossy().into_owned()));
    assert_eq!(argv.last().unwrap(), "root@10.0.0.2:/mnt/mmc/ARCHIVE/");
}

#[test]
fn folder_transfer_sends_each_top_level_entry() {
    let ws = with_sftp(Workspace::new());
    ws.touch("package/dark-full/MUOS/info/x.png", "x");
    ws.touch("package/dark-full/extra/notes.txt", "n");
    transfer(&ws.env(), &command(false)).unwrap();

    let argv = ws.subprocess.argvs()[0].clone();
    let n = argv.len();
    assert!(argv[n - 3].ends_with("dark-full/MUOS"));
    assert!(argv[n - 2].ends_with("dark-full/extra"));
    assert_eq!(argv[n - 1], "root@10.0.0.2:/mnt/mmc/");
}

#[test]
fn missing_source_or_config_fails() {
    let ws = with_sftp(Workspace::new());
    let err = transfer(&ws.env(), &command(true)).unwrap_err();
    assert!(err.to_string().contains("No zip exists"));

    let ws = Workspace::new();
    ws.touch("zipped/dark-full.zip", "zip");
    let err = transfer(&ws.env(), &command(true)).unwrap_err();
    assert!(err.is_config());
    assert!(ws.subprocess.argvs().is_empty());
}

#[test]
fn failed_copy_is_an_error() {
    let ws = with_sftp(Workspace::new().with_subprocess(RecordingSubprocess::failing()));
    ws.touch("zipped/dark-full.zip", "zip");
    let err = transfer(&ws.env(), &command(true)).unwrap_err();
    assert!(err.to_string().contains("boom"));
}
