use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;

use crate::build::command::TransferCommand;
use crate::foundation::error::{SkinError, SkinResult};
use crate::process::SubprocessRequest;
use crate::stages::StageEnv;

pub const REMOTE_CARD_PATH: &str = "/mnt/mmc";
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Where a transfer lands on the device and how to reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Remote<'a> {
    pub ip: &'a str,
    pub user: &'a str,
    pub pass: &'a str,
    pub port: &'a str,
}

/// `sshpass -p <pass> scp -P <port> -r <sources..> <user>@<ip>:<dest>`.
pub fn scp_argv(remote: &Remote<'_>, sources: &[PathBuf], dest: &str) -> Vec<String> {
    let mut argv: Vec<String> = vec![
        "sshpass".into(),
        "-p".into(),
        remote.pass.into(),
        "scp".into(),
        "-o".into(),
        "StrictHostKeyChecking=accept-new".into(),
        "-P".into(),
        remote.port.into(),
        "-r".into(),
    ];
    argv.extend(sources.iter().map(|s| s.to_string_lossy().into_owned()));
    argv.push(format!("{}@{}:{dest}", remote.user, remote.ip));
    argv
}

/// Copy the zip (or the unpacked package) onto the device's card.
#[tracing::instrument(skip_all, fields(package = %cmd.package_name, zipped = cmd.zipped))]
pub fn transfer(env: &StageEnv, cmd: &TransferCommand) -> SkinResult<()> {
    let (sources, dest) = if cmd.zipped {
        let zip = env.paths.zip_path(&cmd.package_name);
        if !env.files.exists(&zip) {
            return Err(anyhow!("No zip exists with name `{}`, cannot transfer", zip.display()).into());
        }
        (vec![zip], format!("{REMOTE_CARD_PATH}/ARCHIVE/"))
    } else {
        let root = env.paths.package_root(&cmd.package_name);
        if !env.files.exists(&root) {
            return Err(anyhow!(
                "No package exists with name `{}`, cannot transfer",
                root.display()
            )
            .into());
        }
        let mut children = env.files.list_dirs(&root)?;
        children.extend(env.files.list_files(&root, 0)?);
        (children, format!("{REMOTE_CARD_PATH}/"))
    };

    let sftp = env.config.sftp.as_ref().and_then(|s| s.complete());
    let Some((ip, user, pass, port)) = sftp else {
        return Err(SkinError::config(
            "Cannot transfer to SFTP as sftp config variables are missing. Make sure you set ip,pass,user,port in config.yml",
        ));
    };
    let remote = Remote {
        ip,
        user,
        pass,
        port,
    };

    let argv = scp_argv(&remote, &sources, &dest);
    // not through `StageEnv::run`: argv carries the password
    let output = env
        .subprocess
        .run(&SubprocessRequest::new(argv).with_timeout(TRANSFER_TIMEOUT))?;
    if !output.success {
        return Err(anyhow!("transfer to {ip} failed: {}", output.stderr.trim()).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/stages/transfer.rs"]
mod tests;
