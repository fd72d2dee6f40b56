//! Package layout, JPEG optimisation and zip packaging.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use xxhash_rust::xxh3::xxh3_64;

use crate::assets::decode::OutputFormat;
use crate::build::command::{CompressPackageCommand, OptimizeCommand, PackageCommand};
use crate::foundation::error::{SkinError, SkinResult};
use crate::platform::PlatformResolver;
use crate::process::SubprocessRequest;
use crate::stages::StageEnv;

/// Generated media folder → catalogue folder.
pub const MEDIA_FOLDERS: &[(&str, &str)] = &[("covers", "box"), ("screenshots", "preview"), ("txt", "text")];

/// Scraper media folders that never name a platform.
const SKIPPED_FOLDERS: &[&str] = &["covers", "screenshots", "txt", "textures", "marquees", "wheels"];

pub const NOTES_HEADER: &str = "Generated with skinsmith\n\n";

fn is_media_folder(dir: &Path) -> bool {
    dir.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SKIPPED_FOLDERS.contains(&n))
}

/// Platform folders below `generated`, depth first.
fn platform_dirs(env: &StageEnv, generated: &Path) -> SkinResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut pending = env.files.list_dirs(generated)?;
    pending.reverse();
    while let Some(dir) = pending.pop() {
        if is_media_folder(&dir) {
            continue;
        }
        let mut children = env.files.list_dirs(&dir)?;
        if children.iter().any(|c| is_media_folder(c)) {
            out.push(dir.clone());
        }
        children.reverse();
        pending.extend(children);
    }
    Ok(out)
}

/// Rebuild `package/<pkg>-<romset>` from the generated artwork.
#[tracing::instrument(skip_all, fields(package = %cmd.package_name))]
pub fn package(env: &StageEnv, cmd: &PackageCommand) -> SkinResult<()> {
    let root = env.paths.package_root(&cmd.package_name);
    env.wipe(&root)?;
    env.files.create_dir(&root)?;

    let catalogue = env.paths.catalogue(&cmd.package_name);
    let generated = env.paths.generated_artwork();
    let platforms = PlatformResolver::new(&env.config, &generated);
    for dir in platform_dirs(env, &generated)? {
        let platform = platforms.platform(&dir)?;
        let package_folder = env.config.package_folder_for_platform(&platform)?;
        for (media, target) in MEDIA_FOLDERS {
            let from = dir.join(media);
            if env.files.exists(&from) {
                env.files
                    .mirror(&from, &catalogue.join(&package_folder).join(target))?;
            }
        }
    }

    write_notes(env, &root)?;
    write_names(env, &root)
}

fn write_notes(env: &StageEnv, root: &Path) -> SkinResult<()> {
    let mut notes = NOTES_HEADER.to_string();
    let mut seen = HashSet::new();
    for file in env.files.list_files(&env.paths.notes_dir(), usize::MAX)? {
        if file.extension().is_none_or(|e| e != "txt") {
            continue;
        }
        let contents = env.files.read_to_string(&file)?;
        if seen.insert(xxh3_64(contents.as_bytes())) {
            notes.push_str(&contents);
        }
    }
    env.files.dump(&root.join("extra/notes.txt"), notes.as_bytes())
}

fn write_names(env: &StageEnv, root: &Path) -> SkinResult<()> {
    if !env.names.has_extra_entries() {
        return Ok(());
    }
    let json = serde_json::to_string_pretty(env.names.names())
        .map_err(|e| SkinError::serde(format!("name.json: {e}")))?;
    env.files.dump(&root.join("MUOS/info/name.json"), json.as_bytes())
}

/// Re-encode every packaged PNG as JPEG when asked.
#[tracing::instrument(skip_all, fields(package = %cmd.package_name))]
pub fn optimize(env: &StageEnv, cmd: &OptimizeCommand) -> SkinResult<()> {
    if !cmd.convert_to_jpg {
        tracing::debug!("jpg conversion disabled, nothing to optimize");
        return Ok(());
    }
    let base = env.paths.package_root(&cmd.package_name).join("MUOS");
    let format = OutputFormat::Jpeg {
        quality: cmd.jpg_quality.min(100),
    };
    for png in env.files.list_files(&base, usize::MAX)? {
        if png.extension().is_none_or(|e| !e.eq_ignore_ascii_case("png")) {
            continue;
        }
        let img = env.canvas.read(&png)?;
        env.canvas.save_as(&img, &png.with_extension("jpg"), format)?;
        env.files.remove(&png)?;
    }
    Ok(())
}

/// Device-side cleanup script for the namespaces flagged in `nuke_options`.
pub fn nuke_script(cmd: &CompressPackageCommand) -> SkinResult<Option<String>> {
    if !cmd.nuke_options.values().any(|v| *v) {
        return Ok(None);
    }
    let mut lines = vec!["rm -rf /mnt/mmc/extra".to_string()];
    for (namespace, nuke) in &cmd.nuke_options {
        if !nuke {
            continue;
        }
        let line = match namespace.as_str() {
            "artwork" => "find '/mnt/mmc/MUOS/info/catalogue' -type f -mmin -10 -print0 -o -path '/mnt/mmc/MUOS/info/catalogue/Folder' -prune -o -path '/mnt/mmc/MUOS/info/catalogue/External - Ports' -prune | xargs -0 rm",
            "portmaster" => "find '/mnt/mmc/MUOS/info/catalogue/External - Ports' -type f -mmin -10 -print0 | xargs -0 rm",
            "folder" => "find '/mnt/mmc/MUOS/info/catalogue/Folder' -type f -mmin -10 -print0 | xargs -0 rm",
            other => {
                return Err(SkinError::config(format!(
                    "unknown nuke namespace \"{other}\""
                )));
            }
        };
        lines.push(line.to_string());
    }
    Ok(Some(lines.join("\n")))
}

/// Zip `<pkg>/MUOS` as `mnt/mmc/MUOS`, plus `opt/update.sh` when anything is nuked.
#[tracing::instrument(skip_all, fields(package = %cmd.package_name))]
pub fn compress_package(env: &StageEnv, cmd: &CompressPackageCommand) -> SkinResult<()> {
    let muos = env.paths.package_root(&cmd.package_name).join("MUOS");
    if !env.files.exists(&muos) {
        return Err(anyhow!(
            "No package exists at `{}`, cannot compress",
            muos.display()
        )
        .into());
    }
    let zip = env.paths.zip_path(&cmd.package_name);
    // zip runs inside the staging dir
    let zip = std::path::absolute(&zip)
        .with_context(|| format!("resolve \"{}\"", zip.display()))?;
    env.wipe(&zip)?;
    if let Some(parent) = zip.parent() {
        env.files.create_dir(parent)?;
    }

    let staging = env.paths.temp().join("zip").join(&cmd.package_name);
    env.wipe(&staging)?;
    env.files.mirror(&muos, &staging.join("mnt/mmc/MUOS"))?;
    let mut entries = vec!["mnt".to_string()];
    if let Some(script) = nuke_script(cmd)? {
        env.files.dump(&staging.join("opt/update.sh"), script.as_bytes())?;
        entries.push("opt".to_string());
    }

    let mut argv = vec![
        "zip".to_string(),
        "-r".to_string(),
        "-q".to_string(),
        zip.to_string_lossy().into_owned(),
    ];
    argv.extend(entries);
    let output = env.run(&SubprocessRequest::new(argv).with_cwd(&staging));
    env.wipe(&staging)?;
    if !output?.success {
        return Err(anyhow!("zip failed to write `{}`", zip.display()).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/stages/package.rs"]
mod tests;
