use std::path::Path;

use crate::build::command::CopyResourcesCommand;
use crate::foundation::error::SkinResult;
use crate::stages::StageEnv;

pub const ROM_TRANSLATIONS: &str = "rom_translations.yml";

/// Refresh the scraper's resource folder and the post-process resources from the
/// artwork packages and the shared `resources/` tree.
#[tracing::instrument(skip_all, fields(packages = %cmd.artwork_folders.join(",")))]
pub fn copy_resources(env: &StageEnv, cmd: &CopyResourcesCommand) -> SkinResult<()> {
    copy_scraper_resources(env, cmd)?;
    copy_post_process_resources(env, cmd)
}

fn mirror_if_present(env: &StageEnv, from: &Path, to: &Path) -> SkinResult<()> {
    if env.files.exists(from) {
        env.files.mirror(from, to)?;
    }
    Ok(())
}

fn copy_scraper_resources(env: &StageEnv, cmd: &CopyResourcesCommand) -> SkinResult<()> {
    let target = env.config.skyscraper_config_folder_path.join("resources");
    if env.files.exists(&target) {
        // The first run keeps a copy of whatever the user had there.
        let backup = target.with_file_name("resources-bak");
        if !env.files.exists(&backup) {
            env.files.mirror(&target, &backup)?;
        }
        env.files.remove(&target)?;
    }
    env.files.create_dir(&target)?;

    for package in &cmd.artwork_folders {
        mirror_if_present(env, &env.paths.template_dir(package).join("resources"), &target)?;
    }
    mirror_if_present(env, &env.paths.resources_dir().join("skyscraper"), &target)
}

fn copy_post_process_resources(env: &StageEnv, cmd: &CopyResourcesCommand) -> SkinResult<()> {
    let target = env.paths.post_process_resources();
    env.wipe(&target)?;
    env.files.create_dir(&target)?;

    for package in &cmd.artwork_folders {
        mirror_if_present(
            env,
            &env.paths.template_dir(package).join("resources-post-process"),
            &target,
        )?;
    }
    mirror_if_present(env, &env.paths.resources_dir().join("post-process"), &target)?;

    let translations = env.paths.user_config_dir().join(ROM_TRANSLATIONS);
    if env.files.exists(&translations) {
        env.files.copy(&translations, &target.join(ROM_TRANSLATIONS))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/stages/resources.rs"]
mod tests;
