//! Turns rom folders into per-item commands.
//!
//! Traversal is pure and returns [`ScannedItem`]s; command construction (and its
//! logging) happens afterwards in [`CommandFactory`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::build::collection::ArtworkCommand;
use crate::build::command::{
    GenerateEmptyImageCommand, GenerateFolderArtworkCommand, GenerateRomArtworkCommand,
    PostProcessCommand, PreviewCommand, PreviewType, PrimeCacheCommand,
};
use crate::config::{AppConfig, PORTS_PLATFORM, RomExtensions};
use crate::filestore::FileStore;
use crate::foundation::error::SkinResult;
use crate::paths::PathLayout;
use crate::platform::PlatformResolver;

/// Directory names never descended into.
pub const EXCLUDED_DIRECTORIES: &[&str] = &["images", "videos", "manuals", "media"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannedKind {
    Rom,
    Folder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedItem {
    pub path: PathBuf,
    pub kind: ScannedKind,
    pub platform: Option<String>,
}

fn is_excluded(dir: &Path) -> bool {
    dir.file_name()
        .map(|n| n.to_string_lossy())
        .is_some_and(|n| n.starts_with('.') || EXCLUDED_DIRECTORIES.iter().any(|e| *e == n))
}

/// Roms directly inside `folder` (for its platform), then each sub-folder, depth first.
///
/// `rom_matches(platform, file_name)` filters rom files.
pub fn scan_folder(
    files: &dyn FileStore,
    folder: &Path,
    platform_of: &dyn Fn(&Path) -> Option<String>,
    rom_matches: &dyn Fn(&str, &str) -> bool,
    recursive: bool,
) -> SkinResult<Vec<ScannedItem>> {
    let mut out = Vec::new();
    if is_excluded(folder) {
        return Ok(out);
    }

    if let Some(platform) = platform_of(folder) {
        for file in files.list_files(folder, 0)? {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if rom_matches(&platform, &name) {
                out.push(ScannedItem {
                    path: file,
                    kind: ScannedKind::Rom,
                    platform: Some(platform.clone()),
                });
            }
        }
    }

    for dir in files.list_dirs(folder)? {
        if is_excluded(&dir) {
            continue;
        }
        out.push(ScannedItem {
            platform: platform_of(&dir),
            path: dir.clone(),
            kind: ScannedKind::Folder,
        });
        if recursive {
            out.extend(scan_folder(files, &dir, platform_of, rom_matches, true)?);
        }
    }
    Ok(out)
}

/// Artwork package + xml file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtworkSource {
    pub package: String,
    pub file: String,
}

impl ArtworkSource {
    pub fn new(package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            file: file.into(),
        }
    }
}

pub struct CommandFactory {
    config: AppConfig,
    paths: PathLayout,
    platforms: PlatformResolver,
    extensions: RomExtensions,
    files: Arc<dyn FileStore>,
}

impl CommandFactory {
    pub fn new(config: AppConfig, paths: PathLayout, files: Arc<dyn FileStore>) -> Self {
        let platforms = PlatformResolver::new(&config, paths.generated_artwork());
        let extensions = RomExtensions::new(&config);
        Self {
            config,
            paths,
            platforms,
            extensions,
            files,
        }
    }

    fn scan(&self, folder: &Path, recursive: bool) -> SkinResult<Vec<ScannedItem>> {
        let platform_of = |p: &Path| self.platforms.platform_or_none(p);
        let rom_matches = |platform: &str, name: &str| self.extensions.matches(platform, name);
        scan_folder(
            self.files.as_ref(),
            folder,
            &platform_of,
            &rom_matches,
            recursive,
        )
    }

    /// Rom and folder artwork commands below `folder`.
    ///
    /// `rom_artwork` or `folder_artwork` being `None` disables that kind.
    pub fn artwork_commands_for_folder(
        &self,
        folder: &Path,
        rom_artwork: Option<&ArtworkSource>,
        folder_artwork: Option<&ArtworkSource>,
        tokens: &BTreeMap<String, String>,
        recursive: bool,
    ) -> SkinResult<Vec<ArtworkCommand>> {
        let mut commands = Vec::new();
        for item in self.scan(folder, recursive)? {
            match (item.kind, &item.platform) {
                (_, None) => {
                    tracing::debug!(path = %item.path.display(), "no platform for folder, skipping");
                }
                (ScannedKind::Rom, Some(_)) => {
                    if let Some(src) = rom_artwork {
                        commands.push(ArtworkCommand::GenerateRomArtwork(
                            GenerateRomArtworkCommand {
                                artwork_package: src.package.clone(),
                                artwork: src.file.clone(),
                                tokens: tokens.clone(),
                                rom_absolute_path: item.path,
                                generate_descriptions: true,
                                platform: None,
                                force_portmaster: false,
                            },
                        ));
                    }
                }
                (ScannedKind::Folder, Some(_)) => {
                    if let Some(src) = folder_artwork {
                        commands.push(ArtworkCommand::GenerateFolderArtwork(
                            GenerateFolderArtworkCommand {
                                artwork_package: src.package.clone(),
                                artwork: src.file.clone(),
                                tokens: tokens.clone(),
                                folder_absolute_path: item.path,
                            },
                        ));
                    }
                }
            }
        }
        Ok(commands)
    }

    pub fn artwork_commands(
        &self,
        rom_artwork: Option<&ArtworkSource>,
        folder_artwork: Option<&ArtworkSource>,
        tokens: &BTreeMap<String, String>,
    ) -> SkinResult<Vec<ArtworkCommand>> {
        self.artwork_commands_for_folder(
            &self.config.rom_folder,
            rom_artwork,
            folder_artwork,
            tokens,
            true,
        )
    }

    /// One rom artwork command per port launcher, switching platform when an alternate exists.
    pub fn portmaster_artwork_commands(
        &self,
        artwork: &ArtworkSource,
        tokens: &BTreeMap<String, String>,
    ) -> SkinResult<Vec<ArtworkCommand>> {
        let roms = self.paths.portmaster_roms();
        if !self.files.exists(&roms) {
            return Ok(Vec::new());
        }
        let commands = self
            .files
            .list_files(&roms, usize::MAX)?
            .into_iter()
            .map(|file| {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let platform = self
                    .config
                    .portmaster_alternate_platform(&stem)
                    .unwrap_or(PORTS_PLATFORM)
                    .to_string();
                ArtworkCommand::GenerateRomArtwork(GenerateRomArtworkCommand {
                    artwork_package: artwork.package.clone(),
                    artwork: artwork.file.clone(),
                    tokens: tokens.clone(),
                    rom_absolute_path: file,
                    generate_descriptions: false,
                    platform: Some(platform),
                    force_portmaster: true,
                })
            })
            .collect();
        Ok(commands)
    }

    /// Placeholder images for every rom and platform folder under the rom folder.
    pub fn empty_image_commands(&self) -> SkinResult<Vec<GenerateEmptyImageCommand>> {
        let mut commands = Vec::new();
        for item in self.scan(&self.config.rom_folder, true)? {
            match item.platform {
                Some(platform) => commands.push(GenerateEmptyImageCommand {
                    absolute_path: item.path,
                    platform: Some(platform),
                }),
                None => {
                    tracing::debug!(path = %item.path.display(), "no platform for folder, skipping");
                }
            }
        }
        Ok(commands)
    }

    /// One command for the rom root plus one per platform sub-folder (any depth).
    pub fn post_process_commands(
        &self,
        package: &str,
        strategy: &str,
        options: &serde_json::Map<String, serde_json::Value>,
        files: bool,
        folders: bool,
    ) -> SkinResult<Vec<PostProcessCommand>> {
        let make = |source: PathBuf| PostProcessCommand {
            source,
            package: package.to_string(),
            strategy: strategy.to_string(),
            options: options.clone(),
            files,
            folders,
        };
        let mut commands = vec![make(self.config.rom_folder.clone())];
        let mut pending = self.files.list_dirs(&self.config.rom_folder)?;
        pending.reverse();
        while let Some(dir) = pending.pop() {
            if self.platforms.platform_or_none(&dir).is_some() {
                commands.push(make(dir.clone()));
            }
            let mut children = self.files.list_dirs(&dir)?;
            children.reverse();
            pending.extend(children);
        }
        Ok(commands)
    }

    pub fn portmaster_post_process_command(
        &self,
        package: &str,
        strategy: &str,
        options: &serde_json::Map<String, serde_json::Value>,
    ) -> PostProcessCommand {
        PostProcessCommand {
            source: self.paths.portmaster_roms(),
            package: package.to_string(),
            strategy: strategy.to_string(),
            options: options.clone(),
            files: true,
            folders: false,
        }
    }

    pub fn preview_commands(&self, package: &str, preview_name: &str) -> Vec<PreviewCommand> {
        let preview_type =
            PreviewType::parse(&self.config.preview.kind).unwrap_or(PreviewType::Static);
        vec![PreviewCommand {
            target: package.to_string(),
            preview_name: preview_name.to_string(),
            preview_type,
        }]
    }

    /// One scrape per configured folder; ports are never scraped.
    pub fn prime_cache_commands(&self, only_missing: bool) -> Vec<PrimeCacheCommand> {
        self.config
            .folders
            .iter()
            .filter(|(_, platform)| platform.as_str() != PORTS_PLATFORM)
            .map(|(folder, _)| PrimeCacheCommand {
                folder_absolute_path: self.config.rom_folder.join(folder),
                only_missing,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/factory.rs"]
mod tests;
