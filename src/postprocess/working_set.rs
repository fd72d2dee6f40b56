use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, FOLDER_PACKAGE_FOLDER, PORTS_PACKAGE_FOLDER, RomExtensions};
use crate::filestore::FileStore;
use crate::foundation::error::{SkinError, SkinResult};
use crate::paths::PathLayout;
use crate::platform::PlatformResolver;

/// One packaged image: `<stem>.png` and where it lives in the package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingItem {
    pub file_name: String,
    pub path: PathBuf,
}

/// Packaged images a strategy operates on, files before folders.
///
/// File names are unique; a later entry with the same name replaces the earlier
/// one in its original position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkingSet {
    items: Vec<WorkingItem>,
    index: HashMap<String, usize>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, path: impl Into<PathBuf>) {
        let file_name = file_name.into();
        let path = path.into();
        match self.index.get(&file_name) {
            Some(&at) => self.items[at].path = path,
            None => {
                self.index.insert(file_name.clone(), self.items.len());
                self.items.push(WorkingItem { file_name, path });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkingItem> {
        self.items.iter()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|i| i.path.clone()).collect()
    }

    pub fn get(&self, file_name: &str) -> Option<&Path> {
        self.index
            .get(file_name)
            .map(|&at| self.items[at].path.as_path())
    }
}

impl<N: Into<String>, P: Into<PathBuf>> FromIterator<(N, P)> for WorkingSet {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (n, p) in iter {
            set.insert(n, p);
        }
        set
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Namespace {
    Artwork,
    Folder,
}

/// Finds the packaged box image for every rom file and/or sub-folder of a source folder.
pub struct WorkingSetResolver<'a> {
    config: &'a AppConfig,
    paths: &'a PathLayout,
    files: &'a dyn FileStore,
    platforms: PlatformResolver,
    extensions: RomExtensions,
}

impl<'a> WorkingSetResolver<'a> {
    pub fn new(config: &'a AppConfig, paths: &'a PathLayout, files: &'a dyn FileStore) -> Self {
        Self {
            config,
            paths,
            files,
            platforms: PlatformResolver::new(config, paths.generated_artwork()),
            extensions: RomExtensions::new(config),
        }
    }

    pub fn resolve(
        &self,
        source: &Path,
        package: &str,
        include_files: bool,
        include_folders: bool,
    ) -> SkinResult<WorkingSet> {
        let platform = self.platforms.platform_or_none(source);
        let mut set = WorkingSet::new();

        if include_files {
            for file in self.files.list_files(source, 0)? {
                let name = file_name(&file);
                if let Some(p) = &platform {
                    if !self.extensions.matches(p, &name) {
                        continue;
                    }
                }
                self.add(&mut set, &file, Namespace::Artwork, package, platform.as_deref())?;
            }
        }

        if include_folders {
            for dir in self.files.list_dirs(source)? {
                self.add(&mut set, &dir, Namespace::Folder, package, platform.as_deref())?;
            }
        }
        Ok(set)
    }

    fn add(
        &self,
        set: &mut WorkingSet,
        item: &Path,
        namespace: Namespace,
        package: &str,
        platform: Option<&str>,
    ) -> SkinResult<()> {
        let key = format!("{}.png", file_stem(item));
        let asset = if namespace == Namespace::Artwork && self.is_port(item) {
            self.paths
                .catalogue(package)
                .join(PORTS_PACKAGE_FOLDER)
                .join("box")
                .join(&key)
        } else {
            self.packaged_path(&key, package, namespace, platform)?
        };

        if !self.files.exists(&asset) {
            tracing::warn!(
                "Asset missing during postprocessing, boxart will be absent for `{}`. Image expected was `{}`",
                file_name(item),
                asset.display()
            );
            return Ok(());
        }
        set.insert(key, asset);
        Ok(())
    }

    fn is_port(&self, item: &Path) -> bool {
        item.starts_with(self.paths.portmaster_roms())
            || item.to_string_lossy().to_lowercase().contains("/ports")
    }

    fn packaged_path(
        &self,
        asset: &str,
        package: &str,
        namespace: Namespace,
        platform: Option<&str>,
    ) -> SkinResult<PathBuf> {
        let base = self.paths.catalogue(package);
        if namespace == Namespace::Folder {
            return Ok(base.join(FOLDER_PACKAGE_FOLDER).join("box").join(asset));
        }
        let platform = platform.ok_or_else(|| {
            SkinError::config(format!(
                "Platform missing during post processing, Platform must be provided for non Folder/Portmaster items: {asset}"
            ))
        })?;
        Ok(base
            .join(self.config.package_folder_for_platform(platform)?)
            .join("box")
            .join(asset))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/working_set.rs"]
mod tests;
