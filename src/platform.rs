use std::path::{Path, PathBuf};

use crate::config::{AppConfig, FOLDER_PLATFORM, PORTS_PLATFORM};
use crate::foundation::error::{SkinError, SkinResult};
use crate::paths::relative_to;

pub const PORTS_OUTPUT_FOLDER: &str = "Ports";

/// Maps rom or generated-artwork directories to platform keys.
#[derive(Clone, Debug)]
pub struct PlatformResolver {
    rom_folder: PathBuf,
    generated_artwork: PathBuf,
    config: AppConfig,
}

impl PlatformResolver {
    pub fn new(config: &AppConfig, generated_artwork: impl Into<PathBuf>) -> Self {
        Self {
            rom_folder: config.rom_folder.clone(),
            generated_artwork: generated_artwork.into(),
            config: config.clone(),
        }
    }

    /// Folder key of `path` relative to the rom folder or the generated-artwork base.
    ///
    /// Files resolve through their parent directory.
    pub fn folder_key(&self, path: &Path) -> String {
        let dir = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        let without_roms = if dir.starts_with(&self.rom_folder) {
            PathBuf::from(relative_to(dir, &self.rom_folder))
        } else {
            dir.to_path_buf()
        };
        if without_roms.starts_with(&self.generated_artwork) {
            relative_to(&without_roms, &self.generated_artwork)
        } else {
            without_roms.to_string_lossy().into_owned()
        }
    }

    pub fn platform_or_none(&self, path: &Path) -> Option<String> {
        let key = self.folder_key(path);
        if key.eq_ignore_ascii_case(FOLDER_PLATFORM) {
            return Some(FOLDER_PLATFORM.to_string());
        }
        match self.config.platform_for_folder(&key) {
            Some(platform) => Some(platform.to_string()),
            // portmaster artwork is generated under `Ports`
            None if key == PORTS_OUTPUT_FOLDER => Some(PORTS_PLATFORM.to_string()),
            None => None,
        }
    }

    pub fn platform(&self, path: &Path) -> SkinResult<String> {
        self.platform_or_none(path).ok_or_else(|| {
            SkinError::config(format!(
                "Cannot find platform for folder: {}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/platform.rs"]
mod tests;
