use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{SkinError, SkinResult};

/// Platform key used for rom folders named `folder`.
pub const FOLDER_PLATFORM: &str = "folder";
/// Pseudo platform for PortMaster ports.
pub const PORTS_PLATFORM: &str = "ports";
/// Package folder for folder artwork.
pub const FOLDER_PACKAGE_FOLDER: &str = "Folder";
/// Package folder for PortMaster artwork.
pub const PORTS_PACKAGE_FOLDER: &str = "External - Ports";

/// `user_config/config.yml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rom_folder: PathBuf,
    pub romset_name: String,
    pub screenscraper_user: String,
    pub screenscraper_pass: String,
    pub skyscraper_config_folder_path: PathBuf,
    pub skyscraper_cache_folder_path: Option<PathBuf>,
    #[serde(default = "default_scrape_threads")]
    pub scrape_threads: u32,
    /// Rom sub-folder (relative to `rom_folder`) to platform.
    pub folders: BTreeMap<String, String>,
    /// Platform to package folder name.
    pub package: BTreeMap<String, String>,
    /// Rom sub-folder to the single rom used for its folder artwork.
    pub folder_roms: BTreeMap<String, String>,
    /// Platform to rom extension globs (`*.zip`).
    pub rom_extensions: BTreeMap<String, Vec<String>>,
    pub portmaster_alternates: BTreeMap<String, PortmasterAlternate>,
    pub optimize: OptimizeConfig,
    pub preview: PreviewConfig,
    #[serde(rename = "sftp", alias = "sftp?")]
    pub sftp: Option<SftpConfig>,
    pub threading: Threading,
}

fn default_scrape_threads() -> u32 {
    1
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortmasterAlternate {
    pub platform: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    pub enabled: bool,
    pub convert_to_jpg: bool,
    pub jpg_quality: u32,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            convert_to_jpg: false,
            jpg_quality: 90,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub grid_size: u32,
    pub animation_frames: u32,
    pub animation_format: String,
    pub copy_back: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            kind: "static".to_string(),
            grid_size: 4,
            animation_frames: 20,
            animation_format: "gif".to_string(),
            copy_back: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SftpConfig {
    pub ip: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub port: Option<String>,
}

impl SftpConfig {
    /// `(ip, user, pass, port)` when every field is set and non-empty.
    pub fn complete(&self) -> Option<(&str, &str, &str, &str)> {
        fn field(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        Some((
            field(&self.ip)?,
            field(&self.user)?,
            field(&self.pass)?,
            field(&self.port)?,
        ))
    }
}

/// Worker controls for per-image post-process transforms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Threading {
    /// Run per-image transforms on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker count.
    pub threads: Option<usize>,
}

impl Threading {
    pub(crate) fn build_pool(&self) -> SkinResult<rayon::ThreadPool> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.threads {
            builder = builder.num_threads(n);
        }
        builder
            .build()
            .map_err(|e| SkinError::config(format!("failed to build rayon thread pool: {e}")))
    }
}

impl AppConfig {
    /// Read and validate `config.yml`.
    pub fn load(path: &Path) -> SkinResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config \"{}\"", path.display()))?;
        let cfg = Self::from_yaml(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> SkinResult<Self> {
        serde_yaml::from_str(raw).map_err(|e| SkinError::serde(format!("config.yml: {e}")))
    }

    pub fn validate(&self) -> SkinResult<()> {
        if self.romset_name.trim().is_empty() {
            return Err(SkinError::config("romset_name must be set"));
        }
        if self.optimize.jpg_quality > 100 {
            return Err(SkinError::config(format!(
                "optimize.jpg_quality must be within 0..=100, got {}",
                self.optimize.jpg_quality
            )));
        }
        if self.threading.threads == Some(0) {
            return Err(SkinError::config("threading.threads must be >= 1 when set"));
        }
        if !matches!(self.preview.kind.as_str(), "static" | "animated" | "both") {
            return Err(SkinError::config(format!(
                "preview.type must be static, animated or both, got \"{}\"",
                self.preview.kind
            )));
        }
        if !matches!(self.preview.animation_format.as_str(), "gif" | "webp") {
            return Err(SkinError::config(format!(
                "preview.animation_format must be gif or webp, got \"{}\"",
                self.preview.animation_format
            )));
        }
        Ok(())
    }

    /// `user:pass` for the scraper's `-u` flag.
    pub fn screenscraper_credentials(&self) -> String {
        format!("{}:{}", self.screenscraper_user, self.screenscraper_pass)
    }

    pub fn package_folder_for_platform(&self, platform: &str) -> SkinResult<String> {
        if platform.eq_ignore_ascii_case(FOLDER_PLATFORM) {
            return Ok(FOLDER_PACKAGE_FOLDER.to_string());
        }
        if platform.eq_ignore_ascii_case(PORTS_PLATFORM) {
            return Ok(PORTS_PACKAGE_FOLDER.to_string());
        }
        self.package.get(platform).cloned().ok_or_else(|| {
            SkinError::config(format!(
                "Platform \"{platform}\" does not exist in the package mapping."
            ))
        })
    }

    pub fn platform_for_folder(&self, folder: &str) -> Option<&str> {
        self.folders.get(folder).map(String::as_str)
    }

    pub fn single_rom_for_folder(&self, folder: &str) -> Option<&str> {
        self.folder_roms.get(folder).map(String::as_str)
    }

    pub fn portmaster_alternate_platform(&self, name: &str) -> Option<&str> {
        self.portmaster_alternates
            .get(name)
            .map(|a| a.platform.as_str())
    }
}

/// Extensions used when a platform has no configured list.
pub const DEFAULT_ROM_EXTENSIONS: &[&str] = &[
    "*.zip", "*.7z", "*.tar", "*.tar.gz", "*.chd", "*.iso", "*.cue", "*.bin", "*.nes", "*.sfc",
    "*.smc", "*.gb", "*.gbc", "*.gba", "*.md", "*.gen", "*.sms", "*.gg", "*.pce", "*.n64",
    "*.z64", "*.nds", "*.pbp", "*.a26", "*.lnx", "*.ngp", "*.ngc", "*.ws", "*.wsc",
];

/// Rom extension globs per platform.
#[derive(Clone, Debug)]
pub struct RomExtensions {
    configured: BTreeMap<String, Vec<String>>,
}

impl RomExtensions {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            configured: config.rom_extensions.clone(),
        }
    }

    pub fn for_platform(&self, platform: &str) -> Vec<String> {
        if platform == PORTS_PLATFORM {
            return vec!["*.sh".into(), "*.7z".into(), "*.zip".into()];
        }
        match self.configured.get(platform) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => DEFAULT_ROM_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True when `file_name` matches one of the platform's globs.
    pub fn matches(&self, platform: &str, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.for_platform(platform).iter().any(|glob| {
            let glob = glob.to_ascii_lowercase();
            match glob.strip_prefix('*') {
                Some(suffix) => lower.ends_with(suffix),
                None => lower == glob,
            }
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
