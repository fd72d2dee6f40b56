use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn base_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.to_string_lossy().into_owned())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyResourcesCommand {
    /// Artwork packages whose resources are copied.
    pub artwork_folders: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRomArtworkCommand {
    pub artwork_package: String,
    /// Artwork xml file name under `template/<package>/artwork`.
    pub artwork: String,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    pub rom_absolute_path: PathBuf,
    #[serde(default)]
    pub generate_descriptions: bool,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub force_portmaster: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateFolderArtworkCommand {
    pub artwork_package: String,
    pub artwork: String,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    pub folder_absolute_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateEmptyImageCommand {
    pub absolute_path: PathBuf,
    #[serde(default)]
    pub platform: Option<String>,
}

impl GenerateEmptyImageCommand {
    /// A path without an extension names a folder.
    pub fn is_dir(&self) -> bool {
        self.absolute_path
            .extension()
            .is_none_or(|e| e.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostProcessCommand {
    pub source: PathBuf,
    pub package: String,
    pub strategy: String,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub files: bool,
    #[serde(default)]
    pub folders: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewType {
    Animated,
    Static,
    Both,
}

impl PreviewType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "animated" => Some(Self::Animated),
            "static" => Some(Self::Static),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn wants_static(self) -> bool {
        matches!(self, Self::Static | Self::Both)
    }

    pub fn wants_animated(self) -> bool {
        matches!(self, Self::Animated | Self::Both)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewCommand {
    /// Package whose box art is previewed.
    pub target: String,
    pub preview_name: String,
    pub preview_type: PreviewType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCommand {
    pub package_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeCommand {
    pub package_name: String,
    #[serde(default)]
    pub convert_to_jpg: bool,
    #[serde(default = "default_jpg_quality")]
    pub jpg_quality: u8,
}

fn default_jpg_quality() -> u8 {
    90
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressPackageCommand {
    pub package_name: String,
    /// Cleanup namespaces (`artwork`, `folder`, `portmaster`) to wipe on device before unpacking.
    #[serde(default)]
    pub nuke_options: BTreeMap<String, bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCommand {
    pub package_name: String,
    #[serde(default = "default_true")]
    pub zipped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyBackPreviewCommand {
    pub package_name: String,
    pub artwork_package: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeCacheCommand {
    pub folder_absolute_path: PathBuf,
    #[serde(default)]
    pub only_missing: bool,
}

/// One immutable unit of build work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    CopyResources(CopyResourcesCommand),
    GenerateRomArtwork(GenerateRomArtworkCommand),
    GenerateFolderArtwork(GenerateFolderArtworkCommand),
    GenerateEmptyImage(GenerateEmptyImageCommand),
    PostProcess(PostProcessCommand),
    Preview(PreviewCommand),
    Package(PackageCommand),
    Optimize(OptimizeCommand),
    CompressPackage(CompressPackageCommand),
    Transfer(TransferCommand),
    CopyBackPreview(CopyBackPreviewCommand),
    PrimeCache(PrimeCacheCommand),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CopyResources(_) => "copy-resources",
            Self::GenerateRomArtwork(_) => "generate-rom-artwork",
            Self::GenerateFolderArtwork(_) => "generate-folder-artwork",
            Self::GenerateEmptyImage(_) => "generate-empty-image",
            Self::PostProcess(_) => "post-process",
            Self::Preview(_) => "preview",
            Self::Package(_) => "package",
            Self::Optimize(_) => "optimize",
            Self::CompressPackage(_) => "compress-package",
            Self::Transfer(_) => "transfer",
            Self::CopyBackPreview(_) => "copy-back-preview",
            Self::PrimeCache(_) => "prime-cache",
        }
    }

    /// Label carried by progress events.
    pub fn target(&self) -> String {
        match self {
            Self::GenerateRomArtwork(c) => base_name(&c.rom_absolute_path),
            Self::GenerateFolderArtwork(c) => base_name(&c.folder_absolute_path),
            Self::GenerateEmptyImage(c) => base_name(&c.absolute_path),
            Self::PostProcess(c) => format!("{}: `{}`", c.strategy, c.source.display()),
            Self::Preview(_) => "animated".to_string(),
            Self::CopyResources(c) => c.artwork_folders.join(", "),
            Self::Package(c) => c.package_name.clone(),
            Self::Optimize(c) => c.package_name.clone(),
            Self::CompressPackage(c) => c.package_name.clone(),
            Self::Transfer(c) => c.package_name.clone(),
            Self::CopyBackPreview(c) => c.package_name.clone(),
            Self::PrimeCache(c) => c.folder_absolute_path.display().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/command.rs"]
mod tests;
