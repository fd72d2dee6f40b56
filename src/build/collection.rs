use serde::{Deserialize, Serialize};

use crate::build::command::{
    Command, CompressPackageCommand, CopyBackPreviewCommand, CopyResourcesCommand,
    GenerateEmptyImageCommand, GenerateFolderArtworkCommand, GenerateRomArtworkCommand,
    OptimizeCommand, PackageCommand, PostProcessCommand, PreviewCommand, TransferCommand,
};
use crate::foundation::error::{SkinError, SkinResult};

/// Rom or folder artwork; both run in the same stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArtworkCommand {
    GenerateRomArtwork(GenerateRomArtworkCommand),
    GenerateFolderArtwork(GenerateFolderArtworkCommand),
}

impl From<ArtworkCommand> for Command {
    fn from(value: ArtworkCommand) -> Self {
        match value {
            ArtworkCommand::GenerateRomArtwork(c) => Command::GenerateRomArtwork(c),
            ArtworkCommand::GenerateFolderArtwork(c) => Command::GenerateFolderArtwork(c),
        }
    }
}

/// Everything one build runs.
///
/// Singleton stages are optional slots and repeatable stages are lists. The order in
/// which they execute is owned by [`crate::build::BuildOrchestrator`], not by this value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildCommandCollection {
    pub id: String,
    pub copy_resources: Option<CopyResourcesCommand>,
    pub package: Option<PackageCommand>,
    pub optimize: Option<OptimizeCommand>,
    pub compress_package: Option<CompressPackageCommand>,
    pub transfer: Option<TransferCommand>,
    pub copy_back_preview: Option<CopyBackPreviewCommand>,
    pub generate_artwork: Vec<ArtworkCommand>,
    pub generate_empty_image: Vec<GenerateEmptyImageCommand>,
    pub post_process: Vec<PostProcessCommand>,
    pub preview: Vec<PreviewCommand>,
}

impl BuildCommandCollection {
    /// Collection holding only the required package stage.
    pub fn with_package(package_name: impl Into<String>) -> Self {
        Self {
            package: Some(PackageCommand {
                package_name: package_name.into(),
            }),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SkinResult<()> {
        if self.package.is_none() {
            return Err(SkinError::config("package command is required"));
        }
        Ok(())
    }

    /// Load a build plan from YAML (JSON is accepted as a YAML subset).
    pub fn from_yaml(raw: &str) -> SkinResult<Self> {
        let collection: Self = serde_yaml::from_str(raw)
            .map_err(|e| SkinError::serde(format!("invalid build plan: {e}")))?;
        collection.validate()?;
        Ok(collection)
    }

    pub fn add_post_process(&mut self, commands: impl IntoIterator<Item = PostProcessCommand>) {
        self.post_process.extend(commands);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/collection.rs"]
mod tests;
