//! The default [`StageHandlers`]: scraper invocations, packaging, previews and transfer.

pub mod artwork;
pub mod package;
pub mod preview;
pub mod resources;
pub mod transfer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::build::command::{
    CompressPackageCommand, CopyBackPreviewCommand, CopyResourcesCommand,
    GenerateEmptyImageCommand, GenerateFolderArtworkCommand, GenerateRomArtworkCommand,
    OptimizeCommand, PackageCommand, PostProcessCommand, PreviewCommand, PrimeCacheCommand,
    TransferCommand,
};
use crate::build::orchestrator::StageHandlers;
use crate::canvas::{CpuCanvas, ImageCanvas};
use crate::config::AppConfig;
use crate::filestore::{FileStore, LocalFileStore};
use crate::foundation::error::SkinResult;
use crate::names::NamesProvider;
use crate::paths::PathLayout;
use crate::postprocess::{ArtworkGenerator, StrategyContext, StrategyRegistry};
use crate::process::{Subprocess, SubprocessOutput, SubprocessRequest, SystemSubprocess};

pub use artwork::ArtworkStage;

/// Collaborators every stage handler reads from.
#[derive(Clone)]
pub struct StageEnv {
    pub config: AppConfig,
    pub paths: PathLayout,
    pub files: Arc<dyn FileStore>,
    pub canvas: Arc<dyn ImageCanvas>,
    pub subprocess: Arc<dyn Subprocess>,
    pub names: Arc<NamesProvider>,
}

impl StageEnv {
    /// Local disk, CPU canvas and real subprocesses under `base`.
    pub fn local(config: AppConfig, base: impl Into<PathBuf>) -> Self {
        let paths = PathLayout::new(base, config.romset_name.clone());
        let names = NamesProvider::new(
            paths.resources_dir().join("name.json"),
            paths.user_config_dir().join("name_extra.json"),
        );
        Self {
            config,
            paths,
            files: Arc::new(LocalFileStore),
            canvas: Arc::new(CpuCanvas::new()),
            subprocess: Arc::new(SystemSubprocess),
            names: Arc::new(names),
        }
    }

    /// Today's log file for `namespace`.
    pub fn log_path(&self, namespace: &str) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        self.paths.log_path(namespace, &date)
    }

    /// Run `request`, logging whatever the tool printed.
    pub(crate) fn run(&self, request: &SubprocessRequest) -> SkinResult<SubprocessOutput> {
        tracing::debug!(argv = %request.argv.join(" "), "running external tool");
        let output = self.subprocess.run(request)?;
        if !output.stdout.is_empty() {
            tracing::debug!(program = request.program(), "{}", output.stdout.trim_end());
        }
        if !output.success && !output.stderr.is_empty() {
            tracing::error!(program = request.program(), "{}", output.stderr.trim_end());
        }
        Ok(output)
    }

    /// Remove `path` when it exists.
    pub(crate) fn wipe(&self, path: &Path) -> SkinResult<()> {
        if self.files.exists(path) {
            self.files.remove(path)?;
        }
        Ok(())
    }
}

/// Every stage of a build, wired to one [`StageEnv`].
pub struct Pipeline {
    env: StageEnv,
    artwork: Arc<ArtworkStage>,
    registry: StrategyRegistry,
}

impl Pipeline {
    pub fn new(env: StageEnv) -> Self {
        let artwork = Arc::new(ArtworkStage::new(env.clone()));
        let ctx = StrategyContext::new(
            env.paths.clone(),
            env.config.clone(),
            env.names.clone(),
            env.canvas.clone(),
            env.files.clone(),
        )
        .with_artwork(artwork.clone());
        let registry = StrategyRegistry::with_builtin(Arc::new(ctx));
        Self {
            env,
            artwork,
            registry,
        }
    }

    /// Swap the strategy registry, e.g. to add strategies of your own.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn env(&self) -> &StageEnv {
        &self.env
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }
}

impl StageHandlers for Pipeline {
    fn copy_resources(&self, cmd: &CopyResourcesCommand) -> SkinResult<()> {
        resources::copy_resources(&self.env, cmd)
    }

    fn generate_rom_artwork(&self, cmd: &GenerateRomArtworkCommand) -> SkinResult<()> {
        self.artwork.generate_rom_artwork(cmd)
    }

    fn generate_folder_artwork(&self, cmd: &GenerateFolderArtworkCommand) -> SkinResult<()> {
        self.artwork.generate_folder_artwork(cmd)
    }

    fn generate_empty_image(&self, cmd: &GenerateEmptyImageCommand) -> SkinResult<()> {
        self.artwork.generate_empty_image(cmd)
    }

    fn post_process(&self, cmd: &PostProcessCommand) -> SkinResult<()> {
        self.registry.process(cmd)
    }

    fn preview(&self, cmd: &PreviewCommand) -> SkinResult<()> {
        preview::preview(&self.env, cmd)
    }

    fn package(&self, cmd: &PackageCommand) -> SkinResult<()> {
        package::package(&self.env, cmd)
    }

    fn optimize(&self, cmd: &OptimizeCommand) -> SkinResult<()> {
        package::optimize(&self.env, cmd)
    }

    fn compress_package(&self, cmd: &CompressPackageCommand) -> SkinResult<()> {
        package::compress_package(&self.env, cmd)
    }

    fn transfer(&self, cmd: &TransferCommand) -> SkinResult<()> {
        transfer::transfer(&self.env, cmd)
    }

    fn copy_back_preview(&self, cmd: &CopyBackPreviewCommand) -> SkinResult<()> {
        preview::copy_back_preview(&self.env, cmd)
    }

    fn prime_cache(&self, cmd: &PrimeCacheCommand) -> SkinResult<()> {
        self.artwork.prime_cache(cmd)
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "../../tests/unit/stages/pipeline.rs"]
mod tests;
