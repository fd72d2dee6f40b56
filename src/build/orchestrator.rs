use std::sync::Arc;

use crate::build::collection::BuildCommandCollection;
use crate::build::command::{
    Command, CompressPackageCommand, CopyBackPreviewCommand, CopyResourcesCommand,
    GenerateEmptyImageCommand, GenerateFolderArtworkCommand, GenerateRomArtworkCommand,
    OptimizeCommand, PackageCommand, PostProcessCommand, PreviewCommand, PrimeCacheCommand,
    TransferCommand,
};
use crate::build::event::{StageEvent, StageListener};
use crate::filestore::FileStore;
use crate::foundation::error::{SkinError, SkinResult};
use crate::paths::PathLayout;

pub const STAGE_COPY_RESOURCES: &str = "copy-resources";
pub const STAGE_GENERATE_ARTWORK: &str = "generate-rom-and-folder-artwork";
pub const STAGE_GENERATE_EMPTY_IMAGES: &str = "generate-empty-images";
pub const STAGE_PACKAGE: &str = "package";
pub const STAGE_POST_PROCESS: &str = "post-process";
pub const STAGE_PREVIEW: &str = "preview";
pub const STAGE_OPTIMIZE: &str = "optimize";
pub const STAGE_COMPRESS_PACKAGE: &str = "compress-package";
pub const STAGE_TRANSFER: &str = "transfer";
pub const STAGE_COPY_BACK_PREVIEW: &str = "copy-back-preview";

/// One handler per command variant.
pub trait StageHandlers: Send + Sync {
    fn copy_resources(&self, cmd: &CopyResourcesCommand) -> SkinResult<()>;
    fn generate_rom_artwork(&self, cmd: &GenerateRomArtworkCommand) -> SkinResult<()>;
    fn generate_folder_artwork(&self, cmd: &GenerateFolderArtworkCommand) -> SkinResult<()>;
    fn generate_empty_image(&self, cmd: &GenerateEmptyImageCommand) -> SkinResult<()>;
    fn post_process(&self, cmd: &PostProcessCommand) -> SkinResult<()>;
    fn preview(&self, cmd: &PreviewCommand) -> SkinResult<()>;
    fn package(&self, cmd: &PackageCommand) -> SkinResult<()>;
    fn optimize(&self, cmd: &OptimizeCommand) -> SkinResult<()>;
    fn compress_package(&self, cmd: &CompressPackageCommand) -> SkinResult<()>;
    fn transfer(&self, cmd: &TransferCommand) -> SkinResult<()>;
    fn copy_back_preview(&self, cmd: &CopyBackPreviewCommand) -> SkinResult<()>;
    fn prime_cache(&self, cmd: &PrimeCacheCommand) -> SkinResult<()>;
}

/// Route a command to its handler.
pub fn dispatch(handlers: &dyn StageHandlers, command: &Command) -> SkinResult<()> {
    match command {
        Command::CopyResources(c) => handlers.copy_resources(c),
        Command::GenerateRomArtwork(c) => handlers.generate_rom_artwork(c),
        Command::GenerateFolderArtwork(c) => handlers.generate_folder_artwork(c),
        Command::GenerateEmptyImage(c) => handlers.generate_empty_image(c),
        Command::PostProcess(c) => handlers.post_process(c),
        Command::Preview(c) => handlers.preview(c),
        Command::Package(c) => handlers.package(c),
        Command::Optimize(c) => handlers.optimize(c),
        Command::CompressPackage(c) => handlers.compress_package(c),
        Command::Transfer(c) => handlers.transfer(c),
        Command::CopyBackPreview(c) => handlers.copy_back_preview(c),
        Command::PrimeCache(c) => handlers.prime_cache(c),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FailurePolicy {
    /// Emit `Failed` and abort the build.
    Critical,
    /// Emit `Failed`, log, and move on to the next stage.
    BestEffort,
}

/// Outcome of a build that was not aborted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub completed_stages: Vec<String>,
    /// Best-effort stages that failed without stopping the build.
    pub failed_stages: Vec<String>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed_stages.is_empty()
    }
}

/// Runs a [`BuildCommandCollection`] stage by stage in a fixed order.
pub struct BuildOrchestrator {
    handlers: Arc<dyn StageHandlers>,
    listener: Arc<dyn StageListener>,
    files: Arc<dyn FileStore>,
    paths: PathLayout,
}

impl BuildOrchestrator {
    pub fn new(
        handlers: Arc<dyn StageHandlers>,
        listener: Arc<dyn StageListener>,
        files: Arc<dyn FileStore>,
        paths: PathLayout,
    ) -> Self {
        Self {
            handlers,
            listener,
            files,
            paths,
        }
    }

    pub fn dispatch(&self, command: &Command) -> SkinResult<()> {
        dispatch(self.handlers.as_ref(), command)
    }

    /// Wipe leftovers of a previous run and execute every stage in order.
    ///
    /// copy-resources, artwork generation, empty images, package and post-process are
    /// critical: the first failure emits `Failed` and aborts. Preview, optimize,
    /// compress-package, transfer and copy-back-preview are best-effort.
    #[tracing::instrument(skip_all, fields(build = %collection.id))]
    pub fn execute_build(&self, collection: &BuildCommandCollection) -> SkinResult<BuildReport> {
        collection.validate()?;
        self.reset_workspace()?;

        let mut report = BuildReport::default();

        if let Some(cmd) = &collection.copy_resources {
            self.run_single(
                &mut report,
                STAGE_COPY_RESOURCES,
                Command::CopyResources(cmd.clone()),
                FailurePolicy::Critical,
            )?;
        }

        let artwork: Vec<Command> = collection
            .generate_artwork
            .iter()
            .cloned()
            .map(Command::from)
            .collect();
        self.run_repeated(&mut report, STAGE_GENERATE_ARTWORK, &artwork, FailurePolicy::Critical)?;

        let empty: Vec<Command> = collection
            .generate_empty_image
            .iter()
            .cloned()
            .map(Command::GenerateEmptyImage)
            .collect();
        self.run_repeated(
            &mut report,
            STAGE_GENERATE_EMPTY_IMAGES,
            &empty,
            FailurePolicy::Critical,
        )?;

        let package = collection
            .package
            .clone()
            .ok_or_else(|| SkinError::config("package command is required"))?;
        self.run_single(
            &mut report,
            STAGE_PACKAGE,
            Command::Package(package),
            FailurePolicy::Critical,
        )?;

        let post: Vec<Command> = collection
            .post_process
            .iter()
            .cloned()
            .map(Command::PostProcess)
            .collect();
        self.run_repeated(&mut report, STAGE_POST_PROCESS, &post, FailurePolicy::Critical)?;

        let previews: Vec<Command> = collection
            .preview
            .iter()
            .cloned()
            .map(Command::Preview)
            .collect();
        self.run_repeated(&mut report, STAGE_PREVIEW, &previews, FailurePolicy::BestEffort)?;

        let tail = [
            (STAGE_OPTIMIZE, collection.optimize.clone().map(Command::Optimize)),
            (
                STAGE_COMPRESS_PACKAGE,
                collection
                    .compress_package
                    .clone()
                    .map(Command::CompressPackage),
            ),
            (STAGE_TRANSFER, collection.transfer.clone().map(Command::Transfer)),
            (
                STAGE_COPY_BACK_PREVIEW,
                collection
                    .copy_back_preview
                    .clone()
                    .map(Command::CopyBackPreview),
            ),
        ];
        for (name, cmd) in tail {
            if let Some(cmd) = cmd {
                self.run_single(&mut report, name, cmd, FailurePolicy::BestEffort)?;
            }
        }

        Ok(report)
    }

    fn reset_workspace(&self) -> SkinResult<()> {
        self.files.remove(&self.paths.output())?;
        self.files.remove(&self.paths.artwork_tmp())?;
        self.files.remove(&self.paths.output_post_process())?;
        self.files.dump(&self.paths.skipped_report(), b"[]")
    }

    fn emit(&self, event: StageEvent) {
        self.listener.on_event(&event);
    }

    fn run_single(
        &self,
        report: &mut BuildReport,
        name: &str,
        command: Command,
        policy: FailurePolicy,
    ) -> SkinResult<()> {
        self.emit(StageEvent::started(name));
        let result = self.dispatch(&command);
        self.finish(report, name, result, policy)
    }

    fn run_repeated(
        &self,
        report: &mut BuildReport,
        name: &str,
        commands: &[Command],
        policy: FailurePolicy,
    ) -> SkinResult<()> {
        if commands.is_empty() {
            return Ok(());
        }
        self.emit(StageEvent::started_with_progress(name, commands.len()));
        let result = commands.iter().try_for_each(|cmd| {
            self.emit(StageEvent::progressed(name, cmd.target()));
            self.dispatch(cmd)
        });
        self.finish(report, name, result, policy)
    }

    fn finish(
        &self,
        report: &mut BuildReport,
        name: &str,
        result: SkinResult<()>,
        policy: FailurePolicy,
    ) -> SkinResult<()> {
        match result {
            Ok(()) => {
                self.emit(StageEvent::completed(name));
                report.completed_stages.push(name.to_string());
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.emit(StageEvent::failed(name, message.clone()));
                match policy {
                    FailurePolicy::Critical => Err(SkinError::stage(name, message)),
                    FailurePolicy::BestEffort => {
                        tracing::error!(stage = name, error = %message, "best-effort stage failed, continuing");
                        report.failed_stages.push(name.to_string());
                        Ok(())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/orchestrator.rs"]
mod tests;
