//! Build commands, the command collection, stage events and the orchestrator.

pub mod collection;
pub mod command;
pub mod event;
pub mod orchestrator;

pub use collection::{ArtworkCommand, BuildCommandCollection};
pub use command::{
    Command, CompressPackageCommand, CopyBackPreviewCommand, CopyResourcesCommand,
    GenerateEmptyImageCommand, GenerateFolderArtworkCommand, GenerateRomArtworkCommand,
    OptimizeCommand, PackageCommand, PostProcessCommand, PreviewCommand, PreviewType,
    PrimeCacheCommand, TransferCommand,
};
pub use event::{RecordingStageListener, StageEvent, StageListener, TracingStageListener};
pub use orchestrator::{BuildOrchestrator, BuildReport, StageHandlers, dispatch};
