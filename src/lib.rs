//! Skinsmith builds themed artwork packages for emulation handhelds.
//!
//! A build is described by a [`BuildCommandCollection`] and run by the [`BuildOrchestrator`]
//! through a set of [`StageHandlers`]. The default handlers ([`Pipeline`]) drive the external
//! scraper, lay out the device package and apply named post-process strategies from a
//! [`StrategyRegistry`].
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod build;
pub mod canvas;
pub mod config;
pub mod factory;
pub mod filestore;
pub mod names;
pub mod paths;
pub mod platform;
pub mod postprocess;
pub mod process;
pub mod render;
pub mod scraper;
pub mod stages;

pub use crate::foundation::core::{
    Anchor, CANVAS_HEIGHT, CANVAS_WIDTH, Color, HAlign, Point, Rect, VAlign, Vec2,
};
pub use crate::foundation::error::{SkinError, SkinResult};
pub use crate::foundation::math;

pub use crate::build::{
    BuildCommandCollection, BuildOrchestrator, BuildReport, Command, StageEvent, StageHandlers,
    StageListener, TracingStageListener,
};
pub use crate::canvas::{CpuCanvas, ImageCanvas};
pub use crate::config::AppConfig;
pub use crate::factory::CommandFactory;
pub use crate::filestore::{FileStore, LocalFileStore};
pub use crate::paths::PathLayout;
pub use crate::postprocess::{PostProcessStrategy, StrategyRegistry};
pub use crate::render::image::Image;
pub use crate::stages::{Pipeline, StageEnv};
