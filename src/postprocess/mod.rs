//! Post-process strategies: named image transforms over an already packaged working set.
//!
//! Every strategy follows the same protocol: read its options, resolve the [`WorkingSet`],
//! transform each image (in place or into a private [`Staging`] directory) and mirror the
//! staged files back over the package.

pub mod artwork_generation;
pub mod background;
pub mod counter;
pub mod dot_scrollbar;
pub mod fonts;
pub mod fuzzy;
pub mod inner_mask;
pub mod options;
pub mod ordering;
pub mod scrollbar;
pub mod sibling_offset;
pub mod staging;
pub mod text;
pub mod translation;
pub mod working_set;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::build::command::{
    GenerateFolderArtworkCommand, GenerateRomArtworkCommand, PostProcessCommand,
};
use crate::canvas::ImageCanvas;
use crate::config::{AppConfig, Threading};
use crate::filestore::FileStore;
use crate::foundation::core::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::foundation::error::{SkinError, SkinResult};
use crate::names::NamesProvider;
use crate::paths::PathLayout;
use crate::render::image::Image;

pub use fonts::{FontChoice, FontMetricCache};
pub use options::OptionReader;
pub use staging::Staging;
pub use working_set::{WorkingItem, WorkingSet, WorkingSetResolver};

/// A named image transform over a working set.
pub trait PostProcessStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, command: &PostProcessCommand) -> SkinResult<()>;
}

/// Re-runs artwork generation from inside a strategy (`artwork_generation`).
pub trait ArtworkGenerator: Send + Sync {
    fn generate_rom_artwork(&self, command: &GenerateRomArtworkCommand) -> SkinResult<()>;

    fn generate_folder_artwork(&self, command: &GenerateFolderArtworkCommand) -> SkinResult<()>;
}

/// Collaborators shared by every strategy.
pub struct StrategyContext {
    pub paths: PathLayout,
    pub config: AppConfig,
    pub names: Arc<NamesProvider>,
    pub canvas: Arc<dyn ImageCanvas>,
    pub files: Arc<dyn FileStore>,
    pub artwork: Option<Arc<dyn ArtworkGenerator>>,
    pub threading: Threading,
}

impl StrategyContext {
    pub fn new(
        paths: PathLayout,
        config: AppConfig,
        names: Arc<NamesProvider>,
        canvas: Arc<dyn ImageCanvas>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        let threading = config.threading.clone();
        Self {
            paths,
            config,
            names,
            canvas,
            files,
            artwork: None,
            threading,
        }
    }

    pub fn with_artwork(mut self, artwork: Arc<dyn ArtworkGenerator>) -> Self {
        self.artwork = Some(artwork);
        self
    }

    pub fn with_threading(mut self, threading: Threading) -> Self {
        self.threading = threading;
        self
    }

    pub fn working_set(&self, command: &PostProcessCommand) -> SkinResult<WorkingSet> {
        WorkingSetResolver::new(&self.config, &self.paths, self.files.as_ref()).resolve(
            &command.source,
            &command.package,
            command.files,
            command.folders,
        )
    }

    /// Working-set paths in display order (see [`ordering::sort_artwork`]).
    pub fn sorted(&self, set: &WorkingSet) -> Vec<PathBuf> {
        ordering::sort_artwork(set, &self.names)
    }

    /// A fresh 640x480 surface with the image at `path` on its top-left corner.
    pub fn base_canvas(&self, path: &Path) -> SkinResult<Image> {
        let original = self.canvas.read(path)?;
        let mut canvas = Image::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        canvas.place_at(&original, 0, 0, 1.0);
        Ok(canvas)
    }

    /// Run `work(index, item)` for every item, on the worker pool when enabled.
    ///
    /// Items are independent: each one writes only its own output path.
    pub fn for_each<T, F>(&self, items: &[T], work: F) -> SkinResult<()>
    where
        T: Sync,
        F: Fn(usize, &T) -> SkinResult<()> + Send + Sync,
    {
        if !self.threading.parallel || items.len() < 2 {
            for (i, item) in items.iter().enumerate() {
                work(i, item)?;
            }
            return Ok(());
        }
        let pool = self.threading.build_pool()?;
        let results = pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| work(i, item))
                .collect::<Vec<_>>()
        });
        results.into_iter().collect()
    }
}

/// Strategies by name.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<&'static str, Arc<dyn PostProcessStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy.
    pub fn with_builtin(ctx: Arc<StrategyContext>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(sibling_offset::SiblingOffsetStrategy::new(ctx.clone())));
        registry.register(Arc::new(counter::CounterStrategy::new(ctx.clone())));
        registry.register(Arc::new(text::TextStrategy::new(ctx.clone())));
        registry.register(Arc::new(translation::TranslationStrategy::new(ctx.clone())));
        registry.register(Arc::new(scrollbar::ScrollbarStrategy::new(ctx.clone())));
        registry.register(Arc::new(dot_scrollbar::DotScrollbarStrategy::new(ctx.clone())));
        registry.register(Arc::new(background::BackgroundStrategy::new(ctx.clone())));
        registry.register(Arc::new(inner_mask::InnerMaskStrategy::new(ctx.clone())));
        registry.register(Arc::new(
            artwork_generation::ArtworkGenerationStrategy::new(ctx),
        ));
        registry
    }

    /// Add `strategy`, replacing any previous one with the same name.
    pub fn register(&mut self, strategy: Arc<dyn PostProcessStrategy>) {
        self.strategies.insert(strategy.name(), strategy);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.keys().copied().collect()
    }

    pub fn get(&self, name: &str) -> SkinResult<Arc<dyn PostProcessStrategy>> {
        self.strategies.get(name).cloned().ok_or_else(|| {
            SkinError::config(format!("Cannot handle unknown strategy \"{name}\""))
        })
    }

    pub fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        self.get(&command.strategy)?.process(command)
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "../../tests/unit/postprocess/registry.rs"]
mod tests;
