//! Re-runs artwork generation for the source folder and layers each generated cover
//! with the packaged image.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::collection::ArtworkCommand;
use crate::build::command::PostProcessCommand;
use crate::factory::{ArtworkSource, CommandFactory};
use crate::foundation::core::{Anchor, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::foundation::error::{SkinError, SkinResult};
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{ArtworkGenerator, PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "artwork_generation";

const KEYS: &[&str] = &[
    "artwork_package",
    "artwork_file",
    "folder_package",
    "folder_file",
    "token",
    "layer",
    "offset_generated_x",
    "offset_generated_y",
    "offset_original_x",
    "offset_original_y",
];

const COVERS_DIR: &str = "covers";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Top,
    Bottom,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtworkGenerationOptions {
    pub rom_artwork: Option<ArtworkSource>,
    pub folder_artwork: Option<ArtworkSource>,
    pub tokens: std::collections::BTreeMap<String, String>,
    pub layer: Layer,
    pub offset_generated: (i32, i32),
    pub offset_original: (i32, i32),
}

impl ArtworkGenerationOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        let source = |package: &str, file: &str| -> SkinResult<Option<ArtworkSource>> {
            Ok(match (r.opt_string(package)?, r.opt_string(file)?) {
                (Some(p), Some(f)) => Some(ArtworkSource::new(p, f)),
                _ => None,
            })
        };
        let offset = |key: &str| -> SkinResult<i32> { Ok(r.int(key, 0, -10_000..=10_000)? as i32) };
        Ok(Self {
            rom_artwork: source("artwork_package", "artwork_file")?,
            folder_artwork: source("folder_package", "folder_file")?,
            tokens: r.string_map("token")?,
            layer: match r.enumeration("layer", "top", &["top", "bottom"])? {
                "bottom" => Layer::Bottom,
                _ => Layer::Top,
            },
            offset_generated: (offset("offset_generated_x")?, offset("offset_generated_y")?),
            offset_original: (offset("offset_original_x")?, offset("offset_original_y")?),
        })
    }
}

/// Generated covers named `file_name`, below a `covers` directory.
pub fn find_generated(generated: &[PathBuf], file_name: &str) -> Vec<PathBuf> {
    generated
        .iter()
        .filter(|p| p.file_name().is_some_and(|n| n == file_name))
        .filter(|p| {
            p.parent()
                .into_iter()
                .flat_map(Path::components)
                .any(|c| c.as_os_str() == COVERS_DIR)
        })
        .cloned()
        .collect()
}

pub struct ArtworkGenerationStrategy {
    ctx: Arc<StrategyContext>,
}

impl ArtworkGenerationStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }

    fn generate(&self, generator: &dyn ArtworkGenerator, commands: &[ArtworkCommand]) -> SkinResult<()> {
        for dir in [self.ctx.paths.output(), self.ctx.paths.artwork_tmp()] {
            if self.ctx.files.exists(&dir) {
                self.ctx.files.remove(&dir)?;
            }
        }
        for command in commands {
            match command {
                ArtworkCommand::GenerateRomArtwork(c) => generator.generate_rom_artwork(c)?,
                ArtworkCommand::GenerateFolderArtwork(c) => generator.generate_folder_artwork(c)?,
            }
        }
        Ok(())
    }
}

impl PostProcessStrategy for ArtworkGenerationStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = ArtworkGenerationOptions::from_map(&command.options)?;
        let generator = self.ctx.artwork.clone().ok_or_else(|| {
            SkinError::config("strategy \"artwork_generation\" needs an artwork generator")
        })?;
        let set = self.ctx.working_set(command)?;

        let factory = CommandFactory::new(
            self.ctx.config.clone(),
            self.ctx.paths.clone(),
            self.ctx.files.clone(),
        );
        let commands = factory.artwork_commands_for_folder(
            &command.source,
            options.rom_artwork.as_ref(),
            options.folder_artwork.as_ref(),
            &options.tokens,
            false,
        )?;
        tracing::info!(commands = commands.len(), items = set.len(), "regenerating artwork");
        self.generate(generator.as_ref(), &commands)?;

        let generated = self
            .ctx
            .files
            .list_files(&self.ctx.paths.generated_artwork(), usize::MAX)?;
        let staging = Staging::in_place();
        let items: Vec<_> = set.iter().collect();
        self.ctx.for_each(&items, |_, item| {
            let matches = find_generated(&generated, &item.file_name);
            if matches.len() != 1 {
                tracing::warn!(
                    item = %item.file_name,
                    found = matches.len(),
                    "expected exactly one generated cover"
                );
            }
            let Some(cover) = matches.first() else {
                return Ok(());
            };

            let cover = self.ctx.canvas.read(cover)?;
            let original = self.ctx.canvas.read(&item.path)?;
            let mut canvas = Image::new(CANVAS_WIDTH, CANVAS_HEIGHT);
            if options.layer == Layer::Bottom {
                canvas.place(&cover, Anchor::Center, options.offset_generated, 100.0);
            }
            canvas.place(&original, Anchor::Center, options.offset_original, 100.0);
            if options.layer == Layer::Top {
                canvas.place(&cover, Anchor::Center, options.offset_generated, 100.0);
            }
            self.ctx.canvas.save(&canvas, &staging.save_path(&item.path))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/artwork_generation.rs"]
mod tests;
