//! Background and overlay layers from the post-process resources folder.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::foundation::core::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::foundation::error::{SkinError, SkinResult};
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "background";

const KEYS: &[&str] = &[
    "overlay",
    "background",
    "background_default",
    "use_background_default",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundOptions {
    pub overlay: Option<String>,
    pub background: Option<String>,
    pub background_default: Option<String>,
    pub use_background_default: bool,
}

impl BackgroundOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        let options = Self {
            overlay: r.opt_string("overlay")?,
            background: r.opt_string("background")?,
            background_default: r.opt_string("background_default")?,
            use_background_default: r.bool("use_background_default", false)?,
        };
        if options.overlay.is_none()
            && options.background.is_none()
            && options.background_default.is_none()
        {
            return Err(SkinError::config(
                "strategy \"background\": background, background_default and/or overlay are required",
            ));
        }
        Ok(options)
    }

    /// Layer file names below the artwork, bottom first.
    pub fn underlays(&self) -> Vec<&str> {
        let default = self
            .background_default
            .as_deref()
            .filter(|_| self.use_background_default);
        default.into_iter().chain(self.background.as_deref()).collect()
    }
}

pub struct BackgroundStrategy {
    ctx: Arc<StrategyContext>,
}

impl BackgroundStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }

    fn layer(&self, file: &str) -> SkinResult<Image> {
        let path: PathBuf = self.ctx.paths.post_process_resources().join(file);
        if !self.ctx.files.exists(&path) {
            return Err(SkinError::config(format!(
                "Background image \"{}\" does not exist",
                path.display()
            )));
        }
        self.ctx.canvas.read(&path)
    }
}

impl PostProcessStrategy for BackgroundStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = BackgroundOptions::from_map(&command.options)?;
        let underlays = options
            .underlays()
            .into_iter()
            .map(|f| self.layer(f))
            .collect::<SkinResult<Vec<_>>>()?;
        let overlay = options.overlay.as_deref().map(|f| self.layer(f)).transpose()?;

        let staging = Staging::in_place();
        let set = self.ctx.working_set(command)?;
        let items: Vec<_> = set.iter().collect();
        self.ctx.for_each(&items, |_, item| {
            let mut canvas = Image::new(CANVAS_WIDTH, CANVAS_HEIGHT);
            for layer in &underlays {
                canvas.place_at(layer, 0, 0, 1.0);
            }
            let original = self.ctx.canvas.read(&item.path)?;
            canvas.place_at(&original, 0, 0, 1.0);
            if let Some(overlay) = &overlay {
                canvas.place_at(overlay, 0, 0, 1.0);
            }
            self.ctx.canvas.save(&canvas, &staging.save_path(&item.path))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/background.rs"]
mod tests;
