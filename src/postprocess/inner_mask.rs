//! Clears the top and bottom bands of the artwork, keeping the inner 640x396 window.

use std::sync::Arc;

use crate::build::command::PostProcessCommand;
use crate::foundation::core::{Anchor, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::foundation::error::SkinResult;
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "inner_mask";

const INNER_HEIGHT: u32 = 396;
const INNER_TOP: i32 = 42;

/// `img` reduced to its inner window, re-centred on a full-size canvas.
pub fn inner_window(img: &Image) -> Image {
    let inner = img.crop(CANVAS_WIDTH, INNER_HEIGHT, 0, INNER_TOP);
    let mut out = Image::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    out.place(&inner, Anchor::Center, (0, 0), 100.0);
    out
}

pub struct InnerMaskStrategy {
    ctx: Arc<StrategyContext>,
}

impl InnerMaskStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

impl PostProcessStrategy for InnerMaskStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        OptionReader::new(NAME, &command.options, &[])?;
        let staging = Staging::in_place();
        let set = self.ctx.working_set(command)?;
        let items: Vec<_> = set.iter().collect();
        self.ctx.for_each(&items, |_, item| {
            let masked = inner_window(&self.ctx.base_canvas(&item.path)?);
            self.ctx.canvas.save(&masked, &staging.save_path(&item.path))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/inner_mask.rs"]
mod tests;
