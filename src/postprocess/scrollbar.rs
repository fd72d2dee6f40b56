//! A vertical scrollbar whose thumb tracks the item's position in the list.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::foundation::core::{Anchor, Color};
use crate::foundation::error::SkinResult;
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "vertical_scrollbar";

const KEYS: &[&str] = &[
    "thumb_color",
    "track_color",
    "opacity",
    "position",
    "thumb_height",
    "track_height",
    "track_width",
    "track_style",
];

const TRACK_PADDING_X: i64 = 2;
const TRACK_PADDING_Y: i64 = 3;
const OUTER_PADDING: i64 = 1;
const EDGE_OFFSET: (i32, i32) = (20, 0);

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollbarOptions {
    pub thumb_color: Color,
    pub track_color: Color,
    pub opacity: f64,
    pub anchor: Anchor,
    pub thumb_height: i64,
    pub track_height: i64,
    pub track_width: i64,
    pub rounded: bool,
}

impl ScrollbarOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        Ok(Self {
            thumb_color: Color::parse(&r.string("thumb_color", "8FB7C4")?)?,
            track_color: Color::parse(&r.string("track_color", "6E8284")?)?,
            opacity: r.float("opacity", 100.0, 0.0..=100.0)?,
            anchor: match r.enumeration("position", "left", &["left", "right"])? {
                "right" => Anchor::Right,
                _ => Anchor::Left,
            },
            thumb_height: r.int("thumb_height", 28, 2..=i64::from(u16::MAX))?,
            track_height: r.int("track_height", 300, 10..=480)?,
            track_width: r.int("track_width", 12, 2..=320)?,
            rounded: r.enumeration("track_style", "rounded", &["rounded", "square"])? == "rounded",
        })
    }
}

/// Top of the thumb for item `position` of `total`, in scrollbar pixels.
pub fn thumb_top(options: &ScrollbarOptions, position: usize, total: usize) -> i64 {
    let range = (options.track_height
        - options.thumb_height
        - TRACK_PADDING_Y * 2
        - OUTER_PADDING * 2)
        .max(0);
    let travel = if total > 1 {
        (position as f64 * (range as f64 / (total - 1) as f64)).round() as i64
    } else {
        0
    };
    travel + TRACK_PADDING_Y + OUTER_PADDING
}

/// The scrollbar for item `position` of `total`.
pub fn scrollbar_image(options: &ScrollbarOptions, position: usize, total: usize) -> SkinResult<Image> {
    let width = options.track_width as f64;
    let height = options.track_height as f64;
    let outer = OUTER_PADDING as f64;
    let mut bar = Image::new(
        (options.track_width + OUTER_PADDING * 2) as u32,
        (options.track_height + OUTER_PADDING * 2) as u32,
    );

    let (mut track_y, mut track_h) = (outer, height);
    let r = if options.rounded { width / 2.0 } else { 0.0 };
    if options.rounded {
        track_h = (track_h - r * 2.0).max(0.0);
        track_y += r;
    }
    bar.fill_rect(outer, track_y, width, track_h, options.track_color)?;
    if options.rounded {
        bar.fill_circle(outer + r, track_y, r, options.track_color)?;
        bar.fill_circle(outer + r, height - r - outer, r, options.track_color)?;
    }

    let thumb_w = (options.track_width - TRACK_PADDING_X * 2).max(0) as f64;
    let thumb_x = outer + (width - thumb_w) / 2.0;
    let mut thumb_y = thumb_top(options, position, total) as f64;
    let mut thumb_h = options.thumb_height as f64;
    let tr = if options.rounded { thumb_w / 2.0 } else { 0.0 };
    if options.rounded {
        thumb_h = (thumb_h - tr * 2.0).max(0.0);
        thumb_y += tr;
    }
    bar.fill_rect(thumb_x, thumb_y, thumb_w, thumb_h, options.thumb_color)?;
    if options.rounded {
        bar.fill_circle(thumb_x + tr, thumb_y, tr, options.thumb_color)?;
        bar.fill_circle(thumb_x + tr, thumb_y + thumb_h, tr, options.thumb_color)?;
    }
    Ok(bar)
}

pub struct ScrollbarStrategy {
    ctx: Arc<StrategyContext>,
}

impl ScrollbarStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

impl PostProcessStrategy for ScrollbarStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = ScrollbarOptions::from_map(&command.options)?;
        let staging = Staging::isolated(&self.ctx.paths, NAME)?;
        let set = self.ctx.working_set(command)?;
        let files = self.ctx.sorted(&set);
        let total = files.len();

        self.ctx.for_each(&files, |i, path| {
            let bar = scrollbar_image(&options, i, total)?;
            let mut canvas = self.ctx.base_canvas(path)?;
            canvas.place(&bar, options.anchor, EDGE_OFFSET, options.opacity);
            self.ctx.canvas.save(&canvas, &staging.save_path(path))
        })?;

        staging.mirror_back(self.ctx.files.as_ref(), &set);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/scrollbar.rs"]
mod tests;
