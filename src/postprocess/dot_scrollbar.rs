//! A column of page dots; the ring marks the page the item is on.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::foundation::core::{Anchor, Color};
use crate::foundation::error::SkinResult;
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "vertical_dot_scrollbar";

const KEYS: &[&str] = &["dotcolor", "opacity", "position"];

const DOT_DIAMETER: i64 = 8;
const TRACK_HEIGHT: i64 = 300;
const Y_PADDING: i64 = 10;
const WIDTH: u32 = 30;
const ACTIVE_RING: f64 = 4.0;
const MAX_DOTS: usize = (TRACK_HEIGHT / (DOT_DIAMETER + 8)) as usize;
const EDGE_OFFSET: (i32, i32) = (20, 90);

#[derive(Clone, Debug, PartialEq)]
pub struct DotScrollbarOptions {
    pub color: Color,
    pub opacity: f64,
    pub anchor: Anchor,
}

impl DotScrollbarOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        Ok(Self {
            color: Color::parse(&r.string("dotcolor", "white")?)?,
            opacity: r.int("opacity", 100, 0..=100)? as f64,
            anchor: match r.enumeration("position", "left", &["left", "right"])? {
                "right" => Anchor::TopRight,
                _ => Anchor::TopLeft,
            },
        })
    }
}

/// Dot layout for item `position` of `total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DotGeometry {
    pub dots: usize,
    pub items_per_page: usize,
    /// Gap between neighbouring dots.
    pub spacing: i64,
    /// Index of the ringed dot; pages past the last dot stay on the last dot.
    pub active: usize,
}

pub fn dot_geometry(total: usize, position: usize) -> DotGeometry {
    let dots = total.clamp(1, MAX_DOTS);
    let spacing = if dots > 1 {
        (TRACK_HEIGHT - dots as i64 * DOT_DIAMETER).div_euclid(dots as i64 - 1)
    } else {
        0
    };
    let items_per_page = ((total as f64 / dots as f64).round() as usize).max(1);
    DotGeometry {
        dots,
        items_per_page,
        spacing,
        active: (position / items_per_page).min(dots - 1),
    }
}

/// Vertical centre of dot `i`.
pub fn dot_center_y(geometry: &DotGeometry, i: usize) -> i64 {
    let i = i as i64;
    Y_PADDING + i * DOT_DIAMETER + i * geometry.spacing
}

pub fn dot_scrollbar_image(color: Color, total: usize, position: usize) -> SkinResult<Image> {
    let g = dot_geometry(total, position);
    let mut bar = Image::new(WIDTH, (TRACK_HEIGHT + 2 * Y_PADDING) as u32);
    let cx = f64::from(WIDTH) / 2.0;
    let r = DOT_DIAMETER as f64 / 2.0;
    for i in 0..g.dots {
        let cy = dot_center_y(&g, i) as f64;
        if i == g.active {
            bar.stroke_circle(cx, cy, r, ACTIVE_RING, color)?;
        } else {
            bar.fill_circle(cx, cy, r, color)?;
        }
    }
    Ok(bar)
}

pub struct DotScrollbarStrategy {
    ctx: Arc<StrategyContext>,
}

impl DotScrollbarStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

impl PostProcessStrategy for DotScrollbarStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = DotScrollbarOptions::from_map(&command.options)?;
        let staging = Staging::isolated(&self.ctx.paths, NAME)?;
        let set = self.ctx.working_set(command)?;
        let files = self.ctx.sorted(&set);
        let total = files.len();
        if total > 0 {
            let g = dot_geometry(total, 0);
            tracing::debug!(dots = g.dots, per_page = g.items_per_page, "dot layout");
        }

        self.ctx.for_each(&files, |i, path| {
            let bar = dot_scrollbar_image(options.color, total, i)?;
            let mut canvas = self.ctx.base_canvas(path)?;
            canvas.place(&bar, options.anchor, EDGE_OFFSET, options.opacity);
            self.ctx.canvas.save(&canvas, &staging.save_path(path))
        })?;

        staging.mirror_back(self.ctx.files.as_ref(), &set);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/dot_scrollbar.rs"]
mod tests;
