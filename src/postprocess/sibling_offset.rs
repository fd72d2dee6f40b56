//! Carousel rendering: each image is drawn as the focused item with its neighbours
//! fanned out behind it.
//!
//! Neighbour `s` steps away from the focus sits at offset index `s` (negative before,
//! positive after). Sizes and opacities fall off geometrically with `|s|` (see
//! [`scaled_value`]), positions follow a line or a half circle.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::foundation::core::{Anchor, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::foundation::error::SkinResult;
use crate::foundation::math::scaled_value;
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "offset_with_siblings";

const KEYS: &[&str] = &[
    "render",
    "circle_radius",
    "circle",
    "loop",
    "offset_x_mode",
    "offset_y_mode",
    "opacity",
    "scale",
    "effect",
    "sibling_count",
    "offset_x",
    "offset_y",
];

const OFFSET_MODES: &[&str] = &["regular", "scale", "fixed", "adjust"];

/// Which side of the focus gets drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderDirection {
    Both,
    Ahead,
    Behind,
}

impl RenderDirection {
    pub fn includes(self, offset_index: i64) -> bool {
        match self {
            Self::Both => true,
            Self::Ahead => offset_index >= 0,
            Self::Behind => offset_index <= 0,
        }
    }
}

/// How a sibling's offset on one axis is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffsetMode {
    /// Configured offset times the offset index.
    Regular,
    /// Offset shrinks along the logarithmic scale curve.
    Scale,
    /// Configured offset for every sibling.
    Fixed,
    /// Offset reduced by how much the sibling shrank.
    Adjust,
}

impl OffsetMode {
    fn parse(s: &str) -> Self {
        match s {
            "scale" => Self::Scale,
            "fixed" => Self::Fixed,
            "adjust" => Self::Adjust,
            _ => Self::Regular,
        }
    }
}

/// Half-circle arrangement; the name is the screen edge the arc's centre sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircleLayout {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiblingEffect {
    Greyscale,
    Blur,
    Pixelate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SiblingOffsetOptions {
    pub render: RenderDirection,
    pub circle_radius: i64,
    pub circle: Option<CircleLayout>,
    pub looped: bool,
    pub offset_x_mode: OffsetMode,
    pub offset_y_mode: OffsetMode,
    pub opacity: Option<f64>,
    pub scale: Option<f64>,
    pub effect: Option<SiblingEffect>,
    pub sibling_count: u32,
    pub offset_x: i64,
    pub offset_y: i64,
}

impl SiblingOffsetOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        let render = match r.enumeration("render", "both", &["both", "ahead", "behind"])? {
            "ahead" => RenderDirection::Ahead,
            "behind" => RenderDirection::Behind,
            _ => RenderDirection::Both,
        };
        let circle = r
            .opt_enumeration(
                "circle",
                &[
                    "half-circle-left",
                    "half-circle-right",
                    "half-circle-top",
                    "half-circle-bottom",
                ],
            )?
            .map(|c| match c {
                "half-circle-right" => CircleLayout::Right,
                "half-circle-top" => CircleLayout::Top,
                "half-circle-bottom" => CircleLayout::Bottom,
                _ => CircleLayout::Left,
            });
        let effect = r
            .opt_enumeration("effect", &["greyscale", "blur", "pixelate"])?
            .map(|e| match e {
                "blur" => SiblingEffect::Blur,
                "pixelate" => SiblingEffect::Pixelate,
                _ => SiblingEffect::Greyscale,
            });
        // Zero scale or opacity means "off".
        let positive = |v: Option<f64>| v.filter(|v| *v > 0.0);

        Ok(Self {
            render,
            circle_radius: r.int("circle_radius", 320, 10..=i64::from(u16::MAX))?,
            circle,
            looped: r.bool("loop", true)?,
            offset_x_mode: OffsetMode::parse(r.enumeration("offset_x_mode", "regular", OFFSET_MODES)?),
            offset_y_mode: OffsetMode::parse(r.enumeration("offset_y_mode", "regular", OFFSET_MODES)?),
            opacity: positive(r.opt_float("opacity", 0.0..=100.0)?),
            scale: positive(r.opt_float("scale", 0.0..=100.0)?),
            effect,
            sibling_count: r.int("sibling_count", 5, 0..=64)? as u32,
            offset_x: r.int("offset_x", 0, -10_000..=10_000)?,
            offset_y: r.int("offset_y", 0, -10_000..=10_000)?,
        })
    }
}

/// Working-set index for each of the `2k+1` slots around `index`.
///
/// Out-of-range slots are `None`, or wrap around the set when `looped`.
pub fn sibling_window(len: usize, index: usize, k: usize, looped: bool) -> Vec<Option<usize>> {
    let n = len as i64;
    (0..=2 * k)
        .map(|slot| {
            let at = index as i64 + slot as i64 - k as i64;
            if (0..n).contains(&at) {
                Some(at as usize)
            } else if looped && n > 0 {
                Some(at.rem_euclid(n) as usize)
            } else {
                None
            }
        })
        .collect()
}

/// Slot drawing order for a `2k+1` window: outermost pairs first, the focus last.
pub fn draw_order(k: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(2 * k + 1);
    let (mut left, mut right) = (0usize, 2 * k);
    while left <= right {
        out.push(left);
        left += 1;
        if left <= right {
            out.push(right);
            if right == 0 {
                break;
            }
            right -= 1;
        }
    }
    out
}

/// Offset for `scale` mode.
///
/// `diff = floor(o - o*scale)` is the most the offset may shrink; the shrink grows with
/// `log_base(|index|)` where `base` is the window size.
pub fn scale_mode_offset(offset: i64, scale: f64, offset_index: i64, base: f64) -> i64 {
    let o = offset as f64;
    let diff = (o - o * scale).floor();
    let mult = (offset_index.unsigned_abs() as f64).ln() / base.ln();
    let shrink = (diff * mult).round().min(diff);
    ((o - shrink) * offset_index as f64) as i64
}

/// Offset for `adjust` mode: the configured offset minus the part the sibling lost
/// when scaled to `current_scale`.
pub fn adjust_mode_offset(offset: i64, current_scale: f64) -> i64 {
    let o = offset.unsigned_abs() as f64;
    (offset.signum() as f64 * (o - o * current_scale)) as i64
}

/// Position of the sibling at `offset_index` on a half circle of `radius`.
///
/// Neighbours are `90 / k` degrees apart; the arc is shifted so the focus sits at the
/// origin.
pub fn circle_position(layout: CircleLayout, radius: f64, k: u32, offset_index: i64) -> (i64, i64) {
    let base = match layout {
        CircleLayout::Left => 0.0,
        CircleLayout::Top => 90.0,
        CircleLayout::Right => 180.0,
        CircleLayout::Bottom => 270.0,
    };
    let theta = 90.0 / f64::from(k.max(1)) * offset_index as f64 + base;
    let (sin, cos) = theta.to_radians().sin_cos();
    let (mut x, mut y) = (radius * cos, radius * sin);
    match layout {
        CircleLayout::Left => x -= radius,
        CircleLayout::Right => x += radius,
        CircleLayout::Top => y -= radius,
        CircleLayout::Bottom => y += radius,
    }
    (x.round() as i64, y.round() as i64)
}

/// One sibling, transformed, with its offset from the canvas centre.
fn sibling_layer(
    options: &SiblingOffsetOptions,
    img: &Image,
    offset_index: i64,
) -> SkinResult<(Image, (i64, i64))> {
    let k = options.sibling_count;
    let mut ox = match options.offset_x_mode {
        OffsetMode::Fixed => options.offset_x,
        _ => options.offset_x * offset_index,
    };
    let mut oy = match options.offset_y_mode {
        OffsetMode::Fixed => options.offset_y,
        _ => options.offset_y * offset_index,
    };

    let mut layer = img.clone();
    if let Some(scale) = options.scale {
        let target = scaled_value(i64::from(CANVAS_WIDTH), scale, k, offset_index);
        layer = layer.scale_down_to_width(target.clamp(1, i64::from(u32::MAX)) as u32)?;

        let window = f64::from(2 * k + 1);
        if options.offset_x_mode == OffsetMode::Scale {
            ox = scale_mode_offset(options.offset_x, scale, offset_index, window);
        }
        if options.offset_y_mode == OffsetMode::Scale {
            oy = scale_mode_offset(options.offset_y, scale, offset_index, window);
        }
        let current = target as f64 / f64::from(CANVAS_WIDTH);
        if options.offset_x_mode == OffsetMode::Adjust {
            ox = adjust_mode_offset(options.offset_x, current);
        }
        if options.offset_y_mode == OffsetMode::Adjust {
            oy = adjust_mode_offset(options.offset_y, current);
        }
    }

    if let Some(layout) = options.circle {
        let (cx, cy) = circle_position(layout, options.circle_radius as f64, k, offset_index);
        ox = cx + options.offset_x;
        oy = cy + options.offset_y;
        layer = layer.rotate((90.0 / f64::from(k.max(1)) * offset_index as f64).round());
    }

    layer = match options.effect {
        None => layer,
        Some(SiblingEffect::Greyscale) => layer.greyscale(),
        Some(SiblingEffect::Blur) => layer.blur(3)?,
        Some(SiblingEffect::Pixelate) => layer.pixelate(4),
    };

    if let Some(opacity) = options.opacity {
        let pct = scaled_value(100, opacity, k, offset_index);
        layer.multiply_alpha(pct as f32 / 100.0);
    }
    Ok((layer, (ox, oy)))
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Compose one carousel frame from a `2k+1` window of images (focus in the middle).
pub fn compose_carousel(
    options: &SiblingOffsetOptions,
    window: &[Option<Image>],
) -> SkinResult<Image> {
    let k = options.sibling_count as usize;
    let mut canvas = Image::new(CANVAS_WIDTH, CANVAS_HEIGHT);

    for slot in draw_order(k) {
        if slot == k {
            continue;
        }
        let Some(img) = window.get(slot).and_then(Option::as_ref) else {
            continue;
        };
        let offset_index = slot as i64 - k as i64;
        if !options.render.includes(offset_index) {
            continue;
        }
        let (layer, (ox, oy)) = sibling_layer(options, img, offset_index)?;
        canvas.place(&layer, Anchor::Center, (clamp_i32(ox), clamp_i32(oy)), 100.0);
    }

    if let Some(center) = window.get(k).and_then(Option::as_ref) {
        let offset = if options.circle.is_some() {
            (clamp_i32(options.offset_x), clamp_i32(options.offset_y))
        } else {
            (0, 0)
        };
        canvas.place(center, Anchor::TopLeft, offset, 100.0);
    }
    Ok(canvas)
}

pub struct SiblingOffsetStrategy {
    ctx: Arc<StrategyContext>,
}

impl SiblingOffsetStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }
}

impl PostProcessStrategy for SiblingOffsetStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = SiblingOffsetOptions::from_map(&command.options)?;
        let staging = Staging::isolated(&self.ctx.paths, NAME)?;
        let set = self.ctx.working_set(command)?;
        let files = self.ctx.sorted(&set);
        tracing::info!(items = files.len(), "rendering siblings");

        let k = options.sibling_count as usize;
        self.ctx.for_each(&files, |i, path| {
            let window = sibling_window(files.len(), i, k, options.looped)
                .into_iter()
                .enumerate()
                .map(|(slot, entry)| {
                    let wanted = slot == k || options.render.includes(slot as i64 - k as i64);
                    match entry {
                        Some(j) if wanted => self.ctx.canvas.read(&files[j]).map(Some),
                        _ => Ok(None),
                    }
                })
                .collect::<SkinResult<Vec<_>>>()?;
            let frame = compose_carousel(&options, &window)?;
            self.ctx.canvas.save(&frame, &staging.save_path(path))
        })?;

        staging.mirror_back(self.ctx.files.as_ref(), &set);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/sibling_offset.rs"]
mod tests;
