//! "3 / 12" style position counters.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::canvas::{TextMetrics, TextPlacement, TextStyle};
use crate::foundation::core::{Anchor, Color, HAlign, VAlign};
use crate::foundation::error::{SkinError, SkinResult};
use crate::postprocess::fonts::{FontChoice, FontMetricCache};
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "counter";

const KEYS: &[&str] = &[
    "background",
    "scale",
    "offset_x",
    "offset_y",
    "color",
    "font_variant",
    "font_family",
    "background_opacity",
    "opacity",
    "variant",
    "position",
];

const POSITIONS: &[&str] = &[
    "absolute-bottom-right",
    "bottom-right",
    "absolute-bottom-left",
    "bottom-left",
    "absolute-bottom",
    "bottom",
    "absolute-top",
    "top",
    "top-left",
    "top-right",
    "left",
    "right",
];

const SIMPLE_SIZE: (u32, u32) = (160, 60);
const CIRCULAR_SIZE: u32 = 180;
const BACKGROUND_PADDING: (u32, u32) = (30, 20);
const TRIM_FUZZ: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterVariant {
    Simple,
    Circular,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CounterOptions {
    pub background: bool,
    pub scale: f64,
    pub offset: (i64, i64),
    pub color: Color,
    pub font: FontChoice,
    pub background_opacity: f64,
    pub opacity: f64,
    pub variant: CounterVariant,
    /// Position keyword as configured; `absolute-*` only differ in their default offsets.
    pub position: &'static str,
}

impl CounterOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        let position = r.enumeration("position", "bottom-right", POSITIONS)?;
        let color = Color::parse(&r.string("color", "white")?)?;
        let (default_x, default_y) = default_offsets(position);
        Ok(Self {
            background: r.bool("background", false)?,
            scale: r.float("scale", 0.7, 0.0..=1.0)?,
            offset: (
                r.opt_int("offset_x", -10_000..=10_000)?.unwrap_or(default_x),
                r.opt_int("offset_y", -10_000..=10_000)?.unwrap_or(default_y),
            ),
            color,
            font: FontChoice::new(
                r.string("font_family", "roboto")?,
                r.string("font_variant", "bold")?,
            ),
            background_opacity: r.int("background_opacity", 100, 0..=100)? as f64,
            opacity: r.int("opacity", 100, 0..=100)? as f64,
            variant: match r.enumeration("variant", "simple", &["simple", "circular"])? {
                "circular" => CounterVariant::Circular,
                _ => CounterVariant::Simple,
            },
            position,
        })
    }

    /// Where the counter lands on the artwork.
    pub fn anchor(&self) -> SkinResult<Anchor> {
        Anchor::parse(self.position.trim_start_matches("absolute-"))
    }

    /// Side of the counter box the text hugs. `absolute-*` positions stay centred.
    fn align(&self) -> HAlign {
        match self.position {
            "top-right" | "right" | "bottom-right" => HAlign::Right,
            "top-left" | "left" | "bottom-left" => HAlign::Left,
            _ => HAlign::Center,
        }
    }
}

fn default_offsets(position: &str) -> (i64, i64) {
    const INSET: i64 = 40;
    let x = match position {
        "top-left" | "top-right" | "bottom-left" | "bottom-right" | "left" | "right" => INSET,
        _ => 0,
    };
    let y = match position {
        "top-left" | "top-right" | "bottom-left" | "bottom-right" | "top" | "bottom" => INSET,
        _ => 0,
    };
    (x, y)
}

/// Background circle radius for a total with this many digits.
pub fn circle_radius(total: usize) -> f64 {
    match total.to_string().len() {
        1 => 35.0,
        2 => 46.0,
        3 => 57.0,
        4 => 69.0,
        5 => 82.0,
        _ => 75.0,
    }
}

fn anchor_for(align: HAlign) -> Anchor {
    match align {
        HAlign::Left => Anchor::Left,
        HAlign::Center => Anchor::Center,
        HAlign::Right => Anchor::Right,
    }
}

pub struct CounterStrategy {
    ctx: Arc<StrategyContext>,
}

impl CounterStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }

    /// Text of a simple counter drawn on the 160x60 box, trimmed to its ink.
    fn simple_text(&self, options: &CounterOptions, style: &TextStyle, text: &str) -> SkinResult<Image> {
        let (w, h) = SIMPLE_SIZE;
        let align = options.align();
        let x = match align {
            HAlign::Right => f64::from(w) - 5.0,
            HAlign::Left => 5.0,
            HAlign::Center => f64::from(w) / 2.0,
        };
        let mut surface = Image::new(w, h);
        self.ctx.canvas.draw_text(
            &mut surface,
            text,
            style,
            TextPlacement::new(x, f64::from(h) / 2.0, align, VAlign::Middle),
        )?;
        Ok(surface.trim(TRIM_FUZZ))
    }

    fn simple_counter(
        &self,
        options: &CounterOptions,
        digit: TextMetrics,
        current: usize,
        total: usize,
    ) -> SkinResult<Image> {
        let font_size = (6.0 * 30.0 / digit.width).round() as f32;
        let text_color = if options.background {
            options.color.inverse()
        } else {
            options.color
        };
        let style = options.font.style(&self.ctx.paths, font_size, text_color)?;
        let text = self.simple_text(options, &style, &format!("{current} / {total}"))?;

        let (w, h) = SIMPLE_SIZE;
        let anchor = anchor_for(options.align());
        let mut out = Image::new(w, h);
        if options.background {
            // Sized from the widest label so the box stays put while paging.
            let widest = self.simple_text(options, &style, &format!("{total} / {total}"))?;
            let bg = Image::filled(
                widest.width() + BACKGROUND_PADDING.0,
                widest.height() + BACKGROUND_PADDING.1,
                options.color,
            );
            let text_x = match options.align() {
                HAlign::Center => 0,
                _ => (BACKGROUND_PADDING.0 / 2) as i32,
            };
            out.place(&bg, anchor, (0, 0), options.background_opacity);
            out.place(&text, anchor, (text_x, 0), 100.0);
        } else {
            out.place(&text, anchor, (0, 0), 100.0);
        }

        if options.scale != 1.0 {
            out = out.scale_to_height((f64::from(h) * options.scale).round() as u32)?;
        }
        Ok(out)
    }

    fn circular_counter(
        &self,
        options: &CounterOptions,
        digit: TextMetrics,
        current: usize,
        total: usize,
    ) -> SkinResult<Image> {
        let font_size = 6.0 * (30.0 / digit.width).round();
        let text_color = if options.background {
            options.color.inverse()
        } else {
            options.color
        };
        let style = options.font.style(&self.ctx.paths, font_size as f32, text_color)?;

        let mut counter = Image::new(CIRCULAR_SIZE, CIRCULAR_SIZE);
        self.ctx.canvas.draw_text(
            &mut counter,
            &current.to_string(),
            &style,
            TextPlacement::new(90.0, 78.0, HAlign::Right, VAlign::Middle),
        )?;
        self.ctx.canvas.draw_text(
            &mut counter,
            &total.to_string(),
            &style,
            TextPlacement::new(90.0, 102.0, HAlign::Left, VAlign::Middle),
        )?;

        let counter =
            counter.scale_to_height((f64::from(CIRCULAR_SIZE) * options.scale).round() as u32)?;
        let radius = circle_radius(total) * options.scale;
        if !options.background {
            return Ok(counter);
        }

        let side = (radius * 2.0 + 2.0).round().max(1.0) as u32;
        let mut disc = Image::new(side, side);
        disc.fill_circle(radius, radius, radius, options.color)?;
        let mut out = Image::new(side, side);
        out.place(&disc, Anchor::Center, (0, 0), options.background_opacity);
        out.place(&counter, Anchor::Center, (0, 0), 100.0);
        Ok(out)
    }
}

impl PostProcessStrategy for CounterStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = CounterOptions::from_map(&command.options)?;
        let anchor = options.anchor()?;
        let metrics_style = options.font.style(&self.ctx.paths, 12.0, options.color)?;
        let staging = Staging::in_place();
        let set = self.ctx.working_set(command)?;
        let files = self.ctx.sorted(&set);
        let total = files.len();

        let cache = FontMetricCache::new();
        let digit = cache.measure(self.ctx.canvas.as_ref(), &options.font, &metrics_style, "8")?;
        if digit.width <= 0.0 {
            return Err(SkinError::render(format!(
                "font {}/{} has no width for digits",
                options.font.family, options.font.variant
            )));
        }

        self.ctx.for_each(&files, |i, path| {
            let counter = match options.variant {
                CounterVariant::Simple => self.simple_counter(&options, digit, i + 1, total)?,
                CounterVariant::Circular => self.circular_counter(&options, digit, i + 1, total)?,
            };
            let mut canvas = self.ctx.base_canvas(path)?;
            let offset = (options.offset.0 as i32, options.offset.1 as i32);
            canvas.place(&counter, anchor, offset, options.opacity);
            self.ctx.canvas.save(&canvas, &staging.save_path(path))
        })?;
        tracing::debug!(items = total, "counters drawn");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/counter.rs"]
mod tests;
