//! Name labels on a pill or square backdrop.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::canvas::{TextPlacement, TextStyle};
use crate::foundation::core::{Anchor, Color, HAlign, VAlign};
use crate::foundation::error::SkinResult;
use crate::postprocess::fonts::FontChoice;
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "text";

const KEYS: &[&str] = &[
    "text_bg_opacity",
    "color",
    "color_alt",
    "use_color_alt",
    "color_invert",
    "background_color",
    "font_variant",
    "font_family",
    "position",
    "background_style",
    "size",
    "shadow",
    "trim_brackets",
];

/// Label positions shared by `text` and `translation`.
pub const LABEL_POSITIONS: &[&str] = &[
    "center",
    "center-bottom",
    "bottom-left",
    "bottom-right",
    "center-top",
    "top-left",
    "top-right",
    "bottom",
    "top",
    "left",
    "right",
];

const SIZES: &[&str] = &["xxxs", "xxs", "xs", "s", "m", "l", "xl", "xxl", "xxxl"];

/// Layout box the label is first drawn into.
const LABEL_CANVAS: (u32, u32) = (560, 60);
/// Widest a label may get before it is cut with an ellipsis.
pub const MAX_LABEL_WIDTH: f64 = (LABEL_CANVAS.0 - 50) as f64;
const MAX_LABEL_CHARS: usize = 99;
const BACKGROUND_PADDING_Y: u32 = 32;
const TEXT_Y_NUDGE: f64 = 4.0;
const SHADOW_OFFSET: f64 = 2.0;
const SHADOW_OPACITY: f64 = 35.0;
const TRIM_FUZZ: u8 = 10;

/// Anchor and offset of a label at `position` on the 640x480 artwork.
pub fn label_placement(position: &str) -> SkinResult<(Anchor, (i32, i32))> {
    let anchor = match position {
        "center-bottom" | "center-top" => Anchor::Center,
        "bottom-left" | "top-left" => Anchor::Left,
        "bottom-right" | "top-right" => Anchor::Right,
        other => Anchor::parse(other)?,
    };
    let x = match position {
        "left" | "right" | "top-left" | "bottom-left" | "top-right" | "bottom-right" => 20,
        _ => 0,
    };
    let y = match position {
        "center-top" | "top-left" | "top-right" => -130,
        "center-bottom" | "bottom-left" | "bottom-right" => 130,
        "bottom" | "top" => 50,
        _ => 0,
    };
    Ok((anchor, (x, y)))
}

/// True for positions hugging a side of the artwork rather than its vertical centre line.
pub(crate) fn is_side_position(position: &str) -> bool {
    matches!(
        position,
        "left" | "right" | "top-left" | "top-right" | "bottom-left" | "bottom-right"
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundStyle {
    Square,
    Pill,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub background_opacity: f64,
    pub color: Color,
    pub color_alt: Option<Color>,
    pub use_color_alt: bool,
    pub color_invert: bool,
    pub background_color: Color,
    pub font: FontChoice,
    pub position: &'static str,
    pub background_style: BackgroundStyle,
    pub size: &'static str,
    pub shadow: bool,
    pub trim_brackets: bool,
}

impl TextOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        let color_alt = r.string("color_alt", "silver")?;
        Ok(Self {
            background_opacity: r.int("text_bg_opacity", 0, 0..=100)? as f64,
            color: Color::parse(&r.string("color", "black")?)?,
            color_alt: if color_alt.is_empty() {
                None
            } else {
                Some(Color::parse(&color_alt)?)
            },
            use_color_alt: r.bool("use_color_alt", false)?,
            color_invert: r.bool("color_invert", false)?,
            background_color: Color::parse(&r.string("background_color", "white")?)?,
            font: FontChoice::new(
                r.string("font_family", "roboto")?,
                r.string("font_variant", "bold")?,
            ),
            position: r.enumeration("position", "bottom", LABEL_POSITIONS)?,
            background_style: match r.enumeration("background_style", "pill", &["square", "pill"])? {
                "square" => BackgroundStyle::Square,
                _ => BackgroundStyle::Pill,
            },
            size: r.enumeration("size", "m", SIZES)?,
            shadow: r.bool("shadow", false)?,
            trim_brackets: r.bool("trim_brackets", true)?,
        })
    }

    /// `(text, background)` after the alternate and invert switches.
    pub fn colors(&self) -> (Color, Color) {
        let text = match self.color_alt {
            Some(alt) if self.use_color_alt => alt,
            _ => self.color,
        };
        let background = self.background_color;
        if self.color_invert {
            (background, text)
        } else {
            (text, background)
        }
    }

    pub fn font_size(&self) -> f32 {
        let step = SIZES.iter().position(|s| *s == self.size).unwrap_or(4) + 4;
        4.0 * step as f32
    }

    fn text_halign(&self) -> (HAlign, f64) {
        let w = f64::from(LABEL_CANVAS.0);
        match self.position {
            "left" | "bottom-left" | "top-left" => (HAlign::Left, 1.0),
            "right" | "bottom-right" | "top-right" => (HAlign::Right, w - 1.0),
            _ => (HAlign::Center, w / 2.0),
        }
    }
}

/// `(...)` and `[...]` groups with the whitespace around them.
static BRACKET_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\(\[].*?[\)\]]\s*").expect("bracket group pattern"));

/// Strips bracketed groups, leaving one space where each stood.
///
/// A group closes at the first `)` or `]`; an unclosed bracket is kept as text.
pub fn trim_brackets(input: &str) -> String {
    BRACKET_GROUP.replace_all(input, " ").trim().to_string()
}

/// Longest prefix of `text` (at most 99 chars) whose width stays within `max_width`.
///
/// A cut label gets a trailing ellipsis.
pub fn truncate_to_width(
    text: &str,
    max_width: f64,
    mut width_of: impl FnMut(&str) -> SkinResult<f64>,
) -> SkinResult<String> {
    let chars: Vec<char> = text.chars().collect();
    let limit = chars.len().min(MAX_LABEL_CHARS);
    let whole: String = chars[..limit].iter().collect();
    if width_of(&whole)? <= max_width {
        return Ok(whole);
    }
    let mut fitted = String::new();
    for n in 1..=limit {
        let attempt: String = chars[..n].iter().collect();
        if width_of(&attempt)? > max_width {
            fitted.push('…');
            return Ok(fitted);
        }
        fitted = attempt;
    }
    Ok(fitted)
}

/// Greedy word wrap into lines no wider than `max_width`. Single words wider than the
/// limit get a line of their own.
pub(crate) fn wrap_words(
    text: &str,
    max_width: f64,
    mut width_of: impl FnMut(&str) -> SkinResult<f64>,
) -> SkinResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if width_of(&candidate)? <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

pub struct TextStrategy {
    ctx: Arc<StrategyContext>,
}

impl TextStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }

    /// Label text for an image: display name, else the file stem.
    fn label_for(&self, file_name: &str) -> String {
        let stem = std::path::Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        self.ctx
            .names
            .entry(&stem)
            .map(str::to_string)
            .unwrap_or(stem)
    }

    fn label_image(&self, options: &TextOptions, style: &TextStyle, text: &str) -> SkinResult<Image> {
        let (text_color, bg_color) = options.colors();
        let style = style.with_color(text_color);
        let text = truncate_to_width(text, MAX_LABEL_WIDTH, |t| {
            Ok(self.ctx.canvas.measure_text(t, &style)?.width)
        })?;

        let (lw, lh) = LABEL_CANVAS;
        let (halign, x) = options.text_halign();
        let mut layout = Image::new(lw, lh);
        self.ctx.canvas.draw_text(
            &mut layout,
            &text,
            &style,
            TextPlacement::new(x, f64::from(lh) / 2.0, halign, VAlign::Middle),
        )?;
        let bg_width = layout.trim(TRIM_FUZZ).width();

        let font_px = style.size.round() as u32;
        let pad_x = font_px + BACKGROUND_PADDING_Y;
        let height = font_px + BACKGROUND_PADDING_Y;
        let bg_color = bg_color.with_opacity_pct(options.background_opacity);

        let mut out = Image::new(bg_width + pad_x + 1, height);
        let half_pad = f64::from(pad_x) / 2.0;
        match options.background_style {
            BackgroundStyle::Pill => {
                let cy = f64::from(height) / 2.0;
                out.fill_circle(half_pad, cy, half_pad, bg_color)?;
                out.fill_circle(f64::from(bg_width + pad_x) - half_pad, cy, half_pad, bg_color)?;
            }
            BackgroundStyle::Square => {
                out.fill_rect(0.0, 0.0, f64::from(pad_x), f64::from(lh), bg_color)?;
                out.fill_rect(f64::from(bg_width + pad_x), 0.0, f64::from(pad_x), f64::from(lh), bg_color)?;
            }
        }
        let bg = Image::filled(bg_width.max(1), height, bg_color);
        out.place(&bg, Anchor::Left, (pad_x as i32 / 2, 0), 100.0);

        let text_y = f64::from(lh) / 2.0 + TEXT_Y_NUDGE;
        if options.shadow {
            let shadow = style.with_color(text_color.with_opacity_pct(SHADOW_OPACITY));
            self.ctx.canvas.draw_text(
                &mut out,
                &text,
                &shadow,
                TextPlacement::new(
                    half_pad + SHADOW_OFFSET,
                    text_y + SHADOW_OFFSET,
                    HAlign::Left,
                    VAlign::Middle,
                ),
            )?;
        }
        self.ctx.canvas.draw_text(
            &mut out,
            &text,
            &style,
            TextPlacement::new(half_pad, text_y, HAlign::Left, VAlign::Middle),
        )?;
        Ok(out)
    }
}

impl PostProcessStrategy for TextStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = TextOptions::from_map(&command.options)?;
        let (anchor, offset) = label_placement(options.position)?;
        let style = options
            .font
            .style(&self.ctx.paths, options.font_size(), options.color)?;
        let staging = Staging::in_place();
        let set = self.ctx.working_set(command)?;
        let items: Vec<_> = set.iter().collect();

        self.ctx.for_each(&items, |_, item| {
            let mut label = self.label_for(&item.file_name);
            if options.trim_brackets {
                label = trim_brackets(&label);
            }
            let text = self.label_image(&options, &style, &label)?;
            let mut canvas = self.ctx.base_canvas(&item.path)?;
            canvas.place(&text, anchor, offset, 100.0);
            self.ctx.canvas.save(&canvas, &staging.save_path(&item.path))
        })?;
        tracing::debug!(items = items.len(), "labels drawn");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/text.rs"]
mod tests;
