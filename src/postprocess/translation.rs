//! Translated-title captions looked up from a YAML table.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::command::PostProcessCommand;
use crate::canvas::{TextPlacement, TextStyle};
use crate::filestore::FileStore;
use crate::foundation::core::{Anchor, Color, HAlign, VAlign};
use crate::foundation::error::{SkinError, SkinResult};
use crate::postprocess::fonts::FontChoice;
use crate::postprocess::fuzzy::FuzzyCatalogue;
use crate::postprocess::options::OptionReader;
use crate::postprocess::staging::Staging;
use crate::postprocess::text::{LABEL_POSITIONS, is_side_position, label_placement, wrap_words};
use crate::postprocess::{PostProcessStrategy, StrategyContext};
use crate::render::image::Image;

pub const NAME: &str = "translation";

const KEYS: &[&str] = &[
    "font_variant",
    "font_family",
    "text_bg_opacity",
    "color",
    "mapping",
    "position",
];

const FONT_SIZE: f32 = 22.0;
const LINE_HEIGHT: f64 = 1.9;
const PADDING: (u32, u32) = (30, 10);
const TRIM_FUZZ: u8 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct TranslationOptions {
    pub font: FontChoice,
    pub background_opacity: f64,
    pub color: Color,
    pub mapping: String,
    pub position: &'static str,
}

impl TranslationOptions {
    pub fn from_map(map: &Map<String, Value>) -> SkinResult<Self> {
        let r = OptionReader::new(NAME, map, KEYS)?;
        Ok(Self {
            font: FontChoice::new(
                r.string("font_family", "roboto")?,
                r.string("font_variant", "bold")?,
            ),
            background_opacity: r.int("text_bg_opacity", 90, 0..=100)? as f64,
            color: Color::parse(&r.string("color", "black")?)?,
            mapping: r.string("mapping", "rom_translations.yml")?,
            position: r.enumeration("position", "bottom", LABEL_POSITIONS)?,
        })
    }

    /// Box the caption wraps inside.
    pub fn caption_box(&self) -> (u32, u32) {
        if is_side_position(self.position) {
            (240, 120)
        } else {
            (320, 80)
        }
    }
}

/// Merge every platform table of a `platform: {rom: text}` document, later tables
/// overriding earlier ones.
pub fn load_translations(files: &dyn FileStore, path: &Path) -> SkinResult<FuzzyCatalogue> {
    let raw = files.read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(FuzzyCatalogue::default());
    }
    let doc: serde_yaml::Mapping = serde_yaml::from_str(&raw).map_err(|e| {
        SkinError::serde(format!("translation table \"{}\": {e}", path.display()))
    })?;

    let mut merged = BTreeMap::new();
    for (platform, table) in doc {
        if table.is_null() {
            continue;
        }
        let table: BTreeMap<String, String> = serde_yaml::from_value(table).map_err(|e| {
            SkinError::serde(format!(
                "translation table \"{}\", platform {platform:?}: {e}",
                path.display()
            ))
        })?;
        merged.extend(table);
    }
    Ok(FuzzyCatalogue::new(merged))
}

pub struct TranslationStrategy {
    ctx: Arc<StrategyContext>,
}

impl TranslationStrategy {
    pub fn new(ctx: Arc<StrategyContext>) -> Self {
        Self { ctx }
    }

    fn caption(&self, options: &TranslationOptions, style: &TextStyle, text: &str) -> SkinResult<Image> {
        let (w, h) = options.caption_box();
        let lines = wrap_words(text, f64::from(w), |t| {
            Ok(self.ctx.canvas.measure_text(t, style)?.width)
        })?;

        let mut layout = Image::filled(w, h, options.color);
        let pitch = f64::from(style.size) * LINE_HEIGHT;
        let first_y = f64::from(h) / 2.0 - pitch * (lines.len().saturating_sub(1)) as f64 / 2.0;
        for (i, line) in lines.iter().enumerate() {
            self.ctx.canvas.draw_text(
                &mut layout,
                line,
                style,
                TextPlacement::new(
                    f64::from(w) / 2.0,
                    first_y + pitch * i as f64,
                    HAlign::Center,
                    VAlign::Middle,
                ),
            )?;
        }

        let ink = layout.trim(TRIM_FUZZ);
        let mut out = Image::filled(ink.width() + PADDING.0, ink.height() + PADDING.1, options.color);
        out.place(&ink, Anchor::Center, (0, 0), 100.0);
        Ok(out)
    }
}

impl PostProcessStrategy for TranslationStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = NAME, source = %command.source.display()))]
    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        let options = TranslationOptions::from_map(&command.options)?;
        let (anchor, offset) = label_placement(options.position)?;
        let style = options
            .font
            .style(&self.ctx.paths, FONT_SIZE, options.color.inverse())?;
        let table_path = self.ctx.paths.post_process_resources().join(&options.mapping);
        let catalogue = load_translations(self.ctx.files.as_ref(), &table_path)?;
        tracing::debug!(entries = catalogue.len(), table = %table_path.display(), "translations loaded");

        let staging = Staging::in_place();
        let set = self.ctx.working_set(command)?;
        let items: Vec<_> = set.iter().collect();

        self.ctx.for_each(&items, |_, item| {
            let stem = Path::new(&item.file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(text) = catalogue.lookup(&stem) else {
                tracing::debug!(item = %stem, "no translation");
                return Ok(());
            };
            let caption = self.caption(&options, &style, text)?;
            let mut canvas = self.ctx.base_canvas(&item.path)?;
            canvas.place(&caption, anchor, offset, options.background_opacity);
            self.ctx.canvas.save(&canvas, &staging.save_path(&item.path))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/translation.rs"]
mod tests;
