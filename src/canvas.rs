use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::assets::decode::{OutputFormat, decode_image, encode_image};
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine, draw_layout, font_data};
use crate::foundation::core::{Color, HAlign, VAlign};
use crate::foundation::error::{SkinError, SkinResult};
use crate::render::image::Image;

/// Font file, pixel size and fill color of a text run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font: PathBuf,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font: impl Into<PathBuf>, size: f32, color: Color) -> Self {
        Self {
            font: font.into(),
            size,
            color,
        }
    }

    /// Same style in another color.
    pub fn with_color(&self, color: Color) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }
}

/// Logical extent of a laid out line of text, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Where a text run lands: `(x, y)` is the point the alignments refer to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextPlacement {
    pub x: f64,
    pub y: f64,
    pub halign: HAlign,
    pub valign: VAlign,
}

impl TextPlacement {
    pub fn new(x: f64, y: f64, halign: HAlign, valign: VAlign) -> Self {
        Self {
            x,
            y,
            halign,
            valign,
        }
    }

    /// Top-left corner of a box of `metrics` size aligned on this point.
    pub fn origin(&self, metrics: TextMetrics) -> (f64, f64) {
        let x = match self.halign {
            HAlign::Left => self.x,
            HAlign::Center => self.x - metrics.width / 2.0,
            HAlign::Right => self.x - metrics.width,
        };
        let y = match self.valign {
            VAlign::Top => self.y,
            VAlign::Middle => self.y - metrics.height / 2.0,
            VAlign::Bottom => self.y - metrics.height,
        };
        (x, y)
    }
}

/// Image IO and text rendering as consumed by stages and strategies.
pub trait ImageCanvas: Send + Sync {
    /// Decode the image at `path`.
    fn read(&self, path: &Path) -> SkinResult<Image>;

    /// Encode by extension, creating parent directories.
    fn save(&self, img: &Image, path: &Path) -> SkinResult<()> {
        self.save_as(img, path, OutputFormat::from_path(path)?)
    }

    /// Encode with an explicit format, creating parent directories.
    fn save_as(&self, img: &Image, path: &Path, format: OutputFormat) -> SkinResult<()>;

    fn measure_text(&self, text: &str, style: &TextStyle) -> SkinResult<TextMetrics>;

    fn draw_text(
        &self,
        target: &mut Image,
        text: &str,
        style: &TextStyle,
        at: TextPlacement,
    ) -> SkinResult<()>;
}

thread_local! {
    static LAYOUT_ENGINE: RefCell<TextLayoutEngine> = RefCell::new(TextLayoutEngine::new());
}

/// Default canvas: `image` codecs, `parley` shaping and `vello_cpu` glyph rasterisation.
#[derive(Default)]
pub struct CpuCanvas {
    fonts: Mutex<HashMap<PathBuf, Arc<Vec<u8>>>>,
}

impl CpuCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn font_bytes(&self, path: &Path) -> SkinResult<Arc<Vec<u8>>> {
        let mut fonts = self
            .fonts
            .lock()
            .map_err(|_| SkinError::render("font cache lock poisoned"))?;
        if let Some(bytes) = fonts.get(path) {
            return Ok(bytes.clone());
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file \"{}\"", path.display()))?;
        let bytes = Arc::new(bytes);
        fonts.insert(path.to_path_buf(), bytes.clone());
        Ok(bytes)
    }

    fn layout(
        &self,
        text: &str,
        style: &TextStyle,
    ) -> SkinResult<(Arc<Vec<u8>>, parley::Layout<TextBrushRgba8>)> {
        let bytes = self.font_bytes(&style.font)?;
        let layout = LAYOUT_ENGINE.with(|engine| {
            engine.borrow_mut().layout_plain(
                text,
                bytes.as_slice(),
                style.size,
                TextBrushRgba8::from(style.color),
            )
        })?;
        Ok((bytes, layout))
    }
}

impl ImageCanvas for CpuCanvas {
    fn read(&self, path: &Path) -> SkinResult<Image> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image \"{}\"", path.display()))?;
        decode_image(&bytes)
            .map_err(|e| SkinError::render(format!("decode \"{}\": {e}", path.display())))
    }

    fn save_as(&self, img: &Image, path: &Path, format: OutputFormat) -> SkinResult<()> {
        let bytes = encode_image(img, format)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory \"{}\"", parent.display()))?;
        }
        std::fs::write(path, bytes)
            .with_context(|| format!("write image \"{}\"", path.display()))?;
        Ok(())
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> SkinResult<TextMetrics> {
        if text.is_empty() {
            return Ok(TextMetrics::default());
        }
        let (_, layout) = self.layout(text, style)?;
        Ok(TextMetrics {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
        })
    }

    fn draw_text(
        &self,
        target: &mut Image,
        text: &str,
        style: &TextStyle,
        at: TextPlacement,
    ) -> SkinResult<()> {
        if text.is_empty() || style.color.a == 0 {
            return Ok(());
        }
        let (bytes, layout) = self.layout(text, style)?;
        let metrics = TextMetrics {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
        };
        let font = font_data(bytes.as_slice());
        draw_layout(target, &layout, &font, at.origin(metrics))
    }
}

#[cfg(test)]
#[path = "../tests/unit/canvas.rs"]
mod tests;
