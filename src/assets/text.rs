use std::collections::HashMap;

use crate::foundation::core::Color;
use crate::foundation::error::{SkinError, SkinResult};
use crate::render::composite::over_in_place;
use crate::render::image::{Image, surface_dims};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Fonts are registered once per distinct byte content; later layouts reuse the family name.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font_bytes: &[u8]) -> SkinResult<String> {
        let key = xxhash_rust::xxh3::xxh3_64(font_bytes);
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SkinError::validation("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SkinError::validation("registered font family has no name"))?
            .to_string();
        self.families.insert(key, family_name.clone());
        Ok(family_name)
    }

    /// Shape a single unwrapped line of text.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SkinResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SkinError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Rasterise `layout` onto `target` with the layout's top-left at `origin`.
pub(crate) fn draw_layout(
    target: &mut Image,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    origin: (f64, f64),
) -> SkinResult<()> {
    let (w, h) = surface_dims(target.width(), target.height())?;
    if w == 0 || h == 0 {
        return Ok(());
    }

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.0, origin.1)));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let mut data = target.data().to_vec();
    over_in_place(&mut data, pixmap.data_as_u8_slice(), 1.0)?;
    *target = Image::from_premul(target.width(), target.height(), data)?;
    Ok(())
}

/// Font handle for the glyph rasteriser.
pub(crate) fn font_data(font_bytes: &[u8]) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
