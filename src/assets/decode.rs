use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::ImageEncoder as _;

use crate::foundation::core::Color;
use crate::foundation::error::{SkinError, SkinResult};
use crate::render::image::Image;

/// Encodings the canvas can write, chosen from the output file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
    Webp,
}

impl OutputFormat {
    /// Default JPEG quality when the caller does not choose one.
    pub const DEFAULT_JPEG_QUALITY: u8 = 90;

    /// Format implied by `path`'s extension (case-insensitive).
    pub fn from_path(path: &Path) -> SkinResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg {
                quality: Self::DEFAULT_JPEG_QUALITY,
            }),
            "webp" => Ok(Self::Webp),
            _ => Err(SkinError::validation(format!(
                "unsupported image extension for \"{}\"",
                path.display()
            ))),
        }
    }
}

/// Decode PNG/JPEG/WEBP bytes into a premultiplied surface.
pub fn decode_image(bytes: &[u8]) -> SkinResult<Image> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(Image::from_rgba8(dyn_img.to_rgba8()))
}

/// Encode a surface. JPEG has no alpha, so it is flattened over white first.
pub fn encode_image(img: &Image, format: OutputFormat) -> SkinResult<Vec<u8>> {
    let rgba = img.to_rgba8()?;
    let (w, h) = rgba.dimensions();
    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut buf)
                .write_image(rgba.as_raw(), w, h, image::ExtendedColorType::Rgba8)
                .context("encode png")?;
        }
        OutputFormat::Jpeg { quality } => {
            let mut flat = Image::filled(w, h, Color::WHITE);
            flat.place_at(img, 0, 0, 1.0);
            let rgb = image::DynamicImage::ImageRgba8(flat.to_rgba8()?).to_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
                .write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")?;
        }
        OutputFormat::Webp => {
            image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
                .write_image(rgba.as_raw(), w, h, image::ExtendedColorType::Rgba8)
                .context("encode webp")?;
        }
    }
    Ok(buf)
}

/// Encode frames as an endlessly looping GIF, each shown for `delay_ms`.
pub fn encode_gif(frames: &[Image], delay_ms: u32) -> SkinResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(SkinError::validation("animated preview needs at least one frame"));
    }
    let mut buf = Vec::new();
    {
        let mut encoder = image::codecs::gif::GifEncoder::new(Cursor::new(&mut buf));
        encoder
            .set_repeat(image::codecs::gif::Repeat::Infinite)
            .context("set gif repeat")?;
        for frame in frames {
            let delay = image::Delay::from_numer_denom_ms(delay_ms, 1);
            encoder
                .encode_frame(image::Frame::from_parts(frame.to_rgba8()?, 0, 0, delay))
                .context("encode gif frame")?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
