use image::imageops::FilterType;
use vello_cpu::kurbo::Shape as _;

use crate::foundation::core::{Anchor, Color};
use crate::foundation::error::{SkinError, SkinResult};
use crate::render::blur::blur_rgba8_premul;
use crate::render::composite::{
    over, over_in_place, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};

/// A premultiplied RGBA8 surface.
///
/// Every post-process strategy composes these: it reads the generated artwork into one,
/// places overlays onto a blank canvas and hands the result back to the canvas for saving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Surface filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let px = color.to_premul();
        Self {
            width,
            height,
            data: px.repeat(width as usize * height as usize),
        }
    }

    /// Wrap an already premultiplied buffer.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> SkinResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(SkinError::validation(format!(
                "premultiplied buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert a straight-alpha image.
    pub fn from_rgba8(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width,
            height,
            data,
        }
    }

    /// Straight-alpha copy, as encoders expect.
    pub fn to_rgba8(&self) -> SkinResult<image::RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| SkinError::render("image buffer does not match its dimensions"))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Premultiplied bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Composite `src` anchored inside this surface.
    ///
    /// `opacity_pct` is 0..=100. Offsets push inward from anchored edges.
    pub fn place(&mut self, src: &Image, anchor: Anchor, offset: (i32, i32), opacity_pct: f64) {
        let (x, y) = anchor.resolve(self.size(), src.size(), offset);
        self.place_at(src, x, y, (opacity_pct / 100.0) as f32);
    }

    /// Composite `src` with its top-left corner at `(x, y)`; parts outside are clipped.
    pub fn place_at(&mut self, src: &Image, x: i32, y: i32, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width as i32).min(self.width as i32);
        let y1 = (y + src.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for dy in y0..y1 {
            for dx in x0..x1 {
                let si = src.index((dx - x) as u32, (dy - y) as u32);
                let di = self.index(dx as u32, dy as u32);
                let s = [
                    src.data[si],
                    src.data[si + 1],
                    src.data[si + 2],
                    src.data[si + 3],
                ];
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&over(d, s, opacity));
            }
        }
    }

    /// Region `w`x`h` starting at `(x, y)`; pixels outside this surface come back transparent.
    pub fn crop(&self, width: u32, height: u32, x: i32, y: i32) -> Image {
        let mut out = Image::new(width, height);
        for oy in 0..height {
            let sy = y + oy as i32;
            if sy < 0 || sy >= self.height as i32 {
                continue;
            }
            for ox in 0..width {
                let sx = x + ox as i32;
                if sx < 0 || sx >= self.width as i32 {
                    continue;
                }
                let si = self.index(sx as u32, sy as u32);
                let oi = out.index(ox, oy);
                out.data[oi..oi + 4].copy_from_slice(&self.data[si..si + 4]);
            }
        }
        out
    }

    /// Remove borders matching the top-left pixel within `tolerance` per channel.
    ///
    /// A uniform surface trims down to a single pixel.
    pub fn trim(&self, tolerance: u8) -> Image {
        let Some(reference) = self.pixel(0, 0) else {
            return self.clone();
        };
        let differs = |px: &[u8]| {
            px.iter()
                .zip(reference.iter())
                .any(|(a, b)| a.abs_diff(*b) > tolerance)
        };

        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.index(x, y);
                if differs(&self.data[i..i + 4]) {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if min_x == u32::MAX {
            return self.crop(1, 1, 0, 0);
        }
        self.crop(
            max_x - min_x + 1,
            max_y - min_y + 1,
            min_x as i32,
            min_y as i32,
        )
    }

    /// Resample to exactly `width`x`height`.
    pub fn resize(&self, width: u32, height: u32) -> SkinResult<Image> {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == self.size() {
            return Ok(self.clone());
        }
        let buf = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| SkinError::render("image buffer does not match its dimensions"))?;
        // Triangle filtering of premultiplied data stays premultiplied.
        let resized = image::imageops::resize(&buf, width, height, FilterType::Triangle);
        Ok(Image {
            width,
            height,
            data: resized.into_raw(),
        })
    }

    /// Scale to `height`, keeping the aspect ratio.
    pub fn scale_to_height(&self, height: u32) -> SkinResult<Image> {
        if self.height == 0 {
            return Ok(self.clone());
        }
        let width = (f64::from(self.width) * f64::from(height) / f64::from(self.height)).round();
        self.resize(width as u32, height)
    }

    /// Shrink to `width`, keeping the aspect ratio. Narrower images are left alone.
    pub fn scale_down_to_width(&self, width: u32) -> SkinResult<Image> {
        if self.width <= width || self.width == 0 {
            return Ok(self.clone());
        }
        let height = (f64::from(self.height) * f64::from(width) / f64::from(self.width)).round();
        self.resize(width, height as u32)
    }

    /// Rotate clockwise by `degrees`, growing to the rotated bounding box.
    pub fn rotate(&self, degrees: f64) -> Image {
        if degrees.rem_euclid(360.0) == 0.0 || self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let theta = degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let nw = (w * cos.abs() + h * sin.abs() - 1e-6).ceil().max(1.0) as u32;
        let nh = (w * sin.abs() + h * cos.abs() - 1e-6).ceil().max(1.0) as u32;

        let (scx, scy) = (w / 2.0, h / 2.0);
        let (dcx, dcy) = (f64::from(nw) / 2.0, f64::from(nh) / 2.0);
        let mut out = Image::new(nw, nh);
        for y in 0..nh {
            for x in 0..nw {
                let dx = f64::from(x) + 0.5 - dcx;
                let dy = f64::from(y) + 0.5 - dcy;
                let sx = cos * dx + sin * dy + scx;
                let sy = -sin * dx + cos * dy + scy;
                let px = self.sample_bilinear(sx - 0.5, sy - 0.5);
                let oi = out.index(x, y);
                out.data[oi..oi + 4].copy_from_slice(&px);
            }
        }
        out
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> [u8; 4] {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let fetch = |xi: f64, yi: f64| -> [f64; 4] {
            if xi < 0.0 || yi < 0.0 || xi >= f64::from(self.width) || yi >= f64::from(self.height)
            {
                return [0.0; 4];
            }
            let i = self.index(xi as u32, yi as u32);
            [
                f64::from(self.data[i]),
                f64::from(self.data[i + 1]),
                f64::from(self.data[i + 2]),
                f64::from(self.data[i + 3]),
            ]
        };
        let p00 = fetch(x0, y0);
        let p10 = fetch(x0 + 1.0, y0);
        let p01 = fetch(x0, y0 + 1.0);
        let p11 = fetch(x0 + 1.0, y0 + 1.0);
        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = p00[c] * (1.0 - fx) + p10[c] * fx;
            let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }

    /// Luma greyscale; alpha is untouched.
    pub fn greyscale(&self) -> Image {
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(4) {
            let l = (0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2]))
                .round()
                .clamp(0.0, 255.0) as u8;
            px[0] = l;
            px[1] = l;
            px[2] = l;
        }
        out
    }

    /// Gaussian blur with `sigma = radius / 2`.
    pub fn blur(&self, radius: u32) -> SkinResult<Image> {
        let sigma = (radius as f32 * 0.5).max(0.5);
        let data = blur_rgba8_premul(&self.data, self.width, self.height, radius, sigma)?;
        Ok(Image {
            width: self.width,
            height: self.height,
            data,
        })
    }

    /// Replace each `block`x`block` cell by its average.
    pub fn pixelate(&self, block: u32) -> Image {
        if block <= 1 {
            return self.clone();
        }
        let mut out = self.clone();
        for by in (0..self.height).step_by(block as usize) {
            for bx in (0..self.width).step_by(block as usize) {
                let ex = (bx + block).min(self.width);
                let ey = (by + block).min(self.height);
                let mut sum = [0u32; 4];
                let mut n = 0u32;
                for y in by..ey {
                    for x in bx..ex {
                        let i = self.index(x, y);
                        for c in 0..4 {
                            sum[c] += u32::from(self.data[i + c]);
                        }
                        n += 1;
                    }
                }
                let avg = sum.map(|s| ((s + n / 2) / n) as u8);
                for y in by..ey {
                    for x in bx..ex {
                        let i = out.index(x, y);
                        out.data[i..i + 4].copy_from_slice(&avg);
                    }
                }
            }
        }
        out
    }

    /// Scale every channel by `factor` (0..=1).
    pub fn multiply_alpha(&mut self, factor: f32) {
        let f = factor.clamp(0.0, 1.0);
        if f >= 1.0 {
            return;
        }
        for c in &mut self.data {
            *c = (f32::from(*c) * f).round() as u8;
        }
    }

    /// Anti-aliased axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) -> SkinResult<()> {
        let rect = vello_cpu::kurbo::Rect::new(x, y, x + width, y + height);
        self.rasterize(color, |ctx| ctx.fill_rect(&rect))
    }

    /// Anti-aliased filled circle around `(cx, cy)`.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) -> SkinResult<()> {
        let path = vello_cpu::kurbo::Circle::new((cx, cy), radius).to_path(0.1);
        self.rasterize(color, |ctx| ctx.fill_path(&path))
    }

    /// Ring of `stroke_width` centred on the circle's radius.
    pub fn stroke_circle(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        stroke_width: f64,
        color: Color,
    ) -> SkinResult<()> {
        let path = vello_cpu::kurbo::Circle::new((cx, cy), radius).to_path(0.1);
        self.rasterize(color, |ctx| {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_width));
            ctx.stroke_path(&path);
        })
    }

    fn rasterize(
        &mut self,
        color: Color,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> SkinResult<()> {
        let (w, h) = surface_dims(self.width, self.height)?;
        if w == 0 || h == 0 || color.a == 0 {
            return Ok(());
        }
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        draw(&mut ctx);
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        over_in_place(&mut self.data, pixmap.data_as_u8_slice(), 1.0)
    }
}

pub(crate) fn surface_dims(width: u32, height: u32) -> SkinResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SkinError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SkinError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/image.rs"]
mod tests;
