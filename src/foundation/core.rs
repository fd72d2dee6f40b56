use serde::{Deserialize, Serialize};

use crate::foundation::error::{SkinError, SkinResult};

pub use kurbo::{Point, Rect, Vec2};

/// Width of every generated artwork image.
pub const CANVAS_WIDTH: u32 = 640;
/// Height of every generated artwork image.
pub const CANVAS_HEIGHT: u32 = 480;

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from channels including alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a color the way template options spell them.
    ///
    /// Accepts CSS-style names (`white`, `silver`, ...), hex with or without `#`
    /// (`RGB`, `RGBA`, `RRGGBB`, `RRGGBBAA`) and `rgb(r, g, b)` / `rgba(r, g, b, a)`.
    pub fn parse(input: &str) -> SkinResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(SkinError::config("color must be non-empty"));
        }
        let lower = s.to_ascii_lowercase();
        if let Some(c) = named_color(&lower) {
            return Ok(c);
        }
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_functional(s, body);
        }
        parse_hex(&lower).ok_or_else(|| SkinError::config(format!("invalid color \"{s}\"")))
    }

    /// Same color with alpha scaled to `pct` percent (0-100).
    pub fn with_opacity_pct(self, pct: f64) -> Self {
        let pct = pct.clamp(0.0, 100.0);
        let a = ((255.0 / 100.0) * pct).floor() as u8;
        Self { a, ..self }
    }

    /// Grey with luma contrasting against this color.
    ///
    /// The luma delta to the opposite grey is clamped to at least 128 and at most 192,
    /// so mid-tones still get a readable partner and extremes do not go fully black/white.
    pub fn inverse(self) -> Self {
        const MAX_CONTRAST: f64 = 192.0;
        const MIN_CONTRAST: f64 = 128.0;

        let y = (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            .round();
        let mut oy = 255.0 - y;
        let dy = oy - y;
        let sign = if dy > 0.0 {
            1.0
        } else if dy < 0.0 {
            -1.0
        } else {
            0.0
        };
        if dy.abs() > MAX_CONTRAST {
            oy = y + sign * MAX_CONTRAST;
        } else if dy.abs() < MIN_CONTRAST {
            oy = y + sign * MIN_CONTRAST;
        }
        let v = oy.clamp(0.0, 255.0) as u8;
        Self::rgb(v, v, v)
    }

    /// Premultiplied channels, as stored in [`crate::Image`].
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let p = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
        [p(self.r), p(self.g), p(self.b), self.a]
    }
}

fn named_color(name: &str) -> Option<Color> {
    let c = match name {
        "transparent" => Color::TRANSPARENT,
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "silver" => Color::rgb(192, 192, 192),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "red" => Color::rgb(255, 0, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "navy" => Color::rgb(0, 0, 128),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "teal" => Color::rgb(0, 128, 128),
        "olive" => Color::rgb(128, 128, 0),
        "pink" => Color::rgb(255, 192, 203),
        "gold" => Color::rgb(255, 215, 0),
        _ => return None,
    };
    Some(c)
}

fn parse_hex(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&s[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
    match s.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_functional(original: &str, body: &str) -> SkinResult<Color> {
    let invalid = || SkinError::config(format!("invalid color \"{original}\""));
    let body = body.strip_suffix(')').ok_or_else(invalid)?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(invalid());
    }
    let channel = |p: &str| -> SkinResult<u8> {
        let v: f64 = p.parse().map_err(|_| invalid())?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };
    let a = match parts.get(3) {
        Some(p) => {
            let v: f64 = p.parse().map_err(|_| invalid())?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

/// Horizontal alignment of a placed element or text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HAlign {
    /// Flush left.
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Vertical alignment of a placed element or text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VAlign {
    /// Flush top.
    Top,
    /// Centered.
    Middle,
    /// Flush bottom.
    Bottom,
}

/// One of the nine compass anchors used when placing an image onto another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top edge, horizontally centered.
    Top,
    /// Top-right corner.
    TopRight,
    /// Left edge, vertically centered.
    Left,
    /// Center.
    Center,
    /// Right edge, vertically centered.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge, horizontally centered.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// Parse a position keyword such as `bottom-right` or `center`.
    pub fn parse(s: &str) -> SkinResult<Self> {
        let a = match s.trim().to_ascii_lowercase().as_str() {
            "top-left" => Self::TopLeft,
            "top" => Self::Top,
            "top-right" => Self::TopRight,
            "left" => Self::Left,
            "center" | "centre" => Self::Center,
            "right" => Self::Right,
            "bottom-left" => Self::BottomLeft,
            "bottom" => Self::Bottom,
            "bottom-right" => Self::BottomRight,
            other => return Err(SkinError::config(format!("unknown position \"{other}\""))),
        };
        Ok(a)
    }

    /// Horizontal component of the anchor.
    pub fn h(self) -> HAlign {
        match self {
            Self::TopLeft | Self::Left | Self::BottomLeft => HAlign::Left,
            Self::Top | Self::Center | Self::Bottom => HAlign::Center,
            Self::TopRight | Self::Right | Self::BottomRight => HAlign::Right,
        }
    }

    /// Vertical component of the anchor.
    pub fn v(self) -> VAlign {
        match self {
            Self::TopLeft | Self::Top | Self::TopRight => VAlign::Top,
            Self::Left | Self::Center | Self::Right => VAlign::Middle,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => VAlign::Bottom,
        }
    }

    /// Top-left pixel at which an element of `inner` size lands inside `outer`.
    ///
    /// Offsets push inward from an anchored edge; on a centered axis positive values
    /// move right/down.
    pub fn resolve(self, outer: (u32, u32), inner: (u32, u32), offset: (i32, i32)) -> (i32, i32) {
        let (ow, oh) = (outer.0 as i32, outer.1 as i32);
        let (iw, ih) = (inner.0 as i32, inner.1 as i32);
        let x = match self.h() {
            HAlign::Left => offset.0,
            HAlign::Center => (ow - iw).div_euclid(2) + offset.0,
            HAlign::Right => ow - iw - offset.0,
        };
        let y = match self.v() {
            VAlign::Top => offset.1,
            VAlign::Middle => (oh - ih).div_euclid(2) + offset.1,
            VAlign::Bottom => oh - ih - offset.1,
        };
        (x, y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
