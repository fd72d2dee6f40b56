use crate::foundation::error::{SkinError, SkinResult};

/// Q16 fixed-point one.
const ONE: i64 = 1 << 16;

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Separable Gaussian blur over a premultiplied RGBA8 buffer.
///
/// Edges clamp to the nearest pixel. `radius == 0` returns a copy of `src`.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> SkinResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SkinError::render("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(SkinError::validation(format!(
            "blur buffer holds {} bytes, {width}x{height} needs {len}",
            src.len()
        )));
    }
    if radius == 0 || len == 0 {
        return Ok(src.to_vec());
    }

    let taps = kernel(radius, sigma)?;
    let (w, h) = (width as usize, height as usize);
    let across = convolve(src, w, h, &taps, Axis::Horizontal);
    Ok(convolve(&across, w, h, &taps, Axis::Vertical))
}

/// Normalised Q16 taps for `-radius..=radius`; rounding drift lands on the centre tap.
fn kernel(radius: u32, sigma: f32) -> SkinResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SkinError::validation("blur sigma must be > 0"));
    }
    let r = i64::from(radius);
    let two_s2 = 2.0 * f64::from(sigma).powi(2);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / two_s2).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(SkinError::render("gaussian kernel sum is zero"));
    }

    let mut taps: Vec<i64> = raw
        .iter()
        .map(|w| ((w / total) * ONE as f64).round() as i64)
        .map(|q| q.clamp(0, ONE))
        .collect();
    let drift = ONE - taps.iter().sum::<i64>();
    let mid = taps.len() / 2;
    taps[mid] = (taps[mid] + drift).clamp(0, ONE);
    Ok(taps.into_iter().map(|q| q as u32).collect())
}

fn convolve(src: &[u8], w: usize, h: usize, taps: &[u32], axis: Axis) -> Vec<u8> {
    let r = (taps.len() / 2) as isize;
    let mut out = vec![0u8; src.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (k, &tap) in taps.iter().enumerate() {
                let d = k as isize - r;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x as isize + d).clamp(0, w as isize - 1) as usize, y),
                    Axis::Vertical => (x, (y as isize + d).clamp(0, h as isize - 1) as usize),
                };
                let at = (sy * w + sx) * 4;
                for (c, sum) in acc.iter_mut().enumerate() {
                    *sum += u64::from(tap) * u64::from(src[at + c]);
                }
            }
            let at = (y * w + x) * 4;
            for (c, sum) in acc.into_iter().enumerate() {
                out[at + c] = ((sum + (ONE as u64 / 2)) >> 16).min(255) as u8;
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
