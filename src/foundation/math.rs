pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Geometric interpolation from `start` (step 0) to `start * multiplier` (step `num_steps`).
///
/// `value(s) = round(start * exp(ln(multiplier) / num_steps * |s|))`. Steps beyond
/// `num_steps` clamp to the outermost value and `num_steps == 0` disables falloff.
pub fn scaled_value(start: i64, multiplier: f64, num_steps: u32, step: i64) -> i64 {
    let step = step.unsigned_abs().min(u64::from(num_steps));
    if num_steps == 0 || step == 0 {
        return start;
    }
    if multiplier <= 0.0 || !multiplier.is_finite() {
        return 0;
    }
    let log_factor = multiplier.ln() / f64::from(num_steps);
    (start as f64 * (log_factor * step as f64).exp()).round() as i64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
