use super::*;

#[test]
fn outermost_step_reaches_target_scale() {
    assert_eq!(scaled_value(640, 0.5, 4, 4), 320);
    assert_eq!(scaled_value(640, 0.5, 4, -4), 320);
}

#[test]
fn center_step_is_identity() {
    assert_eq!(scaled_value(640, 0.5, 4, 0), 640);
    assert_eq!(scaled_value(100, 0.2, 3, 0), 100);
}

#[test]
fn intermediate_steps_are_geometric() {
    // 640 * 0.5^(1/2)
    assert_eq!(scaled_value(640, 0.5, 2, 1), 453);
    // 100 * 0.25^(1/2)
    assert_eq!(scaled_value(100, 0.25, 2, 1), 50);
}

#[test]
fn zero_steps_disable_falloff() {
    assert_eq!(scaled_value(640, 0.5, 0, 3), 640);
}

#[test]
fn steps_beyond_range_clamp_to_outermost() {
    assert_eq!(scaled_value(640, 0.5, 4, 9), 320);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
}
