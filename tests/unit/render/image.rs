use super::*;

const RED: Color = Color::rgb(255, 0, 0);

#[test]
fn place_centers_with_offsets() {
    let mut canvas = Image::new(10, 10);
    let dot = Image::filled(2, 2, RED);
    canvas.place(&dot, Anchor::Center, (1, -1), 100.0);
    assert_eq!(canvas.pixel(5, 3), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(4, 4), Some([0, 0, 0, 0]));
}

#[test]
fn place_bottom_right_pushes_inward() {
    let mut canvas = Image::new(10, 10);
    let dot = Image::filled(1, 1, RED);
    canvas.place(&dot, Anchor::BottomRight, (2, 3), 100.0);
    assert_eq!(canvas.pixel(7, 6), Some([255, 0, 0, 255]));
}

#[test]
fn place_clips_outside_and_respects_opacity() {
    let mut canvas = Image::filled(4, 4, Color::BLACK);
    let white = Image::filled(4, 4, Color::WHITE);
    canvas.place_at(&white, 2, -2, 0.5);
    assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
    let p = canvas.pixel(3, 1).unwrap();
    assert!((126..=129).contains(&p[0]));
    assert_eq!(p[3], 255);
    assert_eq!(canvas.pixel(3, 2), Some([0, 0, 0, 255]));
}

#[test]
fn crop_outside_is_transparent() {
    let img = Image::filled(4, 4, RED);
    let out = img.crop(4, 4, 2, 2);
    assert_eq!(out.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(2, 2), Some([0, 0, 0, 0]));
}

#[test]
fn trim_removes_uniform_border() {
    let mut img = Image::new(10, 8);
    img.place_at(&Image::filled(3, 2, RED), 4, 5, 1.0);
    let trimmed = img.trim(0);
    assert_eq!(trimmed.size(), (3, 2));
    assert_eq!(trimmed.pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn trim_of_uniform_image_is_single_pixel() {
    let img = Image::filled(5, 5, Color::WHITE);
    assert_eq!(img.trim(0).size(), (1, 1));
}

#[test]
fn scale_helpers_keep_aspect_ratio() {
    let img = Image::filled(640, 480, RED);
    assert_eq!(img.scale_to_height(240).unwrap().size(), (320, 240));
    assert_eq!(img.scale_down_to_width(320).unwrap().size(), (320, 240));
    assert_eq!(img.scale_down_to_width(800).unwrap().size(), (640, 480));
}

#[test]
fn rotate_90_swaps_dimensions_and_turns_clockwise() {
    let mut img = Image::new(4, 2);
    img.place_at(&Image::filled(1, 1, RED), 0, 0, 1.0);
    let rotated = img.rotate(90.0);
    assert_eq!(rotated.size(), (2, 4));
    assert_eq!(rotated.pixel(1, 0), Some([255, 0, 0, 255]));
}

#[test]
fn rotate_45_grows_bounding_box() {
    let img = Image::filled(10, 10, RED);
    let rotated = img.rotate(45.0);
    assert_eq!(rotated.size(), (15, 15));
    assert_eq!(rotated.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(rotated.pixel(7, 7), Some([255, 0, 0, 255]));
}

#[test]
fn greyscale_uses_luma() {
    let img = Image::filled(1, 1, RED).greyscale();
    assert_eq!(img.pixel(0, 0), Some([76, 76, 76, 255]));
}

#[test]
fn pixelate_averages_blocks() {
    let mut img = Image::filled(2, 1, Color::BLACK);
    img.place_at(&Image::filled(1, 1, Color::WHITE), 1, 0, 1.0);
    let out = img.pixelate(2);
    assert_eq!(out.pixel(0, 0), out.pixel(1, 0));
    assert_eq!(out.pixel(0, 0).unwrap()[0], 128);
}

#[test]
fn multiply_alpha_scales_premultiplied_channels() {
    let mut img = Image::filled(1, 1, Color::WHITE);
    img.multiply_alpha(0.5);
    assert_eq!(img.pixel(0, 0), Some([128, 128, 128, 128]));
}

#[test]
fn shapes_rasterise_inside_and_leave_outside_clear() {
    let mut img = Image::new(20, 20);
    img.fill_rect(2.0, 2.0, 4.0, 4.0, RED).unwrap();
    assert_eq!(img.pixel(3, 3), Some([255, 0, 0, 255]));
    assert_eq!(img.pixel(10, 10), Some([0, 0, 0, 0]));

    img.fill_circle(14.0, 14.0, 4.0, Color::WHITE).unwrap();
    assert_eq!(img.pixel(14, 14), Some([255, 255, 255, 255]));

    let mut ring = Image::new(20, 20);
    ring.stroke_circle(10.0, 10.0, 6.0, 2.0, Color::WHITE).unwrap();
    assert_eq!(ring.pixel(10, 10), Some([0, 0, 0, 0]));
    assert!(ring.pixel(15, 10).unwrap()[3] >= 250);
}

#[test]
fn rgba8_round_trip_preserves_opaque_pixels() {
    let mut src = image::RgbaImage::new(2, 1);
    src.put_pixel(0, 0, image::Rgba([10, 20, 30, 255]));
    src.put_pixel(1, 0, image::Rgba([200, 100, 50, 0]));
    let img = Image::from_rgba8(src);
    assert_eq!(img.pixel(1, 0), Some([0, 0, 0, 0]));
    let back = img.to_rgba8().unwrap();
    assert_eq!(back.get_pixel(0, 0).0, [10, 20, 30, 255]);
}

#[test]
fn from_premul_rejects_bad_length() {
    assert!(Image::from_premul(2, 2, vec![0; 3]).is_err());
}
