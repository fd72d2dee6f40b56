use serde_json::json;

use super::*;
use crate::canvas::ImageCanvas;
use crate::foundation::core::Color;
use crate::postprocess::test_support::Packaged;

fn options(v: Value) -> SkinResult<BackgroundOptions> {
    BackgroundOptions::from_map(v.as_object().unwrap())
}

#[test]
fn at_least_one_layer_is_required() {
    let err = options(json!({"use_background_default": true})).unwrap_err();
    assert!(err.is_config());
    assert!(options(json!({"overlay": "o.png"})).is_ok());
}

#[test]
fn default_background_only_when_enabled() {
    let o = options(json!({"background": "bg.png", "background_default": "def.png"})).unwrap();
    assert_eq!(o.underlays(), vec!["bg.png"]);
    let o = options(json!({
        "background": "bg.png",
        "background_default": "def.png",
        "use_background_default": true
    }))
    .unwrap();
    assert_eq!(o.underlays(), vec!["def.png", "bg.png"]);
}

fn half_painted(p: &Packaged) {
    let mut img = Image::new(640, 480);
    img.fill_rect(0.0, 0.0, 320.0, 480.0, Color::rgb(200, 0, 0)).unwrap();
    p.canvas.save(&img, &p.box_path(0)).unwrap();
}

#[test]
fn layers_stack_under_and_over_the_artwork() {
    let p = Packaged::snes(1, |_| Color::BLACK);
    half_painted(&p);
    let res = p.resources();
    p.canvas
        .save(&Image::filled(640, 480, Color::rgb(0, 0, 200)), &res.join("bg.png"))
        .unwrap();
    p.canvas
        .save(&Image::filled(10, 10, Color::rgb(0, 200, 0)), &res.join("frame.png"))
        .unwrap();

    let strategy = BackgroundStrategy::new(p.context());
    strategy
        .process(&p.command(NAME, json!({"background": "bg.png", "overlay": "frame.png"})))
        .unwrap();

    let img = p.read_box(0);
    assert_eq!(img.pixel(400, 100).unwrap(), [0, 0, 200, 255]);
    assert_eq!(img.pixel(100, 100).unwrap(), [200, 0, 0, 255]);
    assert_eq!(img.pixel(5, 5).unwrap(), [0, 200, 0, 255]);
}

#[test]
fn missing_layer_fails_before_any_image_is_touched() {
    let p = Packaged::snes(1, |_| Color::BLACK);
    let strategy = BackgroundStrategy::new(p.context());
    let err = strategy
        .process(&p.command(NAME, json!({"background": "absent.png"})))
        .unwrap_err();
    assert!(err.to_string().contains("absent.png"));
    assert_eq!(p.read_box(0).pixel(0, 0).unwrap(), [0, 0, 0, 255]);
}
