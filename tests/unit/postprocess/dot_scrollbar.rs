use serde_json::json;

use super::*;
use crate::postprocess::test_support::Packaged;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

#[test]
fn thirty_items_page_over_eighteen_dots() {
    let g = dot_geometry(30, 0);
    assert_eq!(g.dots, 18);
    assert_eq!(g.items_per_page, 2);
    assert_eq!(g.spacing, 9);
    for i in 0..30 {
        assert_eq!(dot_geometry(30, i).active, i / 2, "item {i}");
    }
}

#[test]
fn pages_beyond_the_last_dot_stay_on_it() {
    let g = dot_geometry(40, 39);
    assert_eq!(g.items_per_page, 2);
    assert_eq!(g.active, 17);
}

#[test]
fn few_items_get_one_dot_each() {
    let g = dot_geometry(3, 2);
    assert_eq!((g.dots, g.items_per_page, g.active), (3, 1, 2));
    assert_eq!(g.spacing, 138);
    assert_eq!(dot_center_y(&g, 0), 10);
    assert_eq!(dot_center_y(&g, 2), 302);
}

#[test]
fn single_item_has_no_spacing() {
    let g = dot_geometry(1, 0);
    assert_eq!((g.dots, g.spacing, g.active), (1, 0, 0));
    assert!(dot_scrollbar_image(Color::WHITE, 1, 0).is_ok());
}

#[test]
fn position_maps_to_top_corners() {
    let o = DotScrollbarOptions::from_map(json!({"position": "right"}).as_object().unwrap())
        .unwrap();
    assert_eq!(o.anchor, Anchor::TopRight);
    let o = DotScrollbarOptions::from_map(&Map::new()).unwrap();
    assert_eq!(o.anchor, Anchor::TopLeft);
    assert_eq!(o.color, Color::WHITE);
}

#[test]
fn active_dot_is_a_ring() {
    let p = Packaged::snes(3, |_| Color::BLACK);
    let strategy = DotScrollbarStrategy::new(p.context());
    strategy.process(&p.command(NAME, json!({}))).unwrap();

    // dots centred at x=35, y=100/246/392
    let first = p.read_box(0);
    assert_eq!(first.pixel(35, 100).unwrap(), BLACK);
    assert_eq!(first.pixel(39, 100).unwrap(), WHITE);
    assert_eq!(first.pixel(35, 246).unwrap(), WHITE);

    let second = p.read_box(1);
    assert_eq!(second.pixel(35, 100).unwrap(), WHITE);
    assert_eq!(second.pixel(35, 246).unwrap(), BLACK);
}
