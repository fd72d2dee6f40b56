use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::postprocess::test_support::Packaged;

#[test]
fn builtin_registry_knows_every_strategy() {
    let p = Packaged::snes(1, |_| crate::foundation::core::Color::WHITE);
    let registry = StrategyRegistry::with_builtin(p.context());
    assert_eq!(
        registry.names(),
        vec![
            "artwork_generation",
            "background",
            "counter",
            "inner_mask",
            "offset_with_siblings",
            "text",
            "translation",
            "vertical_dot_scrollbar",
            "vertical_scrollbar",
        ]
    );
}

#[test]
fn unknown_strategy_is_a_config_error() {
    let p = Packaged::snes(1, |_| crate::foundation::core::Color::WHITE);
    let registry = StrategyRegistry::with_builtin(p.context());
    let err = registry.process(&p.command("sparkle", json!({}))).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("Cannot handle unknown strategy \"sparkle\""));
}

struct Recording {
    seen: Mutex<Vec<String>>,
}

impl PostProcessStrategy for Recording {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn process(&self, command: &PostProcessCommand) -> SkinResult<()> {
        self.seen.lock().unwrap().push(command.package.clone());
        Ok(())
    }
}

#[test]
fn register_replaces_a_strategy_of_the_same_name() {
    let p = Packaged::snes(1, |_| crate::foundation::core::Color::WHITE);
    let mut registry = StrategyRegistry::with_builtin(p.context());
    let recording = Arc::new(Recording {
        seen: Mutex::new(Vec::new()),
    });
    registry.register(recording.clone());
    registry.process(&p.command("counter", json!({}))).unwrap();
    assert_eq!(*recording.seen.lock().unwrap(), vec!["dark".to_string()]);
    assert_eq!(registry.names().len(), 9);
}

#[test]
fn for_each_reports_the_first_failure() {
    let p = Packaged::snes(1, |_| crate::foundation::core::Color::WHITE);
    let ctx = p.context();
    let items = [1, 2, 3];
    let err = ctx
        .for_each(&items, |_, v| {
            if *v == 2 {
                Err(SkinError::render("boom"))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
}

#[test]
fn base_canvas_is_full_size() {
    let p = Packaged::snes(1, |_| crate::foundation::core::Color::BLACK);
    let canvas = p.context().base_canvas(&p.box_path(0)).unwrap();
    assert_eq!(canvas.size(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    assert_eq!(canvas.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
}
