use super::*;

#[test]
fn constructors_fill_progress_fields() {
    assert_eq!(
        StageEvent::started_with_progress("post-process", 3),
        StageEvent::Started {
            name: "post-process".into(),
            has_progress: true,
            total_steps: Some(3),
        }
    );
    assert_eq!(
        StageEvent::started("package"),
        StageEvent::Started {
            name: "package".into(),
            has_progress: false,
            total_steps: None,
        }
    );
    assert_eq!(StageEvent::failed("optimize", "boom").name(), "optimize");
}

#[test]
fn recorder_keeps_arrival_order() {
    let rec = RecordingStageListener::new();
    rec.on_event(&StageEvent::started("package"));
    rec.on_event(&StageEvent::completed("package"));
    let names: Vec<_> = rec.events().iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, vec!["package", "package"]);
    assert!(matches!(rec.events()[1], StageEvent::Completed { .. }));
}

#[test]
fn tracing_listener_accepts_every_variant() {
    let l = TracingStageListener;
    l.on_event(&StageEvent::started_with_progress("preview", 1));
    l.on_event(&StageEvent::progressed("preview", "animated"));
    l.on_event(&StageEvent::failed("preview", "no images"));
}
