use std::time::{Duration, Instant};

use battlemap_canvas::fog::composite;
use battlemap_canvas::{
    FogArea, FogCompositor, FogGesture, FogOperation, FogShape, FogState, FogToolSettings,
    FogToolShape, Point, Rect,
};

const REVEAL_A: &str = r#"{"id":"00000000-0000-0000-0000-00000000000a","kind":"rectangle","x":0,"y":0,"width":200,"height":200,"createdAt":1}"#;
const REVEAL_B: &str = r#"{"id":"00000000-0000-0000-0000-00000000000b","kind":"rectangle","x":90,"y":90,"width":20,"height":20,"createdAt":3}"#;
const HIDE_CIRCLE: &str = r#"{"id":"00000000-0000-0000-0000-00000000000c","kind":"circle","x":100,"y":100,"radius":50,"createdAt":2}"#;

fn fog_json(revealed: &[&str], hidden: &[&str]) -> FogState {
    let json = format!(
        r##"{{"enabled":true,"color":"#000000","opacity":1.0,"revealedAreas":[{}],"hiddenAreas":[{}]}}"##,
        revealed.join(","),
        hidden.join(",")
    );
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_later_hide_covers_earlier_reveal() {
    let fog = fog_json(&[REVEAL_A], &[HIDE_CIRCLE]);
    let raster = composite(&fog, 300, 300).unwrap();

    assert!(raster.is_fogged(100, 100), "circle centre should be fogged");
    assert!(raster.is_fogged(100, 70), "inside the circle should be fogged");
    assert!(!raster.is_fogged(10, 10), "rest of the reveal should be clear");
    assert!(!raster.is_fogged(190, 20));
    assert!(raster.is_fogged(250, 250), "outside every reveal stays fogged");
}

#[test]
fn test_replay_ignores_list_storage_order() {
    let forward = composite(&fog_json(&[REVEAL_A, REVEAL_B], &[HIDE_CIRCLE]), 300, 300).unwrap();
    let reversed = composite(&fog_json(&[REVEAL_B, REVEAL_A], &[HIDE_CIRCLE]), 300, 300).unwrap();

    for (x, y) in [(100, 100), (100, 70), (10, 10), (250, 250)] {
        assert_eq!(forward.alpha_at(x, y), reversed.alpha_at(x, y), "pixel ({x}, {y})");
    }
    assert!(!forward.is_fogged(100, 100), "reveal at t=3 reopens the centre");
    assert!(forward.is_fogged(100, 70));
}

#[test]
fn test_earlier_hide_is_overridden_by_later_reveal() {
    let hide_first = HIDE_CIRCLE.replace("\"createdAt\":2", "\"createdAt\":1");
    let reveal_later = REVEAL_A.replace("\"createdAt\":1", "\"createdAt\":2");
    let fog = fog_json(&[&reveal_later], &[&hide_first]);
    let raster = composite(&fog, 300, 300).unwrap();
    assert!(!raster.is_fogged(100, 100));
}

#[test]
fn test_equal_timestamps_hide_wins() {
    let hide_same = HIDE_CIRCLE.replace("\"createdAt\":2", "\"createdAt\":1");
    let fog = fog_json(&[REVEAL_A], &[&hide_same]);
    let raster = composite(&fog, 300, 300).unwrap();
    assert!(raster.is_fogged(100, 100));
    assert!(!raster.is_fogged(10, 10));
}

#[test]
fn test_fog_uses_configured_opacity() {
    let mut fog = FogState::default();
    fog.set_opacity(0.5).unwrap();
    let raster = composite(&fog, 10, 10).unwrap();
    assert_eq!(raster.alpha_at(5, 5), Some(128));
    assert_eq!(raster.alpha_at(10, 10), None);
}

#[test]
fn test_area_without_timestamp_rejected() {
    let json = r#"{"id":"00000000-0000-0000-0000-00000000000a","kind":"rectangle","x":0,"y":0,"width":20,"height":20}"#;
    assert!(serde_json::from_str::<FogArea>(json).is_err());
}

#[test]
fn test_degenerate_areas_never_added() {
    let mut fog = FogState::default();
    assert!(fog.reveal(FogShape::rectangle(Rect::new(0.0, 0.0, 0.0, 20.0))).is_err());
    assert!(fog.hide(FogShape::circle(Point::new(5.0, 5.0), -1.0)).is_err());
    assert!(fog
        .reveal(FogShape::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 20.0)],
        })
        .is_err());
    assert!(fog.reveal(FogShape::rectangle(Rect::new(f64::NAN, 0.0, 5.0, 5.0))).is_err());
    assert_eq!(fog.area_count(), 0);
}

#[test]
fn test_timestamps_strictly_increase() {
    let mut fog = FogState::default();
    for i in 0..5 {
        fog.reveal(FogShape::rectangle(Rect::new(f64::from(i), 0.0, 10.0, 10.0)))
            .unwrap();
    }
    let stamps: Vec<u64> = fog.revealed_areas().iter().map(FogArea::created_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_remove_area_by_id() {
    let mut fog = FogState::default();
    let id = fog
        .hide(FogShape::circle(Point::new(10.0, 10.0), 5.0))
        .unwrap();
    assert!(fog.remove_area(id));
    assert!(!fog.remove_area(id));
    assert_eq!(fog.area_count(), 0);
}

#[test]
fn test_clear_all_then_reset() {
    let mut fog = FogState::default();
    fog.hide(FogShape::circle(Point::new(50.0, 50.0), 20.0)).unwrap();

    fog.clear_all(300.0, 200.0).unwrap();
    assert_eq!(fog.revealed_areas().len(), 1);
    assert!(fog.hidden_areas().is_empty());
    let cleared = composite(&fog, 300, 200).unwrap();
    assert!((0..300).step_by(37).all(|x| (0..200)
        .step_by(23)
        .all(|y| !cleared.is_fogged(x, y))));

    fog.reset();
    assert!(fog.enabled());
    let reset = composite(&fog, 300, 200).unwrap();
    assert!((0..300).step_by(37).all(|x| (0..200)
        .step_by(23)
        .all(|y| reset.is_fogged(x, y))));
}

#[test]
fn test_reset_preserves_disabled_flag() {
    let mut fog = FogState::default();
    fog.set_enabled(false);
    fog.clear_all(100.0, 100.0).unwrap();
    fog.reset();
    assert!(!fog.enabled());
    assert_eq!(fog.area_count(), 0);
}

#[test]
fn test_compositor_rebuilds_only_on_change() {
    let mut fog = FogState::default();
    let mut compositor = FogCompositor::new();

    compositor.raster(&fog, 100, 100).unwrap();
    compositor.raster(&fog, 100, 100).unwrap();
    assert_eq!(compositor.rebuild_count(), 1);

    fog.reveal(FogShape::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0)))
        .unwrap();
    let raster = compositor.raster(&fog, 100, 100).unwrap().unwrap();
    assert!(!raster.is_fogged(10, 10));
    assert_eq!(compositor.rebuild_count(), 2);

    compositor.raster(&fog, 120, 100).unwrap();
    assert_eq!(compositor.rebuild_count(), 3);
}

#[test]
fn test_disabled_fog_yields_no_raster() {
    let mut fog = FogState::default();
    fog.set_enabled(false);
    let mut compositor = FogCompositor::new();
    assert!(compositor.raster(&fog, 100, 100).unwrap().is_none());
    assert_eq!(compositor.rebuild_count(), 0);
}

#[test]
fn test_hide_operation_recorded_in_hidden_list() {
    let mut fog = FogState::default();
    fog.apply(FogOperation::Hide, FogShape::circle(Point::new(1.0, 1.0), 3.0))
        .unwrap();
    assert_eq!(fog.hidden_areas().len(), 1);
    assert!(fog.revealed_areas().is_empty());
}

#[test]
fn test_brush_stamps_on_interval_when_moved() {
    let mut gesture = FogGesture::default();
    let t0 = Instant::now();
    let interval = gesture.settings().brush_interval;

    gesture.begin(FogToolShape::Brush, Point::new(0.0, 0.0), t0);
    gesture.update(Point::new(100.0, 0.0));
    gesture.tick(t0 + interval);
    // pointer has not moved since the last stamp
    gesture.tick(t0 + interval * 2);
    gesture.update(Point::new(102.0, 0.0));
    gesture.tick(t0 + interval * 3);

    assert_eq!(gesture.preview().len(), 2);
    let shapes = gesture.finish(Point::new(102.0, 0.0));
    assert_eq!(shapes.len(), 2);
    assert!(shapes
        .iter()
        .all(|s| matches!(s, FogShape::Circle { radius, .. } if *radius == 40.0)));
    assert!(!gesture.is_active());
}

#[test]
fn test_circle_drag_radius_is_drag_distance() {
    let mut gesture = FogGesture::default();
    gesture.begin(FogToolShape::Circle, Point::new(10.0, 10.0), Instant::now());
    gesture.update(Point::new(40.0, 50.0));
    let shapes = gesture.finish(Point::new(40.0, 50.0));
    assert_eq!(shapes, vec![FogShape::circle(Point::new(10.0, 10.0), 50.0)]);
}

#[test]
fn test_cancel_stroke_keeps_polygon() {
    let mut gesture = FogGesture::default();
    gesture.polygon_click(Point::new(0.0, 0.0), 10.0);
    gesture.polygon_click(Point::new(50.0, 0.0), 10.0);
    gesture.cancel_stroke();
    assert!(gesture.is_polygon());
    gesture.cancel();
    assert!(!gesture.is_active());
}

#[test]
fn test_zero_brush_interval_stamps_once_per_tick() {
    let mut gesture = FogGesture::new(FogToolSettings {
        brush_interval: Duration::ZERO,
        ..FogToolSettings::default()
    });
    let t0 = Instant::now();

    gesture.begin(FogToolShape::Brush, Point::new(0.0, 0.0), t0);
    gesture.update(Point::new(100.0, 0.0));
    gesture.tick(t0 + Duration::from_millis(10));
    gesture.update(Point::new(200.0, 0.0));
    gesture.tick(t0 + Duration::from_millis(10));

    assert_eq!(gesture.preview().len(), 3);
}

#[test]
fn test_missed_intervals_collapse_into_one_stamp() {
    let mut gesture = FogGesture::default();
    let t0 = Instant::now();
    let interval = gesture.settings().brush_interval;

    gesture.begin(FogToolShape::Brush, Point::new(0.0, 0.0), t0);
    gesture.update(Point::new(100.0, 0.0));
    gesture.tick(t0 + interval * 1000);
    gesture.tick(t0 + interval * 1000 + interval / 2);

    assert_eq!(gesture.preview().len(), 2);
}

#[test]
fn test_max_timestamp_in_stored_log_is_an_error() {
    let last = format!(
        r#"{{"id":"00000000-0000-0000-0000-00000000000d","kind":"rectangle","x":0,"y":0,"width":20,"height":20,"createdAt":{}}}"#,
        u64::MAX
    );
    let mut fog = fog_json(&[&last], &[]);
    let rect = FogShape::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0));

    let err = fog.hide(rect).unwrap_err();
    assert!(err.is_fog_error());
    assert!(fog.next_timestamp().is_err());
    assert!(fog.clear_all(100.0, 100.0).is_err());
    assert_eq!(fog.area_count(), 1);

    fog.reset();
    assert!(fog.reveal(FogShape::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0))).is_ok());
}
