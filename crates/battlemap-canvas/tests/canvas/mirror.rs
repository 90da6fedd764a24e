use std::time::{Duration, Instant};

use battlemap_canvas::{
    presentation_channel, CreatureSize, Encounter, GridCell, Rect, Snapshot, SnapshotSink,
    StateMirror, Token, TokenKind,
};

fn encounter_with_token() -> Encounter {
    let mut encounter = Encounter::new("Goblin Cave");
    encounter.tokens.push(Token::new(
        "Goblin",
        TokenKind::Monster,
        CreatureSize::Small,
        GridCell::new(2, 2),
    ));
    encounter
}

#[test]
fn test_changes_coalesce_into_one_push() {
    let (sink, mut receiver) = presentation_channel();
    let mut mirror = StateMirror::new(sink);
    let mut encounter = encounter_with_token();
    let t0 = Instant::now();

    mirror.notify(&encounter, None, t0);
    assert!(!mirror.poll(&encounter, None, t0 + Duration::from_millis(50)));

    encounter.tokens[0].grid_x = 5;
    mirror.notify(&encounter, None, t0 + Duration::from_millis(80));
    assert!(!mirror.poll(&encounter, None, t0 + Duration::from_millis(150)));
    assert!(!receiver.has_update());

    assert!(mirror.poll(&encounter, None, t0 + Duration::from_millis(180)));
    assert!(receiver.has_update());
    let snapshot = receiver.latest().unwrap().unwrap();
    assert_eq!(snapshot.sequence, 1);
    assert_eq!(snapshot.encounter.tokens[0].grid_x, 5);
    assert_eq!(mirror.sequence(), 1);
}

#[test]
fn test_irrelevant_change_does_not_schedule() {
    let (sink, _receiver) = presentation_channel();
    let mut mirror = StateMirror::new(sink);
    let mut encounter = encounter_with_token();
    let t0 = Instant::now();

    mirror.notify(&encounter, None, t0);
    mirror.poll(&encounter, None, t0 + Duration::from_millis(100));
    assert!(!mirror.is_pending());

    encounter.view.zoom = 2.0;
    encounter.name = "Renamed".to_string();
    mirror.notify(&encounter, None, t0 + Duration::from_millis(200));
    assert!(!mirror.is_pending());
}

#[test]
fn test_bounds_and_fog_changes_are_relevant() {
    let (sink, _receiver) = presentation_channel();
    let mut mirror = StateMirror::new(sink);
    let mut encounter = encounter_with_token();
    let t0 = Instant::now();

    mirror.notify(&encounter, None, t0);
    mirror.push_now(&encounter, None);

    mirror.notify(&encounter, Some(Rect::new(0.0, 0.0, 200.0, 200.0)), t0);
    assert!(mirror.is_pending());
    mirror.push_now(&encounter, Some(Rect::new(0.0, 0.0, 200.0, 200.0)));

    encounter.fog_of_war.clear_all(500.0, 500.0).unwrap();
    mirror.notify(&encounter, Some(Rect::new(0.0, 0.0, 200.0, 200.0)), t0);
    assert!(mirror.is_pending());
}

#[test]
fn test_resend_request_answered_immediately() {
    let (sink, mut receiver) = presentation_channel();
    let mut mirror = StateMirror::new(sink);
    let encounter = encounter_with_token();
    let bounds = Some(Rect::new(10.0, 10.0, 300.0, 200.0));

    receiver.request_resend().unwrap();
    assert!(mirror.poll(&encounter, bounds, Instant::now()));

    let snapshot = receiver.latest().unwrap().unwrap();
    assert_eq!(snapshot.presentation_bounds, bounds);
    assert_eq!(snapshot.encounter.name, "Goblin Cave");
}

#[test]
fn test_push_loss_is_dropped_not_retried() {
    let (sink, receiver) = presentation_channel();
    drop(receiver);
    let mut mirror = StateMirror::with_delay(sink, Duration::from_millis(10));
    let encounter = encounter_with_token();
    let t0 = Instant::now();

    mirror.notify(&encounter, None, t0);
    assert!(!mirror.poll(&encounter, None, t0 + Duration::from_millis(10)));
    assert!(!mirror.is_pending());
    assert!(!mirror.poll(&encounter, None, t0 + Duration::from_millis(50)));
    assert!(!mirror.sink().is_listening());
}

#[test]
fn test_snapshot_json_carries_fog() {
    let mut encounter = encounter_with_token();
    encounter.fog_of_war.clear_all(100.0, 100.0).unwrap();
    let snapshot = Snapshot {
        sequence: 7,
        encounter,
        presentation_bounds: None,
    };
    let parsed = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(parsed, snapshot);
    assert_eq!(parsed.encounter.fog_of_war.revealed_areas().len(), 1);
}

#[tokio::test]
async fn test_receiver_waits_for_next_snapshot() {
    let (mut sink, mut receiver) = presentation_channel();
    let snapshot = Snapshot {
        sequence: 1,
        encounter: encounter_with_token(),
        presentation_bounds: None,
    };
    sink.push_snapshot(&snapshot).unwrap();
    let received = receiver.changed().await.unwrap();
    assert_eq!(received.sequence, 1);
    assert!(!receiver.has_update());
}
