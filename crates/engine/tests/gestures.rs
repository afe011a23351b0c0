//! Drag and resize gestures end to end.

mod common;

use assert_matches::assert_matches;
use common::{approx, test_store, ScriptedBackend, CONTAINER_ID};
use hotspot_core::dimensions::Measurement;
use hotspot_core::geometry::{max_scale_in_safe_zone, SafeZoneProfile, Size};
use hotspot_core::hotspot::MIN_SCALE;
use hotspot_core::style::{HotspotStyle, StyleFamily, StyleTone};
use hotspot_engine::{EngineError, InputSource, InteractionController, PointerCapture, PointerSample};
use hotspot_events::{EditorEvent, EditorEventKind, GestureKind, GestureOutcome};
use tokio::sync::broadcast;

fn gesture_endings(rx: &mut broadcast::Receiver<EditorEvent>) -> Vec<(GestureKind, GestureOutcome)> {
    let mut endings = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let EditorEventKind::GestureEnded { gesture, outcome } = event.kind {
            endings.push((gesture, outcome));
        }
    }
    endings
}

// ---------------------------------------------------------------------------
// Drag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drag_moves_locally_and_persists_on_release() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    store.settle().await;
    let mut rx = store.subscribe();
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(h.id, PointerSample::mouse(500.0, 500.0)).unwrap();
    assert_eq!(controller.state().dragging, Some(h.id));

    controller.pointer_move(PointerSample::mouse(600.0, 500.0));
    assert!(approx(store.get(h.id).unwrap().x, 0.6));
    controller.pointer_move(PointerSample::mouse(700.0, 450.0));
    store.settle().await;
    assert!(backend.updates().is_empty(), "no writes mid-drag");

    assert_eq!(
        controller.pointer_up(PointerSample::mouse(700.0, 450.0)).unwrap(),
        GestureKind::Drag
    );
    store.settle().await;

    let updates = backend.updates();
    assert_eq!(updates.len(), 1);
    assert!(approx(updates[0].1.x, 0.7));
    assert!(approx(updates[0].1.y, 0.45));
    assert!(controller.is_idle());
    assert_eq!(
        gesture_endings(&mut rx),
        vec![(GestureKind::Drag, GestureOutcome::Completed)]
    );
}

#[tokio::test]
async fn drag_keeps_grab_offset() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    let mut controller = InteractionController::new(store.clone());

    // Grab 20px right of center, move the pointer 100px right.
    controller.begin_drag(h.id, PointerSample::mouse(520.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::mouse(620.0, 500.0));

    assert!(approx(store.get(h.id).unwrap().x, 0.6));
}

#[tokio::test]
async fn drag_is_clamped_to_safe_zone() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(h.id, PointerSample::mouse(500.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::mouse(1200.0, -300.0));

    // Fallback 120px footprint, 5% margins: center within [0.11, 0.89].
    let moved = store.get(h.id).unwrap();
    assert!(approx(moved.x, 0.89), "x = {}", moved.x);
    assert!(approx(moved.y, 0.11), "y = {}", moved.y);
}

#[tokio::test]
async fn drag_clamp_uses_latest_small_growth() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    store.settle().await;

    assert_eq!(
        store.report_measurement(h.id, Size::new(200.0, 60.0)),
        Measurement::Initial
    );
    assert_eq!(
        store.report_measurement(h.id, Size::new(201.9, 60.0)),
        Measurement::Unchanged
    );
    assert_eq!(store.footprint(h.id), Size::new(201.9, 60.0));

    let mut controller = InteractionController::new(store.clone());
    controller.begin_drag(h.id, PointerSample::mouse(500.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::mouse(1500.0, 500.0));

    let moved = store.get(h.id).unwrap();
    let right_edge = moved.x + 201.9 / 1000.0 / 2.0;
    assert!(right_edge <= 0.95 + 1e-9, "right edge = {right_edge}");
    assert!(approx(moved.x, 0.84905), "x = {}", moved.x);
}

#[tokio::test]
async fn touch_and_mouse_drags_match() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let a = store.create(0.5, 0.5, 0.0);
    let b = store.create(0.5, 0.5, 0.0);
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(a.id, PointerSample::mouse(500.0, 500.0)).unwrap();
    controller.pointer_up(PointerSample::mouse(300.0, 650.0)).unwrap();

    controller.begin_drag(b.id, PointerSample::touch(4, 500.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::touch(4, 400.0, 600.0));
    controller.pointer_up(PointerSample::touch(4, 300.0, 650.0)).unwrap();

    let (a, b) = (store.get(a.id).unwrap(), store.get(b.id).unwrap());
    assert_eq!((a.x, a.y), (b.x, b.y));
    assert!(controller.is_idle());
}

#[tokio::test]
async fn other_pointers_do_not_steer_a_drag() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(h.id, PointerSample::touch(1, 500.0, 500.0)).unwrap();
    assert_eq!(controller.pointer_move(PointerSample::touch(2, 100.0, 100.0)), None);
    assert_eq!(controller.pointer_move(PointerSample::mouse(100.0, 100.0)), None);

    assert_eq!(store.get(h.id).unwrap().x, 0.5);
    assert_eq!(controller.active_captures(), 1);
}

#[tokio::test]
async fn cancelled_drag_keeps_position_and_releases_pointer() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    store.settle().await;
    let mut rx = store.subscribe();
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(h.id, PointerSample::touch(9, 500.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::touch(9, 350.0, 500.0));
    let cancelled = controller.pointer_cancel(PointerCapture {
        pointer_id: 9,
        source: InputSource::Touch,
    });
    assert_eq!(cancelled.unwrap(), GestureKind::Drag);
    store.settle().await;

    assert!(approx(store.get(h.id).unwrap().x, 0.35));
    assert_eq!(backend.updates().len(), 1);
    assert_eq!(controller.active_captures(), 0);
    assert_eq!(
        gesture_endings(&mut rx),
        vec![(GestureKind::Drag, GestureOutcome::Cancelled)]
    );
}

#[tokio::test]
async fn drag_before_confirmation_replays_final_position() {
    let backend = ScriptedBackend::new();
    backend.hold_creates();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(h.id, PointerSample::mouse(500.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::mouse(400.0, 500.0));
    controller.pointer_up(PointerSample::mouse(300.0, 500.0)).unwrap();

    backend.release_creates(1);
    store.settle().await;

    let updates = backend.updates();
    assert_eq!(updates.len(), 1);
    assert!(approx(updates[0].1.x, 0.3));
    let stored = &backend.memory().stored(CONTAINER_ID)[0];
    assert!(approx(stored.fields.x, 0.3));
}

#[tokio::test]
async fn second_drag_is_refused() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let a = store.create(0.3, 0.3, 0.0);
    let b = store.create(0.6, 0.6, 0.0);
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(a.id, PointerSample::touch(1, 300.0, 300.0)).unwrap();
    assert_matches!(
        controller.begin_drag(b.id, PointerSample::touch(2, 600.0, 600.0)),
        Err(EngineError::GestureBusy(GestureKind::Drag))
    );
    assert_matches!(
        controller.pointer_up(PointerSample::touch(5, 0.0, 0.0)),
        Err(EngineError::NoActiveGesture(5))
    );
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resize_stops_at_safe_zone_edge() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.85, 0.5, 0.0);
    store.settle().await;
    let h = store.get(h.id).unwrap();
    assert_eq!(h.style, HotspotStyle::new(StyleFamily::Pill, StyleTone::Light));
    assert!(approx(h.x, 0.85));

    let mut controller = InteractionController::new(store.clone());
    // Handle 100px right of center; dragging it to 180px proposes 1.8x.
    controller.begin_resize(h.id, PointerSample::mouse(950.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::mouse(1030.0, 500.0));

    let cap = max_scale_in_safe_zone(
        h.x,
        h.y,
        &h.style,
        false,
        1000.0,
        1000.0,
        &SafeZoneProfile::STANDARD,
    );
    assert!(cap < 1.8);
    assert!(approx(cap, 0.1 / 0.07));

    let resized = store.get(h.id).unwrap();
    assert_eq!(resized.scale, cap);
    assert!(resized.scale >= MIN_SCALE);

    controller.pointer_up(PointerSample::mouse(1030.0, 500.0)).unwrap();
    store.settle().await;
    assert_eq!(backend.memory().stored(CONTAINER_ID)[0].fields.scale, cap);
    assert!(controller.is_idle());
}

#[tokio::test]
async fn resize_within_bounds_follows_pointer() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let h = store.create(0.5, 0.5, 0.0);
    store.settle().await;
    let mut controller = InteractionController::new(store.clone());

    controller.begin_resize(h.id, PointerSample::mouse(600.0, 500.0)).unwrap();
    controller.pointer_move(PointerSample::mouse(630.0, 500.0));
    assert!(approx(store.get(h.id).unwrap().scale, 1.3));

    controller.pointer_move(PointerSample::mouse(510.0, 500.0));
    assert_eq!(store.get(h.id).unwrap().scale, MIN_SCALE);

    controller.pointer_up(PointerSample::mouse(510.0, 500.0)).unwrap();
    store.settle().await;
    assert_eq!(
        backend.updates().last().unwrap().1.scale,
        MIN_SCALE
    );
}

#[tokio::test]
async fn drag_and_resize_use_separate_pointers() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let a = store.create(0.3, 0.3, 0.0);
    let b = store.create(0.6, 0.6, 0.0);
    let mut rx = store.subscribe();
    let mut controller = InteractionController::new(store.clone());

    controller.begin_drag(a.id, PointerSample::touch(1, 300.0, 300.0)).unwrap();
    assert_matches!(
        controller.begin_resize(b.id, PointerSample::touch(1, 700.0, 600.0)),
        Err(EngineError::GestureBusy(GestureKind::Resize))
    );
    controller.begin_resize(b.id, PointerSample::touch(2, 700.0, 600.0)).unwrap();
    assert_eq!(controller.active_captures(), 2);

    controller.cancel_all();
    assert_eq!(controller.active_captures(), 0);
    assert_eq!(gesture_endings(&mut rx).len(), 2);
}
