//! Safe-zone enforcement through the store: creation, measurement-driven
//! re-clamping and frame changes.

mod common;

use common::{approx, store_with, test_config, test_store, ScriptedBackend, CONTAINER_ID};
use hotspot_core::dimensions::Measurement;
use hotspot_core::geometry::{is_point_in_safe_zone, SafeZoneProfile, Size};
use hotspot_core::hotspot::HotspotPatch;
use hotspot_core::types::HotspotId;
use hotspot_engine::{CanvasFrame, EngineConfig};

#[tokio::test]
async fn creation_near_corner_is_pulled_inside() {
    let backend = ScriptedBackend::new();
    let config = EngineConfig {
        safe_zone: SafeZoneProfile::VERTICAL_SOCIAL,
        fallback_footprint: Size::new(160.0, 160.0),
        ..test_config()
    };
    let store = store_with(&config, &backend);

    let h = store.create(0.9, 0.9, 0.0);

    assert!(approx(h.x, 0.80), "x = {}", h.x);
    assert!(approx(h.y, 0.80), "y = {}", h.y);
    assert!(is_point_in_safe_zone(h.x, h.y, &SafeZoneProfile::VERTICAL_SOCIAL));

    store.settle().await;
    let stored = &backend.memory().stored(CONTAINER_ID)[0];
    assert!(approx(stored.fields.x, 0.80));
    assert!(approx(stored.fields.y, 0.80));
}

#[tokio::test]
async fn non_finite_creation_lands_in_zone() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);

    let h = store.create(f64::NAN, 0.5, 0.0);
    assert!(h.x.is_finite());
    assert!(is_point_in_safe_zone(h.x, h.y, &SafeZoneProfile::STANDARD));
}

async fn confirmed_at(store: &hotspot_engine::HotspotStore, x: f64, y: f64) -> HotspotId {
    let h = store.create(0.5, 0.5, 0.0);
    store.update(h.id, HotspotPatch::position(x, y)).unwrap();
    store.settle().await;
    h.id
}

#[tokio::test]
async fn growing_overlay_is_reclamped_and_persisted() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let id = confirmed_at(&store, 0.90, 0.5).await;
    let before = store.get(id).unwrap();

    // 200px wide overlay in a 1000px frame: half-width 0.1, so x <= 0.85.
    let outcome = store.report_measurement(id, Size::new(200.0, 60.0));
    assert_eq!(outcome, Measurement::Initial);

    let after = store.get(id).unwrap();
    assert!(approx(after.x, 0.85), "x = {}", after.x);
    assert_eq!(after.y, 0.5);
    assert!(after.revision > before.revision);
    assert_eq!(store.measurement(id), Some(Size::new(200.0, 60.0)));

    store.settle().await;
    let stored = &backend.memory().stored(CONTAINER_ID)[0];
    assert!(approx(stored.fields.x, 0.85));
}

#[tokio::test]
async fn measurement_jitter_is_ignored() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let id = confirmed_at(&store, 0.5, 0.5).await;
    let updates_before = backend.updates().len();

    assert_eq!(
        store.report_measurement(id, Size::new(150.0, 50.0)),
        Measurement::Initial
    );
    assert_eq!(
        store.report_measurement(id, Size::new(151.5, 50.5)),
        Measurement::Unchanged
    );
    assert_eq!(store.measurement(id), Some(Size::new(151.5, 50.5)));

    store.settle().await;
    assert_eq!(backend.updates().len(), updates_before);
}

#[tokio::test]
async fn reclamp_during_hold_waits_for_release() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let id = confirmed_at(&store, 0.90, 0.5).await;
    let updates_before = backend.updates().len();

    assert!(store.hold_position(id));
    store.report_measurement(id, Size::new(200.0, 60.0));
    store.settle().await;

    assert!(approx(store.get(id).unwrap().x, 0.85));
    assert_eq!(backend.updates().len(), updates_before);

    store.release_position(id);
    store.settle().await;
    assert_eq!(backend.updates().len(), updates_before + 1);
    assert!(approx(backend.updates().last().unwrap().1.x, 0.85));
}

#[tokio::test]
async fn frame_change_reclamps_everything() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let edge = confirmed_at(&store, 0.88, 0.12).await;
    let center = confirmed_at(&store, 0.5, 0.5).await;
    let center_revision = store.get(center).unwrap().revision;

    let frame = CanvasFrame::new(1000.0, 1000.0, SafeZoneProfile::BROADCAST);
    store.set_frame(frame).unwrap();

    // Fallback 120px footprint under a 10% margin: center within [0.16, 0.84].
    let moved = store.get(edge).unwrap();
    assert!(approx(moved.x, 0.84), "x = {}", moved.x);
    assert!(approx(moved.y, 0.16), "y = {}", moved.y);
    assert_eq!(store.get(center).unwrap().revision, center_revision);
    assert_eq!(store.frame(), frame);
}

#[tokio::test]
async fn invalid_frame_is_rejected() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    let bad = CanvasFrame::new(1000.0, 1000.0, SafeZoneProfile::uniform(0.6));
    assert!(store.set_frame(bad).is_err());
    assert_eq!(store.frame(), test_config().frame());
}

#[tokio::test]
async fn measurement_for_unknown_hotspot_is_rejected() {
    let backend = ScriptedBackend::new();
    let store = test_store(&backend);
    assert_eq!(
        store.report_measurement(HotspotId::new(), Size::new(10.0, 10.0)),
        Measurement::Rejected
    );
}

#[tokio::test]
async fn reclamp_before_confirmation_is_deferred() {
    let backend = ScriptedBackend::new();
    backend.hold_creates();
    let store = test_store(&backend);

    let h = store.create(0.5, 0.5, 0.0);
    store.update(h.id, HotspotPatch::position(0.9, 0.5)).unwrap();
    store.report_measurement(h.id, Size::new(200.0, 60.0));
    assert!(approx(store.get(h.id).unwrap().x, 0.85));

    backend.release_creates(1);
    store.settle().await;

    let updates = backend.updates();
    assert_eq!(updates.len(), 1);
    assert!(approx(updates[0].1.x, 0.85));
    assert!(approx(store.get(h.id).unwrap().x, 0.85));
}
