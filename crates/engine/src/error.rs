use hotspot_core::error::CoreError;
use hotspot_events::GestureKind;
use hotspot_sync::SyncError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Backend sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("A {0:?} gesture is already in progress")]
    GestureBusy(GestureKind),

    #[error("No gesture is tracking pointer {0}")]
    NoActiveGesture(u64),
}
