//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans [`EditorEvent`]s out to every subscriber. It is shared
//! via `Arc<EventBus>` between the store, the interaction controller and any
//! UI panel that wants to react to changes.

use chrono::{DateTime, Utc};
use hotspot_core::types::{DbId, HotspotId};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureOutcome {
    Completed,
    Cancelled,
}

/// Backend operation a sync warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
    Load,
    Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEventKind {
    /// A hotspot was added locally.
    Created,
    /// A hotspot's fields changed locally.
    Updated { revision: u64 },
    /// A hotspot was removed locally.
    Deleted,
    /// A deletion was rolled back after the backend refused it.
    Restored,
    /// The backend assigned a server identity.
    Confirmed { backend_id: DbId },
    /// The selection changed; `hotspot_id` carries the new selection.
    SelectionChanged,
    /// The collection was replaced from the backend.
    Loaded { count: usize },
    /// A drag or resize finished; panels may open further editing UI.
    GestureEnded {
        gesture: GestureKind,
        outcome: GestureOutcome,
    },
    /// A non-fatal backend failure the user should be told about.
    SyncWarning {
        operation: SyncOperation,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// EditorEvent
// ---------------------------------------------------------------------------

/// Something that happened in the editor.
///
/// Constructed via [`EditorEvent::new`] and enriched with
/// [`with_hotspot`](EditorEvent::with_hotspot) and
/// [`with_container`](EditorEvent::with_container).
#[derive(Debug, Clone, Serialize)]
pub struct EditorEvent {
    pub kind: EditorEventKind,

    /// Client id of the hotspot concerned, if any.
    pub hotspot_id: Option<HotspotId>,

    /// Container (video) the hotspot belongs to.
    pub container_id: Option<DbId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl EditorEvent {
    pub fn new(kind: EditorEventKind) -> Self {
        Self {
            kind,
            hotspot_id: None,
            container_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_hotspot(mut self, id: HotspotId) -> Self {
        self.hotspot_id = Some(id);
        self
    }

    pub fn with_container(mut self, container_id: DbId) -> Self {
        self.container_id = Some(container_id);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use hotspot_events::bus::{EditorEvent, EditorEventKind, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EditorEvent::new(EditorEventKind::Created));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: EditorEvent) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
