//! The authoritative hotspot collection for one container.
//!
//! [`HotspotStore`] is a cheap-to-clone handle. Every local mutation is
//! applied synchronously and visible to the next read; backend writes are
//! fire-and-forget tasks tracked by a [`TaskTracker`] so callers (and tests)
//! can wait for them with [`HotspotStore::settle`].
//!
//! Writes for one hotspot go through a per-hotspot lane and always carry the
//! latest local snapshot. A lane skips the request when the backend has
//! already acknowledged that revision, so a burst of edits never lands on
//! the server out of order.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hotspot_core::dimensions::{DimensionObserver, Measurement};
use hotspot_core::error::CoreError;
use hotspot_core::geometry::Size;
use hotspot_core::hotspot::{clamp_scale, Hotspot, HotspotPatch};
use hotspot_core::types::{DbId, HotspotId};
use hotspot_events::{EditorEvent, EditorEventKind, EventBus, SyncOperation};
use hotspot_sync::{BackendSyncAdapter, ContainerStatus, HotspotPayload, ServerHotspot};
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::frame::CanvasFrame;
use crate::mediator::{IdentityMediator, Resolution, Route};

type WriteLane = Arc<tokio::sync::Mutex<()>>;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct StoreState {
    hotspots: Vec<Hotspot>,
    selected: Option<HotspotId>,
    mediator: IdentityMediator,
    dimensions: DimensionObserver,
    /// Positions changed locally that have not been routed to the backend.
    position_dirty: HashSet<HotspotId>,
    /// Positions owned by an active gesture.
    held: HashSet<HotspotId>,
    /// Highest revision the backend has acknowledged, per hotspot.
    acknowledged: HashMap<HotspotId, u64>,
    lanes: HashMap<HotspotId, WriteLane>,
    frame: CanvasFrame,
    fallback_footprint: Size,
    lifecycle_started: bool,
}

/// A locally deleted hotspot, kept until the backend agrees.
struct Removed {
    index: usize,
    hotspot: Hotspot,
    previous_selection: Option<HotspotId>,
    was_dirty: bool,
}

impl StoreState {
    fn index_of(&self, id: HotspotId) -> Option<usize> {
        self.hotspots.iter().position(|h| h.id == id)
    }

    fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    fn footprint(&self, id: HotspotId) -> Size {
        self.dimensions
            .get(&id)
            .unwrap_or(self.fallback_footprint)
    }

    fn not_found(id: HotspotId) -> CoreError {
        CoreError::NotFound {
            entity: "hotspot",
            id,
        }
    }

    /// Apply a patch. Returns the updated hotspot and, if the patch touched
    /// persisted fields, where the change must be sent.
    fn apply_patch(
        &mut self,
        id: HotspotId,
        patch: &HotspotPatch,
    ) -> Result<(Hotspot, Option<Route>), CoreError> {
        let index = self.index_of(id).ok_or_else(|| Self::not_found(id))?;
        let bumped = self.hotspots[index].apply(patch)?;
        let hotspot = self.hotspots[index].clone();
        if !bumped {
            return Ok((hotspot, None));
        }

        let route = self.mediator.route(&hotspot, patch);
        // A write carries the full snapshot, position included.
        if matches!(route, Route::Send(_)) && !self.held.contains(&id) {
            self.position_dirty.remove(&id);
        }
        Ok((hotspot, Some(route)))
    }

    fn move_to(&mut self, id: HotspotId, x: f64, y: f64) -> Result<Hotspot, CoreError> {
        let index = self.index_of(id).ok_or_else(|| Self::not_found(id))?;
        self.hotspots[index].apply(&HotspotPatch::position(x, y))?;
        self.position_dirty.insert(id);
        Ok(self.hotspots[index].clone())
    }

    /// Route a dirty position unless a gesture holds it.
    fn flush_position(&mut self, id: HotspotId) -> Option<Route> {
        if self.held.contains(&id) || !self.position_dirty.contains(&id) {
            return None;
        }
        self.position_dirty.remove(&id);
        let index = self.index_of(id)?;
        let hotspot = &self.hotspots[index];
        let patch = HotspotPatch::position(hotspot.x, hotspot.y);
        Some(self.mediator.route(&self.hotspots[index], &patch))
    }

    /// Translate the given hotspots back inside the safe zone using their
    /// measured (or fallback) footprint.
    fn reclamp(&mut self, ids: Vec<HotspotId>) -> Vec<(Hotspot, Option<Route>)> {
        let mut moved = Vec::new();
        for id in ids {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            let size = self.footprint(id);
            let current = &self.hotspots[index];
            let clamped = self.frame.clamp(current.x, current.y, size);
            if !clamped.was_constrained {
                continue;
            }
            if let Err(e) = self.move_to(id, clamped.x, clamped.y) {
                tracing::warn!(hotspot_id = %id, error = %e, "Re-clamp rejected");
                continue;
            }
            let route = self.flush_position(id);
            moved.push((self.hotspots[index].clone(), route));
        }
        moved
    }

    /// Adopt the server identity for a hotspot whose create succeeded.
    ///
    /// Returns `None` if the hotspot no longer exists locally, otherwise
    /// whether a follow-up write is needed to bring the server up to date.
    fn adopt(
        &mut self,
        id: HotspotId,
        created_revision: u64,
        server: ServerHotspot,
        pending: Option<HotspotPatch>,
    ) -> Option<bool> {
        let index = self.index_of(id)?;
        let ServerHotspot {
            id: server_id,
            fields,
        } = server;

        let held = self.held.contains(&id);
        let dirty = self.position_dirty.contains(&id);
        let local = &self.hotspots[index];

        let mut resolved = local.clone();
        resolved.merge_patch(&fields.into_patch());
        if let Some(patch) = &pending {
            resolved.merge_patch(patch);
        }
        if held || dirty {
            resolved.x = local.x;
            resolved.y = local.y;
        }
        resolved.backend_id = Some(server_id);

        self.hotspots[index] = resolved;
        self.acknowledged.insert(id, created_revision);

        let flush_dirty = dirty && !held;
        if flush_dirty {
            self.position_dirty.remove(&id);
        }
        Some(pending.is_some() || flush_dirty)
    }

    fn remove(&mut self, id: HotspotId) -> Option<Removed> {
        let index = self.index_of(id)?;
        let hotspot = self.hotspots.remove(index);
        let previous_selection = self.selected;
        if self.selected == Some(id) {
            self.selected = None;
        }
        let was_dirty = self.position_dirty.remove(&id);
        self.held.remove(&id);

        if !hotspot.is_confirmed() {
            self.mediator.abandon(id);
            self.forget(id);
        }
        Some(Removed {
            index,
            hotspot,
            previous_selection,
            was_dirty,
        })
    }

    fn restore(&mut self, removed: Removed) {
        let id = removed.hotspot.id;
        let index = removed.index.min(self.hotspots.len());
        self.hotspots.insert(index, removed.hotspot);
        self.selected = removed.previous_selection;
        if removed.was_dirty {
            self.position_dirty.insert(id);
        }
    }

    fn forget(&mut self, id: HotspotId) {
        self.dimensions.forget(&id);
        self.acknowledged.remove(&id);
        self.lanes.remove(&id);
    }

    fn replace_all(&mut self, hotspots: Vec<Hotspot>) {
        self.acknowledged = hotspots.iter().map(|h| (h.id, h.revision)).collect();
        self.lifecycle_started |= !hotspots.is_empty();
        self.hotspots = hotspots;
        self.selected = None;
        self.mediator.clear();
        self.dimensions.clear();
        self.position_dirty.clear();
        self.held.clear();
        self.lanes.clear();
    }

    /// The write to send for `id`, if it is confirmed and ahead of what the
    /// backend has acknowledged.
    fn outgoing(&self, id: HotspotId) -> Option<(DbId, u64, HotspotPayload)> {
        let hotspot = self.get(id)?;
        let server_id = hotspot.backend_id?;
        if self
            .acknowledged
            .get(&id)
            .is_some_and(|&rev| rev >= hotspot.revision)
        {
            return None;
        }
        Some((server_id, hotspot.revision, HotspotPayload::from(hotspot)))
    }

    fn lane(&mut self, id: HotspotId) -> WriteLane {
        self.lanes.entry(id).or_default().clone()
    }
}

// ---------------------------------------------------------------------------
// HotspotStore
// ---------------------------------------------------------------------------

struct Shared {
    container_id: DbId,
    state: Mutex<StoreState>,
    adapter: Arc<dyn BackendSyncAdapter>,
    events: Arc<EventBus>,
    tasks: TaskTracker,
    /// Serializes [`HotspotStore::settle`] callers.
    settling: tokio::sync::Mutex<()>,
}

/// Shared handle to the hotspots of one container.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use hotspot_engine::{EngineConfig, HotspotStore};
/// use hotspot_events::EventBus;
/// use hotspot_sync::MemorySyncAdapter;
///
/// # async fn demo() {
/// let store = HotspotStore::new(
///     &EngineConfig::default(),
///     Arc::new(MemorySyncAdapter::new()),
///     Arc::new(EventBus::default()),
/// );
/// let hotspot = store.create(0.5, 0.5, 0.0);
/// store.settle().await;
/// assert!(store.get(hotspot.id).unwrap().is_confirmed());
/// # }
/// ```
#[derive(Clone)]
pub struct HotspotStore {
    shared: Arc<Shared>,
}

impl HotspotStore {
    pub fn new(
        config: &EngineConfig,
        adapter: Arc<dyn BackendSyncAdapter>,
        events: Arc<EventBus>,
    ) -> Self {
        let state = StoreState {
            hotspots: Vec::new(),
            selected: None,
            mediator: IdentityMediator::new(),
            dimensions: DimensionObserver::new(config.measure_threshold_px),
            position_dirty: HashSet::new(),
            held: HashSet::new(),
            acknowledged: HashMap::new(),
            lanes: HashMap::new(),
            frame: config.frame(),
            fallback_footprint: config.fallback_footprint,
            lifecycle_started: false,
        };
        Self {
            shared: Arc::new(Shared {
                container_id: config.container_id,
                state: Mutex::new(state),
                adapter,
                events,
                tasks: TaskTracker::new(),
                settling: tokio::sync::Mutex::new(()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, kind: EditorEventKind, hotspot_id: Option<HotspotId>) {
        let mut event = EditorEvent::new(kind).with_container(self.shared.container_id);
        if let Some(id) = hotspot_id {
            event = event.with_hotspot(id);
        }
        self.shared.events.publish(event);
    }

    fn warn_user(&self, operation: SyncOperation, message: String, hotspot_id: Option<HotspotId>) {
        self.emit(
            EditorEventKind::SyncWarning { operation, message },
            hotspot_id,
        );
    }

    // ---- reads ----

    pub fn container_id(&self) -> DbId {
        self.shared.container_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.shared.events.subscribe()
    }

    /// Snapshot of all hotspots in creation order.
    pub fn hotspots(&self) -> Vec<Hotspot> {
        self.lock().hotspots.clone()
    }

    pub fn get(&self, id: HotspotId) -> Option<Hotspot> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().hotspots.is_empty()
    }

    /// Hotspots visible at `time` (seconds).
    pub fn active_at(&self, time: f64) -> Vec<Hotspot> {
        self.lock()
            .hotspots
            .iter()
            .filter(|h| h.is_active_at(time))
            .cloned()
            .collect()
    }

    pub fn selected_id(&self) -> Option<HotspotId> {
        self.lock().selected
    }

    pub fn selected(&self) -> Option<Hotspot> {
        let state = self.lock();
        state.selected.and_then(|id| state.get(id).cloned())
    }

    pub fn frame(&self) -> CanvasFrame {
        self.lock().frame
    }

    /// Last valid measurement of an overlay.
    pub fn measurement(&self, id: HotspotId) -> Option<Size> {
        self.lock().dimensions.get(&id)
    }

    /// Measured size, or the fallback footprint if not yet measured.
    pub fn footprint(&self, id: HotspotId) -> Size {
        self.lock().footprint(id)
    }

    /// Whether the create request for `id` is still in flight.
    pub fn is_awaiting_identity(&self, id: HotspotId) -> bool {
        self.lock().mediator.is_awaiting_identity(&id)
    }

    /// Whether `id` failed to be created and exists only on this client.
    pub fn is_local_only(&self, id: HotspotId) -> bool {
        self.lock().mediator.is_local_only(&id)
    }

    // ---- mutations ----

    /// Add a hotspot at `(x, y)` starting at `time`, select it and create
    /// it on the backend in the background.
    ///
    /// The center is clamped into the safe zone using the fallback
    /// footprint; the overlay has not been rendered yet.
    pub fn create(&self, x: f64, y: f64, time: f64) -> Hotspot {
        let hotspot = {
            let mut state = self.lock();
            let mut hotspot = Hotspot::new(HotspotId::new(), x, y, time);
            let clamped = state
                .frame
                .clamp(hotspot.x, hotspot.y, state.fallback_footprint);
            hotspot.x = clamped.x;
            hotspot.y = clamped.y;
            debug_assert!(hotspot.validate().is_ok(), "new hotspot is invalid");

            state.mediator.begin_create(hotspot.id);
            state.hotspots.push(hotspot.clone());
            state.selected = Some(hotspot.id);
            hotspot
        };

        tracing::info!(
            hotspot_id = %hotspot.id,
            x = hotspot.x,
            y = hotspot.y,
            time_start = hotspot.time_start,
            "Hotspot created"
        );
        self.emit(EditorEventKind::Created, Some(hotspot.id));
        self.emit(EditorEventKind::SelectionChanged, Some(hotspot.id));

        let store = self.clone();
        let snapshot = hotspot.clone();
        self.shared
            .tasks
            .spawn(async move { store.run_create(snapshot).await });
        hotspot
    }

    /// Apply a partial update.
    ///
    /// Patches touching persisted fields bump the revision and are sent to
    /// the backend (or deferred until the hotspot has a server id). A patch
    /// of client-only fields changes nothing else.
    pub fn update(&self, id: HotspotId, patch: HotspotPatch) -> Result<Hotspot, CoreError> {
        let result = self.lock().apply_patch(id, &patch);
        match result {
            Ok((hotspot, route)) => {
                tracing::debug!(hotspot_id = %id, revision = hotspot.revision, "Hotspot updated");
                self.emit(
                    EditorEventKind::Updated {
                        revision: hotspot.revision,
                    },
                    Some(id),
                );
                if let Some(route) = route {
                    self.dispatch(id, route);
                }
                Ok(hotspot)
            }
            Err(e) => {
                match &e {
                    CoreError::NotFound { .. } => {
                        tracing::warn!(hotspot_id = %id, "Update for unknown hotspot ignored")
                    }
                    CoreError::Validation(reason) => {
                        tracing::debug!(hotspot_id = %id, %reason, "Update rejected")
                    }
                }
                Err(e)
            }
        }
    }

    /// Move a hotspot without persisting. The position stays dirty until
    /// [`persist_position`](Self::persist_position) or
    /// [`release_position`](Self::release_position).
    pub fn update_position(&self, id: HotspotId, x: f64, y: f64) -> Result<Hotspot, CoreError> {
        let hotspot = self.lock().move_to(id, x, y)?;
        self.emit(
            EditorEventKind::Updated {
                revision: hotspot.revision,
            },
            Some(id),
        );
        Ok(hotspot)
    }

    /// Set the scale, clamped to the allowed range, and persist it.
    pub fn update_scale(&self, id: HotspotId, scale: f64) -> Result<Hotspot, CoreError> {
        let scale = clamp_scale(scale)
            .ok_or_else(|| CoreError::Validation("scale must be a number".to_string()))?;
        self.update(id, HotspotPatch::scale(scale))
    }

    /// Send a dirty position to the backend unless a gesture holds it.
    pub fn persist_position(&self, id: HotspotId) {
        let route = self.lock().flush_position(id);
        if let Some(route) = route {
            self.dispatch(id, route);
        }
    }

    /// Keep position writes for `id` local until released.
    pub fn hold_position(&self, id: HotspotId) -> bool {
        let mut state = self.lock();
        if state.index_of(id).is_none() {
            return false;
        }
        state.held.insert(id)
    }

    /// End a hold and persist the position if it changed meanwhile.
    pub fn release_position(&self, id: HotspotId) {
        self.lock().held.remove(&id);
        self.persist_position(id);
    }

    pub fn select(&self, id: Option<HotspotId>) -> Result<(), CoreError> {
        let changed = {
            let mut state = self.lock();
            if let Some(id) = id {
                if state.index_of(id).is_none() {
                    return Err(StoreState::not_found(id));
                }
            }
            let changed = state.selected != id;
            state.selected = id;
            changed
        };
        if changed {
            self.emit(EditorEventKind::SelectionChanged, id);
        }
        Ok(())
    }

    /// Remove a hotspot.
    ///
    /// The hotspot disappears locally at once. If the backend refuses the
    /// delete, it is reinserted at its old index, the previous selection is
    /// restored and the error is returned.
    pub async fn delete(&self, id: HotspotId) -> Result<(), EngineError> {
        let removed = self.lock().remove(id);
        let Some(removed) = removed else {
            tracing::warn!(hotspot_id = %id, "Delete for unknown hotspot ignored");
            return Err(StoreState::not_found(id).into());
        };

        let previous_selection = removed.previous_selection;
        self.emit(EditorEventKind::Deleted, Some(id));
        if previous_selection == Some(id) {
            self.emit(EditorEventKind::SelectionChanged, None);
        }

        let Some(server_id) = removed.hotspot.backend_id else {
            tracing::info!(hotspot_id = %id, "Unconfirmed hotspot deleted locally");
            return Ok(());
        };

        let lane = self.lock().lane(id);
        let result = {
            let _turn = lane.lock().await;
            self.shared
                .adapter
                .delete(self.shared.container_id, server_id)
                .await
        };

        match result {
            Ok(()) => {
                self.lock().forget(id);
                tracing::info!(hotspot_id = %id, server_id, "Hotspot deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(hotspot_id = %id, server_id, error = %e, "Hotspot delete failed, restoring");
                self.lock().restore(removed);
                self.emit(EditorEventKind::Restored, Some(id));
                if previous_selection == Some(id) {
                    self.emit(EditorEventKind::SelectionChanged, Some(id));
                }
                self.warn_user(SyncOperation::Delete, e.to_string(), Some(id));
                Err(e.into())
            }
        }
    }

    /// Record a post-paint measurement and move the overlay back inside the
    /// safe zone if its new size pushes it out.
    pub fn report_measurement(&self, id: HotspotId, size: Size) -> Measurement {
        let (outcome, moved) = {
            let mut state = self.lock();
            if state.index_of(id).is_none() {
                return Measurement::Rejected;
            }
            let outcome = state.dimensions.record(id, size);
            let queued = state.dimensions.drain_queue();
            (outcome, state.reclamp(queued))
        };
        if outcome == Measurement::Rejected {
            tracing::debug!(hotspot_id = %id, ?size, "Measurement rejected");
        }
        self.publish_moves(moved);
        outcome
    }

    /// Change the container size or safe-zone profile and re-clamp every
    /// hotspot against it.
    pub fn set_frame(&self, frame: CanvasFrame) -> Result<(), CoreError> {
        frame.validate()?;
        let moved = {
            let mut state = self.lock();
            state.frame = frame;
            state.dimensions.drain_queue();
            let ids = state.hotspots.iter().map(|h| h.id).collect();
            state.reclamp(ids)
        };
        tracing::info!(
            width = frame.width,
            height = frame.height,
            moved = moved.len(),
            "Container frame changed"
        );
        self.publish_moves(moved);
        Ok(())
    }

    /// Replace the collection with what the backend stores.
    ///
    /// Outstanding writes are awaited first so the listing reflects them.
    pub async fn load(&self) -> Result<usize, EngineError> {
        self.settle().await;
        let container_id = self.shared.container_id;
        match self.shared.adapter.list(container_id).await {
            Ok(rows) => {
                let hotspots: Vec<Hotspot> =
                    rows.into_iter().map(ServerHotspot::into_hotspot).collect();
                let count = hotspots.len();
                self.lock().replace_all(hotspots);
                tracing::info!(container_id, count, "Hotspots loaded");
                self.emit(EditorEventKind::Loaded { count }, None);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(container_id, error = %e, "Failed to load hotspots");
                self.warn_user(SyncOperation::Load, e.to_string(), None);
                Err(e.into())
            }
        }
    }

    /// Wait until every background backend task has finished.
    ///
    /// Concurrent callers take turns, so one caller reopening the tracker
    /// never strands another mid-wait.
    pub async fn settle(&self) {
        let _turn = self.shared.settling.lock().await;
        let tasks = &self.shared.tasks;
        tasks.close();
        tasks.wait().await;
        tasks.reopen();
    }

    // ---- background sync ----

    fn publish_moves(&self, moved: Vec<(Hotspot, Option<Route>)>) {
        for (hotspot, route) in moved {
            tracing::debug!(
                hotspot_id = %hotspot.id,
                x = hotspot.x,
                y = hotspot.y,
                "Hotspot moved back into safe zone"
            );
            self.emit(
                EditorEventKind::Updated {
                    revision: hotspot.revision,
                },
                Some(hotspot.id),
            );
            if let Some(route) = route {
                self.dispatch(hotspot.id, route);
            }
        }
    }

    fn dispatch(&self, id: HotspotId, route: Route) {
        match route {
            Route::Send(_) => {
                let store = self.clone();
                self.shared
                    .tasks
                    .spawn(async move { store.push_latest(id).await });
            }
            Route::Deferred => {
                tracing::debug!(hotspot_id = %id, "Edit deferred until the create resolves")
            }
            Route::LocalOnly => {
                tracing::debug!(hotspot_id = %id, "Hotspot is local only, edit not persisted")
            }
        }
    }

    async fn run_create(&self, hotspot: Hotspot) {
        let id = hotspot.id;
        let payload = HotspotPayload::from(&hotspot);
        match self
            .shared
            .adapter
            .create(self.shared.container_id, &payload)
            .await
        {
            Ok(server) => self.confirm(id, hotspot.revision, server).await,
            Err(e) => {
                let dropped = self.lock().mediator.fail(id);
                tracing::warn!(
                    hotspot_id = %id,
                    error = %e,
                    transient = e.is_transient(),
                    dropped_edits = dropped.is_some(),
                    "Hotspot create failed, changes stay local"
                );
                self.warn_user(SyncOperation::Create, e.to_string(), Some(id));
            }
        }
    }

    async fn confirm(&self, id: HotspotId, created_revision: u64, server: ServerHotspot) {
        let server_id = server.id;
        let adopted = {
            let mut state = self.lock();
            match state.mediator.resolve(id) {
                Resolution::Abandoned => None,
                Resolution::Live { pending } => state.adopt(id, created_revision, server, pending),
            }
        };

        let Some(needs_write) = adopted else {
            tracing::info!(hotspot_id = %id, server_id, "Hotspot deleted before its create resolved, removing server copy");
            if let Err(e) = self
                .shared
                .adapter
                .delete(self.shared.container_id, server_id)
                .await
            {
                tracing::warn!(hotspot_id = %id, server_id, error = %e, "Failed to remove orphaned hotspot");
                self.warn_user(SyncOperation::Delete, e.to_string(), Some(id));
            }
            return;
        };

        tracing::info!(hotspot_id = %id, server_id, "Hotspot confirmed");
        self.emit(
            EditorEventKind::Confirmed {
                backend_id: server_id,
            },
            Some(id),
        );
        self.start_lifecycle();
        if needs_write {
            self.push_latest(id).await;
        }
    }

    /// Move the container from draft to editing after its first hotspot.
    /// Runs in the background; nothing waits on it but [`settle`](Self::settle).
    fn start_lifecycle(&self) {
        let first = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.lifecycle_started, true)
        };
        if first {
            let store = self.clone();
            self.shared
                .tasks
                .spawn(async move { store.run_lifecycle().await });
        }
    }

    async fn run_lifecycle(&self) {
        let container_id = self.shared.container_id;
        match self
            .shared
            .adapter
            .transition_container(container_id, ContainerStatus::Draft, ContainerStatus::Editing)
            .await
        {
            Ok(()) => tracing::info!(container_id, "Container moved to editing"),
            Err(e) => {
                tracing::warn!(container_id, error = %e, "Container status transition failed");
                self.warn_user(SyncOperation::Lifecycle, e.to_string(), None);
            }
        }
    }

    /// Send the current snapshot of `id` unless the backend already has it.
    async fn push_latest(&self, id: HotspotId) {
        let lane = self.lock().lane(id);
        let _turn = lane.lock().await;

        let snapshot = self.lock().outgoing(id);
        let Some((server_id, revision, payload)) = snapshot else {
            tracing::trace!(hotspot_id = %id, "Backend already up to date");
            return;
        };

        match self
            .shared
            .adapter
            .update(self.shared.container_id, server_id, &payload)
            .await
        {
            Ok(()) => {
                self.acknowledge(id, revision);
                tracing::debug!(hotspot_id = %id, server_id, revision, "Hotspot persisted");
            }
            Err(e) => {
                tracing::warn!(
                    hotspot_id = %id,
                    server_id,
                    revision,
                    error = %e,
                    transient = e.is_transient(),
                    "Hotspot update failed"
                );
                self.warn_user(SyncOperation::Update, e.to_string(), Some(id));
            }
        }
    }

    fn acknowledge(&self, id: HotspotId, revision: u64) {
        let mut state = self.lock();
        if state.get(id).is_none() {
            return;
        }
        let entry = state.acknowledged.entry(id).or_insert(revision);
        *entry = (*entry).max(revision);
    }
}
