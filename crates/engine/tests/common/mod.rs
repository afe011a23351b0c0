//! Shared test helpers for engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hotspot_core::geometry::{SafeZoneProfile, Size};
use hotspot_core::types::DbId;
use hotspot_engine::{EngineConfig, HotspotStore};
use hotspot_events::EventBus;
use hotspot_sync::{
    BackendSyncAdapter, ContainerStatus, HotspotPayload, MemorySyncAdapter, ServerHotspot,
    SyncError,
};
use tokio::sync::Semaphore;

pub const CONTAINER_ID: DbId = 7;

/// A backend call as observed by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(HotspotPayload),
    Update(DbId, HotspotPayload),
    Delete(DbId),
    Transition(ContainerStatus, ContainerStatus),
}

/// In-memory backend with a call log, switchable failures and gates that
/// can hold create and status-transition responses.
pub struct ScriptedBackend {
    inner: MemorySyncAdapter,
    calls: Mutex<Vec<Call>>,
    create_gate: Semaphore,
    gated: AtomicBool,
    transition_gate: Semaphore,
    transitions_gated: AtomicBool,
    pub fail_creates: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_transitions: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemorySyncAdapter::new(),
            calls: Mutex::new(Vec::new()),
            create_gate: Semaphore::new(0),
            gated: AtomicBool::new(false),
            transition_gate: Semaphore::new(0),
            transitions_gated: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_transitions: AtomicBool::new(false),
        })
    }

    pub fn memory(&self) -> &MemorySyncAdapter {
        &self.inner
    }

    /// Make create requests wait until [`release_creates`](Self::release_creates).
    pub fn hold_creates(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn release_creates(&self, n: usize) {
        self.create_gate.add_permits(n);
    }

    /// Make container transitions wait until
    /// [`release_transitions`](Self::release_transitions).
    pub fn hold_transitions(&self) {
        self.transitions_gated.store(true, Ordering::SeqCst);
    }

    pub fn release_transitions(&self, n: usize) {
        self.transition_gate.add_permits(n);
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(DbId, HotspotPayload)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(id, payload) => Some((id, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn refused(flag: &AtomicBool) -> Result<(), SyncError> {
        if flag.load(Ordering::SeqCst) {
            return Err(SyncError::Api {
                status: 503,
                body: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BackendSyncAdapter for ScriptedBackend {
    async fn list(&self, container_id: DbId) -> Result<Vec<ServerHotspot>, SyncError> {
        self.record(Call::List);
        self.inner.list(container_id).await
    }

    async fn create(
        &self,
        container_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<ServerHotspot, SyncError> {
        self.record(Call::Create(payload.clone()));
        if self.gated.load(Ordering::SeqCst) {
            self.create_gate
                .acquire()
                .await
                .expect("gate closed")
                .forget();
        }
        Self::refused(&self.fail_creates)?;
        self.inner.create(container_id, payload).await
    }

    async fn update(
        &self,
        container_id: DbId,
        server_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<(), SyncError> {
        self.record(Call::Update(server_id, payload.clone()));
        Self::refused(&self.fail_updates)?;
        self.inner.update(container_id, server_id, payload).await
    }

    async fn delete(&self, container_id: DbId, server_id: DbId) -> Result<(), SyncError> {
        self.record(Call::Delete(server_id));
        Self::refused(&self.fail_deletes)?;
        self.inner.delete(container_id, server_id).await
    }

    async fn transition_container(
        &self,
        container_id: DbId,
        from: ContainerStatus,
        to: ContainerStatus,
    ) -> Result<(), SyncError> {
        self.record(Call::Transition(from, to));
        if self.transitions_gated.load(Ordering::SeqCst) {
            self.transition_gate
                .acquire()
                .await
                .expect("gate closed")
                .forget();
        }
        Self::refused(&self.fail_transitions)?;
        self.inner.transition_container(container_id, from, to).await
    }
}

/// 1000x1000 frame, standard safe zone.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        container_id: CONTAINER_ID,
        container_width: 1000.0,
        container_height: 1000.0,
        safe_zone: SafeZoneProfile::STANDARD,
        fallback_footprint: Size::new(120.0, 120.0),
        ..EngineConfig::default()
    }
}

pub fn store_with(config: &EngineConfig, backend: &Arc<ScriptedBackend>) -> HotspotStore {
    HotspotStore::new(config, backend.clone(), Arc::new(EventBus::default()))
}

pub fn test_store(backend: &Arc<ScriptedBackend>) -> HotspotStore {
    store_with(&test_config(), backend)
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
