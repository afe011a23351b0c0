//! In-process backend.
//!
//! Behaves like the REST backend (whole-entity replacement, sequential server
//! ids, status transitions checked against the current status) without any
//! network. Used when no API URL is configured and as the base of test
//! doubles.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use hotspot_core::types::DbId;

use crate::adapter::{BackendSyncAdapter, SyncError};
use crate::wire::{ContainerStatus, HotspotPayload, ServerHotspot};

#[derive(Debug)]
struct MemoryState {
    next_id: DbId,
    hotspots: HashMap<DbId, Vec<ServerHotspot>>,
    statuses: HashMap<DbId, ContainerStatus>,
}

#[derive(Debug)]
pub struct MemorySyncAdapter {
    state: Mutex<MemoryState>,
}

impl MemorySyncAdapter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                hotspots: HashMap::new(),
                statuses: HashMap::new(),
            }),
        }
    }

    /// Pre-populate a container, e.g. to exercise loading.
    pub fn seed(&self, container_id: DbId, payloads: Vec<HotspotPayload>) -> Vec<DbId> {
        let mut state = self.lock();
        let mut ids = Vec::with_capacity(payloads.len());
        for fields in payloads {
            let id = state.next_id;
            state.next_id += 1;
            state
                .hotspots
                .entry(container_id)
                .or_default()
                .push(ServerHotspot { id, fields });
            ids.push(id);
        }
        ids
    }

    /// Stored hotspots of a container, in creation order.
    pub fn stored(&self, container_id: DbId) -> Vec<ServerHotspot> {
        self.lock()
            .hotspots
            .get(&container_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Current editorial status; containers start as drafts.
    pub fn status(&self, container_id: DbId) -> ContainerStatus {
        self.lock()
            .statuses
            .get(&container_id)
            .copied()
            .unwrap_or(ContainerStatus::Draft)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemorySyncAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendSyncAdapter for MemorySyncAdapter {
    async fn list(&self, container_id: DbId) -> Result<Vec<ServerHotspot>, SyncError> {
        Ok(self.stored(container_id))
    }

    async fn create(
        &self,
        container_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<ServerHotspot, SyncError> {
        let created = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            let created = ServerHotspot {
                id,
                fields: payload.clone(),
            };
            state
                .hotspots
                .entry(container_id)
                .or_default()
                .push(created.clone());
            created
        };
        tracing::debug!(container_id, server_id = created.id, "Stored hotspot in memory");
        Ok(created)
    }

    async fn update(
        &self,
        container_id: DbId,
        server_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<(), SyncError> {
        let mut state = self.lock();
        let stored = state
            .hotspots
            .get_mut(&container_id)
            .and_then(|rows| rows.iter_mut().find(|row| row.id == server_id))
            .ok_or(SyncError::NotFound {
                container_id,
                server_id,
            })?;
        stored.fields = payload.clone();
        Ok(())
    }

    async fn delete(&self, container_id: DbId, server_id: DbId) -> Result<(), SyncError> {
        let mut state = self.lock();
        let rows = state.hotspots.entry(container_id).or_default();
        let before = rows.len();
        rows.retain(|row| row.id != server_id);
        if rows.len() == before {
            return Err(SyncError::NotFound {
                container_id,
                server_id,
            });
        }
        Ok(())
    }

    async fn transition_container(
        &self,
        container_id: DbId,
        from: ContainerStatus,
        to: ContainerStatus,
    ) -> Result<(), SyncError> {
        let mut state = self.lock();
        let current = state
            .statuses
            .get(&container_id)
            .copied()
            .unwrap_or(ContainerStatus::Draft);
        if current != from {
            return Err(SyncError::Api {
                status: 409,
                body: format!("container {container_id} is {current:?}, not {from:?}"),
            });
        }
        state.statuses.insert(container_id, to);
        Ok(())
    }
}
