//! The backend sync contract consumed by the engine.

use async_trait::async_trait;
use hotspot_core::types::DbId;

use crate::wire::{ContainerStatus, HotspotPayload, ServerHotspot};

/// Persistence operations for the hotspots of one container.
///
/// Implementations must be cheap to share (`Arc<dyn BackendSyncAdapter>`)
/// and must not panic on network failures; every failure is reported as a
/// [`SyncError`] so the engine can decide whether it is fatal.
#[async_trait]
pub trait BackendSyncAdapter: Send + Sync {
    /// All hotspots currently stored for a container.
    async fn list(&self, container_id: DbId) -> Result<Vec<ServerHotspot>, SyncError>;

    /// Store a new hotspot and return it with its server id.
    async fn create(
        &self,
        container_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<ServerHotspot, SyncError>;

    /// Replace a stored hotspot with the full payload.
    async fn update(
        &self,
        container_id: DbId,
        server_id: DbId,
        payload: &HotspotPayload,
    ) -> Result<(), SyncError>;

    async fn delete(&self, container_id: DbId, server_id: DbId) -> Result<(), SyncError>;

    /// Move the container itself through its editorial lifecycle.
    async fn transition_container(
        &self,
        container_id: DbId,
        from: ContainerStatus,
        to: ContainerStatus,
    ) -> Result<(), SyncError>;
}

/// Errors from a backend sync adapter.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend has no hotspot with this server id.
    #[error("Hotspot {server_id} not found in container {container_id}")]
    NotFound { container_id: DbId, server_id: DbId },

    /// The backend could not be reached or refused to serve the request.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl SyncError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::NotFound { .. } => false,
            Self::Unavailable(_) => true,
        }
    }
}
