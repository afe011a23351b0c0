//! Backend sync adapters for hotspot persistence.
//!
//! - [`BackendSyncAdapter`]: the contract the engine depends on.
//! - [`wire`]: serialized payloads exchanged with the backend.
//! - [`HttpSyncAdapter`]: REST implementation using [`reqwest`].
//! - [`MemorySyncAdapter`]: in-process implementation for offline use and
//!   tests.

pub mod adapter;
pub mod http;
pub mod memory;
pub mod wire;

pub use adapter::{BackendSyncAdapter, SyncError};
pub use http::HttpSyncAdapter;
pub use memory::MemorySyncAdapter;
pub use wire::{ContainerStatus, HotspotPayload, ServerHotspot};
