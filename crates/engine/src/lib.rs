//! Hotspot editing engine.
//!
//! Ties the domain model, the event bus and a backend adapter together:
//!
//! - [`HotspotStore`]: the authoritative collection, with optimistic local
//!   edits and background persistence.
//! - [`InteractionController`]: pointer-driven drag and resize gestures.
//! - [`IdentityMediator`](mediator::IdentityMediator): defers edits made
//!   before the backend has assigned a server id.
//! - [`EngineConfig`]: environment-driven configuration.

pub mod config;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod mediator;
pub mod scenario;
pub mod store;

pub use config::EngineConfig;
pub use error::EngineError;
pub use frame::CanvasFrame;
pub use interaction::{InputSource, InteractionController, PointerCapture, PointerSample};
pub use store::HotspotStore;
