//! Hotspot editor event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`EditorEvent`]: the event envelope published by the store and the
//!   interaction controller. Panels and toolbars subscribe to it instead of
//!   polling the store.

pub mod bus;

pub use bus::{EditorEvent, EditorEventKind, EventBus, GestureKind, GestureOutcome, SyncOperation};
