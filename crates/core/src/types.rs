use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All server-side primary keys are BIGSERIAL.
pub type DbId = i64;

/// Client-stable hotspot identifier.
///
/// Allocated when a hotspot is created locally and kept for the whole
/// session, even after the backend assigns its own [`DbId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotspotId(Uuid);

impl HotspotId {
    /// Allocate a fresh, time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for HotspotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for HotspotId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = HotspotId::new();
        let b = HotspotId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn id_serializes_as_plain_uuid_string() {
        let id = HotspotId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.as_uuid().to_string()));
    }
}
